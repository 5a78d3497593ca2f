pub mod clock;
pub mod config;
pub mod events;
pub mod logs;
pub mod profiles;
pub mod timezones;
