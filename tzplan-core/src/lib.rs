//! Core library for tzplan: profiles, events shared across timezones, and
//! their change history, mirrored from a REST backend.

pub mod app;
pub mod config;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod model;
pub mod resource;
pub mod store;
pub mod timezone;
pub mod validation;

pub use app::App;
pub use config::ClientConfig;
pub use draft::{EventDraft, ProfileDraft};
pub use error::{GatewayError, TimeError, TzPlanError, TzPlanResult};
pub use gateway::{Gateway, HttpGateway};
pub use model::{ChangeLogEntry, ChangedField, Event, Profile};
pub use store::{Action, MirrorState, Store};
pub use validation::ValidationError;
