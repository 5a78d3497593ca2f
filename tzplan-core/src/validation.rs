//! Field validators for profile and event input.
//!
//! Validation here is advisory: the backend is the authority and may still
//! reject a request these checks accept.

use thiserror::Error;

use crate::error::TimeError;
use crate::timezone;

pub const PROFILE_NAME_MIN: usize = 2;
pub const PROFILE_NAME_MAX: usize = 50;
pub const EVENT_TITLE_MIN: usize = 3;
pub const EVENT_TITLE_MAX: usize = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name is required")]
    NameRequired,

    #[error("Name must be at least 2 characters")]
    NameTooShort,

    #[error("Name must be at most 50 characters")]
    NameTooLong,

    #[error("Title is required")]
    TitleRequired,

    #[error("Title must be at least 3 characters")]
    TitleTooShort,

    #[error("Title must be at most 100 characters")]
    TitleTooLong,

    #[error("Start and end dates are required")]
    DatesRequired,

    #[error("Invalid date format")]
    InvalidDateTime,

    #[error("Unknown timezone: {0}")]
    InvalidZone(String),

    #[error("End date/time must be after start date/time")]
    OrderingViolation,

    #[error("At least one profile must be selected")]
    NoProfiles,

    #[error("{0}")]
    Fields(FieldErrors),
}

impl From<TimeError> for ValidationError {
    fn from(e: TimeError) -> Self {
        match e {
            TimeError::InvalidZone(zone) => ValidationError::InvalidZone(zone),
            TimeError::InvalidDateTime(_) => ValidationError::InvalidDateTime,
        }
    }
}

pub fn validate_profile_name(name: &str) -> Result<(), ValidationError> {
    check_length(
        name,
        PROFILE_NAME_MIN,
        PROFILE_NAME_MAX,
        [
            ValidationError::NameRequired,
            ValidationError::NameTooShort,
            ValidationError::NameTooLong,
        ],
    )
}

pub fn validate_event_title(title: &str) -> Result<(), ValidationError> {
    check_length(
        title,
        EVENT_TITLE_MIN,
        EVENT_TITLE_MAX,
        [
            ValidationError::TitleRequired,
            ValidationError::TitleTooShort,
            ValidationError::TitleTooLong,
        ],
    )
}

/// `errors` is `[required, too_short, too_long]`. Lengths count characters.
fn check_length(
    value: &str,
    min: usize,
    max: usize,
    errors: [ValidationError; 3],
) -> Result<(), ValidationError> {
    let [required, too_short, too_long] = errors;

    if value.trim().is_empty() {
        return Err(required);
    }

    let len = value.chars().count();
    if len < min {
        return Err(too_short);
    }
    if len > max {
        return Err(too_long);
    }

    Ok(())
}

/// Check that both ends are present, parse in `zone`, and that the end is
/// strictly after the start.
pub fn validate_event_dates(
    start_date: &str,
    start_time: &str,
    end_date: &str,
    end_time: &str,
    zone: &str,
) -> Result<(), ValidationError> {
    if start_date.trim().is_empty() || end_date.trim().is_empty() {
        return Err(ValidationError::DatesRequired);
    }

    let start = timezone::local_to_instant(start_date, start_time, zone)?;
    let end = timezone::local_to_instant(end_date, end_time, zone)?;

    if end <= start {
        return Err(ValidationError::OrderingViolation);
    }

    Ok(())
}

pub fn validate_profiles<S: AsRef<str>>(profiles: &[S]) -> Result<(), ValidationError> {
    if profiles.iter().all(|p| p.as_ref().trim().is_empty()) {
        return Err(ValidationError::NoProfiles);
    }
    Ok(())
}

pub fn validate_timezone(zone: &str) -> Result<(), ValidationError> {
    timezone::parse_zone(zone)?;
    Ok(())
}

/// Form field a validation message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Field {
    Name,
    Timezone,
    Title,
    Profiles,
    Dates,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Timezone => "timezone",
            Field::Title => "title",
            Field::Profiles => "profiles",
            Field::Dates => "dates",
        }
    }
}

/// Every field-level failure of one form submission, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<(Field, ValidationError)>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, field: Field, result: Result<(), ValidationError>) {
        if let Err(e) = result {
            self.errors.push((field, e));
            self.errors.sort_by_key(|(f, _)| *f);
        }
    }

    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors.iter().find(|(f, _)| *f == field).map(|(_, e)| e)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Field, ValidationError)> {
        self.errors.iter()
    }

    /// `Ok` when nothing failed, otherwise the collected errors.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::Fields(self))
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|(field, e)| format!("{}: {}", field.as_str(), e))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}
