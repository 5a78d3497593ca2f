//! Error types for tzplan.

use thiserror::Error;

use crate::validation::ValidationError;

/// Failures of the timezone conversion utility.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    #[error("Unknown timezone: {0}")]
    InvalidZone(String),

    #[error("Invalid date format: {0}")]
    InvalidDateTime(String),
}

/// Failures talking to the REST backend.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request failed with status code {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Could not decode response: {0}")]
    Decode(String),

    #[error("Invalid id: {0:?}")]
    InvalidId(String),
}

impl GatewayError {
    /// HTTP status of the failed request, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Http { status, .. } => Some(*status),
            GatewayError::Network(e) => e.status().map(|s| s.as_u16()),
            GatewayError::Decode(_) | GatewayError::InvalidId(_) => None,
        }
    }
}

/// Errors that can occur in tzplan operations.
#[derive(Error, Debug)]
pub enum TzPlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("No profile selected")]
    NoProfileSelected,

    #[error("Request superseded: {0}")]
    Cancelled(String),
}

impl TzPlanError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, TzPlanError::Cancelled(_))
    }
}

/// Result type alias for tzplan operations.
pub type TzPlanResult<T> = Result<T, TzPlanError>;
