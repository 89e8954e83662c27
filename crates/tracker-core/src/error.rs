//! Attribution error types

use thiserror::Error;

/// Boxed cause carried by [`AttributionError::NetworkFailure`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum AttributionError {
    #[error("Tracker is not configured: {0}")]
    ConfigurationMissing(String),

    #[error("Tracker is already configured")]
    AlreadyConfigured,

    #[error("Tracking not initialized: install attribution has not been confirmed")]
    TrackingNotInitialized,

    #[error("Invalid URL: {0}")]
    InvalidURL(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[source] BoxError),

    #[error("No matching referrer for this install")]
    NoMatchingReferrer,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AttributionError {
    /// Wrap any transport-level cause as a network failure
    pub fn network(cause: impl Into<BoxError>) -> Self {
        AttributionError::NetworkFailure(cause.into())
    }

    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            AttributionError::ConfigurationMissing(_) => "CONFIGURATION_MISSING",
            AttributionError::AlreadyConfigured => "ALREADY_CONFIGURED",
            AttributionError::TrackingNotInitialized => "TRACKING_NOT_INITIALIZED",
            AttributionError::InvalidURL(_) => "INVALID_URL",
            AttributionError::InvalidParameters(_) => "INVALID_PARAMETERS",
            AttributionError::NetworkFailure(_) => "NETWORK_FAILURE",
            AttributionError::NoMatchingReferrer => "NO_MATCHING_REFERRER",
            AttributionError::InvalidResponse(_) => "INVALID_RESPONSE",
            AttributionError::Json(_) => "JSON_ERROR",
            AttributionError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, AttributionError>;
