use std::time::Duration;
use thiserror::Error;

use whereabouts_api::SensorError;
use whereabouts_router::RouterError;

/// Errors surfaced by [`LocationManager`](crate::LocationManager) operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocationError {
    /// The upstream source reported a failure
    #[error("Sensor failure: {0}")]
    Sensor(#[from] SensorError),

    /// The operation could not be registered
    #[error("Router error: {0}")]
    Router(#[from] RouterError),

    /// The pending operation was removed before it resolved
    #[error("Operation was cancelled before it resolved")]
    Cancelled,

    /// No decisive event arrived within the configured request timeout
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid configuration provided
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type for location operations
pub type Result<T> = std::result::Result<T, LocationError>;
