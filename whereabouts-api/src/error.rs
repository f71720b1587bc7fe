//! Failures reported by the platform sensor service

use serde::{Deserialize, Serialize};

/// A failure delivered by the upstream source.
///
/// These are payloads, not crashes: they travel through the router like any
/// other event and end up in a one-shot result or a stream element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum SensorError {
    /// The current location could not be determined yet
    #[error("Location is currently unknown")]
    LocationUnknown,

    /// The user denied access to location services
    #[error("Access to location services was denied")]
    Denied,

    /// The network-assisted positioning backend was unreachable
    #[error("Network error while resolving location")]
    Network,

    /// The heading could not be determined (e.g. magnetic interference)
    #[error("Heading could not be determined")]
    HeadingFailure,

    /// Region monitoring is not permitted for this application
    #[error("Region monitoring was denied")]
    RegionMonitoringDenied,

    /// Region monitoring failed for the given region
    #[error("Region monitoring failed")]
    RegionMonitoringFailure,

    /// Beacon ranging is not available on this device
    #[error("Beacon ranging is unavailable")]
    RangingUnavailable,

    /// Beacon ranging failed for the given constraint
    #[error("Beacon ranging failed")]
    RangingFailure,

    /// Any other platform error, with its description
    #[error("Sensor error: {0}")]
    Other(String),
}

impl SensorError {
    /// Whether the failure stems from missing permissions rather than a transient condition
    pub fn is_permission_error(&self) -> bool {
        matches!(self, SensorError::Denied | SensorError::RegionMonitoringDenied)
    }
}
