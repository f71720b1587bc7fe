//! Upstream source contract
//!
//! The platform permits exactly one callback receiver. The adapter that owns
//! that receiver implements [`LocationSource`] for the commands and forwards
//! every callback into the router as an [`Event`](crate::Event).

use serde::{Deserialize, Serialize};

use crate::model::{AccuracyAuthorization, AuthorizationStatus, BeaconConstraint, Region};

/// Commands the bridge issues to the platform sensor service
///
/// Implementations must be cheap and non-blocking: every method is called
/// from the consumer's task. An implementation may deliver events
/// synchronously from within a command; the bridge never holds its router
/// lock while calling into the source.
pub trait LocationSource: Send + Sync {
    /// Current authorization status, without prompting the user
    fn authorization_status(&self) -> AuthorizationStatus;

    /// Current accuracy authorization
    fn accuracy_authorization(&self) -> AccuracyAuthorization;

    /// Whether location services are enabled device-wide
    fn location_services_enabled(&self) -> bool;

    fn request_when_in_use_authorization(&self);

    fn request_always_authorization(&self);

    /// Ask for temporary precise access; `purpose_key` names the usage description
    fn request_temporary_full_accuracy(&self, purpose_key: &str);

    fn start_updating_location(&self);

    fn stop_updating_location(&self);

    /// Ask for a single reading; the answer arrives as a regular location event
    fn request_location(&self);

    fn start_monitoring(&self, region: &Region);

    fn stop_monitoring(&self, region: &Region);

    fn start_monitoring_visits(&self);

    fn stop_monitoring_visits(&self);

    fn start_updating_heading(&self);

    fn stop_updating_heading(&self);

    fn start_ranging_beacons(&self, constraint: &BeaconConstraint);

    fn stop_ranging_beacons(&self, constraint: &BeaconConstraint);

    /// Apply tuning settings; called once at construction and on every update
    fn apply_settings(&self, settings: &SourceSettings);
}

/// Requested precision of location readings
///
/// Translating these into platform constants is the adapter's business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accuracy {
    BestForNavigation,
    Best,
    NearestTenMeters,
    HundredMeters,
    Kilometer,
    ThreeKilometers,
    Reduced,
}

impl Default for Accuracy {
    fn default() -> Self {
        Accuracy::Best
    }
}

/// Hint about how the application moves, used by the platform to save power
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    Other,
    AutomotiveNavigation,
    Fitness,
    OtherNavigation,
    Airborne,
}

impl Default for ActivityType {
    fn default() -> Self {
        ActivityType::Other
    }
}

/// Tuning knobs pushed to the source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSettings {
    pub desired_accuracy: Accuracy,
    /// Minimum movement in metres before a new reading is delivered
    pub distance_filter: Option<f64>,
    pub activity_type: ActivityType,
    pub allows_background_updates: bool,
    pub pauses_updates_automatically: bool,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            desired_accuracy: Accuracy::default(),
            distance_filter: None,
            activity_type: ActivityType::default(),
            allows_background_updates: false,
            pauses_updates_automatically: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = SourceSettings::default();
        assert_eq!(settings.desired_accuracy, Accuracy::Best);
        assert_eq!(settings.distance_filter, None);
        assert!(settings.pauses_updates_automatically);
        assert!(!settings.allows_background_updates);
    }

    #[test]
    fn test_accuracy_serde_names() {
        let json = serde_json::to_string(&Accuracy::NearestTenMeters).unwrap();
        assert_eq!(json, "\"nearest_ten_meters\"");
    }
}
