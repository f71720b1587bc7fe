//! Configuration types for the whereabouts crate
//!
//! `ManagerConfig` controls how the manager tunes the upstream source and
//! how long one-shot requests may wait.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use whereabouts_api::{Accuracy, ActivityType, SourceSettings};

use crate::error::{LocationError, Result};

/// Configuration for the LocationManager
///
/// Missing fields fall back to their defaults when deserializing, so a
/// partial JSON/TOML document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManagerConfig {
    /// Requested precision of readings
    /// Default: Accuracy::Best
    pub desired_accuracy: Accuracy,

    /// Minimum movement in metres between readings, `None` for every change
    /// Default: None
    pub distance_filter: Option<f64>,

    /// Movement hint for the platform's power management
    /// Default: ActivityType::Other
    pub activity_type: ActivityType,

    /// Keep delivering updates while the application is in the background
    /// Default: false
    pub allows_background_updates: bool,

    /// Let the platform pause updates when the device is stationary
    /// Default: true
    pub pauses_updates_automatically: bool,

    /// Upper bound for one-shot requests, `None` to wait indefinitely
    /// Default: None
    pub request_timeout: Option<Duration>,

    /// Maximum number of concurrently registered operations
    /// Default: 1024
    pub max_performers: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            desired_accuracy: Accuracy::Best,
            distance_filter: None,
            activity_type: ActivityType::Other,
            allows_background_updates: false,
            pauses_updates_automatically: true,
            request_timeout: None,
            max_performers: 1024,
        }
    }
}

impl ManagerConfig {
    /// Create a new ManagerConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ManagerConfig for turn-by-turn navigation
    pub fn navigation() -> Self {
        Self {
            desired_accuracy: Accuracy::BestForNavigation,
            activity_type: ActivityType::AutomotiveNavigation,
            allows_background_updates: true,
            pauses_updates_automatically: false,
            ..Default::default()
        }
    }

    /// Create a ManagerConfig that trades precision for battery life
    pub fn low_power() -> Self {
        Self {
            desired_accuracy: Accuracy::Kilometer,
            distance_filter: Some(500.0),
            request_timeout: Some(Duration::from_secs(30)),
            ..Default::default()
        }
    }

    pub fn with_accuracy(mut self, accuracy: Accuracy) -> Self {
        self.desired_accuracy = accuracy;
        self
    }

    pub fn with_distance_filter(mut self, metres: f64) -> Self {
        self.distance_filter = Some(metres);
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn with_background_updates(mut self, allowed: bool) -> Self {
        self.allows_background_updates = allowed;
        self
    }

    /// Validate the configuration and return any issues
    pub fn validate(&self) -> Result<()> {
        if let Some(filter) = self.distance_filter {
            if !(filter > 0.0) {
                return Err(LocationError::Configuration(
                    "Distance filter must be a positive number of metres".to_string(),
                ));
            }
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(LocationError::Configuration(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.max_performers == 0 {
            return Err(LocationError::Configuration(
                "Max performers must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The settings pushed to the upstream source
    pub fn settings(&self) -> SourceSettings {
        SourceSettings {
            desired_accuracy: self.desired_accuracy,
            distance_filter: self.distance_filter,
            activity_type: self.activity_type,
            allows_background_updates: self.allows_background_updates,
            pauses_updates_automatically: self.pauses_updates_automatically,
        }
    }
}
