//! Monitored geographic regions

use serde::{Deserialize, Serialize};
use std::fmt;

use super::location::Coordinate;

/// A circular geographic region
///
/// Two regions are the same registration when they compare equal by value;
/// stopping the monitoring of one region relies on this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub identifier: String,
    pub center: Coordinate,
    /// Radius in metres
    pub radius: f64,
}

impl Region {
    pub fn new(identifier: impl Into<String>, center: Coordinate, radius: f64) -> Self {
        Self {
            identifier: identifier.into(),
            center,
            radius,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}r{}", self.identifier, self.center, self.radius)
    }
}

/// Position of the device relative to a region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionState {
    Unknown,
    Inside,
    Outside,
}

impl Default for RegionState {
    fn default() -> Self {
        RegionState::Unknown
    }
}
