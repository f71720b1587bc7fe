//! Compass heading readings

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// A compass heading reading, in degrees clockwise from north
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub magnetic: f64,
    /// Negative when true north could not be computed
    pub true_heading: f64,
    /// Maximum deviation in degrees, negative when invalid
    pub accuracy: f64,
    pub timestamp: SystemTime,
}

impl Heading {
    pub fn new(magnetic: f64, true_heading: f64, accuracy: f64) -> Self {
        Self {
            magnetic,
            true_heading,
            accuracy,
            timestamp: SystemTime::now(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.accuracy >= 0.0
    }
}
