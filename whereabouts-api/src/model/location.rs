//! Geographic coordinates and location readings

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;

/// Latitude/longitude pair in degrees (WGS 84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are inside their valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}

/// A single location reading
///
/// Negative accuracy values mean the corresponding measurement is invalid,
/// as do negative `course` and `speed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub coordinate: Coordinate,
    /// Metres above sea level
    pub altitude: f64,
    /// Radius of uncertainty in metres
    pub horizontal_accuracy: f64,
    /// Altitude uncertainty in metres
    pub vertical_accuracy: f64,
    /// Degrees clockwise from true north
    pub course: f64,
    /// Metres per second
    pub speed: f64,
    pub timestamp: SystemTime,
}

impl Location {
    /// Create a reading with only a coordinate and accuracy known
    pub fn new(coordinate: Coordinate, horizontal_accuracy: f64) -> Self {
        Self {
            coordinate,
            altitude: 0.0,
            horizontal_accuracy,
            vertical_accuracy: -1.0,
            course: -1.0,
            speed: -1.0,
            timestamp: SystemTime::now(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: SystemTime) -> Self {
        self.timestamp = timestamp;
        self
    }
}
