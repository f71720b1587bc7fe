//! Visit records

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::location::Coordinate;

/// A place where the user spent some time
///
/// `arrival` or `departure` is `None` while that end of the visit is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    pub coordinate: Coordinate,
    pub horizontal_accuracy: f64,
    pub arrival: Option<SystemTime>,
    pub departure: Option<SystemTime>,
}

impl Visit {
    /// Whether the user is still at the visited place
    pub fn is_ongoing(&self) -> bool {
        self.departure.is_none()
    }
}
