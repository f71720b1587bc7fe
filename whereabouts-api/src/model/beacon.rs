//! Beacon ranging types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity filter for beacon ranging
///
/// `major` and `minor` narrow the match when present. Equality is by value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BeaconConstraint {
    pub uuid: String,
    pub major: Option<u16>,
    pub minor: Option<u16>,
}

impl BeaconConstraint {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            major: None,
            minor: None,
        }
    }

    pub fn with_major(mut self, major: u16) -> Self {
        self.major = Some(major);
        self
    }

    pub fn with_minor(mut self, minor: u16) -> Self {
        self.minor = Some(minor);
        self
    }

    /// Whether a ranged beacon satisfies this constraint
    pub fn matches(&self, beacon: &Beacon) -> bool {
        self.uuid.eq_ignore_ascii_case(&beacon.uuid)
            && self.major.map_or(true, |major| major == beacon.major)
            && self.minor.map_or(true, |minor| minor == beacon.minor)
    }
}

impl fmt::Display for BeaconConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.uuid)?;
        if let Some(major) = self.major {
            write!(f, "/{}", major)?;
        }
        if let Some(minor) = self.minor {
            write!(f, "/{}", minor)?;
        }
        Ok(())
    }
}

/// Relative distance bucket of a ranged beacon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Proximity {
    Unknown,
    Immediate,
    Near,
    Far,
}

/// A beacon observed during ranging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Beacon {
    pub uuid: String,
    pub major: u16,
    pub minor: u16,
    pub proximity: Proximity,
    /// Estimated distance in metres, negative when unknown
    pub accuracy: f64,
    pub rssi: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beacon(major: u16, minor: u16) -> Beacon {
        Beacon {
            uuid: "E2C56DB5-DFFB-48D2-B060-D0F5A71096E0".to_string(),
            major,
            minor,
            proximity: Proximity::Near,
            accuracy: 1.2,
            rssi: -60,
        }
    }

    #[test]
    fn test_constraint_matching() {
        let any = BeaconConstraint::new("e2c56db5-dffb-48d2-b060-d0f5a71096e0");
        assert!(any.matches(&beacon(1, 2)));

        let narrowed = any.clone().with_major(1).with_minor(3);
        assert!(!narrowed.matches(&beacon(1, 2)));
        assert!(narrowed.matches(&beacon(1, 3)));
    }

    #[test]
    fn test_constraint_display() {
        let constraint = BeaconConstraint::new("abc").with_major(7);
        assert_eq!(constraint.to_string(), "abc/7");
    }
}
