//! Notifications delivered by the upstream source
//!
//! Every callback the platform fires is turned into exactly one [`Event`]
//! by the adapter and handed to the router's dispatch entry point.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SensorError;
use crate::model::{
    AccuracyAuthorization, AuthorizationStatus, Beacon, BeaconConstraint, Heading, Location,
    Region, RegionState, Visit,
};

/// An upstream notification and its payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    AuthorizationChanged(AuthorizationStatus),
    AccuracyAuthorizationChanged(AccuracyAuthorization),
    /// Readings in chronological order, most recent last
    LocationsUpdated(Vec<Location>),
    LocationFailed(SensorError),
    LocationUpdatesPaused,
    LocationUpdatesResumed,
    RegionEntered(Region),
    RegionExited(Region),
    RegionStateDetermined(Region, RegionState),
    RegionMonitoringStarted(Region),
    /// The platform does not always say which region failed
    RegionMonitoringFailed(Option<Region>, SensorError),
    VisitRecorded(Visit),
    HeadingUpdated(Heading),
    BeaconsRanged(BeaconConstraint, Vec<Beacon>),
    RangingFailed(BeaconConstraint, SensorError),
}

impl Event {
    /// The field-less tag of this event
    pub fn kind(&self) -> EventKind {
        match self {
            Event::AuthorizationChanged(_) => EventKind::AuthorizationChanged,
            Event::AccuracyAuthorizationChanged(_) => EventKind::AccuracyAuthorizationChanged,
            Event::LocationsUpdated(_) => EventKind::LocationsUpdated,
            Event::LocationFailed(_) => EventKind::LocationFailed,
            Event::LocationUpdatesPaused => EventKind::LocationUpdatesPaused,
            Event::LocationUpdatesResumed => EventKind::LocationUpdatesResumed,
            Event::RegionEntered(_) => EventKind::RegionEntered,
            Event::RegionExited(_) => EventKind::RegionExited,
            Event::RegionStateDetermined(..) => EventKind::RegionStateDetermined,
            Event::RegionMonitoringStarted(_) => EventKind::RegionMonitoringStarted,
            Event::RegionMonitoringFailed(..) => EventKind::RegionMonitoringFailed,
            Event::VisitRecorded(_) => EventKind::VisitRecorded,
            Event::HeadingUpdated(_) => EventKind::HeadingUpdated,
            Event::BeaconsRanged(..) => EventKind::BeaconsRanged,
            Event::RangingFailed(..) => EventKind::RangingFailed,
        }
    }

    /// The region this event concerns, if any
    pub fn region(&self) -> Option<&Region> {
        match self {
            Event::RegionEntered(region)
            | Event::RegionExited(region)
            | Event::RegionStateDetermined(region, _)
            | Event::RegionMonitoringStarted(region) => Some(region),
            Event::RegionMonitoringFailed(region, _) => region.as_ref(),
            _ => None,
        }
    }

    /// The beacon constraint this event concerns, if any
    pub fn beacon_constraint(&self) -> Option<&BeaconConstraint> {
        match self {
            Event::BeaconsRanged(constraint, _) | Event::RangingFailed(constraint, _) => {
                Some(constraint)
            }
            _ => None,
        }
    }
}

/// Field-less discriminant of [`Event`], used for logging and statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    AuthorizationChanged,
    AccuracyAuthorizationChanged,
    LocationsUpdated,
    LocationFailed,
    LocationUpdatesPaused,
    LocationUpdatesResumed,
    RegionEntered,
    RegionExited,
    RegionStateDetermined,
    RegionMonitoringStarted,
    RegionMonitoringFailed,
    VisitRecorded,
    HeadingUpdated,
    BeaconsRanged,
    RangingFailed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Coordinate;

    fn region(id: &str) -> Region {
        Region::new(id, Coordinate::new(10.0, 20.0), 50.0)
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            Event::LocationsUpdated(vec![]).kind(),
            EventKind::LocationsUpdated
        );
        assert_eq!(
            Event::RegionStateDetermined(region("a"), RegionState::Inside).kind(),
            EventKind::RegionStateDetermined
        );
        assert_eq!(Event::LocationUpdatesPaused.kind().to_string(), "LocationUpdatesPaused");
    }

    #[test]
    fn test_region_accessor() {
        assert_eq!(Event::RegionEntered(region("a")).region(), Some(&region("a")));
        assert_eq!(
            Event::RegionMonitoringFailed(None, SensorError::RegionMonitoringFailure).region(),
            None
        );
        assert_eq!(Event::LocationUpdatesResumed.region(), None);
    }

    #[test]
    fn test_beacon_constraint_accessor() {
        let constraint = BeaconConstraint::new("uuid-1");
        let event = Event::RangingFailed(constraint.clone(), SensorError::RangingFailure);
        assert_eq!(event.beacon_constraint(), Some(&constraint));
        assert_eq!(Event::RegionEntered(region("a")).beacon_constraint(), None);
    }

    #[test]
    fn test_event_serializes() {
        let event = Event::AuthorizationChanged(AuthorizationStatus::Denied);
        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
