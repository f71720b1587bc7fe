//! Elements delivered to streaming consumers
//!
//! Each streaming capability sees only its slice of the upstream events.
//! The `from_event` conversions define that slice; failures are ordinary
//! elements and do not end a stream.

use whereabouts_api::{
    Beacon, Event, Heading, Location, Region, RegionState, SensorError, Visit,
};

/// Element of a continuous location stream
#[derive(Debug, Clone, PartialEq)]
pub enum LocationUpdate {
    Locations(Vec<Location>),
    Failed(SensorError),
    Paused,
    Resumed,
}

impl LocationUpdate {
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::LocationsUpdated(locations) => Some(Self::Locations(locations.clone())),
            Event::LocationFailed(error) => Some(Self::Failed(error.clone())),
            Event::LocationUpdatesPaused => Some(Self::Paused),
            Event::LocationUpdatesResumed => Some(Self::Resumed),
            _ => None,
        }
    }

    /// The most recent reading carried by this element
    pub fn latest(&self) -> Option<&Location> {
        match self {
            Self::Locations(locations) => locations.last(),
            _ => None,
        }
    }
}

/// Element of a region monitoring stream
#[derive(Debug, Clone, PartialEq)]
pub enum RegionEvent {
    Entered(Region),
    Exited(Region),
    StateDetermined(Region, RegionState),
    MonitoringStarted(Region),
    MonitoringFailed(Option<Region>, SensorError),
}

impl RegionEvent {
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::RegionEntered(region) => Some(Self::Entered(region.clone())),
            Event::RegionExited(region) => Some(Self::Exited(region.clone())),
            Event::RegionStateDetermined(region, state) => {
                Some(Self::StateDetermined(region.clone(), *state))
            }
            Event::RegionMonitoringStarted(region) => Some(Self::MonitoringStarted(region.clone())),
            Event::RegionMonitoringFailed(region, error) => {
                Some(Self::MonitoringFailed(region.clone(), error.clone()))
            }
            _ => None,
        }
    }
}

/// Element of a visit monitoring stream
#[derive(Debug, Clone, PartialEq)]
pub enum VisitEvent {
    Visit(Visit),
    Failed(SensorError),
}

impl VisitEvent {
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::VisitRecorded(visit) => Some(Self::Visit(visit.clone())),
            Event::LocationFailed(error) => Some(Self::Failed(error.clone())),
            _ => None,
        }
    }
}

/// Element of a heading stream
#[derive(Debug, Clone, PartialEq)]
pub enum HeadingEvent {
    Heading(Heading),
    Failed(SensorError),
}

impl HeadingEvent {
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::HeadingUpdated(heading) => Some(Self::Heading(heading.clone())),
            Event::LocationFailed(error) => Some(Self::Failed(error.clone())),
            _ => None,
        }
    }
}

/// Element of a beacon ranging stream
#[derive(Debug, Clone, PartialEq)]
pub enum BeaconEvent {
    /// Beacons in range, nearest first as reported by the platform
    Ranged(Vec<Beacon>),
    Failed(SensorError),
}

impl BeaconEvent {
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::BeaconsRanged(_, beacons) => Some(Self::Ranged(beacons.clone())),
            Event::RangingFailed(_, error) => Some(Self::Failed(error.clone())),
            _ => None,
        }
    }
}
