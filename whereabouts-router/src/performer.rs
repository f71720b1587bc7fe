//! Registered units of interest
//!
//! A [`Performer`] pairs a process-unique identity with one of a closed set
//! of roles. The role decides which events the performer cares about
//! ([`Performer::interest`]) and where matching events go: a single-shot
//! [`Slot`] or a streaming [`Sink`].

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use whereabouts_api::{
    AccuracyAuthorization, AuthorizationStatus, BeaconConstraint, Event, Location, Region,
    SensorError,
};

use crate::slot::{Sink, Slot};
use crate::updates::{BeaconEvent, HeadingEvent, LocationUpdate, RegionEvent, VisitEvent};

static NEXT_PERFORMER_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a performer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PerformerId(u64);

impl PerformerId {
    /// Create a PerformerId with the given value
    ///
    /// Performers mint their own identities; this is for lookups.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    fn next() -> Self {
        Self(NEXT_PERFORMER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for PerformerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "performer-{}", self.0)
    }
}

/// Concrete variant of a performer, used for bulk cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PerformerKind {
    AuthorizationRequest,
    AuthorizationMonitor,
    AccuracyRequest,
    AccuracyMonitor,
    SingleLocation,
    LocationUpdates,
    RegionMonitor,
    VisitMonitor,
    HeadingUpdates,
    BeaconRanging,
}

impl PerformerKind {
    /// Whether performers of this kind resolve once and leave
    pub fn is_single_shot(&self) -> bool {
        matches!(
            self,
            PerformerKind::AuthorizationRequest
                | PerformerKind::AccuracyRequest
                | PerformerKind::SingleLocation
        )
    }
}

impl fmt::Display for PerformerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What the router should do with a performer after it handled an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Retain,
    Remove,
}

#[derive(Debug)]
enum Role {
    AuthorizationRequest(Slot<AuthorizationStatus>),
    AuthorizationMonitor(Sink<AuthorizationStatus>),
    AccuracyRequest(Slot<AccuracyAuthorization>),
    AccuracyMonitor(Sink<AccuracyAuthorization>),
    SingleLocation(Slot<Result<Location, SensorError>>),
    LocationUpdates(Sink<LocationUpdate>),
    RegionMonitor {
        region: Region,
        sink: Sink<RegionEvent>,
    },
    VisitMonitor(Sink<VisitEvent>),
    HeadingUpdates(Sink<HeadingEvent>),
    BeaconRanging {
        constraint: BeaconConstraint,
        sink: Sink<BeaconEvent>,
    },
}

/// A registered unit of interest in a subset of upstream events
#[derive(Debug)]
pub struct Performer {
    id: PerformerId,
    role: Role,
}

impl Performer {
    fn with_role(role: Role) -> Self {
        Self {
            id: PerformerId::next(),
            role,
        }
    }

    /// Resolves on the first decisive authorization status
    pub fn authorization_request(slot: Slot<AuthorizationStatus>) -> Self {
        Self::with_role(Role::AuthorizationRequest(slot))
    }

    /// Forwards every authorization change
    pub fn authorization_monitor(sink: Sink<AuthorizationStatus>) -> Self {
        Self::with_role(Role::AuthorizationMonitor(sink))
    }

    /// Resolves on the next accuracy authorization change
    pub fn accuracy_request(slot: Slot<AccuracyAuthorization>) -> Self {
        Self::with_role(Role::AccuracyRequest(slot))
    }

    /// Forwards every accuracy authorization change
    pub fn accuracy_monitor(sink: Sink<AccuracyAuthorization>) -> Self {
        Self::with_role(Role::AccuracyMonitor(sink))
    }

    /// Resolves with the most recent reading of the next non-empty batch, or the next failure
    pub fn single_location(slot: Slot<Result<Location, SensorError>>) -> Self {
        Self::with_role(Role::SingleLocation(slot))
    }

    pub fn location_updates(sink: Sink<LocationUpdate>) -> Self {
        Self::with_role(Role::LocationUpdates(sink))
    }

    /// Forwards events about `region` and monitoring failures that name no region
    pub fn region_monitor(region: Region, sink: Sink<RegionEvent>) -> Self {
        Self::with_role(Role::RegionMonitor { region, sink })
    }

    pub fn visit_monitor(sink: Sink<VisitEvent>) -> Self {
        Self::with_role(Role::VisitMonitor(sink))
    }

    pub fn heading_updates(sink: Sink<HeadingEvent>) -> Self {
        Self::with_role(Role::HeadingUpdates(sink))
    }

    /// Forwards ranging results and failures for `constraint`
    pub fn beacon_ranging(constraint: BeaconConstraint, sink: Sink<BeaconEvent>) -> Self {
        Self::with_role(Role::BeaconRanging { constraint, sink })
    }

    pub fn id(&self) -> PerformerId {
        self.id
    }

    pub fn kind(&self) -> PerformerKind {
        match &self.role {
            Role::AuthorizationRequest(_) => PerformerKind::AuthorizationRequest,
            Role::AuthorizationMonitor(_) => PerformerKind::AuthorizationMonitor,
            Role::AccuracyRequest(_) => PerformerKind::AccuracyRequest,
            Role::AccuracyMonitor(_) => PerformerKind::AccuracyMonitor,
            Role::SingleLocation(_) => PerformerKind::SingleLocation,
            Role::LocationUpdates(_) => PerformerKind::LocationUpdates,
            Role::RegionMonitor { .. } => PerformerKind::RegionMonitor,
            Role::VisitMonitor(_) => PerformerKind::VisitMonitor,
            Role::HeadingUpdates(_) => PerformerKind::HeadingUpdates,
            Role::BeaconRanging { .. } => PerformerKind::BeaconRanging,
        }
    }

    /// The monitored region, for region monitors
    pub fn region(&self) -> Option<&Region> {
        match &self.role {
            Role::RegionMonitor { region, .. } => Some(region),
            _ => None,
        }
    }

    /// The ranged constraint, for beacon rangers
    pub fn beacon_constraint(&self) -> Option<&BeaconConstraint> {
        match &self.role {
            Role::BeaconRanging { constraint, .. } => Some(constraint),
            _ => None,
        }
    }

    /// Whether `other` is kept alive by the same upstream start command
    pub fn shares_upstream(&self, other: &Performer) -> bool {
        self.kind() == other.kind()
            && self.region() == other.region()
            && self.beacon_constraint() == other.beacon_constraint()
    }

    /// Whether this performer wants `event`. Pure.
    pub fn interest(&self, event: &Event) -> bool {
        match (&self.role, event) {
            (Role::AuthorizationRequest(_), Event::AuthorizationChanged(status)) => {
                status.is_determined()
            }
            (Role::AuthorizationMonitor(_), Event::AuthorizationChanged(_)) => true,
            (Role::AccuracyRequest(_), Event::AccuracyAuthorizationChanged(_)) => true,
            (Role::AccuracyMonitor(_), Event::AccuracyAuthorizationChanged(_)) => true,
            (Role::SingleLocation(_), Event::LocationsUpdated(locations)) => !locations.is_empty(),
            (Role::SingleLocation(_), Event::LocationFailed(_)) => true,
            (
                Role::LocationUpdates(_),
                Event::LocationsUpdated(_)
                | Event::LocationFailed(_)
                | Event::LocationUpdatesPaused
                | Event::LocationUpdatesResumed,
            ) => true,
            (Role::RegionMonitor { .. }, Event::RegionMonitoringFailed(None, _)) => true,
            (Role::RegionMonitor { region, .. }, _) => event.region() == Some(region),
            (Role::VisitMonitor(_), Event::VisitRecorded(_) | Event::LocationFailed(_)) => true,
            (Role::HeadingUpdates(_), Event::HeadingUpdated(_) | Event::LocationFailed(_)) => true,
            (Role::BeaconRanging { constraint, .. }, _) => {
                event.beacon_constraint() == Some(constraint)
            }
            _ => false,
        }
    }

    /// Consume a matching event
    ///
    /// Only called by the router, under its lock, for events that passed
    /// [`interest`](Self::interest).
    pub(crate) fn handle(&mut self, event: &Event) -> Disposition {
        match &mut self.role {
            Role::AuthorizationRequest(slot) => match event {
                Event::AuthorizationChanged(status) if status.is_determined() => {
                    slot.resolve(*status)
                }
                _ => Disposition::Retain,
            },
            Role::AuthorizationMonitor(sink) => match event {
                Event::AuthorizationChanged(status) => sink.forward(*status),
                _ => Disposition::Retain,
            },
            Role::AccuracyRequest(slot) => match event {
                Event::AccuracyAuthorizationChanged(accuracy) => slot.resolve(*accuracy),
                _ => Disposition::Retain,
            },
            Role::AccuracyMonitor(sink) => match event {
                Event::AccuracyAuthorizationChanged(accuracy) => sink.forward(*accuracy),
                _ => Disposition::Retain,
            },
            Role::SingleLocation(slot) => match event {
                Event::LocationsUpdated(locations) => match locations.last() {
                    Some(latest) => slot.resolve(Ok(latest.clone())),
                    None => Disposition::Retain,
                },
                Event::LocationFailed(error) => slot.resolve(Err(error.clone())),
                _ => Disposition::Retain,
            },
            Role::LocationUpdates(sink) => forward_with(sink, event, LocationUpdate::from_event),
            Role::RegionMonitor { sink, .. } => forward_with(sink, event, RegionEvent::from_event),
            Role::VisitMonitor(sink) => forward_with(sink, event, VisitEvent::from_event),
            Role::HeadingUpdates(sink) => forward_with(sink, event, HeadingEvent::from_event),
            Role::BeaconRanging { sink, .. } => forward_with(sink, event, BeaconEvent::from_event),
        }
    }
}

fn forward_with<T>(sink: &Sink<T>, event: &Event, convert: fn(&Event) -> Option<T>) -> Disposition {
    match convert(event) {
        Some(value) => sink.forward(value),
        None => Disposition::Retain,
    }
}
