//! Event model and upstream contract for the whereabouts location bridge
//!
//! This crate holds everything that crosses the boundary between the platform
//! sensor service and the rest of the workspace:
//!
//! - [`Event`]: the closed set of notifications the platform delivers
//! - the payload types carried by those notifications ([`model`])
//! - [`LocationSource`]: the commands the bridge issues to the platform
//! - [`SensorError`]: failures the platform reports
//!
//! It has no knowledge of how events are routed to consumers; that lives in
//! `whereabouts-router`.
//!
//! # Example
//!
//! ```rust
//! use whereabouts_api::{AuthorizationStatus, Event, EventKind};
//!
//! let event = Event::AuthorizationChanged(AuthorizationStatus::AuthorizedWhenInUse);
//! assert_eq!(event.kind(), EventKind::AuthorizationChanged);
//! ```

pub mod error;
pub mod event;
pub mod model;
pub mod source;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::SensorError;
pub use event::{Event, EventKind};
pub use model::{
    AccuracyAuthorization, AuthorizationStatus, Beacon, BeaconConstraint, Coordinate, Heading,
    Location, Proximity, Region, RegionState, Visit,
};
pub use source::{Accuracy, ActivityType, LocationSource, SourceSettings};
