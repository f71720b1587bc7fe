//! Payload types carried by upstream events

pub mod authorization;
pub mod beacon;
pub mod heading;
pub mod location;
pub mod region;
pub mod visit;

pub use authorization::{AccuracyAuthorization, AuthorizationStatus};
pub use beacon::{Beacon, BeaconConstraint, Proximity};
pub use heading::Heading;
pub use location::{Coordinate, Location};
pub use region::{Region, RegionState};
pub use visit::Visit;
