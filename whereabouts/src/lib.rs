//! # whereabouts - async location services over a callback-driven sensor API
//!
//! Turns the platform's single-callback location service into awaitable
//! requests and independent update streams:
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use whereabouts::{LocationManager, ManagerConfig, LocationUpdate};
//!
//! async fn run(source: std::sync::Arc<dyn whereabouts::LocationSource>) -> whereabouts::Result<()> {
//!     let manager = LocationManager::new(source, ManagerConfig::default())?;
//!     // Hand manager.router() to the adapter that owns the platform callbacks
//!
//!     let status = manager.request_authorization_when_in_use().await?;
//!     if !status.is_authorized() {
//!         return Ok(());
//!     }
//!
//!     let here = manager.request_location().await?;
//!     println!("Starting at {}", here.coordinate);
//!
//!     let mut updates = manager.start_updating_location()?;
//!     while let Some(update) = updates.next().await {
//!         if let LocationUpdate::Locations(batch) = update {
//!             println!("{} new reading(s)", batch.len());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Awaitable one-shots**: authorization, a single location, temporary full accuracy
//! - **Independent streams**: any number of consumers per capability; each one
//!   sees every update in order
//! - **Cancellation by drop**: dropping a request or stream deregisters it, and
//!   the upstream command stops when its last consumer goes away
//! - **Optional timeouts** for one-shot requests via [`ManagerConfig`]
//!
//! ## Architecture
//!
//! ```text
//! whereabouts (LocationManager, UpdateStream)
//!     ↓
//! whereabouts-router (EventRouter, Performer)
//!     ↓
//! whereabouts-api (Event, LocationSource, model types)
//! ```

pub mod config;
pub mod error;
pub mod logging;
mod manager;
mod stream;

pub use config::ManagerConfig;
pub use error::{LocationError, Result};
pub use manager::LocationManager;
pub use stream::UpdateStream;

// Re-export commonly used types from the lower layers
pub use whereabouts_api::{
    Accuracy, AccuracyAuthorization, ActivityType, AuthorizationStatus, Beacon, BeaconConstraint,
    Coordinate, Event, Heading, Location, LocationSource, Proximity, Region, RegionState,
    SensorError, SourceSettings, Visit,
};
pub use whereabouts_router::{
    BeaconEvent, EventRouter, HeadingEvent, LocationUpdate, PerformerId, PerformerKind,
    RegionEvent, RouterError, RouterStats, VisitEvent,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AuthorizationStatus, Location, LocationError, LocationManager, LocationUpdate,
        ManagerConfig, Region, RegionEvent, UpdateStream,
    };
    pub use futures::StreamExt;
}
