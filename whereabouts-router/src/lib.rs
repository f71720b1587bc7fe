//! # whereabouts-router
//!
//! The fan-out core of the bridge. The platform allows a single callback
//! receiver; this crate turns that one slot into many logical consumers.
//!
//! - [`Performer`]: a registered unit of interest with a single-shot
//!   [`Slot`] or a streaming [`Sink`]
//! - [`EventRouter`]: owns the live performers, dispatches every upstream
//!   [`Event`](whereabouts_api::Event) to the interested ones, and offers
//!   cancellation by identity, by kind, and by kind plus predicate
//!
//! ## Removal without back-references
//!
//! Performers never hold a pointer to the router. Handling an event yields a
//! [`Disposition`]; the router drops every performer that answered
//! [`Disposition::Remove`] before the dispatch pass releases its lock. A
//! single-shot performer therefore resolves and leaves the live set within
//! the same critical section, and no later event can reach it.
//!
//! ```rust
//! use whereabouts_api::{AuthorizationStatus, Event};
//! use whereabouts_router::{EventRouter, Performer, Slot};
//!
//! let router = EventRouter::new();
//! let (slot, mut rx) = Slot::channel();
//! let id = router.register(Performer::authorization_request(slot)).unwrap();
//!
//! // Transitional status: ignored
//! assert_eq!(router.dispatch(&Event::AuthorizationChanged(AuthorizationStatus::NotDetermined)), 0);
//! // Decisive status: resolves and deregisters
//! assert_eq!(router.dispatch(&Event::AuthorizationChanged(AuthorizationStatus::Denied)), 1);
//! assert!(!router.contains(id));
//! assert_eq!(rx.try_recv().unwrap(), AuthorizationStatus::Denied);
//! ```

pub mod error;
pub mod performer;
pub mod router;
pub mod slot;
pub mod updates;

pub use error::{RouterError, RouterResult};
pub use performer::{Disposition, Performer, PerformerId, PerformerKind};
pub use router::{EventRouter, RouterConfig, RouterStats};
pub use slot::{Sink, Slot};
pub use updates::{BeaconEvent, HeadingEvent, LocationUpdate, RegionEvent, VisitEvent};
