//! Event routing from the single upstream callback to registered performers
//!
//! The `EventRouter` owns the live performer set. Registration, cancellation
//! and dispatch all run under one lock, so a dispatch pass always sees a
//! stable set: a performer receives nothing before its registration
//! completes and nothing after its removal completes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use whereabouts_api::Event;

use crate::error::{RouterError, RouterResult};
use crate::performer::{Disposition, Performer, PerformerId, PerformerKind};

/// Configuration for the EventRouter
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Maximum number of live performers
    /// Default: 1024
    pub max_performers: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_performers: 1024,
        }
    }
}

struct RouterState {
    /// Live performers in registration order
    performers: Vec<Performer>,
    max_performers: usize,
    events_dispatched: u64,
}

/// Routes upstream events to the performers interested in them.
///
/// Cloning yields another handle to the same live set; the platform adapter
/// keeps one to call [`dispatch`](Self::dispatch) and the public surface
/// keeps another to register and cancel.
#[derive(Clone)]
pub struct EventRouter {
    state: Arc<Mutex<RouterState>>,
}

impl EventRouter {
    /// Create a router with the default configuration
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            state: Arc::new(Mutex::new(RouterState {
                performers: Vec::new(),
                max_performers: config.max_performers,
                events_dispatched: 0,
            })),
        }
    }

    /// Add a performer to the live set.
    ///
    /// A duplicate identity is rejected and the live performer is left
    /// untouched. The rejected performer is dropped, so its slot or sink
    /// closes without ever resolving.
    pub fn register(&self, performer: Performer) -> RouterResult<PerformerId> {
        let mut state = self.state.lock();
        let id = performer.id();

        if state.performers.iter().any(|p| p.id() == id) {
            tracing::warn!("Rejected duplicate registration of {}", id);
            return Err(RouterError::DuplicatePerformer(id));
        }

        if state.performers.len() >= state.max_performers {
            tracing::warn!(
                "Rejected {} ({}): router full at {} performers",
                id,
                performer.kind(),
                state.max_performers
            );
            return Err(RouterError::RouterFull {
                max_performers: state.max_performers,
            });
        }

        tracing::debug!("Registered {} ({})", id, performer.kind());
        state.performers.push(performer);
        Ok(id)
    }

    /// Deliver `event` to every interested performer, in registration order.
    ///
    /// Performers that resolved, or whose consumer has gone away, are removed
    /// before the lock is released. Returns how many performers received the
    /// event.
    pub fn dispatch(&self, event: &Event) -> usize {
        let mut state = self.state.lock();
        state.events_dispatched += 1;

        let mut delivered = 0;
        let mut finished: Vec<PerformerId> = Vec::new();

        for performer in state.performers.iter_mut() {
            if !performer.interest(event) {
                continue;
            }

            delivered += 1;
            tracing::trace!("Delivering {} to {}", event.kind(), performer.id());

            if performer.handle(event) == Disposition::Remove {
                finished.push(performer.id());
            }
        }

        if !finished.is_empty() {
            state.performers.retain(|p| !finished.contains(&p.id()));
            tracing::debug!(
                "Removed {} finished performer(s) after {}",
                finished.len(),
                event.kind()
            );
        }

        delivered
    }

    /// Remove the performer with `id`, if present.
    ///
    /// An unresolved slot is dropped without resolving. Returns whether a
    /// performer was removed; an absent identity is a no-op.
    pub fn cancel(&self, id: PerformerId) -> bool {
        let mut state = self.state.lock();
        match state.performers.iter().position(|p| p.id() == id) {
            Some(index) => {
                let performer = state.performers.remove(index);
                tracing::debug!("Cancelled {} ({})", id, performer.kind());
                true
            }
            None => false,
        }
    }

    /// Remove the performer with `id` and report how many remaining
    /// performers share its upstream command.
    ///
    /// Both happen under one lock, so two concurrent detaches of the last two
    /// siblings cannot both observe a remainder of one. Returns `None` if
    /// the performer was no longer registered.
    pub fn detach(&self, id: PerformerId) -> Option<usize> {
        let mut state = self.state.lock();
        let index = state.performers.iter().position(|p| p.id() == id)?;
        let performer = state.performers.remove(index);
        let remaining = state
            .performers
            .iter()
            .filter(|p| p.shares_upstream(&performer))
            .count();

        tracing::debug!(
            "Detached {} ({}), {} sibling(s) remain",
            id,
            performer.kind(),
            remaining
        );
        Some(remaining)
    }

    /// Remove every performer of `kind`. Returns how many were removed.
    pub fn cancel_kind(&self, kind: PerformerKind) -> usize {
        self.cancel_kind_where(kind, |_| true)
    }

    /// Remove every performer of `kind` for which `predicate` holds.
    ///
    /// Used to stop one region or beacon registration while siblings of
    /// the same kind continue.
    pub fn cancel_kind_where<F>(&self, kind: PerformerKind, predicate: F) -> usize
    where
        F: Fn(&Performer) -> bool,
    {
        let mut state = self.state.lock();
        let before = state.performers.len();
        state
            .performers
            .retain(|p| !(p.kind() == kind && predicate(p)));
        let removed = before - state.performers.len();

        if removed > 0 {
            tracing::debug!("Cancelled {} {} performer(s)", removed, kind);
        }
        removed
    }

    /// Remove every performer. Returns how many were removed.
    pub fn cancel_all(&self) -> usize {
        let mut state = self.state.lock();
        let removed = state.performers.len();
        state.performers.clear();
        if removed > 0 {
            tracing::debug!("Cancelled all {} performer(s)", removed);
        }
        removed
    }

    pub fn contains(&self, id: PerformerId) -> bool {
        self.state.lock().performers.iter().any(|p| p.id() == id)
    }

    /// Number of live performers
    pub fn len(&self) -> usize {
        self.state.lock().performers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().performers.is_empty()
    }

    /// Number of live performers of `kind`
    pub fn count_kind(&self, kind: PerformerKind) -> usize {
        self.state
            .lock()
            .performers
            .iter()
            .filter(|p| p.kind() == kind)
            .count()
    }

    /// Identities of live performers, in registration order
    pub fn performer_ids(&self) -> Vec<PerformerId> {
        self.state.lock().performers.iter().map(|p| p.id()).collect()
    }

    /// Get statistics about the router
    pub fn stats(&self) -> RouterStats {
        let state = self.state.lock();
        let mut kind_breakdown = HashMap::new();
        for performer in &state.performers {
            *kind_breakdown.entry(performer.kind()).or_insert(0) += 1;
        }

        RouterStats {
            total_performers: state.performers.len(),
            max_performers: state.max_performers,
            events_dispatched: state.events_dispatched,
            kind_breakdown,
        }
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("EventRouter")
            .field("performers", &state.performers.len())
            .field("max_performers", &state.max_performers)
            .finish()
    }
}

/// Statistics about the router state
#[derive(Debug, Clone)]
pub struct RouterStats {
    pub total_performers: usize,
    pub max_performers: usize,
    pub events_dispatched: u64,
    pub kind_breakdown: HashMap<PerformerKind, usize>,
}

impl fmt::Display for RouterStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Router Stats:")?;
        writeln!(f, "  Performers: {}/{}", self.total_performers, self.max_performers)?;
        writeln!(f, "  Events dispatched: {}", self.events_dispatched)?;
        writeln!(f, "  Kind breakdown:")?;
        for (kind, count) in &self.kind_breakdown {
            writeln!(f, "    {}: {}", kind, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{Sink, Slot};
    use crate::updates::{LocationUpdate, RegionEvent};
    use std::time::UNIX_EPOCH;
    use whereabouts_api::{AuthorizationStatus, Coordinate, Location, Region, SensorError};

    fn region(id: &str) -> Region {
        Region::new(id, Coordinate::new(37.33, -122.03), 100.0)
    }

    fn batch(lat: f64) -> Event {
        Event::LocationsUpdated(vec![
            Location::new(Coordinate::new(lat, 0.0), 5.0).with_timestamp(UNIX_EPOCH)
        ])
    }

    #[test]
    fn test_register_and_dispatch() {
        let router = EventRouter::new();
        let (sink, mut rx) = Sink::channel();
        let id = router.register(Performer::location_updates(sink)).unwrap();

        assert!(router.contains(id));
        assert_eq!(router.len(), 1);
        assert_eq!(router.dispatch(&batch(1.0)), 1);
        assert!(matches!(rx.try_recv(), Ok(LocationUpdate::Locations(_))));

        // Not interested
        assert_eq!(
            router.dispatch(&Event::AuthorizationChanged(AuthorizationStatus::Denied)),
            0
        );
    }

    #[test]
    fn test_single_shot_resolves_once() {
        let router = EventRouter::new();
        let (slot, mut rx) = Slot::channel();
        let id = router.register(Performer::single_location(slot)).unwrap();

        assert_eq!(router.dispatch(&batch(1.0)), 1);
        assert!(!router.contains(id));
        assert_eq!(router.dispatch(&batch(2.0)), 0);

        let resolved = rx.try_recv().unwrap().unwrap();
        assert_eq!(resolved.coordinate.latitude, 1.0);
    }

    #[test]
    fn test_cancel_absent_identity_is_noop() {
        let router = EventRouter::new();
        let (sink, _rx) = Sink::<LocationUpdate>::channel();
        let id = router.register(Performer::location_updates(sink)).unwrap();

        assert!(!router.cancel(PerformerId::new(u64::MAX)));
        assert_eq!(router.performer_ids(), vec![id]);

        assert!(router.cancel(id));
        assert!(!router.cancel(id));
        assert!(router.is_empty());
    }

    #[test]
    fn test_cancelled_slot_is_not_resolved() {
        let router = EventRouter::new();
        let (slot, mut rx) = Slot::channel();
        let id = router.register(Performer::single_location(slot)).unwrap();

        assert!(router.cancel(id));
        assert_eq!(router.dispatch(&batch(1.0)), 0);
        // Sender dropped unresolved
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_targeted_cancellation_keeps_siblings() {
        let router = EventRouter::new();
        let (a_sink, mut a_rx) = Sink::channel();
        let (b_sink, mut b_rx) = Sink::channel();
        router
            .register(Performer::region_monitor(region("a"), a_sink))
            .unwrap();
        let b = router
            .register(Performer::region_monitor(region("b"), b_sink))
            .unwrap();

        let removed = router.cancel_kind_where(PerformerKind::RegionMonitor, |p| {
            p.region() == Some(&region("a"))
        });
        assert_eq!(removed, 1);
        assert_eq!(router.performer_ids(), vec![b]);

        assert_eq!(router.dispatch(&Event::RegionEntered(region("b"))), 1);
        assert_eq!(b_rx.try_recv().unwrap(), RegionEvent::Entered(region("b")));

        assert_eq!(router.dispatch(&Event::RegionEntered(region("a"))), 0);
        assert!(a_rx.try_recv().is_err());
    }

    #[test]
    fn test_cancel_kind() {
        let router = EventRouter::new();
        for _ in 0..3 {
            let (sink, _rx) = Sink::<LocationUpdate>::channel();
            router.register(Performer::location_updates(sink)).unwrap();
        }
        let (slot, _rx) = Slot::channel();
        router.register(Performer::authorization_request(slot)).unwrap();

        assert_eq!(router.cancel_kind(PerformerKind::LocationUpdates), 3);
        assert_eq!(router.cancel_kind(PerformerKind::LocationUpdates), 0);
        assert_eq!(router.count_kind(PerformerKind::AuthorizationRequest), 1);
    }

    #[test]
    fn test_closed_sink_is_removed_on_dispatch() {
        let router = EventRouter::new();
        let (sink, rx) = Sink::<LocationUpdate>::channel();
        let id = router.register(Performer::location_updates(sink)).unwrap();
        drop(rx);

        assert_eq!(router.dispatch(&Event::LocationUpdatesPaused), 1);
        assert!(!router.contains(id));
    }

    #[test]
    fn test_detach_reports_remaining_siblings() {
        let router = EventRouter::new();
        let (a, _ra) = Sink::<RegionEvent>::channel();
        let (b, _rb) = Sink::<RegionEvent>::channel();
        let (c, _rc) = Sink::<RegionEvent>::channel();
        let first = router.register(Performer::region_monitor(region("a"), a)).unwrap();
        let second = router.register(Performer::region_monitor(region("a"), b)).unwrap();
        let other = router.register(Performer::region_monitor(region("b"), c)).unwrap();

        assert_eq!(router.detach(first), Some(1));
        assert_eq!(router.detach(second), Some(0));
        assert_eq!(router.detach(second), None);
        assert_eq!(router.detach(other), Some(0));
    }

    #[test]
    fn test_router_full() {
        let router = EventRouter::with_config(RouterConfig { max_performers: 1 });
        let (a, _ra) = Sink::<LocationUpdate>::channel();
        let (b, _rb) = Sink::<LocationUpdate>::channel();

        assert!(router.register(Performer::location_updates(a)).is_ok());
        let result = router.register(Performer::location_updates(b));
        assert_eq!(result, Err(RouterError::RouterFull { max_performers: 1 }));
    }

    #[test]
    fn test_failure_isolated_to_interested_performers() {
        let router = EventRouter::new();
        let (slot, mut slot_rx) = Slot::channel();
        let (sink, mut sink_rx) = Sink::channel();
        let (auth, _auth_rx) = Slot::channel();
        router.register(Performer::single_location(slot)).unwrap();
        router.register(Performer::location_updates(sink)).unwrap();
        let auth_id = router.register(Performer::authorization_request(auth)).unwrap();

        let failure = Event::LocationFailed(SensorError::LocationUnknown);
        assert_eq!(router.dispatch(&failure), 2);

        assert_eq!(slot_rx.try_recv().unwrap(), Err(SensorError::LocationUnknown));
        assert_eq!(
            sink_rx.try_recv().unwrap(),
            LocationUpdate::Failed(SensorError::LocationUnknown)
        );
        assert!(router.contains(auth_id));
        assert_eq!(router.len(), 2);
    }

    #[test]
    fn test_stats() {
        let router = EventRouter::new();
        let (sink, _rx) = Sink::<LocationUpdate>::channel();
        router.register(Performer::location_updates(sink)).unwrap();
        router.dispatch(&Event::LocationUpdatesResumed);

        let stats = router.stats();
        assert_eq!(stats.total_performers, 1);
        assert_eq!(stats.events_dispatched, 1);
        assert_eq!(
            stats.kind_breakdown.get(&PerformerKind::LocationUpdates),
            Some(&1)
        );
        assert!(stats.to_string().contains("LocationUpdates: 1"));
    }

    #[test]
    fn test_clones_share_state() {
        let router = EventRouter::new();
        let adapter_handle = router.clone();
        let (sink, mut rx) = Sink::channel();
        router.register(Performer::location_updates(sink)).unwrap();

        assert_eq!(adapter_handle.dispatch(&Event::LocationUpdatesPaused), 1);
        assert_eq!(rx.try_recv().unwrap(), LocationUpdate::Paused);
    }
}
