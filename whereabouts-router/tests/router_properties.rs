//! Property-based tests for the event router
//!
//! Random interleavings of registrations, cancellations and dispatched
//! events are checked against a small model of who should receive what.

use proptest::prelude::*;
use std::time::UNIX_EPOCH;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::oneshot;

use whereabouts_api::{
    AuthorizationStatus, Coordinate, Event, Heading, Location, Region, SensorError,
};
use whereabouts_router::{
    EventRouter, HeadingEvent, LocationUpdate, Performer, PerformerId, RegionEvent, Sink, Slot,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn region(id: &str) -> Region {
    Region::new(id, Coordinate::new(51.5, -0.12), 300.0)
}

/// Event table indexed by the generated event code
fn event(code: u8) -> Event {
    match code {
        0 => Event::RegionEntered(region("a")),
        1 => Event::RegionExited(region("b")),
        2 => Event::LocationsUpdated(vec![
            Location::new(Coordinate::new(51.5, -0.12), 8.0).with_timestamp(UNIX_EPOCH)
        ]),
        3 => Event::HeadingUpdated(Heading {
            magnetic: 12.0,
            true_heading: 14.0,
            accuracy: 2.0,
            timestamp: UNIX_EPOCH,
        }),
        4 => Event::LocationFailed(SensorError::Network),
        _ => Event::AuthorizationChanged(AuthorizationStatus::Denied),
    }
}

/// Which event codes each performer code should receive
///
/// Codes 0-3 are streams; 4 (single location) and 5 (authorization
/// request) are single-shot.
fn model_interest(performer: u8, event: u8) -> bool {
    matches!(
        (performer, event),
        (0, 2) | (0, 4) | (1, 0) | (2, 1) | (3, 3) | (3, 4) | (4, 2) | (4, 4) | (5, 5)
    )
}

fn is_single_shot(performer: u8) -> bool {
    performer >= 4
}

enum Receiver {
    Location(UnboundedReceiver<LocationUpdate>),
    Region(UnboundedReceiver<RegionEvent>),
    Heading(UnboundedReceiver<HeadingEvent>),
    SingleLocation(oneshot::Receiver<Result<Location, SensorError>>),
    Authorization(oneshot::Receiver<AuthorizationStatus>),
}

impl Receiver {
    fn drain(&mut self) -> Vec<String> {
        let mut received = Vec::new();
        match self {
            Receiver::Location(rx) => {
                while let Ok(update) = rx.try_recv() {
                    received.push(format!("{:?}", update));
                }
            }
            Receiver::Region(rx) => {
                while let Ok(update) = rx.try_recv() {
                    received.push(format!("{:?}", update));
                }
            }
            Receiver::Heading(rx) => {
                while let Ok(update) = rx.try_recv() {
                    received.push(format!("{:?}", update));
                }
            }
            Receiver::SingleLocation(rx) => {
                if let Ok(resolved) = rx.try_recv() {
                    received.push(format!("{:?}", resolved));
                }
            }
            Receiver::Authorization(rx) => {
                if let Ok(status) = rx.try_recv() {
                    received.push(format!("{:?}", status));
                }
            }
        }
        received
    }

    fn expected(&self, code: u8) -> String {
        let event = event(code);
        match self {
            Receiver::Location(_) => format!("{:?}", LocationUpdate::from_event(&event).unwrap()),
            Receiver::Region(_) => format!("{:?}", RegionEvent::from_event(&event).unwrap()),
            Receiver::Heading(_) => format!("{:?}", HeadingEvent::from_event(&event).unwrap()),
            Receiver::SingleLocation(_) => {
                let resolved: Result<Location, SensorError> = match event {
                    Event::LocationsUpdated(batch) => Ok(batch.last().unwrap().clone()),
                    Event::LocationFailed(error) => Err(error),
                    other => panic!("single location never receives {:?}", other),
                };
                format!("{:?}", resolved)
            }
            Receiver::Authorization(_) => match event {
                Event::AuthorizationChanged(status) => format!("{:?}", status),
                other => panic!("authorization request never receives {:?}", other),
            },
        }
    }
}

struct Tracked {
    id: PerformerId,
    code: u8,
    live: bool,
    receiver: Receiver,
    expected: Vec<u8>,
}

fn register(router: &EventRouter, code: u8) -> Tracked {
    let (performer, receiver) = match code {
        0 => {
            let (sink, rx) = Sink::channel();
            (Performer::location_updates(sink), Receiver::Location(rx))
        }
        1 => {
            let (sink, rx) = Sink::channel();
            (Performer::region_monitor(region("a"), sink), Receiver::Region(rx))
        }
        2 => {
            let (sink, rx) = Sink::channel();
            (Performer::region_monitor(region("b"), sink), Receiver::Region(rx))
        }
        3 => {
            let (sink, rx) = Sink::channel();
            (Performer::heading_updates(sink), Receiver::Heading(rx))
        }
        4 => {
            let (slot, rx) = Slot::channel();
            (Performer::single_location(slot), Receiver::SingleLocation(rx))
        }
        _ => {
            let (slot, rx) = Slot::channel();
            (Performer::authorization_request(slot), Receiver::Authorization(rx))
        }
    };
    let id = router.register(performer).unwrap();
    Tracked {
        id,
        code,
        live: true,
        receiver,
        expected: Vec::new(),
    }
}

#[derive(Debug, Clone)]
enum Op {
    Register(u8),
    Cancel(usize),
    Dispatch(u8),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6).prop_map(Op::Register),
        (0usize..16).prop_map(Op::Cancel),
        (0u8..6).prop_map(Op::Dispatch),
    ]
}

// ============================================================================
// Delivery follows interest, registration and order
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every performer receives exactly the events its interest admits while
    /// it is registered, in arrival order, and nothing after removal.
    /// Single-shot performers leave after their first matching event.
    #[test]
    fn prop_delivery_matches_model(ops in prop::collection::vec(op_strategy(), 1..60)) {
        let router = EventRouter::new();
        let mut tracked: Vec<Tracked> = Vec::new();

        for op in ops {
            match op {
                Op::Register(code) => tracked.push(register(&router, code)),
                Op::Cancel(index) => {
                    if let Some(entry) = tracked.get_mut(index) {
                        let removed = router.cancel(entry.id);
                        prop_assert_eq!(removed, entry.live);
                        entry.live = false;
                    }
                }
                Op::Dispatch(code) => {
                    let mut interested = 0;
                    for entry in tracked.iter_mut().filter(|t| t.live) {
                        if model_interest(entry.code, code) {
                            entry.expected.push(code);
                            interested += 1;
                            if is_single_shot(entry.code) {
                                entry.live = false;
                            }
                        }
                    }
                    prop_assert_eq!(router.dispatch(&event(code)), interested);
                }
            }
        }

        for entry in tracked.iter_mut() {
            if is_single_shot(entry.code) {
                prop_assert!(entry.expected.len() <= 1);
            }
            let expected: Vec<String> = entry
                .expected
                .iter()
                .map(|code| entry.receiver.expected(*code))
                .collect();
            prop_assert_eq!(entry.receiver.drain(), expected);
        }

        let live = tracked.iter().filter(|t| t.live).count();
        prop_assert_eq!(router.len(), live);
    }

    /// A single-shot performer sees only the first matching event; every
    /// later one reaches zero performers.
    #[test]
    fn prop_single_shot_resolves_at_most_once(extra in 1usize..10) {
        let router = EventRouter::new();
        let (slot, mut rx) = Slot::channel();
        let id = router.register(Performer::single_location(slot)).unwrap();

        prop_assert_eq!(router.dispatch(&event(2)), 1);
        prop_assert!(!router.contains(id));
        for _ in 0..extra {
            prop_assert_eq!(router.dispatch(&event(2)), 0);
            prop_assert_eq!(router.dispatch(&event(4)), 0);
        }

        prop_assert!(rx.try_recv().unwrap().is_ok());
        prop_assert!(router.is_empty());
    }

    /// One dispatch pass removes every resolved single-shot and keeps the
    /// streams registered between them, in their original order.
    #[test]
    fn prop_one_pass_removes_resolved_keeps_streams(
        layout in prop::collection::vec(any::<bool>(), 1..20)
    ) {
        let router = EventRouter::new();
        let mut slots = Vec::new();
        let mut streams = Vec::new();

        for single_shot in &layout {
            if *single_shot {
                let (slot, rx) = Slot::channel();
                router.register(Performer::single_location(slot)).unwrap();
                slots.push(rx);
            } else {
                let (sink, rx) = Sink::channel();
                let id = router.register(Performer::location_updates(sink)).unwrap();
                streams.push((id, rx));
            }
        }

        prop_assert_eq!(router.dispatch(&event(4)), layout.len());

        let kept: Vec<PerformerId> = streams.iter().map(|(id, _)| *id).collect();
        prop_assert_eq!(router.performer_ids(), kept);
        for rx in slots.iter_mut() {
            prop_assert_eq!(rx.try_recv().unwrap(), Err(SensorError::Network));
        }
        for (_, rx) in streams.iter_mut() {
            prop_assert_eq!(rx.try_recv().unwrap(), LocationUpdate::Failed(SensorError::Network));
        }

        prop_assert_eq!(router.dispatch(&event(4)), streams.len());
    }

    /// Cancelling identities that were never registered changes nothing.
    #[test]
    fn prop_cancel_absent_is_noop(raw in prop::collection::vec(any::<u64>(), 1..20)) {
        let router = EventRouter::new();
        let (sink, _rx) = Sink::<LocationUpdate>::channel();
        let id = router.register(Performer::location_updates(sink)).unwrap();

        for value in raw {
            let candidate = PerformerId::new(value);
            if candidate == id {
                continue;
            }
            prop_assert!(!router.cancel(candidate));
            prop_assert_eq!(router.performer_ids(), vec![id]);
        }
    }
}
