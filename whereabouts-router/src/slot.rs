//! Resolution endpoints held by performers
//!
//! A [`Slot`] is single-use: resolving takes the sender out, so a second
//! resolution has nothing to send on. A [`Sink`] forwards any number of
//! values until its consumer goes away.

use tokio::sync::{mpsc, oneshot};

use crate::performer::Disposition;

/// Single-shot resolution slot
#[derive(Debug)]
pub struct Slot<T> {
    sender: Option<oneshot::Sender<T>>,
}

impl<T> Slot<T> {
    /// Create a slot and the receiver its resolution arrives on
    pub fn channel() -> (Self, oneshot::Receiver<T>) {
        let (tx, rx) = oneshot::channel();
        (Self { sender: Some(tx) }, rx)
    }

    /// Resolve the slot with `value`
    ///
    /// Always answers [`Disposition::Remove`]: a resolved slot has no further
    /// use, and a slot whose receiver was dropped (the awaiting task was
    /// cancelled) must leave the router all the same.
    pub fn resolve(&mut self, value: T) -> Disposition {
        if let Some(sender) = self.sender.take() {
            if sender.send(value).is_err() {
                tracing::trace!("Slot receiver already dropped, discarding resolution");
            }
        }
        Disposition::Remove
    }

    /// Whether the slot still waits for its resolution
    pub fn is_pending(&self) -> bool {
        self.sender.as_ref().map_or(false, |tx| !tx.is_closed())
    }
}

/// Streaming sink
#[derive(Debug)]
pub struct Sink<T> {
    sender: mpsc::UnboundedSender<T>,
}

impl<T> Sink<T> {
    /// Create a sink and the receiver its values arrive on
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { sender: tx }, rx)
    }

    /// Forward `value` to the consumer
    ///
    /// Answers [`Disposition::Remove`] once the consumer is gone.
    pub fn forward(&self, value: T) -> Disposition {
        match self.sender.send(value) {
            Ok(()) => Disposition::Retain,
            Err(_) => Disposition::Remove,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_resolves_once() {
        let (mut slot, mut rx) = Slot::channel();
        assert!(slot.is_pending());

        assert_eq!(slot.resolve(1), Disposition::Remove);
        assert!(!slot.is_pending());
        assert_eq!(slot.resolve(2), Disposition::Remove);

        assert_eq!(rx.try_recv().unwrap(), 1);
    }

    #[test]
    fn test_slot_with_dropped_receiver() {
        let (mut slot, rx) = Slot::channel();
        drop(rx);
        assert!(!slot.is_pending());
        assert_eq!(slot.resolve("late"), Disposition::Remove);
    }

    #[test]
    fn test_sink_forwards_until_closed() {
        let (sink, mut rx) = Sink::channel();
        assert_eq!(sink.forward(1), Disposition::Retain);
        assert_eq!(sink.forward(2), Disposition::Retain);
        assert_eq!(rx.try_recv().unwrap(), 1);
        assert_eq!(rx.try_recv().unwrap(), 2);

        drop(rx);
        assert!(sink.is_closed());
        assert_eq!(sink.forward(3), Disposition::Remove);
    }
}
