//! Update streams handed out by the manager
//!
//! An [`UpdateStream`] yields every update its performer receives, in order.
//! Dropping or closing it deregisters the performer and, if it was the last
//! consumer of its upstream command, stops that command.

use futures::Stream;
use parking_lot::Mutex;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::mpsc;

use whereabouts_api::LocationSource;
use whereabouts_router::{EventRouter, PerformerId};

/// Upstream stop command for one capability
pub(crate) type StopCommand = Box<dyn FnOnce(&dyn LocationSource) + Send + Sync>;

/// Deregistration owed by an open stream
pub(crate) struct Teardown {
    pub(crate) id: PerformerId,
    pub(crate) router: EventRouter,
    pub(crate) source: Arc<dyn LocationSource>,
    pub(crate) commands: Arc<Mutex<()>>,
    pub(crate) stop: StopCommand,
}

impl Teardown {
    fn run(self) {
        let _commands = self.commands.lock();
        match self.router.detach(self.id) {
            Some(0) => {
                tracing::debug!("Last consumer of {} gone, stopping upstream", self.id);
                (self.stop)(self.source.as_ref());
            }
            Some(remaining) => {
                tracing::trace!("{} closed, {} sibling(s) keep upstream alive", self.id, remaining);
            }
            // Already removed by an explicit stop, which issued its own command
            None => {}
        }
    }
}

/// A stream of updates for one registered performer
///
/// Implements [`futures::Stream`]; the stream ends once the performer has
/// been removed by an explicit stop or by [`LocationManager::cancel_all`].
///
/// [`LocationManager::cancel_all`]: crate::LocationManager::cancel_all
pub struct UpdateStream<T> {
    id: PerformerId,
    receiver: mpsc::UnboundedReceiver<T>,
    teardown: Option<Teardown>,
}

impl<T> UpdateStream<T> {
    pub(crate) fn new(receiver: mpsc::UnboundedReceiver<T>, teardown: Teardown) -> Self {
        Self {
            id: teardown.id,
            receiver,
            teardown: Some(teardown),
        }
    }

    /// Identity of the performer feeding this stream
    pub fn performer_id(&self) -> PerformerId {
        self.id
    }

    /// Receive the next update, or `None` once the stream has ended
    pub async fn recv(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Receive the next update with a timeout
    ///
    /// Returns `Ok(None)` if the stream ended and `Err(elapsed)` if nothing
    /// arrived in time.
    pub async fn recv_timeout(
        &mut self,
        timeout: Duration,
    ) -> Result<Option<T>, tokio::time::error::Elapsed> {
        tokio::time::timeout(timeout, self.receiver.recv()).await
    }

    /// Take an update that is already queued, without waiting
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Whether this stream still owes its deregistration
    pub fn is_open(&self) -> bool {
        self.teardown.is_some()
    }

    /// Deregister now instead of on drop
    ///
    /// Updates already queued can still be drained afterwards. Closing twice
    /// is a no-op.
    pub fn close(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown.run();
        }
        self.receiver.close();
    }
}

impl<T> Stream for UpdateStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}

impl<T> Drop for UpdateStream<T> {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown.run();
        }
    }
}

impl<T> std::fmt::Debug for UpdateStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateStream")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .finish()
    }
}
