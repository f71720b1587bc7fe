//! LocationManager: the consumer-facing API
//!
//! Every operation registers a performer with the router, then issues the
//! matching command to the source. One-shot operations await their slot;
//! stream operations hand back an [`UpdateStream`].

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;

use whereabouts_api::{
    Accuracy, AccuracyAuthorization, AuthorizationStatus, BeaconConstraint, Location,
    LocationSource, Region, SourceSettings,
};
use whereabouts_router::{
    BeaconEvent, EventRouter, HeadingEvent, LocationUpdate, Performer, PerformerId,
    PerformerKind, RegionEvent, RouterConfig, RouterStats, Sink, Slot, VisitEvent,
};

use crate::config::ManagerConfig;
use crate::error::{LocationError, Result};
use crate::stream::{StopCommand, Teardown, UpdateStream};

/// Which authorization prompt to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthorizationPrompt {
    WhenInUse,
    Always,
}

impl AuthorizationPrompt {
    /// Whether `status` already answers this prompt
    fn is_settled_by(self, status: AuthorizationStatus) -> bool {
        match self {
            AuthorizationPrompt::WhenInUse => status.is_determined(),
            AuthorizationPrompt::Always => matches!(
                status,
                AuthorizationStatus::AuthorizedAlways
                    | AuthorizationStatus::Denied
                    | AuthorizationStatus::Restricted
            ),
        }
    }
}

/// Awaitable, cancellable location operations over a single [`LocationSource`]
///
/// The adapter that owns the platform callback receiver forwards every
/// callback into [`router()`](Self::router) with
/// [`EventRouter::dispatch`].
///
/// ```rust,ignore
/// let manager = LocationManager::new(source.clone(), ManagerConfig::default())?;
/// let adapter_router = manager.router();
///
/// let status = manager.request_authorization_when_in_use().await?;
/// if status.is_authorized() {
///     let here = manager.request_location().await?;
///     println!("We are at {}", here.coordinate);
/// }
/// ```
pub struct LocationManager {
    source: Arc<dyn LocationSource>,
    router: EventRouter,
    config: ManagerConfig,
    settings: Mutex<SourceSettings>,
    /// Serializes "register, then start" against "detach, then stop"
    commands: Arc<Mutex<()>>,
}

impl LocationManager {
    /// Create a manager over `source` and push the configured settings to it
    pub fn new(source: Arc<dyn LocationSource>, config: ManagerConfig) -> Result<Self> {
        config.validate()?;

        let router = EventRouter::with_config(RouterConfig {
            max_performers: config.max_performers,
        });
        let settings = config.settings();
        source.apply_settings(&settings);

        tracing::info!(
            "LocationManager created (accuracy: {:?}, max performers: {})",
            settings.desired_accuracy,
            config.max_performers
        );

        Ok(Self {
            source,
            router,
            config,
            settings: Mutex::new(settings),
            commands: Arc::new(Mutex::new(())),
        })
    }

    /// Create a manager with the default configuration
    pub fn with_defaults(source: Arc<dyn LocationSource>) -> Result<Self> {
        Self::new(source, ManagerConfig::default())
    }

    /// The router the adapter dispatches platform callbacks into
    pub fn router(&self) -> EventRouter {
        self.router.clone()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Snapshot of the registered performers
    pub fn stats(&self) -> RouterStats {
        self.router.stats()
    }

    // ========================================================================
    // Status queries
    // ========================================================================

    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.source.authorization_status()
    }

    pub fn accuracy_authorization(&self) -> AccuracyAuthorization {
        self.source.accuracy_authorization()
    }

    pub fn location_services_enabled(&self) -> bool {
        self.source.location_services_enabled()
    }

    // ========================================================================
    // Settings
    // ========================================================================

    /// Change the requested precision for subsequent readings
    pub fn update_accuracy(&self, accuracy: Accuracy) {
        let mut settings = self.settings.lock();
        settings.desired_accuracy = accuracy;
        self.source.apply_settings(&settings);
        tracing::debug!("Desired accuracy now {:?}", accuracy);
    }

    /// Allow or forbid updates while the application is in the background
    pub fn update_allows_background_updates(&self, allowed: bool) {
        let mut settings = self.settings.lock();
        settings.allows_background_updates = allowed;
        self.source.apply_settings(&settings);
        tracing::debug!("Background updates allowed: {}", allowed);
    }

    /// Settings most recently pushed to the source
    pub fn settings(&self) -> SourceSettings {
        self.settings.lock().clone()
    }

    // ========================================================================
    // One-shot operations
    // ========================================================================

    /// Ask for when-in-use authorization
    ///
    /// Resolves immediately with the current status if it is already
    /// determined. Otherwise resolves with the first determined status the
    /// platform reports; `NotDetermined` notifications are ignored.
    pub async fn request_authorization_when_in_use(&self) -> Result<AuthorizationStatus> {
        self.request_authorization(AuthorizationPrompt::WhenInUse)
            .await
    }

    /// Ask for always authorization
    ///
    /// Resolves immediately when the status is `AuthorizedAlways`, `Denied`
    /// or `Restricted`. From `AuthorizedWhenInUse` the upgrade prompt is
    /// issued and the next determined status is returned, which is
    /// `AuthorizedWhenInUse` again if the user declines.
    pub async fn request_authorization_always(&self) -> Result<AuthorizationStatus> {
        self.request_authorization(AuthorizationPrompt::Always).await
    }

    async fn request_authorization(&self, prompt: AuthorizationPrompt) -> Result<AuthorizationStatus> {
        let (slot, rx) = Slot::channel();
        self.perform_once(Performer::authorization_request(slot), rx, move |source| {
            let current = source.authorization_status();
            if prompt.is_settled_by(current) {
                tracing::debug!("Authorization already settled: {:?}", current);
                return Some(current);
            }
            match prompt {
                AuthorizationPrompt::WhenInUse => source.request_when_in_use_authorization(),
                AuthorizationPrompt::Always => source.request_always_authorization(),
            }
            None
        })
        .await
    }

    /// Request a single location reading
    ///
    /// Resolves with the most recent location of the first non-empty batch,
    /// or fails with the first location error.
    pub async fn request_location(&self) -> Result<Location> {
        let (slot, rx) = Slot::channel();
        let reading = self
            .perform_once(Performer::single_location(slot), rx, |source| {
                source.request_location();
                None
            })
            .await?;
        Ok(reading?)
    }

    /// Ask for temporary full accuracy, naming the usage description key
    ///
    /// Resolves immediately if accuracy is already full.
    pub async fn request_temporary_full_accuracy(
        &self,
        purpose_key: &str,
    ) -> Result<AccuracyAuthorization> {
        let purpose_key = purpose_key.to_string();
        let (slot, rx) = Slot::channel();
        self.perform_once(Performer::accuracy_request(slot), rx, move |source| {
            let current = source.accuracy_authorization();
            if current == AccuracyAuthorization::FullAccuracy {
                return Some(current);
            }
            source.request_temporary_full_accuracy(&purpose_key);
            None
        })
        .await
    }

    /// Register `performer`, then run `start` and await the slot
    ///
    /// `start` runs after registration, so a callback racing with it
    /// reaches the performer. Returning `Some` from `start` settles the
    /// operation without waiting and deregisters the performer.
    async fn perform_once<T, F>(
        &self,
        performer: Performer,
        rx: oneshot::Receiver<T>,
        start: F,
    ) -> Result<T>
    where
        F: FnOnce(&dyn LocationSource) -> Option<T>,
    {
        let kind = performer.kind();
        let pending = {
            let _commands = self.commands.lock();
            let id = self.router.register(performer)?;
            if let Some(settled) = start(self.source.as_ref()) {
                self.router.cancel(id);
                return Ok(settled);
            }
            PendingGuard {
                router: self.router.clone(),
                id,
                armed: true,
            }
        };
        tracing::debug!("Awaiting {} ({})", pending.id, kind);

        let received = match self.config.request_timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => received,
                Err(_) => {
                    tracing::warn!("{} ({}) timed out after {:?}", pending.id, kind, limit);
                    return Err(LocationError::Timeout(limit));
                }
            },
            None => rx.await,
        };

        match received {
            Ok(value) => {
                pending.disarm();
                Ok(value)
            }
            Err(_) => {
                tracing::debug!("{} ({}) cancelled before resolving", pending.id, kind);
                Err(LocationError::Cancelled)
            }
        }
    }

    // ========================================================================
    // Streams
    // ========================================================================

    /// Stream location batches, failures and pause/resume notifications
    pub fn start_updating_location(&self) -> Result<UpdateStream<LocationUpdate>> {
        let (sink, rx) = Sink::channel();
        self.open_stream(
            Performer::location_updates(sink),
            rx,
            |source| source.start_updating_location(),
            Box::new(|source: &dyn LocationSource| source.stop_updating_location()),
        )
    }

    /// End every location update stream and stop upstream updates
    pub fn stop_updating_location(&self) {
        self.stop_kind(PerformerKind::LocationUpdates, |source| {
            source.stop_updating_location()
        });
    }

    /// Stream boundary crossings and state reports for `region`
    pub fn start_monitoring(&self, region: Region) -> Result<UpdateStream<RegionEvent>> {
        let (sink, rx) = Sink::channel();
        let start_region = region.clone();
        let stop_region = region.clone();
        self.open_stream(
            Performer::region_monitor(region, sink),
            rx,
            move |source| source.start_monitoring(&start_region),
            Box::new(move |source: &dyn LocationSource| source.stop_monitoring(&stop_region)),
        )
    }

    /// End the streams monitoring `region` and stop monitoring it upstream
    ///
    /// Streams for other regions are unaffected.
    pub fn stop_monitoring(&self, region: &Region) {
        let _commands = self.commands.lock();
        self.router
            .cancel_kind_where(PerformerKind::RegionMonitor, |p| p.region() == Some(region));
        self.source.stop_monitoring(region);
    }

    /// Stream recorded visits
    pub fn start_monitoring_visits(&self) -> Result<UpdateStream<VisitEvent>> {
        let (sink, rx) = Sink::channel();
        self.open_stream(
            Performer::visit_monitor(sink),
            rx,
            |source| source.start_monitoring_visits(),
            Box::new(|source: &dyn LocationSource| source.stop_monitoring_visits()),
        )
    }

    pub fn stop_monitoring_visits(&self) {
        self.stop_kind(PerformerKind::VisitMonitor, |source| {
            source.stop_monitoring_visits()
        });
    }

    /// Stream compass headings
    pub fn start_updating_heading(&self) -> Result<UpdateStream<HeadingEvent>> {
        let (sink, rx) = Sink::channel();
        self.open_stream(
            Performer::heading_updates(sink),
            rx,
            |source| source.start_updating_heading(),
            Box::new(|source: &dyn LocationSource| source.stop_updating_heading()),
        )
    }

    pub fn stop_updating_heading(&self) {
        self.stop_kind(PerformerKind::HeadingUpdates, |source| {
            source.stop_updating_heading()
        });
    }

    /// Stream ranged beacons matching `constraint`
    pub fn start_ranging_beacons(
        &self,
        constraint: BeaconConstraint,
    ) -> Result<UpdateStream<BeaconEvent>> {
        let (sink, rx) = Sink::channel();
        let start_constraint = constraint.clone();
        let stop_constraint = constraint.clone();
        self.open_stream(
            Performer::beacon_ranging(constraint, sink),
            rx,
            move |source| source.start_ranging_beacons(&start_constraint),
            Box::new(move |source: &dyn LocationSource| source.stop_ranging_beacons(&stop_constraint)),
        )
    }

    /// End the streams ranging `constraint` and stop ranging it upstream
    pub fn stop_ranging_beacons(&self, constraint: &BeaconConstraint) {
        let _commands = self.commands.lock();
        self.router.cancel_kind_where(PerformerKind::BeaconRanging, |p| {
            p.beacon_constraint() == Some(constraint)
        });
        self.source.stop_ranging_beacons(constraint);
    }

    /// Stream every authorization status change, including `NotDetermined`
    ///
    /// Authorization changes always flow from the platform, so no upstream
    /// command is involved.
    pub fn start_monitoring_authorization(&self) -> Result<UpdateStream<AuthorizationStatus>> {
        let (sink, rx) = Sink::channel();
        self.open_stream(
            Performer::authorization_monitor(sink),
            rx,
            |_| {},
            Box::new(|_: &dyn LocationSource| {}),
        )
    }

    pub fn stop_monitoring_authorization(&self) {
        self.stop_kind(PerformerKind::AuthorizationMonitor, |_| {});
    }

    /// Stream every accuracy authorization change
    pub fn start_monitoring_accuracy_authorization(
        &self,
    ) -> Result<UpdateStream<AccuracyAuthorization>> {
        let (sink, rx) = Sink::channel();
        self.open_stream(
            Performer::accuracy_monitor(sink),
            rx,
            |_| {},
            Box::new(|_: &dyn LocationSource| {}),
        )
    }

    pub fn stop_monitoring_accuracy_authorization(&self) {
        self.stop_kind(PerformerKind::AccuracyMonitor, |_| {});
    }

    /// Deregister every pending operation and stream
    ///
    /// Pending one-shots fail with [`LocationError::Cancelled`] and open
    /// streams end. Upstream commands are left as they are.
    pub fn cancel_all(&self) -> usize {
        let _commands = self.commands.lock();
        let removed = self.router.cancel_all();
        tracing::info!("Cancelled {} pending operation(s)", removed);
        removed
    }

    fn open_stream<T, F>(
        &self,
        performer: Performer,
        rx: tokio::sync::mpsc::UnboundedReceiver<T>,
        start: F,
        stop: StopCommand,
    ) -> Result<UpdateStream<T>>
    where
        F: FnOnce(&dyn LocationSource),
    {
        let kind = performer.kind();
        let _commands = self.commands.lock();
        let id = self.router.register(performer)?;
        start(self.source.as_ref());
        tracing::debug!("Opened {} stream {}", kind, id);

        Ok(UpdateStream::new(
            rx,
            Teardown {
                id,
                router: self.router.clone(),
                source: self.source.clone(),
                commands: self.commands.clone(),
                stop,
            },
        ))
    }

    fn stop_kind<F>(&self, kind: PerformerKind, stop: F)
    where
        F: FnOnce(&dyn LocationSource),
    {
        let _commands = self.commands.lock();
        let removed = self.router.cancel_kind(kind);
        stop(self.source.as_ref());
        tracing::debug!("Stopped {} ({} stream(s) ended)", kind, removed);
    }
}

impl std::fmt::Debug for LocationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationManager")
            .field("config", &self.config)
            .field("router", &self.router)
            .finish()
    }
}

/// Deregisters an abandoned one-shot
///
/// Dropping the request future, or timing out, leaves the performer
/// registered; this guard removes it so no later event can reach it.
struct PendingGuard {
    router: EventRouter,
    id: PerformerId,
    armed: bool,
}

impl PendingGuard {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.armed && self.router.cancel(self.id) {
            tracing::debug!("Deregistered abandoned one-shot {}", self.id);
        }
    }
}
