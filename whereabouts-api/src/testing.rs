//! In-memory source for tests
//!
//! [`RecordingSource`] issues nothing to any hardware; it records every
//! command it receives so tests can assert on what the bridge asked for, and
//! lets tests choose the statuses it reports.

use parking_lot::Mutex;

use crate::model::{AccuracyAuthorization, AuthorizationStatus, BeaconConstraint, Region};
use crate::source::{LocationSource, SourceSettings};

/// A command received by [`RecordingSource`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    RequestWhenInUseAuthorization,
    RequestAlwaysAuthorization,
    RequestTemporaryFullAccuracy(String),
    StartUpdatingLocation,
    StopUpdatingLocation,
    RequestLocation,
    StartMonitoring(Region),
    StopMonitoring(Region),
    StartMonitoringVisits,
    StopMonitoringVisits,
    StartUpdatingHeading,
    StopUpdatingHeading,
    StartRangingBeacons(BeaconConstraint),
    StopRangingBeacons(BeaconConstraint),
    ApplySettings(SourceSettings),
}

#[derive(Debug)]
struct State {
    commands: Vec<Command>,
    authorization: AuthorizationStatus,
    accuracy: AccuracyAuthorization,
    services_enabled: bool,
}

/// Source that records commands instead of executing them
#[derive(Debug)]
pub struct RecordingSource {
    state: Mutex<State>,
}

impl RecordingSource {
    /// A source reporting `NotDetermined`, reduced accuracy and enabled services
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                commands: Vec::new(),
                authorization: AuthorizationStatus::NotDetermined,
                accuracy: AccuracyAuthorization::ReducedAccuracy,
                services_enabled: true,
            }),
        }
    }

    pub fn set_authorization_status(&self, status: AuthorizationStatus) {
        self.state.lock().authorization = status;
    }

    pub fn set_accuracy_authorization(&self, accuracy: AccuracyAuthorization) {
        self.state.lock().accuracy = accuracy;
    }

    pub fn set_services_enabled(&self, enabled: bool) {
        self.state.lock().services_enabled = enabled;
    }

    /// Every command received so far, in order
    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().commands.clone()
    }

    /// How many times `command` was received
    pub fn count(&self, command: &Command) -> usize {
        self.state
            .lock()
            .commands
            .iter()
            .filter(|c| *c == command)
            .count()
    }

    pub fn clear(&self) {
        self.state.lock().commands.clear();
    }

    fn record(&self, command: Command) {
        tracing::trace!("RecordingSource received {:?}", command);
        self.state.lock().commands.push(command);
    }
}

impl Default for RecordingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl LocationSource for RecordingSource {
    fn authorization_status(&self) -> AuthorizationStatus {
        self.state.lock().authorization
    }

    fn accuracy_authorization(&self) -> AccuracyAuthorization {
        self.state.lock().accuracy
    }

    fn location_services_enabled(&self) -> bool {
        self.state.lock().services_enabled
    }

    fn request_when_in_use_authorization(&self) {
        self.record(Command::RequestWhenInUseAuthorization);
    }

    fn request_always_authorization(&self) {
        self.record(Command::RequestAlwaysAuthorization);
    }

    fn request_temporary_full_accuracy(&self, purpose_key: &str) {
        self.record(Command::RequestTemporaryFullAccuracy(purpose_key.to_string()));
    }

    fn start_updating_location(&self) {
        self.record(Command::StartUpdatingLocation);
    }

    fn stop_updating_location(&self) {
        self.record(Command::StopUpdatingLocation);
    }

    fn request_location(&self) {
        self.record(Command::RequestLocation);
    }

    fn start_monitoring(&self, region: &Region) {
        self.record(Command::StartMonitoring(region.clone()));
    }

    fn stop_monitoring(&self, region: &Region) {
        self.record(Command::StopMonitoring(region.clone()));
    }

    fn start_monitoring_visits(&self) {
        self.record(Command::StartMonitoringVisits);
    }

    fn stop_monitoring_visits(&self) {
        self.record(Command::StopMonitoringVisits);
    }

    fn start_updating_heading(&self) {
        self.record(Command::StartUpdatingHeading);
    }

    fn stop_updating_heading(&self) {
        self.record(Command::StopUpdatingHeading);
    }

    fn start_ranging_beacons(&self, constraint: &BeaconConstraint) {
        self.record(Command::StartRangingBeacons(constraint.clone()));
    }

    fn stop_ranging_beacons(&self, constraint: &BeaconConstraint) {
        self.record(Command::StopRangingBeacons(constraint.clone()));
    }

    fn apply_settings(&self, settings: &SourceSettings) {
        self.record(Command::ApplySettings(settings.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order() {
        let source = RecordingSource::new();
        source.start_updating_location();
        source.request_location();
        source.stop_updating_location();

        assert_eq!(
            source.commands(),
            vec![
                Command::StartUpdatingLocation,
                Command::RequestLocation,
                Command::StopUpdatingLocation,
            ]
        );
        assert_eq!(source.count(&Command::RequestLocation), 1);

        source.clear();
        assert!(source.commands().is_empty());
    }

    #[test]
    fn test_reported_statuses() {
        let source = RecordingSource::new();
        assert_eq!(source.authorization_status(), AuthorizationStatus::NotDetermined);
        assert!(source.location_services_enabled());

        source.set_authorization_status(AuthorizationStatus::Denied);
        source.set_accuracy_authorization(AccuracyAuthorization::FullAccuracy);
        source.set_services_enabled(false);

        assert_eq!(source.authorization_status(), AuthorizationStatus::Denied);
        assert_eq!(
            source.accuracy_authorization(),
            AccuracyAuthorization::FullAccuracy
        );
        assert!(!source.location_services_enabled());
    }
}
