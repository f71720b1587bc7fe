//! Authorization status enumerations

use serde::{Deserialize, Serialize};

/// Whether the application may use location services
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthorizationStatus {
    /// The user has not been asked yet
    NotDetermined,
    /// Access is blocked by policy (e.g. parental controls)
    Restricted,
    /// The user refused access
    Denied,
    /// Access granted at all times, including in the background
    AuthorizedAlways,
    /// Access granted while the application is in use
    AuthorizedWhenInUse,
}

impl AuthorizationStatus {
    /// Whether the user has made a decision
    ///
    /// `NotDetermined` is transitional: a pending authorization request keeps
    /// waiting when it sees it.
    pub fn is_determined(&self) -> bool {
        !matches!(self, AuthorizationStatus::NotDetermined)
    }

    /// Whether location updates may be delivered
    pub fn is_authorized(&self) -> bool {
        matches!(
            self,
            AuthorizationStatus::AuthorizedAlways | AuthorizationStatus::AuthorizedWhenInUse
        )
    }
}

impl Default for AuthorizationStatus {
    fn default() -> Self {
        AuthorizationStatus::NotDetermined
    }
}

/// Precision granted for location readings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccuracyAuthorization {
    /// Precise readings
    FullAccuracy,
    /// Approximate readings only
    ReducedAccuracy,
}

impl Default for AccuracyAuthorization {
    fn default() -> Self {
        AccuracyAuthorization::ReducedAccuracy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(AuthorizationStatus::NotDetermined, false, false)]
    #[case(AuthorizationStatus::Restricted, true, false)]
    #[case(AuthorizationStatus::Denied, true, false)]
    #[case(AuthorizationStatus::AuthorizedAlways, true, true)]
    #[case(AuthorizationStatus::AuthorizedWhenInUse, true, true)]
    fn test_status_classification(
        #[case] status: AuthorizationStatus,
        #[case] determined: bool,
        #[case] authorized: bool,
    ) {
        assert_eq!(status.is_determined(), determined);
        assert_eq!(status.is_authorized(), authorized);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(AuthorizationStatus::default(), AuthorizationStatus::NotDetermined);
        assert_eq!(
            AccuracyAuthorization::default(),
            AccuracyAuthorization::ReducedAccuracy
        );
    }
}
