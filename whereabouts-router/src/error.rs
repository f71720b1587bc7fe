//! Error types for the whereabouts-router crate.

use crate::performer::PerformerId;

/// Errors that can occur when registering performers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    /// A performer with this identity is already live
    #[error("Performer already registered: {0}")]
    DuplicatePerformer(PerformerId),

    /// The router holds its maximum number of performers
    #[error("Router is full (max {max_performers} performers)")]
    RouterFull {
        /// The configured cap
        max_performers: usize,
    },
}

/// Convenience type alias for Results using RouterError.
pub type RouterResult<T> = std::result::Result<T, RouterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_error_display() {
        let error = RouterError::DuplicatePerformer(PerformerId::new(7));
        assert_eq!(error.to_string(), "Performer already registered: performer-7");

        let error = RouterError::RouterFull { max_performers: 2 };
        assert_eq!(error.to_string(), "Router is full (max 2 performers)");
    }
}
