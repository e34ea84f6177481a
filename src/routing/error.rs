//! Routing error taxonomy.

use thiserror::Error;

use crate::load_balancer::LoadBalancerError;

/// Errors surfaced to callers of the router.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoutingError {
    /// Empty, missing or malformed payload. Never retried.
    #[error("{0}")]
    InvalidRequest(String),

    /// No instance could serve the request.
    #[error("{0}")]
    NoAvailableInstance(String),

    /// The inbound request outlived its deadline, failover included.
    #[error("{0}")]
    Timeout(String),

    /// Anything uncategorised. The detail is for operators only.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RoutingError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            RoutingError::InvalidRequest(_) => "INVALID_REQUEST",
            RoutingError::NoAvailableInstance(_) => "NO_AVAILABLE_INSTANCE",
            RoutingError::Timeout(_) => "REQUEST_TIMEOUT",
            RoutingError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<LoadBalancerError> for RoutingError {
    fn from(err: LoadBalancerError) -> Self {
        match err {
            LoadBalancerError::NoHealthyInstance => RoutingError::NoAvailableInstance(err.to_string()),
            LoadBalancerError::NoStrategyAvailable => RoutingError::Internal(err.to_string()),
        }
    }
}
