//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Routing engine needs an instance
//!     → registry.rs (resolve configured strategy by name)
//!     → Apply load balancing algorithm:
//!         - round_robin.rs (rotate through instances, skip unhealthy)
//!     → health tracker consulted per candidate
//!     → Return instance or NoHealthyInstance
//! ```
//!
//! # Design Decisions
//! - Strategies are built once at startup and shared via `Arc`
//! - The instance list is passed in per call; strategies own only their cursor
//! - Unhealthy instances are excluded from selection

pub mod instance;
pub mod registry;
pub mod round_robin;

use std::fmt::Debug;
use thiserror::Error;

pub use instance::Instance;
pub use registry::{StrategyRegistry, DEFAULT_ALGORITHM};
pub use round_robin::RoundRobin;

/// Errors raised while choosing an instance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadBalancerError {
    /// Every candidate was unhealthy, or there were no candidates.
    #[error("No healthy instance available")]
    NoHealthyInstance,

    /// The registry holds neither the requested nor the default strategy.
    #[error("No valid load balancing strategy available")]
    NoStrategyAvailable,
}

/// A pluggable instance selection algorithm.
pub trait LoadBalancingStrategy: Send + Sync + Debug {
    /// Pick the next instance to receive a request.
    fn select_instance(&self, instances: &[Instance]) -> Result<Instance, LoadBalancerError>;

    /// Registry key for this strategy.
    fn name(&self) -> &str;
}
