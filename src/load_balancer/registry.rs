//! Strategy registry.
//!
//! # Responsibilities
//! - Hold every available strategy keyed by lower-cased name
//! - Resolve the configured strategy, falling back to round-robin

use std::collections::HashMap;
use std::sync::Arc;

use crate::health::tracker::InstanceTracker;
use crate::load_balancer::{LoadBalancerError, LoadBalancingStrategy, RoundRobin};

/// Strategy used when the configured name is unknown.
pub const DEFAULT_ALGORITHM: &str = RoundRobin::NAME;

/// Immutable map of strategy name → strategy, built once at startup.
#[derive(Debug, Default)]
pub struct StrategyRegistry {
    strategies: HashMap<String, Arc<dyn LoadBalancingStrategy>>,
}

impl StrategyRegistry {
    /// Build a registry from an explicit set of strategies.
    pub fn new(strategies: impl IntoIterator<Item = Arc<dyn LoadBalancingStrategy>>) -> Self {
        let strategies = strategies
            .into_iter()
            .map(|s| (s.name().to_lowercase(), s))
            .collect();
        Self { strategies }
    }

    /// Registry with every built-in strategy, all sharing one tracker.
    pub fn with_builtin(tracker: Arc<InstanceTracker>) -> Self {
        Self::new([Arc::new(RoundRobin::new(tracker)) as Arc<dyn LoadBalancingStrategy>])
    }

    /// Look up a strategy by name (case-insensitive), else the default.
    pub fn get_strategy(&self, name: &str) -> Result<Arc<dyn LoadBalancingStrategy>, LoadBalancerError> {
        self.strategies
            .get(&name.to_lowercase())
            .or_else(|| self.strategies.get(DEFAULT_ALGORITHM))
            .cloned()
            .ok_or(LoadBalancerError::NoStrategyAvailable)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(&name.to_lowercase())
    }
}
