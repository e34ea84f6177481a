//! Request routing with failover.
//!
//! # Responsibilities
//! - Resolve the configured strategy for each request
//! - Forward to the selected instance under a deadline
//! - Demote failing instances and try the next candidate
//! - Bound the attempts by the configured instance count

use std::sync::Arc;

use crate::health::tracker::InstanceTracker;
use crate::load_balancer::{Instance, LoadBalancerError, StrategyRegistry};
use crate::observability::metrics;
use crate::routing::RoutingError;
use crate::upstream::{Payload, WorkerClient};

/// Routes payloads to worker instances.
pub struct RoutingEngine {
    registry: Arc<StrategyRegistry>,
    algorithm: String,
    instances: Arc<[Instance]>,
    tracker: Arc<InstanceTracker>,
    client: Arc<dyn WorkerClient>,
}

impl RoutingEngine {
    /// Create an engine. Fails if the registry cannot serve `algorithm`
    /// (neither it nor the default strategy is registered).
    pub fn new(
        registry: Arc<StrategyRegistry>,
        algorithm: impl Into<String>,
        instances: Vec<Instance>,
        tracker: Arc<InstanceTracker>,
        client: Arc<dyn WorkerClient>,
    ) -> Result<Self, LoadBalancerError> {
        let algorithm = algorithm.into();
        let strategy = registry.get_strategy(&algorithm)?;
        if !registry.contains(&algorithm) {
            tracing::warn!(
                requested = %algorithm,
                using = %strategy.name(),
                "Unknown load balancing strategy, falling back to default"
            );
        }

        tracker.report_health(&instances);

        Ok(Self {
            registry,
            algorithm,
            instances: instances.into(),
            tracker,
            client,
        })
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn tracker(&self) -> &Arc<InstanceTracker> {
        &self.tracker
    }

    /// Name of the strategy requests are routed with.
    pub fn strategy_name(&self) -> String {
        self.registry
            .get_strategy(&self.algorithm)
            .map(|s| s.name().to_string())
            .unwrap_or_default()
    }

    /// Route one payload, trying at most one attempt per configured instance.
    pub async fn route(&self, payload: &Payload) -> Result<Payload, RoutingError> {
        let strategy = self.registry.get_strategy(&self.algorithm)?;
        let max_attempts = self.instances.len();

        for attempt in 1..=max_attempts {
            let instance = strategy.select_instance(&self.instances)?;
            tracing::info!(instance = %instance, attempt, "Routing request");

            match self.client.forward(&instance, payload).await {
                Ok(response) => {
                    metrics::record_forward_attempt(&instance, true);
                    return Ok(response);
                }
                Err(e) => {
                    tracing::error!(instance = %instance, attempt, error = %e, "Failed to reach worker instance");
                    metrics::record_forward_attempt(&instance, false);
                    self.tracker.mark_unhealthy(&instance);
                }
            }
        }

        Err(RoutingError::NoAvailableInstance(
            "No healthy instance available to route the request".to_string(),
        ))
    }
}
