//! Active health probing of unhealthy instances.
//!
//! # Responsibilities
//! - Periodically re-check every instance in the unhealthy set
//! - Reinstate instances that report `status: UP`

use futures_util::future::join_all;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::health::tracker::InstanceTracker;
use crate::load_balancer::Instance;
use crate::observability::metrics;
use crate::upstream::WorkerClient;

/// Field of the health document carrying the status.
pub const STATUS_FIELD: &str = "status";
/// Status value meaning the worker is ready for traffic.
pub const HEALTH_STATUS_UP: &str = "UP";

pub struct HealthProbe {
    tracker: Arc<InstanceTracker>,
    client: Arc<dyn WorkerClient>,
    interval: Duration,
}

impl HealthProbe {
    pub fn new(tracker: Arc<InstanceTracker>, client: Arc<dyn WorkerClient>, interval: Duration) -> Self {
        Self {
            tracker,
            client,
            interval,
        }
    }

    /// Probe on a fixed period until shutdown is signalled.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval = ?self.interval, "Health probe starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                _ = shutdown.recv() => {
                    tracing::info!("Health probe received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }

    /// One probe cycle over a snapshot of the unhealthy set.
    /// Returns the number of instances reinstated.
    pub async fn run_cycle(&self) -> usize {
        let snapshot = self.tracker.unhealthy_instances();
        if snapshot.is_empty() {
            return 0;
        }
        tracing::info!(unhealthy = snapshot.len(), "Running health check for unhealthy instances");

        let checks = snapshot.into_iter().map(|instance| async move {
            let healthy = self.is_instance_healthy(&instance).await;
            (instance, healthy)
        });

        let mut recovered = 0;
        for (instance, healthy) in join_all(checks).await {
            if healthy {
                self.tracker.mark_healthy(&instance);
                recovered += 1;
            }
        }
        recovered
    }

    /// Whether the instance's health endpoint reports `UP`.
    pub async fn is_instance_healthy(&self, instance: &Instance) -> bool {
        let healthy = match self.client.health(instance).await {
            Ok(body) => {
                let up = reports_up(&body);
                if !up {
                    tracing::debug!(instance = %instance, body = %body, "Instance still reports not UP");
                }
                up
            }
            Err(e) => {
                tracing::warn!(instance = %instance, error = %e, "Health check failed");
                false
            }
        };
        metrics::record_health_probe(healthy);
        healthy
    }
}

/// `true` when `body.status` equals `UP`, ignoring case.
fn reports_up(body: &Value) -> bool {
    match body.get(STATUS_FIELD) {
        Some(Value::String(status)) => status.eq_ignore_ascii_case(HEALTH_STATUS_UP),
        Some(Value::Null) | None => false,
        Some(other) => other.to_string().eq_ignore_ascii_case(HEALTH_STATUS_UP),
    }
}
