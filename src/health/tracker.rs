//! Shared instance health state.
//!
//! # States
//! - Healthy: instance is in rotation (not a member of the unhealthy set)
//! - Unhealthy: instance is excluded from selection
//!
//! # State Transitions
//! ```text
//! Healthy → Unhealthy: a forwarded request to the instance failed
//! Unhealthy → Healthy: the health probe saw `status: UP`
//! ```
//!
//! # Design Decisions
//! - Membership is binary; no counters, no hysteresis
//! - Both transitions are idempotent and safe under any interleaving
//! - Last writer wins between a demotion and a concurrent promotion

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::collections::HashSet;

use crate::load_balancer::instance::Instance;
use crate::observability::metrics;

/// Concurrent registry of instances currently excluded from rotation.
///
/// The `router_instance_healthy` gauge is written while the entry lock for
/// the instance is held, so it always matches the last applied transition.
#[derive(Debug, Default)]
pub struct InstanceTracker {
    unhealthy: DashMap<Instance, ()>,
}

impl InstanceTracker {
    /// Create a tracker with every instance considered healthy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish the current health gauge for every configured instance.
    pub fn report_health(&self, instances: &[Instance]) {
        for instance in instances {
            let entry = self.unhealthy.entry(instance.clone());
            metrics::record_instance_health(instance, matches!(entry, Entry::Vacant(_)));
        }
    }

    /// Take an instance out of rotation.
    pub fn mark_unhealthy(&self, instance: &Instance) {
        match self.unhealthy.entry(instance.clone()) {
            Entry::Vacant(entry) => {
                let _guard = entry.insert(());
                metrics::record_instance_health(instance, false);
                tracing::warn!(instance = %instance, "Marked instance as unhealthy");
            }
            Entry::Occupied(_) => {
                tracing::debug!(instance = %instance, "Instance already marked unhealthy");
            }
        }
    }

    /// Put an instance back into rotation.
    pub fn mark_healthy(&self, instance: &Instance) {
        if let Entry::Occupied(entry) = self.unhealthy.entry(instance.clone()) {
            metrics::record_instance_health(instance, true);
            entry.remove();
            tracing::info!(instance = %instance, "Recovered instance and added back to rotation");
        }
    }

    pub fn is_unhealthy(&self, instance: &Instance) -> bool {
        self.unhealthy.contains_key(instance)
    }

    /// Point-in-time copy of the unhealthy set.
    ///
    /// The live set may change as soon as this returns.
    pub fn unhealthy_instances(&self) -> HashSet<Instance> {
        self.unhealthy.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn unhealthy_count(&self) -> usize {
        self.unhealthy.len()
    }
}
