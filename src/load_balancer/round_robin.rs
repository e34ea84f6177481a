//! Round-robin load balancing strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::health::tracker::InstanceTracker;
use crate::load_balancer::{Instance, LoadBalancerError, LoadBalancingStrategy};

/// Round-robin selector.
/// Stores a cursor shared by every caller to rotate through instances.
#[derive(Debug)]
pub struct RoundRobin {
    counter: AtomicUsize,
    tracker: Arc<InstanceTracker>,
}

impl RoundRobin {
    pub const NAME: &'static str = "roundrobin";

    pub fn new(tracker: Arc<InstanceTracker>) -> Self {
        Self {
            counter: AtomicUsize::new(0),
            tracker,
        }
    }

    #[cfg(test)]
    fn with_cursor(tracker: Arc<InstanceTracker>, cursor: usize) -> Self {
        Self {
            counter: AtomicUsize::new(cursor),
            tracker,
        }
    }

    #[cfg(test)]
    fn cursor(&self) -> usize {
        self.counter.load(Ordering::Relaxed)
    }

    /// Advance the cursor and return its previous value.
    /// Resets to zero before reaching `usize::MAX` instead of wrapping.
    fn advance(&self) -> usize {
        match self.counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            Some(if current >= usize::MAX - 1 { 0 } else { current + 1 })
        }) {
            Ok(previous) | Err(previous) => previous,
        }
    }
}

impl LoadBalancingStrategy for RoundRobin {
    fn select_instance(&self, instances: &[Instance]) -> Result<Instance, LoadBalancerError> {
        let len = instances.len();
        for _ in 0..len {
            let candidate = &instances[self.advance() % len];
            if !self.tracker.is_unhealthy(candidate) {
                return Ok(candidate.clone());
            }
            tracing::trace!(instance = %candidate, "Skipping unhealthy instance");
        }
        Err(LoadBalancerError::NoHealthyInstance)
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
