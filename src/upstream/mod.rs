//! Outbound calls to worker instances.
//!
//! # Data Flow
//! ```text
//! Routing engine                      Health probe
//!     → WorkerClient::forward             → WorkerClient::health
//!     → POST {instance}{api_path}         → GET {instance}{health_path}
//!     → JSON object or UpstreamError      → JSON body or UpstreamError
//! ```
//!
//! # Design Decisions
//! - Every call has a deadline; a timeout is just another failure
//! - Any non-2xx status is a failure, the body is not inspected
//! - The trait seam lets the engine and probe run against in-memory workers

pub mod client;
#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::load_balancer::Instance;

pub use client::{HttpWorkerClient, UpstreamSettings};

/// A JSON object, the unit of work routed to a worker.
pub type Payload = Map<String, Value>;

/// A single failed call to a worker instance.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The call did not complete within its deadline.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// Connection or protocol level failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The worker answered with a non-success status.
    #[error("worker returned status {0}")]
    Status(u16),

    /// The worker answered 2xx but the body was not the expected JSON.
    #[error("invalid response body: {0}")]
    Decode(String),
}

/// Capability to talk to worker instances.
#[async_trait]
pub trait WorkerClient: Send + Sync {
    /// Forward a payload to the worker API of `instance`.
    async fn forward(&self, instance: &Instance, payload: &Payload) -> Result<Payload, UpstreamError>;

    /// Fetch the health document of `instance`.
    async fn health(&self, instance: &Instance) -> Result<Value, UpstreamError>;
}
