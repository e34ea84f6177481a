//! Worker Router Library
//!
//! Routes JSON requests across a fixed set of worker instances with a
//! pluggable load-balancing strategy, demoting instances that fail and
//! reinstating them once a background probe sees them healthy again.

pub mod config;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::RouterConfig;
pub use health::{HealthProbe, InstanceTracker};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use load_balancer::{Instance, LoadBalancingStrategy, RoundRobin, StrategyRegistry};
pub use routing::{RoutingEngine, RoutingError};
pub use upstream::{Payload, WorkerClient};
