//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Validated payload
//!     → engine.rs (resolve strategy, select instance, forward)
//!     → On failure: mark instance unhealthy, select again
//!     → Return: worker response or NoAvailableInstance
//! ```
//!
//! # Design Decisions
//! - At most one attempt per configured instance, no backoff
//! - A failed attempt demotes the instance before the next selection
//! - Per-instance failures never reach the caller

pub mod engine;
pub mod error;

pub use engine::RoutingEngine;
pub use error::RoutingError;
