//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Passive demotion (routing engine):
//!     Forward to instance fails
//!     → tracker.rs mark_unhealthy
//!
//! Active recovery (probe.rs):
//!     Periodic timer
//!     → Snapshot unhealthy set
//!     → Probe each instance's health endpoint
//!     → tracker.rs mark_healthy on `status: UP`
//! ```
//!
//! # Design Decisions
//! - Only unhealthy instances are probed; healthy ones are judged by traffic
//! - No cycle-wide atomicity; each tracker operation stands alone

pub mod probe;
pub mod tracker;

pub use probe::HealthProbe;
pub use tracker::InstanceTracker;
