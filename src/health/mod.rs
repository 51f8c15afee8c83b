//! Health probing subsystem.
//!
//! # Data Flow
//! ```text
//! Control loop cycle
//!     → probe.rs: GET <target>/healthcheck
//!     → HealthStatus (Healthy iff status == 200)
//! ```
//!
//! # Design Decisions
//! - Status is derived fresh every cycle; no thresholds, no hysteresis
//! - Probe failures are never errors, only `Unhealthy`
//! - No retries and no caching

pub mod probe;

pub use probe::{HealthProbe, HttpProbe};

/// Result of a single probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(self) -> bool {
        self == HealthStatus::Healthy
    }
}
