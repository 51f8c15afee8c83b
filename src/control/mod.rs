//! Registration control loop.
//!
//! # Data Flow
//! ```text
//! ticker.rs (one task for the process lifetime):
//!     every tick_interval → send Cycle on the control channel
//!
//! worker.rs (ControlLoop, re-spawned after every reload):
//!     recv Cycle → probe <target>/healthcheck
//!                  → healthy:   upsert (per UpsertPolicy)
//!                  → unhealthy: remove
//!     recv Stop  → return the receiver to the supervisor
//! ```
//!
//! # Design Decisions
//! - Control channel holds at most one value and has one consumer, so cycles never overlap
//! - A cycle is never cancelled midway; Stop is observed between cycles
//! - Registry errors end the loop with `SyncError`; the caller decides what is fatal

pub mod ticker;
pub mod worker;

use thiserror::Error;

use crate::registry::RegistryError;

pub use ticker::run_ticker;
pub use worker::ControlLoop;

/// Capacity of the control channel.
pub const CONTROL_CHANNEL_CAPACITY: usize = 1;

/// Message on the control channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Run one health-check-and-sync cycle.
    Cycle,
    /// Stop looping and hand the receiver back.
    Stop,
}

/// What a single cycle did to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Healthy, entry written.
    Upserted,
    /// Healthy, entry already current so nothing was written.
    Unchanged,
    /// Unhealthy, entry removed.
    Removed,
}

impl CycleOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            CycleOutcome::Upserted => "upserted",
            CycleOutcome::Unchanged => "unchanged",
            CycleOutcome::Removed => "removed",
        }
    }
}

/// A registry operation failed; the registration state is unknown.
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct SyncError {
    pub operation: &'static str,
    #[source]
    pub source: RegistryError,
}
