//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGHUP  → LifecycleEvent::Reload
//!     SIGTERM → LifecycleEvent::Terminate
//!
//! Supervisor (supervisor.rs):
//!     Reload    → stop loop → remove entry → pause → restart loop
//!     Terminate → stop loop → remove entry → return (exit 0)
//! ```
//!
//! # Design Decisions
//! - The supervisor consumes events, not OS signals, so tests drive it directly
//! - The removal always completes before a restart or exit
//! - A failed removal is fatal; the process never exits cleanly without confirming it

pub mod signals;
pub mod supervisor;

pub use signals::spawn_signal_listener;
pub use supervisor::{LifecycleEvent, Supervisor, SupervisorError, SupervisorState};
