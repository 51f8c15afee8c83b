//! register-vulcan library.
//!
//! Keeps one server entry in a vulcand routing registry in sync with the
//! health of the instance this sidecar runs beside.

pub mod config;
pub mod control;
pub mod health;
pub mod lifecycle;
pub mod observability;
pub mod registry;

pub use config::SidecarConfig;
pub use control::ControlLoop;
pub use lifecycle::Supervisor;
