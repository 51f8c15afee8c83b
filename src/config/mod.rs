//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! CLI flags / REGISTER_VULCAN_* env (cli.rs)
//!     + optional TOML file (loader.rs)
//!     → flags override file values
//!     → validation.rs (required fields, URI scheme + port, durations)
//!     → SidecarConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; SIGHUP re-registers, it does not reload config
//! - Every missing field is reported, not just the first
//! - Durations use Go notation (`11s`) to match the registry wire format

pub mod cli;
pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::{load, ConfigError};
pub use schema::{ObservabilityConfig, SidecarConfig, TimingConfig, UpsertPolicy};
pub use validation::ValidationError;
