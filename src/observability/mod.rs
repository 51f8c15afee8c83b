//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Control loop + supervisor produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (cycle, registry and health metrics)
//!
//! Consumers:
//!     → stdout (fmt layer, filtered by RUST_LOG or --log-level)
//!     → Prometheus scrape (only when --metrics-address is set)
//! ```

pub mod logging;
pub mod metrics;
