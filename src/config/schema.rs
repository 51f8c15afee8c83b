//! Configuration schema definitions.
//!
//! `FileConfig` is the raw, partially-filled shape read from the TOML file and
//! overlaid with CLI flags. `SidecarConfig` is what survives validation.

use std::net::SocketAddr;
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::duration;
use crate::registry::Registration;

/// Lease attached to every upsert when none is configured.
pub const DEFAULT_TTL: Duration = Duration::from_secs(11);

/// Interval between health-check-and-sync cycles.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(5);

/// Pause between a reload-triggered deregistration and the loop restart.
pub const DEFAULT_RESTART_PAUSE: Duration = Duration::from_secs(5);

/// How a healthy cycle writes to the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UpsertPolicy {
    /// Upsert on every healthy cycle so the lease is renewed.
    #[default]
    Refresh,
    /// Read the entry first and only write when it is absent or its URL changed.
    CompareUrl,
}

/// Raw configuration as read from the optional TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub backend_id: Option<String>,
    pub server_id: Option<String>,
    pub uri: Option<String>,
    pub vulcan_uri: Option<String>,
    #[serde(deserialize_with = "duration::deserialize_opt")]
    pub ttl: Option<Duration>,
    pub upsert_policy: Option<UpsertPolicy>,
    pub metrics_address: Option<String>,
    pub log_level: Option<String>,
    pub timing: FileTimingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileTimingConfig {
    #[serde(deserialize_with = "duration::deserialize_opt")]
    pub tick_interval: Option<Duration>,
    #[serde(deserialize_with = "duration::deserialize_opt")]
    pub restart_pause: Option<Duration>,
}

/// Validated configuration for the sidecar.
#[derive(Debug, Clone)]
pub struct SidecarConfig {
    /// The single entry this process owns in the registry.
    pub registration: Registration,

    /// Base URI of the registry API.
    pub vulcan_uri: Url,

    pub upsert_policy: UpsertPolicy,

    pub timing: TimingConfig,

    pub observability: ObservabilityConfig,
}

/// Control loop cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub tick_interval: Duration,
    pub restart_pause: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            restart_pause: DEFAULT_RESTART_PAUSE,
        }
    }
}

/// Observability settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) when `RUST_LOG` is unset.
    pub log_level: String,

    /// Prometheus exporter bind address; disabled when absent.
    pub metrics_address: Option<SocketAddr>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}
