//! Routing registry subsystem.
//!
//! # Data Flow
//! ```text
//! Control loop cycle:
//!     healthy   → Registry::upsert_server(key, target, ttl)
//!     unhealthy → Registry::remove_server(key)
//!
//! vulcand.rs:
//!     Registry → vulcand v2 HTTP API (fresh client per call)
//! ```
//!
//! # Design Decisions
//! - The registry owns lease expiry; nothing here tracks the TTL
//! - Removing an absent entry is not an error
//! - No retries: every error is surfaced to the caller

pub mod vulcand;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use vulcand::VulcandRegistry;

/// Identifies one server entry in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistrationKey {
    pub backend_id: String,
    pub server_id: String,
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.backend_id, self.server_id)
    }
}

/// The entry this process keeps in sync. Immutable after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub key: RegistrationKey,

    /// URL traffic is routed to, registered exactly as configured.
    pub target: String,

    /// Lease sent with every upsert.
    pub ttl: Duration,
}

impl Registration {
    /// The endpoint probed each cycle.
    pub fn healthcheck_url(&self) -> String {
        format!("{}/healthcheck", self.target.trim_end_matches('/'))
    }
}

/// A server entry as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServerEntry {
    #[serde(rename = "Id")]
    pub id: String,

    #[serde(rename = "URL")]
    pub url: String,
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid registry endpoint {endpoint}")]
    Endpoint { endpoint: String },

    #[error("failed to build registry client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("registry request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("registry rejected request with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("failed to decode registry response: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Upsert/remove-by-key access to the routing registry.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Look up the current entry, `None` if absent.
    async fn get_server(&self, key: &RegistrationKey) -> Result<Option<ServerEntry>, RegistryError>;

    /// Create or replace the entry with a fresh lease.
    async fn upsert_server(
        &self,
        key: &RegistrationKey,
        url: &str,
        ttl: Duration,
    ) -> Result<(), RegistryError>;

    /// Delete the entry if present.
    async fn remove_server(&self, key: &RegistrationKey) -> Result<(), RegistryError>;
}
