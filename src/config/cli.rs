//! Command line and environment surface.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::duration::parse_duration;
use crate::config::schema::{FileConfig, UpsertPolicy};

#[derive(Debug, Default, Parser)]
#[command(name = "register-vulcan", version)]
#[command(about = "Keeps a vulcand server entry in sync with an instance's health", long_about = None)]
pub struct Cli {
    /// Backend id to register server to
    #[arg(short = 'b', long, env = "REGISTER_VULCAN_BACKEND_ID")]
    pub backend_id: Option<String>,

    /// Server ID
    #[arg(short = 's', long, env = "REGISTER_VULCAN_SERVER_ID")]
    pub server_id: Option<String>,

    /// ttl for server keys (in case of unexpected register-vulcan death) [default: 11s]
    #[arg(short = 't', long, env = "REGISTER_VULCAN_TTL", value_parser = parse_duration)]
    pub ttl: Option<Duration>,

    /// URI to healthcheck, must return status 200
    #[arg(short = 'u', long, env = "REGISTER_VULCAN_URI")]
    pub uri: Option<String>,

    /// VULCAN URI to register server to
    #[arg(short = 'v', long, env = "REGISTER_VULCAN_VULCAN_URI")]
    pub vulcan_uri: Option<String>,

    /// Whether healthy cycles always rewrite the entry or only when it changed [default: refresh]
    #[arg(long, env = "REGISTER_VULCAN_UPSERT_POLICY", value_enum)]
    pub upsert_policy: Option<UpsertPolicy>,

    /// Optional TOML file; flags and environment override its values
    #[arg(short = 'c', long, env = "REGISTER_VULCAN_CONFIG")]
    pub config: Option<PathBuf>,

    /// Serve Prometheus metrics on this address (e.g. 0.0.0.0:9090)
    #[arg(long, env = "REGISTER_VULCAN_METRICS_ADDRESS")]
    pub metrics_address: Option<String>,

    /// Log level used when RUST_LOG is unset [default: info]
    #[arg(long, env = "REGISTER_VULCAN_LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Overlay flag and environment values on top of the file configuration.
    pub fn overlay(self, mut file: FileConfig) -> FileConfig {
        file.backend_id = self.backend_id.or(file.backend_id);
        file.server_id = self.server_id.or(file.server_id);
        file.uri = self.uri.or(file.uri);
        file.vulcan_uri = self.vulcan_uri.or(file.vulcan_uri);
        file.ttl = self.ttl.or(file.ttl);
        file.upsert_policy = self.upsert_policy.or(file.upsert_policy);
        file.metrics_address = self.metrics_address.or(file.metrics_address);
        file.log_level = self.log_level.or(file.log_level);
        file
    }
}
