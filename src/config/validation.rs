//! Configuration validation.
//!
//! # Responsibilities
//! - Report every missing required field, not just the first
//! - Check that URIs are http/https and carry an explicit port
//! - Reject zero durations
//!
//! # Design Decisions
//! - Validation is a pure function: FileConfig → Result<SidecarConfig, Vec<ValidationError>>
//! - Runs once at startup, before any registration activity

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::config::schema::{
    FileConfig, ObservabilityConfig, SidecarConfig, TimingConfig, DEFAULT_TTL,
};
use crate::registry::{Registration, RegistrationKey};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required flag --{flag} or {env}")]
    Missing {
        flag: &'static str,
        env: &'static str,
    },

    #[error("Failed to parse uri: {uri}: {reason}")]
    Unparseable { uri: String, reason: String },

    #[error("uri protocol must be one of http/https: {uri}")]
    Scheme { uri: String },

    #[error("uri must contain a port: {uri}")]
    MissingPort { uri: String },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("invalid metrics address {value}: {reason}")]
    MetricsAddress { value: String, reason: String },
}

/// Validate a merged configuration into its immutable runtime form.
pub fn validate(raw: FileConfig) -> Result<SidecarConfig, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let backend_id = required(
        raw.backend_id,
        "backend-id",
        "REGISTER_VULCAN_BACKEND_ID",
        &mut errors,
    );
    let server_id = required(
        raw.server_id,
        "server-id",
        "REGISTER_VULCAN_SERVER_ID",
        &mut errors,
    );
    let uri = required(raw.uri, "uri", "REGISTER_VULCAN_URI", &mut errors);
    let vulcan_uri = required(
        raw.vulcan_uri,
        "vulcan-uri",
        "REGISTER_VULCAN_VULCAN_URI",
        &mut errors,
    );

    // The target is registered verbatim; only the registry endpoint is kept parsed.
    let target = uri.filter(|uri| validate_uri(uri).map_err(|e| errors.push(e)).is_ok());
    let vulcan_uri = vulcan_uri.and_then(|uri| validate_uri(&uri).map_err(|e| errors.push(e)).ok());

    let ttl = raw.ttl.unwrap_or(DEFAULT_TTL);
    non_zero(ttl, "ttl", &mut errors);

    let defaults = TimingConfig::default();
    let timing = TimingConfig {
        tick_interval: raw.timing.tick_interval.unwrap_or(defaults.tick_interval),
        restart_pause: raw.timing.restart_pause.unwrap_or(defaults.restart_pause),
    };
    non_zero(timing.tick_interval, "timing.tick_interval", &mut errors);
    non_zero(timing.restart_pause, "timing.restart_pause", &mut errors);

    let metrics_address = raw.metrics_address.and_then(|value| {
        value
            .parse::<SocketAddr>()
            .map_err(|e| {
                errors.push(ValidationError::MetricsAddress {
                    reason: e.to_string(),
                    value,
                })
            })
            .ok()
    });

    match (backend_id, server_id, target, vulcan_uri) {
        (Some(backend_id), Some(server_id), Some(target), Some(vulcan_uri)) if errors.is_empty() => {
            Ok(SidecarConfig {
                registration: Registration {
                    key: RegistrationKey {
                        backend_id,
                        server_id,
                    },
                    target,
                    ttl,
                },
                vulcan_uri,
                upsert_policy: raw.upsert_policy.unwrap_or_default(),
                timing,
                observability: ObservabilityConfig {
                    log_level: raw
                        .log_level
                        .unwrap_or_else(|| ObservabilityConfig::default().log_level),
                    metrics_address,
                },
            })
        }
        _ => Err(errors),
    }
}

/// Accept only http/https URIs that name an explicit port.
pub fn validate_uri(raw: &str) -> Result<Url, ValidationError> {
    let url = Url::parse(raw).map_err(|e| ValidationError::Unparseable {
        uri: raw.to_string(),
        reason: e.to_string(),
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ValidationError::Scheme {
            uri: raw.to_string(),
        });
    }

    // `Url` drops a port equal to the scheme default, so read it off the raw authority.
    if !has_explicit_port(raw) {
        return Err(ValidationError::MissingPort {
            uri: raw.to_string(),
        });
    }

    Ok(url)
}

fn has_explicit_port(raw: &str) -> bool {
    let Some((_, rest)) = raw.split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, host)| host);

    let port = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed
            .split_once(']')
            .and_then(|(_, after)| after.strip_prefix(':')),
        None => host_port.rsplit_once(':').map(|(_, port)| port),
    };

    matches!(port, Some(p) if !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

fn required(
    value: Option<String>,
    flag: &'static str,
    env: &'static str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Some(v),
        _ => {
            errors.push(ValidationError::Missing { flag, env });
            None
        }
    }
}

fn non_zero(value: Duration, field: &'static str, errors: &mut Vec<ValidationError>) {
    if value.is_zero() {
        errors.push(ValidationError::ZeroDuration { field });
    }
}
