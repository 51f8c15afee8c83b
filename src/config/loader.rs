//! Configuration loading: optional TOML file, overlaid with flags and env.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::cli::Cli;
use crate::config::schema::{FileConfig, SidecarConfig};
use crate::config::validation::{validate, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Read the raw TOML file without validating it.
pub fn load_file(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the validated configuration from parsed command line arguments.
pub fn load(cli: Cli) -> Result<SidecarConfig, ConfigError> {
    let file = match &cli.config {
        Some(path) => load_file(path)?,
        None => FileConfig::default(),
    };

    validate(cli.overlay(file)).map_err(ConfigError::Validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::UpsertPolicy;
    use std::io::Write;
    use std::time::Duration;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("create temp config");
        file.write_all(contents.as_bytes()).expect("write temp config");
        file
    }

    #[test]
    fn test_loads_file_and_overlays_flags() {
        let file = write_config(
            r#"
            backend_id = "b1"
            server_id = "s1"
            uri = "http://10.0.0.5:8080"
            vulcan_uri = "http://127.0.0.1:8182"
            ttl = "30s"
            upsert_policy = "compare-url"

            [timing]
            tick_interval = "1s"
            restart_pause = "2s"
            "#,
        );

        let cli = Cli {
            server_id: Some("override".into()),
            config: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let config = load(cli).unwrap();

        assert_eq!(config.registration.key.backend_id, "b1");
        assert_eq!(config.registration.key.server_id, "override");
        assert_eq!(config.registration.ttl, Duration::from_secs(30));
        assert_eq!(config.upsert_policy, UpsertPolicy::CompareUrl);
        assert_eq!(config.timing.tick_interval, Duration::from_secs(1));
        assert_eq!(config.timing.restart_pause, Duration::from_secs(2));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/register-vulcan.toml")),
            ..Default::default()
        };
        assert!(matches!(load(cli), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_unknown_key_is_parse_error() {
        let file = write_config("backend = \"typo\"\n");
        assert!(matches!(
            load_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_bad_duration_is_parse_error() {
        let file = write_config("ttl = \"eleven\"\n");
        assert!(matches!(
            load_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_validation_errors_are_collected() {
        match load(Cli::default()) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 4),
            other => panic!("expected validation errors, got {:?}", other),
        }
    }
}
