use std::path::{Path, PathBuf};

use serde::Deserialize;
use tripscan::{NetworkConfig, Time};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
    /// Default `tracing` filter, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_filter: "info".to_string(),
        }
    }
}

/// Parameter values used when a request omits them
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct QueryDefaults {
    pub min_waiting_time: Time,
    pub max_transfers: usize,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            min_waiting_time: 300,
            max_transfers: 3,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub allow_all_stops: bool,
    /// Requested transfer budgets are clamped to this value
    pub max_transfers_cap: usize,
    pub request_timeout_seconds: u64,
    pub max_concurrent_requests: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            allow_all_stops: true,
            max_transfers_cap: 6,
            request_timeout_seconds: 60,
            max_concurrent_requests: 64,
        }
    }
}

/// Server configuration, read from a TOML file with
/// `[server]`, `[network]`, `[query]` and `[limits]` sections
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerSection,
    pub network: NetworkConfig,
    pub query: QueryDefaults,
    pub limits: Limits,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.query.min_waiting_time, 300);
        assert!(config.limits.allow_all_stops);
        assert!(config.network.gtfs_dirs.is_empty());
        assert!(config.network.reduce_transfers);
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 9000

            [network]
            gtfs_dirs = ["data/city"]
            generate_footpaths = false
            min_transfer_time = 60

            [query]
            max_transfers = 2

            [limits]
            allow_all_stops = false
            max_transfers_cap = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.network.gtfs_dirs, vec![PathBuf::from("data/city")]);
        assert!(!config.network.generate_footpaths);
        assert_eq!(config.network.min_transfer_time, 60);
        assert_eq!(config.network.walking_speed, 1.3);
        assert_eq!(config.query.max_transfers, 2);
        assert_eq!(config.query.min_waiting_time, 300);
        assert!(!config.limits.allow_all_stops);
        assert_eq!(config.limits.max_transfers_cap, 4);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(matches!(
            Config::from_toml("[server]\nport = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            Config::load(Path::new("/no/such/tripscan.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
