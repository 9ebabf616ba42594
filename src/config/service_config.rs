//! Service Configuration - server, storage and scoring sections
//!
//! Each struct implements `Default` with the values the service ships with,
//! so a missing file or a partially filled one always yields a usable config.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::{CONFIG_ENV_VAR, DEFAULT_DATA_DIR, DEFAULT_SERVER_ADDR, LOCAL_CONFIG_FILE};
use super::ScoringConfig;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for one service deployment.
///
/// Load with [`ServiceConfig::load`] which searches:
/// 1. an explicit path (CLI `--config`)
/// 2. `$ERW_CONFIG`
/// 3. `./erw_config.toml`
/// 4. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Site store configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Versioned scoring formula
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Result of config discovery: the config plus the file it came from, if any.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: ServiceConfig,
    pub source: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load configuration using the standard search order.
    ///
    /// A file that exists but fails to load is logged and skipped; the search
    /// continues with the next candidate.
    pub fn load(explicit: Option<&Path>) -> LoadedConfig {
        let mut candidates: Vec<(PathBuf, &str)> = Vec::new();
        if let Some(path) = explicit {
            candidates.push((path.to_path_buf(), "--config"));
        }
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            candidates.push((PathBuf::from(path), CONFIG_ENV_VAR));
        }
        candidates.push((PathBuf::from(LOCAL_CONFIG_FILE), "working directory"));

        for (path, origin) in candidates {
            if !path.exists() {
                if origin != "working directory" {
                    warn!(path = %path.display(), origin, "Config path does not exist, falling back");
                }
                continue;
            }
            match Self::load_from_file(&path) {
                Ok(config) => {
                    info!(
                        path = %path.display(),
                        origin,
                        scoring_version = %config.scoring.version,
                        "Loaded service config"
                    );
                    return LoadedConfig {
                        config,
                        source: Some(path),
                    };
                }
                Err(e) => {
                    warn!(path = %path.display(), origin, error = %e, "Failed to load config, falling back");
                }
            }
        }

        info!("No erw_config.toml found, using built-in defaults");
        LoadedConfig {
            config: Self::default(),
            source: None,
        }
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Two-pass: unknown keys are reported as warnings first, then the
    /// document is deserialized and validated.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate every section, collecting all problems.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.server.addr.parse::<SocketAddr>().is_err() {
            errors.push(format!(
                "server.addr '{}' is not a valid socket address",
                self.server.addr
            ));
        }

        if self.storage.backend == StorageBackend::Sled && self.storage.data_dir.as_os_str().is_empty() {
            errors.push("storage.data_dir must be set when storage.backend = \"sled\"".to_string());
        }

        if let Err(ConfigError::Validation(scoring_errors)) = self.scoring.validate() {
            errors.extend(scoring_errors);
        }

        let (range_errors, range_warnings) = super::validation::validate_scoring_ranges(&self.scoring);
        errors.extend(range_errors.into_iter().map(|e| format!("scoring.{e}")));
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Config parse error ({}): {1}", .0.display())]
    Parse(PathBuf, #[source] toml::de::Error),

    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config validation failed:\n{}", format_errors(.0))]
    Validation(Vec<String>),
}

fn format_errors(errors: &[String]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {e}"))
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `ERW_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    DEFAULT_SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Storage Config
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Sled,
    Memory,
}

/// Site store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the sled database (ignored by the memory backend).
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = ServiceConfig::default();
        assert!(config.validate().is_ok(), "Default config must always validate");
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config = ServiceConfig::from_toml_str("").expect("empty TOML should parse");
        assert_eq!(config, ServiceConfig::default());
        assert_eq!(config.server.addr, "0.0.0.0:8080");
        assert_eq!(config.storage.backend, StorageBackend::Sled);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml_str = r#"
[server]
addr = "127.0.0.1:9090"

[storage]
backend = "memory"

[scoring.cost]
basalt_cost_per_ton = 40.0
"#;
        let config = ServiceConfig::from_toml_str(toml_str).expect("partial TOML should parse");
        assert_eq!(config.server.addr, "127.0.0.1:9090");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.scoring.cost.basalt_cost_per_ton, 40.0);
        // Non-overridden values retain defaults
        assert_eq!(config.scoring.cost.truck_cost_per_ton_km, 0.18);
        assert_eq!(config.storage.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_invalid_addr_rejected() {
        let mut config = ServiceConfig::default();
        config.server.addr = "not-an-address".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("server.addr"));
    }

    #[test]
    fn test_validation_collects_scoring_errors() {
        let toml_str = r#"
[scoring.normalizers]
soil_ph_optimum = -1.0
"#;
        match ServiceConfig::from_toml_str(toml_str) {
            Err(ConfigError::Validation(errors)) => {
                assert!(errors.iter().any(|e| e.contains("soil_ph_optimum")));
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn test_roundtrip_toml() {
        let original = ServiceConfig::default();
        let toml_str = original.to_toml().expect("serialization should work");
        assert!(toml_str.contains("[server]"));
        assert!(toml_str.contains("[scoring.weights.overall]"));
        let back = ServiceConfig::from_toml_str(&toml_str).expect("deserialization should work");
        assert_eq!(back, original);
    }

    #[test]
    fn test_load_from_file_reports_path_on_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[server\naddr = ").unwrap();
        let err = ServiceConfig::load_from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(ref p, _) if p == &path));
    }

    #[test]
    fn test_load_prefers_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("erw.toml");
        std::fs::write(&path, "[scoring]\nversion = \"3.1\"\n").unwrap();
        let loaded = ServiceConfig::load(Some(&path));
        assert_eq!(loaded.source.as_deref(), Some(path.as_path()));
        assert_eq!(loaded.config.scoring.version, "3.1");
    }
}
