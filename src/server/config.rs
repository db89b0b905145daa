use serde::Deserialize;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::inventory::catalog::{CatalogConfig, CatalogOverrides};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file at {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML from config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to load config from environment: {0}")]
    Env(#[from] envy::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub log_dir: String,
    /// Allowed CORS origin; any origin when unset.
    pub frontend_url: Option<String>,
    pub reliablesite_api_url: Option<String>,
    pub reliablesite_api_key: Option<String>,
    pub reliablesite_namespace: String,
    pub upstream_timeout: Duration,
    pub amp_api_url: Option<String>,
    pub amp_api_token: Option<String>,
    pub catalog: CatalogConfig,
}

// Partial config for layering
#[derive(Deserialize, Default, Debug)]
pub struct PartialServerConfig {
    pub listen_addr: Option<String>,
    pub log_dir: Option<String>,
    pub frontend_url: Option<String>,
    pub reliablesite_api_url: Option<String>,
    pub reliablesite_api_key: Option<String>,
    pub reliablesite_namespace: Option<String>,
    pub upstream_timeout_secs: Option<u64>,
    pub amp_api_url: Option<String>,
    pub amp_api_token: Option<String>,
}

/// Shape of the optional TOML file: the same keys as the environment plus a
/// `[catalog]` table.
#[derive(Deserialize, Default, Debug)]
pub struct FileConfig {
    #[serde(flatten)]
    pub settings: PartialServerConfig,
    #[serde(default)]
    pub catalog: CatalogOverrides,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_namespace() -> String {
    "http://tempuri.org/".to_string()
}

const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 8;

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ServerConfig {
    pub fn load(config_path: Option<&str>) -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        // 1. Load from file (optional)
        let file_config = match config_path.map(Path::new) {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                toml::from_str(&contents)?
            }
            _ => FileConfig::default(),
        };

        // 2. Load from environment variables
        let env_config = envy::from_env::<PartialServerConfig>()?;

        // 3. Merge: environment overrides file
        Self::from_layers(file_config, env_config)
    }

    pub fn from_layers(file: FileConfig, env: PartialServerConfig) -> Result<Self, ConfigError> {
        let FileConfig {
            settings: file,
            catalog,
        } = file;

        let listen_addr_raw = non_blank(env.listen_addr.or(file.listen_addr))
            .unwrap_or_else(default_listen_addr);
        let listen_addr = listen_addr_raw.parse::<SocketAddr>().map_err(|e| {
            ConfigError::Invalid(format!(
                "listen_addr '{listen_addr_raw}' is not a socket address: {e}"
            ))
        })?;

        let timeout_secs = env
            .upstream_timeout_secs
            .or(file.upstream_timeout_secs)
            .unwrap_or(DEFAULT_UPSTREAM_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "upstream_timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(ServerConfig {
            listen_addr,
            log_dir: non_blank(env.log_dir.or(file.log_dir)).unwrap_or_else(default_log_dir),
            frontend_url: non_blank(env.frontend_url.or(file.frontend_url)),
            reliablesite_api_url: non_blank(env.reliablesite_api_url.or(file.reliablesite_api_url)),
            reliablesite_api_key: non_blank(env.reliablesite_api_key.or(file.reliablesite_api_key)),
            reliablesite_namespace: non_blank(
                env.reliablesite_namespace.or(file.reliablesite_namespace),
            )
            .unwrap_or_else(default_namespace),
            upstream_timeout: Duration::from_secs(timeout_secs),
            amp_api_url: non_blank(env.amp_api_url.or(file.amp_api_url)),
            amp_api_token: non_blank(env.amp_api_token.or(file.amp_api_token)),
            catalog: CatalogConfig::with_overrides(catalog),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::Tier;

    #[test]
    fn test_defaults_without_any_layer() {
        let config = ServerConfig::from_layers(FileConfig::default(), PartialServerConfig::default())
            .unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:3001".parse().unwrap());
        assert_eq!(config.log_dir, "logs");
        assert_eq!(config.reliablesite_namespace, "http://tempuri.org/");
        assert_eq!(config.upstream_timeout, Duration::from_secs(8));
        assert!(config.reliablesite_api_url.is_none());
        assert!(config.amp_api_url.is_none());
        assert_eq!(config.catalog.markup.rate(Tier::Core), 0.25);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            listen_addr = "127.0.0.1:8080"
            reliablesite_api_url = "https://file.example/api.asmx"
            upstream_timeout_secs = 3

            [catalog.markup]
            VELOCITY = 0.5
            "#,
        )
        .unwrap();
        let env = PartialServerConfig {
            reliablesite_api_url: Some("https://env.example/api.asmx".to_string()),
            reliablesite_api_key: Some("   ".to_string()),
            ..Default::default()
        };

        let config = ServerConfig::from_layers(file, env).unwrap();
        assert_eq!(config.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(
            config.reliablesite_api_url.as_deref(),
            Some("https://env.example/api.asmx")
        );
        assert!(config.reliablesite_api_key.is_none());
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.catalog.markup.rate(Tier::Velocity), 0.5);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let env = PartialServerConfig {
            listen_addr: Some("not-an-address".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ServerConfig::from_layers(FileConfig::default(), env),
            Err(ConfigError::Invalid(_))
        ));

        let env = PartialServerConfig {
            upstream_timeout_secs: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            ServerConfig::from_layers(FileConfig::default(), env),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = ServerConfig::load(Some("/definitely/not/here.toml"));
        // Environment may add values, but the missing file itself is not an error.
        assert!(!matches!(config, Err(ConfigError::Read { .. })));
    }
}
