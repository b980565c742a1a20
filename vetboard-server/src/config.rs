//! Server configuration - defaults, TOML file, then environment
//!
//! Layers, later wins:
//! 1. built-in defaults
//! 2. optional TOML file (`--config vetboard.toml`)
//! 3. environment variables:
//!    - `DATABASE_URL`
//!    - `VETBOARD_JWT_SECRET`
//!    - `VETBOARD_BIND` (e.g. `0.0.0.0:8080`)
//!    - `VETBOARD_MAX_CONNECTIONS`
//!    - `VETBOARD_REQUEST_TIMEOUT_SECS`
//!
//! The CLI applies its own flags on top of the loaded value.

use std::net::SocketAddr;
use std::path::Path;

use serde::Deserialize;

/// Default maximum connections for the pool.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// PostgreSQL connection string
    pub database_url: String,

    /// HS256 secret used to verify bearer tokens
    pub jwt_secret: String,

    /// Pool size
    pub max_connections: u32,

    /// Per-request timeout
    pub request_timeout_secs: u64,

    /// Allowed CORS origins. Ignored when `cors_permissive` is set.
    pub cors_origins: Vec<String>,

    /// Allow any origin. Development only.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            database_url: "postgres://localhost/vetboard".to_string(),
            jwt_secret: String::new(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            cors_permissive: false,
        }
    }
}

/// Shape of the TOML file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind: Option<String>,
    database_url: Option<String>,
    jwt_secret: Option<String>,
    max_connections: Option<u32>,
    request_timeout_secs: Option<u64>,
    cors_origins: Option<Vec<String>>,
    cors_permissive: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error("{0} must be set")]
    Missing(&'static str),
}

impl ServerConfig {
    /// Load defaults, then the optional file, then the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = path {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;
            config.merge_toml(&raw).map_err(|e| match e {
                ConfigError::Parse { source, .. } => ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                },
                other => other,
            })?;
        }

        config.merge_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply values from a TOML document.
    pub fn merge_toml(&mut self, raw: &str) -> Result<(), ConfigError> {
        let file: FileConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: "<inline>".to_string(),
            source,
        })?;

        if let Some(bind) = file.bind {
            self.bind_addr = parse_bind(&bind)?;
        }
        if let Some(url) = file.database_url {
            self.database_url = url;
        }
        if let Some(secret) = file.jwt_secret {
            self.jwt_secret = secret;
        }
        if let Some(max) = file.max_connections {
            self.max_connections = max;
        }
        if let Some(secs) = file.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
        if let Some(origins) = file.cors_origins {
            self.cors_origins = origins;
        }
        if let Some(permissive) = file.cors_permissive {
            self.cors_permissive = permissive;
        }
        Ok(())
    }

    /// Apply environment overrides through `lookup` (injectable for tests).
    pub fn merge_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(secret) = lookup("VETBOARD_JWT_SECRET") {
            self.jwt_secret = secret;
        }
        if let Some(bind) = lookup("VETBOARD_BIND") {
            self.bind_addr = parse_bind(&bind)?;
        }
        if let Some(max) = lookup("VETBOARD_MAX_CONNECTIONS") {
            self.max_connections = max.parse().map_err(|_| ConfigError::InvalidValue {
                key: "VETBOARD_MAX_CONNECTIONS",
                value: max.clone(),
            })?;
        }
        if let Some(secs) = lookup("VETBOARD_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = secs.parse().map_err(|_| ConfigError::InvalidValue {
                key: "VETBOARD_REQUEST_TIMEOUT_SECS",
                value: secs.clone(),
            })?;
        }
        Ok(())
    }

    /// Check the values the server cannot start without.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }
        if self.jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("VETBOARD_JWT_SECRET"));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                key: "max_connections",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_bind(value: &str) -> Result<SocketAddr, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: "bind",
        value: value.to_string(),
    })
}
