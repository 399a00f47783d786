use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::descriptor::{PoolLimits, RetryPolicy, EMBEDDED_MAX_CONNECTIONS};
use crate::env::EnvSnapshot;
use crate::error::{ConfigError, Result};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "todoblog.toml";

/// Overrides the HTTP bind address (`host:port`)
pub const BIND_ENV: &str = "TODOBLOG_BIND";

/// Port assigned by the hosting platform
pub const PORT_ENV: &str = "PORT";

/// Load `.env` from the current directory or its ancestors, if present.
///
/// Variables already set in the process environment win over the file.
/// Runs before tracing is installed, so the outcome is returned for the
/// caller to log.
pub fn load_dotenv() -> std::result::Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Application configuration, built once at startup and passed explicitly
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub seed: SeedSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Allow any CORS origin. Off by default.
    #[serde(default)]
    pub cors_permissive: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout_secs(),
            cors_permissive: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSettings {
    /// Directory holding one SQLite file per logical context
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub min_connections: u32,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,

    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            min_connections: 0,
            max_connections: default_max_connections(),
            idle_timeout_secs: default_idle_timeout_secs(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl DatabaseSettings {
    /// Pool bounds for a networked server
    pub fn networked_pool(&self) -> PoolLimits {
        PoolLimits {
            min_connections: self.min_connections,
            max_connections: self.max_connections,
            idle_timeout_secs: self.idle_timeout_secs,
            acquire_timeout_secs: self.acquire_timeout_secs,
        }
    }

    /// Pool bounds for an embedded file
    pub fn embedded_pool(&self) -> PoolLimits {
        let max_connections = self.max_connections.min(EMBEDDED_MAX_CONNECTIONS);
        PoolLimits {
            min_connections: self.min_connections.min(max_connections),
            max_connections,
            idle_timeout_secs: self.idle_timeout_secs,
            acquire_timeout_secs: self.acquire_timeout_secs,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            base_delay_ms: self.retry_base_delay_ms,
            max_delay_ms: self.retry_max_delay_ms,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedSettings {
    /// Insert sample to-do rows into an empty table at startup
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SeedSettings {
    fn default() -> Self {
        Self { enabled: true }
    }
}

// Default value functions for serde
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_max_connections() -> u32 {
    100
}

fn default_idle_timeout_secs() -> u64 {
    300
}

fn default_acquire_timeout_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    1_000
}

fn default_retry_max_delay_ms() -> u64 {
    30_000
}

fn default_true() -> bool {
    true
}

impl AppConfig {
    /// Load config from TOML.
    ///
    /// An explicit `path` must exist. Without one, `./todoblog.toml` is used
    /// when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound { path });
            }
            debug!("No {} found, using built-in defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;

        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse config from a TOML string
    pub fn from_toml(contents: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Apply environment overrides (`TODOBLOG_BIND`, `PORT`) and validate.
    pub fn with_env(mut self, env: &EnvSnapshot) -> Result<Self> {
        if let Some(bind) = env.get(BIND_ENV) {
            let addr: SocketAddr = bind
                .parse()
                .map_err(|_| ConfigError::invalid_value(BIND_ENV, "expected host:port"))?;
            self.server.host = addr.ip().to_string();
            self.server.port = addr.port();
        }

        if let Some(port) = env.get(PORT_ENV) {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::invalid_value(PORT_ENV, "expected a port number"))?;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check cross-field invariants
    pub fn validate(&self) -> Result<()> {
        let db = &self.database;
        if db.max_connections == 0 {
            return Err(ConfigError::invalid_value(
                "database.max_connections",
                "must be at least 1",
            ));
        }
        if db.min_connections > db.max_connections {
            return Err(ConfigError::invalid_value(
                "database.min_connections",
                "must not exceed max_connections",
            ));
        }
        if db.retry_base_delay_ms > db.retry_max_delay_ms {
            return Err(ConfigError::invalid_value(
                "database.retry_base_delay_ms",
                "must not exceed retry_max_delay_ms",
            ));
        }
        if db.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid_value("database.data_dir", "must not be empty"));
        }
        self.bind_addr()?;
        Ok(())
    }

    /// Socket address the HTTP listener binds to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let host = self.server.host.trim();
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(host);
        let ip: IpAddr = host
            .parse()
            .map_err(|_| ConfigError::invalid_value("server.host", "not a valid IP address"))?;
        Ok(SocketAddr::new(ip, self.server.port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.database.max_connections, 100);
        assert_eq!(config.database.idle_timeout_secs, 300);
        assert_eq!(config.database.max_retries, 3);
        assert!(config.seed.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            max_connections = 20

            [seed]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.idle_timeout_secs, 300);
        assert_eq!(config.server.port, 3000);
        assert!(!config.seed.enabled);
    }

    #[test]
    fn test_env_overrides_port_and_bind() {
        let env = EnvSnapshot::from_pairs([(BIND_ENV, "127.0.0.1:8080")]);
        let config = AppConfig::default().with_env(&env).unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "127.0.0.1:8080");

        let env = EnvSnapshot::from_pairs([(BIND_ENV, "127.0.0.1:8080"), (PORT_ENV, "9000")]);
        let config = AppConfig::default().with_env(&env).unwrap();
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_ipv6_bind_addresses() {
        let env = EnvSnapshot::from_pairs([(BIND_ENV, "[::1]:8080")]);
        let config = AppConfig::default().with_env(&env).unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "[::1]:8080");

        let config = AppConfig::from_toml("[server]\nhost = \"::\"\nport = 4000\n").unwrap();
        assert_eq!(config.bind_addr().unwrap().to_string(), "[::]:4000");

        let config = AppConfig::from_toml("[server]\nhost = \"[::1]\"\n").unwrap();
        assert_eq!(config.bind_addr().unwrap().port(), 3000);
    }

    #[test]
    fn test_bad_host_is_rejected() {
        let config = AppConfig::from_toml("[server]\nhost = \"localhost\"\n").unwrap();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let env = EnvSnapshot::from_pairs([(PORT_ENV, "eighty")]);
        let err = AppConfig::default().with_env(&env).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_min_above_max_is_rejected() {
        let mut config = AppConfig::default();
        config.database.min_connections = 10;
        config.database.max_connections = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_embedded_pool_is_capped() {
        let settings = DatabaseSettings::default();
        let pool = settings.embedded_pool();
        assert_eq!(pool.max_connections, EMBEDDED_MAX_CONNECTIONS);
        assert_eq!(settings.networked_pool().max_connections, 100);
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        let err = AppConfig::load(Some(&missing)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todoblog.toml");
        fs::write(&path, "[server]\nport = 4000\n").unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn test_invalid_toml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("todoblog.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        let err = AppConfig::load(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("todoblog.toml"));
    }
}
