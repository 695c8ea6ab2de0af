//! HTTP Server Configuration
//!
//! Values come from, lowest precedence first: built-in defaults, an
//! optional JSON file, environment variables, then command-line flags.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::api::ClearKey;

/// Environment variable overriding `host`
pub const ENV_HOST: &str = "RAGINDEX_HOST";
/// Environment variable overriding `port`
pub const ENV_PORT: &str = "RAGINDEX_PORT";
/// Environment variable overriding `database_path`
pub const ENV_DATABASE: &str = "RAGINDEX_DATABASE";
/// Environment variable overriding `clear_key`
pub const ENV_CLEAR_KEY: &str = "CLEAR_KEY";

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },

    #[error("{0}")]
    Invalid(String),
}

/// HTTP server configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8788)
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite file, or ":memory:" (default: "ragindex.db")
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Secret for the clear endpoint; unset means the insecure local key
    #[serde(default)]
    pub clear_key: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8788
}

fn default_database_path() -> String {
    "ragindex.db".to_string()
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_path: default_database_path(),
            clear_key: None,
        }
    }
}

impl fmt::Debug for HttpServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_path", &self.database_path)
            .field("clear_key", &self.clear_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file; missing keys take defaults
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: HttpServerConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) -> ConfigResult<()> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from `lookup`; an unset variable leaves the field alone
    pub fn apply_env_from<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                var: ENV_PORT,
                value: port.clone(),
            })?;
        }
        if let Some(database) = lookup(ENV_DATABASE) {
            self.database_path = database;
        }
        if let Some(key) = lookup(ENV_CLEAR_KEY) {
            self.clear_key = Some(key);
        }
        self.validate()
    }

    /// Reject values that cannot be served
    pub fn validate(&self) -> ConfigResult<()> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        if self.database_path.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path must not be empty".to_string(),
            ));
        }
        // An empty key is a mistake, not a request for the local default.
        if matches!(self.clear_key.as_deref(), Some("")) {
            return Err(ConfigError::Invalid(
                "clear_key is set but empty; unset it to use the local default".to_string(),
            ));
        }
        Ok(())
    }

    /// The clear-endpoint secret in effect
    pub fn clear_key(&self) -> ClearKey {
        ClearKey::from_configured(self.clear_key.clone())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = HttpServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8788);
        assert_eq!(config.database_path, "ragindex.db");
        assert!(config.clear_key().is_insecure_default());
    }

    #[test]
    fn test_socket_addr() {
        let config = HttpServerConfig::with_port(8080);
        assert_eq!(config.socket_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 9000, "clear_key": "from-file"}}"#).unwrap();

        let config = HttpServerConfig::load(file.path()).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.clear_key().secret(), "from-file");
    }

    #[test]
    fn test_load_rejects_bad_json_and_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{port:").unwrap();
        assert!(matches!(
            HttpServerConfig::load(file.path()),
            Err(ConfigError::Parse(_))
        ));

        let missing = Path::new("/definitely/not/here/ragindex.json");
        assert!(matches!(
            HttpServerConfig::load(missing),
            Err(ConfigError::Read { .. })
        ));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = HttpServerConfig {
            clear_key: Some("from-file".to_string()),
            ..Default::default()
        };
        config
            .apply_env_from(env(&[
                (ENV_PORT, "9100"),
                (ENV_DATABASE, ":memory:"),
                (ENV_CLEAR_KEY, "from-env"),
            ]))
            .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.clear_key().secret(), "from-env");
    }

    #[test]
    fn test_unset_env_keeps_values() {
        let mut config = HttpServerConfig::with_port(1234);
        config.apply_env_from(env(&[])).unwrap();
        assert_eq!(config.port, 1234);
        assert!(config.clear_key.is_none());
    }

    #[test]
    fn test_invalid_env_port() {
        let mut config = HttpServerConfig::default();
        let err = config
            .apply_env_from(env(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { var: ENV_PORT, .. }));
    }

    #[test]
    fn test_empty_clear_key_is_rejected() {
        let mut config = HttpServerConfig::default();
        let err = config
            .apply_env_from(env(&[(ENV_CLEAR_KEY, "")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_debug_redacts_clear_key() {
        let config = HttpServerConfig {
            clear_key: Some("super-secret".to_string()),
            ..Default::default()
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
    }
}
