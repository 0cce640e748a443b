//! Configuration management
//!
//! Configuration is read once at startup from `config.yml` and then
//! overridden by `BOOKRATE_*` environment variables. Missing values are
//! filled with defaults. The resulting [`Config`] is immutable and shared
//! by reference for the lifetime of the process.

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Token signing configuration
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite file path, `sqlite:` URL or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/bookrate.db".to_string()
}

/// Token signing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared HMAC secret. Must be set; there is no usable default.
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    #[serde(default = "default_access_token_ttl")]
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds
    #[serde(default = "default_refresh_token_ttl")]
    pub refresh_token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            access_token_ttl_secs: default_access_token_ttl(),
            refresh_token_ttl_secs: default_refresh_token_ttl(),
        }
    }
}

/// Upper bound for either token lifetime (ten years)
pub const MAX_TOKEN_TTL_SECS: i64 = 10 * 365 * 24 * 60 * 60;

fn default_access_token_ttl() -> i64 {
    60 * 60
}

fn default_refresh_token_ttl() -> i64 {
    24 * 60 * 60
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// A missing or empty file yields the defaults. Invalid YAML is an error
    /// carrying the line and column of the problem.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })
    }

    /// Load configuration from file, apply environment overrides and validate
    ///
    /// Recognized variables:
    /// - BOOKRATE_SERVER_HOST
    /// - BOOKRATE_SERVER_PORT
    /// - BOOKRATE_SERVER_CORS_ORIGIN
    /// - BOOKRATE_DATABASE_URL
    /// - BOOKRATE_AUTH_JWT_SECRET
    /// - BOOKRATE_AUTH_ACCESS_TOKEN_TTL_SECS
    /// - BOOKRATE_AUTH_REFRESH_TOKEN_TTL_SECS
    pub fn load_with_env(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "auth.jwt_secret must be set".to_string(),
            ));
        }
        if self.auth.access_token_ttl_secs <= 0 || self.auth.refresh_token_ttl_secs <= 0 {
            return Err(ConfigError::ValidationError(
                "token lifetimes must be positive".to_string(),
            ));
        }
        if self.auth.access_token_ttl_secs > MAX_TOKEN_TTL_SECS
            || self.auth.refresh_token_ttl_secs > MAX_TOKEN_TTL_SECS
        {
            return Err(ConfigError::ValidationError(format!(
                "token lifetimes must not exceed {} seconds",
                MAX_TOKEN_TTL_SECS
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("BOOKRATE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("BOOKRATE_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("BOOKRATE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(url) = std::env::var("BOOKRATE_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(secret) = std::env::var("BOOKRATE_AUTH_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(ttl) = std::env::var("BOOKRATE_AUTH_ACCESS_TOKEN_TTL_SECS") {
            if let Ok(ttl) = ttl.parse::<i64>() {
                self.auth.access_token_ttl_secs = ttl;
            }
        }
        if let Ok(ttl) = std::env::var("BOOKRATE_AUTH_REFRESH_TOKEN_TTL_SECS") {
            if let Ok(ttl) = ttl.parse::<i64>() {
                self.auth.refresh_token_ttl_secs = ttl;
            }
        }
    }
}

fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_KEYS: &[&str] = &[
        "BOOKRATE_SERVER_HOST",
        "BOOKRATE_SERVER_PORT",
        "BOOKRATE_SERVER_CORS_ORIGIN",
        "BOOKRATE_DATABASE_URL",
        "BOOKRATE_AUTH_JWT_SECRET",
        "BOOKRATE_AUTH_ACCESS_TOKEN_TTL_SECS",
        "BOOKRATE_AUTH_REFRESH_TOKEN_TTL_SECS",
    ];

    static ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        let guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
        guard
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let config = Config::load(std::path::Path::new("nonexistent_config.yml")).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "data/bookrate.db");
        assert_eq!(config.auth.access_token_ttl_secs, 3600);
        assert_eq!(config.auth.refresh_token_ttl_secs, 86400);
        assert!(config.auth.jwt_secret.is_empty());
    }

    #[test]
    fn test_load_empty_file_returns_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "   \n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "auth:\n  jwt_secret: s3cret\n").unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.access_token_ttl_secs, 3600);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 9000
  cors_origin: "https://book.example"
database:
  url: "sqlite:/var/lib/bookrate.db"
auth:
  jwt_secret: "topsecret"
  access_token_ttl_secs: 600
  refresh_token_ttl_secs: 7200
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.cors_origin, "https://book.example");
        assert_eq!(config.database.url, "sqlite:/var/lib/bookrate.db");
        assert_eq!(config.auth.jwt_secret, "topsecret");
        assert_eq!(config.auth.access_token_ttl_secs, 600);
        assert_eq!(config.auth.refresh_token_ttl_secs, 7200);
    }

    #[test]
    fn test_load_invalid_yaml_reports_location() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: not_a_number\n").unwrap();

        let err = Config::load(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("line"));
    }

    #[test]
    fn test_validate_requires_secret() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        let mut config = Config::default();
        config.auth.jwt_secret = "secret".to_string();
        assert!(config.validate().is_ok());

        config.auth.refresh_token_ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_token_lifetimes() {
        let mut config = Config::default();
        config.auth.jwt_secret = "secret".to_string();
        config.auth.access_token_ttl_secs = MAX_TOKEN_TTL_SECS;
        assert!(config.validate().is_ok());

        config.auth.access_token_ttl_secs = i64::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));

        config.auth.access_token_ttl_secs = 3600;
        config.auth.refresh_token_ttl_secs = MAX_TOKEN_TTL_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let _guard = lock_env();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: 8080\nauth:\n  jwt_secret: from-file\n").unwrap();

        std::env::set_var("BOOKRATE_SERVER_PORT", "4000");
        std::env::set_var("BOOKRATE_AUTH_JWT_SECRET", "from-env");
        std::env::set_var("BOOKRATE_DATABASE_URL", ":memory:");

        let config = Config::load_with_env(file.path()).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.database.url, ":memory:");

        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_env_invalid_numbers_ignored() {
        let _guard = lock_env();
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "auth:\n  jwt_secret: abc\n").unwrap();

        std::env::set_var("BOOKRATE_SERVER_PORT", "not_a_number");
        std::env::set_var("BOOKRATE_AUTH_ACCESS_TOKEN_TTL_SECS", "soon");

        let config = Config::load_with_env(file.path()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.access_token_ttl_secs, 3600);

        for key in ENV_KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_load_with_env_rejects_missing_secret() {
        let _guard = lock_env();
        let file = NamedTempFile::new().unwrap();

        let result = Config::load_with_env(file.path());
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
