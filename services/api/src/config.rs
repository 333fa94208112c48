//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    /// Restricts CORS to a single origin. Any origin is allowed when unset.
    pub cors_allow_origin: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Server Settings ---
        let bind_address_str = lookup("BIND_ADDRESS")
            .or_else(|| lookup("PORT").map(|port| format!("0.0.0.0:{}", port)))
            .unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        // --- Database Settings ---
        let database_url = lookup("DATABASE_URL")
            .or_else(|| lookup("DB_URL"))
            .ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().ok().filter(|n| *n > 0).ok_or_else(|| {
                ConfigError::InvalidValue(
                    "DB_MAX_CONNECTIONS".to_string(),
                    format!("'{}' is not a positive integer", raw),
                )
            })?,
            None => 5,
        };

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_allow_origin = lookup("CORS_ALLOW_ORIGIN").filter(|o| !o.trim().is_empty());

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            cors_allow_origin,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/assistant")]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:3000".parse().unwrap());
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.log_level, Level::INFO);
        assert!(config.cors_allow_origin.is_none());
    }

    #[test]
    fn database_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "DATABASE_URL"));
    }

    #[test]
    fn db_url_is_accepted_as_fallback() {
        let config = load(&[("DB_URL", "postgres://db/legacy")]).unwrap();
        assert_eq!(config.database_url, "postgres://db/legacy");
    }

    #[test]
    fn port_is_used_when_bind_address_is_unset() {
        let config = load(&[("DATABASE_URL", "postgres://x"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0:8080".parse().unwrap());

        let config = load(&[
            ("DATABASE_URL", "postgres://x"),
            ("PORT", "8080"),
            ("BIND_ADDRESS", "127.0.0.1:9000"),
        ])
        .unwrap();
        assert_eq!(config.bind_address, "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://x"), ("RUST_LOG", "loud")]),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://x"), ("DB_MAX_CONNECTIONS", "0")]),
            Err(ConfigError::InvalidValue(..))
        ));
        assert!(matches!(
            load(&[("DATABASE_URL", "postgres://x"), ("PORT", "http")]),
            Err(ConfigError::InvalidValue(..))
        ));
    }
}
