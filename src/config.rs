//! Configuration module
//!
//! Loads configuration from environment variables.

use std::env;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// AWS region of the DSQL cluster
    pub region: String,

    /// Cluster endpoint hostname
    pub cluster_endpoint: String,

    /// Database role used for IAM authentication
    pub database_user: String,

    /// Database name
    pub database_name: String,

    /// Database port
    pub database_port: u16,

    /// Maximum database connections in pool
    pub database_max_connections: u32,

    /// Lifetime of the generated auth token in seconds
    pub auth_token_expires_secs: u64,

    /// Default per-request deadline in seconds
    pub request_timeout_secs: u64,

    /// API server host
    pub host: String,

    /// API server port
    pub port: u16,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::MissingEnv(key))
        };

        let region = required("AWS_REGION")?;
        let cluster_endpoint = required("AWS_CLUSTER_ENDPOINT")?;

        let database_user = lookup("DATABASE_USER").unwrap_or_else(|| "admin".to_string());
        let database_name = lookup("DATABASE_NAME").unwrap_or_else(|| "postgres".to_string());

        let database_port = parse_or(&lookup, "DATABASE_PORT", 5432)?;
        let database_max_connections = parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?;
        let auth_token_expires_secs = parse_or(&lookup, "AUTH_TOKEN_EXPIRES_SECS", 900)?;
        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;

        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 3000)?;

        Ok(Self {
            region,
            cluster_endpoint,
            database_user,
            database_name,
            database_port,
            database_max_connections,
            auth_token_expires_secs,
            request_timeout_secs,
            host,
            port,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue(key)),
        None => Ok(default),
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnv(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),
}
