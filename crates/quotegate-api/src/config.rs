// Server configuration loaded from environment variables.
// Decision: Plain env vars (optionally from .env), no config files
// Decision: Every loader takes a lookup function so tests never touch the process env

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

const MAX_UPSTREAM_TIMEOUT_SECS: u64 = 10 * 60;

/// Configuration loading error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has an invalid value: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

/// Read a variable, treating empty strings as unset
pub(crate) fn non_empty<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).filter(|v| !v.trim().is_empty())
}

/// Parse a variable with `FromStr`, falling back to `default` when unset
pub(crate) fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match non_empty(lookup, name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        None => Ok(default),
    }
}

/// Parse a whole number of seconds in `1..=max_secs`, falling back to `default` when unset
pub(crate) fn duration_secs_or<F>(
    lookup: &F,
    name: &'static str,
    default: Duration,
    max_secs: u64,
) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = parse_or(lookup, name, default.as_secs())?;
    if secs == 0 || secs > max_secs {
        return Err(ConfigError::InvalidValue {
            name,
            value: secs.to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

/// Parse a boolean flag ("true"/"1"/"yes" or "false"/"0"/"no", case-insensitive)
pub(crate) fn flag_or<F>(lookup: &F, name: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, name) {
        Some(value) => match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue { name, value }),
        },
        None => Ok(default),
    }
}

/// Process-level settings: listener, CORS and upstream clients
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: SocketAddr,
    /// Allowed CORS origins; empty means any origin
    pub cors_origins: Vec<String>,
    /// Timeout applied to every outbound HTTP call
    pub upstream_timeout: Duration,
    /// Base URL of the Yahoo Finance API
    pub yahoo_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            cors_origins: Vec::new(),
            upstream_timeout: Duration::from_secs(10),
            yahoo_base_url: quotegate_core::yahoo::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bind_addr = parse_or(&lookup, "BIND_ADDR", defaults.bind_addr)?;

        // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
        let cors_origins = non_empty(&lookup, "CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let upstream_timeout = duration_secs_or(
            &lookup,
            "UPSTREAM_TIMEOUT_SECS",
            defaults.upstream_timeout,
            MAX_UPSTREAM_TIMEOUT_SECS,
        )?;

        let yahoo_base_url =
            non_empty(&lookup, "YAHOO_FINANCE_BASE_URL").unwrap_or(defaults.yahoo_base_url);

        Ok(Self {
            bind_addr,
            cors_origins,
            upstream_timeout,
            yahoo_base_url,
        })
    }
}
