use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderName;
use rating_service_shared::types::{DuplicatePolicy, VotePolicies};

use crate::errors::ServiceError;

/// Default address the HTTP server binds to.
const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default HTTP port.
const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default upper bound of pooled database connections.
const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Default time to wait for a pooled connection, in seconds.
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Default header carrying the authenticated caller's user id.
const DEFAULT_CALLER_ID_HEADER: &str = "x-user-id";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, multi-line console output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "console" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ServiceError::config(format!(
                "LOG_FORMAT must be \"json\" or \"pretty\", got \"{other}\""
            ))),
        }
    }
}

impl LogFormat {
    /// Reads `LOG_FORMAT`, defaulting to pretty output when unset.
    pub fn from_env() -> Result<Self, ServiceError> {
        env::var("LOG_FORMAT")
            .ok()
            .map(|value| value.parse())
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

/// Runtime configuration of the service.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub server_addr: SocketAddr,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
    pub policies: VotePolicies,
    pub caller_id_header: HeaderName,
}

impl Config {
    /// Reads the configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `DATABASE_URL`: PostgreSQL connection string (required)
    /// - `SERVER_HOST`: Bind address (default: 127.0.0.1)
    /// - `SERVER_PORT`: Bind port (default: 8080)
    /// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
    /// - `DATABASE_ACQUIRE_TIMEOUT_SECS`: Pool acquire timeout (default: 5)
    /// - `RUN_MIGRATIONS`: Apply schema migrations on startup (default: true)
    /// - `POST_VOTE_POLICY`: "reject" or "replace" (default: reject)
    /// - `COMMENT_VOTE_POLICY`: "reject" or "replace" (default: replace)
    /// - `CALLER_ID_HEADER`: Header holding the caller's user id (default: x-user-id)
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Every value present and well formed
    /// * `Err(ServiceError::Config)` - `DATABASE_URL` missing or a value malformed
    pub fn from_env() -> Result<Self, ServiceError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServiceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ServiceError::config("DATABASE_URL must be set"))?;

        let host: IpAddr = parse_or(&lookup, "SERVER_HOST", DEFAULT_SERVER_HOST.parse().ok())?;
        let port: u16 = parse_or(&lookup, "SERVER_PORT", Some(DEFAULT_SERVER_PORT))?;
        let max_connections: u32 =
            parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", Some(DEFAULT_MAX_CONNECTIONS))?;
        if max_connections == 0 {
            return Err(ServiceError::config(
                "DATABASE_MAX_CONNECTIONS must be at least 1",
            ));
        }
        let acquire_timeout_secs: u64 = parse_or(
            &lookup,
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            Some(DEFAULT_ACQUIRE_TIMEOUT_SECS),
        )?;
        let run_migrations: bool = parse_or(&lookup, "RUN_MIGRATIONS", Some(true))?;

        let defaults = VotePolicies::default();
        let policies = VotePolicies {
            post: parse_or::<DuplicatePolicy, _>(&lookup, "POST_VOTE_POLICY", Some(defaults.post))?,
            comment: parse_or::<DuplicatePolicy, _>(
                &lookup,
                "COMMENT_VOTE_POLICY",
                Some(defaults.comment),
            )?,
        };

        let caller_id_header = lookup("CALLER_ID_HEADER")
            .unwrap_or_else(|| DEFAULT_CALLER_ID_HEADER.to_string());
        let caller_id_header = HeaderName::from_str(caller_id_header.trim())
            .map_err(|e| ServiceError::config(format!("CALLER_ID_HEADER is not a header name: {e}")))?;

        Ok(Self {
            database_url,
            server_addr: SocketAddr::new(host, port),
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            run_migrations,
            policies,
            caller_id_header,
        })
    }
}

/// Parses `key` when present, otherwise falls back to `default`.
fn parse_or<T, F>(lookup: &F, key: &str, default: Option<T>) -> Result<T, ServiceError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ServiceError::config(format!("{key} is invalid: {e}"))),
        None => default.ok_or_else(|| ServiceError::config(format!("{key} must be set"))),
    }
}
