//! Server configuration module.
//!
//! This module provides configuration loading for the auth server from
//! environment variables.
//!
//! # Environment Variables
//!
//! - `AUTH_ENV`: Deployment environment, `local`, `dev` or `prod` (default: `local`)
//! - `AUTH_STORAGE_PATH`: Path of the credential log file (required)
//! - `AUTH_TOKEN_TTL`: Token lifetime, e.g. `3600`, `90s`, `15m`, `1h`, `1d` (required)
//! - `AUTH_LISTEN_PORT`: Port to listen on (default: `44044`)
//! - `AUTH_REQUEST_TIMEOUT`: Per-request deadline, same format as the TTL (default: `10s`)
//! - `AUTH_ADMIN_EMAILS`: Comma-separated emails granted admin rights at startup (optional)
//!
//! # Invariants
//!
//! - `token_ttl` and `request_timeout` are always non-zero
//! - `listen_port` is always a valid port number (1-65535)
//! - `admin_emails` holds no empty entries

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Deployment environment. Selects the log format and verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Local,
    Dev,
    Prod,
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(Self::Local),
            "dev" => Ok(Self::Dev),
            "prod" => Ok(Self::Prod),
            other => Err(format!(
                "'{other}' is not a known environment (expected local, dev or prod)"
            )),
        }
    }
}

/// Server configuration.
///
/// Contains all configuration parameters needed to run the auth server.
///
/// # Pre-conditions
///
/// When constructed via `from_env()`:
/// - All required environment variables must be set
/// - All values must be valid for their respective types
///
/// # Post-conditions
///
/// - `listen_port` is always in the valid range (1-65535)
/// - `token_ttl` is positive
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Deployment environment.
    pub env: Environment,
    /// Path of the append-only credential log.
    pub storage_path: PathBuf,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
    /// Port to listen on for WebSocket connections.
    pub listen_port: u16,
    /// Deadline for serving a single request.
    pub request_timeout: Duration,
    /// Users promoted to admin when the server starts.
    pub admin_emails: Vec<String>,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable is missing.
    MissingEnvVar(String),
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnvVar(name) => {
                write!(f, "missing required environment variable: {name}")
            }
            Self::InvalidValue { name, message } => {
                write!(f, "invalid value for {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Parse a duration such as `3600`, `90s`, `15m`, `1h` or `1d`.
/// A bare number is seconds. Zero is rejected.
///
/// # Errors
///
/// Returns a description of the problem if the value is malformed or zero.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let split = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, unit) = value.split_at(split);

    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("'{value}' is not a duration (expected e.g. 90s, 15m, 1h)"))?;
    let multiplier = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        other => return Err(format!("unknown duration unit '{other}' in '{value}'")),
    };
    let secs = amount
        .checked_mul(multiplier)
        .ok_or_else(|| format!("'{value}' is too large"))?;
    if secs == 0 {
        return Err("must be greater than zero".to_string());
    }
    Ok(Duration::from_secs(secs))
}

impl ServerConfig {
    /// Default port for the server.
    pub const DEFAULT_PORT: u16 = 44044;
    /// Default per-request deadline.
    pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `AUTH_STORAGE_PATH` or `AUTH_TOKEN_TTL` is not set or is empty
    /// - Any variable is set but cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the value of a
    /// variable if it is set.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = match lookup("AUTH_ENV") {
            Some(value) => value.parse().map_err(|message| ConfigError::InvalidValue {
                name: "AUTH_ENV".to_string(),
                message,
            })?,
            None => Environment::Local,
        };
        let storage_path = PathBuf::from(Self::require(&lookup, "AUTH_STORAGE_PATH")?);
        let token_ttl =
            Self::load_duration("AUTH_TOKEN_TTL", &Self::require(&lookup, "AUTH_TOKEN_TTL")?)?;
        let listen_port = Self::load_listen_port(lookup("AUTH_LISTEN_PORT"))?;
        let request_timeout = match lookup("AUTH_REQUEST_TIMEOUT") {
            Some(value) => Self::load_duration("AUTH_REQUEST_TIMEOUT", &value)?,
            None => Self::DEFAULT_REQUEST_TIMEOUT,
        };
        let admin_emails = lookup("AUTH_ADMIN_EMAILS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|email| !email.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            env,
            storage_path,
            token_ttl,
            listen_port,
            request_timeout,
            admin_emails,
        })
    }

    /// Load a required, non-empty variable.
    fn require(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &str,
    ) -> Result<String, ConfigError> {
        let value = lookup(name).ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))?;
        if value.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: name.to_string(),
                message: "must not be empty".to_string(),
            });
        }
        Ok(value)
    }

    fn load_duration(name: &str, value: &str) -> Result<Duration, ConfigError> {
        parse_duration(value).map_err(|message| ConfigError::InvalidValue {
            name: name.to_string(),
            message,
        })
    }

    /// Returns the default if not set.
    fn load_listen_port(value: Option<String>) -> Result<u16, ConfigError> {
        let Some(value) = value else {
            return Ok(Self::DEFAULT_PORT);
        };
        match value.parse::<u16>() {
            Ok(port) if port != 0 => Ok(port),
            _ => Err(ConfigError::InvalidValue {
                name: "AUTH_LISTEN_PORT".to_string(),
                message: format!("'{value}' is not a valid port number (must be 1-65535)"),
            }),
        }
    }
}
