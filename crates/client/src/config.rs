//! Client configuration.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `SALESDESK_STATE_FILE` - Credential store path (default: `$HOME/.salesdesk/state.json`)
//! - `SALESDESK_TIMEOUT_SECS` - HTTP request timeout in seconds (default: 30)
//!
//! The server address is not an environment setting: it lives in the
//! credential store next to the session and defaults to `127.0.0.1:8080`.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Default backend host.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default backend port.
pub const DEFAULT_PORT: u16 = 8080;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const STATE_DIR: &str = ".salesdesk";
const STATE_FILE: &str = "state.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Reasons a server address is rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("host must be an IPv4 address or localhost, got `{0}`")]
    InvalidHost(String),
    #[error("port must be a number between 1 and 65535, got `{0}`")]
    InvalidPort(String),
}

/// Backend address: `http://{host}:{port}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    host: String,
    port: u16,
}

impl EndpointConfig {
    /// Validate a host and port as typed by a user.
    ///
    /// # Errors
    ///
    /// Returns [`EndpointError`] unless the host is `localhost` or a dotted
    /// quad with octets in `0..=255`, and the port is in `1..=65535`.
    pub fn parse(host: &str, port: &str) -> Result<Self, EndpointError> {
        let host = parse_host(host)?;
        let port = parse_port(port)?;
        Ok(Self { host, port })
    }

    /// Rebuild from stored values, falling back to defaults for anything
    /// that no longer validates.
    #[must_use]
    pub fn from_stored(host: Option<&str>, port: Option<&str>) -> Self {
        Self {
            host: host
                .and_then(|h| parse_host(h).ok())
                .unwrap_or_else(|| DEFAULT_HOST.to_owned()),
            port: port.and_then(|p| parse_port(p).ok()).unwrap_or(DEFAULT_PORT),
        }
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// `http://host:port`, without a trailing slash.
    #[must_use]
    pub fn origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
        }
    }
}

impl fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn parse_host(raw: &str) -> Result<String, EndpointError> {
    let host = raw.trim();
    if host.eq_ignore_ascii_case("localhost") {
        return Ok("localhost".to_owned());
    }

    let octets: Vec<&str> = host.split('.').collect();
    let valid = octets.len() == 4
        && octets.iter().all(|octet| {
            !octet.is_empty()
                && octet.len() <= 3
                && octet.bytes().all(|b| b.is_ascii_digit())
                && octet.parse::<u16>().is_ok_and(|n| n <= 255)
        });

    if valid {
        Ok(host.to_owned())
    } else {
        Err(EndpointError::InvalidHost(raw.to_owned()))
    }
}

fn parse_port(raw: &str) -> Result<u16, EndpointError> {
    raw.trim()
        .parse::<u16>()
        .ok()
        .filter(|port| *port >= 1)
        .ok_or_else(|| EndpointError::InvalidPort(raw.to_owned()))
}

/// Process-level client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Where the credential store keeps its JSON file.
    pub state_file: PathBuf,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from the environment (and `.env`, if present).
    ///
    /// # Errors
    ///
    /// Returns an error if `SALESDESK_TIMEOUT_SECS` is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let state_file = std::env::var("SALESDESK_STATE_FILE")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map_or_else(default_state_file, PathBuf::from);

        let timeout = match std::env::var("SALESDESK_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    ConfigError::InvalidEnvVar(
                        "SALESDESK_TIMEOUT_SECS".to_string(),
                        format!("expected a positive number of seconds, got `{raw}`"),
                    )
                })?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self {
            state_file,
            timeout,
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

fn default_state_file() -> PathBuf {
    std::env::var_os("HOME").map_or_else(
        || PathBuf::from("salesdesk-state.json"),
        |home| PathBuf::from(home).join(STATE_DIR).join(STATE_FILE),
    )
}
