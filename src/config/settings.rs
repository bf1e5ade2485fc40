//! Exporter configuration.
//!
//! Settings come from three layers: command-line flags, an optional TOML
//! file, and built-in defaults, in that order of precedence. Account lists
//! from the flags and the file are merged.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use url::Url;

use super::{Account, Credentials};

/// Default HTTP listen port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default time between collection runs.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15 * 60);
/// Default upstream request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default upstream API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no users or organizations configured (use --user and/or --org)")]
    NoAccounts,
    #[error("interval must be greater than zero")]
    InvalidInterval,
    #[error("timeout must be greater than zero")]
    InvalidTimeout,
    #[error("invalid {field} duration {value:?}: {reason}")]
    InvalidDuration {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("--username and --password must be supplied together")]
    IncompleteCredentials,
    #[error("credentials file {path:?} must contain `username:password`")]
    InvalidCredentialsFile { path: PathBuf },
    #[error("failed to read {path:?}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Fully resolved exporter configuration.
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// HTTP port serving `/metrics`.
    pub port: u16,
    /// Time between collection runs.
    pub interval: Duration,
    /// Timeout for each upstream request.
    pub timeout: Duration,
    /// Base URL of the upstream REST API.
    pub api_url: Url,
    /// Whether upstream responses are cached in memory.
    pub cache: bool,
    /// Exclude forked repositories from all metrics.
    pub skip_forks: bool,
    /// Users whose personal repositories are collected, in order.
    pub users: Vec<String>,
    /// Organizations whose repositories are collected, in order.
    pub orgs: Vec<String>,
    /// Basic-auth credentials, if any.
    pub credentials: Option<Credentials>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            api_url: default_api_url(),
            cache: true,
            skip_forks: false,
            users: Vec::new(),
            orgs: Vec::new(),
            credentials: None,
        }
    }
}

impl ExporterConfig {
    /// All accounts in collection order: users first, then organizations.
    pub fn accounts(&self) -> Vec<Account> {
        self.users
            .iter()
            .map(Account::user)
            .chain(self.orgs.iter().map(Account::organization))
            .collect()
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.users.is_empty() && self.orgs.is_empty() {
            return Err(ConfigError::NoAccounts);
        }
        if self.interval.is_zero() {
            return Err(ConfigError::InvalidInterval);
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_api_url() -> Url {
    Url::parse(DEFAULT_API_URL).expect("default API URL is valid")
}

/// Optional TOML configuration file.
///
/// ```toml
/// port = 9171
/// interval = "30m"
/// skip_forks = true
/// users = ["rycus86"]
/// orgs = ["docker"]
/// credentials = "/run/secrets/github"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub interval: Option<String>,
    pub timeout: Option<String>,
    pub api_url: Option<String>,
    pub cache: Option<bool>,
    pub skip_forks: Option<bool>,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub orgs: Vec<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub credentials: Option<PathBuf>,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(toml::from_str(&content)?)
    }

    /// Parses a duration field written in humantime syntax (`15m`, `1h30m`).
    pub(crate) fn duration(
        field: &'static str,
        value: Option<&str>,
    ) -> Result<Option<Duration>, ConfigError> {
        value
            .map(|raw| {
                humantime::parse_duration(raw.trim()).map_err(|e| ConfigError::InvalidDuration {
                    field,
                    value: raw.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

/// Appends `extra` to `base`, dropping blanks and repeated logins.
pub(crate) fn merge_logins(base: Vec<String>, extra: Vec<String>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(base.len() + extra.len());
    for login in base.into_iter().chain(extra) {
        let login = login.trim();
        if !login.is_empty() && !merged.iter().any(|existing| existing == login) {
            merged.push(login.to_string());
        }
    }
    merged
}
