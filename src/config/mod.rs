//! Exporter configuration.
//!
//! This module turns command-line flags, an optional TOML file and
//! credential files into a validated [`ExporterConfig`]. Configuration is
//! loaded once at startup; any error here is fatal.

mod account;
mod cli;
mod credentials;
mod settings;

pub use account::{Account, AccountKind};
pub use cli::Cli;
pub use credentials::Credentials;
pub use settings::{
    ConfigError, ExporterConfig, FileConfig, DEFAULT_API_URL, DEFAULT_INTERVAL, DEFAULT_PORT,
    DEFAULT_TIMEOUT,
};
