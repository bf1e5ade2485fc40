//! Command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use url::Url;

use super::settings::{merge_logins, DEFAULT_API_URL, DEFAULT_INTERVAL, DEFAULT_PORT, DEFAULT_TIMEOUT};
use super::{ConfigError, Credentials, ExporterConfig, FileConfig};

/// Prometheus exporter for GitHub repository statistics.
#[derive(Parser, Debug, Default)]
#[command(name = "github-exporter", version, about, long_about = None)]
pub struct Cli {
    /// The HTTP port to listen on [default: 8080]
    #[arg(long, env = "GITHUB_EXPORTER_PORT")]
    pub port: Option<u16>,

    /// Interval between checks, e.g. `15m` or `1h` [default: 15m]
    #[arg(long, env = "GITHUB_EXPORTER_INTERVAL", value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Users to list repositories for (multiple values are allowed)
    #[arg(long = "user", value_name = "LOGIN", env = "GITHUB_EXPORTER_USERS", value_delimiter = ',')]
    pub users: Vec<String>,

    /// Organizations to list repositories for (multiple values are allowed)
    #[arg(long = "org", value_name = "LOGIN", env = "GITHUB_EXPORTER_ORGS", value_delimiter = ',')]
    pub orgs: Vec<String>,

    /// Do not pull metrics for forked repositories
    #[arg(
        long,
        env = "GITHUB_EXPORTER_SKIP_FORKS",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub skip_forks: Option<bool>,

    /// Username for authenticated API calls
    #[arg(long, env = "GITHUB_EXPORTER_USERNAME")]
    pub username: Option<String>,

    /// Password for authenticated API calls
    #[arg(long, env = "GITHUB_EXPORTER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// File containing the authentication details in `username:password` format
    #[arg(long, value_name = "PATH", env = "GITHUB_EXPORTER_CREDENTIALS")]
    pub credentials: Option<PathBuf>,

    /// Timeout for each API request [default: 30s]
    #[arg(long, env = "GITHUB_EXPORTER_TIMEOUT", value_parser = humantime::parse_duration)]
    pub timeout: Option<Duration>,

    /// Base URL of the GitHub REST API [default: https://api.github.com]
    #[arg(long, value_name = "URL", env = "GITHUB_EXPORTER_API_URL")]
    pub api_url: Option<Url>,

    /// Disable the in-memory response cache
    #[arg(long, env = "GITHUB_EXPORTER_NO_CACHE", action = ArgAction::SetTrue)]
    pub no_cache: bool,

    /// Path to an optional TOML configuration file
    #[arg(long, value_name = "PATH", env = "GITHUB_EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// Resolves flags, the optional config file and defaults into a
    /// validated configuration.
    pub fn into_config(self) -> Result<ExporterConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => FileConfig::from_file(path)?,
            None => FileConfig::default(),
        };
        self.merge(file)
    }

    /// Merges flags over a parsed config file.
    pub fn merge(self, file: FileConfig) -> Result<ExporterConfig, ConfigError> {
        let interval = match self.interval {
            Some(interval) => interval,
            None => FileConfig::duration("interval", file.interval.as_deref())?
                .unwrap_or(DEFAULT_INTERVAL),
        };
        let timeout = match self.timeout {
            Some(timeout) => timeout,
            None => FileConfig::duration("timeout", file.timeout.as_deref())?
                .unwrap_or(DEFAULT_TIMEOUT),
        };
        let api_url = match self.api_url {
            Some(url) => url,
            None => Url::parse(file.api_url.as_deref().unwrap_or(DEFAULT_API_URL))?,
        };

        let credentials_file = self.credentials.or(file.credentials);
        let credentials = Credentials::resolve(
            self.username.or(file.username),
            self.password.or(file.password),
            credentials_file.as_deref(),
        )?;

        let config = ExporterConfig {
            port: self.port.or(file.port).unwrap_or(DEFAULT_PORT),
            interval,
            timeout,
            api_url,
            cache: !self.no_cache && file.cache.unwrap_or(true),
            skip_forks: self.skip_forks.or(file.skip_forks).unwrap_or(false),
            users: merge_logins(file.users, self.users),
            orgs: merge_logins(file.orgs, self.orgs),
            credentials,
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["github-exporter"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(&["--user", "rycus86"]).into_config().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.interval, Duration::from_secs(15 * 60));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.skip_forks);
        assert!(config.cache);
        assert!(config.credentials.is_none());
        assert_eq!(config.users, vec!["rycus86"]);
    }

    #[test]
    fn test_repeated_accounts() {
        let config = parse(&["--user", "a", "--user", "b", "--org", "docker"])
            .into_config()
            .unwrap();
        assert_eq!(config.users, vec!["a", "b"]);
        assert_eq!(config.orgs, vec!["docker"]);
    }

    #[test]
    fn test_empty_inline_credentials_run_anonymously() {
        let config = parse(&["--user", "rycus86", "--username", "", "--password", ""])
            .into_config()
            .unwrap();
        assert!(config.credentials.is_none());
    }

    #[test]
    fn test_no_accounts_fails() {
        let result = parse(&["--port", "9000"]).into_config();
        assert!(matches!(result, Err(ConfigError::NoAccounts)));
    }

    #[test]
    fn test_flag_values() {
        let config = parse(&[
            "--org",
            "docker",
            "--port",
            "9171",
            "--interval",
            "1h",
            "--timeout",
            "5s",
            "--skip-forks",
            "--no-cache",
            "--api-url",
            "https://github.example.com/api/v3/",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.port, 9171);
        assert_eq!(config.interval, Duration::from_secs(3600));
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.skip_forks);
        assert!(!config.cache);
        assert_eq!(config.api_url.as_str(), "https://github.example.com/api/v3/");
    }

    #[test]
    fn test_skip_forks_explicit_value() {
        let config = parse(&["--org", "docker", "--skip-forks", "false"])
            .into_config()
            .unwrap();
        assert!(!config.skip_forks);
    }

    #[test]
    fn test_inline_credentials() {
        let config = parse(&["--user", "x", "--username", "user", "--password", "pass"])
            .into_config()
            .unwrap();
        assert_eq!(config.credentials, Some(Credentials::new("user", "pass")));
    }

    #[test]
    fn test_credentials_file_wins() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"from:cr3d3nt14l$\n").unwrap();
        let path = file.path().to_str().unwrap();

        let config = parse(&[
            "--user",
            "x",
            "--username",
            "user",
            "--password",
            "pass",
            "--credentials",
            path,
        ])
        .into_config()
        .unwrap();
        assert_eq!(config.credentials, Some(Credentials::new("from", "cr3d3nt14l$")));
    }

    #[test]
    fn test_flags_override_file() {
        let file: FileConfig = toml::from_str(
            r#"
            port = 9000
            interval = "2h"
            skip_forks = true
            users = ["from-file"]
            orgs = ["docker"]
            "#,
        )
        .unwrap();

        let config = parse(&["--port", "9100", "--user", "from-flag"])
            .merge(file)
            .unwrap();

        assert_eq!(config.port, 9100);
        assert_eq!(config.interval, Duration::from_secs(7200));
        assert!(config.skip_forks);
        assert_eq!(config.users, vec!["from-file", "from-flag"]);
        assert_eq!(config.orgs, vec!["docker"]);
    }

    #[test]
    fn test_invalid_interval_flag() {
        let result = Cli::try_parse_from(["github-exporter", "--interval", "often"]);
        assert!(result.is_err());
    }
}
