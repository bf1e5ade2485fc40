//! Prometheus metrics for GitHub repositories.
//!
//! All state lives in a [`MetricsStore`] built once at startup and shared
//! by reference between the collector (writer) and the HTTP endpoint
//! (reader).
//!
//! # Metrics Exposed
//!
//! ## Per repository (`owner`, `repository` labels)
//! - `github_forks_count` - Number of forks
//! - `github_networks_count` - Number of networks
//! - `github_open_issues_count` - Number of open issues
//! - `github_stargazers_count` - Number of stars
//! - `github_subscribers_count` - Number of subscribers
//! - `github_watchers_count` - Number of watchers
//! - `github_size_kilobytes` - Repository size in kilobytes
//!
//! ## Per account (`owner` label)
//! - `github_repo_count` - Number of repositories collected
//!
//! ## API rate limit
//! - `github_rate_limit` - Requests allowed per window
//! - `github_rate_remaining` - Requests left in the window
//! - `github_rate_reset` - Unix time the window resets
//!
//! # Example
//!
//! ```
//! use github_exporter::github::Repository;
//! use github_exporter::metrics::MetricsStore;
//!
//! let store = MetricsStore::new().expect("Failed to create store");
//!
//! let mut repo = Repository::new("rycus86", "docker-prometheus");
//! repo.watchers_count = Some(7);
//! store.apply_all(&repo);
//!
//! let output = store.encode().expect("Failed to encode");
//! assert!(output.contains("github_watchers_count"));
//! ```

mod definitions;
mod server;
mod store;

pub use definitions::{Extractor, RepoMetric, NAMESPACE, REPOSITORY_LABELS, REPOSITORY_METRICS};
pub use server::{router, MetricsServer, MetricsServerConfig, ServerError};
pub use store::{MetricsError, MetricsStore, RateLimitGauges, RegisteredMetric};
