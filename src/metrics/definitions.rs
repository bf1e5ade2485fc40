//! Per-repository metric definitions.
//!
//! Each definition pairs a gauge family name and help text with a pure
//! extractor. An extractor returns `None` when the upstream record does not
//! carry the field; the series is then left untouched for that round.

use crate::github::Repository;

/// Namespace prefixed to every exported family.
pub const NAMESPACE: &str = "github";

/// Labels of every per-repository family.
pub const REPOSITORY_LABELS: [&str; 2] = ["owner", "repository"];

/// Extractor from a repository record to an optional value.
pub type Extractor = fn(&Repository) -> Option<u64>;

/// A per-repository gauge family.
#[derive(Debug, Clone, Copy)]
pub struct RepoMetric {
    /// Family name, without the namespace.
    pub name: &'static str,
    /// Help text shown in the exposition output.
    pub help: &'static str,
    extractor: Extractor,
}

impl RepoMetric {
    pub const fn new(name: &'static str, help: &'static str, extractor: Extractor) -> Self {
        Self {
            name,
            help,
            extractor,
        }
    }

    /// Reads this metric's value from a repository record.
    pub fn extract(&self, repository: &Repository) -> Option<u64> {
        (self.extractor)(repository)
    }

    /// Fully qualified family name as it appears in the exposition output.
    pub fn family_name(&self) -> String {
        format!("{NAMESPACE}_{}", self.name)
    }
}

/// Every per-repository family the exporter publishes.
pub const REPOSITORY_METRICS: &[RepoMetric] = &[
    RepoMetric::new("forks_count", "Number of Forks", |r| r.forks_count),
    RepoMetric::new("networks_count", "Number of Networks", |r| r.network_count),
    RepoMetric::new("open_issues_count", "Number of Open Issues", |r| {
        r.open_issues_count
    }),
    RepoMetric::new("stargazers_count", "Number of Stars", |r| r.stargazers_count),
    RepoMetric::new("subscribers_count", "Number of Subscribers", |r| {
        r.subscribers_count
    }),
    RepoMetric::new("watchers_count", "Number of Watchers", |r| r.watchers_count),
    RepoMetric::new(
        "size_kilobytes",
        "Size of the Repository in kiloBytes",
        |r| r.size,
    ),
];
