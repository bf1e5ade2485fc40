//! Repository records as returned by the listing endpoints.

use serde::Deserialize;

/// Account that owns a repository.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Owner {
    /// Login of the owning user or organization.
    #[serde(default)]
    pub login: String,
}

/// A repository as listed by `/users/{login}/repos` or `/orgs/{login}/repos`.
///
/// Only the fields the exporter publishes are decoded. Every counter is
/// optional: the listing endpoints omit some of them (`network_count` and
/// `subscribers_count` in particular), and an absent field must not be
/// mistaken for zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Repository {
    /// Repository name, without the owner prefix.
    pub name: String,
    /// Owning account.
    #[serde(default)]
    pub owner: Owner,
    /// Whether this repository is a fork of another one.
    #[serde(default)]
    pub fork: bool,
    pub forks_count: Option<u64>,
    pub network_count: Option<u64>,
    pub open_issues_count: Option<u64>,
    pub stargazers_count: Option<u64>,
    pub subscribers_count: Option<u64>,
    pub watchers_count: Option<u64>,
    /// Size in kilobytes.
    pub size: Option<u64>,
}

impl Repository {
    /// Creates a record with no counters set.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: Owner {
                login: owner.into(),
            },
            ..Default::default()
        }
    }

    /// Login of the owning account.
    pub fn owner_login(&self) -> &str {
        &self.owner.login
    }

    /// `owner/name` form used in log output.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }
}
