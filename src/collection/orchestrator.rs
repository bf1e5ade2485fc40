//! Collection runs over all configured accounts.

use std::sync::Arc;
use std::time::Instant;

use crate::config::{Account, ExporterConfig};
use crate::github::{Repository, RepositorySource};
use crate::metrics::MetricsStore;

/// Which accounts to collect and how to filter their repositories.
#[derive(Debug, Clone, Default)]
pub struct CollectionSettings {
    /// Accounts in collection order.
    pub accounts: Vec<Account>,
    /// Exclude forked repositories from every metric.
    pub skip_forks: bool,
}

impl From<&ExporterConfig> for CollectionSettings {
    fn from(config: &ExporterConfig) -> Self {
        Self {
            accounts: config.accounts(),
            skip_forks: config.skip_forks,
        }
    }
}

/// Outcome of one collection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectionSummary {
    pub accounts_succeeded: usize,
    pub accounts_failed: usize,
    /// Repositories projected into the metrics (forks excluded when skipped).
    pub repositories: usize,
}

/// Projects fetched repositories into the metrics store.
pub struct Collector<S> {
    source: S,
    store: Arc<MetricsStore>,
    settings: CollectionSettings,
}

impl<S: RepositorySource> Collector<S> {
    pub fn new(source: S, store: Arc<MetricsStore>, settings: CollectionSettings) -> Self {
        Self {
            source,
            store,
            settings,
        }
    }

    pub fn settings(&self) -> &CollectionSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<MetricsStore> {
        &self.store
    }

    /// Performs one collection run.
    ///
    /// Accounts are processed one after another. An account whose fetch
    /// fails keeps its previous values and does not stop the run.
    pub async fn run_collection(&self) -> CollectionSummary {
        let started = Instant::now();
        let mut summary = CollectionSummary::default();

        for account in &self.settings.accounts {
            tracing::info!(account = %account.login, kind = %account.kind, "Collecting metrics");

            match self
                .source
                .fetch_all(account, self.store.rate_limits())
                .await
            {
                Ok(repositories) => {
                    let total = self.project(account, &repositories);
                    summary.accounts_succeeded += 1;
                    summary.repositories += total;
                }
                Err(e) => {
                    summary.accounts_failed += 1;
                    tracing::warn!(
                        account = %account.login,
                        kind = %account.kind,
                        error = %e,
                        "Skipping account, previous values are kept"
                    );
                }
            }
        }

        tracing::info!(
            succeeded = summary.accounts_succeeded,
            failed = summary.accounts_failed,
            repositories = summary.repositories,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Collection finished"
        );

        summary
    }

    /// Writes one account's repositories and returns how many were counted.
    fn project(&self, account: &Account, repositories: &[Repository]) -> usize {
        let mut total = 0;

        for repository in repositories {
            if self.settings.skip_forks && repository.fork {
                tracing::trace!(repository = %repository.full_name(), "Skipping fork");
                continue;
            }

            self.store.apply_all(repository);
            total += 1;
        }

        self.store.set_repository_count(&account.login, total);

        tracing::info!(
            account = %account.login,
            fetched = repositories.len(),
            counted = total,
            "Account collected"
        );

        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{FetchError, RateLimit};
    use crate::metrics::RateLimitGauges;
    use reqwest::StatusCode;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use url::Url;

    /// Canned listings keyed by login; a missing login fails with 502.
    #[derive(Default)]
    struct StaticSource {
        listings: Mutex<HashMap<String, Vec<Repository>>>,
        rate_limits: HashMap<String, RateLimit>,
        calls: Mutex<Vec<String>>,
    }

    impl StaticSource {
        fn with(self, login: &str, repositories: Vec<Repository>) -> Self {
            self.listings
                .lock()
                .unwrap()
                .insert(login.to_string(), repositories);
            self
        }

        fn fail(&self, login: &str) {
            self.listings.lock().unwrap().remove(login);
        }
    }

    impl RepositorySource for StaticSource {
        async fn fetch_all(
            &self,
            account: &Account,
            rate_limits: &RateLimitGauges,
        ) -> Result<Vec<Repository>, FetchError> {
            self.calls.lock().unwrap().push(account.login.clone());
            if let Some(rate) = self.rate_limits.get(&account.login) {
                rate_limits.publish(rate);
            }

            let listings = self.listings.lock().unwrap();
            listings.get(&account.login).cloned().ok_or_else(|| FetchError::Status {
                status: StatusCode::BAD_GATEWAY,
                url: Url::parse("https://api.github.com/").unwrap(),
            })
        }
    }

    fn repo(owner: &str, name: &str, watchers: u64) -> Repository {
        Repository {
            watchers_count: Some(watchers),
            ..Repository::new(owner, name)
        }
    }

    fn fork(owner: &str, name: &str, watchers: u64) -> Repository {
        Repository {
            fork: true,
            ..repo(owner, name, watchers)
        }
    }

    fn watchers(store: &MetricsStore, owner: &str, name: &str) -> Option<f64> {
        store.gauge_value(
            "github_watchers_count",
            &[("owner", owner), ("repository", name)],
        )
    }

    fn repo_count(store: &MetricsStore, owner: &str) -> Option<f64> {
        store.gauge_value("github_repo_count", &[("owner", owner)])
    }

    fn collector(source: StaticSource, accounts: Vec<Account>, skip_forks: bool) -> Collector<StaticSource> {
        Collector::new(
            source,
            Arc::new(MetricsStore::new().unwrap()),
            CollectionSettings {
                accounts,
                skip_forks,
            },
        )
    }

    #[tokio::test]
    async fn test_collects_every_account() {
        let source = StaticSource::default()
            .with("rycus86", vec![repo("rycus86", "docker-prometheus", 7)])
            .with("docker", vec![repo("docker", "docker-py", 3081), repo("docker", "compose", 10)]);
        let collector = collector(
            source,
            vec![Account::user("rycus86"), Account::organization("docker")],
            false,
        );

        let summary = collector.run_collection().await;

        assert_eq!(
            summary,
            CollectionSummary {
                accounts_succeeded: 2,
                accounts_failed: 0,
                repositories: 3
            }
        );
        let store = collector.store();
        assert_eq!(watchers(store, "rycus86", "docker-prometheus"), Some(7.0));
        assert_eq!(watchers(store, "docker", "docker-py"), Some(3081.0));
        assert_eq!(repo_count(store, "rycus86"), Some(1.0));
        assert_eq!(repo_count(store, "docker"), Some(2.0));
    }

    #[tokio::test]
    async fn test_users_before_orgs_in_config_order() {
        let config = ExporterConfig {
            users: vec!["u1".to_string(), "u2".to_string()],
            orgs: vec!["o1".to_string()],
            ..Default::default()
        };
        let source = StaticSource::default()
            .with("u1", vec![])
            .with("u2", vec![])
            .with("o1", vec![]);
        let collector = Collector::new(
            source,
            Arc::new(MetricsStore::new().unwrap()),
            CollectionSettings::from(&config),
        );

        collector.run_collection().await;

        let calls = collector.source.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["u1", "u2", "o1"]);
    }

    #[tokio::test]
    async fn test_skip_forks() {
        let source = StaticSource::default().with(
            "rycus86",
            vec![repo("rycus86", "own", 1), fork("rycus86", "forked", 5)],
        );
        let collector = collector(source, vec![Account::user("rycus86")], true);

        let summary = collector.run_collection().await;

        assert_eq!(summary.repositories, 1);
        let store = collector.store();
        assert_eq!(repo_count(store, "rycus86"), Some(1.0));
        assert_eq!(watchers(store, "rycus86", "own"), Some(1.0));
        assert_eq!(watchers(store, "rycus86", "forked"), None);
    }

    #[tokio::test]
    async fn test_forks_counted_without_skip() {
        let source = StaticSource::default().with(
            "rycus86",
            vec![repo("rycus86", "own", 1), fork("rycus86", "forked", 5)],
        );
        let collector = collector(source, vec![Account::user("rycus86")], false);

        collector.run_collection().await;

        let store = collector.store();
        assert_eq!(repo_count(store, "rycus86"), Some(2.0));
        assert_eq!(watchers(store, "rycus86", "forked"), Some(5.0));
    }

    #[tokio::test]
    async fn test_failed_account_keeps_previous_values() {
        let source = StaticSource::default()
            .with("broken", vec![repo("broken", "a", 4), repo("broken", "b", 9)])
            .with("docker", vec![repo("docker", "compose", 1)]);
        let collector = collector(
            source,
            vec![Account::organization("broken"), Account::organization("docker")],
            false,
        );

        collector.run_collection().await;
        collector.source.fail("broken");
        collector
            .source
            .listings
            .lock()
            .unwrap()
            .insert("docker".to_string(), vec![repo("docker", "compose", 2)]);

        let summary = collector.run_collection().await;

        assert_eq!(summary.accounts_failed, 1);
        assert_eq!(summary.accounts_succeeded, 1);
        let store = collector.store();
        assert_eq!(repo_count(store, "broken"), Some(2.0));
        assert_eq!(watchers(store, "broken", "b"), Some(9.0));
        assert_eq!(watchers(store, "docker", "compose"), Some(2.0));
    }

    #[tokio::test]
    async fn test_vanished_repository_stays_stale() {
        let source = StaticSource::default().with(
            "rycus86",
            vec![repo("rycus86", "kept", 1), repo("rycus86", "renamed", 3)],
        );
        let collector = collector(source, vec![Account::user("rycus86")], false);
        collector.run_collection().await;

        collector
            .source
            .listings
            .lock()
            .unwrap()
            .insert("rycus86".to_string(), vec![repo("rycus86", "kept", 1)]);
        collector.run_collection().await;

        let store = collector.store();
        assert_eq!(repo_count(store, "rycus86"), Some(1.0));
        assert_eq!(watchers(store, "rycus86", "renamed"), Some(3.0));
    }

    #[tokio::test]
    async fn test_rate_limit_last_writer_wins() {
        let mut source = StaticSource::default().with("a", vec![]).with("b", vec![]);
        source.rate_limits.insert(
            "a".to_string(),
            RateLimit {
                limit: 5000,
                remaining: 4000,
                reset: 100,
            },
        );
        source.rate_limits.insert(
            "b".to_string(),
            RateLimit {
                limit: 5000,
                remaining: 3999,
                reset: 200,
            },
        );
        let collector = collector(source, vec![Account::user("a"), Account::user("b")], false);

        collector.run_collection().await;

        let rates = collector.store().rate_limits();
        assert_eq!(rates.remaining(), 3999.0);
        assert_eq!(rates.reset(), 200.0);
    }
}
