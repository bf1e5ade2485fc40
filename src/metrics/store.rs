//! Gauge families shared by the collector and the `/metrics` endpoint.

use prometheus::{Encoder, Gauge, GaugeVec, Opts, Registry, TextEncoder};
use thiserror::Error;

use super::definitions::{RepoMetric, NAMESPACE, REPOSITORY_LABELS, REPOSITORY_METRICS};
use crate::github::{RateLimit, Repository};

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A definition together with its registered gauge family.
pub struct RegisteredMetric {
    definition: &'static RepoMetric,
    gauge: GaugeVec,
}

impl RegisteredMetric {
    pub fn definition(&self) -> &'static RepoMetric {
        self.definition
    }
}

/// Gauges mirroring the most recent rate limit headers.
#[derive(Clone)]
pub struct RateLimitGauges {
    limit: Gauge,
    remaining: Gauge,
    reset: Gauge,
}

impl RateLimitGauges {
    fn new(registry: &Registry) -> Result<Self, MetricsError> {
        let limit = Gauge::with_opts(Opts::new("rate_limit", "API Rate Limit").namespace(NAMESPACE))?;
        let remaining = Gauge::with_opts(
            Opts::new("rate_remaining", "API Rate Remaining").namespace(NAMESPACE),
        )?;
        let reset = Gauge::with_opts(Opts::new("rate_reset", "API Rate Reset").namespace(NAMESPACE))?;

        registry.register(Box::new(limit.clone()))?;
        registry.register(Box::new(remaining.clone()))?;
        registry.register(Box::new(reset.clone()))?;

        Ok(Self {
            limit,
            remaining,
            reset,
        })
    }

    /// Overwrites all three gauges. The last caller wins.
    pub fn publish(&self, rate: &RateLimit) {
        self.limit.set(rate.limit as f64);
        self.remaining.set(rate.remaining as f64);
        self.reset.set(rate.reset as f64);
    }

    pub fn limit(&self) -> f64 {
        self.limit.get()
    }

    pub fn remaining(&self) -> f64 {
        self.remaining.get()
    }

    pub fn reset(&self) -> f64 {
        self.reset.get()
    }
}

/// Prometheus registry holding every family the exporter publishes.
///
/// Built once at startup and shared by reference. Each family does its own
/// locking, so writers and scrapes never need an outer lock; a scrape may see
/// some families from the current run and others from the previous one.
pub struct MetricsStore {
    registry: Registry,
    repository_metrics: Vec<RegisteredMetric>,
    repo_count: GaugeVec,
    rate_limits: RateLimitGauges,
}

impl MetricsStore {
    /// Creates a store with every standard family registered.
    pub fn new() -> Result<Self, MetricsError> {
        Self::with_definitions(REPOSITORY_METRICS)
    }

    /// Creates a store for the given per-repository definitions.
    ///
    /// Fails with [`prometheus::Error::AlreadyReg`] if two families share a
    /// name.
    pub fn with_definitions(definitions: &'static [RepoMetric]) -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let repo_count = GaugeVec::new(
            Opts::new("repo_count", "Number of Repositories").namespace(NAMESPACE),
            &["owner"],
        )?;
        registry.register(Box::new(repo_count.clone()))?;

        let rate_limits = RateLimitGauges::new(&registry)?;

        let mut repository_metrics = Vec::with_capacity(definitions.len());
        for definition in definitions {
            let gauge = GaugeVec::new(
                Opts::new(definition.name, definition.help).namespace(NAMESPACE),
                &REPOSITORY_LABELS,
            )?;
            registry.register(Box::new(gauge.clone()))?;
            repository_metrics.push(RegisteredMetric { definition, gauge });
        }

        tracing::debug!(families = repository_metrics.len() + 4, "Metrics registered");

        Ok(Self {
            registry,
            repository_metrics,
            repo_count,
            rate_limits,
        })
    }

    /// Registered per-repository families, in definition order.
    pub fn repository_metrics(&self) -> &[RegisteredMetric] {
        &self.repository_metrics
    }

    /// Updates one family from a repository record.
    ///
    /// An absent value leaves the existing series (if any) unchanged.
    pub fn apply(&self, metric: &RegisteredMetric, repository: &Repository) {
        if let Some(value) = metric.definition.extract(repository) {
            metric
                .gauge
                .with_label_values(&[repository.owner_login(), repository.name.as_str()])
                .set(value as f64);
        }
    }

    /// Updates every per-repository family from a repository record.
    pub fn apply_all(&self, repository: &Repository) {
        for metric in &self.repository_metrics {
            self.apply(metric, repository);
        }
    }

    /// Sets the number of repositories collected for an account.
    pub fn set_repository_count(&self, owner: &str, count: usize) {
        self.repo_count.with_label_values(&[owner]).set(count as f64);
    }

    /// Rate limit gauges, updated by the fetcher after every page.
    pub fn rate_limits(&self) -> &RateLimitGauges {
        &self.rate_limits
    }

    /// Looks up the current value of a series without creating it.
    ///
    /// `family` is the fully qualified name (e.g. `github_forks_count`) and
    /// `labels` must list every label of the series.
    pub fn gauge_value(&self, family: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.registry
            .gather()
            .iter()
            .filter(|mf| mf.get_name() == family)
            .flat_map(|mf| mf.get_metric())
            .find(|metric| {
                let pairs = metric.get_label();
                pairs.len() == labels.len()
                    && labels.iter().all(|(name, value)| {
                        pairs
                            .iter()
                            .any(|pair| pair.get_name() == *name && pair.get_value() == *value)
                    })
            })
            .map(|metric| metric.get_gauge().get_value())
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
