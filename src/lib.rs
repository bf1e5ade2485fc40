//! GitHub Repository Exporter Library
//!
//! Polls the GitHub REST API for the repositories of configured users and
//! organizations and exposes their statistics as Prometheus gauges.
//!
//! # Architecture
//!
//! ```text
//! config → collection::Scheduler → collection::Collector → github::Fetcher
//!                                          ↓
//!                                  metrics::MetricsStore ← metrics::server (GET /metrics)
//! ```
//!
//! # Design Principles
//!
//! - **Stale over missing**: A failed account keeps its last known values
//! - **All or nothing per account**: A listing is applied only once every page arrived
//! - **One run at a time**: Collections never overlap
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use github_exporter::{
//!     collection::{CollectionSettings, Collector},
//!     config::ExporterConfig,
//!     github::{ClientConfig, Fetcher, GitHubClient},
//!     metrics::MetricsStore,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExporterConfig {
//!     users: vec!["rycus86".to_string()],
//!     ..Default::default()
//! };
//! config.validate()?;
//!
//! let store = Arc::new(MetricsStore::new()?);
//! let fetcher = Fetcher::new(GitHubClient::new(ClientConfig::from(&config))?);
//! let collector = Collector::new(fetcher, store.clone(), CollectionSettings::from(&config));
//!
//! let summary = collector.run_collection().await;
//! println!("{} repositories\n{}", summary.repositories, store.encode()?);
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod github;
pub mod metrics;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
