//! Periodic collection of repository statistics.
//!
//! The [`Scheduler`] triggers the [`Collector`], which fetches every
//! configured account through a [`RepositorySource`](crate::github::RepositorySource)
//! and projects the results into the shared
//! [`MetricsStore`](crate::metrics::MetricsStore).

mod orchestrator;
mod scheduler;

pub use orchestrator::{CollectionSettings, CollectionSummary, Collector};
pub use scheduler::{Scheduler, SchedulerState};
