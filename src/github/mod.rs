//! GitHub REST API access.
//!
//! This module lists the repositories of users and organizations:
//!
//! ```text
//! Fetcher ──► GitHubClient ──► ResponseCache
//!    │              │
//!    │              └─► RateLimit / PageCursor (from response headers)
//!    └─► RateLimitGauges (published after every page)
//! ```

mod cache;
mod client;
mod fetcher;
mod pagination;
mod rate_limit;
mod repository;

pub use cache::{CachedResponse, ResponseCache};
pub use client::{ClientConfig, FetchError, GitHubClient, Page};
pub use fetcher::{Fetcher, RepositorySource, MAX_PAGE_SIZE};
pub use pagination::{next_page_cursor, parse_next_link, PageCursor};
pub use rate_limit::RateLimit;
pub use repository::{Owner, Repository};
