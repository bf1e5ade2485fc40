//! Paginated repository fetcher.
//!
//! Walks every page of an account's repository listing and returns the
//! complete set, or an error if any page fails. Partial results are never
//! returned, so a failure halfway through an account cannot leave the
//! metrics with a mix of old and new values for that account.

use std::future::Future;

use super::client::{FetchError, GitHubClient};
use super::pagination::PageCursor;
use super::Repository;
use crate::config::Account;
use crate::metrics::RateLimitGauges;

/// Largest page size the listing endpoints accept.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Source of repository listings.
///
/// This abstraction allows swapping the real API client for canned data in
/// tests.
pub trait RepositorySource: Send + Sync + 'static {
    /// Fetches every repository of `account`.
    ///
    /// Implementations publish the rate limit reported by each response to
    /// `rate_limits` as soon as the response arrives.
    fn fetch_all(
        &self,
        account: &Account,
        rate_limits: &RateLimitGauges,
    ) -> impl Future<Output = Result<Vec<Repository>, FetchError>> + Send;
}

/// Fetches full repository listings through a [`GitHubClient`].
#[derive(Debug)]
pub struct Fetcher {
    client: GitHubClient,
}

impl Fetcher {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

impl RepositorySource for Fetcher {
    async fn fetch_all(
        &self,
        account: &Account,
        rate_limits: &RateLimitGauges,
    ) -> Result<Vec<Repository>, FetchError> {
        let mut repositories = Vec::new();
        let mut cursor = PageCursor::first();

        loop {
            let url = self.client.listing_url(account, cursor, MAX_PAGE_SIZE)?;

            let page = match self.client.get_page(&url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!(
                        account = %account.login,
                        kind = %account.kind,
                        page = cursor.page(),
                        timeout = e.is_timeout(),
                        error = %e,
                        "Failed to fetch repository page"
                    );
                    return Err(e);
                }
            };

            if let Some(rate) = &page.rate_limit {
                rate_limits.publish(rate);
                tracing::trace!(
                    limit = rate.limit,
                    remaining = rate.remaining,
                    reset_at = ?rate.reset_at(),
                    "Rate limit updated"
                );
            }

            tracing::debug!(
                account = %account.login,
                page = cursor.page(),
                repositories = page.repositories.len(),
                "Fetched repository page"
            );

            repositories.extend(page.repositories);

            match page.next {
                Some(next) if next.page() > cursor.page() => cursor = next,
                Some(next) => {
                    tracing::warn!(
                        account = %account.login,
                        page = cursor.page(),
                        next = next.page(),
                        "Next page link does not advance, stopping pagination"
                    );
                    break;
                }
                None => break,
            }
        }

        Ok(repositories)
    }
}
