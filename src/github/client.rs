//! GitHub REST API client.
//!
//! Minimal client for the repository listing endpoints. Requests carry an
//! optional basic-auth header, a bounded timeout, and go through the
//! optional [`ResponseCache`].

use std::time::Duration;

use reqwest::header::{HeaderValue, ACCEPT, IF_NONE_MATCH};
use reqwest::StatusCode;
use thiserror::Error;
use url::Url;

use super::cache::ResponseCache;
use super::pagination::{next_page_cursor, PageCursor};
use super::rate_limit::RateLimit;
use super::Repository;
use crate::config::{Account, Credentials, ExporterConfig};

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("github-exporter/", env!("CARGO_PKG_VERSION"));

/// Errors raised while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("API URL {0} cannot be used as a base URL")]
    InvalidBaseUrl(Url),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: StatusCode, url: Url },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: Url,
        source: serde_json::Error,
    },
}

impl FetchError {
    /// Whether the request ran into the configured timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Settings for [`GitHubClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
    pub cache: bool,
}

impl ClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: crate::config::DEFAULT_TIMEOUT,
            credentials: None,
            cache: true,
        }
    }
}

impl From<&ExporterConfig> for ClientConfig {
    fn from(config: &ExporterConfig) -> Self {
        Self {
            base_url: config.api_url.clone(),
            timeout: config.timeout,
            credentials: config.credentials.clone(),
            cache: config.cache,
        }
    }
}

/// One page of a repository listing.
#[derive(Debug, Clone)]
pub struct Page {
    pub repositories: Vec<Repository>,
    /// Rate limit reported with this response, if any.
    pub rate_limit: Option<RateLimit>,
    /// Cursor of the following page; `None` on the last page.
    pub next: Option<PageCursor>,
}

/// GitHub API client.
#[derive(Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
    cache: Option<ResponseCache>,
}

impl GitHubClient {
    /// Creates a client from its settings.
    pub fn new(config: ClientConfig) -> Result<Self, FetchError> {
        if config.base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidBaseUrl(config.base_url));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url,
            credentials: config.credentials,
            cache: config.cache.then(ResponseCache::new),
        })
    }

    /// Credentials attached to every request, if any.
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// The response cache, when caching is enabled.
    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// URL of one page of an account's repository listing.
    pub fn listing_url(
        &self,
        account: &Account,
        cursor: PageCursor,
        per_page: u8,
    ) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::InvalidBaseUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend([account.kind.path_segment(), account.login.as_str(), "repos"]);
        url.query_pairs_mut()
            .clear()
            .append_pair("per_page", &per_page.to_string())
            .append_pair("page", &cursor.page().to_string());
        Ok(url)
    }

    /// Fetches and decodes one listing page.
    pub async fn get_page(&self, url: &Url) -> Result<Page, FetchError> {
        let mut request = self
            .http
            .get(url.clone())
            .header(ACCEPT, HeaderValue::from_static(ACCEPT_V3));

        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let cached = self.cache.as_ref().and_then(|cache| cache.lookup(url.as_str()));
        if let Some(entry) = &cached {
            request = request.header(IF_NONE_MATCH, entry.etag.clone());
        }

        let response = request.send().await?;
        let status = response.status();
        let rate_limit = RateLimit::from_headers(response.headers());

        if status == StatusCode::NOT_MODIFIED {
            if let Some(entry) = cached {
                tracing::debug!(%url, "Serving listing page from cache");
                return Ok(Page {
                    repositories: decode(url, &entry.body)?,
                    rate_limit,
                    next: next_page_cursor(&entry.headers),
                });
            }
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                url: url.clone(),
            });
        }

        let headers = response.headers().clone();
        let body = response.bytes().await?;
        let repositories = decode(url, &body)?;

        if let Some(cache) = &self.cache {
            cache.store(url.as_str(), &headers, &body);
        }

        Ok(Page {
            repositories,
            rate_limit,
            next: next_page_cursor(&headers),
        })
    }
}

fn decode(url: &Url, body: &[u8]) -> Result<Vec<Repository>, FetchError> {
    serde_json::from_slice(body).map_err(|source| FetchError::Decode {
        url: url.clone(),
        source,
    })
}
