//! In-memory cache of upstream responses.
//!
//! Responses carrying an `ETag` are stored by request URL. The next request
//! for the same URL is sent with `If-None-Match`; a `304 Not Modified`
//! answer is then served from the stored body. Entries live until the
//! process exits.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use reqwest::header::{HeaderMap, HeaderValue, ETAG, LINK};

/// A stored response body with the headers needed to replay it.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    /// Validator sent back as `If-None-Match`.
    pub etag: HeaderValue,
    /// Headers that describe the body (pagination links).
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// Response cache keyed by request URL.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached response for `url`, if any.
    pub fn lookup(&self, url: &str) -> Option<CachedResponse> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }

    /// Stores a successful response. Responses without an `ETag` are not
    /// cacheable and are ignored.
    pub fn store(&self, url: &str, headers: &HeaderMap, body: &[u8]) {
        let Some(etag) = headers.get(ETAG) else {
            return;
        };

        let mut replay = HeaderMap::new();
        if let Some(link) = headers.get(LINK) {
            replay.insert(LINK, link.clone());
        }

        let entry = CachedResponse {
            etag: etag.clone(),
            headers: replay,
            body: body.to_vec(),
        };

        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), entry);
    }

    /// Number of cached responses.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
