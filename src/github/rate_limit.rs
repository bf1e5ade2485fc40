//! Rate limit information carried in API response headers.

use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;

const LIMIT_HEADER: &str = "x-ratelimit-limit";
const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";

/// Rate limit snapshot reported alongside a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimit {
    /// Requests allowed per window.
    pub limit: u64,
    /// Requests left in the current window.
    pub remaining: u64,
    /// Unix timestamp (seconds) at which the window resets.
    pub reset: i64,
}

impl RateLimit {
    /// Extracts the rate limit from response headers.
    ///
    /// Returns `None` unless all three headers are present and numeric.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let limit = header_value(headers, LIMIT_HEADER)?;
        let remaining = header_value(headers, REMAINING_HEADER)?;
        let reset = header_value(headers, RESET_HEADER)?;

        Some(Self {
            limit,
            remaining,
            reset,
        })
    }

    /// The reset time as a UTC instant, if representable.
    pub fn reset_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.reset, 0)
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}
