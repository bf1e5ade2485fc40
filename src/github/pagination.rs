//! Page cursors derived from `Link` response headers.
//!
//! The listing endpoints advertise further pages with an RFC 8288 `Link`
//! header such as:
//!
//! ```text
//! <https://api.github.com/user/1/repos?per_page=100&page=2>; rel="next",
//! <https://api.github.com/user/1/repos?per_page=100&page=4>; rel="last"
//! ```
//!
//! The fetcher only ever sees a [`PageCursor`]; the header syntax stays in
//! this module.

use reqwest::header::{HeaderMap, LINK};
use url::Url;

/// Opaque position in a paginated listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageCursor {
    page: u32,
}

impl PageCursor {
    /// Cursor for the first page of any listing.
    pub const fn first() -> Self {
        Self { page: 1 }
    }

    /// One-based page number used in request query strings and logs.
    pub const fn page(&self) -> u32 {
        self.page
    }
}

impl std::fmt::Display for PageCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page {}", self.page)
    }
}

/// Returns the cursor of the next page, or `None` on the last page.
pub fn next_page_cursor(headers: &HeaderMap) -> Option<PageCursor> {
    let link = headers.get(LINK)?.to_str().ok()?;
    parse_next_link(link)
}

/// Finds the `rel="next"` target in a `Link` header value.
pub fn parse_next_link(value: &str) -> Option<PageCursor> {
    value
        .split(',')
        .filter_map(parse_link_value)
        .find(|(_, rels)| rels.split_whitespace().any(|rel| rel == "next"))
        .and_then(|(target, _)| page_from_url(target))
}

/// Splits one `<target>; rel="..."` entry into its target and rel list.
fn parse_link_value(entry: &str) -> Option<(&str, &str)> {
    let mut parts = entry.split(';');
    let target = parts
        .next()?
        .trim()
        .strip_prefix('<')?
        .strip_suffix('>')?;

    let rels = parts.find_map(|param| {
        let (key, value) = param.split_once('=')?;
        (key.trim() == "rel").then(|| value.trim().trim_matches('"'))
    })?;

    Some((target, rels))
}

fn page_from_url(target: &str) -> Option<PageCursor> {
    let url = Url::parse(target).ok()?;
    let page = url
        .query_pairs()
        .find(|(key, _)| key == "page")?
        .1
        .parse::<u32>()
        .ok()?;

    (page > 0).then_some(PageCursor { page })
}
