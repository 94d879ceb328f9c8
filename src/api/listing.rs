//! Paginated listing client
//!
//! Fetches one page of submissions at a time from a named source, either
//! from its "new" feed or from a search restricted to that source. A
//! rate-limited response (HTTP 429) is reported as a distinguished error
//! variant so the scheduler can apply its escalating backoff instead of
//! the ordinary retry path.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Errors from a listing page fetch
#[derive(Debug, Error)]
pub enum ListingError {
    /// The API rejected the request with HTTP 429
    #[error("rate limited")]
    RateLimited,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One submission discovered on a listing page
///
/// Items are immutable once produced; the pipeline owns them for their
/// entire processing lifetime.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Source-of-truth URL for the item's content
    #[serde(default)]
    pub url: String,
    /// Context reference included in every log line about this item
    #[serde(default)]
    pub permalink: String,
    /// Owning collection name
    #[serde(default)]
    pub subreddit: String,
    #[serde(default)]
    pub author: String,
    /// Creation instant as a Unix timestamp
    #[serde(default)]
    pub created_utc: f64,
    /// Hosting service hint used to pick a download strategy
    #[serde(default)]
    pub domain: String,
    /// Content classification hint ("image" for direct images)
    #[serde(default)]
    pub post_hint: String,
    #[serde(default)]
    pub is_meta: bool,
    #[serde(default, rename = "over_18")]
    pub nsfw: bool,
    #[serde(default)]
    pub score: i64,
}

/// One page of items plus the continuation cursor
///
/// `after` is `None` when the source has no further pages.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub items: Vec<Item>,
    pub after: Option<String>,
}

/// A paginated source of items
#[async_trait]
pub trait ListingSource {
    /// Fetches one page from `source` starting at `cursor`
    ///
    /// An empty cursor means "from the start". Items are returned in page
    /// order.
    async fn fetch_page(
        &self,
        source: &str,
        cursor: &str,
        page_size: u32,
        search: Option<&str>,
    ) -> Result<ListingPage, ListingError>;
}

// Wire format of the listing endpoint: a listing envelope wrapping a list
// of submission envelopes.

#[derive(Deserialize)]
struct RawListing {
    data: RawListingData,
}

#[derive(Deserialize)]
struct RawListingData {
    #[serde(default)]
    children: Vec<RawChild>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Deserialize)]
struct RawChild {
    data: Item,
}

/// Listing client for the reddit JSON API
pub struct RedditClient {
    http: reqwest::Client,
    base_url: String,
}

impl RedditClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self::with_base_url(http, "https://www.reddit.com")
    }

    /// Creates a client against a non-default API base (used by tests)
    pub fn with_base_url(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ListingSource for RedditClient {
    async fn fetch_page(
        &self,
        source: &str,
        cursor: &str,
        page_size: u32,
        search: Option<&str>,
    ) -> Result<ListingPage, ListingError> {
        let mut query: Vec<(&str, String)> = vec![("raw_json", "1".to_string())];
        if page_size > 0 {
            query.push(("limit", page_size.to_string()));
        }
        if !cursor.is_empty() {
            query.push(("after", cursor.to_string()));
        }

        let url = if let Some(search) = search {
            query.push(("restrict_sr", "on".to_string()));
            query.push(("sort", "new".to_string()));
            query.push(("q", search.to_string()));
            format!("{}/r/{}/search.json", self.base_url, source)
        } else {
            format!("{}/r/{}/new.json", self.base_url, source)
        };

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(&query)
            .send()
            .await?;

        if response.status().as_u16() == 429 {
            return Err(ListingError::RateLimited);
        }

        let body = response.bytes().await?;
        let raw: RawListing = serde_json::from_slice(&body)?;

        Ok(ListingPage {
            items: raw.data.children.into_iter().map(|c| c.data).collect(),
            // The API signals exhaustion as either a null or an empty cursor
            after: raw.data.after.filter(|a| !a.is_empty()),
        })
    }
}
