//! HTTP API collaborators
//!
//! This module contains the two JSON API clients at the edge of the
//! pipeline: the paginated listing client and the album resolver. Both are
//! thin wrappers over a shared `reqwest::Client` and are hidden behind
//! traits so the crawl logic can be tested against scripted fakes.

mod album;
mod listing;

pub use album::{album_id_from_path, AlbumEntry, AlbumSource, ImgurClient, IMAGE_HOST};
pub use listing::{Item, ListingError, ListingPage, ListingSource, RedditClient};

use reqwest::Client;
use std::time::Duration;

/// Builds the HTTP client shared by all API and content requests
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(concat!("redrip/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}
