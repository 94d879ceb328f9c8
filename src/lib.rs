//! Redrip: a throttled listing crawler and image downloader
//!
//! This crate crawls paginated listings from one or more named sources,
//! funnels every discovered item through a filter/dedup/download pipeline,
//! expands multi-image albums, validates the downloaded content and writes
//! it to deterministically named files.

pub mod api;
pub mod config;
pub mod crawler;
pub mod dedup;
pub mod filter;
pub mod naming;
pub mod output;
pub mod throttle;

use thiserror::Error;

/// Main error type for redrip operations
#[derive(Debug, Error)]
pub enum RipError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Listing fetch error: {0}")]
    Listing(#[from] api::ListingError),

    #[error("Album resolve error for {album_id}: {message}")]
    Album { album_id: String, message: String },

    #[error("Malformed source URL: {0}")]
    InvalidUrl(String),

    #[error("Unknown service {domain} for {url}")]
    UnknownService { domain: String, url: String },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors, reported before any crawling begins
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid size filter: {0}")]
    InvalidSize(String),

    #[error("Invalid dimension filter: {0}")]
    InvalidDimensions(String),

    #[error("Invalid throttle interval: {0}")]
    InvalidThrottle(String),

    #[error("Invalid naming template: {0}")]
    InvalidTemplate(String),

    #[error("Invalid type filter: {0}")]
    InvalidType(String),
}

/// Result type alias for redrip operations
pub type Result<T> = std::result::Result<T, RipError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use api::{AlbumEntry, Item, ListingPage};
pub use config::Config;
pub use crawler::{run_crawl, CrawlStats};
pub use dedup::DedupStore;
