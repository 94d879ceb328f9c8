use crate::naming::NameTemplate;
use crate::ConfigError;
use std::path::PathBuf;
use std::time::Duration;

/// Process-wide configuration, constructed once at startup from user input
#[derive(Debug, Clone)]
pub struct Config {
    /// Named sources to crawl, in round-robin order
    pub sources: Vec<String>,
    pub crawl: CrawlConfig,
    pub filter: FilterConfig,
    pub dedup: DedupConfig,
    pub output: OutputConfig,
    pub naming: NamingConfig,
    /// Whether album items are expanded or skipped
    pub include_albums: bool,
}

/// Crawl pacing and pagination configuration
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Minimum spacing between successive listing fetches
    pub throttle: Duration,

    /// Listing page size
    pub page_size: u32,

    /// Optional search query restricting each source's listing
    pub search: Option<String>,
}

/// Static and content-based item filters
///
/// Size and dimension bounds use 0 to mean "unbounded".
#[derive(Debug, Clone, Default)]
pub struct FilterConfig {
    /// Include adult-flagged items
    pub nsfw: bool,

    /// Reject items scoring below this
    pub min_score: Option<i64>,

    /// Payload byte-size bounds, checked on raw length before any decode
    pub min_size: u64,
    pub max_size: u64,

    /// Pixel dimension bounds
    pub min_width: u32,
    pub max_width: u32,
    pub min_height: u32,
    pub max_height: u32,

    /// Disabled orientation classes
    pub no_portrait: bool,
    pub no_landscape: bool,
    pub no_square: bool,

    /// Allowed image types (normalized extensions); empty allows all
    pub allowed_types: Vec<String>,
}

impl FilterConfig {
    /// Rejects inverted bounds before any crawling begins
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_size > 0 && self.min_size > self.max_size {
            return Err(ConfigError::InvalidSize(format!(
                "minimum {} exceeds maximum {}",
                self.min_size, self.max_size
            )));
        }
        if self.max_width > 0 && self.min_width > self.max_width {
            return Err(ConfigError::InvalidDimensions(format!(
                "minimum width {} exceeds maximum {}",
                self.min_width, self.max_width
            )));
        }
        if self.max_height > 0 && self.min_height > self.max_height {
            return Err(ConfigError::InvalidDimensions(format!(
                "minimum height {} exceeds maximum {}",
                self.min_height, self.max_height
            )));
        }
        Ok(())
    }

    /// Whether any constraint requiring a header decode is configured
    pub fn has_content_constraints(&self) -> bool {
        !self.allowed_types.is_empty()
            || self.no_portrait
            || self.no_landscape
            || self.no_square
            || self.min_width > 0
            || self.max_width > 0
            || self.min_height > 0
            || self.max_height > 0
    }
}

/// Per-stage duplicate suppression policies
///
/// URL and hash dedup are independently switchable, with separate policies
/// for top-level items and for entries inside an expanded album.
#[derive(Debug, Clone)]
pub struct DedupConfig {
    pub urls: bool,
    pub hashes: bool,
    pub album_urls: bool,
    pub album_hashes: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            urls: true,
            hashes: true,
            album_urls: false,
            album_hashes: false,
        }
    }
}

/// Destination configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Root directory that relative destination paths resolve against
    pub root: PathBuf,

    /// Replace pre-existing destination files
    pub overwrite: bool,
}

/// Parsed naming templates, validated once at startup
#[derive(Debug, Clone)]
pub struct NamingConfig {
    pub single: NameTemplate,
    pub album: NameTemplate,
}
