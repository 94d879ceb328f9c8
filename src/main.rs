//! Redrip main entry point
//!
//! Command-line interface for the redrip listing crawler and image
//! downloader.

use clap::{CommandFactory, Parser};
use redrip::api::{build_http_client, ImgurClient, RedditClient};
use redrip::config::{
    parse_size, parse_types, Config, CrawlConfig, DedupConfig, FilterConfig, NamingConfig,
    OutputConfig,
};
use redrip::naming::{NameTemplate, DEFAULT_ALBUM_TEMPLATE, DEFAULT_SINGLE_TEMPLATE};
use redrip::{run_crawl, ConfigError};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Redrip: a throttled listing crawler and image downloader
///
/// Redrip crawls the listings of one or more sources, downloads every
/// image it finds (expanding multi-image albums), filters and
/// deduplicates the results, and writes them under deterministic names.
#[derive(Parser, Debug)]
#[command(name = "redrip")]
#[command(version)]
#[command(about = "Crawl source listings and download their images", long_about = None)]
struct Cli {
    /// Source names to crawl
    #[arg(value_name = "SOURCES")]
    sources: Vec<String>,

    /// Root output directory
    #[arg(long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Naming template for single images
    #[arg(long, value_name = "TEMPLATE", default_value = DEFAULT_SINGLE_TEMPLATE)]
    single_template: String,

    /// Naming template for images inside albums
    #[arg(long, value_name = "TEMPLATE", default_value = DEFAULT_ALBUM_TEMPLATE)]
    album_template: String,

    /// Skip duplicate single images (by URL and content hash)
    #[arg(long, value_name = "BOOL", default_value_t = true, action = clap::ArgAction::Set)]
    skip_duplicates: bool,

    /// Skip duplicate images within albums (by URL and content hash)
    #[arg(long, value_name = "BOOL", default_value_t = false, action = clap::ArgAction::Set)]
    skip_duplicates_in_albums: bool,

    /// Minimum seconds between listing API requests
    #[arg(long, value_name = "SECONDS", default_value_t = 2.0)]
    throttle: f64,

    /// Listing page size
    #[arg(long, value_name = "N", default_value_t = 25)]
    page_size: u32,

    /// Restrict each source's listing to this search query
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Suppress per-item success output (skips and errors still print)
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Overwrite existing files
    #[arg(long)]
    overwrite: bool,

    /// Include NSFW items
    #[arg(long)]
    nsfw: bool,

    /// Skip album items instead of expanding them
    #[arg(long)]
    no_albums: bool,

    /// Skip items scoring below this
    #[arg(long, value_name = "SCORE")]
    min_score: Option<i64>,

    /// Minimum payload size (e.g. 500, 64KB, 2MB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    min_size: Option<u64>,

    /// Maximum payload size (e.g. 2MB, 1GB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    max_size: Option<u64>,

    /// Minimum image width in pixels
    #[arg(long, value_name = "PIXELS")]
    min_width: Option<u32>,

    /// Maximum image width in pixels
    #[arg(long, value_name = "PIXELS")]
    max_width: Option<u32>,

    /// Minimum image height in pixels
    #[arg(long, value_name = "PIXELS")]
    min_height: Option<u32>,

    /// Maximum image height in pixels
    #[arg(long, value_name = "PIXELS")]
    max_height: Option<u32>,

    /// Skip portrait images
    #[arg(long)]
    no_portrait: bool,

    /// Skip landscape images
    #[arg(long)]
    no_landscape: bool,

    /// Skip square images
    #[arg(long)]
    no_square: bool,

    /// Comma-separated image type allow-list (e.g. png,jpg,gif)
    #[arg(long, value_name = "LIST", value_parser = parse_types_arg)]
    types: Option<TypeList>,
}

/// Parsed image type allow-list CLI value
#[derive(Debug, Clone)]
struct TypeList(Vec<String>);

fn parse_types_arg(value: &str) -> Result<TypeList, ConfigError> {
    parse_types(value).map(TypeList)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    if cli.sources.is_empty() {
        eprintln!("No sources provided.\n");
        Cli::command().print_help()?;
        return Ok(());
    }

    // Naming templates are validated before any crawling; a template
    // defect would affect every item identically.
    let config = build_config(&cli)?;

    let client = build_http_client()?;
    let listing = RedditClient::new(client.clone());
    let albums = ImgurClient::new(client.clone());

    tracing::info!(
        "crawling {} source(s), throttle {}s, page size {}",
        config.sources.len(),
        cli.throttle,
        config.crawl.page_size
    );

    let stats = run_crawl(config, listing, client, albums).await;

    tracing::info!(
        "done: {} downloaded, {} skipped, {} errors",
        stats.downloaded,
        stats.skipped,
        stats.errors
    );

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Quiet mode raises the floor to warnings, which silences per-item
/// success lines while keeping every skip and error visible.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("redrip=warn")
    } else {
        match verbose {
            0 => EnvFilter::new("redrip=info,warn"),
            1 => EnvFilter::new("redrip=debug,info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Assembles the process-wide configuration from CLI input
fn build_config(cli: &Cli) -> Result<Config, ConfigError> {
    // Duration::from_secs_f64 panics on negative or non-finite input
    if !cli.throttle.is_finite() || cli.throttle <= 0.0 {
        return Err(ConfigError::InvalidThrottle(format!(
            "{} (must be a positive number of seconds)",
            cli.throttle
        )));
    }

    let single = NameTemplate::parse(&cli.single_template)?;
    let album = NameTemplate::parse(&cli.album_template)?;

    let filter = FilterConfig {
        nsfw: cli.nsfw,
        min_score: cli.min_score,
        min_size: cli.min_size.unwrap_or(0),
        max_size: cli.max_size.unwrap_or(0),
        min_width: cli.min_width.unwrap_or(0),
        max_width: cli.max_width.unwrap_or(0),
        min_height: cli.min_height.unwrap_or(0),
        max_height: cli.max_height.unwrap_or(0),
        no_portrait: cli.no_portrait,
        no_landscape: cli.no_landscape,
        no_square: cli.no_square,
        allowed_types: cli.types.clone().map(|t| t.0).unwrap_or_default(),
    };
    filter.validate()?;

    Ok(Config {
        sources: cli.sources.clone(),
        crawl: CrawlConfig {
            throttle: Duration::from_secs_f64(cli.throttle),
            page_size: cli.page_size,
            search: cli.search.clone(),
        },
        filter,
        dedup: DedupConfig {
            urls: cli.skip_duplicates,
            hashes: cli.skip_duplicates,
            album_urls: cli.skip_duplicates_in_albums,
            album_hashes: cli.skip_duplicates_in_albums,
        },
        output: OutputConfig {
            root: cli.out.clone(),
            overwrite: cli.overwrite,
        },
        naming: NamingConfig { single, album },
        include_albums: !cli.no_albums,
    })
}
