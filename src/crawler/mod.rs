//! Crawl orchestration
//!
//! This module contains the two halves of the acquisition pipeline and
//! their handoff:
//! - the scheduler, a producer paginating over every source
//! - the content fetcher with outcome classification
//! - the consumer pipeline applying filter, dedup, validation and writing
//!
//! Producer and consumer run as separate tasks joined by a bounded
//! capacity-1 channel, so pagination can never outrun processing.

mod coordinator;
mod fetcher;
mod scheduler;

pub use coordinator::{CrawlStats, Pipeline};
pub use fetcher::{fetch_content, FetchOutcome};
pub use scheduler::{BackoffPolicy, CrawlScheduler};

use crate::api::{ImgurClient, Item, ListingSource};
use crate::config::Config;
use crate::throttle::Throttle;
use tokio::sync::mpsc;

/// Runs a complete crawl to completion
///
/// Spawns the scheduler as a producer task, consumes its item stream
/// through the pipeline, and returns the final counters once every source
/// is exhausted and the last item has been processed.
pub async fn run_crawl<L>(
    config: Config,
    listing: L,
    client: reqwest::Client,
    albums: ImgurClient,
) -> CrawlStats
where
    L: ListingSource + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel::<Item>(1);

    let scheduler = CrawlScheduler::new(
        listing,
        config.sources.clone(),
        Throttle::new(config.crawl.throttle),
        config.crawl.page_size,
        config.crawl.search.clone(),
        BackoffPolicy::unbounded(config.crawl.throttle),
    );
    let producer = tokio::spawn(scheduler.run(tx));

    let stats = Pipeline::new(config, client, albums).run(rx).await;

    if let Err(e) = producer.await {
        tracing::error!("crawl scheduler task failed: {}", e);
    }
    stats
}
