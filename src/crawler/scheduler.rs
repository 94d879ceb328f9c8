//! Crawl scheduler
//!
//! The scheduler is the producer half of the pipeline. It round-robins
//! over the configured sources, fetching one listing page per source per
//! round through the shared throttle, and pushes every discovered item
//! into the bounded item stream in page order. A source becomes exhausted
//! when a page arrives without a continuation cursor; the stream closes
//! once every source is exhausted.
//!
//! Transient listing failures are retried rather than surfaced: a crawl is
//! a long-running best-effort process and liveness wins over fail-fast.
//! Rate-limited responses grow a per-page backoff by one throttle interval
//! per occurrence and retry the same cursor; other errors re-acquire a
//! throttle permit and retry. Tests bound the retry loop through
//! `BackoffPolicy`.

use crate::api::{Item, ListingError, ListingPage, ListingSource};
use crate::throttle::Throttle;
use std::time::Duration;
use tokio::sync::mpsc;

/// Retry pacing for listing fetches
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Step added to the rate-limit backoff per occurrence
    pub interval: Duration,

    /// Attempt cap per page; `None` retries forever
    pub max_attempts: Option<u32>,
}

impl BackoffPolicy {
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
        }
    }

    pub fn bounded(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts: Some(max_attempts),
        }
    }
}

/// Pagination state of one source
///
/// An empty cursor means "from the start". Only the scheduler ever
/// touches this state.
struct SourceState {
    name: String,
    cursor: String,
    exhausted: bool,
}

/// Round-robin producer over a fixed set of paginated sources
pub struct CrawlScheduler<L> {
    listing: L,
    sources: Vec<SourceState>,
    throttle: Throttle,
    page_size: u32,
    search: Option<String>,
    backoff: BackoffPolicy,
}

impl<L: ListingSource> CrawlScheduler<L> {
    pub fn new(
        listing: L,
        sources: Vec<String>,
        throttle: Throttle,
        page_size: u32,
        search: Option<String>,
        backoff: BackoffPolicy,
    ) -> Self {
        let sources = sources
            .into_iter()
            .map(|name| SourceState {
                name,
                cursor: String::new(),
                exhausted: false,
            })
            .collect();

        Self {
            listing,
            sources,
            throttle,
            page_size,
            search,
            backoff,
        }
    }

    /// Runs the crawl, pushing items into `items` until every source is
    /// exhausted
    ///
    /// Dropping the sender on return closes the stream and signals
    /// end-of-crawl to the consumer. Within a source, page order and
    /// in-page order are preserved; across sources, items interleave in
    /// round-robin order.
    pub async fn run(mut self, items: mpsc::Sender<Item>) {
        let mut page_number = 1u64;

        loop {
            let mut all_exhausted = true;

            for index in 0..self.sources.len() {
                if self.sources[index].exhausted {
                    continue;
                }
                all_exhausted = false;

                self.throttle.acquire().await;
                tracing::info!(
                    "fetching page {} of r/{}",
                    page_number,
                    self.sources[index].name
                );

                let page = match self.fetch_page_with_retry(index).await {
                    Some(page) => page,
                    None => {
                        // Retry budget spent; drop the source rather than
                        // stall the whole round forever.
                        self.sources[index].exhausted = true;
                        continue;
                    }
                };

                for item in page.items {
                    if items.send(item).await.is_err() {
                        tracing::warn!("item stream closed, stopping crawl");
                        return;
                    }
                }

                match page.after {
                    Some(after) => self.sources[index].cursor = after,
                    None => {
                        self.sources[index].exhausted = true;
                        tracing::info!("completed r/{}", self.sources[index].name);
                    }
                }
            }

            page_number += 1;
            if all_exhausted {
                break;
            }
        }
    }

    /// Fetches one page for the source at `index`, retrying per policy
    ///
    /// Rate-limited responses sleep an escalating backoff and retry the
    /// same cursor without re-acquiring the throttle; other failures log
    /// and retry behind a fresh throttle permit.
    async fn fetch_page_with_retry(&self, index: usize) -> Option<ListingPage> {
        let source = &self.sources[index];
        let mut rate_limit_wait = Duration::ZERO;
        let mut attempts = 0u32;

        loop {
            if !rate_limit_wait.is_zero() {
                tokio::time::sleep(rate_limit_wait).await;
            }

            match self
                .listing
                .fetch_page(
                    &source.name,
                    &source.cursor,
                    self.page_size,
                    self.search.as_deref(),
                )
                .await
            {
                Ok(page) => return Some(page),
                Err(ListingError::RateLimited) => {
                    rate_limit_wait += self.backoff.interval;
                    tracing::warn!(
                        "rate limit reached on r/{}, retrying after {:?}",
                        source.name,
                        rate_limit_wait
                    );
                }
                Err(e) => {
                    tracing::warn!("fetching r/{} failed: {}, retrying", source.name, e);
                    self.throttle.acquire().await;
                }
            }

            attempts += 1;
            if let Some(max) = self.backoff.max_attempts {
                if attempts >= max {
                    tracing::error!(
                        "giving up on r/{} after {} failed attempts",
                        source.name,
                        attempts
                    );
                    return None;
                }
            }
        }
    }
}
