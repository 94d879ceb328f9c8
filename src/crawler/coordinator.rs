//! Consumer pipeline
//!
//! The pipeline drains the item stream produced by the scheduler and
//! drives each surviving item through dedup, download, validation, naming
//! and writing. Items whose content is an album are expanded into their
//! member images, each processed with the album-scoped dedup policy.
//!
//! Every per-item outcome is a log line carrying the content URL and the
//! item's permalink; skips and hard errors never abort the crawl.

use crate::api::{album_id_from_path, AlbumEntry, AlbumSource, ImgurClient, Item};
use crate::config::Config;
use crate::crawler::fetcher::{fetch_content, FetchOutcome};
use crate::dedup::DedupStore;
use crate::filter::{evaluate_item, validate_content};
use crate::naming::{resolve_extension, NameContext};
use crate::output::{write_payload, WriteOutcome};
use crate::{Result, RipError};
use tokio::sync::mpsc;
use url::Url;

/// Counters for the crawl summary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Files written
    pub downloaded: u64,

    /// Items and album entries skipped (filtered, duplicate, not found,
    /// bad status, rejected, pre-existing destination)
    pub skipped: u64,

    /// Items and album entries abandoned on a hard error
    pub errors: u64,
}

/// The filter/fetch/validate/write consumer
pub struct Pipeline {
    config: Config,
    client: reqwest::Client,
    albums: ImgurClient,
    dedup: DedupStore,
    stats: CrawlStats,
}

impl Pipeline {
    pub fn new(config: Config, client: reqwest::Client, albums: ImgurClient) -> Self {
        Self {
            config,
            client,
            albums,
            dedup: DedupStore::new(),
            stats: CrawlStats::default(),
        }
    }

    /// Consumes items until the stream closes, returning the final counters
    pub async fn run(mut self, mut items: mpsc::Receiver<Item>) -> CrawlStats {
        while let Some(item) = items.recv().await {
            if let Some(reason) = evaluate_item(&item, &self.config.filter) {
                tracing::warn!("skipping {} ({}): {}", item.url, item.permalink, reason);
                self.stats.skipped += 1;
                continue;
            }

            if let Err(e) = self.process_item(&item).await {
                tracing::error!("fetching {} ({}) => {}", item.url, item.permalink, e);
                self.stats.errors += 1;
            }
        }

        tracing::info!("finished");
        self.stats
    }

    /// Routes an item to the single-image or album path by its hints
    async fn process_item(&mut self, item: &Item) -> Result<()> {
        if item.post_hint == "image" {
            self.fetch_single(&item.url, item).await
        } else if item.domain == "imgur.com" {
            self.fetch_album_service(item).await
        } else {
            Err(RipError::UnknownService {
                domain: item.domain.clone(),
                url: item.url.clone(),
            })
        }
    }

    /// Downloads, validates and writes one single image
    async fn fetch_single(&mut self, url: &str, item: &Item) -> Result<()> {
        let dedup = self.config.dedup.clone();

        if self.dedup.check_url(url, dedup.urls) {
            tracing::warn!("skipping {} ({})", url, item.permalink);
            self.stats.skipped += 1;
            return Ok(());
        }

        let (data, content_type, hash) =
            match fetch_content(&self.client, url, dedup.hashes).await? {
                FetchOutcome::NotFound => {
                    tracing::warn!("fetching {} ({}) => not found", url, item.permalink);
                    self.stats.skipped += 1;
                    return Ok(());
                }
                FetchOutcome::BadStatus(status) => {
                    tracing::warn!(
                        "fetching {} ({}) => HTTP status {}",
                        url,
                        item.permalink,
                        status
                    );
                    self.stats.skipped += 1;
                    return Ok(());
                }
                FetchOutcome::Payload {
                    data,
                    content_type,
                    hash,
                } => (data, content_type, hash),
            };

        if let Some(hash) = &hash {
            if self.dedup.check_hash(hash, dedup.hashes) {
                tracing::warn!(
                    "fetching {} ({}) => hash exists already, skipping",
                    url,
                    item.permalink
                );
                self.stats.skipped += 1;
                return Ok(());
            }
        }

        if let Some(reason) = validate_content(&data, &self.config.filter) {
            tracing::warn!("fetching {} ({}) => rejected: {}", url, item.permalink, reason);
            self.stats.skipped += 1;
            return Ok(());
        }

        let parsed = Url::parse(url).map_err(|_| RipError::InvalidUrl(url.to_string()))?;
        let ext = resolve_extension(&parsed, content_type.as_deref());
        let rendered = self
            .config
            .naming
            .single
            .render(&NameContext::for_item(item, &ext));

        self.write(&rendered, &data, url, &item.permalink)
    }

    /// Handles an item hosted on the album service
    ///
    /// Album-pattern paths expand into per-entry downloads; anything else
    /// is a direct image on the same host.
    async fn fetch_album_service(&mut self, item: &Item) -> Result<()> {
        let url = Url::parse(&item.url).map_err(|_| RipError::InvalidUrl(item.url.clone()))?;

        let album_id = match album_id_from_path(url.path()) {
            Some(id) => id,
            None => {
                let direct = self.albums.direct_image_url(url.path());
                return self.fetch_single(&direct, item).await;
            }
        };

        if !self.config.include_albums {
            tracing::warn!(
                "skipping album {} ({}): album expansion disabled",
                item.url,
                item.permalink
            );
            self.stats.skipped += 1;
            return Ok(());
        }

        if self.dedup.check_url(&item.url, self.config.dedup.urls) {
            tracing::warn!("skipping album {} ({})", item.url, item.permalink);
            self.stats.skipped += 1;
            return Ok(());
        }

        let entries = self.albums.resolve_album(album_id).await?;

        for (index, entry) in entries.iter().enumerate() {
            if let Err(e) = self.fetch_album_entry(item, entry, index + 1).await {
                tracing::error!(
                    "fetching album entry {} ({}) => {}",
                    entry.hash,
                    item.permalink,
                    e
                );
                self.stats.errors += 1;
            }
        }

        Ok(())
    }

    /// Downloads, validates and writes one album entry
    async fn fetch_album_entry(
        &mut self,
        item: &Item,
        entry: &AlbumEntry,
        num: usize,
    ) -> Result<()> {
        let dedup = self.config.dedup.clone();
        let url = self.albums.entry_url(entry);

        if self.dedup.check_url(&url, dedup.album_urls) {
            tracing::warn!("skipping {} ({})", url, item.permalink);
            self.stats.skipped += 1;
            return Ok(());
        }

        let (data, hash) = match fetch_content(&self.client, &url, dedup.album_hashes).await? {
            FetchOutcome::NotFound => {
                tracing::warn!("fetching {} ({}) => not found", url, item.permalink);
                self.stats.skipped += 1;
                return Ok(());
            }
            FetchOutcome::BadStatus(status) => {
                tracing::warn!(
                    "fetching {} ({}) => HTTP status {}",
                    url,
                    item.permalink,
                    status
                );
                self.stats.skipped += 1;
                return Ok(());
            }
            FetchOutcome::Payload { data, hash, .. } => (data, hash),
        };

        if let Some(hash) = &hash {
            if self.dedup.check_hash(hash, dedup.album_hashes) {
                tracing::warn!(
                    "fetching {} ({}) => hash exists already, skipping",
                    url,
                    item.permalink
                );
                self.stats.skipped += 1;
                return Ok(());
            }
        }

        if let Some(reason) = validate_content(&data, &self.config.filter) {
            tracing::warn!("fetching {} ({}) => rejected: {}", url, item.permalink, reason);
            self.stats.skipped += 1;
            return Ok(());
        }

        let rendered = self
            .config
            .naming
            .album
            .render(&NameContext::for_album_entry(item, &entry.hash, &entry.ext, num));

        self.write(&rendered, &data, &url, &item.permalink)
    }

    fn write(&mut self, rendered: &str, data: &[u8], url: &str, permalink: &str) -> Result<()> {
        let outcome = write_payload(
            rendered,
            data,
            &self.config.output.root,
            self.config.output.overwrite,
        )?;

        match outcome {
            WriteOutcome::SkippedExisting(path) => {
                tracing::warn!(
                    "fetching {} ({}) => {} exists, overwrite disabled",
                    url,
                    permalink,
                    path.display()
                );
                self.stats.skipped += 1;
            }
            WriteOutcome::Written(path) => {
                tracing::info!("fetching {} ({}) => {}", url, permalink, path.display());
                self.stats.downloaded += 1;
            }
        }

        Ok(())
    }
}
