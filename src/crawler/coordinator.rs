//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop. It walks a fixed range of
//! listing pages one request at a time:
//! - Fetching each listing page and extracting its blocks
//! - Skipping blocks whose natural key is already stored
//! - Extracting and storing every new article
//! - Recording the run and its counters

use crate::config::{config_hash, validate, Config};
use crate::crawler::article::{extract_article, ArticleRules, ItemOutcome};
use crate::crawler::fetcher::Fetcher;
use crate::crawler::key::natural_key;
use crate::crawler::listing::{extract_blocks, Block, ListingRules};
use crate::storage::{open_store, ItemStore, RunStatus, StorageError};
use crate::HarvestError;
use std::path::Path;
use std::time::{Duration, Instant};
use url::Url;

/// Counters for one crawl run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Listing pages fetched successfully
    pub pages_fetched: u32,
    /// Listing pages whose fetch failed
    pub pages_failed: u32,
    /// Blocks extracted from listing pages
    pub blocks_seen: u32,
    /// New items written to the store
    pub items_inserted: u32,
    /// Blocks skipped because their key was already stored
    pub duplicates: u32,
    /// Blocks dropped for a missing key or marker
    pub extraction_failures: u32,
    /// Blocks dropped because their detail page could not be fetched
    pub transport_failures: u32,
}

impl CrawlReport {
    /// Blocks dropped for any reason other than being a duplicate
    pub fn failed_blocks(&self) -> u32 {
        self.extraction_failures + self.transport_failures
    }
}

/// Main crawler coordinator structure
///
/// Owns the item store for the duration of the crawl; nothing else touches
/// it while `run` is in progress.
pub struct Coordinator<S: ItemStore> {
    config: Config,
    origin: Url,
    fetcher: Fetcher,
    listing_rules: ListingRules,
    article_rules: ArticleRules,
    store: S,
    delay: Duration,
    requests_sent: u32,
}

impl<S: ItemStore> Coordinator<S> {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    /// * `store` - The item store to deduplicate against and write into
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid configuration or HTTP client
    pub fn new(config: Config, store: S) -> Result<Self, HarvestError> {
        validate(&config)?;

        let origin = Url::parse(&config.site.origin)?;
        let fetcher = Fetcher::new(&config.crawler, &config.user_agent)?;
        let listing_rules = ListingRules::from_config(&config.selectors, &config.languages)?;
        let article_rules = ArticleRules::from_config(&config.selectors)?;
        let delay = Duration::from_millis(config.crawler.request_delay_ms);

        Ok(Self {
            config,
            origin,
            fetcher,
            listing_rules,
            article_rules,
            store,
            delay,
            requests_sent: 0,
        })
    }

    /// URL of the listing page with the given index
    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}{}{}",
            self.config.site.origin.trim_end_matches('/'),
            self.config.site.listing_path,
            page
        )
    }

    /// Read access to the store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Gives the store back once the crawl is over
    pub fn into_store(self) -> S {
        self.store
    }

    /// Runs the crawl over every configured listing page
    ///
    /// Fetch and extraction problems are counted and skipped. A store write
    /// error aborts the run: the run row is marked failed and the error is
    /// returned.
    pub async fn run(&mut self) -> Result<CrawlReport, HarvestError> {
        let run_id = self.store.create_run(&config_hash(&self.config))?;
        tracing::info!("Starting crawl run {}", run_id);

        let start_time = Instant::now();
        let mut report = CrawlReport::default();

        if let Err(e) = self.crawl_pages(&mut report).await {
            tracing::error!("Aborting run {} on store error: {}", run_id, e);
            if let Err(mark_err) = self.store.finish_run(run_id, RunStatus::Failed, &report) {
                tracing::warn!("Could not mark run {} as failed: {}", run_id, mark_err);
            }
            return Err(e.into());
        }

        self.store
            .finish_run(run_id, RunStatus::Completed, &report)?;

        tracing::info!(
            inserted = report.items_inserted,
            duplicates = report.duplicates,
            failed = report.failed_blocks(),
            "Crawl completed: {} listing pages in {:?}",
            report.pages_fetched,
            start_time.elapsed()
        );

        Ok(report)
    }

    async fn crawl_pages(&mut self, report: &mut CrawlReport) -> Result<(), StorageError> {
        let first = self.config.crawler.start_page;
        let last = first.saturating_add(self.config.crawler.page_count);

        for page in first..last {
            let url = self.listing_url(page);
            tracing::debug!("Fetching listing page {}: {}", page, url);

            self.pause().await;
            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!("Skipping listing page {}: {}", page, e);
                    report.pages_failed += 1;
                    continue;
                }
            };
            report.pages_fetched += 1;

            let blocks = extract_blocks(&html, &self.listing_rules);
            tracing::info!("Listing page {}: {} blocks", page, blocks.len());
            report.blocks_seen += blocks.len() as u32;

            for block in blocks {
                self.process_block(block, report).await?;
            }
        }

        Ok(())
    }

    /// Handles one block: dedupe, extract, store
    async fn process_block(
        &mut self,
        block: Block,
        report: &mut CrawlReport,
    ) -> Result<(), StorageError> {
        let key = match natural_key(&block.link) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Skipping block '{}': {}", block.title, e);
                report.extraction_failures += 1;
                return Ok(());
            }
        };

        if self.store.has(&key) {
            tracing::info!(key = %key, "Skipping already stored item");
            report.duplicates += 1;
            return Ok(());
        }

        self.pause().await;
        let outcome = extract_article(
            &self.fetcher,
            &self.origin,
            &self.article_rules,
            block,
            key,
        )
        .await;

        match outcome {
            ItemOutcome::Extracted(item) => {
                self.store.insert(&item)?;
                report.items_inserted += 1;
                tracing::info!(
                    key = %item.natural_key,
                    languages = item.languages.len(),
                    "Stored '{}'",
                    item.title
                );
            }
            ItemOutcome::ExtractionFailed { url, reason } => {
                tracing::warn!("Skipping {}: {}", url, reason);
                report.extraction_failures += 1;
            }
            ItemOutcome::TransportFailed { url, error } => {
                tracing::warn!("Skipping {}: {}", url, error);
                report.transport_failures += 1;
            }
        }

        Ok(())
    }

    /// Sleeps the fixed delay before every request but the first
    async fn pause(&mut self) {
        if self.requests_sent > 0 && !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.requests_sent += 1;
    }
}

/// Runs a crawl against the database named in the configuration
///
/// # Example
///
/// ```no_run
/// use news_harvest::config::load_config;
/// use news_harvest::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("harvest.toml"))?;
/// let report = run_crawl(config).await?;
/// println!("{} new items", report.items_inserted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlReport, HarvestError> {
    let store = open_store(Path::new(&config.output.database_path))?;
    let mut coordinator = Coordinator::new(config, store)?;
    coordinator.run().await
}
