//! Statistics generation from the item database
//!
//! This module provides functionality for extracting and displaying
//! harvest statistics from the storage layer.

use crate::storage::{ItemStore, RunRecord};
use crate::HarvestError;

/// Harvest statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Total number of stored items
    pub total_items: u64,

    /// Number of distinct languages
    pub total_languages: u64,

    /// `(language, item count)`, most used first
    pub items_by_language: Vec<(String, u64)>,

    /// Most recent crawl run, if any
    pub latest_run: Option<RunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The item store to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(HarvestError)` - Failed to query statistics
pub fn load_statistics(store: &dyn ItemStore) -> Result<CrawlStatistics, HarvestError> {
    Ok(CrawlStatistics {
        total_items: store.count_items()?,
        total_languages: store.count_languages()?,
        items_by_language: store.language_item_counts()?,
        latest_run: store.get_latest_run()?,
    })
}

/// Prints statistics to stdout in a human-readable format
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Total Items: {}", stats.total_items);
    println!("Languages: {}", stats.total_languages);

    if !stats.items_by_language.is_empty() {
        println!("\nItems by Language:");
        for (language, count) in &stats.items_by_language {
            println!("  {:<30} {:>8}", language, count);
        }
    }

    if let Some(run) = &stats.latest_run {
        println!("\nLatest Run (#{}):", run.id);
        println!("  Status: {}", run.status);
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!("  Listing pages fetched: {}", run.report.pages_fetched);
        println!("  Listing pages failed: {}", run.report.pages_failed);
        println!("  Items inserted: {}", run.report.items_inserted);
        println!("  Duplicates skipped: {}", run.report.duplicates);
        println!("  Blocks failed: {}", run.report.failed_blocks());
    } else {
        println!("\nNo crawl runs recorded");
    }

    println!();
}
