//! Crawler module for listing and article extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a rotating user agent
//! - Listing page parsing into article blocks
//! - Natural key derivation from article links
//! - Detail page extraction
//! - Overall crawl coordination

mod article;
mod coordinator;
mod fetcher;
mod key;
mod listing;

pub use article::{detail_url, extract_article, parse_article, ArticleBody, ArticleRules, Item, ItemOutcome};
pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use fetcher::Fetcher;
pub use key::natural_key;
pub use listing::{extract_blocks, Block, LanguageLabels, ListingRules};
