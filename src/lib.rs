//! News-Harvest: a sequential news crawler
//!
//! This crate walks the listing pages of a news site, extracts article blocks
//! tagged with language names, fetches each new article's detail page and
//! stores the result in SQLite, deduplicating by a key derived from the
//! article link.

pub mod config;
pub mod crawler;
pub mod output;
pub mod storage;

use thiserror::Error;

/// Main error type for News-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for {field}: {selector}")]
    InvalidSelector { field: &'static str, selector: String },
}

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    Client(String),

    #[error("HTTP error for {url}: {source}")]
    Transport { url: String, source: reqwest::Error },

    #[error("Unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Errors raised while extracting structured data from a page
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Missing {marker} marker")]
    MissingMarker { marker: &'static str },

    #[error("No natural key in link {link}: expected at least two numeric groups")]
    MissingKey { link: String },

    #[error("Link is not a relative path: {0}")]
    AbsoluteLink(String),

    #[error("Cannot resolve link {link}: {source}")]
    BadLink {
        link: String,
        source: ::url::ParseError,
    },
}

/// Result type alias for News-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Block, CrawlReport, Item, ItemOutcome};
pub use storage::{ItemStore, SqliteStore};
