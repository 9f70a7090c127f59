//! Configuration module for News-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! and layering command-line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use news_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Crawler will walk {} listing pages", config.crawler.page_count);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CompoundLabel, Config, CrawlerConfig, LanguageConfig, OutputConfig, SelectorConfig,
    SiteConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{config_hash, load_config, Overrides};
pub use validation::validate;
