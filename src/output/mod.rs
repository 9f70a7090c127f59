//! Output module for harvest summaries and reports
//!
//! This module handles:
//! - Loading statistics from the item database
//! - Printing them for the terminal
//! - Generating markdown summaries

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{load_statistics, print_statistics, CrawlStatistics};
