//! Storage module for persisting harvested articles
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and the schema migration
//! - Item persistence with language associations
//! - The in-memory seen-set and language-id cache
//! - Run tracking

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ItemStore, StorageError, StorageResult};

use crate::crawler::CrawlReport;
use std::path::Path;

/// Opens (creating if needed) the item store at `path`
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Store with its seen-set and language cache loaded
/// * `Err(StorageError)` - Failed to open or migrate the database
pub fn open_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::open(path)
}

/// Opens an existing item store for reporting; never creates a database
pub fn open_existing_store(path: &Path) -> StorageResult<SqliteStore> {
    SqliteStore::open_existing(path)
}

/// An item read back from the database
#[derive(Debug, Clone)]
pub struct StoredItem {
    pub id: i64,
    pub natural_key: String,
    pub title: String,
    pub link: String,
    pub date: String,
    pub full_text: String,
    /// Associated language names, in association order
    pub languages: Vec<String>,
    pub created_at: String,
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub report: CrawlReport,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_db_string())
    }
}
