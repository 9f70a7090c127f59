//! Storage traits and error types
//!
//! This module defines the trait interface for item stores and
//! associated error types.

use crate::crawler::{CrawlReport, Item};
use crate::storage::{RunRecord, RunStatus, StoredItem};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Item already stored: {0}")]
    DuplicateKey(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Database not found: {}", .0.display())]
    DatabaseNotFound(PathBuf),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for item store implementations
///
/// A store owns the seen-set of natural keys and the language-id table.
/// Both are loaded from durable storage when the store is opened and are
/// only changed through `insert` and `language_id`.
pub trait ItemStore {
    // ===== Deduplication =====

    /// Returns true if an item with this natural key is already stored
    fn has(&self, natural_key: &str) -> bool;

    // ===== Languages =====

    /// Returns the id for a language name, allocating the next id on first sighting
    ///
    /// A new `(id, name)` pair is persisted before the id is returned. Ids
    /// start at 1 and an existing name never gets a new id.
    fn language_id(&mut self, name: &str) -> StorageResult<i64>;

    // ===== Items =====

    /// Persists an item with its language associations
    ///
    /// The item row, any new language rows and the join rows are written in a
    /// single transaction. The natural key is marked as seen only after commit.
    ///
    /// # Errors
    ///
    /// * `StorageError::DuplicateKey` - The natural key is already stored
    /// * `StorageError::Sqlite` - The write failed; nothing was persisted
    fn insert(&mut self, item: &Item) -> StorageResult<()>;

    /// Looks up a stored item by natural key
    fn get_item(&self, natural_key: &str) -> StorageResult<Option<StoredItem>>;

    // ===== Statistics =====

    /// Gets total item count
    fn count_items(&self) -> StorageResult<u64>;

    /// Gets the number of distinct languages
    fn count_languages(&self) -> StorageResult<u64>;

    /// Gets `(language, item count)` pairs, most used first
    fn language_item_counts(&self) -> StorageResult<Vec<(String, u64)>>;

    // ===== Run Management =====

    /// Creates a new crawl run in the running state
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Records the final status and counters of a run
    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        report: &CrawlReport,
    ) -> StorageResult<()>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
