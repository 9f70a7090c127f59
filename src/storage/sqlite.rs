//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ItemStore trait.

use crate::crawler::{CrawlReport, Item};
use crate::storage::schema::migrate;
use crate::storage::traits::{ItemStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus, StoredItem};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// SQLite item store
///
/// Holds the seen-set and the language-id cache next to the connection.
/// Both mirror the database and are only updated after a successful write.
pub struct SqliteStore {
    conn: Connection,
    seen: HashSet<String>,
    languages: HashMap<String, i64>,
    next_language_id: i64,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Opened database with caches loaded
    /// * `Err(StorageError)` - Failed to open or migrate the database
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::from_file(Connection::open(path)?)
    }

    /// Opens the database at `path` without creating it
    ///
    /// Fails with `StorageError::DatabaseNotFound` when no file exists there.
    pub fn open_existing(path: &Path) -> StorageResult<Self> {
        if !path.is_file() {
            return Err(StorageError::DatabaseNotFound(path.to_path_buf()));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        Self::from_file(Connection::open_with_flags(path, flags)?)
    }

    fn from_file(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        Self::from_connection(conn)
    }

    /// Creates an in-memory store, discarded when dropped
    pub fn open_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StorageResult<Self> {
        migrate(&conn)?;

        let seen = {
            let mut stmt = conn.prepare("SELECT natural_key FROM items")?;
            let keys = stmt
                .query_map([], |row| row.get::<_, String>(0))?
                .collect::<Result<HashSet<_>, _>>()?;
            keys
        };

        let languages = {
            let mut stmt = conn.prepare("SELECT name, id FROM languages")?;
            let rows = stmt
                .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
                .collect::<Result<HashMap<_, _>, _>>()?;
            rows
        };

        let next_language_id = languages.values().copied().max().unwrap_or(0) + 1;

        tracing::debug!(
            items = seen.len(),
            languages = languages.len(),
            "Loaded item store caches"
        );

        Ok(Self {
            conn,
            seen,
            languages,
            next_language_id,
        })
    }
}

fn insert_language(conn: &Connection, id: i64, name: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO languages (id, name) VALUES (?1, ?2)",
        params![id, name],
    )?;
    Ok(())
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: {
            let status: String = row.get(4)?;
            RunStatus::from_db_string(&status).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    4,
                    Type::Text,
                    format!("unknown run status '{}'", status).into(),
                )
            })?
        },
        report: CrawlReport {
            pages_fetched: row.get(5)?,
            pages_failed: row.get(6)?,
            blocks_seen: row.get(7)?,
            items_inserted: row.get(8)?,
            duplicates: row.get(9)?,
            extraction_failures: row.get(10)?,
            transport_failures: row.get(11)?,
        },
    })
}

impl ItemStore for SqliteStore {
    fn has(&self, natural_key: &str) -> bool {
        self.seen.contains(natural_key)
    }

    fn language_id(&mut self, name: &str) -> StorageResult<i64> {
        if let Some(id) = self.languages.get(name) {
            return Ok(*id);
        }

        let id = self.next_language_id;
        insert_language(&self.conn, id, name)?;

        self.next_language_id += 1;
        self.languages.insert(name.to_string(), id);
        tracing::debug!(language = name, id, "Allocated language id");

        Ok(id)
    }

    fn insert(&mut self, item: &Item) -> StorageResult<()> {
        if self.seen.contains(&item.natural_key) {
            return Err(StorageError::DuplicateKey(item.natural_key.clone()));
        }

        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO items (natural_key, title, link, date, full_text, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                item.natural_key,
                item.title,
                item.link,
                item.date,
                item.full_text,
                now
            ],
        )?;
        let item_id = tx.last_insert_rowid();

        // Ids allocated here only reach the cache once the transaction commits
        let mut allocated: Vec<(String, i64)> = Vec::new();
        let mut next_id = self.next_language_id;

        for name in &item.languages {
            let cached = self
                .languages
                .get(name)
                .copied()
                .or_else(|| allocated.iter().find(|(n, _)| n == name).map(|(_, id)| *id));

            let language_id = match cached {
                Some(id) => id,
                None => {
                    let id = next_id;
                    insert_language(&tx, id, name)?;
                    allocated.push((name.clone(), id));
                    next_id += 1;
                    id
                }
            };

            tx.execute(
                "INSERT OR IGNORE INTO item_languages (item_id, language_id) VALUES (?1, ?2)",
                params![item_id, language_id],
            )?;
        }

        tx.commit()?;

        self.next_language_id = next_id;
        self.languages.extend(allocated);
        self.seen.insert(item.natural_key.clone());

        Ok(())
    }

    fn get_item(&self, natural_key: &str) -> StorageResult<Option<StoredItem>> {
        let item = self
            .conn
            .query_row(
                "SELECT id, natural_key, title, link, date, full_text, created_at
                 FROM items WHERE natural_key = ?1",
                params![natural_key],
                |row| {
                    Ok(StoredItem {
                        id: row.get(0)?,
                        natural_key: row.get(1)?,
                        title: row.get(2)?,
                        link: row.get(3)?,
                        date: row.get(4)?,
                        full_text: row.get(5)?,
                        languages: Vec::new(),
                        created_at: row.get(6)?,
                    })
                },
            )
            .optional()?;

        let Some(mut item) = item else {
            return Ok(None);
        };

        let mut stmt = self.conn.prepare(
            "SELECT l.name FROM item_languages il
             JOIN languages l ON l.id = il.language_id
             WHERE il.item_id = ?1
             ORDER BY il.id",
        )?;
        item.languages = stmt
            .query_map(params![item.id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(Some(item))
    }

    fn count_items(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_languages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM languages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn language_item_counts(&self) -> StorageResult<Vec<(String, u64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT l.name, COUNT(il.item_id) AS count
             FROM languages l
             LEFT JOIN item_languages il ON il.language_id = l.id
             GROUP BY l.id
             ORDER BY count DESC, l.name ASC",
        )?;

        let counts = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get::<_, i64>(1)? as u64)))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(counts)
    }

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn finish_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        report: &CrawlReport,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_fetched = ?3, pages_failed = ?4,
             blocks_seen = ?5, items_inserted = ?6, duplicates = ?7, extraction_failures = ?8,
             transport_failures = ?9
             WHERE id = ?10",
            params![
                status.to_db_string(),
                now,
                report.pages_fetched,
                report.pages_failed,
                report.blocks_seen,
                report.items_inserted,
                report.duplicates,
                report.extraction_failures,
                report.transport_failures,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }

        Ok(())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, pages_fetched,
                 pages_failed, blocks_seen, items_inserted, duplicates, extraction_failures,
                 transport_failures
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }
}
