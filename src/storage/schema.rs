//! Database schema definitions and migrations
//!
//! This module contains all SQL schema definitions for the News-Harvest database.

use rusqlite::Connection;

/// Current schema version, stored in `PRAGMA user_version`
pub const SCHEMA_VERSION: i64 = 1;

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Harvested articles
CREATE TABLE IF NOT EXISTS items (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    natural_key TEXT NOT NULL UNIQUE,
    title TEXT NOT NULL,
    link TEXT NOT NULL,
    date TEXT NOT NULL,
    full_text TEXT NOT NULL,
    created_at TEXT NOT NULL
);

-- Language taxonomy; ids are assigned by the application, 1-based
CREATE TABLE IF NOT EXISTS languages (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

-- Item/language join
CREATE TABLE IF NOT EXISTS item_languages (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item_id INTEGER NOT NULL REFERENCES items(id),
    language_id INTEGER NOT NULL REFERENCES languages(id),
    UNIQUE(item_id, language_id)
);

CREATE INDEX IF NOT EXISTS idx_item_languages_item ON item_languages(item_id);
CREATE INDEX IF NOT EXISTS idx_item_languages_language ON item_languages(language_id);

-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    pages_fetched INTEGER NOT NULL DEFAULT 0,
    pages_failed INTEGER NOT NULL DEFAULT 0,
    blocks_seen INTEGER NOT NULL DEFAULT 0,
    items_inserted INTEGER NOT NULL DEFAULT 0,
    duplicates INTEGER NOT NULL DEFAULT 0,
    extraction_failures INTEGER NOT NULL DEFAULT 0,
    transport_failures INTEGER NOT NULL DEFAULT 0
);
"#;

/// Brings the database schema up to `SCHEMA_VERSION`
///
/// Runs once when a store is opened. Safe to call on an already-migrated
/// database.
pub fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if version < SCHEMA_VERSION {
        tracing::debug!("Migrating schema from version {} to {}", version, SCHEMA_VERSION);
        conn.execute_batch(SCHEMA_SQL)?;
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    }

    Ok(())
}
