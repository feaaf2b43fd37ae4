//! Shared test utilities for the recsync workspace.
//!
//! Provides throwaway SQLite sources so connector, orchestrator and CLI
//! tests read real files instead of mocks. Dev-dependency only, never
//! published.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A SQLite database file inside its own temporary directory.
///
/// The directory, and with it the database, is removed on drop.
pub struct SqliteSource {
    dir: TempDir,
    path: PathBuf,
}

impl SqliteSource {
    /// Create an empty database file.
    ///
    /// # Panics
    /// Panics if the temp directory or database cannot be created.
    pub fn new() -> Self {
        let dir = TempDir::new()
            .unwrap_or_else(|e| panic!("SqliteSource: failed to create temp dir: {e}"));
        let path = dir.path().join("source.db");
        Connection::open(&path)
            .unwrap_or_else(|e| panic!("SqliteSource: failed to create {}: {e}", path.display()));
        Self { dir, path }
    }

    /// Create a database with an `assets (id TEXT, name TEXT)` table.
    pub fn with_assets(rows: &[(&str, &str)]) -> Self {
        let source = Self::new();
        source.execute_batch("CREATE TABLE assets (id TEXT PRIMARY KEY, name TEXT);");
        for (id, name) in rows {
            source.upsert_asset(id, name);
        }
        source
    }

    /// Path of the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the database; free for other fixture files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Path as a string, the way connection parameters store it.
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    /// Run one or more SQL statements.
    ///
    /// # Panics
    /// Panics if any statement fails.
    pub fn execute_batch(&self, sql: &str) {
        self.connection()
            .execute_batch(sql)
            .unwrap_or_else(|e| panic!("SqliteSource: batch failed: {e}\n{sql}"));
    }

    /// Insert or replace a row of the `assets` table.
    pub fn upsert_asset(&self, id: &str, name: &str) {
        self.connection()
            .execute(
                "INSERT OR REPLACE INTO assets (id, name) VALUES (?1, ?2)",
                [id, name],
            )
            .unwrap_or_else(|e| panic!("SqliteSource: upsert of {id} failed: {e}"));
    }

    fn connection(&self) -> Connection {
        Connection::open(&self.path)
            .unwrap_or_else(|e| panic!("SqliteSource: failed to open {}: {e}", self.path.display()))
    }
}

impl Default for SqliteSource {
    fn default() -> Self {
        Self::new()
    }
}
