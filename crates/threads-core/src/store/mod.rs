//! SQLite persistence for users, threads and messages.
//!
//! [`Store`] is cheap to clone; every clone shares one connection guarded by a
//! mutex. Table-specific operations live in the `users`, `threads` and
//! `messages` submodules as further `impl Store` blocks.

mod messages;
mod schema;
mod threads;
mod users;

use crate::{Result, ThreadsError};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, types::Type, Connection, Row};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

use schema::MIGRATIONS;

/// Shared handle to the threads database.
#[derive(Clone)]
pub struct Store {
    db_path: Option<PathBuf>,
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) a database file. Call [`Store::migrate`] before use.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ThreadsError::io_with_path(e, parent))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        Self::configure_connection(&conn)?;
        debug!("Opened database at {}", db_path.display());

        Ok(Self {
            db_path: Some(db_path),
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database with the schema already applied.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure_connection(&conn)?;
        let store = Self {
            db_path: None,
            conn: Arc::new(Mutex::new(conn)),
        };
        store.migrate()?;
        Ok(store)
    }

    fn configure_connection(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "
            PRAGMA journal_mode=WAL;
            PRAGMA busy_timeout=30000;
            PRAGMA synchronous=NORMAL;
            PRAGMA foreign_keys=ON;
            ",
        )?;
        Ok(())
    }

    /// Path of the backing file, `None` for in-memory stores.
    pub fn db_path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    pub(crate) fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| ThreadsError::Database {
            message: "Failed to acquire connection lock".to_string(),
            source: None,
        })
    }

    /// Apply pending schema migrations and return the names applied.
    pub fn migrate(&self) -> Result<Vec<String>> {
        let mut conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let tx = conn.transaction()?;
        let mut applied = Vec::new();
        for migration in MIGRATIONS {
            let done: bool = tx.query_row(
                "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE name = ?1)",
                [migration.name],
                |row| row.get(0),
            )?;
            if done {
                continue;
            }

            tx.execute_batch(migration.sql)?;
            tx.execute(
                "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, ?2)",
                params![migration.name, timestamp_to_sql(&Utc::now())],
            )?;
            info!("Applied migration {}", migration.name);
            applied.push(migration.name.to_string());
        }
        tx.commit()?;

        Ok(applied)
    }
}

/// Fixed-width RFC 3339 so that text comparison matches time order.
pub(crate) fn timestamp_to_sql(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn timestamp_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// `?, ?, ?` placeholder list for an `IN (...)` clause.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
