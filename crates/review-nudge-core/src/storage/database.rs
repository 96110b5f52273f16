//! SQLite-backed key-value store.
//!
//! A single `kv` table holds every persisted prompt field as text, so the
//! counters and dates survive process restarts.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

use super::{data_dir, parse_counter, KeyValueStore, StoreResult};
use crate::error::StorageError;

/// SQLite database for prompt state.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open the database at `<data_dir>/review-nudge.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory or database cannot be opened.
    pub fn open() -> StoreResult<Self> {
        let dir = data_dir().map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        Self::open_at(dir.join("review-nudge.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let conn = self.conn.lock()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let conn = self.conn.lock()?;
        conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Read and upsert inside one immediate transaction, so the
    /// read-modify-write is atomic even across connections to the same file.
    /// Anything other than plain digits restarts the counter at 1.
    fn increment(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let previous: Option<String> = tx
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        if let Some(raw) = previous.as_deref().filter(|raw| parse_counter(raw).is_none()) {
            tracing::warn!(key, value = %raw, "resetting unparsable counter");
        }

        let value: Value = tx.query_row(
            "INSERT INTO kv (key, value) VALUES (?1, '1')
             ON CONFLICT(key) DO UPDATE SET value =
                CASE WHEN trim(value) GLOB '[0-9]*' AND trim(value) NOT GLOB '*[^0-9]*'
                     THEN CAST(trim(value) AS INTEGER) + 1
                     ELSE 1
                END
             RETURNING value",
            params![key],
            |row| row.get(0),
        )?;
        tx.commit()?;

        match value {
            Value::Integer(n) if n >= 0 => Ok(n as u64),
            Value::Text(text) => text.parse::<u64>().map_err(|e| {
                StorageError::QueryFailed(format!("counter '{key}' is not an integer: {e}"))
            }),
            other => Err(StorageError::QueryFailed(format!(
                "counter '{key}' has unexpected value {other:?}"
            ))),
        }
    }
}
