//! Note collection snapshot contract and implementations.
//!
//! # Responsibility
//! - Persist the full note collection under one key.
//! - Absorb storage errors: log them and fall back to "no saved data".
//!
//! # Invariants
//! - A snapshot payload is the JSON array of the whole collection.
//! - `load` returns an empty list when the key is absent or the payload is
//!   unreadable.

use crate::db::{open_db, open_db_in_memory, DbError, DbResult};
use crate::model::note::Note;
use log::{debug, error, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default key the board snapshot is stored under.
pub const DEFAULT_SNAPSHOT_KEY: &str = "sticky-notes";

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot storage failure, absorbed inside the adapter.
#[derive(Debug)]
pub enum SnapshotError {
    /// Underlying database failure.
    Db(DbError),
    /// Saved payload exists but cannot be parsed.
    Corrupt(String),
    /// Collection could not be encoded.
    Encode(serde_json::Error),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Corrupt(details) => write!(f, "snapshot storage corrupt: {details}"),
            Self::Encode(err) => write!(f, "snapshot encode failed: {err}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Corrupt(_) => None,
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<DbError> for SnapshotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SnapshotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Durable snapshot of the full note collection.
pub trait SnapshotStore: Send + Sync {
    /// Reads the saved collection; empty when absent or corrupt.
    fn load(&self) -> Vec<Note>;
    /// Replaces the saved collection. Failures are logged, not returned.
    fn save(&self, notes: &[Note]);
}

/// SQLite-backed key-value snapshot store.
pub struct SqliteSnapshotStore {
    conn: Mutex<Connection>,
    key: String,
}

impl SqliteSnapshotStore {
    /// Opens (and migrates) the snapshot database at `path`.
    pub fn open(path: impl AsRef<Path>, key: impl Into<String>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?, key))
    }

    /// Opens an in-memory snapshot database.
    pub fn in_memory(key: impl Into<String>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?, key))
    }

    /// Wraps a connection that already has migrations applied.
    pub fn from_connection(conn: Connection, key: impl Into<String>) -> Self {
        Self {
            conn: Mutex::new(conn),
            key: key.into(),
        }
    }

    /// Snapshot key this store reads and writes.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the saved collection, surfacing storage errors.
    pub fn try_load(&self) -> SnapshotResult<Vec<Note>> {
        let conn = self.lock_conn();
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM snapshots WHERE key = ?1;",
                params![self.key],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            None => Ok(Vec::new()),
            Some(payload) => serde_json::from_str::<Vec<Note>>(&payload)
                .map_err(|err| SnapshotError::Corrupt(err.to_string())),
        }
    }

    /// Replaces the saved collection, surfacing storage errors.
    pub fn try_save(&self, notes: &[Note]) -> SnapshotResult<()> {
        let payload = serde_json::to_string(notes).map_err(SnapshotError::Encode)?;
        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO snapshots (key, payload, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at;",
            params![self.key, payload, now_epoch_ms()],
        )?;
        Ok(())
    }

    /// Writes a raw payload under the store key; used to seed fixtures.
    pub fn write_raw_payload(&self, payload: &str) -> SnapshotResult<()> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT OR REPLACE INTO snapshots (key, payload, updated_at) VALUES (?1, ?2, ?3);",
            params![self.key, payload, now_epoch_ms()],
        )?;
        Ok(())
    }

    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self) -> Vec<Note> {
        match self.try_load() {
            Ok(notes) => {
                debug!(
                    "event=snapshot_load module=repo status=ok count={}",
                    notes.len()
                );
                notes
            }
            Err(err @ SnapshotError::Corrupt(_)) => {
                warn!(
                    "event=snapshot_load module=repo status=error error_code=storage_corrupt error={err}"
                );
                Vec::new()
            }
            Err(err) => {
                error!(
                    "event=snapshot_load module=repo status=error error_code=snapshot_read_failed error={err}"
                );
                Vec::new()
            }
        }
    }

    fn save(&self, notes: &[Note]) {
        match self.try_save(notes) {
            Ok(()) => debug!(
                "event=snapshot_save module=repo status=ok count={}",
                notes.len()
            ),
            Err(err) => error!(
                "event=snapshot_save module=repo status=error error_code=snapshot_write_failed error={err}"
            ),
        }
    }
}

/// Process-local snapshot store.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    notes: Mutex<Vec<Note>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with `notes`.
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes: Mutex::new(notes),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self) -> Vec<Note> {
        self.notes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn save(&self, notes: &[Note]) {
        *self
            .notes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = notes.to_vec();
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
