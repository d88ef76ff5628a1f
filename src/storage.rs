//! Persistence for submitted observations.
//!
//! The pipeline only sees [`ObservationStore`]. The shipped backend keeps
//! every record in a single `SQLite` file under the storage root:
//!
//! ```text
//! <root>/
//!   observations.sqlite   # one row per submitted observation
//!   permission            # recorded location permission
//! ```

mod observation;

use std::path::PathBuf;
use std::{fs, io};

use rusqlite::{Connection, ErrorCode};

use crate::model::{PersistedObservation, Record};

/// Errors a store can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("write rejected: {0}")]
    WriteRejected(String),

    #[error("store unreachable: {0}")]
    Unreachable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if matches!(
            e,
            rusqlite::Error::FromSqlConversionFailure(..)
                | rusqlite::Error::IntegralValueOutOfRange(..)
                | rusqlite::Error::InvalidColumnType(..)
        ) {
            return Self::Corrupt(e.to_string());
        }
        match e.sqlite_error_code() {
            Some(
                ErrorCode::CannotOpen
                | ErrorCode::NotADatabase
                | ErrorCode::DatabaseBusy
                | ErrorCode::DatabaseLocked
                | ErrorCode::SystemIoFailure
                | ErrorCode::PermissionDenied,
            ) => Self::Unreachable(e.to_string()),
            _ => Self::WriteRejected(e.to_string()),
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        Self::Unreachable(e.to_string())
    }
}

pub type Result<T> = core::result::Result<T, StoreError>;

/// Persists complete observations and lists what has been persisted.
pub trait ObservationStore {
    /// Persists a record and returns it with its store-assigned id.
    fn create(&mut self, record: &Record) -> Result<PersistedObservation>;

    /// Every persisted record, in no particular order.
    fn list_all(&self) -> Result<Vec<PersistedObservation>>;
}

/// Local `SQLite`-backed store.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Path of the recorded location permission.
    pub fn permission_path(&self) -> PathBuf {
        self.root.join("permission")
    }

    fn db_path(&self) -> PathBuf {
        self.root.join("observations.sqlite")
    }

    /// Opens the database, creating the schema on first use.
    fn open_db(&self) -> Result<Connection> {
        let conn = Connection::open(self.db_path())?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS observation (
                id           TEXT PRIMARY KEY,
                network_id   TEXT NOT NULL,
                signal_level INTEGER NOT NULL,
                lat          REAL NOT NULL,
                lon          REAL NOT NULL,
                captured_at  TEXT NOT NULL
            );",
        )?;
        Ok(conn)
    }
}
