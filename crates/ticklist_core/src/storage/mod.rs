//! Key-value storage behind the task and account collections.
//!
//! # Responsibility
//! - Define the backend contract the store and auth layers write through.
//! - Provide the durable SQLite mirror and the in-memory substitute.
//!
//! # Invariants
//! - Keys are flat strings, one per logical collection.
//! - Values are JSON text; backends never interpret them.
//! - A missing key reads as `None`, never as an error.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod memory;
mod sqlite;

pub use memory::MemoryStorage;
pub use sqlite::{latest_schema_version, SqliteStorage};

pub type StorageResult<T> = Result<T, StorageError>;

/// Backend failure surfaced to callers.
///
/// Store mutations degrade these to logged warnings (memory stays
/// authoritative); the auth layer passes them through.
#[derive(Debug)]
pub enum StorageError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        found: u32,
        latest_supported: u32,
    },
    /// Backend cannot serve requests (unavailable, out of quota, ...).
    Unavailable(String),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                found,
                latest_supported,
            } => write!(
                f,
                "mirror schema version {found} is newer than supported {latest_supported}"
            ),
            Self::Unavailable(reason) => write!(f, "storage unavailable: {reason}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::Unavailable(_) => None,
        }
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Contract for the durable mirror.
///
/// The store and auth layers are written against this trait so tests can
/// substitute [`MemoryStorage`] (or a failing double) for the SQLite file.
pub trait StorageBackend {
    /// Reads the value stored under `key`, if any.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Writes `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`. Removing an absent key is a no-op.
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}
