//! SQLite implementation of the durable mirror.
//!
//! # Responsibility
//! - Open and migrate the mirror file before any data access.
//! - Map the key-value contract onto one `kv_entries` table.
//!
//! # Invariants
//! - Schema version is tracked via `PRAGMA user_version`.
//! - Values pass through verbatim; JSON stays the callers' concern.
//! - Concurrent writers are serialized by SQLite; the last write wins and
//!   no merge is attempted.

use super::{StorageBackend, StorageError, StorageResult};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: "CREATE TABLE kv_entries (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );",
}];

/// Returns the latest mirror schema version known by this binary.
pub fn latest_schema_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Durable key-value mirror in a single SQLite file.
#[derive(Debug)]
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) a mirror file and applies pending migrations.
    ///
    /// # Side effects
    /// - Emits `mirror_open` logging events with duration and status.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        let started_at = Instant::now();
        info!("event=mirror_open module=storage status=start mode=file");

        let outcome = Connection::open(path)
            .map_err(StorageError::from)
            .and_then(Self::bootstrap);
        finish_open("file", started_at, outcome)
    }

    /// Opens a private in-memory mirror; contents vanish on drop.
    pub fn open_in_memory() -> StorageResult<Self> {
        let started_at = Instant::now();
        info!("event=mirror_open module=storage status=start mode=memory");

        let outcome = Connection::open_in_memory()
            .map_err(StorageError::from)
            .and_then(Self::bootstrap);
        finish_open("memory", started_at, outcome)
    }

    fn bootstrap(mut conn: Connection) -> StorageResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        apply_migrations(&mut conn)?;
        Ok(Self { conn })
    }
}

impl StorageBackend for SqliteStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

fn finish_open(
    mode: &str,
    started_at: Instant,
    outcome: StorageResult<SqliteStorage>,
) -> StorageResult<SqliteStorage> {
    match &outcome {
        Ok(_) => info!(
            "event=mirror_open module=storage status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=mirror_open module=storage status=error mode={mode} duration_ms={} error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    outcome
}

fn apply_migrations(conn: &mut Connection) -> StorageResult<()> {
    let current = current_schema_version(conn)?;
    let latest = latest_schema_version();

    if current > latest {
        return Err(StorageError::UnsupportedSchemaVersion {
            found: current,
            latest_supported: latest,
        });
    }
    if current == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

fn current_schema_version(conn: &Connection) -> StorageResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
