mod group_repo;
mod membership_repo;
mod profile_repo;
mod reminder_repo;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use time::OffsetDateTime;

use crate::domain::error::DomainError;
use crate::domain::repository::Result;

pub type DbConnection = Arc<Mutex<Connection>>;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS groups (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL CHECK (length(trim(name)) > 0),
        description TEXT,
        created_by TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS memberships (
        id TEXT PRIMARY KEY,
        group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
        user_id TEXT NOT NULL,
        email TEXT NOT NULL,
        name TEXT,
        role TEXT NOT NULL CHECK (role IN ('admin', 'member')),
        joined_at INTEGER NOT NULL,
        UNIQUE (group_id, user_id)
    );

    CREATE INDEX IF NOT EXISTS idx_memberships_user ON memberships(user_id);

    CREATE TABLE IF NOT EXISTS group_reminders (
        id TEXT PRIMARY KEY,
        group_id TEXT NOT NULL REFERENCES groups(id) ON DELETE CASCADE,
        title TEXT NOT NULL CHECK (length(trim(title)) > 0),
        why TEXT,
        time TEXT NOT NULL,
        repeat TEXT NOT NULL CHECK (repeat IN ('once', 'daily', 'weekly')),
        active INTEGER NOT NULL DEFAULT 1,
        created_by TEXT NOT NULL,
        created_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_group_reminders_group ON group_reminders(group_id, time);

    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT
    );
";

/// SQLite-backed group store.
///
/// Unlike the hosted store, SQLite gives us transactions, so the group and
/// its admin membership are written atomically.
pub struct SqliteStore {
    conn: DbConnection,
}

impl SqliteStore {
    pub fn new(conn: DbConnection) -> Self {
        Self { conn }
    }

    /// Fresh in-memory database, mainly for tests
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self::new(Arc::new(Mutex::new(conn))))
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DomainError::Database(e.to_string()))
    }
}

/// Initialize the SQLite database
pub fn init_database(db_path: &Path) -> anyhow::Result<DbConnection> {
    // Ensure directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!("Initializing database at {:?}", db_path);

    let conn = Connection::open(db_path)?;
    conn.execute_batch(SCHEMA)?;

    tracing::info!("Database initialized successfully");

    Ok(Arc::new(Mutex::new(conn)))
}

/// `?, ?, ?` with `n` placeholders
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn to_micros(t: OffsetDateTime) -> i64 {
    (t.unix_timestamp_nanos() / 1_000) as i64
}

fn from_micros(idx: usize, micros: i64) -> rusqlite::Result<OffsetDateTime> {
    OffsetDateTime::from_unix_timestamp_nanos(micros as i128 * 1_000)
        .map_err(|e| conversion_error(idx, e))
}

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_micros_round_trip() {
        let now = OffsetDateTime::now_utc();
        let back = from_micros(0, to_micros(now)).unwrap();
        assert!((now - back).whole_microseconds().abs() < 1);
    }

    #[test]
    fn test_init_database_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!("remindly-test-{}", ulid::Ulid::new()));
        let path = dir.join("nested").join("data.db");
        init_database(&path).unwrap();
        assert!(path.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
