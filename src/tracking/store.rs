use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, TransactionBehavior, params};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store: {0}")]
    Open(#[source] rusqlite::Error),
    #[error("store query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("store connection poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Append-only record of every tracking number handed out.
///
/// `try_reserve` is the only write path. Implementations must make the
/// existence check and the insert a single atomic step: two concurrent calls
/// with the same code never both return `true`.
pub trait CodeStore: Send + Sync {
    /// Reserves `code`, returning `false` if it was already issued.
    fn try_reserve(&self, code: &str, issued_at: DateTime<Utc>) -> Result<bool>;

    fn contains(&self, code: &str) -> Result<bool>;

    fn count(&self) -> Result<u64>;
}

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS issued_codes (
    code      TEXT PRIMARY KEY NOT NULL,
    issued_at TEXT NOT NULL
)";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// [`CodeStore`] backed by SQLite.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(StoreError::Open)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| {
            row.get::<_, String>(0)
        })
        .map_err(StoreError::Open)?;
        conn.busy_timeout(BUSY_TIMEOUT).map_err(StoreError::Open)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StoreError::Open)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(StoreError::Open)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

impl CodeStore for SqliteStore {
    fn try_reserve(&self, code: &str, issued_at: DateTime<Utc>) -> Result<bool> {
        let mut conn = self.conn()?;
        // IMMEDIATE takes the write lock before the existence check, so no
        // other connection can insert between our SELECT and INSERT.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let exists = tx
            .query_row(
                "SELECT 1 FROM issued_codes WHERE code = ?1",
                params![code],
                |_| Ok(()),
            )
            .optional()?
            .is_some();
        if exists {
            return Ok(false);
        }

        let inserted = tx.execute(
            "INSERT INTO issued_codes (code, issued_at) VALUES (?1, ?2)",
            params![code, issued_at.to_rfc3339_opts(SecondsFormat::Micros, true)],
        );
        match inserted {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == ErrorCode::ConstraintViolation =>
            {
                return Ok(false);
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit()?;
        Ok(true)
    }

    fn contains(&self, code: &str) -> Result<bool> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT 1 FROM issued_codes WHERE code = ?1",
                params![code],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn count(&self) -> Result<u64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM issued_codes", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
