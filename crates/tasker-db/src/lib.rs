pub mod models;
pub mod queries;
pub mod schema;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rusqlite::{Connection, TransactionBehavior, ffi};
use tracing::{info, warn};

pub use schema::SchemaStatus;

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Where the database lives and how long a connection waits on a locked file.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    pub busy_timeout: Duration,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }
}

/// Connection factory. Holds no open connection: every call to
/// [`Database::with_conn`] or [`Database::with_tx`] opens its own and closes
/// it before returning, whatever the outcome.
#[derive(Debug, Clone)]
pub struct Database {
    config: DbConfig,
}

impl Database {
    pub fn new(config: DbConfig) -> Result<Self> {
        let db = Self { config };

        // Fail at startup rather than on the first operation
        let conn = db.connect()?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        info!("Database opened at {}", db.path().display());
        Ok(db)
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Create the tables if they are missing.
    pub fn bootstrap(&self) -> Result<SchemaStatus> {
        let status = self.with_tx(schema::bootstrap)?;
        match status {
            SchemaStatus::Created => info!("Database schema created"),
            SchemaStatus::AlreadyPresent => info!("Database schema already present, nothing to create"),
        }
        Ok(status)
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.config.path)
            .with_context(|| format!("failed to open database at {}", self.config.path.display()))?;
        conn.busy_timeout(self.config.busy_timeout)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(conn)
    }

    /// Run `f` on a fresh connection outside any explicit transaction.
    pub fn with_conn<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let conn = self.connect()?;
        f(&conn)
    }

    /// Run `f` inside a write transaction on a fresh connection. Commits when
    /// `f` returns `Ok`, rolls back when it returns `Err`.
    ///
    /// The transaction takes the write lock up front, so a read-then-write
    /// check inside `f` cannot interleave with another writer.
    pub fn with_tx<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(anyhow::Error::from)?;

        let result = f(&tx);
        match result {
            Ok(value) => {
                tx.commit().map_err(anyhow::Error::from)?;
                Ok(value)
            }
            Err(err) => {
                match tx.rollback() {
                    Ok(()) => warn!("Transaction rolled back"),
                    Err(rollback_err) => warn!("Transaction rollback failed: {}", rollback_err),
                }
                Err(err)
            }
        }
    }
}

/// Which table constraint a failed statement tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintViolation {
    Unique,
    ForeignKey,
    Check,
    NotNull,
    Other,
}

/// Classify a database error as a constraint violation, if it is one.
pub fn constraint_violation(err: &anyhow::Error) -> Option<ConstraintViolation> {
    match err.downcast_ref::<rusqlite::Error>()? {
        rusqlite::Error::SqliteFailure(e, _) if e.code == rusqlite::ErrorCode::ConstraintViolation => {
            Some(match e.extended_code {
                ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                    ConstraintViolation::Unique
                }
                ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintViolation::ForeignKey,
                ffi::SQLITE_CONSTRAINT_CHECK => ConstraintViolation::Check,
                ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintViolation::NotNull,
                _ => ConstraintViolation::Other,
            })
        }
        _ => None,
    }
}
