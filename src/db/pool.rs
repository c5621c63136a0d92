//! SQLite connection wrapper (one connection per CLI invocation or thread).

use crate::errors::AppResult;
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5000;

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> AppResult<Self> {
        Self::with_timeout(path, DEFAULT_BUSY_TIMEOUT_MS)
    }

    /// Open `path` waiting up to `busy_timeout_ms` for locks held by other writers.
    pub fn with_timeout(path: &str, busy_timeout_ms: u64) -> AppResult<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::configure(conn, busy_timeout_ms)
    }

    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(conn, DEFAULT_BUSY_TIMEOUT_MS)
    }

    fn configure(conn: Connection, busy_timeout_ms: u64) -> AppResult<Self> {
        conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    /// Run `func` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so checks made inside `func` still
    /// hold when it writes. Any error rolls the whole transaction back.
    pub fn with_tx<F, T>(&mut self, func: F) -> AppResult<T>
    where
        F: FnOnce(&Transaction<'_>) -> AppResult<T>,
    {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = func(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}
