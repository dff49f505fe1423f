//! # ship-db
//!
//! libSQL storage for Shipdesk: companies, shipments, and the invoices
//! uploaded against them.
//!
//! [`ShipDb`] owns the database handle and one connection. [`service::ShipService`]
//! layers the reconciliation engine ([`reconcile`]) and the read-side queries
//! ([`repos`]) on top of it.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) in local mode.

pub mod error;
pub mod helpers;
mod migrations;
pub mod reconcile;
pub mod repos;
pub mod service;
#[cfg(test)]
mod test_support;

use std::sync::Arc;
use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;
use tokio::sync::{Mutex, MutexGuard};
use tracing::debug;

/// How long a connection waits on a locked database outside of commits.
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MEMORY_PATH: &str = ":memory:";

/// Database handle plus one open connection.
///
/// The underlying `libsql::Database` is shared, so [`ShipDb::session`] can
/// hand out further connections to the same file.
pub struct ShipDb {
    db: Arc<libsql::Database>,
    conn: libsql::Connection,
    in_memory: bool,
    /// Serializes transactions on the connection shared by `:memory:` sessions.
    shared_writes: Option<Arc<Mutex<()>>>,
}

impl ShipDb {
    /// Open a local database at the given path, or `":memory:"` for tests.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        let in_memory = path == MEMORY_PATH;

        configure(&conn, in_memory).await?;

        let ship_db = Self {
            db: Arc::new(db),
            conn,
            in_memory,
            shared_writes: in_memory.then(|| Arc::new(Mutex::new(()))),
        };
        ship_db.run_migrations().await?;
        debug!(path, "database opened");
        Ok(ship_db)
    }

    /// Open a further connection to the same database.
    ///
    /// Every `:memory:` connection would be a separate empty database, so
    /// in-memory handles share their single connection instead. Commits on
    /// such sessions take turns through [`ShipDb::write_gate`], and a read
    /// issued while another session is mid-commit sees its uncommitted rows.
    /// Use a file path for anything that serves concurrent clients.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be opened.
    pub async fn session(&self) -> Result<Self, DatabaseError> {
        let conn = if self.in_memory {
            self.conn.clone()
        } else {
            let conn = self.db.connect()?;
            configure(&conn, false).await?;
            conn
        };
        Ok(Self {
            db: Arc::clone(&self.db),
            conn,
            in_memory: self.in_memory,
            shared_writes: self.shared_writes.clone(),
        })
    }

    /// Exclusive turn at opening a transaction on a shared `:memory:`
    /// connection. File databases rely on SQLite locking and get `None`.
    pub async fn write_gate(&self) -> Option<MutexGuard<'_, ()>> {
        match &self.shared_writes {
            Some(gate) => Some(gate.lock().await),
            None => None,
        }
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Whether this handle points at a `:memory:` database.
    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// Set how long statements on this connection wait for a lock.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the pragma fails.
    pub async fn set_busy_timeout(&self, timeout: Duration) -> Result<(), DatabaseError> {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        pragma(&self.conn, &format!("PRAGMA busy_timeout = {millis}")).await?;
        Ok(())
    }
}

/// Run a pragma that reports its new value as a row.
async fn pragma(conn: &libsql::Connection, sql: &str) -> Result<(), libsql::Error> {
    let mut rows = conn.query(sql, ()).await?;
    rows.next().await?;
    Ok(())
}

/// Per-connection pragmas.
async fn configure(conn: &libsql::Connection, in_memory: bool) -> Result<(), DatabaseError> {
    // Foreign keys must be enabled per connection in SQLite
    conn.execute("PRAGMA foreign_keys = ON", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

    let millis = DEFAULT_BUSY_TIMEOUT.as_millis();
    pragma(conn, &format!("PRAGMA busy_timeout = {millis}"))
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA busy_timeout: {e}")))?;

    if !in_memory {
        pragma(conn, "PRAGMA journal_mode = WAL")
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA journal_mode: {e}")))?;
    }
    Ok(())
}
