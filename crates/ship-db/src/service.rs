//! Service layer wrapping `ShipDb` with the ingestion ceilings.
//!
//! The reconciliation engine and every read-side query are implemented as
//! `impl ShipService` blocks in [`crate::reconcile`] and [`crate::repos`].

use crate::ShipDb;
use crate::error::DatabaseError;
use crate::reconcile::CommitOptions;

/// Database handle plus the lock and transaction ceilings used by commits.
pub struct ShipService {
    db: ShipDb,
    options: CommitOptions,
}

impl ShipService {
    /// Open a local database and wrap it.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `options` - Commit ceilings, usually built from `IngestConfig`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn new_local(db_path: &str, options: CommitOptions) -> Result<Self, DatabaseError> {
        let db = ShipDb::open_local(db_path).await?;
        Ok(Self { db, options })
    }

    /// Create from an existing `ShipDb`.
    #[must_use]
    pub const fn from_db(db: ShipDb, options: CommitOptions) -> Self {
        Self { db, options }
    }

    /// A service on a fresh connection to the same database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the connection cannot be opened.
    pub async fn session(&self) -> Result<Self, DatabaseError> {
        Ok(Self {
            db: self.db.session().await?,
            options: self.options,
        })
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &ShipDb {
        &self.db
    }

    /// The commit ceilings this service enforces.
    #[must_use]
    pub const fn options(&self) -> CommitOptions {
        self.options
    }
}
