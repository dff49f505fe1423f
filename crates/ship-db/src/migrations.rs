//! Schema bootstrap for the shipment ledger.
//!
//! The DDL is compiled into the binary and replayed on every open; each
//! statement is guarded with `IF NOT EXISTS` so reopening an existing file is a no-op.

use crate::ShipDb;
use crate::error::DatabaseError;

/// Companies, shipments and invoices plus their lookup indexes.
const MIGRATION_001: &str = include_str!("../migrations/001_initial.sql");

impl ShipDb {
    /// Apply the embedded DDL to the primary connection.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        self.conn
            .execute_batch(MIGRATION_001)
            .await
            .map_err(|e| DatabaseError::Migration(format!("001_initial: {e}")))?;
        Ok(())
    }
}
