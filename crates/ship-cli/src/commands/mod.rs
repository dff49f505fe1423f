pub mod companies;
pub mod dispatch;
pub mod history;
pub mod import;
pub mod preview;
pub mod schema;
pub mod serve;
pub mod shipments;

use std::path::Path;

use anyhow::Context;
use ship_core::batch::Batch;

/// Read and validate an invoice file.
pub fn read_batch(path: &Path) -> anyhow::Result<Batch> {
    let raw = std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let batch = ship_schema::validate(&raw)?;
    Ok(batch)
}
