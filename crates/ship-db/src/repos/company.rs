//! Company repository.

use ship_core::entities::Company;

use crate::error::DatabaseError;
use crate::service::ShipService;

fn row_to_company(row: &libsql::Row) -> Result<Company, DatabaseError> {
    Ok(Company {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
    })
}

impl ShipService {
    /// Every company, ordered by name then id.
    pub async fn list_companies(&self) -> Result<Vec<Company>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, name FROM companies ORDER BY name, id", ())
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_company(&row)?);
        }
        Ok(results)
    }

    pub async fn get_company(&self, id: &str) -> Result<Option<Company>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query("SELECT id, name FROM companies WHERE id = ?1", [id])
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_company(&row)?)),
            None => Ok(None),
        }
    }
}
