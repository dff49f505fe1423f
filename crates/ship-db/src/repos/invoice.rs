//! Invoice repository: single lookups and per-shipment price history.

use ship_core::entities::Invoice;
use ship_core::responses::InvoiceView;

use crate::error::DatabaseError;
use crate::helpers::parse_datetime;
use crate::service::ShipService;

fn row_to_invoice(row: &libsql::Row) -> Result<Invoice, DatabaseError> {
    Ok(Invoice {
        id: row.get::<String>(0)?,
        shipment_id: row.get::<String>(1)?,
        invoiced_weight: row.get::<f64>(2)?,
        invoiced_price: row.get::<f64>(3)?,
        uploaded_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

fn row_to_view(row: &libsql::Row) -> Result<InvoiceView, DatabaseError> {
    Ok(InvoiceView {
        id: row.get::<String>(0)?,
        invoiced_price: row.get::<f64>(1)?,
        invoiced_weight: row.get::<f64>(2)?,
        uploaded_at: parse_datetime(&row.get::<String>(3)?)?,
    })
}

impl ShipService {
    pub async fn get_invoice(&self, id: &str) -> Result<Option<Invoice>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, shipment_id, invoiced_weight, invoiced_price, uploaded_at
                 FROM invoices WHERE id = ?1",
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_invoice(&row)?)),
            None => Ok(None),
        }
    }

    /// Every invoice of a shipment, newest upload first.
    ///
    /// Invoices sharing an upload instant come back in insertion order.
    /// Unknown shipments yield an empty list.
    pub async fn get_history(&self, shipment_id: &str) -> Result<Vec<InvoiceView>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, invoiced_price, invoiced_weight, uploaded_at
                 FROM invoices WHERE shipment_id = ?1
                 ORDER BY uploaded_at DESC, rowid ASC",
                [shipment_id],
            )
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_view(&row)?);
        }
        Ok(results)
    }
}
