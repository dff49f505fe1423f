//! Shipment repository: dashboard listing and single lookups.

use ship_core::entities::{Company, Shipment};
use ship_core::responses::{InvoiceView, ShipmentView};

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::ShipService;

/// Shipment joined with its company and nullable latest invoice.
const VIEW_SELECT: &str = "SELECT s.id, s.tracking_number, s.provider, s.mode,
        s.origin_country, s.destination_country, s.created_date,
        c.id, c.name,
        i.id, i.invoiced_price, i.invoiced_weight, i.uploaded_at
     FROM shipments s
     JOIN companies c ON c.id = s.company_id
     LEFT JOIN invoices i ON i.id = s.latest_invoice_id";

fn row_to_shipment(row: &libsql::Row) -> Result<Shipment, DatabaseError> {
    Ok(Shipment {
        id: row.get::<String>(0)?,
        company_id: row.get::<String>(1)?,
        tracking_number: row.get::<String>(2)?,
        provider: parse_enum(&row.get::<String>(3)?)?,
        mode: parse_enum(&row.get::<String>(4)?)?,
        origin_country: row.get::<String>(5)?,
        destination_country: row.get::<String>(6)?,
        created_date: parse_datetime(&row.get::<String>(7)?)?,
        latest_invoice_id: get_opt_string(row, 8)?,
    })
}

fn row_to_view(row: &libsql::Row) -> Result<ShipmentView, DatabaseError> {
    let latest_invoice = match get_opt_string(row, 9)? {
        Some(id) => Some(InvoiceView {
            id,
            invoiced_price: row.get::<f64>(10)?,
            invoiced_weight: row.get::<f64>(11)?,
            uploaded_at: parse_datetime(&row.get::<String>(12)?)?,
        }),
        None => None,
    };

    Ok(ShipmentView {
        id: row.get::<String>(0)?,
        tracking_number: row.get::<String>(1)?,
        provider: parse_enum(&row.get::<String>(2)?)?,
        mode: parse_enum(&row.get::<String>(3)?)?,
        origin_country: row.get::<String>(4)?,
        destination_country: row.get::<String>(5)?,
        created_date: parse_datetime(&row.get::<String>(6)?)?,
        company: Company {
            id: row.get::<String>(7)?,
            name: row.get::<String>(8)?,
        },
        latest_invoice,
    })
}

impl ShipService {
    /// Shipments with company and latest invoice, newest `created_date` first.
    ///
    /// `company_id` narrows the listing to one company.
    pub async fn list_shipments(
        &self,
        company_id: Option<&str>,
    ) -> Result<Vec<ShipmentView>, DatabaseError> {
        let sql = format!(
            "{VIEW_SELECT}
             WHERE (?1 IS NULL OR s.company_id = ?1)
             ORDER BY s.created_date DESC, s.rowid DESC"
        );
        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params![company_id])
            .await?;
        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(row_to_view(&row)?);
        }
        Ok(results)
    }

    /// One shipment as the dashboard shows it.
    pub async fn get_shipment_view(&self, id: &str) -> Result<Option<ShipmentView>, DatabaseError> {
        let sql = format!("{VIEW_SELECT} WHERE s.id = ?1");
        let mut rows = self.db().conn().query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_view(&row)?)),
            None => Ok(None),
        }
    }

    /// The stored shipment row.
    pub async fn get_shipment(&self, id: &str) -> Result<Option<Shipment>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, company_id, tracking_number, provider, mode,
                        origin_country, destination_country, created_date, latest_invoice_id
                 FROM shipments WHERE id = ?1",
                [id],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_shipment(&row)?)),
            None => Ok(None),
        }
    }
}
