//! Shared test utilities for ship-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use chrono::{TimeZone, Utc};
    use ship_core::batch::{InvoiceRecord, ShipmentRecord};
    use ship_core::entities::Company;
    use ship_core::enums::{Mode, Provider};

    use crate::ShipDb;
    use crate::reconcile::CommitOptions;
    use crate::service::ShipService;

    /// Create an in-memory `ShipService` with default ceilings.
    pub async fn test_service() -> ShipService {
        let db = ShipDb::open_local(":memory:").await.unwrap();
        ShipService::from_db(db, CommitOptions::default())
    }

    /// A DPD export invoice for company `company_id` named "Acme".
    pub fn invoice(id: &str, shipment_id: &str, company_id: &str, price: f64) -> InvoiceRecord {
        InvoiceRecord {
            id: id.into(),
            shipment: ShipmentRecord {
                id: shipment_id.into(),
                created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                tracking_number: format!("TRK-{shipment_id}"),
                company: Company {
                    id: company_id.into(),
                    name: "Acme".into(),
                },
                provider: Provider::Dpd,
                mode: Mode::Export,
                origin_country: "CZ".into(),
                destination_country: "DE".into(),
            },
            invoiced_weight: 10.5,
            invoiced_price: price,
        }
    }

    /// Like [`invoice`] with an explicit company name.
    pub fn invoice_for(id: &str, shipment_id: &str, company_id: &str, name: &str) -> InvoiceRecord {
        let mut record = invoice(id, shipment_id, company_id, 100.0);
        record.shipment.company.name = name.into();
        record
    }

    /// Move the shipment's creation date to the first of `year`-`month`.
    pub fn shipment_created(mut record: InvoiceRecord, year: i32, month: u32) -> InvoiceRecord {
        record.shipment.created_at = Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap();
        record
    }

    /// Row count of a table.
    pub async fn count(svc: &ShipService, table: &str) -> i64 {
        let mut rows = svc
            .db()
            .conn()
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await
            .unwrap();
        rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
    }
}
