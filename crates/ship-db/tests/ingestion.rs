//! End-to-end ingestion against real libSQL databases: validate raw upload
//! bytes, commit, then read back through the query methods.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use ship_core::batch::Batch;
use ship_core::responses::UploadStats;
use ship_db::error::CommitError;
use ship_db::reconcile::CommitOptions;
use ship_db::service::ShipService;

fn item(invoice_id: &str, shipment_id: &str, price: f64) -> Value {
    json!({
        "id": invoice_id,
        "shipment": {
            "id": shipment_id,
            "company": {"id": "c1", "name": "Acme"},
            "provider": "DPD",
            "mode": "EXPORT",
            "originCountry": "CZ",
            "destinationCountry": "DE",
            "createdAt": "2024-01-01",
            "trackingNumber": format!("TRK-{shipment_id}")
        },
        "invoicedWeight": 10.5,
        "invoicedPrice": price
    })
}

fn batch(items: &[Value]) -> Batch {
    let raw = serde_json::to_vec(items).unwrap();
    ship_schema::validate(&raw).expect("test batch should validate")
}

async fn memory_service() -> ShipService {
    ShipService::new_local(":memory:", CommitOptions::default())
        .await
        .unwrap()
}

async fn table_count(svc: &ShipService, table: &str) -> i64 {
    let mut rows = svc
        .db()
        .conn()
        .query(&format!("SELECT COUNT(*) FROM {table}"), ())
        .await
        .unwrap();
    rows.next().await.unwrap().unwrap().get::<i64>(0).unwrap()
}

#[tokio::test]
async fn single_dpd_invoice_scenario() {
    let svc = memory_service().await;
    let stats = svc
        .commit(&batch(&[item("inv1", "sh1", 250.0)]))
        .await
        .unwrap();

    assert_eq!(
        stats,
        UploadStats {
            companies_created: 1,
            shipments_created: 1,
            shipments_updated: 0,
            invoices_created: 1,
        }
    );

    let listing = svc.list_shipments(None).await.unwrap();
    assert_eq!(listing.len(), 1);
    let latest = listing[0].latest_invoice.as_ref().unwrap();
    assert!((latest.invoiced_price - 250.0).abs() < f64::EPSILON);
}

#[tokio::test]
async fn reingesting_a_batch_changes_nothing() {
    let svc = memory_service().await;
    let upload = batch(&[
        item("inv1", "sh1", 100.0),
        item("inv2", "sh2", 200.0),
        item("inv3", "sh1", 300.0),
    ]);

    svc.commit(&upload).await.unwrap();
    let listing_before = svc.list_shipments(None).await.unwrap();
    let history_before = svc.get_history("sh1").await.unwrap();

    let second = svc.commit(&upload).await.unwrap();
    assert_eq!(second.invoices_created, 0);
    assert_eq!(second.companies_created, 0);
    assert_eq!(second.shipments_created, 0);
    assert_eq!(second.shipments_updated, 3);

    assert_eq!(svc.list_shipments(None).await.unwrap(), listing_before);
    assert_eq!(svc.get_history("sh1").await.unwrap(), history_before);
    assert_eq!(table_count(&svc, "invoices").await, 3);
}

#[tokio::test]
async fn latest_pointer_follows_commit_order_not_timestamps() {
    let svc = memory_service().await;
    let later = Utc.with_ymd_and_hms(2024, 6, 2, 0, 0, 0).unwrap();
    let earlier = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    svc.commit_at(&batch(&[item("inv-a", "sh1", 100.0)]), later)
        .await
        .unwrap();
    svc.commit_at(&batch(&[item("inv-b", "sh1", 120.0)]), earlier)
        .await
        .unwrap();

    let view = svc.get_shipment_view("sh1").await.unwrap().unwrap();
    assert_eq!(view.latest_invoice.unwrap().id, "inv-b");

    // History still orders by upload instant
    let history: Vec<String> = svc
        .get_history("sh1")
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(history, vec!["inv-a", "inv-b"]);
}

#[tokio::test]
async fn constraint_failure_on_last_invoice_leaves_no_trace() {
    let svc = memory_service().await;
    let mut items: Vec<Value> = (1..=4)
        .map(|n| item(&format!("inv{n}"), &format!("sh{n}"), 10.0))
        .collect();
    // Bypass the validator so the CHECK constraint is what rejects the row
    let mut poisoned = item("inv5", "sh5", 10.0);
    poisoned["invoicedPrice"] = json!(-10.0);
    items.push(poisoned);
    let upload: Batch = serde_json::from_value(Value::Array(items)).unwrap();

    let err = svc.commit(&upload).await.unwrap_err();
    assert!(matches!(err, CommitError::ConstraintViolation(_)), "got {err:?}");

    assert_eq!(table_count(&svc, "companies").await, 0);
    assert_eq!(table_count(&svc, "shipments").await, 0);
    assert_eq!(table_count(&svc, "invoices").await, 0);
    assert!(svc.list_shipments(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let svc = memory_service().await;
    let err = svc.commit(&batch(&[])).await.unwrap_err();
    assert!(matches!(err, CommitError::EmptyInput));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn held_write_lock_times_out_then_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ship.db");
    let options = CommitOptions {
        lock_wait: Duration::from_millis(150),
        transaction_timeout: Duration::from_secs(5),
    };
    let svc = ShipService::new_local(path.to_str().unwrap(), options)
        .await
        .unwrap();

    let other = svc.session().await.unwrap();
    other
        .db()
        .conn()
        .execute("BEGIN IMMEDIATE", ())
        .await
        .unwrap();

    let upload = batch(&[item("inv1", "sh1", 1.0)]);
    let err = svc.commit(&upload).await.unwrap_err();
    assert!(
        matches!(err, CommitError::Timeout { stage: "waiting for the write lock", .. }),
        "got {err:?}"
    );
    assert!(err.is_retryable());

    other.db().conn().execute("ROLLBACK", ()).await.unwrap();

    let stats = svc.commit(&upload).await.unwrap();
    assert_eq!(stats.invoices_created, 1);
}

#[tokio::test]
async fn batch_past_transaction_ceiling_is_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ship.db");
    let path = path.to_str().unwrap();
    let tight = CommitOptions {
        lock_wait: Duration::from_secs(10),
        transaction_timeout: Duration::from_micros(1),
    };
    let svc = ShipService::new_local(path, tight).await.unwrap();

    let items: Vec<Value> = (0..2000)
        .map(|i| item(&format!("inv{i}"), &format!("sh{}", i % 100), 1.0))
        .collect();
    let upload = batch(&items);

    let err = svc.commit(&upload).await.unwrap_err();
    assert!(
        matches!(err, CommitError::Timeout { limit, .. } if limit == Duration::from_micros(1)),
        "got {err:?}"
    );
    for table in ["companies", "shipments", "invoices"] {
        assert_eq!(table_count(&svc, table).await, 0, "{table} should be empty");
    }

    let relaxed = ShipService::new_local(path, CommitOptions::default())
        .await
        .unwrap();
    let stats = relaxed.commit(&upload).await.unwrap();
    assert_eq!(stats.invoices_created, 2000);
    assert_eq!(stats.shipments_created, 100);
}

#[tokio::test]
async fn file_database_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ship.db");
    let path = path.to_str().unwrap();

    {
        let svc = ShipService::new_local(path, CommitOptions::default())
            .await
            .unwrap();
        svc.commit(&batch(&[item("inv1", "sh1", 42.0)])).await.unwrap();
    }

    let reopened = ShipService::new_local(path, CommitOptions::default())
        .await
        .unwrap();
    let history = reopened.get_history("sh1").await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, "inv1");
}
