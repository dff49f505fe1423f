//! Reconciliation engine: commit one validated batch atomically.
//!
//! Inside a single `BEGIN IMMEDIATE` transaction:
//! 1. snapshot which referenced company and shipment ids already exist
//! 2. insert absent companies
//! 3. insert absent shipments (no latest invoice yet)
//! 4. insert invoices, skipping ids already ingested
//! 5. repoint each invoice's shipment to it, in batch order
//! 6. count invoices whose shipment predates the batch
//!
//! Any failure, or running past the transaction ceiling, rolls the whole
//! batch back. Inserts use
//! `ON CONFLICT(id) DO NOTHING` so CHECK and foreign-key violations still
//! abort the transaction.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use libsql::{Connection, TransactionBehavior};
use ship_config::IngestConfig;
use ship_core::batch::{Batch, InvoiceRecord, ShipmentRecord};
use ship_core::entities::Company;
use ship_core::responses::UploadStats;
use tracing::{debug, info, warn};

use crate::error::CommitError;
use crate::helpers::{placeholders, to_storage};
use crate::service::ShipService;

const STAGE_LOCK: &str = "waiting for the write lock";
const STAGE_WRITE: &str = "writing the batch";
const STAGE_COMMIT: &str = "committing";

/// Upper bound on ids per `IN (...)` lookup.
const LOOKUP_CHUNK: usize = 500;

/// Ceilings for one commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitOptions {
    /// Longest wait for the database write lock.
    pub lock_wait: Duration,
    /// Longest time from the start of the commit to its end.
    pub transaction_timeout: Duration,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self::from(&IngestConfig::default())
    }
}

impl From<&IngestConfig> for CommitOptions {
    fn from(config: &IngestConfig) -> Self {
        Self {
            lock_wait: config.lock_wait(),
            transaction_timeout: config.transaction_timeout(),
        }
    }
}

impl ShipService {
    /// Commit a batch, stamping every invoice with the current instant.
    ///
    /// # Errors
    ///
    /// See [`Self::commit_at`].
    pub async fn commit(&self, batch: &Batch) -> Result<UploadStats, CommitError> {
        self.commit_at(batch, Utc::now()).await
    }

    /// Commit a batch with an explicit `uploaded_at` for every invoice.
    ///
    /// # Errors
    ///
    /// - `CommitError::EmptyInput` for an empty batch (storage is not touched)
    /// - `CommitError::Timeout` if the write lock or the whole commit exceeds
    ///   its ceiling
    /// - `CommitError::ConstraintViolation` if a row breaks a table constraint
    /// - `CommitError::StorageUnavailable` for any other storage failure
    pub async fn commit_at(
        &self,
        batch: &Batch,
        uploaded_at: DateTime<Utc>,
    ) -> Result<UploadStats, CommitError> {
        if batch.is_empty() {
            return Err(CommitError::EmptyInput);
        }

        let CommitOptions {
            lock_wait,
            transaction_timeout,
        } = self.options();
        let deadline = Deadline::start(transaction_timeout);

        // The busy handler bounds the wait for BEGIN IMMEDIATE.
        self.db()
            .set_busy_timeout(lock_wait)
            .await
            .map_err(|e| CommitError::from_database(e, STAGE_LOCK, lock_wait))?;
        let _gate = self.db().write_gate().await;

        let tx = self
            .db()
            .conn()
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await
            .map_err(|e| CommitError::classify(&e, STAGE_LOCK, lock_wait))?;
        debug!(
            waited_ms = deadline.elapsed().as_millis(),
            "write lock acquired"
        );

        let stats = match apply(&tx, batch, uploaded_at, &deadline).await {
            Ok(stats) => stats,
            Err(e) => {
                rollback(tx).await;
                return Err(e);
            }
        };

        if let Err(e) = deadline.check(STAGE_COMMIT) {
            rollback(tx).await;
            return Err(e);
        }
        tx.commit()
            .await
            .map_err(|e| CommitError::classify(&e, STAGE_COMMIT, transaction_timeout))?;

        info!(
            invoices = batch.len(),
            companies_created = stats.companies_created,
            shipments_created = stats.shipments_created,
            shipments_updated = stats.shipments_updated,
            invoices_created = stats.invoices_created,
            elapsed_ms = deadline.elapsed().as_millis(),
            "batch committed"
        );
        Ok(stats)
    }
}

/// Wall-clock budget for one commit, measured from its start.
///
/// Checked between statements: a local statement cannot be interrupted once
/// it is running.
struct Deadline {
    started: Instant,
    limit: Duration,
}

impl Deadline {
    fn start(limit: Duration) -> Self {
        Self {
            started: Instant::now(),
            limit,
        }
    }

    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    fn check(&self, stage: &'static str) -> Result<(), CommitError> {
        if self.started.elapsed() > self.limit {
            return Err(CommitError::Timeout {
                stage,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

async fn rollback(tx: libsql::Transaction) {
    if let Err(e) = tx.rollback().await {
        warn!(error = %e, "rollback failed");
    }
}

/// Steps 1-6 on an open transaction.
async fn apply(
    conn: &Connection,
    batch: &Batch,
    uploaded_at: DateTime<Utc>,
    deadline: &Deadline,
) -> Result<UploadStats, CommitError> {
    let fail = |e: libsql::Error| CommitError::classify(&e, STAGE_WRITE, deadline.limit);
    deadline.check(STAGE_WRITE)?;
    let normalized = batch.normalize();

    let known_companies = existing_ids(conn, "companies", &normalized.company_ids())
        .await
        .map_err(fail)?;
    let known_shipments = existing_ids(conn, "shipments", &normalized.shipment_ids())
        .await
        .map_err(fail)?;

    let mut stats = UploadStats::default();

    for company in normalized
        .companies
        .iter()
        .filter(|c| !known_companies.contains(c.id.as_str()))
    {
        deadline.check(STAGE_WRITE)?;
        stats.companies_created += insert_company(conn, company).await.map_err(fail)?;
    }

    for shipment in normalized
        .shipments
        .iter()
        .filter(|s| !known_shipments.contains(s.id.as_str()))
    {
        deadline.check(STAGE_WRITE)?;
        stats.shipments_created += insert_shipment(conn, shipment).await.map_err(fail)?;
    }
    debug!(
        companies_created = stats.companies_created,
        shipments_created = stats.shipments_created,
        "parents inserted"
    );

    let stamp = to_storage(&uploaded_at);
    for record in batch {
        deadline.check(STAGE_WRITE)?;
        stats.invoices_created += insert_invoice(conn, record, &stamp).await.map_err(fail)?;
    }
    debug!(invoices_created = stats.invoices_created, "invoices inserted");

    for record in batch {
        deadline.check(STAGE_WRITE)?;
        if known_shipments.contains(record.shipment.id.as_str()) {
            stats.shipments_updated += 1;
        }
        let repointed = repoint_latest(conn, record).await.map_err(fail)?;
        if repointed == 0 {
            warn!(
                invoice = %record.id,
                shipment = %record.shipment.id,
                "invoice id already belongs to another shipment; latest pointer unchanged"
            );
        }
    }

    Ok(stats)
}

/// Which of `ids` already exist in `table`.
async fn existing_ids(
    conn: &Connection,
    table: &'static str,
    ids: &[&str],
) -> Result<HashSet<String>, libsql::Error> {
    let mut found = HashSet::new();
    for chunk in ids.chunks(LOOKUP_CHUNK) {
        let sql = format!(
            "SELECT id FROM {table} WHERE id IN ({})",
            placeholders(chunk.len())
        );
        let params: Vec<&str> = chunk.to_vec();
        let mut rows = conn.query(&sql, params).await?;
        while let Some(row) = rows.next().await? {
            found.insert(row.get::<String>(0)?);
        }
    }
    Ok(found)
}

async fn insert_company(conn: &Connection, company: &Company) -> Result<u64, libsql::Error> {
    conn.execute(
        "INSERT INTO companies (id, name) VALUES (?1, ?2)
         ON CONFLICT(id) DO NOTHING",
        libsql::params![company.id.as_str(), company.name.as_str()],
    )
    .await
}

async fn insert_shipment(
    conn: &Connection,
    shipment: &ShipmentRecord,
) -> Result<u64, libsql::Error> {
    conn.execute(
        "INSERT INTO shipments (id, company_id, tracking_number, provider, mode,
            origin_country, destination_country, created_date, latest_invoice_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, NULL)
         ON CONFLICT(id) DO NOTHING",
        libsql::params![
            shipment.id.as_str(),
            shipment.company.id.as_str(),
            shipment.tracking_number.as_str(),
            shipment.provider.as_str(),
            shipment.mode.as_str(),
            shipment.origin_country.as_str(),
            shipment.destination_country.as_str(),
            to_storage(&shipment.created_at)
        ],
    )
    .await
}

async fn insert_invoice(
    conn: &Connection,
    record: &InvoiceRecord,
    uploaded_at: &str,
) -> Result<u64, libsql::Error> {
    conn.execute(
        "INSERT INTO invoices (id, shipment_id, invoiced_weight, invoiced_price, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(id) DO NOTHING",
        libsql::params![
            record.id.as_str(),
            record.shipment.id.as_str(),
            record.invoiced_weight,
            record.invoiced_price,
            uploaded_at
        ],
    )
    .await
}

/// Point the shipment at this invoice, provided the stored invoice row
/// belongs to it.
async fn repoint_latest(conn: &Connection, record: &InvoiceRecord) -> Result<u64, libsql::Error> {
    conn.execute(
        "UPDATE shipments SET latest_invoice_id = ?1
         WHERE id = ?2
           AND EXISTS (SELECT 1 FROM invoices WHERE id = ?1 AND shipment_id = ?2)",
        libsql::params![record.id.as_str(), record.shipment.id.as_str()],
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{count, invoice, test_service};
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn empty_batch_is_rejected_before_storage() {
        let svc = test_service().await;
        let err = svc.commit(&Batch::default()).await.unwrap_err();
        assert!(matches!(err, CommitError::EmptyInput));
        assert_eq!(count(&svc, "companies").await, 0);
    }

    #[tokio::test]
    async fn single_invoice_creates_everything() {
        let svc = test_service().await;
        let batch = Batch::new(vec![invoice("inv1", "sh1", "c1", 250.0)]);

        let stats = svc.commit_at(&batch, at(1)).await.unwrap();
        assert_eq!(
            stats,
            UploadStats {
                companies_created: 1,
                shipments_created: 1,
                shipments_updated: 0,
                invoices_created: 1,
            }
        );
        assert_eq!(count(&svc, "invoices").await, 1);
    }

    #[tokio::test]
    async fn duplicate_parents_in_batch_are_created_once() {
        let svc = test_service().await;
        let batch = Batch::new(vec![
            invoice("inv1", "sh1", "c1", 10.0),
            invoice("inv2", "sh1", "c1", 20.0),
            invoice("inv3", "sh2", "c1", 30.0),
        ]);

        let stats = svc.commit_at(&batch, at(1)).await.unwrap();
        assert_eq!(stats.companies_created, 1);
        assert_eq!(stats.shipments_created, 2);
        assert_eq!(stats.shipments_updated, 0);
        assert_eq!(stats.invoices_created, 3);
    }

    #[tokio::test]
    async fn known_shipment_counts_as_updated_per_invoice() {
        let svc = test_service().await;
        svc.commit_at(&Batch::new(vec![invoice("inv1", "sh1", "c1", 10.0)]), at(1))
            .await
            .unwrap();

        let second = Batch::new(vec![
            invoice("inv2", "sh1", "c1", 20.0),
            invoice("inv3", "sh1", "c1", 30.0),
        ]);
        let stats = svc.commit_at(&second, at(2)).await.unwrap();
        assert_eq!(stats.companies_created, 0);
        assert_eq!(stats.shipments_created, 0);
        assert_eq!(stats.shipments_updated, 2);
        assert_eq!(stats.invoices_created, 2);
    }

    #[tokio::test]
    async fn last_invoice_in_batch_wins() {
        let svc = test_service().await;
        let batch = Batch::new(vec![
            invoice("inv-b", "sh1", "c1", 20.0),
            invoice("inv-a", "sh1", "c1", 10.0),
        ]);
        svc.commit_at(&batch, at(1)).await.unwrap();

        let shipment = svc.get_shipment("sh1").await.unwrap().unwrap();
        assert_eq!(shipment.latest_invoice_id.as_deref(), Some("inv-a"));
    }

    #[tokio::test]
    async fn foreign_invoice_id_does_not_repoint() {
        let svc = test_service().await;
        svc.commit_at(&Batch::new(vec![invoice("inv1", "sh1", "c1", 10.0)]), at(1))
            .await
            .unwrap();

        // Same invoice id resubmitted under a different shipment
        let stats = svc
            .commit_at(&Batch::new(vec![invoice("inv1", "sh2", "c1", 10.0)]), at(2))
            .await
            .unwrap();
        assert_eq!(stats.shipments_created, 1);
        assert_eq!(stats.invoices_created, 0);

        let sh2 = svc.get_shipment("sh2").await.unwrap().unwrap();
        assert_eq!(sh2.latest_invoice_id, None);
        let sh1 = svc.get_shipment("sh1").await.unwrap().unwrap();
        assert_eq!(sh1.latest_invoice_id.as_deref(), Some("inv1"));
    }

    #[tokio::test]
    async fn check_violation_rolls_back() {
        let svc = test_service().await;
        let batch = Batch::new(vec![
            invoice("inv1", "sh1", "c1", 10.0),
            invoice("inv2", "sh1", "c1", -1.0),
        ]);

        let err = svc.commit_at(&batch, at(1)).await.unwrap_err();
        assert!(
            matches!(err, CommitError::ConstraintViolation(_)),
            "got {err:?}"
        );
        assert_eq!(count(&svc, "companies").await, 0);
        assert_eq!(count(&svc, "shipments").await, 0);
        assert_eq!(count(&svc, "invoices").await, 0);
    }

    #[tokio::test]
    async fn connection_is_reusable_after_rollback() {
        let svc = test_service().await;
        let bad = Batch::new(vec![invoice("inv1", "sh1", "c1", -5.0)]);
        assert!(svc.commit_at(&bad, at(1)).await.is_err());

        let good = Batch::new(vec![invoice("inv1", "sh1", "c1", 5.0)]);
        let stats = svc.commit_at(&good, at(1)).await.unwrap();
        assert_eq!(stats.invoices_created, 1);
    }

    #[tokio::test]
    async fn uploaded_at_is_shared_by_the_batch() {
        let svc = test_service().await;
        let batch = Batch::new(vec![
            invoice("inv1", "sh1", "c1", 10.0),
            invoice("inv2", "sh2", "c1", 20.0),
        ]);
        svc.commit_at(&batch, at(3)).await.unwrap();

        for id in ["inv1", "inv2"] {
            let stored = svc.get_invoice(id).await.unwrap().unwrap();
            assert_eq!(stored.uploaded_at, at(3));
        }
    }

    #[test]
    fn deadline_reports_stage_once_exceeded() {
        assert!(Deadline::start(Duration::from_secs(60)).check(STAGE_WRITE).is_ok());

        let spent = Deadline::start(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(2));
        let err = spent.check(STAGE_COMMIT).unwrap_err();
        assert!(matches!(
            err,
            CommitError::Timeout { stage: STAGE_COMMIT, limit } if limit == Duration::ZERO
        ));
    }

    #[tokio::test]
    async fn exceeded_transaction_ceiling_rolls_back() {
        let options = CommitOptions {
            lock_wait: Duration::from_secs(10),
            transaction_timeout: Duration::from_nanos(1),
        };
        let svc = ShipService::new_local(":memory:", options).await.unwrap();
        let batch = Batch::new(
            (0..50)
                .map(|i| invoice(&format!("inv{i}"), &format!("sh{i}"), "c1", 1.0))
                .collect(),
        );

        let err = svc.commit_at(&batch, at(1)).await.unwrap_err();
        assert!(matches!(err, CommitError::Timeout { .. }), "got {err:?}");
        assert!(err.is_retryable());
        for table in ["companies", "shipments", "invoices"] {
            assert_eq!(count(&svc, table).await, 0, "{table} should be empty");
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn memory_sessions_commit_in_turn() {
        let svc = test_service().await;
        let mut tasks = Vec::new();
        for n in 0..8 {
            let session = svc.session().await.unwrap();
            tasks.push(tokio::spawn(async move {
                let batch = Batch::new(
                    (0..20)
                        .map(|i| invoice(&format!("inv{n}-{i}"), &format!("sh{n}"), "c1", 1.0))
                        .collect(),
                );
                session.commit_at(&batch, at(1)).await
            }));
        }
        for task in tasks {
            let stats = task.await.unwrap().unwrap();
            assert_eq!(stats.invoices_created, 20);
        }
        assert_eq!(count(&svc, "shipments").await, 8);
        assert_eq!(count(&svc, "invoices").await, 160);
    }

    #[test]
    fn options_follow_ingest_config() {
        let config = IngestConfig {
            lock_wait_ms: 250,
            transaction_timeout_ms: 1_000,
        };
        let options = CommitOptions::from(&config);
        assert_eq!(options.lock_wait, Duration::from_millis(250));
        assert_eq!(options.transaction_timeout, Duration::from_secs(1));
        assert_eq!(
            CommitOptions::default().lock_wait,
            Duration::from_secs(10)
        );
    }
}
