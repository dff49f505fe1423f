//! Typed invoice batches and the batch normalizer.
//!
//! A [`Batch`] is the output of validation: an ordered sequence of invoice
//! records, each embedding its shipment and company. Order matters twice
//! downstream: it is the insertion order (history tie-break) and it decides
//! which invoice becomes a shipment's latest ("last in batch wins").
//!
//! [`Batch::normalize`] derives the distinct companies and shipments a batch
//! references, which is what the reconciliation engine inserts.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Company;
use crate::enums::{Mode, Provider};

/// Shipment sub-record embedded in an uploaded invoice.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentRecord {
    pub id: String,
    /// Accepts RFC 3339, naive date-times and bare dates; always emitted as RFC 3339.
    #[serde(deserialize_with = "crate::dates::deserialize_lenient")]
    #[schemars(with = "String")]
    pub created_at: DateTime<Utc>,
    pub tracking_number: String,
    pub company: Company,
    pub provider: Provider,
    pub mode: Mode,
    #[schemars(length(min = 2, max = 2))]
    pub origin_country: String,
    #[schemars(length(min = 2, max = 2))]
    pub destination_country: String,
}

/// One uploaded invoice line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    pub id: String,
    pub shipment: ShipmentRecord,
    #[schemars(range(min = 0))]
    pub invoiced_weight: f64,
    #[schemars(range(min = 0))]
    pub invoiced_price: f64,
}

/// A validated, ordered invoice batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(transparent)]
pub struct Batch {
    invoices: Vec<InvoiceRecord>,
}

/// Distinct entities referenced by a batch, in first-occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized<'a> {
    pub companies: Vec<&'a Company>,
    pub shipments: Vec<&'a ShipmentRecord>,
}

impl Batch {
    #[must_use]
    pub const fn new(invoices: Vec<InvoiceRecord>) -> Self {
        Self { invoices }
    }

    #[must_use]
    pub fn invoices(&self) -> &[InvoiceRecord] {
        &self.invoices
    }

    #[must_use]
    pub fn into_invoices(self) -> Vec<InvoiceRecord> {
        self.invoices
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.invoices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.invoices.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, InvoiceRecord> {
        self.invoices.iter()
    }

    /// Derive the distinct companies and shipments this batch references.
    ///
    /// Both sets are keyed by id. When the same id appears with different
    /// details (e.g. a renamed company), the first occurrence wins.
    #[must_use]
    pub fn normalize(&self) -> Normalized<'_> {
        let mut seen_companies = HashSet::new();
        let mut seen_shipments = HashSet::new();
        let mut companies = Vec::new();
        let mut shipments = Vec::new();

        for invoice in &self.invoices {
            let shipment = &invoice.shipment;
            if seen_companies.insert(shipment.company.id.as_str()) {
                companies.push(&shipment.company);
            }
            if seen_shipments.insert(shipment.id.as_str()) {
                shipments.push(shipment);
            }
        }

        Normalized {
            companies,
            shipments,
        }
    }
}

impl From<Vec<InvoiceRecord>> for Batch {
    fn from(invoices: Vec<InvoiceRecord>) -> Self {
        Self::new(invoices)
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a InvoiceRecord;
    type IntoIter = std::slice::Iter<'a, InvoiceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.invoices.iter()
    }
}

impl Normalized<'_> {
    #[must_use]
    pub fn company_ids(&self) -> Vec<&str> {
        self.companies.iter().map(|c| c.id.as_str()).collect()
    }

    #[must_use]
    pub fn shipment_ids(&self) -> Vec<&str> {
        self.shipments.iter().map(|s| s.id.as_str()).collect()
    }
}
