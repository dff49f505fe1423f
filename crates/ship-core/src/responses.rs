//! Read-side views and the response envelope returned by every endpoint.
//!
//! Views are what the dashboard renders: shipments joined with their company
//! and latest invoice, and the invoice history of one shipment. Timestamps
//! serialize as ISO-8601 strings.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Company;
use crate::enums::{Mode, Provider};

/// One invoice as shown in a shipment card or the price history.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceView {
    pub id: String,
    pub invoiced_price: f64,
    pub invoiced_weight: f64,
    pub uploaded_at: DateTime<Utc>,
}

/// A shipment joined with its company and (nullable) latest invoice.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShipmentView {
    pub id: String,
    pub tracking_number: String,
    pub provider: Provider,
    pub mode: Mode,
    pub origin_country: String,
    pub destination_country: String,
    pub created_date: DateTime<Utc>,
    pub company: Company,
    pub latest_invoice: Option<InvoiceView>,
}

/// Row counts produced by one committed batch.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadStats {
    pub companies_created: u64,
    pub shipments_created: u64,
    /// Invoices in the batch whose shipment already existed before the commit.
    pub shipments_updated: u64,
    pub invoices_created: u64,
}

/// Response from the confirm endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ConfirmResponse {
    pub success: bool,
    pub message: String,
    pub stats: UploadStats,
}

impl ConfirmResponse {
    #[must_use]
    pub fn committed(stats: UploadStats) -> Self {
        Self {
            success: true,
            message: "Invoices successfully uploaded".to_string(),
            stats,
        }
    }
}

/// Uniform success/error envelope.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn failure_envelope_omits_data() {
        let response: ApiResponse<Vec<InvoiceView>> = ApiResponse::failure("Invalid JSON file");
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Invalid JSON file");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn shipment_view_uses_camel_case_and_iso_dates() {
        let view = ShipmentView {
            id: "sh1".into(),
            tracking_number: "TRK1".into(),
            provider: Provider::Gls,
            mode: Mode::Import,
            origin_country: "DE".into(),
            destination_country: "CZ".into(),
            created_date: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            company: Company {
                id: "c1".into(),
                name: "Acme".into(),
            },
            latest_invoice: None,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["trackingNumber"], "TRK1");
        assert_eq!(json["createdDate"], "2024-05-01T09:00:00Z");
        assert_eq!(json["latestInvoice"], serde_json::Value::Null);
        assert_eq!(json["provider"], "GLS");
    }

    #[test]
    fn confirm_response_carries_stats() {
        let stats = UploadStats {
            companies_created: 1,
            shipments_created: 1,
            shipments_updated: 0,
            invoices_created: 1,
        };
        let json = serde_json::to_value(ConfirmResponse::committed(stats)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["stats"]["companiesCreated"], 1);
        assert_eq!(json["stats"]["shipmentsUpdated"], 0);
    }
}
