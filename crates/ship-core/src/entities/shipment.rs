use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{Mode, Provider};

/// A tracked parcel, as stored.
///
/// `latest_invoice_id`, when set, always names an invoice whose
/// `shipment_id` is this shipment's id.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: String,
    pub company_id: String,
    pub tracking_number: String,
    pub provider: Provider,
    pub mode: Mode,
    pub origin_country: String,
    pub destination_country: String,
    pub created_date: DateTime<Utc>,
    pub latest_invoice_id: Option<String>,
}
