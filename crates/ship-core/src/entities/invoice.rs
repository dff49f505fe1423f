use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One billed price point for a shipment. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub shipment_id: String,
    pub invoiced_weight: f64,
    pub invoiced_price: f64,
    pub uploaded_at: DateTime<Utc>,
}
