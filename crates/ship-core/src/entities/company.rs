use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A shipper company. Identity is the id; the name is descriptive only and is
/// never reconciled across uploads.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub struct Company {
    pub id: String,
    pub name: String,
}
