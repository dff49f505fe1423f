//! Central schema registry for all Shipdesk wire types.
//!
//! The `SchemaRegistry` builds JSON Schemas from ship-core types at
//! construction time using [`schemars::schema_for!`] and compiles validators
//! on demand via `jsonschema`.

use std::collections::HashMap;

use schemars::schema_for;

use crate::error::SchemaError;

/// Name of the schema every upload is checked against.
pub const BATCH_SCHEMA: &str = "batch";

/// Central store of all JSON Schemas in the Shipdesk system.
pub struct SchemaRegistry {
    schemas: HashMap<&'static str, serde_json::Value>,
}

/// Insert a schema into the map as a `serde_json::Value`.
macro_rules! register {
    ($map:expr, $name:expr, $ty:ty) => {
        $map.insert($name, schema_for!($ty).to_value());
    };
}

impl SchemaRegistry {
    /// Build a new registry containing the upload, entity, and response schemas.
    #[must_use]
    pub fn new() -> Self {
        let mut schemas = HashMap::new();

        // --- Upload types (3) ---
        register!(schemas, BATCH_SCHEMA, ship_core::batch::Batch);
        register!(schemas, "invoice_record", ship_core::batch::InvoiceRecord);
        register!(schemas, "shipment_record", ship_core::batch::ShipmentRecord);

        // --- Entity types (3) ---
        register!(schemas, "company", ship_core::entities::Company);
        register!(schemas, "shipment", ship_core::entities::Shipment);
        register!(schemas, "invoice", ship_core::entities::Invoice);

        // --- Response types (4) ---
        register!(schemas, "shipment_view", ship_core::responses::ShipmentView);
        register!(schemas, "invoice_view", ship_core::responses::InvoiceView);
        register!(schemas, "upload_stats", ship_core::responses::UploadStats);
        register!(
            schemas,
            "confirm_response",
            ship_core::responses::ConfirmResponse
        );

        Self { schemas }
    }

    /// Get a schema by name. Returns `None` if not found.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.schemas.get(name)
    }

    /// Compile a validator for a named schema.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::NotFound` if the schema name is unknown, or
    /// `SchemaError::Generation` if the schema does not compile.
    pub fn compile(&self, name: &str) -> Result<jsonschema::Validator, SchemaError> {
        let schema = self
            .get(name)
            .ok_or_else(|| SchemaError::NotFound(name.to_string()))?;

        jsonschema::validator_for(schema).map_err(|e| SchemaError::Generation(format!("{e}")))
    }

    /// List all registered schema names.
    #[must_use]
    pub fn list(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self.schemas.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered schemas.
    #[must_use]
    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}
