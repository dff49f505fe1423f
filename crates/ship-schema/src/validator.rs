//! Upload validation: raw bytes -> typed invoice batch.
//!
//! Three passes, each collecting every problem it finds instead of stopping
//! at the first:
//! 1. JSON decoding (a UTF-8 BOM is tolerated)
//! 2. structural check against the `batch` JSON Schema
//! 3. `createdAt` coercion and typed deserialization
//!
//! Element order is preserved end to end.

use serde_json::Value;
use ship_core::batch::{Batch, InvoiceRecord};
use ship_core::dates::parse_timestamp;
use tracing::debug;

use crate::error::ValidationError;
use crate::registry::{BATCH_SCHEMA, SchemaRegistry};

/// Compiled validator for invoice batch uploads.
pub struct BatchValidator {
    schema: jsonschema::Validator,
}

impl BatchValidator {
    /// Compile the batch schema from a fresh registry.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Registry` if the schema does not compile.
    pub fn new() -> Result<Self, ValidationError> {
        Self::from_registry(&SchemaRegistry::new())
    }

    /// Compile the batch schema held by `registry`.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Registry` if the schema is missing or does
    /// not compile.
    pub fn from_registry(registry: &SchemaRegistry) -> Result<Self, ValidationError> {
        let schema = registry.compile(BATCH_SCHEMA)?;
        Ok(Self { schema })
    }

    /// Validate raw upload bytes.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Parse` for malformed JSON and
    /// `ValidationError::Schema` for structural violations.
    pub fn validate(&self, raw: &[u8]) -> Result<Batch, ValidationError> {
        let raw = raw.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(raw);
        let value: Value =
            serde_json::from_slice(raw).map_err(|e| ValidationError::Parse(e.to_string()))?;
        self.validate_value(value)
    }

    /// Validate an already decoded JSON value.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::Schema` for structural violations.
    pub fn validate_value(&self, value: Value) -> Result<Batch, ValidationError> {
        let mut errors: Vec<String> = self
            .schema
            .iter_errors(&value)
            .map(|e| format!("{}: {e}", pointer_label(&e.instance_path.to_string())))
            .collect();

        if !errors.is_empty() {
            debug!(violations = errors.len(), "upload failed schema check");
            return Err(ValidationError::Schema { errors });
        }

        let Value::Array(items) = value else {
            return Err(ValidationError::Schema {
                errors: vec!["(root): expected a JSON array of invoices".to_string()],
            });
        };

        let mut invoices = Vec::with_capacity(items.len());
        for (idx, item) in items.into_iter().enumerate() {
            if let Some(raw_date) = item.pointer("/shipment/createdAt").and_then(Value::as_str)
                && let Err(e) = parse_timestamp(raw_date)
            {
                errors.push(format!("/{idx}/shipment/createdAt: {e}"));
                continue;
            }

            match serde_json::from_value::<InvoiceRecord>(item) {
                Ok(record) => invoices.push(record),
                Err(e) => errors.push(format!("/{idx}: {e}")),
            }
        }

        if !errors.is_empty() {
            debug!(violations = errors.len(), "upload failed typed decoding");
            return Err(ValidationError::Schema { errors });
        }

        debug!(invoices = invoices.len(), "upload validated");
        Ok(Batch::new(invoices))
    }
}

/// Validate raw upload bytes with a freshly compiled validator.
///
/// # Errors
///
/// See [`BatchValidator::validate`].
pub fn validate(raw: &[u8]) -> Result<Batch, ValidationError> {
    BatchValidator::new()?.validate(raw)
}

fn pointer_label(pointer: &str) -> &str {
    if pointer.is_empty() { "(root)" } else { pointer }
}
