//! # ship-schema
//!
//! JSON Schema generation, registry, and batch validation for Shipdesk.
//!
//! This crate provides:
//! - `SchemaRegistry`: central store of the JSON Schemas of every wire type
//! - `BatchValidator`: turns raw upload bytes into a typed [`Batch`](ship_core::batch::Batch)
//!
//! ## Architecture
//!
//! Wire types are defined in `ship-core` with `#[derive(JsonSchema)]`. This
//! crate builds their schemas once and evaluates uploads against them with
//! `jsonschema`, so the Rust types are the single source of truth for what an
//! invoice file may contain. Validation is pure: nothing here touches storage,
//! which is what makes the preview step possible.

pub mod error;
pub mod registry;
pub mod validator;

pub use error::{SchemaError, ValidationError};
pub use registry::SchemaRegistry;
pub use validator::{BatchValidator, validate};
