//! # ship-core
//!
//! Core types and error types for Shipdesk.
//!
//! This crate provides the foundational types shared across all Shipdesk crates:
//! - Entity structs for the persisted rows (companies, shipments, invoices)
//! - Carrier and direction enums
//! - The typed invoice batch produced by validation, and its normalizer
//! - Timestamp coercion for uploaded date strings
//! - Read-side views and the uniform API response envelope
//! - Cross-cutting error types

pub mod batch;
pub mod dates;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod responses;
