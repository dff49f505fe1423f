//! Read-side queries, one module per table.
//!
//! Each module adds methods to [`crate::service::ShipService`].

pub mod company;
pub mod invoice;
pub mod shipment;
