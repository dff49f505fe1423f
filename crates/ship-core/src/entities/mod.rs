//! Entity structs for the persisted Shipdesk rows.
//!
//! Each entity maps to one table in the libSQL database. All structs derive
//! `Serialize`, `Deserialize`, and `JsonSchema` for JSON output and schema
//! export.

mod company;
mod invoice;
mod shipment;

pub use company::Company;
pub use invoice::Invoice;
pub use shipment::Shipment;
