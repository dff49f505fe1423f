//! # ship-server
//!
//! JSON-over-HTTP API for the Shipdesk dashboard.
//!
//! | Method | Path | Purpose |
//! |--------|------|---------|
//! | POST | `/api/invoices/upload` | validate a multipart `file` upload (no storage) |
//! | POST | `/api/invoices/confirm` | commit `{"invoices": [...]}` |
//! | GET | `/api/shipments[?companyId=]` | shipments with latest invoice |
//! | GET | `/api/shipments/{id}/history` | invoices of one shipment, newest first |
//! | GET | `/api/companies` | company filter values |
//! | GET | `/health` | liveness |
//!
//! Every reply is `{success, data?, error?}` except confirm, which returns
//! `{success, message, stats}` on success.

pub mod error;
pub mod handlers;
pub mod multipart;
pub mod router;
pub mod server;

pub use error::ServerError;
pub use handlers::{ApiRequest, AppState, Reply, handle};
pub use server::HttpServer;
