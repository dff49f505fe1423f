use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Serve the dashboard HTTP API.
    Serve(ServeArgs),
    /// Validate an invoice file without storing it.
    Preview(FileArgs),
    /// Validate an invoice file and commit it.
    Import(FileArgs),
    /// List shipments with their latest invoice.
    Shipments(ShipmentsArgs),
    /// Invoice history of one shipment, newest first.
    History(HistoryArgs),
    /// List companies.
    Companies,
    /// Print JSON Schemas of the wire types.
    Schema(SchemaArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ServeArgs {
    /// Listen address (overrides server.bind)
    #[arg(long)]
    pub bind: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct FileArgs {
    /// Path to a JSON array of invoices
    pub file: PathBuf,
}

#[derive(Clone, Debug, Args)]
pub struct ShipmentsArgs {
    /// Only shipments of this company id
    #[arg(long)]
    pub company: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct HistoryArgs {
    /// Shipment id
    pub shipment_id: String,
}

#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Schema name (omit to list all names)
    pub name: Option<String>,
}
