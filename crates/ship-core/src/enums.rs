//! Carrier and shipment-direction enums.
//!
//! Both enums serialize to the exact labels used in uploaded invoice files
//! (`"GLS"`, `"FedEx"`, `"EXPORT"`, ...) and stored in the database, so the
//! JSON Schema generated from them is also the closed set the validator
//! enforces.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Parcel carrier that handled a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Provider {
    #[serde(rename = "GLS")]
    Gls,
    #[serde(rename = "DPD")]
    Dpd,
    #[serde(rename = "UPS")]
    Ups,
    #[serde(rename = "PPL")]
    Ppl,
    #[serde(rename = "FedEx")]
    FedEx,
}

impl Provider {
    /// Every carrier, in declaration order.
    pub const ALL: [Self; 5] = [Self::Gls, Self::Dpd, Self::Ups, Self::Ppl, Self::FedEx];

    /// Return the string representation used in uploads and SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Gls => "GLS",
            Self::Dpd => "DPD",
            Self::Ups => "UPS",
            Self::Ppl => "PPL",
            Self::FedEx => "FedEx",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// Direction of a shipment relative to the operator's country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    Export,
    Import,
}

impl Mode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Export => "EXPORT",
            Self::Import => "IMPORT",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
