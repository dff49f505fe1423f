//! Timestamp coercion for uploaded date strings.
//!
//! Invoice files carry `createdAt` in whatever shape the exporting system
//! produced: full RFC 3339, a naive date-time, or a bare calendar date. All
//! of them are coerced to `DateTime<Utc>`; naive values are taken as UTC.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::errors::CoreError;

/// Naive date-time layouts accepted after RFC 3339 fails.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Years whose zero-padded form keeps text order equal to time order.
const STORABLE_YEARS: RangeInclusive<i32> = 0..=9999;

/// Parse an uploaded date string into a UTC timestamp.
///
/// # Errors
///
/// Returns `CoreError::InvalidTimestamp` if the string matches none of the
/// accepted forms, or if its UTC year falls outside 0000-9999.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    coerce(raw.trim())
        .filter(|ts| STORABLE_YEARS.contains(&ts.year()))
        .ok_or_else(|| CoreError::InvalidTimestamp {
            value: raw.to_string(),
        })
}

fn coerce(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc());
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Serde adapter: deserialize a string field through [`parse_timestamp`].
///
/// # Errors
///
/// Propagates the coercion failure as a serde custom error.
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}
