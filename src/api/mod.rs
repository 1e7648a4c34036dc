//! Purpose: Define the stable public Rust API boundary for json-hydrate.
//! Exports: `parse`, `try_parse`, `parse_slice`, `hydrate`, `hydrate_ref`, plus core types.
//! Role: Public, additive-only surface; hides the internal parser seam.
//! Invariants: `parse` never surfaces an error; malformed text yields `None`.
//! Invariants: Free functions use `Hydrator::default()` (ISO 8601).

use serde_json::Value;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use crate::core::hydrate::Hydrator;
pub use crate::core::timestamp::{DateFormat, Timestamp};
pub use crate::core::value::{HydratedValue, TimestampRef};
pub use crate::json::parse::{ParseFailureCategory, categorize_error};

/// Parse JSON text and hydrate date-time strings. Malformed text yields `None`.
pub fn parse(raw: &str) -> Option<HydratedValue> {
    Hydrator::default().parse(raw)
}

/// Like [`parse`], but keeps the reason for a failure.
pub fn try_parse(raw: &str) -> Result<HydratedValue, Error> {
    Hydrator::default().try_parse(raw)
}

pub fn parse_slice(raw: &[u8]) -> Option<HydratedValue> {
    Hydrator::default().parse_slice(raw)
}

pub fn hydrate(value: Value) -> HydratedValue {
    Hydrator::default().hydrate(value)
}

pub fn hydrate_ref(value: &Value) -> HydratedValue {
    Hydrator::default().hydrate_ref(value)
}
