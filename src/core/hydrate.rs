//! Purpose: Walk parsed JSON and replace date-time strings with typed timestamps.
//! Exports: `Hydrator`.
//! Role: The hydration engine behind `api::parse`/`api::hydrate`.
//! Invariants: Shape is preserved exactly; only string leaves are rewritten.
//! Invariants: Stateless between calls; a `Hydrator` is a `Copy` config value.
//! Notes: Recursion depth follows the input tree. Trees from `parse` are bounded by
//! serde_json's recursion limit; hand-built deeper trees may exhaust the stack.

use serde_json::Value;
use tracing::{debug, trace};

use crate::core::error::Error;
use crate::core::timestamp::{DateFormat, Timestamp};
use crate::core::value::HydratedValue;
use crate::json::parse;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Hydrator {
    format: DateFormat,
}

impl Hydrator {
    pub fn new(format: DateFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> DateFormat {
        self.format
    }

    pub fn is_timestamp(&self, raw: &str) -> bool {
        Timestamp::parse(raw, self.format).is_some()
    }

    /// Parse and hydrate; malformed text yields `None`.
    pub fn parse(&self, raw: &str) -> Option<HydratedValue> {
        match self.try_parse(raw) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(error = %err, "json parse failed; returning no value");
                None
            }
        }
    }

    pub fn parse_slice(&self, raw: &[u8]) -> Option<HydratedValue> {
        match parse::from_slice::<Value>(raw) {
            Ok(value) => Some(self.hydrate(value)),
            Err(err) => {
                debug!(
                    category = parse::categorize_error(&err).label(),
                    "json parse failed; returning no value"
                );
                None
            }
        }
    }

    pub fn try_parse(&self, raw: &str) -> Result<HydratedValue, Error> {
        let value = parse::from_str::<Value>(raw).map_err(|err| parse::parse_error(err, "input"))?;
        Ok(self.hydrate(value))
    }

    pub fn hydrate(&self, value: Value) -> HydratedValue {
        match value {
            Value::Null => HydratedValue::Null,
            Value::Bool(flag) => HydratedValue::Bool(flag),
            Value::Number(number) => HydratedValue::Number(number),
            Value::String(text) => match Timestamp::parse(&text, self.format) {
                Some(timestamp) => {
                    trace!(raw = %text, "hydrated date-time");
                    HydratedValue::DateTime(timestamp)
                }
                None => HydratedValue::String(text),
            },
            Value::Array(items) => {
                HydratedValue::Array(items.into_iter().map(|item| self.hydrate(item)).collect())
            }
            Value::Object(map) => HydratedValue::Object(
                map.into_iter()
                    .map(|(key, field)| (key, self.hydrate(field)))
                    .collect(),
            ),
        }
    }

    pub fn hydrate_ref(&self, value: &Value) -> HydratedValue {
        match value {
            Value::String(text) => match Timestamp::parse(text, self.format) {
                Some(timestamp) => {
                    trace!(raw = %text, "hydrated date-time");
                    HydratedValue::DateTime(timestamp)
                }
                None => HydratedValue::String(text.clone()),
            },
            Value::Array(items) => {
                HydratedValue::Array(items.iter().map(|item| self.hydrate_ref(item)).collect())
            }
            Value::Object(map) => HydratedValue::Object(
                map.iter()
                    .map(|(key, field)| (key.clone(), self.hydrate_ref(field)))
                    .collect(),
            ),
            scalar => self.hydrate(scalar.clone()),
        }
    }
}
