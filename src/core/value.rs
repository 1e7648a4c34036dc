//! Purpose: Tagged-union model for hydrated JSON trees.
//! Exports: `HydratedValue`, `TimestampRef`.
//! Role: Output type of hydration; mirrors `serde_json::Value` plus a date-time leaf.
//! Invariants: Object fields keep input order; arrays keep length and order.
//! Invariants: Only `String` leaves ever differ from the source JSON (as `DateTime`).

use serde_json::{Number, Value};

use crate::core::timestamp::Timestamp;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HydratedValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    DateTime(Timestamp),
    Array(Vec<HydratedValue>),
    Object(Vec<(String, HydratedValue)>),
}

/// A hydrated leaf located by its JSON Pointer (RFC 6901).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TimestampRef<'a> {
    pub pointer: String,
    pub timestamp: &'a Timestamp,
}

impl HydratedValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Self::DateTime(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[HydratedValue]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&[(String, HydratedValue)]> {
        match self {
            Self::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Field lookup on objects. Parsed JSON has unique keys, so the first match wins.
    pub fn get(&self, key: &str) -> Option<&HydratedValue> {
        self.as_object()?
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// True when `self` has the same key sets, key order, array lengths and
    /// nesting as `json`. Leaves match if they are equal, or if a `DateTime`
    /// stands where `json` has a string.
    pub fn shape_eq(&self, json: &Value) -> bool {
        match (self, json) {
            (Self::Null, Value::Null) => true,
            (Self::Bool(left), Value::Bool(right)) => left == right,
            (Self::Number(left), Value::Number(right)) => left == right,
            (Self::String(left), Value::String(right)) => left == right,
            (Self::DateTime(_), Value::String(_)) => true,
            (Self::Array(left), Value::Array(right)) => {
                left.len() == right.len()
                    && left.iter().zip(right).all(|(l, r)| l.shape_eq(r))
            }
            (Self::Object(left), Value::Object(right)) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right)
                        .all(|((lk, lv), (rk, rv))| lk == rk && lv.shape_eq(rv))
            }
            _ => false,
        }
    }

    /// Every hydrated leaf in document order.
    pub fn timestamps(&self) -> Vec<TimestampRef<'_>> {
        let mut out = Vec::new();
        let mut pointer = String::new();
        collect_timestamps(self, &mut pointer, &mut out);
        out
    }

    pub fn date_count(&self) -> usize {
        match self {
            Self::DateTime(_) => 1,
            Self::Array(items) => items.iter().map(Self::date_count).sum(),
            Self::Object(fields) => fields.iter().map(|(_, value)| value.date_count()).sum(),
            _ => 0,
        }
    }
}

fn collect_timestamps<'a>(
    value: &'a HydratedValue,
    pointer: &mut String,
    out: &mut Vec<TimestampRef<'a>>,
) {
    match value {
        HydratedValue::DateTime(timestamp) => out.push(TimestampRef {
            pointer: pointer.clone(),
            timestamp,
        }),
        HydratedValue::Array(items) => {
            for (idx, item) in items.iter().enumerate() {
                let len = pointer.len();
                pointer.push('/');
                pointer.push_str(&idx.to_string());
                collect_timestamps(item, pointer, out);
                pointer.truncate(len);
            }
        }
        HydratedValue::Object(fields) => {
            for (key, field) in fields {
                let len = pointer.len();
                pointer.push('/');
                push_escaped_token(key, pointer);
                collect_timestamps(field, pointer, out);
                pointer.truncate(len);
            }
        }
        _ => {}
    }
}

fn push_escaped_token(token: &str, pointer: &mut String) {
    for ch in token.chars() {
        match ch {
            '~' => pointer.push_str("~0"),
            '/' => pointer.push_str("~1"),
            other => pointer.push(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::HydratedValue;
    use crate::core::timestamp::Timestamp;
    use serde_json::json;
    use time::macros::datetime;

    fn stamp() -> HydratedValue {
        HydratedValue::DateTime(Timestamp::Offset(datetime!(2024-01-01 00:00:00 UTC)))
    }

    #[test]
    fn get_finds_fields_by_key() {
        let value = HydratedValue::Object(vec![
            ("a".to_string(), HydratedValue::Bool(true)),
            ("b".to_string(), HydratedValue::Null),
        ]);
        assert_eq!(value.get("a").and_then(HydratedValue::as_bool), Some(true));
        assert!(value.get("b").is_some_and(HydratedValue::is_null));
        assert!(value.get("c").is_none());
        assert!(HydratedValue::Null.get("a").is_none());
    }

    #[test]
    fn shape_eq_accepts_dates_in_place_of_strings() {
        let json = json!({"when": "2024-01-01T00:00:00Z", "tags": ["x"]});
        let value = HydratedValue::Object(vec![
            ("when".to_string(), stamp()),
            (
                "tags".to_string(),
                HydratedValue::Array(vec![HydratedValue::String("x".to_string())]),
            ),
        ]);
        assert!(value.shape_eq(&json));
        assert!(!value.shape_eq(&json!({"when": 1, "tags": ["x"]})));
        assert!(!value.shape_eq(&json!({"tags": ["x"], "when": "t"})));
        assert!(!value.shape_eq(&json!({"when": "t", "tags": []})));
    }

    #[test]
    fn timestamps_report_escaped_pointers_in_order() {
        let value = HydratedValue::Object(vec![
            ("a/b".to_string(), stamp()),
            (
                "list".to_string(),
                HydratedValue::Array(vec![
                    HydratedValue::String("plain".to_string()),
                    HydratedValue::Object(vec![("m~n".to_string(), stamp())]),
                ]),
            ),
        ]);
        let pointers = value
            .timestamps()
            .into_iter()
            .map(|entry| entry.pointer)
            .collect::<Vec<_>>();
        assert_eq!(pointers, vec!["/a~1b", "/list/1/m~0n"]);
        assert_eq!(value.date_count(), 2);
    }

    #[test]
    fn root_timestamp_has_empty_pointer() {
        let value = stamp();
        let entries = value.timestamps();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].pointer, "");
    }
}
