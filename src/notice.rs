//! Purpose: Define a stable, structured schema for non-fatal stderr notices.
//! Exports: `Notice`, `notice_json`, `skipped_record`.
//! Role: Shared contract helper for CLI diagnostics (non-error events such as skipped lines).
//! Invariants: Notices are non-fatal and never alter stdout payloads.
//! Invariants: JSON schema is stable once published; fields are additive-only.
use serde_json::{Map, Value, json};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: String,
    pub time: String,
    pub cmd: String,
    pub message: String,
    pub details: Map<String, Value>,
}

pub fn notice_json(notice: &Notice) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(notice.kind));
    inner.insert("time".to_string(), json!(notice.time));
    inner.insert("cmd".to_string(), json!(notice.cmd));
    inner.insert("message".to_string(), json!(notice.message));
    inner.insert("details".to_string(), Value::Object(notice.details.clone()));

    let mut outer = Map::new();
    outer.insert("notice".to_string(), Value::Object(inner));
    Value::Object(outer)
}

/// Notice for a JSON Lines record that failed to parse and was dropped.
pub fn skipped_record(cmd: &str, time: String, line: u64, category: &str) -> Notice {
    let mut details = Map::new();
    details.insert("line".to_string(), json!(line));
    details.insert("category".to_string(), json!(category));
    Notice {
        kind: "skip".to_string(),
        time,
        cmd: cmd.to_string(),
        message: format!("skipped line {line}: invalid JSON"),
        details,
    }
}
