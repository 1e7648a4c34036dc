//! Purpose: Turn hydrated trees back into JSON text, optionally ANSI-colorized.
//! Exports: `RenderOptions`, `to_json`, `to_json_with`, `colorize`.
//! Role: Small, pure formatter used by the CLI and by `Serialize for HydratedValue`.
//! Invariants: Dates render as RFC 3339 strings; offset-less dates render without offset.
//! Invariants: When color is disabled, `colorize` equals `serde_json::to_string_pretty(&to_json(v))`.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::core::timestamp::Timestamp;
use crate::core::value::HydratedValue;

const INDENT: &str = "  ";

const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_DATE: &str = "34";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct RenderOptions {
    /// Convert offset-bearing dates to UTC before rendering.
    pub utc: bool,
}

pub fn to_json(value: &HydratedValue) -> Value {
    to_json_with(value, RenderOptions::default())
}

pub fn to_json_with(value: &HydratedValue, options: RenderOptions) -> Value {
    match value {
        HydratedValue::Null => Value::Null,
        HydratedValue::Bool(flag) => Value::Bool(*flag),
        HydratedValue::Number(number) => Value::Number(number.clone()),
        HydratedValue::String(text) => Value::String(text.clone()),
        HydratedValue::DateTime(timestamp) => Value::String(render_timestamp(timestamp, options)),
        HydratedValue::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| to_json_with(item, options))
                .collect(),
        ),
        HydratedValue::Object(fields) => {
            let mut map = Map::with_capacity(fields.len());
            for (key, field) in fields {
                map.insert(key.clone(), to_json_with(field, options));
            }
            Value::Object(map)
        }
    }
}

fn render_timestamp(timestamp: &Timestamp, options: RenderOptions) -> String {
    if options.utc {
        timestamp.to_utc().to_rfc3339()
    } else {
        timestamp.to_rfc3339()
    }
}

impl Serialize for HydratedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_json(self).serialize(serializer)
    }
}

pub fn colorize(value: &HydratedValue, options: RenderOptions, use_color: bool) -> String {
    let mut out = String::new();
    let mut writer = Writer {
        options,
        use_color,
        out: &mut out,
    };
    writer.value(value, 0);
    out
}

struct Writer<'a> {
    options: RenderOptions,
    use_color: bool,
    out: &'a mut String,
}

impl Writer<'_> {
    fn value(&mut self, value: &HydratedValue, indent: usize) {
        match value {
            HydratedValue::Null => self.colored("null", COLOR_NULL),
            HydratedValue::Bool(flag) => self.colored(if *flag { "true" } else { "false" }, COLOR_BOOL),
            HydratedValue::Number(number) => self.colored(&number.to_string(), COLOR_NUMBER),
            HydratedValue::String(text) => self.colored(&quote(text), COLOR_STRING),
            HydratedValue::DateTime(timestamp) => {
                let text = render_timestamp(timestamp, self.options);
                self.colored(&quote(&text), COLOR_DATE);
            }
            HydratedValue::Array(items) => {
                if items.is_empty() {
                    self.colored("[]", COLOR_PUNCT);
                    return;
                }
                self.colored("[", COLOR_PUNCT);
                self.out.push('\n');
                for (idx, item) in items.iter().enumerate() {
                    self.indent(indent + 1);
                    self.value(item, indent + 1);
                    if idx + 1 < items.len() {
                        self.colored(",", COLOR_PUNCT);
                    }
                    self.out.push('\n');
                }
                self.indent(indent);
                self.colored("]", COLOR_PUNCT);
            }
            HydratedValue::Object(fields) => {
                if fields.is_empty() {
                    self.colored("{}", COLOR_PUNCT);
                    return;
                }
                self.colored("{", COLOR_PUNCT);
                self.out.push('\n');
                for (idx, (key, field)) in fields.iter().enumerate() {
                    self.indent(indent + 1);
                    self.colored(&quote(key), COLOR_KEY);
                    self.colored(":", COLOR_PUNCT);
                    self.out.push(' ');
                    self.value(field, indent + 1);
                    if idx + 1 < fields.len() {
                        self.colored(",", COLOR_PUNCT);
                    }
                    self.out.push('\n');
                }
                self.indent(indent);
                self.colored("}", COLOR_PUNCT);
            }
        }
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
    }

    fn colored(&mut self, text: &str, color: &str) {
        if !self.use_color {
            self.out.push_str(text);
            return;
        }
        self.out.push_str("\u{1b}[");
        self.out.push_str(color);
        self.out.push('m');
        self.out.push_str(text);
        self.out.push_str("\u{1b}[0m");
    }
}

fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}
