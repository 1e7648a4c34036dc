//! Purpose: Provide the internal JSON decode entrypoints and failure categories.
//! Exports: `from_str`, `from_slice`, `ParseFailureCategory`, `categorize_error`,
//! `hint_for_error`, `parse_error`.
//! Role: Parser boundary that centralizes serde_json usage details.
//! Invariants: Category labels are stable; diagnostics never echo payload text.
//! Notes: Callers decide whether a failure is swallowed or surfaced.

use serde::de::DeserializeOwned;
use serde_json::error::Category;

use crate::core::error::{Error, ErrorKind};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ParseFailureCategory {
    Syntax,
    Eof,
    Data,
    Io,
}

impl ParseFailureCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Syntax => "syntax",
            Self::Eof => "eof",
            Self::Data => "data",
            Self::Io => "io",
        }
    }
}

pub fn from_str<T: DeserializeOwned>(input: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(input)
}

pub fn from_slice<T: DeserializeOwned>(input: &[u8]) -> Result<T, serde_json::Error> {
    serde_json::from_slice(input)
}

pub fn categorize_error(err: &serde_json::Error) -> ParseFailureCategory {
    match err.classify() {
        Category::Syntax => ParseFailureCategory::Syntax,
        Category::Eof => ParseFailureCategory::Eof,
        Category::Data => ParseFailureCategory::Data,
        Category::Io => ParseFailureCategory::Io,
    }
}

pub fn hint_for_error(err: &serde_json::Error, context: &str) -> String {
    format!(
        "parse category: {}; line {} column {}; context: {context}",
        categorize_error(err).label(),
        err.line(),
        err.column()
    )
}

pub fn parse_error(err: serde_json::Error, context: &str) -> Error {
    let hint = hint_for_error(&err, context);
    let line = err.line() as u64;
    Error::new(ErrorKind::Parse)
        .with_message("invalid JSON")
        .with_hint(hint)
        .with_line(line)
        .with_source(err)
}

#[cfg(test)]
mod tests {
    use super::{ParseFailureCategory, categorize_error, from_str, hint_for_error, parse_error};
    use crate::core::error::ErrorKind;
    use serde_json::Value;

    #[test]
    fn syntax_and_eof_are_distinguished() {
        let syntax = from_str::<Value>(r#"{"a":}"#).unwrap_err();
        assert_eq!(categorize_error(&syntax), ParseFailureCategory::Syntax);

        let eof = from_str::<Value>(r#"{"a":"#).unwrap_err();
        assert_eq!(categorize_error(&eof), ParseFailureCategory::Eof);
    }

    #[test]
    fn hint_contains_category_position_and_context() {
        let err = from_str::<Value>("[1,\n2,]").unwrap_err();
        let hint = hint_for_error(&err, "test.context");
        assert!(hint.contains("parse category: syntax"));
        assert!(hint.contains("line 2"));
        assert!(hint.contains("context: test.context"));
    }

    #[test]
    fn parse_error_carries_kind_and_line() {
        let err = from_str::<Value>("\n\n{").unwrap_err();
        let err = parse_error(err, "stdin");
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.message(), Some("invalid JSON"));
    }
}
