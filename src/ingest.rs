//! Purpose: Read CLI input and split it into hydrated JSON records with explicit modes.
//! Exports: `IngestMode`, `Prepared`, `IngestOutcome`, `IngestFailure`, `read_input`, `prepare`, `ingest`.
//! Role: Input ingestion used by the CLI; isolates source selection and JSON Lines handling from main.
//! Invariants: `Json` mode is all-or-nothing; a parse failure is an error.
//! Invariants: `Jsonl` mode skips bad lines at line boundaries and reports each one.
//! Invariants: `Auto` picks `Json` when the whole input parses, else `Jsonl` for multi-line input.
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use json_hydrate::api::{
    Error, ErrorKind, HydratedValue, Hydrator, ParseFailureCategory, categorize_error,
};
use serde_json::Value;
use tracing::debug;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IngestMode {
    Auto,
    Json,
    Jsonl,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IngestOutcome {
    pub records_total: u64,
    pub ok: u64,
    pub failed: u64,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IngestFailure {
    pub line: u64,
    pub category: ParseFailureCategory,
}

/// Raw input text plus the file it came from, when there was one.
pub struct Input {
    pub text: String,
    pub path: Option<PathBuf>,
}

fn io_error(err: io::Error, message: &str) -> Error {
    Error::new(ErrorKind::Io)
        .with_message(message)
        .with_source(err)
}

pub fn read_input(data: Option<String>, file: Option<&str>) -> Result<Input, Error> {
    if let Some(text) = data {
        return Ok(Input { text, path: None });
    }
    match file {
        Some(path) if path != "-" => {
            let text = std::fs::read_to_string(path).map_err(|err| {
                io_error(err, "failed to read input file").with_path(path)
            })?;
            Ok(Input {
                text,
                path: Some(PathBuf::from(path)),
            })
        }
        Some(_) => read_stdin(),
        None => {
            if io::stdin().is_terminal() {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("no input provided")
                    .with_hint("Pass inline JSON, use -f <file>, or pipe JSON on stdin."));
            }
            read_stdin()
        }
    }
}

fn read_stdin() -> Result<Input, Error> {
    let mut text = String::new();
    io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| io_error(err, "failed to read stdin"))?;
    Ok(Input { text, path: None })
}

/// Input after mode resolution. `Auto` input is parsed at most once here.
#[derive(Debug)]
pub enum Prepared {
    Document(HydratedValue),
    Lines,
}

impl Prepared {
    pub fn is_lines(&self) -> bool {
        matches!(self, Prepared::Lines)
    }
}

pub fn prepare(text: &str, mode: IngestMode, hydrator: Hydrator) -> Result<Prepared, Error> {
    let prepared = match mode {
        IngestMode::Json => Prepared::Document(hydrator.try_parse(text)?),
        IngestMode::Jsonl => Prepared::Lines,
        IngestMode::Auto => match hydrator.try_parse(text) {
            Ok(value) => Prepared::Document(value),
            Err(_) if non_empty_lines(text) > 1 => Prepared::Lines,
            Err(err) => return Err(err),
        },
    };
    debug!(?mode, lines = prepared.is_lines(), bytes = text.len(), "input mode resolved");
    Ok(prepared)
}

/// Feeds records to `on_value`. The line number is `Some` only for JSON Lines records.
pub fn ingest<F, N>(
    prepared: Prepared,
    text: &str,
    hydrator: Hydrator,
    mut on_value: F,
    mut on_failure: N,
) -> Result<IngestOutcome, Error>
where
    F: FnMut(Option<u64>, HydratedValue) -> Result<(), Error>,
    N: FnMut(IngestFailure),
{
    let outcome = match prepared {
        Prepared::Document(value) => {
            on_value(None, value)?;
            IngestOutcome {
                records_total: 1,
                ok: 1,
                failed: 0,
            }
        }
        Prepared::Lines => ingest_lines(text, hydrator, &mut on_value, &mut on_failure)?,
    };

    debug!(
        records = outcome.records_total,
        ok = outcome.ok,
        failed = outcome.failed,
        "ingest complete"
    );
    if outcome.ok == 0 && outcome.failed > 0 {
        return Err(Error::new(ErrorKind::Parse)
            .with_message("no valid JSON records in input")
            .with_hint("Check the input format or pass --in json for a single document."));
    }
    Ok(outcome)
}

fn ingest_lines<F, N>(
    text: &str,
    hydrator: Hydrator,
    on_value: &mut F,
    on_failure: &mut N,
) -> Result<IngestOutcome, Error>
where
    F: FnMut(Option<u64>, HydratedValue) -> Result<(), Error>,
    N: FnMut(IngestFailure),
{
    let mut outcome = IngestOutcome::default();
    for (idx, raw) in text.lines().enumerate() {
        let line = idx as u64 + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }
        outcome.records_total += 1;
        match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => {
                on_value(Some(line), hydrator.hydrate(value))?;
                outcome.ok += 1;
            }
            Err(err) => {
                outcome.failed += 1;
                on_failure(IngestFailure {
                    line,
                    category: categorize_error(&err),
                });
            }
        }
    }
    Ok(outcome)
}

fn non_empty_lines(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

#[cfg(test)]
mod tests {
    use super::{IngestFailure, IngestMode, Prepared, ingest, prepare};
    use json_hydrate::api::{ErrorKind, Hydrator, ParseFailureCategory};

    type Run = (Vec<(Option<u64>, usize)>, Vec<IngestFailure>, Result<u64, ErrorKind>);

    fn run(text: &str, mode: IngestMode) -> Run {
        let hydrator = Hydrator::default();
        let prepared = match prepare(text, mode, hydrator) {
            Ok(prepared) => prepared,
            Err(err) => return (Vec::new(), Vec::new(), Err(err.kind())),
        };
        let mut values = Vec::new();
        let mut failures = Vec::new();
        let result = ingest(
            prepared,
            text,
            hydrator,
            |line, value| {
                values.push((line, value.date_count()));
                Ok(())
            },
            |failure| failures.push(failure),
        );
        (values, failures, result.map(|o| o.ok).map_err(|err| err.kind()))
    }

    #[test]
    fn auto_prefers_single_document() {
        let hydrator = Hydrator::default();
        let pretty = "{\n  \"at\": \"2024-01-01T00:00:00Z\"\n}";
        match prepare(pretty, IngestMode::Auto, hydrator).expect("prepare") {
            Prepared::Document(value) => assert_eq!(value.date_count(), 1),
            Prepared::Lines => panic!("expected a single document"),
        }
        assert!(
            prepare("{\"a\":1}\n{\"b\":2}\n", IngestMode::Auto, hydrator)
                .expect("prepare")
                .is_lines()
        );
        let err = prepare("{oops", IngestMode::Auto, hydrator).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn single_document_has_no_line_number() {
        let (values, failures, result) = run("{\n\n\"at\": \"2024-01-01T00:00:00Z\"}", IngestMode::Auto);
        assert_eq!(values, vec![(None, 1)]);
        assert!(failures.is_empty());
        assert_eq!(result, Ok(1));
    }

    #[test]
    fn jsonl_skips_bad_lines_and_reports_them() {
        let text = "{\"at\":\"2024-01-01T00:00:00Z\"}\n\n{bad\n[\"2024-01-02T00:00:00Z\", \"x\"]\n";
        let (values, failures, result) = run(text, IngestMode::Auto);
        assert_eq!(values, vec![(Some(1), 1), (Some(4), 1)]);
        assert_eq!(
            failures,
            vec![IngestFailure {
                line: 3,
                category: ParseFailureCategory::Syntax,
            }]
        );
        assert_eq!(result, Ok(2));
    }

    #[test]
    fn json_mode_fails_on_malformed_document() {
        let (values, failures, result) = run("{\"a\":1}\n{\"b\":2}", IngestMode::Json);
        assert!(values.is_empty());
        assert!(failures.is_empty());
        assert_eq!(result, Err(ErrorKind::Parse));
    }

    #[test]
    fn all_bad_lines_is_an_error() {
        let (_, failures, result) = run("nope\nstill nope\n", IngestMode::Jsonl);
        assert_eq!(failures.len(), 2);
        assert_eq!(result, Err(ErrorKind::Parse));
    }
}
