//! Purpose: Hold top-level CLI command dispatch for `json-hydrate`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Per-record output goes to stdout; skipped-record notices go to stderr.
//! Invariants: Single documents render pretty on a TTY; JSON Lines input renders compact.

use super::*;
use super::ingest::{IngestFailure, IngestMode, ingest, prepare, read_input};
use json_hydrate::api::Hydrator;
use json_hydrate::notice::skipped_record;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct DateRecord<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<u64>,
    path: &'a str,
    value: String,
    offset: Option<String>,
}

pub(super) fn dispatch_command(
    command: Command,
    format: DateFormat,
    color_mode: ColorMode,
) -> Result<RunOutcome, Error> {
    let hydrator = Hydrator::new(format);
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "json-hydrate", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Hydrate { input, utc } => {
            let options = RenderOptions { utc };
            let mode = IngestMode::from(input.input);
            let source = read_input(input.data, input.file.as_deref())?;
            let prepared = prepare(&source.text, mode, hydrator)
                .map_err(|err| attach_path(err, source.path.as_deref()))?;
            let compact = prepared.is_lines();
            let mut on_failure = skip_notifier("hydrate", color_mode);
            ingest(
                prepared,
                &source.text,
                hydrator,
                |_, value| {
                    emit_hydrated(&value, options, compact, color_mode);
                    Ok(())
                },
                &mut on_failure,
            )
            .map_err(|err| attach_path(err, source.path.as_deref()))?;
            Ok(RunOutcome::ok())
        }
        Command::Dates { input } => {
            let mode = IngestMode::from(input.input);
            let source = read_input(input.data, input.file.as_deref())?;
            let prepared = prepare(&source.text, mode, hydrator)
                .map_err(|err| attach_path(err, source.path.as_deref()))?;
            let mut on_failure = skip_notifier("dates", color_mode);
            ingest(
                prepared,
                &source.text,
                hydrator,
                |line, value| {
                    for entry in value.timestamps() {
                        let record = DateRecord {
                            line,
                            path: &entry.pointer,
                            value: entry.timestamp.to_rfc3339(),
                            offset: entry.timestamp.offset_label(),
                        };
                        let json = serde_json::to_value(&record).map_err(|err| {
                            Error::new(ErrorKind::Internal)
                                .with_message("failed to encode date record")
                                .with_source(err)
                        })?;
                        emit_json_line(&json);
                    }
                    Ok(())
                },
                &mut on_failure,
            )
            .map_err(|err| attach_path(err, source.path.as_deref()))?;
            Ok(RunOutcome::ok())
        }
    }
}

fn skip_notifier(cmd: &'static str, color_mode: ColorMode) -> impl FnMut(IngestFailure) {
    move |failure: IngestFailure| {
        let notice = skipped_record(
            cmd,
            notice_time_now(),
            failure.line,
            failure.category.label(),
        );
        emit_notice(&notice, color_mode);
    }
}

fn attach_path(err: Error, path: Option<&std::path::Path>) -> Error {
    match path {
        Some(path) if err.path().is_none() => err.with_path(path),
        _ => err,
    }
}
