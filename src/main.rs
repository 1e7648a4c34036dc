//! Purpose: `json-hydrate` CLI entry point and command dispatch bootstrap.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (pretty on a TTY, compact otherwise).
//! Invariants: Non-interactive errors and notices are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::error::Error as StdError;
use std::io::{self, IsTerminal};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{
    Args, CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Map, Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;
mod ingest;

use json_hydrate::api::{DateFormat, Error, ErrorKind, HydratedValue, to_exit_code};
use json_hydrate::notice::{Notice, notice_json};
use json_hydrate::render::{self, RenderOptions};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `json-hydrate --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    let format = DateFormat::from(cli.format);

    command_dispatch::dispatch_command(cli.command, format, color_mode)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
        .map_err(|err| (err, color_mode))
}

#[derive(Parser)]
#[command(
    name = "json-hydrate",
    version,
    about = "Hydrate ISO 8601 date-time strings inside JSON",
    long_about = None,
    before_help = r#"A string is hydrated when it is a valid ISO 8601 date-time AND contains a literal `T`.
Date-only strings ("2024-01-01") and everything else pass through unchanged."#,
    after_help = r#"EXAMPLES
  $ json-hydrate hydrate '{"at": "2024-01-01T10:00:00+02:00"}' --utc
  $ json-hydrate dates -f events.jsonl
  $ curl -s https://api.example.com/entries | json-hydrate dates

LEARN MORE
  $ json-hydrate <command> --help"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics and pretty JSON output: auto|always|never"
    )]
    color: ColorMode,
    #[arg(
        long,
        global = true,
        default_value = "iso8601",
        value_enum,
        help = "Date-time grammar: iso8601 (offset optional) | rfc3339 (offset required)"
    )]
    format: FormatCli,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatCli {
    Iso8601,
    Rfc3339,
}

impl From<FormatCli> for DateFormat {
    fn from(value: FormatCli) -> Self {
        match value {
            FormatCli::Iso8601 => DateFormat::Iso8601,
            FormatCli::Rfc3339 => DateFormat::Rfc3339,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum InputMode {
    Auto,
    Json,
    Jsonl,
}

impl From<InputMode> for ingest::IngestMode {
    fn from(value: InputMode) -> Self {
        match value {
            InputMode::Auto => ingest::IngestMode::Auto,
            InputMode::Json => ingest::IngestMode::Json,
            InputMode::Jsonl => ingest::IngestMode::Jsonl,
        }
    }
}

#[derive(Args)]
struct InputArgs {
    #[arg(help = "Inline JSON value")]
    data: Option<String>,
    #[arg(
        short = 'f',
        long = "file",
        help = "Input file path (JSON document or JSON Lines; use - for stdin)",
        conflicts_with = "data",
        value_hint = ValueHint::FilePath
    )]
    file: Option<String>,
    #[arg(
        long = "in",
        default_value = "auto",
        value_enum,
        help = "Input mode: auto|json|jsonl"
    )]
    input: InputMode,
}

#[derive(Subcommand)]
enum Command {
    #[command(
        about = "Emit JSON with date-time strings hydrated and re-rendered",
        long_about = r#"Parse JSON, hydrate date-time strings, and print the result.

Hydrated dates are re-rendered as RFC 3339 (offset preserved, fraction trimmed).
Single documents print once; JSON Lines input prints one compact line per record."#,
        after_help = r#"EXAMPLES
  $ json-hydrate hydrate '["2024-01-01T10:00:00.500+05:30", "2024-01-01"]'
  $ json-hydrate hydrate --utc -f entries.json
  $ tail -f app.log.jsonl | json-hydrate hydrate --in jsonl

NOTES
  - `--in auto` treats input as one document when it parses, else as JSON Lines
  - Bad JSON Lines records are skipped with a notice on stderr"#
    )]
    Hydrate {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, help = "Convert offset-bearing dates to UTC")]
        utc: bool,
    },
    #[command(
        about = "List every hydrated date-time with its JSON Pointer",
        long_about = r#"Parse JSON and print one JSON line per hydrated date-time:
  {"line": N, "path": "/json/pointer", "value": "<rfc3339>", "offset": "Z"|"+hh:mm"|null}

`line` is the JSON Lines record's line number; it is omitted for single documents."#,
        after_help = r#"EXAMPLES
  $ json-hydrate dates '{"a": [{"b": "2024-01-01T00:00:00Z"}, "plain"]}'
  $ json-hydrate --format rfc3339 dates -f export.jsonl"#
    )]
    Dates {
        #[command(flatten)]
        input: InputArgs,
    },
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completion scripts",
        after_help = r#"EXAMPLES
  $ json-hydrate completion bash > ~/.local/share/bash-completion/completions/json-hydrate
  $ json-hydrate completion zsh > ~/.zfunc/_json-hydrate
  $ json-hydrate completion fish > ~/.config/fish/completions/json-hydrate.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn emit_hydrated(value: &HydratedValue, options: RenderOptions, compact: bool, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    if compact || !(is_tty || use_color) {
        let text = serde_json::to_string(&render::to_json_with(value, options))
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
        println!("{text}");
        return;
    }
    println!("{}", render::colorize(value, options, use_color));
}

fn emit_json_line(value: &Value) {
    let json = serde_json::to_string(value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn notice_time_now() -> String {
    use time::format_description::well_known::Rfc3339;
    let formatted = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|duration| {
            time::OffsetDateTime::from_unix_timestamp_nanos(duration.as_nanos() as i128).ok()
        })
        .and_then(|ts| ts.format(&Rfc3339).ok());
    formatted.unwrap_or_default()
}

fn emit_notice(notice: &Notice, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        let label = colorize_label("notice:", color_mode.use_color(is_tty), AnsiColor::Yellow);
        eprintln!("{label} {}", notice.message);
        return;
    }

    let value = notice_json(notice);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"notice\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Parse => "parse error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(line) = err.line() {
        inner.insert("line".to_string(), json!(line));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        error_message(err)
    ));
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(path) = err.path() {
        lines.push(format!(
            "{} {}",
            colorize_label("path:", use_color, AnsiColor::Yellow),
            path.display()
        ));
    }
    if let Some(source) = err.source() {
        lines.push(format!(
            "{} {source}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}

fn add_io_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Io || err.hint().is_some() {
        return err;
    }
    err.with_hint("I/O error. Check the path and permissions.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_LOG=debug and share command/context if it persists.",
    )
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}
