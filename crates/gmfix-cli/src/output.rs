//! Output layer shared by every command.
//!
//! Notes are streamed to stdout as the batch produces them, then a summary is
//! rendered. Failures that end a command are rendered to stderr.
//!
//! # Output mode resolution
//!
//! Precedence (highest wins):
//! 1. `--format` / hidden `--json` flag
//! 2. `FORMAT` env var → `"pretty"` | `"text"` | `"json"`
//! 3. Default: [`OutputMode::Pretty`] if stdout is a TTY; [`OutputMode::Text`] if piped.

use clap::ValueEnum;
use gmfix_core::{BatchSummary, Note, PreconditionFailure, Reporter, Severity};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};

/// Shared width for human pretty separators.
pub const PRETTY_RULE_WIDTH: usize = 72;

/// Write a horizontal separator used by pretty human output.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = PRETTY_RULE_WIDTH)
}

/// Write a section heading followed by a separator.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// Render a left-aligned key/value line in human output.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    writeln!(w, "{:<14} {}", format!("{key}:"), value.as_ref())
}

/// The three output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Human-optimized output with a framed summary.
    Pretty,
    /// Plain `[INFO]`/`[ERROR]` lines for logs and pipes.
    Text,
    /// One JSON object per note, then a summary object.
    Json,
}

impl OutputMode {
    /// Returns `true` if JSON output was requested.
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(
    format_flag: Option<OutputMode>,
    json_flag: bool,
    format_env: Option<&str>,
    is_tty: bool,
) -> OutputMode {
    if let Some(mode) = format_flag {
        return mode;
    }

    if json_flag {
        return OutputMode::Json;
    }

    if let Some(val) = format_env {
        match val.to_lowercase().as_str() {
            "json" => return OutputMode::Json,
            "text" => return OutputMode::Text,
            "pretty" => return OutputMode::Pretty,
            _ => {} // unknown value: fall through to TTY detection
        }
    }

    if is_tty {
        OutputMode::Pretty
    } else {
        OutputMode::Text
    }
}

/// Resolve the output mode from CLI flags, environment, and TTY defaults.
pub fn resolve_output_mode(format_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env_val = std::env::var("FORMAT").ok();
    let is_tty = io::stdout().is_terminal();
    resolve_output_mode_inner(format_flag, json_flag, env_val.as_deref(), is_tty)
}

/// Streams notes to a writer in the selected mode.
pub struct NotePrinter<W: Write> {
    out: W,
    mode: OutputMode,
    quiet: bool,
}

impl NotePrinter<io::Stdout> {
    pub fn stdout(mode: OutputMode, quiet: bool) -> Self {
        Self::new(io::stdout(), mode, quiet)
    }
}

impl<W: Write> NotePrinter<W> {
    pub const fn new(out: W, mode: OutputMode, quiet: bool) -> Self {
        Self { out, mode, quiet }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_note(&mut self, note: &Note) -> io::Result<()> {
        match self.mode {
            OutputMode::Json => {
                serde_json::to_writer(&mut self.out, note)?;
                writeln!(self.out)
            }
            OutputMode::Text => writeln!(self.out, "{note}"),
            OutputMode::Pretty => match note.severity {
                Severity::Info => writeln!(self.out, "  {}", note.text),
                Severity::Error => writeln!(self.out, "! {}", note.text),
            },
        }
    }
}

impl<W: Write> Reporter for NotePrinter<W> {
    fn report(&mut self, note: Note) {
        if self.quiet && note.severity == Severity::Info {
            return;
        }
        if let Err(err) = self.write_note(&note) {
            tracing::warn!("failed to print note: {err}");
        }
    }
}

#[derive(Serialize)]
struct SummaryEnvelope<'a> {
    command: &'a str,
    summary: &'a BatchSummary,
}

/// Render the closing summary of a batch command to stdout.
pub fn render_summary(mode: OutputMode, command: &str, summary: &BatchSummary) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_summary(&mut out, mode, command, summary)?;
    Ok(())
}

fn write_summary(
    out: &mut dyn Write,
    mode: OutputMode,
    command: &str,
    summary: &BatchSummary,
) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer(&mut *out, &SummaryEnvelope { command, summary })?;
            writeln!(out)
        }
        OutputMode::Text => writeln!(
            out,
            "{command}: scanned={} changed={} errors={}",
            summary.files_scanned, summary.files_changed, summary.errors
        ),
        OutputMode::Pretty => {
            writeln!(out)?;
            pretty_section(out, command)?;
            pretty_kv(out, "files scanned", summary.files_scanned.to_string())?;
            pretty_kv(out, "files changed", summary.files_changed.to_string())?;
            pretty_kv(out, "errors", summary.errors.to_string())
        }
    }
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (`E####`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl From<&PreconditionFailure> for CliError {
    fn from(err: &PreconditionFailure) -> Self {
        let code = err.code();
        Self {
            message: err.to_string(),
            suggestion: code.hint().map(str::to_owned),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    write_error(&mut out, mode, error)?;
    Ok(())
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> io::Result<()> {
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut *out, &wrapper)?;
            writeln!(out)
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(suggestion) = &error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
            Ok(())
        }
    }
}
