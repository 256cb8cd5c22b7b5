//! Batch notes and the reporter capability.
//!
//! Every batch entry point takes a `&mut dyn Reporter`. Stages append
//! [`Note`]s through it and never decide how they are displayed: the CLI
//! streams them to the terminal, tests collect them into a [`NoteLog`], and
//! headless callers can fall back to [`StdoutReporter`].

use serde::Serialize;
use std::fmt;

/// How serious a note is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Error,
}

impl Severity {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One human-readable line produced during a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub severity: Severity,
    pub text: String,
}

impl Note {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
        }
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Info => write!(f, "[INFO] {}", self.text),
            Severity::Error => write!(f, "[ERROR] {}", self.text),
        }
    }
}

/// Sink for batch notes.
pub trait Reporter {
    fn report(&mut self, note: Note);

    fn info(&mut self, text: String) {
        self.report(Note::info(text));
    }

    fn error(&mut self, text: String) {
        self.report(Note::error(text));
    }
}

impl<F> Reporter for F
where
    F: FnMut(&Note),
{
    fn report(&mut self, note: Note) {
        self(&note);
    }
}

/// Prints every note to standard output. Used when no other sink is wired.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutReporter;

impl Reporter for StdoutReporter {
    fn report(&mut self, note: Note) {
        println!("{note}");
    }
}

/// Collects notes in arrival order.
#[derive(Debug, Default, Clone)]
pub struct NoteLog {
    notes: Vec<Note>,
}

impl NoteLog {
    #[must_use]
    pub const fn new() -> Self {
        Self { notes: Vec::new() }
    }

    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub fn into_notes(self) -> Vec<Note> {
        self.notes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|note| note.is_error())
    }

    /// True when any note's text contains `needle`.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        self.notes.iter().any(|note| note.text.contains(needle))
    }
}

impl Reporter for NoteLog {
    fn report(&mut self, note: Note) {
        self.notes.push(note);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_log_keeps_arrival_order() {
        let mut log = NoteLog::new();
        log.info("first".into());
        log.error("second".into());
        log.info("third".into());

        let texts: Vec<_> = log.notes().iter().map(|n| n.text.as_str()).collect();
        assert_eq!(texts, ["first", "second", "third"]);
        assert_eq!(log.errors().count(), 1);
    }

    #[test]
    fn closures_are_reporters() {
        let mut seen = Vec::new();
        {
            let mut sink = |note: &Note| seen.push(note.severity);
            sink.info("a".into());
            sink.error("b".into());
        }
        assert_eq!(seen, [Severity::Info, Severity::Error]);
    }

    #[test]
    fn display_prefixes_severity() {
        assert_eq!(Note::info("ok").to_string(), "[INFO] ok");
        assert_eq!(Note::error("bad").to_string(), "[ERROR] bad");
    }

    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Note::error("x")).expect("serialize");
        assert_eq!(json, r#"{"severity":"error","text":"x"}"#);
    }
}
