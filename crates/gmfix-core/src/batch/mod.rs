//! Batch runners: whole-folder operations that stream notes to a reporter.
//!
//! Each runner validates its folders first. A failed precondition produces a
//! single error note and an `Err`, and nothing on disk is touched. Past that
//! point every failure is confined to the file, event or instance it concerns:
//! it becomes an error note and the batch moves on.

pub mod restore;
pub mod scripts;

use std::borrow::Cow;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{IoFailure, PreconditionFailure};
use crate::project;
use crate::report::{Note, Reporter, Severity};
use crate::xml;

pub use restore::{RestoreOptions, restore_codes};
pub use scripts::{break_to_exit, replace_tokens, rewrite_keyword};

/// Counters returned by every runner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub files_scanned: usize,
    pub files_changed: usize,
    /// Error notes emitted during the run.
    pub errors: usize,
}

/// Post-processing applied to rewritten XML documents before they are saved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Drop `&#xD;` style references from the saved text.
    pub strip_cr_entities: bool,
}

impl OutputOptions {
    #[must_use]
    pub fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        if self.strip_cr_entities {
            xml::strip_cr_entities(text)
        } else {
            Cow::Borrowed(text)
        }
    }
}

/// Reporter wrapper that keeps the summary counters in step with the notes.
pub(crate) struct Batch<'r> {
    reporter: &'r mut dyn Reporter,
    summary: BatchSummary,
}

impl<'r> Batch<'r> {
    pub(crate) fn new(reporter: &'r mut dyn Reporter) -> Self {
        Self {
            reporter,
            summary: BatchSummary::default(),
        }
    }

    pub(crate) fn note(&mut self, note: Note) {
        if note.severity == Severity::Error {
            self.summary.errors += 1;
        }
        self.reporter.report(note);
    }

    pub(crate) fn info(&mut self, text: impl Into<String>) {
        self.note(Note::info(text));
    }

    pub(crate) fn error(&mut self, text: impl Into<String>) {
        self.note(Note::error(text));
    }

    /// Report a failed precondition and hand it back for the caller to return.
    pub(crate) fn reject(mut self, failure: PreconditionFailure) -> PreconditionFailure {
        warn!(code = %failure.code(), "{failure}");
        self.error(failure.to_string());
        failure
    }

    pub(crate) const fn scanned(&mut self) {
        self.summary.files_scanned += 1;
    }

    /// Read a file, turning a failure into an error note.
    pub(crate) fn read_text(&mut self, path: &Path) -> Option<String> {
        self.scanned();
        self.io(project::read_text(path))
    }

    pub(crate) fn read_bytes(&mut self, path: &Path) -> Option<Vec<u8>> {
        self.scanned();
        self.io(project::read_bytes(path))
    }

    /// Overwrite a file and count it as changed. Returns false on failure.
    pub(crate) fn write(&mut self, path: &Path, bytes: &[u8]) -> bool {
        if self.io(project::write_bytes(path, bytes)).is_some() {
            info!(path = %path.display(), bytes = bytes.len(), "wrote file");
            self.summary.files_changed += 1;
            true
        } else {
            false
        }
    }

    fn io<T>(&mut self, result: Result<T, IoFailure>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(code = %err.code(), "{err}");
                self.error(err.to_string());
                None
            }
        }
    }

    /// Emit the closing notes and return the counters.
    pub(crate) fn finish(mut self) -> BatchSummary {
        if self.summary.files_changed == 0 {
            self.info("Nothing changed");
        }
        self.info("Done!");
        self.summary
    }
}

/// Path shown in notes: relative to `root` when possible.
pub(crate) fn display_path(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
