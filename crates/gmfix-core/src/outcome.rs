//! Result of one match attempt.

use std::fmt;

use crate::report::{Note, Severity};
use crate::room::InstanceId;

/// What happened when one destination node was matched against the source.
///
/// None of these are failures: every variant is reported, and a document is
/// still persisted when any slot changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Source and destination agreed on every slot.
    Matched { written: usize },
    /// Codes were assigned to the overlapping slots only.
    CountMismatch { expected: usize, actual: usize },
    /// Positional pairing found a different instance at this index.
    KeyMismatch {
        expected: InstanceId,
        found: InstanceId,
    },
    /// The destination event category has no tag.
    Unmapped { raw_type: String },
    /// No source record carries this key.
    NotFound,
}

impl MatchOutcome {
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Matched { .. } | Self::Unmapped { .. } | Self::NotFound => Severity::Info,
            Self::CountMismatch { .. } | Self::KeyMismatch { .. } => Severity::Error,
        }
    }

    /// Note describing this outcome for `subject` (a file, event, or instance).
    #[must_use]
    pub fn to_note(&self, subject: &str) -> Note {
        Note {
            severity: self.severity(),
            text: format!("{subject}: {self}"),
        }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Matched { written } => write!(f, "matched, {written} code(s) assigned"),
            Self::CountMismatch { expected, actual } => write!(
                f,
                "code count mismatch, source has {expected}, destination has {actual}"
            ),
            Self::KeyMismatch { expected, found } => {
                write!(f, "instance mismatch, expected {expected}, found {found}")
            }
            Self::Unmapped { raw_type } => write!(f, "unknown event type \"{raw_type}\""),
            Self::NotFound => f.write_str("no exported event"),
        }
    }
}
