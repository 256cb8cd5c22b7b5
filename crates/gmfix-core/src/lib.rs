//! gmfix-core library.
//!
//! Moves script code between the two XML generations of a game project.
//! The split export of a 1.x project is parsed into typed records
//! ([`event::LegacyEventRecord`], [`room::LegacyRoom`]) which are matched
//! against the destination documents by identity key and written into their
//! code slots. The [`batch`] runners drive this over whole project folders
//! and report through a [`report::Reporter`].
//!
//! # Conventions
//!
//! - **Errors**: typed `thiserror` enums in [`error`], each mapped to a stable
//!   [`error::ErrorCode`]. Per-item failures become notes, not `Err`s.
//! - **Logging**: `tracing` macros. Notes are the user-facing channel.

pub mod batch;
pub mod config;
pub mod error;
pub mod event;
pub mod outcome;
pub mod project;
pub mod report;
pub mod room;
pub mod scan;
pub mod xml;

pub use batch::{BatchSummary, OutputOptions, RestoreOptions};
pub use error::{ErrorCode, PreconditionFailure};
pub use outcome::MatchOutcome;
pub use report::{Note, NoteLog, Reporter, Severity, StdoutReporter};
