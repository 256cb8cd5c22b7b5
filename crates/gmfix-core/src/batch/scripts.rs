use std::path::Path;

use tracing::debug;

use crate::batch::{Batch, BatchSummary, display_path};
use crate::error::PreconditionFailure;
use crate::project::{self, MODERN_MARKER};
use crate::report::Reporter;
use crate::scan::{GateDecision, KeywordGate, replace_all};

const SCRIPT_EXT: &str = "gml";

/// Rewrite `gate.target` to `gate.replacement` in every script under `root`.
///
/// A script is touched only when it contains the target as a whole word and
/// none of the stop-words. Skipped scripts get an info note naming the
/// stop-word that vetoed them.
///
/// # Errors
///
/// Returns the [`PreconditionFailure`] if `root` is not a 2.x project folder.
/// Nothing is read or written in that case.
pub fn rewrite_keyword(
    root: &Path,
    gate: &KeywordGate,
    reporter: &mut dyn Reporter,
) -> Result<BatchSummary, PreconditionFailure> {
    let mut batch = Batch::new(reporter);
    if let Err(failure) = project::check_project_root(root, MODERN_MARKER) {
        return Err(batch.reject(failure));
    }

    for path in project::find_files(root, SCRIPT_EXT) {
        let Some(data) = batch.read_bytes(&path) else {
            continue;
        };
        let shown = display_path(root, &path);

        match gate.apply(&data) {
            (GateDecision::NoTarget, _) => debug!(file = %shown, "no target keyword"),
            (GateDecision::StopWord(word), _) => {
                batch.info(format!("Ignore file \"{shown}\", contains stop-word \"{word}\""));
            }
            (GateDecision::Rewrite, Some(rewritten)) => {
                if batch.write(&path, &rewritten) {
                    batch.info(format!(
                        "Replaced '{}' to '{}' in file \"{shown}\"",
                        gate.target, gate.replacement
                    ));
                }
            }
            (GateDecision::Rewrite, None) => {}
        }
    }

    Ok(batch.finish())
}

/// [`rewrite_keyword`] with the `break` to `exit` gate.
///
/// # Errors
///
/// See [`rewrite_keyword`].
pub fn break_to_exit(
    root: &Path,
    reporter: &mut dyn Reporter,
) -> Result<BatchSummary, PreconditionFailure> {
    rewrite_keyword(root, &KeywordGate::default(), reporter)
}

/// Apply each `(from, to)` pair as a verbatim substring replacement to every
/// script under `root`, in order.
///
/// Only scripts whose bytes change are written. Pairs with an empty `from`
/// are ignored. One note is emitted per pair that changed a file.
///
/// # Errors
///
/// Returns the [`PreconditionFailure`] if `root` is not a 2.x project folder.
pub fn replace_tokens(
    root: &Path,
    pairs: &[(String, String)],
    reporter: &mut dyn Reporter,
) -> Result<BatchSummary, PreconditionFailure> {
    let mut batch = Batch::new(reporter);
    if let Err(failure) = project::check_project_root(root, MODERN_MARKER) {
        return Err(batch.reject(failure));
    }

    let pairs: Vec<_> = pairs.iter().filter(|(from, _)| !from.is_empty()).collect();

    for path in project::find_files(root, SCRIPT_EXT) {
        let Some(original) = batch.read_bytes(&path) else {
            continue;
        };
        let shown = display_path(root, &path);

        let mut data = original.clone();
        let mut applied = Vec::new();
        for (from, to) in &pairs {
            let next = replace_all(&data, from.as_bytes(), to.as_bytes());
            if next != data {
                applied.push((from, to));
                data = next;
            }
        }

        if data == original || !batch.write(&path, &data) {
            continue;
        }
        for (from, to) in applied {
            batch.info(format!("Replaced \"{from}\" to \"{to}\" in file \"{shown}\""));
        }
    }

    Ok(batch.finish())
}
