use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info_span};

use crate::batch::{Batch, BatchSummary, OutputOptions, display_path};
use crate::error::PreconditionFailure;
use crate::event::{ActionFormat, LegacyEventRecord, extract_event, transplant_events};
use crate::project::{self, LEGACY_MARKER};
use crate::report::Reporter;
use crate::room::{RoomCodeOutcome, extract_room, transplant_room};

/// Which artifact kinds [`restore_codes`] visits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreOptions {
    pub scripts: bool,
    pub objects: bool,
    pub rooms: bool,
    pub output: OutputOptions,
}

impl Default for RestoreOptions {
    fn default() -> Self {
        Self {
            scripts: true,
            objects: true,
            rooms: true,
            output: OutputOptions::default(),
        }
    }
}

/// Copy script, event and room codes from a split export into a 1.x project.
///
/// `split` is the folder written by the splitting tool (`Scripts/`,
/// `Objects/<name>/`, `Rooms/`); `project_dir` is the folder holding the `*.gmx`
/// project file. Destination documents are rewritten in place, and only when
/// a code actually differs.
///
/// # Errors
///
/// Returns the [`PreconditionFailure`] if either folder is unusable. Nothing
/// is read or written in that case.
pub fn restore_codes(
    split: &Path,
    project_dir: &Path,
    options: &RestoreOptions,
    reporter: &mut dyn Reporter,
) -> Result<BatchSummary, PreconditionFailure> {
    let mut batch = Batch::new(reporter);
    let checked = project::check_folder(split)
        .and_then(|()| project::check_project_root(project_dir, LEGACY_MARKER));
    if let Err(failure) = checked {
        return Err(batch.reject(failure));
    }

    if options.scripts {
        let _span = info_span!("scripts").entered();
        restore_scripts(&mut batch, split, project_dir);
    }
    if options.objects {
        let _span = info_span!("objects").entered();
        restore_objects(&mut batch, split, project_dir, options.output);
    }
    if options.rooms {
        let _span = info_span!("rooms").entered();
        restore_rooms(&mut batch, split, project_dir, options.output);
    }

    Ok(batch.finish())
}

fn restore_scripts(batch: &mut Batch<'_>, split: &Path, project_dir: &Path) {
    for source in project::find_files(&split.join("Scripts"), "gml") {
        let name = project::base_name(&source);
        let destination = project_dir.join("scripts").join(format!("{name}.gml"));
        if !destination.is_file() {
            batch.error(format!("Script \"{name}\" not found in project"));
            continue;
        }

        let Some(code) = batch.read_bytes(&source) else {
            continue;
        };
        let Some(current) = batch.read_bytes(&destination) else {
            continue;
        };
        if code == current {
            debug!(script = %name, "script unchanged");
            continue;
        }
        if batch.write(&destination, &code) {
            batch.info(format!("Restored script \"{name}\""));
        }
    }
}

fn restore_objects(batch: &mut Batch<'_>, split: &Path, project_dir: &Path, output: OutputOptions) {
    let objects = project_dir.join("objects");
    let mut exported = BTreeSet::new();

    for dir in project::subdirectories(&split.join("Objects")) {
        let name = project::base_name(&dir);
        exported.insert(name.clone());

        let destination = objects.join(format!("{name}.object.gmx"));
        if !destination.is_file() {
            batch.error(format!("Object \"{name}\" not found in project"));
            continue;
        }

        let records = read_event_records(batch, split, &dir);
        let Some(text) = batch.read_text(&destination) else {
            continue;
        };

        let result = match transplant_events(&text, &records) {
            Ok(result) => result,
            Err(err) => {
                batch.error(format!(
                    "Failed to parse \"{}\": {err}",
                    display_path(project_dir, &destination)
                ));
                continue;
            }
        };

        for (key, outcome) in &result.outcomes {
            batch.note(outcome.to_note(&format!("{name} {key}")));
        }
        for key in &result.unmatched {
            batch.error(format!("{name} {key}: exported event has no match in project"));
        }

        if let Some(rewritten) = result.output {
            let rewritten = output.normalize(&rewritten);
            if batch.write(&destination, rewritten.as_bytes()) {
                batch.info(format!(
                    "Updated object \"{name}\", {} code(s) changed",
                    result.slots_changed
                ));
            }
        }
    }

    for path in project::files_in(&objects, "gmx") {
        let name = project::base_name(&path);
        if !exported.contains(&name) {
            batch.info(format!("Object \"{name}\" has no exported events"));
        }
    }
}

/// Parse every event file of one exported object, sorted by file name.
/// Unreadable or malformed files are noted and left out.
fn read_event_records(batch: &mut Batch<'_>, split: &Path, dir: &Path) -> Vec<LegacyEventRecord> {
    let mut records = Vec::new();
    for path in project::files_in(dir, "xml") {
        let Some(text) = batch.read_text(&path) else {
            continue;
        };
        match extract_event(&text, ActionFormat::Split) {
            Ok(record) => records.push(record),
            Err(err) => batch.error(format!(
                "Failed to parse \"{}\": {err}",
                display_path(split, &path)
            )),
        }
    }
    records
}

fn restore_rooms(batch: &mut Batch<'_>, split: &Path, project_dir: &Path, output: OutputOptions) {
    for source in project::files_in(&split.join("Rooms"), "xml") {
        let name = project::base_name(&source);
        let destination = project_dir.join("rooms").join(format!("{name}.room.gmx"));
        if !destination.is_file() {
            batch.error(format!("Room \"{name}\" not found in project"));
            continue;
        }

        let Some(text) = batch.read_text(&source) else {
            continue;
        };
        let legacy = match extract_room(&text) {
            Ok(room) => room,
            Err(err) => {
                batch.error(format!(
                    "Failed to parse \"{}\": {err}",
                    display_path(split, &source)
                ));
                continue;
            }
        };

        let Some(text) = batch.read_text(&destination) else {
            continue;
        };
        let result = match transplant_room(&text, &legacy) {
            Ok(result) => result,
            Err(err) => {
                batch.error(format!(
                    "Failed to parse \"{}\": {err}",
                    display_path(project_dir, &destination)
                ));
                continue;
            }
        };

        if let Some((exported, found)) = result.length_mismatch {
            batch.error(format!(
                "Room \"{name}\": instance count mismatch, export has {exported}, project has {found}"
            ));
        }
        for (index, outcome) in &result.outcomes {
            batch.note(outcome.to_note(&format!("{name} instance #{index}")));
        }
        match result.room_code {
            RoomCodeOutcome::MissingField => {
                batch.error(format!("Room \"{name}\" has no <code> element"));
            }
            RoomCodeOutcome::Updated => batch.info(format!("Room \"{name}\": room code restored")),
            RoomCodeOutcome::Unchanged | RoomCodeOutcome::NoSource => {}
        }

        if let Some(rewritten) = result.output {
            let rewritten = output.normalize(&rewritten);
            if batch.write(&destination, rewritten.as_bytes()) {
                batch.info(format!(
                    "Updated room \"{name}\", {} code(s) changed",
                    result.fields_changed
                ));
            }
        }
    }
}
