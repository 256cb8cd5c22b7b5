//! Project folders: preconditions, enumeration and whole-file I/O.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{IoFailure, PreconditionFailure};

/// Project file extension of the XML-based (1.x) generation.
pub const LEGACY_MARKER: &str = "gmx";
/// Project file extension of the JSON-based (2.x) generation.
pub const MODERN_MARKER: &str = "yyp";

/// Check that `root` is set, exists, and directly contains a `*.{marker}` file.
///
/// # Errors
///
/// Returns the first failing [`PreconditionFailure`].
pub fn check_project_root(root: &Path, marker: &str) -> Result<(), PreconditionFailure> {
    if root.as_os_str().is_empty() {
        return Err(PreconditionFailure::EmptyRoot);
    }
    if !root.is_dir() {
        return Err(PreconditionFailure::RootMissing(root.to_path_buf()));
    }

    let has_marker = fs::read_dir(root)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
                .any(|entry| has_extension(&entry.path(), marker))
        })
        .unwrap_or(false);

    if has_marker {
        Ok(())
    } else {
        Err(PreconditionFailure::MarkerMissing {
            root: root.to_path_buf(),
            suffix: marker.to_string(),
        })
    }
}

/// Check that an export or source folder is set and exists.
///
/// # Errors
///
/// [`PreconditionFailure::EmptyRoot`] or [`PreconditionFailure::RootMissing`].
pub fn check_folder(root: &Path) -> Result<(), PreconditionFailure> {
    if root.as_os_str().is_empty() {
        Err(PreconditionFailure::EmptyRoot)
    } else if root.is_dir() {
        Ok(())
    } else {
        Err(PreconditionFailure::RootMissing(root.to_path_buf()))
    }
}

/// True when `path` has extension `ext`, compared case-insensitively.
#[must_use]
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|found| found.to_str())
        .is_some_and(|found| found.eq_ignore_ascii_case(ext))
}

/// Every regular file under `root` with extension `ext`, sorted by path.
///
/// Unreadable directory entries are skipped.
#[must_use]
pub fn find_files(root: &Path, ext: &str) -> Vec<PathBuf> {
    let files: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), ext))
        .map(walkdir::DirEntry::into_path)
        .collect();
    debug!(root = %root.display(), ext, count = files.len(), "enumerated files");
    files
}

/// Immediate subdirectories of `root`, sorted by name. A missing root yields
/// nothing.
#[must_use]
pub fn subdirectories(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir())
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Regular files directly inside `dir` with extension `ext`, sorted by name.
#[must_use]
pub fn files_in(dir: &Path, ext: &str) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file() && has_extension(entry.path(), ext))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// File name with every extension removed: `obj_a.object.gmx` is `obj_a`.
#[must_use]
pub fn base_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.find('.') {
        Some(dot) => name[..dot].to_string(),
        None => name,
    }
}

/// Read a whole file as bytes.
///
/// # Errors
///
/// [`IoFailure::Read`] naming the path.
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, IoFailure> {
    fs::read(path).map_err(|source| IoFailure::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a whole file as UTF-8 text.
///
/// # Errors
///
/// [`IoFailure::Read`] naming the path, also when the file is not UTF-8.
pub fn read_text(path: &Path) -> Result<String, IoFailure> {
    fs::read_to_string(path).map_err(|source| IoFailure::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Overwrite `path` with `bytes`.
///
/// # Errors
///
/// [`IoFailure::Write`] naming the path.
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), IoFailure> {
    fs::write(path, bytes).map_err(|source| IoFailure::Write {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("mkdir");
        }
        fs::write(&path, b"").expect("write");
        path
    }

    #[test]
    fn empty_root_is_rejected() {
        assert_eq!(
            check_project_root(Path::new(""), MODERN_MARKER),
            Err(PreconditionFailure::EmptyRoot)
        );
    }

    #[test]
    fn missing_root_is_rejected() {
        let tmp = TempDir::new().expect("tempdir");
        let missing = tmp.path().join("nope");
        assert_eq!(
            check_project_root(&missing, MODERN_MARKER),
            Err(PreconditionFailure::RootMissing(missing))
        );
    }

    #[test]
    fn marker_is_matched_case_insensitively_in_root_only() {
        let tmp = TempDir::new().expect("tempdir");
        touch(tmp.path(), "nested/game.yyp");
        assert!(matches!(
            check_project_root(tmp.path(), MODERN_MARKER),
            Err(PreconditionFailure::MarkerMissing { .. })
        ));

        touch(tmp.path(), "Game.YYP");
        assert_eq!(check_project_root(tmp.path(), MODERN_MARKER), Ok(()));
    }

    #[test]
    fn find_files_is_recursive_and_sorted() {
        let tmp = TempDir::new().expect("tempdir");
        touch(tmp.path(), "scripts/b/b.gml");
        touch(tmp.path(), "scripts/a/a.GML");
        touch(tmp.path(), "scripts/a/a.yy");

        let found = find_files(tmp.path(), "gml");
        let names: Vec<_> = found
            .iter()
            .map(|path| path.strip_prefix(tmp.path()).expect("prefix").to_path_buf())
            .collect();
        assert_eq!(
            names,
            [
                PathBuf::from("scripts/a/a.GML"),
                PathBuf::from("scripts/b/b.gml")
            ]
        );
    }

    #[test]
    fn base_name_drops_compound_extension() {
        assert_eq!(base_name(Path::new("objects/obj_a.object.gmx")), "obj_a");
        assert_eq!(base_name(Path::new("Rooms/rm_start.xml")), "rm_start");
        assert_eq!(base_name(Path::new("README")), "README");
    }

    #[test]
    fn read_failure_names_path() {
        let err = read_text(Path::new("/definitely/not/here.gml")).expect_err("missing");
        assert!(err.to_string().contains("/definitely/not/here.gml"));
    }
}
