//! Geodatabase container discovery
//!
//! A container is any directory below the root whose name ends in `.gdb`.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory suffix identifying a File Geodatabase
pub const GDB_EXTENSION: &str = ".gdb";

/// Check if a directory name denotes a geodatabase container
///
/// Only the suffix counts; names need not be valid UTF-8.
pub fn is_gdb_name(name: &OsStr) -> bool {
    name.as_encoded_bytes().ends_with(GDB_EXTENSION.as_bytes())
}

/// Find every `.gdb` directory under `root`, at any depth
///
/// The root itself is never reported. Unreadable subdirectories are
/// logged and skipped; an empty result is not an error. Paths come back
/// sorted by file name within each directory.
pub fn discover_containers(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable path during discovery");
                continue;
            }
        };

        if is_container(&entry) {
            debug!(path = %entry.path().display(), "Found geodatabase");
            found.push(entry.into_path());
        }
    }

    found
}

fn is_container(entry: &DirEntry) -> bool {
    if !is_gdb_name(entry.file_name()) {
        return false;
    }

    // Symlinked directories are reported but not followed
    entry.file_type().is_dir() || (entry.path_is_symlink() && entry.path().is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_gdb_name() {
        assert!(is_gdb_name(OsStr::new("City.gdb")));
        assert!(is_gdb_name(OsStr::new(".gdb")));
        assert!(is_gdb_name(OsStr::new("Año_2024.gdb")));
        assert!(!is_gdb_name(OsStr::new("City.gdb.bak")));
        assert!(!is_gdb_name(OsStr::new("City")));
    }

    #[test]
    fn test_finds_nested_containers() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("a.gdb")).unwrap();
        fs::create_dir_all(root.join("x/y/z/deep.gdb")).unwrap();
        fs::create_dir_all(root.join("x/plain")).unwrap();
        fs::write(root.join("x/file.gdb"), b"not a directory").unwrap();

        let found = discover_containers(root);
        assert_eq!(
            found,
            vec![root.join("a.gdb"), root.join("x/y/z/deep.gdb")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_container_names() {
        use std::os::unix::ffi::OsStrExt;

        let name = OsStr::from_bytes(b"caf\xe9.gdb");
        assert!(is_gdb_name(name));
        assert!(!is_gdb_name(OsStr::from_bytes(b"caf\xe9.txt")));

        let dir = tempdir().unwrap();
        let path = dir.path().join(name);
        if fs::create_dir(&path).is_err() {
            // Filesystem rejects non-UTF-8 names
            return;
        }
        fs::create_dir(dir.path().join(".gdb")).unwrap();

        let found = discover_containers(dir.path());
        assert_eq!(found, vec![dir.path().join(".gdb"), path]);
    }

    #[test]
    fn test_root_itself_not_reported() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("top.gdb");
        fs::create_dir_all(root.join("inner.gdb")).unwrap();

        assert_eq!(discover_containers(&root), vec![root.join("inner.gdb")]);
    }

    #[test]
    fn test_empty_tree() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nothing/here")).unwrap();
        assert!(discover_containers(dir.path()).is_empty());
    }
}
