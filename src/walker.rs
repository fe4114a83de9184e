//! Directory listing for the engines.
//!
//! Every listing checks once, up front, that the target is an existing
//! directory. Entries are returned sorted by file name so that repeated runs
//! over the same tree see files in the same order.

use crate::error::{TidyError, TidyResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Snapshot of a file taken while listing a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Full path to the file.
    pub path: PathBuf,
    /// The file name, without directories.
    pub name: String,
    /// Lowercased extension without the dot. Empty if the file has none.
    pub extension: String,
    /// Size in bytes at listing time.
    pub size: u64,
}

impl FileEntry {
    /// Builds an entry from a path and its metadata.
    pub fn new(path: PathBuf, size: u64) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            path,
            name,
            extension,
            size,
        }
    }
}

/// Files found by a listing, plus anything that could not be read.
#[derive(Debug, Default)]
pub struct Listing {
    pub entries: Vec<FileEntry>,
    /// Paths that failed during enumeration, with the reason.
    pub unreadable: Vec<(PathBuf, String)>,
}

/// Fails with [`TidyError::DirectoryNotFound`] unless `dir` is an existing directory.
pub fn ensure_directory(dir: &Path) -> TidyResult<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(TidyError::DirectoryNotFound {
            path: dir.to_path_buf(),
        })
    }
}

/// Returns true if anything at all sits at `path`, including a dangling symlink.
pub fn is_occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Lists the files directly inside `dir`.
///
/// Subdirectories are skipped. A symbolic link that resolves to a regular
/// file is listed like the file itself.
pub fn list_immediate(dir: &Path) -> TidyResult<Listing> {
    ensure_directory(dir)?;

    let read_dir = fs::read_dir(dir).map_err(|e| TidyError::file_io(dir, e))?;
    let mut listing = Listing::default();

    for entry in read_dir {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                listing.unreadable.push((dir.to_path_buf(), e.to_string()));
                continue;
            }
        };
        let path = entry.path();
        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {
                listing.entries.push(FileEntry::new(path, metadata.len()));
            }
            Ok(_) => {}
            Err(e) => listing.unreadable.push((path, e.to_string())),
        }
    }

    listing.entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(listing)
}

/// Lists every regular file below `dir`, at any depth.
///
/// Symbolic links are neither followed nor listed. Traversal order is by file
/// name within each directory, so it is stable for an unchanged tree.
pub fn list_recursive(dir: &Path) -> TidyResult<Listing> {
    ensure_directory(dir)?;

    let mut listing = Listing::default();

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dir.to_path_buf());
                listing.unreadable.push((path, e.to_string()));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        match entry.metadata() {
            Ok(metadata) => listing
                .entries
                .push(FileEntry::new(entry.into_path(), metadata.len())),
            Err(e) => listing
                .unreadable
                .push((entry.path().to_path_buf(), e.to_string())),
        }
    }

    Ok(listing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(listing: &Listing) -> Vec<&str> {
        listing.entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_occupied() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(temp_dir.path().join("target"), &link).unwrap();

        assert!(!link.exists());
        assert!(is_occupied(&link));
        assert!(!is_occupied(&temp_dir.path().join("free")));
    }

    #[test]
    fn test_file_entry_fields() {
        let entry = FileEntry::new(PathBuf::from("/tmp/Photo.JPG"), 42);
        assert_eq!(entry.name, "Photo.JPG");
        assert_eq!(entry.extension, "jpg");
        assert_eq!(entry.size, 42);

        let bare = FileEntry::new(PathBuf::from("/tmp/Makefile"), 0);
        assert_eq!(bare.extension, "");
    }

    #[test]
    fn test_missing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let missing = temp_dir.path().join("nope");

        assert!(matches!(
            list_immediate(&missing),
            Err(TidyError::DirectoryNotFound { .. })
        ));
        assert!(matches!(
            list_recursive(&missing),
            Err(TidyError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_file_is_not_a_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let file = temp_dir.path().join("plain.txt");
        fs::write(&file, "x").unwrap();

        assert!(matches!(
            ensure_directory(&file),
            Err(TidyError::DirectoryNotFound { .. })
        ));
    }

    #[test]
    fn test_list_immediate_skips_subdirectories() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("b.txt"), "b").unwrap();
        fs::write(base.join("a.txt"), "aa").unwrap();
        fs::create_dir(base.join("sub")).unwrap();
        fs::write(base.join("sub").join("c.txt"), "c").unwrap();

        let listing = list_immediate(base).unwrap();
        assert_eq!(names(&listing), vec!["a.txt", "b.txt"]);
        assert_eq!(listing.entries[0].size, 2);
        assert!(listing.unreadable.is_empty());
    }

    #[test]
    fn test_list_recursive_descends() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("top.txt"), "t").unwrap();
        fs::create_dir_all(base.join("x").join("y")).unwrap();
        fs::write(base.join("x").join("mid.txt"), "m").unwrap();
        fs::write(base.join("x").join("y").join("deep.txt"), "d").unwrap();

        let listing = list_recursive(base).unwrap();
        let mut found = names(&listing);
        found.sort();
        assert_eq!(found, vec!["deep.txt", "mid.txt", "top.txt"]);
    }

    #[test]
    fn test_list_recursive_order_is_stable() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        for name in ["c", "a", "b"] {
            fs::write(base.join(name), name).unwrap();
        }

        let first = list_recursive(base).unwrap();
        let second = list_recursive(base).unwrap();
        assert_eq!(names(&first), vec!["a", "b", "c"]);
        assert_eq!(first.entries, second.entries);
    }

    #[cfg(unix)]
    #[test]
    fn test_list_recursive_skips_symlinks() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();
        fs::write(base.join("real.txt"), "r").unwrap();
        std::os::unix::fs::symlink(base.join("real.txt"), base.join("link.txt")).unwrap();

        let listing = list_recursive(base).unwrap();
        assert_eq!(names(&listing), vec!["real.txt"]);
    }
}
