/// File organization system for moving files into category directories.
///
/// This module sorts the files directly inside a base directory into
/// subdirectories named after their category. Category directories are created
/// on demand, and name clashes inside a category directory are resolved by
/// appending `_1`, `_2`, ... to the file stem.
use crate::error::{TidyError, TidyResult};
use crate::file_category::CategoryTable;
use crate::report::{Operation, OperationReport};
use crate::walker::{self, FileEntry};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Where a single file would go when the directory is sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    /// The current path of the file.
    pub source: PathBuf,
    /// The path the file will be moved to.
    pub destination: PathBuf,
    /// The category the file belongs to.
    pub category: String,
}

impl PlannedMove {
    /// Returns true if the destination name differs from the source name.
    pub fn is_renamed(&self) -> bool {
        self.source.file_name() != self.destination.file_name()
    }
}

/// Sorts files into category subdirectories.
///
/// The category table is fixed at construction; the organizer keeps no other
/// state between calls.
#[derive(Debug, Clone, Default)]
pub struct FileOrganizer {
    categories: CategoryTable,
}

impl FileOrganizer {
    /// Creates an organizer using the given category table.
    pub fn new(categories: CategoryTable) -> Self {
        Self { categories }
    }

    /// Returns the category table in use.
    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Moves every file directly inside `dir` into its category directory.
    ///
    /// Fails only if `dir` is not a directory. Files that cannot be moved are
    /// reported and the rest of the batch carries on.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidykit::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let report = FileOrganizer::default().sort(Path::new("/path/to/downloads")).unwrap();
    /// for (category, count) in &report.summary().per_category {
    ///     println!("{}: {}", category, count);
    /// }
    /// ```
    pub fn sort(&self, dir: &Path) -> TidyResult<OperationReport> {
        walker::ensure_directory(dir)?;

        info!("Sorting files in {}", dir.display());
        let mut report = OperationReport::new(Operation::Sort, dir);
        report.info(format!(
            "Starting file sorting operation in: {}",
            dir.display()
        ));

        let listing = walker::list_immediate(dir)?;
        for (path, reason) in &listing.unreadable {
            warn!("Could not read {}: {}", path.display(), reason);
            report.error(format!("Error reading '{}': {}", path.display(), reason));
        }

        for entry in &listing.entries {
            match self.move_to_category(dir, entry) {
                Ok(None) => {
                    debug!("{} is already in place", entry.path.display());
                }
                Ok(Some(planned)) => {
                    let moved_name = planned
                        .destination
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    if planned.is_renamed() {
                        report.success(format!(
                            "Moved '{}' to {}/ as '{}'",
                            entry.name, planned.category, moved_name
                        ));
                    } else {
                        report.success(format!("Moved '{}' to {}/", entry.name, planned.category));
                    }
                    let summary = report.summary_mut();
                    summary.moved += 1;
                    *summary.per_category.entry(planned.category).or_insert(0) += 1;
                }
                Err(e) => {
                    warn!("Failed to move {}: {}", entry.path.display(), e);
                    report.error(format!("Error moving '{}': {}", entry.name, e));
                }
            }
        }

        report.info("Category Summary:");
        let per_category: Vec<(String, usize)> = report
            .summary()
            .per_category
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        for (category, count) in per_category {
            report.info(format!(
                "  {}: {} {}",
                category,
                count,
                if count == 1 { "file" } else { "files" }
            ));
        }

        let summary = report.summary().clone();
        report.info(format!(
            "Total: {} files organized, {} errors",
            summary.moved, summary.errors
        ));
        info!(
            "Sort finished: {} moved, {} errors",
            summary.moved, summary.errors
        );

        Ok(report)
    }

    /// Computes where each file directly inside `dir` would be moved, without
    /// touching the filesystem.
    ///
    /// Collisions are resolved against the files already present in the
    /// category directories and against earlier planned moves.
    pub fn plan(&self, dir: &Path) -> TidyResult<Vec<PlannedMove>> {
        let listing = walker::list_immediate(dir)?;
        let mut claimed: Vec<PathBuf> = Vec::new();
        let mut moves = Vec::new();

        for entry in &listing.entries {
            let category = self.categories.categorize(&entry.extension).to_string();
            let category_path = dir.join(&category);
            let destination = free_destination(&category_path, &entry.path, |candidate| {
                walker::is_occupied(candidate) || claimed.iter().any(|c| c == candidate)
            });
            if destination == entry.path {
                continue;
            }
            claimed.push(destination.clone());
            moves.push(PlannedMove {
                source: entry.path.clone(),
                destination,
                category,
            });
        }

        Ok(moves)
    }

    /// Moves one file into its category directory.
    ///
    /// Returns `Ok(None)` when the file is already where it belongs.
    fn move_to_category(&self, base_path: &Path, entry: &FileEntry) -> TidyResult<Option<PlannedMove>> {
        let category = self.categories.categorize(&entry.extension).to_string();
        let category_path = base_path.join(&category);

        fs::create_dir_all(&category_path).map_err(|e| TidyError::file_io(&category_path, e))?;

        let destination = free_destination(&category_path, &entry.path, walker::is_occupied);
        if destination == entry.path {
            return Ok(None);
        }

        fs::rename(&entry.path, &destination).map_err(|e| TidyError::file_io(&entry.path, e))?;

        Ok(Some(PlannedMove {
            source: entry.path.clone(),
            destination,
            category,
        }))
    }
}

/// Picks a destination for `source` inside `category_path`.
///
/// Keeps the original name when it is free (or is the source itself), and
/// otherwise appends `_N` to the stem, counting from 1, keeping the extension.
fn free_destination<F>(category_path: &Path, source: &Path, is_taken: F) -> PathBuf
where
    F: Fn(&Path) -> bool,
{
    let file_name = source.file_name().unwrap_or_default();
    let destination = category_path.join(file_name);
    if destination == source || !is_taken(&destination) {
        return destination;
    }

    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1usize;
    loop {
        let candidate = category_path.join(format!("{}_{}{}", stem, counter, extension));
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_sort_creates_category_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let file_path = base_path.join("test.txt");
        fs::write(&file_path, "test content").expect("Failed to write test file");

        let report = FileOrganizer::default().sort(base_path).expect("Sort failed");

        let category_dir = base_path.join("Documents");
        assert!(category_dir.is_dir());
        assert!(!file_path.exists());
        assert!(category_dir.join("test.txt").exists());
        assert_eq!(report.summary().moved, 1);
        assert_eq!(report.summary().per_category.get("Documents"), Some(&1));
    }

    #[test]
    fn test_sort_uses_existing_directory() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let category_dir = base_path.join("Images");
        fs::create_dir(&category_dir).expect("Failed to create category directory");
        fs::write(base_path.join("test.png"), "png").expect("Failed to write test file");

        FileOrganizer::default().sort(base_path).expect("Sort failed");

        assert!(category_dir.join("test.png").exists());
    }

    #[test]
    fn test_collision_appends_counter() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let images = base_path.join("Images");
        fs::create_dir(&images).unwrap();
        fs::write(images.join("photo.JPG"), "old").unwrap();
        fs::write(images.join("photo_1.JPG"), "older").unwrap();
        fs::write(base_path.join("photo.JPG"), "new").unwrap();

        let report = FileOrganizer::default().sort(base_path).expect("Sort failed");

        assert_eq!(fs::read_to_string(images.join("photo.JPG")).unwrap(), "old");
        assert_eq!(fs::read_to_string(images.join("photo_1.JPG")).unwrap(), "older");
        assert_eq!(fs::read_to_string(images.join("photo_2.JPG")).unwrap(), "new");
        assert!(report.contains("as 'photo_2.JPG'"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_counts_as_taken() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        let images = base_path.join("Images");
        fs::create_dir(&images).unwrap();
        std::os::unix::fs::symlink(base_path.join("missing.jpg"), images.join("p.jpg")).unwrap();
        fs::write(base_path.join("p.jpg"), "picture").unwrap();

        let report = FileOrganizer::default().sort(base_path).expect("Sort failed");

        assert_eq!(report.summary().moved, 1);
        assert!(fs::symlink_metadata(images.join("p.jpg")).unwrap().file_type().is_symlink());
        assert_eq!(fs::read_to_string(images.join("p_1.jpg")).unwrap(), "picture");
    }

    #[test]
    fn test_blocked_category_directory_is_reported() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        // A plain file named like the category keeps the directory from being created.
        fs::write(base_path.join("Documents"), "blocker").unwrap();
        fs::write(base_path.join("A.txt"), "text").unwrap();

        let report = FileOrganizer::default().sort(base_path).expect("Sort failed");

        assert_eq!(report.summary().errors, 1);
        assert!(report.contains("Error moving 'A.txt'"));
        assert!(base_path.join("A.txt").exists());
        // The blocker itself has no extension and is still sorted.
        assert_eq!(report.summary().moved, 1);
        assert!(base_path.join("Others").join("Documents").is_file());
    }

    #[test]
    fn test_unknown_extension_goes_to_fallback() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("data.xyz"), "?").unwrap();
        fs::write(base_path.join("Makefile"), "all:").unwrap();

        let report = FileOrganizer::default().sort(base_path).expect("Sort failed");

        assert!(base_path.join("Others").join("data.xyz").exists());
        assert!(base_path.join("Others").join("Makefile").exists());
        assert_eq!(report.summary().per_category.get("Others"), Some(&2));
    }

    #[test]
    fn test_custom_table() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("scene.blend"), "b").unwrap();
        fs::write(base_path.join("photo.jpg"), "j").unwrap();

        let mut table = CategoryTable::empty("Misc");
        table.add_category("Models", &["blend"]);
        FileOrganizer::new(table).sort(base_path).expect("Sort failed");

        assert!(base_path.join("Models").join("scene.blend").exists());
        assert!(base_path.join("Misc").join("photo.jpg").exists());
    }

    #[test]
    fn test_summary_lines_sorted_by_category() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("a.zip"), "z").unwrap();
        fs::write(base_path.join("b.mp3"), "m").unwrap();
        fs::write(base_path.join("c.mp3"), "n").unwrap();

        let report = FileOrganizer::default().sort(base_path).expect("Sort failed");

        let texts: Vec<&str> = report.lines().iter().map(|l| l.text.as_str()).collect();
        let archives = texts.iter().position(|t| *t == "  Archives: 1 file").unwrap();
        let audio = texts.iter().position(|t| *t == "  Audio: 2 files").unwrap();
        assert!(archives < audio);
        assert_eq!(texts.last(), Some(&"Total: 3 files organized, 0 errors"));
    }

    #[test]
    fn test_plan_does_not_touch_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base_path = temp_dir.path();
        fs::write(base_path.join("song.mp3"), "m").unwrap();

        let plan = FileOrganizer::default().plan(base_path).expect("Plan failed");

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].category, "Audio");
        assert_eq!(plan[0].destination, base_path.join("Audio").join("song.mp3"));
        assert!(base_path.join("song.mp3").exists());
        assert!(!base_path.join("Audio").exists());
    }

    #[test]
    fn test_sort_invalid_base_path() {
        let result = FileOrganizer::default().sort(Path::new("/non/existent/path"));
        assert!(matches!(result, Err(TidyError::DirectoryNotFound { .. })));
    }
}
