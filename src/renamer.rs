/// Bulk renaming of the files directly inside one directory.
///
/// New names come from literal substring replacement or from a regular
/// expression substitution. A rename never overwrites an existing file: when
/// the new name is taken the file is skipped and the collision is reported.
use crate::error::{TidyError, TidyResult};
use crate::report::{Operation, OperationReport};
use crate::walker;
use log::{debug, info, warn};
use regex::Regex;
use std::fs;
use std::path::Path;

/// How a file name is rewritten.
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Replace every occurrence of a literal substring.
    Literal(String),
    /// Replace every match of a compiled regular expression.
    Regex(Regex),
}

impl NamePattern {
    /// Builds a pattern, compiling it when `use_regex` is set.
    pub fn new(pattern: &str, use_regex: bool) -> TidyResult<Self> {
        if use_regex {
            Regex::new(pattern)
                .map(Self::Regex)
                .map_err(|e| TidyError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })
        } else {
            Ok(Self::Literal(pattern.to_string()))
        }
    }

    /// Applies the pattern to a file name.
    ///
    /// In regex mode `replacement` may refer to capture groups as `$1` or `${name}`.
    pub fn apply(&self, name: &str, replacement: &str) -> String {
        match self {
            Self::Literal(pattern) => name.replace(pattern.as_str(), replacement),
            Self::Regex(regex) => regex.replace_all(name, replacement).into_owned(),
        }
    }
}

/// Renames files by pattern.
#[derive(Debug, Default, Clone, Copy)]
pub struct Renamer;

impl Renamer {
    pub fn new() -> Self {
        Self
    }

    /// Renames every file directly inside `dir` whose name the pattern changes.
    ///
    /// Returns an error only when `dir` is not a directory or the regex does not
    /// compile; in both cases nothing is renamed. Per-file failures end up in
    /// the report and do not stop the batch.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidykit::renamer::Renamer;
    /// use std::path::Path;
    ///
    /// let report = Renamer::new()
    ///     .rename(Path::new("/path/to/photos"), "IMG_", "holiday_", false)
    ///     .unwrap();
    /// println!("{} files renamed", report.summary().renamed);
    /// ```
    pub fn rename(
        &self,
        dir: &Path,
        pattern: &str,
        replacement: &str,
        use_regex: bool,
    ) -> TidyResult<OperationReport> {
        walker::ensure_directory(dir)?;
        let name_pattern = NamePattern::new(pattern, use_regex)?;

        info!("Renaming files in {}", dir.display());
        let mut report = OperationReport::new(Operation::Rename, dir);
        report.info(format!("Starting bulk rename operation in: {}", dir.display()));
        report.info(format!("Pattern: '{}' -> Replacement: '{}'", pattern, replacement));
        report.info(format!("Regex mode: {}", use_regex));

        let listing = walker::list_immediate(dir)?;
        for (path, reason) in &listing.unreadable {
            warn!("Could not read {}: {}", path.display(), reason);
            report.error(format!("Error reading '{}': {}", path.display(), reason));
        }

        for entry in &listing.entries {
            let old_name = entry.name.as_str();
            let new_name = name_pattern.apply(old_name, replacement);

            if new_name == old_name {
                continue;
            }

            if !is_valid_file_name(&new_name) {
                report.error(format!(
                    "Error renaming '{}': '{}' is not a valid file name",
                    old_name, new_name
                ));
                continue;
            }

            let new_path = dir.join(&new_name);
            if walker::is_occupied(&new_path) {
                debug!("Skipping {}: {} already exists", old_name, new_name);
                report.warning(format!(
                    "Skipped '{}': target name already exists",
                    old_name
                ));
                report.summary_mut().skipped += 1;
                continue;
            }

            match fs::rename(&entry.path, &new_path) {
                Ok(()) => {
                    debug!("Renamed {} -> {}", old_name, new_name);
                    report.success(format!("Renamed: '{}' -> '{}'", old_name, new_name));
                    report.summary_mut().renamed += 1;
                }
                Err(e) => {
                    warn!("Failed to rename {}: {}", entry.path.display(), e);
                    report.error(format!("Error renaming '{}': {}", old_name, e));
                }
            }
        }

        let summary = report.summary().clone();
        report.info(format!(
            "Summary: {} files renamed, {} skipped, {} errors",
            summary.renamed, summary.skipped, summary.errors
        ));
        info!(
            "Rename finished: {} renamed, {} skipped, {} errors",
            summary.renamed, summary.skipped, summary.errors
        );

        Ok(report)
    }
}

/// A new name must be a single, non-empty path component.
fn is_valid_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains(std::path::MAIN_SEPARATOR)
}
