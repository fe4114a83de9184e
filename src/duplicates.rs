//! Content-hash duplicate detection.
//!
//! A scan walks the directory tree, fingerprints every file and groups files
//! with identical fingerprints. In each group the first file met during the
//! walk is the canonical copy and is never deleted; the others are duplicates
//! that [`DuplicateFinder::find_duplicates`] can optionally remove.
//!
//! The walk is sorted by file name, and hashing results are collected in walk
//! order even when hashing runs in parallel, so the canonical member of every
//! group is the same from one run to the next.

use crate::error::TidyResult;
use crate::hasher::{self, Fingerprint};
use crate::report::{Operation, OperationReport, format_bytes, format_megabytes};
use crate::walker::{self, FileEntry};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Emit a progress log line every this many hashed files.
const PROGRESS_LOG_INTERVAL: usize = 50;

/// Receives progress while files are being hashed.
///
/// Calls to [`ScanProgress::advance`] may come from several threads at once.
pub trait ScanProgress: Sync {
    /// Called once with the number of files about to be hashed.
    fn begin(&self, _total: u64) {}
    /// Called after each file is hashed, successfully or not.
    fn advance(&self) {}
    /// Called once hashing is done.
    fn finish(&self) {}
}

/// Progress sink that ignores everything.
pub struct NoProgress;

impl ScanProgress for NoProgress {}

/// Tuning knobs for the duplicate scan. None of them change the result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DuplicateOptions {
    /// Hash files on the rayon thread pool instead of one at a time.
    pub parallel: bool,
    /// Only hash files whose size is shared with at least one other file.
    pub size_prefilter: bool,
}

/// Files with identical content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub fingerprint: Fingerprint,
    /// Members in walk order. Always at least two.
    pub entries: Vec<FileEntry>,
}

impl DuplicateGroup {
    /// The copy that is kept.
    pub fn canonical(&self) -> &FileEntry {
        &self.entries[0]
    }

    /// Every member except the canonical one.
    pub fn duplicates(&self) -> &[FileEntry] {
        &self.entries[1..]
    }

    /// Bytes that removing the duplicates would free.
    pub fn reclaimable_bytes(&self) -> u64 {
        self.duplicates().iter().map(|e| e.size).sum()
    }
}

/// Outcome of the scan phase, before anything is deleted.
#[derive(Debug, Default)]
pub struct DuplicateScan {
    /// Number of files found by the walk.
    pub scanned: usize,
    /// Number of files successfully hashed. Lower than `scanned` when the
    /// size prefilter skips files or hashing fails.
    pub hashed: usize,
    /// Groups in the order their first member was met.
    pub groups: Vec<DuplicateGroup>,
    /// Paths the walk could not enumerate, with the reason.
    pub unreadable: Vec<(PathBuf, String)>,
    /// Files that could not be hashed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
}

impl DuplicateScan {
    /// Total number of non-canonical files across all groups.
    pub fn duplicate_count(&self) -> usize {
        self.groups.iter().map(|g| g.entries.len() - 1).sum()
    }
}

/// Finds and optionally removes duplicate files.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    options: DuplicateOptions,
}

impl DuplicateFinder {
    pub fn new(options: DuplicateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DuplicateOptions {
        self.options
    }

    /// Walks `dir` recursively and groups files by content.
    ///
    /// Files that fail to hash are recorded in [`DuplicateScan::failures`] and
    /// take no part in grouping.
    pub fn scan(&self, dir: &Path, progress: &dyn ScanProgress) -> TidyResult<DuplicateScan> {
        let listing = walker::list_recursive(dir)?;
        let mut scan = DuplicateScan {
            scanned: listing.entries.len(),
            unreadable: listing.unreadable,
            ..Default::default()
        };

        let candidates = if self.options.size_prefilter {
            shared_sizes(listing.entries)
        } else {
            listing.entries
        };
        debug!(
            "Hashing {} files under {}",
            candidates.len(),
            dir.display()
        );

        progress.begin(candidates.len() as u64);
        let hashed = self.hash_all(&candidates, progress);
        progress.finish();

        let mut index: HashMap<Fingerprint, usize> = HashMap::new();
        let mut buckets: Vec<DuplicateGroup> = Vec::new();

        for (entry, result) in candidates.into_iter().zip(hashed) {
            match result {
                Ok(fingerprint) => {
                    scan.hashed += 1;
                    match index.get(&fingerprint) {
                        Some(&i) => buckets[i].entries.push(entry),
                        None => {
                            index.insert(fingerprint, buckets.len());
                            buckets.push(DuplicateGroup {
                                fingerprint,
                                entries: vec![entry],
                            });
                        }
                    }
                }
                Err(e) => {
                    warn!("Error hashing {}: {}", entry.path.display(), e);
                    scan.failures.push((entry.path, e.to_string()));
                }
            }
        }

        scan.groups = buckets
            .into_iter()
            .filter(|group| group.entries.len() > 1)
            .collect();

        Ok(scan)
    }

    /// Hashes every entry, returning results in the same order as `entries`.
    fn hash_all(
        &self,
        entries: &[FileEntry],
        progress: &dyn ScanProgress,
    ) -> Vec<io::Result<Fingerprint>> {
        let counter = AtomicUsize::new(0);
        let hash_one = |entry: &FileEntry| {
            let result = hasher::hash_file(&entry.path);
            progress.advance();
            let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
            if done % PROGRESS_LOG_INTERVAL == 0 {
                debug!("Scanned {} files so far", done);
            }
            result
        };

        if self.options.parallel {
            entries.par_iter().map(hash_one).collect()
        } else {
            entries.iter().map(hash_one).collect()
        }
    }

    /// Scans `dir` and reports duplicate groups, deleting duplicates if `remove` is set.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use tidykit::duplicates::DuplicateFinder;
    /// use std::path::Path;
    ///
    /// let report = DuplicateFinder::default()
    ///     .find_duplicates(Path::new("/path/to/photos"), false)
    ///     .unwrap();
    /// println!("{} duplicate groups", report.summary().groups);
    /// ```
    pub fn find_duplicates(&self, dir: &Path, remove: bool) -> TidyResult<OperationReport> {
        self.find_duplicates_with_progress(dir, remove, &NoProgress)
    }

    /// Same as [`find_duplicates`](Self::find_duplicates), feeding hashing progress to `progress`.
    pub fn find_duplicates_with_progress(
        &self,
        dir: &Path,
        remove: bool,
        progress: &dyn ScanProgress,
    ) -> TidyResult<OperationReport> {
        walker::ensure_directory(dir)?;

        info!("Scanning {} for duplicates (remove: {})", dir.display(), remove);
        let mut report = OperationReport::new(Operation::Duplicates, dir);
        report.info(format!("Scanning for duplicates in: {}", dir.display()));
        report.info(format!("Remove duplicates: {}", remove));

        let scan = self.scan(dir, progress)?;

        report_failures(&mut report, &scan);
        report.info(format!("Scanned {} files", scan.scanned));
        if self.options.size_prefilter {
            report.info(format!(
                "Hashed {} files (the rest have a unique size)",
                scan.hashed
            ));
        }
        report.summary_mut().scanned = scan.scanned;

        if scan.groups.is_empty() {
            report.info("No duplicate files found!");
            info!("No duplicates under {}", dir.display());
            return Ok(report);
        }

        for group in &scan.groups {
            report_group(&mut report, group, remove);
        }

        let groups = scan.groups.len();
        let duplicates = scan.duplicate_count();
        {
            let summary = report.summary_mut();
            summary.groups = groups;
            summary.duplicates = duplicates;
        }

        report.info("Summary:");
        report.info(format!("  Duplicate groups found: {}", groups));
        report.info(format!("  Total duplicate files: {}", duplicates));

        if remove {
            let removed = report.summary().removed;
            let freed = report.summary().bytes_freed;
            report.info(format!("  Files removed: {}", removed));
            report.info(format!(
                "  Space freed: {} bytes ({})",
                format_bytes(freed),
                format_megabytes(freed)
            ));
            info!("Removed {} duplicates, freed {} bytes", removed, freed);
        } else {
            info!("Found {} duplicate groups ({} duplicates)", groups, duplicates);
        }

        Ok(report)
    }
}

/// Appends an error line for every path the scan could not read or hash.
fn report_failures(report: &mut OperationReport, scan: &DuplicateScan) {
    for (path, reason) in &scan.unreadable {
        report.error(format!("Error reading {}: {}", path.display(), reason));
    }
    for (path, reason) in &scan.failures {
        report.error(format!("Error hashing {}: {}", path.display(), reason));
    }
}

/// Appends the lines for one group, deleting its duplicates when `remove` is set.
fn report_group(report: &mut OperationReport, group: &DuplicateGroup, remove: bool) {
    let canonical = group.canonical();
    report.info(format!(
        "Duplicate group ({} files, {} bytes each):",
        group.entries.len(),
        format_bytes(canonical.size)
    ));
    report.success(format!("  [KEEP] {}", canonical.path.display()));

    for entry in group.duplicates() {
        if !remove {
            report.warning(format!("  [DUPLICATE] {}", entry.path.display()));
            continue;
        }

        // The canonical copy is never a deletion target.
        if entry.path == canonical.path {
            continue;
        }

        match fs::remove_file(&entry.path) {
            Ok(()) => {
                debug!("Removed {}", entry.path.display());
                report.success(format!("  [REMOVED] {}", entry.path.display()));
                let summary = report.summary_mut();
                summary.removed += 1;
                summary.bytes_freed += entry.size;
            }
            Err(e) => {
                warn!("Could not remove {}: {}", entry.path.display(), e);
                report.error(format!(
                    "  [ERROR] Could not remove {}: {}",
                    entry.path.display(),
                    e
                ));
            }
        }
    }
}

/// Keeps only entries whose size occurs more than once, preserving order.
fn shared_sizes(entries: Vec<FileEntry>) -> Vec<FileEntry> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for entry in &entries {
        *counts.entry(entry.size).or_insert(0) += 1;
    }
    entries
        .into_iter()
        .filter(|entry| counts.get(&entry.size).copied().unwrap_or(0) > 1)
        .collect()
}
