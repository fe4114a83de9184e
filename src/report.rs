//! Operation reports.
//!
//! Every engine call builds a fresh [`OperationReport`] and hands it back to
//! the caller. Lines are appended in the order things happened; the summary
//! counters are updated alongside them. Rendering is left to the caller.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Which engine produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Rename,
    Sort,
    Duplicates,
}

impl Operation {
    /// Title used when rendering the report.
    pub fn title(&self) -> &'static str {
        match self {
            Operation::Rename => "BULK RENAME",
            Operation::Sort => "SORT INTO CATEGORIES",
            Operation::Duplicates => "DUPLICATE SCAN",
        }
    }
}

/// Severity of a report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Info,
    Success,
    Warning,
    Error,
}

/// One human-readable line of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    pub kind: LineKind,
    pub text: String,
}

/// Counters summarizing an operation.
///
/// Only the counters relevant to the operation are updated; the rest stay zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Files examined (hashed, for duplicate scans).
    pub scanned: usize,
    pub renamed: usize,
    pub moved: usize,
    pub removed: usize,
    /// Files left untouched on purpose, e.g. because of a name collision.
    pub skipped: usize,
    pub errors: usize,
    /// Number of duplicate groups.
    pub groups: usize,
    /// Sum over groups of (group size - 1).
    pub duplicates: usize,
    pub bytes_freed: u64,
    /// Files moved per category, for sort reports.
    pub per_category: BTreeMap<String, usize>,
}

/// Ordered result lines plus summary counters for one operation call.
#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    operation: Operation,
    directory: PathBuf,
    started_at: DateTime<Local>,
    lines: Vec<ReportLine>,
    summary: ReportSummary,
}

impl OperationReport {
    /// Starts an empty report for an operation on `directory`.
    pub fn new(operation: Operation, directory: &Path) -> Self {
        Self {
            operation,
            directory: directory.to_path_buf(),
            started_at: Local::now(),
            lines: Vec::new(),
            summary: ReportSummary::default(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn started_at(&self) -> DateTime<Local> {
        self.started_at
    }

    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }

    pub fn summary(&self) -> &ReportSummary {
        &self.summary
    }

    /// Mutable access to the counters, for the engines.
    pub(crate) fn summary_mut(&mut self) -> &mut ReportSummary {
        &mut self.summary
    }

    fn push(&mut self, kind: LineKind, text: impl Into<String>) {
        self.lines.push(ReportLine {
            kind,
            text: text.into(),
        });
    }

    pub fn info(&mut self, text: impl Into<String>) {
        self.push(LineKind::Info, text);
    }

    pub fn success(&mut self, text: impl Into<String>) {
        self.push(LineKind::Success, text);
    }

    pub fn warning(&mut self, text: impl Into<String>) {
        self.push(LineKind::Warning, text);
    }

    /// Appends an error line and counts it.
    pub fn error(&mut self, text: impl Into<String>) {
        self.summary.errors += 1;
        self.push(LineKind::Error, text);
    }

    /// Returns true if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.text.contains(needle))
    }

    /// Returns the lines of the given kind, in order.
    pub fn lines_of(&self, kind: LineKind) -> Vec<&ReportLine> {
        self.lines.iter().filter(|line| line.kind == kind).collect()
    }

    /// Serializes the whole report as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Formats a byte count with thousands separators, e.g. `1,048,576`.
pub fn format_bytes(bytes: u64) -> String {
    let digits = bytes.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Formats a byte count in mebibytes with two decimals.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
