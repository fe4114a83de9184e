//! tidykit - bulk renaming, category sorting and duplicate removal
//!
//! This library provides three directory operations, each returning an
//! [`OperationReport`] for the caller to render: pattern-based bulk renaming,
//! extension-based sorting into category folders, and content-hash duplicate
//! detection with optional removal of the extra copies.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod file_category;
pub mod file_organizer;
pub mod hasher;
pub mod output;
pub mod renamer;
pub mod report;
pub mod walker;

pub use config::{ConfigError, TidyConfig};
pub use duplicates::{DuplicateFinder, DuplicateGroup, DuplicateOptions, DuplicateScan};
pub use error::{TidyError, TidyResult};
pub use file_category::CategoryTable;
pub use file_organizer::FileOrganizer;
pub use hasher::Fingerprint;
pub use renamer::Renamer;
pub use report::{LineKind, OperationReport, ReportSummary};
pub use walker::FileEntry;

pub use cli::{TidyCommand, run_cli};
