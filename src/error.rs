//! Error kinds shared by the rename, sort and duplicate engines.
//!
//! Only two kinds ever escape an operation: a missing directory and an
//! invalid rename pattern. Both are detected before any file is touched.
//! Per-file failures are carried as [`TidyError::FileIo`] values until the
//! engine turns them into report lines.

use std::path::{Path, PathBuf};

/// Errors that can occur while running a tidykit operation.
#[derive(Debug)]
pub enum TidyError {
    /// The target directory does not exist or is not a directory.
    DirectoryNotFound { path: PathBuf },
    /// A filesystem call on a single file failed.
    FileIo {
        path: PathBuf,
        source: std::io::Error,
    },
    /// A regular expression given to the rename engine does not compile.
    InvalidPattern { pattern: String, reason: String },
}

impl TidyError {
    /// Wraps an I/O error together with the path it happened on.
    pub fn file_io(path: &Path, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Returns true if this error aborts the whole operation.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::FileIo { .. })
    }
}

impl std::fmt::Display for TidyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectoryNotFound { path } => {
                write!(f, "Directory '{}' does not exist!", path.display())
            }
            Self::FileIo { path, source } => {
                write!(f, "{}: {}", path.display(), source)
            }
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
        }
    }
}

impl std::error::Error for TidyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FileIo { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for tidykit operations.
pub type TidyResult<T> = Result<T, TidyError>;
