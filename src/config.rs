//! Optional configuration file support.
//!
//! tidykit runs with built-in defaults. A TOML file passed with `--config`
//! can replace the category table used for sorting and switch on the
//! duplicate-scan speedups.
//!
//! # Configuration File Format
//!
//! ```toml
//! [sort]
//! fallback = "Misc"
//!
//! [[sort.categories]]
//! name = "Images"
//! extensions = ["jpg", "png"]
//!
//! [duplicates]
//! parallel = true
//! size_prefilter = true
//! ```

use crate::duplicates::DuplicateOptions;
use crate::file_category::CategoryTable;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during configuration loading.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// A category or fallback name cannot be used as a directory name.
    InvalidCategory {
        /// The offending name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidCategory { name, reason } => {
                write!(f, "Invalid category '{}': {}", name, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TidyConfig {
    /// Category table for the sort engine.
    #[serde(default)]
    pub sort: CategoryTable,

    /// Duplicate scan settings.
    #[serde(default)]
    pub duplicates: DuplicateSettings,
}

/// `[duplicates]` section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateSettings {
    /// Hash files on all cores.
    #[serde(default)]
    pub parallel: bool,
    /// Skip hashing files whose size is unique.
    #[serde(default)]
    pub size_prefilter: bool,
}

impl From<DuplicateSettings> for DuplicateOptions {
    fn from(settings: DuplicateSettings) -> Self {
        DuplicateOptions {
            parallel: settings.parallel,
            size_prefilter: settings.size_prefilter,
        }
    }
}

impl TidyConfig {
    /// Loads configuration from `config_path`, or returns the defaults when no
    /// path is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing, unreadable, not valid TOML, or
    /// names a category that cannot be a directory name.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        validate_category_name(self.sort.fallback())?;

        let mut seen = HashSet::new();
        for rule in self.sort.categories() {
            validate_category_name(&rule.name)?;
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::InvalidCategory {
                    name: rule.name.clone(),
                    reason: "defined more than once".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Category names become directory names, so they must be a single path component.
fn validate_category_name(name: &str) -> Result<(), ConfigError> {
    let reason = if name.trim().is_empty() {
        Some("name is empty")
    } else if name == "." || name == ".." {
        Some("name is reserved")
    } else if name.contains('/') || name.contains('\\') {
        Some("name contains a path separator")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(ConfigError::InvalidCategory {
            name: name.to_string(),
            reason: reason.to_string(),
        }),
        None => Ok(()),
    }
}
