//! File categorization by extension.
//!
//! A [`CategoryTable`] maps lowercased file extensions to category names.
//! Category names double as the subdirectory names the sort engine creates.
//! Rules are checked in insertion order, and files whose extension matches no
//! rule land in the fallback category.
//!
//! # Examples
//!
//! ```
//! use tidykit::file_category::CategoryTable;
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.categorize("png"), "Images");
//! assert_eq!(table.categorize(".MP3"), "Audio");
//! assert_eq!(table.categorize("xyz"), "Others");
//! ```

use serde::{Deserialize, Serialize};

/// Name of the fallback category in the default table.
pub const DEFAULT_FALLBACK: &str = "Others";

/// A named category and the extensions routed to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    /// Category name, also used as the destination directory name.
    pub name: String,
    /// Extensions without the leading dot. Matched case-insensitively.
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Ordered mapping from file extensions to category names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTable {
    #[serde(default)]
    categories: Vec<CategoryRule>,
    #[serde(default = "default_fallback")]
    fallback: String,
}

fn default_fallback() -> String {
    DEFAULT_FALLBACK.to_string()
}

impl CategoryTable {
    /// Creates an empty table where every file goes to `fallback`.
    pub fn empty(fallback: &str) -> Self {
        Self {
            categories: Vec::new(),
            fallback: fallback.to_string(),
        }
    }

    /// Creates a table with the standard categories.
    pub fn new() -> Self {
        let mut table = Self::empty(DEFAULT_FALLBACK);
        table.populate_standard_mappings();
        table
    }

    fn populate_standard_mappings(&mut self) {
        self.add_category(
            "Images",
            &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico"],
        );
        self.add_category(
            "Videos",
            &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm"],
        );
        self.add_category("Audio", &["mp3", "wav", "flac", "aac", "ogg", "m4a", "wma"]);
        self.add_category(
            "Documents",
            &[
                "pdf", "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "ppt", "pptx",
            ],
        );
        self.add_category("Archives", &["zip", "rar", "7z", "tar", "gz", "bz2"]);
        self.add_category(
            "Code",
            &[
                "py", "java", "cpp", "c", "js", "html", "css", "php", "rb", "go",
            ],
        );
        self.add_category("Executables", &["exe", "msi", "app", "dmg", "deb", "rpm"]);
    }

    /// Appends a category rule. Earlier rules win when an extension appears twice.
    pub fn add_category(&mut self, name: &str, extensions: &[&str]) {
        self.categories.push(CategoryRule {
            name: name.to_string(),
            extensions: extensions.iter().map(|ext| normalize(ext)).collect(),
        });
    }

    /// Adds one extension to an existing category, creating the category if needed.
    pub fn add_extension_mapping(&mut self, ext: &str, category: &str) {
        let ext = normalize(ext);
        match self.categories.iter_mut().find(|rule| rule.name == category) {
            Some(rule) => rule.extensions.push(ext),
            None => self.categories.push(CategoryRule {
                name: category.to_string(),
                extensions: vec![ext],
            }),
        }
    }

    /// Returns the category rules in priority order.
    pub fn categories(&self) -> &[CategoryRule] {
        &self.categories
    }

    /// Returns the fallback category name.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Maps a file extension to a category, if any rule matches.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidykit::file_category::CategoryTable;
    ///
    /// let table = CategoryTable::default();
    /// assert_eq!(table.extension_to_category("PDF"), Some("Documents"));
    /// assert_eq!(table.extension_to_category("unknown"), None);
    /// ```
    pub fn extension_to_category(&self, ext: &str) -> Option<&str> {
        let ext = normalize(ext);
        if ext.is_empty() {
            return None;
        }
        self.categories
            .iter()
            .find(|rule| rule.extensions.iter().any(|e| normalize(e) == ext))
            .map(|rule| rule.name.as_str())
    }

    /// Determines the category for an extension, falling back when nothing matches.
    pub fn categorize(&self, ext: &str) -> &str {
        self.extension_to_category(ext).unwrap_or(&self.fallback)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercases an extension and strips a leading dot.
fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
