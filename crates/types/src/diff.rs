//! Line- and file-level difference model

use serde::{Deserialize, Serialize};

/// One line index where two files disagree
///
/// A side is `None` when the line only exists in the other, longer file.
/// `Some(String::new())` is an empty line that is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineDifference {
    /// 1-based line number
    pub line_number: usize,
    /// Line from the registry side
    pub left: Option<String>,
    /// Line from the source side
    pub right: Option<String>,
}

impl LineDifference {
    #[must_use]
    pub fn new(line_number: usize, left: Option<String>, right: Option<String>) -> Self {
        Self {
            line_number,
            left,
            right,
        }
    }
}

/// All line differences for one canonical path, ordered by line number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDifference {
    pub path: String,
    pub differences: Vec<LineDifference>,
}

/// Differences between two archives of the same release
///
/// Empty means the archives are content-identical under normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComparisonResult {
    pub files: Vec<FileDifference>,
}

impl ComparisonResult {
    #[must_use]
    pub fn new(files: Vec<FileDifference>) -> Self {
        Self { files }
    }

    #[must_use]
    pub fn is_identical(&self) -> bool {
        self.files.is_empty()
    }

    /// Canonical paths that differ, in report order
    #[must_use]
    pub fn changed_paths(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.path.as_str()).collect()
    }

    #[must_use]
    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.files.iter().map(|f| f.differences.len()).sum()
    }

    /// Look up the difference recorded for a canonical path
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileDifference> {
        self.files.iter().find(|f| f.path == path)
    }
}
