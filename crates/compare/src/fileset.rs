//! Canonical file sets

use crate::archive::{self, ArchiveEntry};
use crate::normalize::normalize;
use crate::CompareOptions;
use provaudit_errors::{AuditError, Error};
use provaudit_types::{Channel, DecodePolicy};
use std::collections::btree_map::{self, BTreeMap};

/// Content of one canonical file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    Text(String),
    /// Only produced under [`DecodePolicy::MarkDifferent`]
    Binary(Vec<u8>),
}

impl FileContent {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

/// Canonical path to content for one side of a comparison
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalFileSet {
    files: BTreeMap<String, FileContent>,
}

impl CanonicalFileSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the file set of an archive held in memory
    ///
    /// # Errors
    ///
    /// Returns `AuditError::ArchiveCorrupt` if the archive cannot be read and,
    /// under [`DecodePolicy::Strict`], `AuditError::DecodeFailed` for the first
    /// in-package entry that is not UTF-8.
    pub fn from_archive(
        bytes: &[u8],
        package: &str,
        version: &str,
        channel: Channel,
        options: &CompareOptions,
    ) -> Result<Self, Error> {
        let entries = archive::read_entries(bytes, version, channel)?;
        Self::from_entries(entries, package, version, channel, options)
    }

    /// Build a file set from already-read archive entries
    ///
    /// When two entries map to the same canonical path the first one read
    /// is kept.
    ///
    /// # Errors
    ///
    /// Returns `AuditError::DecodeFailed` under [`DecodePolicy::Strict`] for
    /// the first in-package entry that is not UTF-8.
    pub fn from_entries(
        entries: Vec<ArchiveEntry>,
        package: &str,
        version: &str,
        channel: Channel,
        options: &CompareOptions,
    ) -> Result<Self, Error> {
        let mut set = Self::new();

        for entry in entries {
            let Some(canonical) = normalize(&entry.path, package, options.path_match) else {
                continue;
            };
            if set.contains(&canonical) {
                tracing::debug!(
                    path = %entry.path,
                    canonical = %canonical,
                    %channel,
                    "duplicate canonical path ignored"
                );
                continue;
            }

            let content = match String::from_utf8(entry.data) {
                Ok(text) => FileContent::Text(text),
                Err(err) => match options.decode_policy {
                    DecodePolicy::Strict => {
                        return Err(AuditError::DecodeFailed {
                            path: canonical,
                            version: version.to_string(),
                            channel: channel.to_string(),
                        }
                        .into());
                    }
                    DecodePolicy::MarkDifferent => FileContent::Binary(err.into_bytes()),
                },
            };

            set.insert(canonical, content);
        }

        Ok(set)
    }

    /// Insert a file, replacing any previous content at the same path
    pub fn insert(&mut self, path: impl Into<String>, content: FileContent) {
        self.files.insert(path.into(), content);
    }

    /// Insert a text file
    pub fn insert_text(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.insert(path, FileContent::Text(text.into()));
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileContent> {
        self.files.get(path)
    }

    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Canonical paths in sorted order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FileContent> {
        self.files.iter()
    }
}

impl<'a> IntoIterator for &'a CanonicalFileSet {
    type Item = (&'a String, &'a FileContent);
    type IntoIter = btree_map::Iter<'a, String, FileContent>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

impl<P: Into<String>, T: Into<String>> FromIterator<(P, T)> for CanonicalFileSet {
    fn from_iter<I: IntoIterator<Item = (P, T)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (path, text) in iter {
            set.insert_text(path, text);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provaudit_types::PathMatch;

    fn entry(path: &str, data: &[u8]) -> ArchiveEntry {
        ArchiveEntry {
            path: path.to_string(),
            data: data.to_vec(),
        }
    }

    #[test]
    fn test_entries_outside_package_are_dropped() {
        let entries = vec![
            entry("pkg-1.0/README.md", b"readme"),
            entry("pkg-1.0/pkg/__init__.py", b""),
            entry("pkg-1.0/pkg/core.py", b"def f():\n    pass\n"),
        ];
        let set = CanonicalFileSet::from_entries(
            entries,
            "pkg",
            "1.0",
            Channel::Source,
            &CompareOptions::default(),
        )
        .unwrap();

        assert_eq!(set.paths().collect::<Vec<_>>(), ["__init__.py", "core.py"]);
        assert_eq!(set.get("__init__.py"), Some(&FileContent::Text(String::new())));
    }

    #[test]
    fn test_strict_policy_fails_on_binary() {
        let entries = vec![
            entry("pkg/a.py", b"ok\n"),
            entry("pkg/native.so", &[0xff, 0xfe, 0x00]),
        ];
        let err = CanonicalFileSet::from_entries(
            entries,
            "pkg",
            "1.0",
            Channel::Registry,
            &CompareOptions::default(),
        )
        .unwrap_err();

        match err {
            Error::Audit(AuditError::DecodeFailed { path, channel, .. }) => {
                assert_eq!(path, "native.so");
                assert_eq!(channel, "registry");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_binary_outside_package_is_ignored_under_strict() {
        let entries = vec![entry("pkg-1.0/logo.png", &[0x89, 0x50, 0xff])];
        let set = CanonicalFileSet::from_entries(
            entries,
            "pkg",
            "1.0",
            Channel::Source,
            &CompareOptions::default(),
        )
        .unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_mark_different_keeps_bytes() {
        let options = CompareOptions {
            decode_policy: DecodePolicy::MarkDifferent,
            path_match: PathMatch::Segment,
        };
        let entries = vec![entry("pkg/native.so", &[0xff, 0xfe])];
        let set =
            CanonicalFileSet::from_entries(entries, "pkg", "1.0", Channel::Registry, &options)
                .unwrap();

        assert_eq!(
            set.get("native.so"),
            Some(&FileContent::Binary(vec![0xff, 0xfe]))
        );
    }

    #[test]
    fn test_first_duplicate_wins() {
        let options = CompareOptions {
            decode_policy: DecodePolicy::Strict,
            path_match: PathMatch::Substring,
        };
        let entries = vec![
            entry("a/pkg/x.py", b"first"),
            entry("b/notpkg/x.py", b"second"),
        ];
        let set = CanonicalFileSet::from_entries(entries, "pkg", "1.0", Channel::Source, &options)
            .unwrap();

        assert_eq!(set.len(), 1);
        assert_eq!(set.get("x.py").and_then(FileContent::as_text), Some("first"));
    }
}
