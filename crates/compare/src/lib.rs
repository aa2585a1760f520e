#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Archive comparison for provaudit
//!
//! Reads a registry artifact and a source archive, maps their entries to
//! canonical paths under the package directory and reports line-level
//! differences. Everything here is synchronous and CPU-bound; async callers
//! run it on the blocking pool.

pub mod archive;
pub mod diff;
pub mod fileset;
pub mod normalize;

pub use archive::{read_entries, ArchiveEntry, ArchiveFormat};
pub use diff::{diff, diff_lines};
pub use fileset::{CanonicalFileSet, FileContent};
pub use normalize::normalize;

use provaudit_errors::Error;
use provaudit_types::{Channel, ComparisonResult, DecodePolicy, PathMatch};

/// Policies applied while building file sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompareOptions {
    pub decode_policy: DecodePolicy,
    pub path_match: PathMatch,
}

/// Compares both artifacts of one package's releases
#[derive(Debug, Clone)]
pub struct Comparator {
    package: String,
    options: CompareOptions,
}

impl Comparator {
    #[must_use]
    pub fn new(package: impl Into<String>, options: CompareOptions) -> Self {
        Self {
            package: package.into(),
            options,
        }
    }

    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    #[must_use]
    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Build the canonical file set of one channel's archive
    ///
    /// # Errors
    ///
    /// Returns `AuditError::ArchiveCorrupt` or `AuditError::DecodeFailed`.
    pub fn file_set(
        &self,
        bytes: &[u8],
        version: &str,
        channel: Channel,
    ) -> Result<CanonicalFileSet, Error> {
        CanonicalFileSet::from_archive(bytes, &self.package, version, channel, &self.options)
    }

    /// Compare a registry artifact against a source archive
    ///
    /// # Errors
    ///
    /// Returns `AuditError::ArchiveCorrupt` or `AuditError::DecodeFailed` for
    /// whichever side failed first, registry side checked first.
    pub fn compare(
        &self,
        version: &str,
        registry: &[u8],
        source: &[u8],
    ) -> Result<ComparisonResult, Error> {
        let left = self.file_set(registry, version, Channel::Registry)?;
        let right = self.file_set(source, version, Channel::Source)?;

        let result = diff(&left, &right);
        tracing::debug!(
            package = %self.package,
            version,
            registry_files = left.len(),
            source_files = right.len(),
            changed_files = result.file_count(),
            "compared archives"
        );
        Ok(result)
    }
}

/// Compare two in-memory archives of the same release
///
/// # Errors
///
/// Returns `AuditError::ArchiveCorrupt` or `AuditError::DecodeFailed`.
pub fn compare_archives(
    package: &str,
    version: &str,
    registry: &[u8],
    source: &[u8],
    options: CompareOptions,
) -> Result<ComparisonResult, Error> {
    Comparator::new(package, options).compare(version, registry, source)
}
