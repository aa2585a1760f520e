//! On-disk staging of fetched artifacts
//!
//! Staging keeps a copy of each downloaded blob for later inspection.
//! Comparison never reads it back.

use provaudit_errors::Error;
use provaudit_types::Channel;
use std::path::{Path, PathBuf};

/// Per-package staging area under a caller-chosen root
///
/// Blobs land at `{root}/{package}/{channel}/{version}`, so runs for
/// different packages never share a file.
#[derive(Debug, Clone)]
pub struct Staging {
    dir: PathBuf,
}

impl Staging {
    #[must_use]
    pub fn new(root: impl AsRef<Path>, package: &str) -> Self {
        Self {
            dir: root.as_ref().join(sanitize(package)),
        }
    }

    /// Path a channel's blob for `version` is staged at
    #[must_use]
    pub fn path_for(&self, channel: Channel, version: &str) -> PathBuf {
        self.dir.join(channel.as_str()).join(sanitize(version))
    }

    /// Write a fetched blob, creating directories as needed
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be created or the file
    /// cannot be written.
    pub async fn store(&self, channel: Channel, version: &str, bytes: &[u8]) -> Result<PathBuf, Error> {
        let dir = self.dir.join(channel.as_str());
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::io_with_path(&e, &dir))?;

        let path = dir.join(sanitize(version));
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Error::io_with_path(&e, &path))?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "staged artifact");
        Ok(path)
    }
}

/// Turn a version or package name into a single safe file name
fn sanitize(raw: &str) -> String {
    let name: String = raw
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | '+') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() || name.chars().all(|c| c == '.') {
        name.replace('.', "_") + "_"
    } else {
        name
    }
}
