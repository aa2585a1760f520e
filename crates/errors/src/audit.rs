//! Audit error types
//!
//! Channels are carried as their display names (`registry`, `source`) so
//! this crate stays free of the data model.

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[non_exhaustive]
pub enum AuditError {
    #[error("version index unavailable for {package}: {message}")]
    IndexUnavailable { package: String, message: String },

    #[error("{channel} fetch failed for {version}: {message}")]
    FetchFailed {
        channel: String,
        version: String,
        message: String,
    },

    #[error("no downloadable artifact for {package} {version}")]
    NoArtifact { package: String, version: String },

    #[error("{channel} entry {path} in {version} is not valid UTF-8 text")]
    DecodeFailed {
        path: String,
        version: String,
        channel: String,
    },

    #[error("{channel} archive for {version} is corrupt: {message}")]
    ArchiveCorrupt {
        version: String,
        channel: String,
        message: String,
    },
}

impl UserFacingError for AuditError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::IndexUnavailable { .. } => {
                Some("Check the package name and connectivity to the registry index.")
            }
            Self::FetchFailed { .. } => Some("Check network connectivity and the tag prefix."),
            Self::NoArtifact { .. } => {
                Some("The registry has no wheel or sdist for this version.")
            }
            Self::DecodeFailed { .. } => {
                Some("Use `--decode mark-different` to report binary entries instead of failing.")
            }
            Self::ArchiveCorrupt { .. } => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::IndexUnavailable { .. } | Self::FetchFailed { .. } | Self::ArchiveCorrupt { .. }
        )
    }

    fn user_code(&self) -> Option<&'static str> {
        Some(match self {
            Self::IndexUnavailable { .. } => "audit.index_unavailable",
            Self::FetchFailed { .. } => "audit.fetch_failed",
            Self::NoArtifact { .. } => "audit.no_artifact",
            Self::DecodeFailed { .. } => "audit.decode_failed",
            Self::ArchiveCorrupt { .. } => "audit.archive_corrupt",
        })
    }
}
