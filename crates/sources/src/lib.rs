#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Version enumeration and artifact fetching for provaudit
//!
//! Both distribution channels sit behind [`ArtifactSource`], and the
//! registry's version list behind [`VersionIndex`], so the orchestrator can
//! be driven by in-memory fakes in tests.

pub mod github;
pub mod pip;
pub mod pypi;
pub mod staging;
pub mod versions;

pub use github::{GitHubArchive, RepoRef};
pub use pip::{PipIndex, PipRegistry};
pub use pypi::{PypiIndex, PypiRegistry};
pub use staging::Staging;
pub use versions::{parse_pip_versions, sort_versions_desc};

use async_trait::async_trait;
use provaudit_errors::Error;
use provaudit_types::Channel;

/// Lists the published versions of a package
#[async_trait]
pub trait VersionIndex: Send + Sync {
    /// Published versions, newest first
    ///
    /// Fails with `AuditError::IndexUnavailable` when the index cannot be
    /// queried.
    async fn list_versions(&self, package: &str) -> Result<Vec<String>, Error>;
}

/// Fetches one channel's artifact for a version as raw bytes
#[async_trait]
pub trait ArtifactSource: Send + Sync {
    fn channel(&self) -> Channel;

    /// Where the artifact for `version` is fetched from, for display
    fn location(&self, version: &str) -> String;

    /// Download the artifact
    ///
    /// Failures are per version and never fatal to a run.
    async fn fetch(&self, version: &str) -> Result<Vec<u8>, Error>;
}
