//! Registry JSON API backend

use crate::versions::sort_versions_desc;
use crate::{ArtifactSource, VersionIndex};
use async_trait::async_trait;
use provaudit_errors::{AuditError, Error};
use provaudit_net::{fetch_bytes, fetch_json, join_url, NetClient};
use provaudit_types::Channel;
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Deserialize)]
struct ProjectResponse {
    #[serde(default)]
    releases: BTreeMap<String, Vec<ReleaseFile>>,
}

#[derive(Debug, Deserialize)]
struct ReleaseResponse {
    #[serde(default)]
    urls: Vec<ReleaseFile>,
}

#[derive(Debug, Clone, Deserialize)]
struct ReleaseFile {
    packagetype: String,
    url: String,
    #[serde(default)]
    yanked: bool,
}

fn fetch_failed(version: &str, err: &Error) -> Error {
    AuditError::FetchFailed {
        channel: Channel::Registry.to_string(),
        version: version.to_string(),
        message: err.to_string(),
    }
    .into()
}

/// Version index backed by `GET {base}/pypi/{package}/json`
#[derive(Clone)]
pub struct PypiIndex {
    client: NetClient,
    base_url: String,
}

impl PypiIndex {
    #[must_use]
    pub fn new(client: NetClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl VersionIndex for PypiIndex {
    async fn list_versions(&self, package: &str) -> Result<Vec<String>, Error> {
        let url = join_url(&self.base_url, &["pypi", package, "json"]);
        let project: ProjectResponse =
            fetch_json(&self.client, &url)
                .await
                .map_err(|e| AuditError::IndexUnavailable {
                    package: package.to_string(),
                    message: e.to_string(),
                })?;

        // releases without files (or only yanked ones) have nothing to download
        let mut versions: Vec<String> = project
            .releases
            .into_iter()
            .filter(|(_, files)| files.iter().any(|f| !f.yanked))
            .map(|(version, _)| version)
            .collect();
        sort_versions_desc(&mut versions);

        tracing::debug!(package, count = versions.len(), "listed versions");
        Ok(versions)
    }
}

/// Registry artifact source backed by `GET {base}/pypi/{package}/{version}/json`
///
/// A wheel is preferred; an sdist is used when the release has no wheel.
#[derive(Clone)]
pub struct PypiRegistry {
    client: NetClient,
    base_url: String,
    package: String,
}

impl PypiRegistry {
    #[must_use]
    pub fn new(client: NetClient, base_url: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            package: package.into(),
        }
    }

    /// Resolve the download URL of the preferred artifact
    ///
    /// # Errors
    ///
    /// Returns `AuditError::FetchFailed` if release metadata cannot be read
    /// and `AuditError::NoArtifact` if the release has no wheel or sdist.
    pub async fn artifact_url(&self, version: &str) -> Result<String, Error> {
        let url = join_url(&self.base_url, &["pypi", &self.package, version, "json"]);
        let release: ReleaseResponse = fetch_json(&self.client, &url)
            .await
            .map_err(|e| fetch_failed(version, &e))?;

        let pick = |kind: &str| {
            release
                .urls
                .iter()
                .find(|f| f.packagetype == kind && !f.yanked)
                .or_else(|| release.urls.iter().find(|f| f.packagetype == kind))
        };

        pick("bdist_wheel")
            .or_else(|| pick("sdist"))
            .map(|f| f.url.clone())
            .ok_or_else(|| {
                AuditError::NoArtifact {
                    package: self.package.clone(),
                    version: version.to_string(),
                }
                .into()
            })
    }
}

#[async_trait]
impl ArtifactSource for PypiRegistry {
    fn channel(&self) -> Channel {
        Channel::Registry
    }

    fn location(&self, version: &str) -> String {
        join_url(&self.base_url, &["project", &self.package, version])
    }

    async fn fetch(&self, version: &str) -> Result<Vec<u8>, Error> {
        let url = self.artifact_url(version).await?;
        tracing::debug!(package = %self.package, version, %url, "downloading registry artifact");

        fetch_bytes(&self.client, &url)
            .await
            .map_err(|e| fetch_failed(version, &e))
    }
}
