//! Source hosting backend (tag archive exports)

use crate::ArtifactSource;
use async_trait::async_trait;
use provaudit_errors::{AuditError, ConfigError, Error};
use provaudit_net::{fetch_bytes, join_url, NetClient};
use provaudit_types::Channel;
use std::fmt;
use std::str::FromStr;

/// `owner/repo` reference on the hosting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepoRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidValue {
            field: "repository".to_string(),
            value: s.to_string(),
        };

        let (owner, name) = s.trim().trim_matches('/').split_once('/').ok_or_else(invalid)?;
        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid().into());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.trim_end_matches(".git").to_string(),
        })
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Downloads `{base}/{owner}/{repo}/archive/refs/tags/{prefix}{version}.zip`
#[derive(Clone)]
pub struct GitHubArchive {
    client: NetClient,
    base_url: String,
    repo: RepoRef,
    tag_prefix: String,
}

impl GitHubArchive {
    #[must_use]
    pub fn new(client: NetClient, base_url: impl Into<String>, repo: RepoRef) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            repo,
            tag_prefix: "v".to_string(),
        }
    }

    /// Prefix prepended to the version to form the tag name
    #[must_use]
    pub fn with_tag_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.tag_prefix = prefix.into();
        self
    }

    /// Archive URL of the tag for `version`
    #[must_use]
    pub fn archive_url(&self, version: &str) -> String {
        let file = format!("{}{version}.zip", self.tag_prefix);
        join_url(
            &self.base_url,
            &[
                &self.repo.owner,
                &self.repo.name,
                "archive",
                "refs",
                "tags",
                &file,
            ],
        )
    }
}

#[async_trait]
impl ArtifactSource for GitHubArchive {
    fn channel(&self) -> Channel {
        Channel::Source
    }

    fn location(&self, version: &str) -> String {
        self.archive_url(version)
    }

    async fn fetch(&self, version: &str) -> Result<Vec<u8>, Error> {
        let url = self.archive_url(version);
        tracing::debug!(repo = %self.repo, version, %url, "downloading source archive");

        fetch_bytes(&self.client, &url).await.map_err(|e| {
            AuditError::FetchFailed {
                channel: Channel::Source.to_string(),
                version: version.to_string(),
                message: e.to_string(),
            }
            .into()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_repo_ref() {
        let repo: RepoRef = "opentensor/bittensor".parse().unwrap();
        assert_eq!(repo.owner, "opentensor");
        assert_eq!(repo.name, "bittensor");
        assert_eq!(repo.to_string(), "opentensor/bittensor");

        let repo: RepoRef = "/owner/repo.git/".parse().unwrap();
        assert_eq!(repo.name, "repo");

        assert!("noslash".parse::<RepoRef>().is_err());
        assert!("a/b/c".parse::<RepoRef>().is_err());
        assert!("/repo".parse::<RepoRef>().is_err());
    }

    #[test]
    fn test_archive_url() {
        let client = NetClient::with_defaults().unwrap();
        let repo: RepoRef = "owner/repo".parse().unwrap();

        let archive = GitHubArchive::new(client.clone(), "https://github.com/", repo.clone());
        assert_eq!(
            archive.archive_url("1.2.3"),
            "https://github.com/owner/repo/archive/refs/tags/v1.2.3.zip"
        );

        let bare = GitHubArchive::new(client, "https://github.com", repo).with_tag_prefix("");
        assert_eq!(
            bare.archive_url("1.2.3"),
            "https://github.com/owner/repo/archive/refs/tags/1.2.3.zip"
        );
    }
}
