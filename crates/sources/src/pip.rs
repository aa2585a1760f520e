//! Package-manager backend (`python -m pip`)

use crate::versions::parse_pip_versions;
use crate::{ArtifactSource, VersionIndex};
use async_trait::async_trait;
use provaudit_errors::{AuditError, Error};
use provaudit_types::Channel;
use std::process::Output;
use tokio::process::Command;

async fn run_pip(python: &str, args: &[&str]) -> Result<Output, String> {
    tracing::debug!(python, ?args, "running pip");

    Command::new(python)
        .arg("-m")
        .arg("pip")
        .args(args)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| format!("failed to run {python}: {e}"))
}

fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let message = stderr.trim();
    if message.is_empty() {
        format!("pip exited with {}", output.status)
    } else {
        message.to_string()
    }
}

/// Version index backed by `pip index versions`
#[derive(Debug, Clone)]
pub struct PipIndex {
    python: String,
}

impl PipIndex {
    #[must_use]
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
        }
    }
}

#[async_trait]
impl VersionIndex for PipIndex {
    async fn list_versions(&self, package: &str) -> Result<Vec<String>, Error> {
        let unavailable = |message: String| -> Error {
            AuditError::IndexUnavailable {
                package: package.to_string(),
                message,
            }
            .into()
        };

        let output = run_pip(&self.python, &["index", "versions", package])
            .await
            .map_err(unavailable)?;
        if !output.status.success() {
            return Err(unavailable(stderr_message(&output)));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_pip_versions(&stdout)
            .ok_or_else(|| unavailable("pip output has no version list".to_string()))
    }
}

/// Registry artifact source backed by `pip download --no-deps`
///
/// Each download goes to its own temporary directory, so concurrent fetches
/// never see each other's files.
#[derive(Debug, Clone)]
pub struct PipRegistry {
    python: String,
    package: String,
}

impl PipRegistry {
    #[must_use]
    pub fn new(python: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            package: package.into(),
        }
    }
}

#[async_trait]
impl ArtifactSource for PipRegistry {
    fn channel(&self) -> Channel {
        Channel::Registry
    }

    fn location(&self, version: &str) -> String {
        format!("pip download {}=={version}", self.package)
    }

    async fn fetch(&self, version: &str) -> Result<Vec<u8>, Error> {
        let failed = |message: String| -> Error {
            AuditError::FetchFailed {
                channel: Channel::Registry.to_string(),
                version: version.to_string(),
                message,
            }
            .into()
        };

        let dest = tempfile::tempdir().map_err(|e| failed(e.to_string()))?;
        let dest_str = dest.path().to_string_lossy().into_owned();
        let requirement = format!("{}=={version}", self.package);

        let output = run_pip(
            &self.python,
            &["download", "--no-deps", &requirement, "--dest", &dest_str],
        )
        .await
        .map_err(failed)?;
        if !output.status.success() {
            return Err(failed(stderr_message(&output)));
        }

        let mut entries = tokio::fs::read_dir(dest.path())
            .await
            .map_err(|e| failed(e.to_string()))?;
        while let Some(entry) = entries.next_entry().await.map_err(|e| failed(e.to_string()))? {
            let file_type = entry.file_type().await.map_err(|e| failed(e.to_string()))?;
            if file_type.is_file() {
                let path = entry.path();
                tracing::debug!(path = %path.display(), "pip saved artifact");
                return tokio::fs::read(&path).await.map_err(|e| failed(e.to_string()));
            }
        }

        Err(AuditError::NoArtifact {
            package: self.package.clone(),
            version: version.to_string(),
        }
        .into())
    }
}
