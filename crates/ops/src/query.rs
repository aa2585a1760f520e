//! Version listing and local archive comparison

use provaudit_compare::{compare_archives, CompareOptions};
use provaudit_errors::{AuditError, Error, OpsError};
use provaudit_events::{EventEmitter, EventSender};
use provaudit_sources::VersionIndex;
use provaudit_types::ComparisonResult;
use std::path::Path;

/// List the published versions of a package, newest first
///
/// # Errors
///
/// Returns `AuditError::IndexUnavailable` if the index cannot be queried.
pub async fn list_versions(
    index: &dyn VersionIndex,
    package: &str,
    tx: Option<&EventSender>,
) -> Result<Vec<String>, Error> {
    if let Some(tx) = tx {
        tx.emit_debug(format!("listing versions of {package}"));
    }

    index.list_versions(package).await.map_err(|e| {
        if e.is_run_fatal() {
            e
        } else {
            AuditError::IndexUnavailable {
                package: package.to_string(),
                message: e.to_string(),
            }
            .into()
        }
    })
}

/// Compare a registry artifact and a source archive already on disk
///
/// # Errors
///
/// Returns an I/O error if either file cannot be read, or
/// `AuditError::ArchiveCorrupt` / `AuditError::DecodeFailed` from the
/// comparison.
pub async fn compare_local(
    registry_path: &Path,
    source_path: &Path,
    package: &str,
    options: CompareOptions,
) -> Result<ComparisonResult, Error> {
    let registry = tokio::fs::read(registry_path)
        .await
        .map_err(|e| Error::io_with_path(&e, registry_path))?;
    let source = tokio::fs::read(source_path)
        .await
        .map_err(|e| Error::io_with_path(&e, source_path))?;

    let package = package.to_string();
    tokio::task::spawn_blocking(move || {
        compare_archives(&package, "local", &registry, &source, options)
    })
    .await
    .map_err(|e| OpsError::TaskFailed {
        message: e.to_string(),
    })?
}
