//! Audit orchestration
//!
//! A run enumerates versions, then for every version fetches both channels,
//! compares them and records exactly one outcome. Only a failed enumeration
//! ends the run early.

use crate::query::list_versions;
use crate::AuditCtx;
use futures::stream::{self, StreamExt};
use provaudit_compare::Comparator;
use provaudit_errors::{AuditError, Error};
use provaudit_events::{AppEvent, AuditEvent, EventEmitter, GeneralEvent};
use provaudit_sources::ArtifactSource;
use provaudit_types::{
    AuditReport, Channel, ChannelFailure, ComparisonResult, OutcomeStatus, SkipReason,
    VersionOutcome,
};
use std::collections::HashSet;
use tokio::task::JoinError;

/// Audit every published version, or only `only` when given
///
/// Outcomes are recorded in enumeration order regardless of how many
/// versions run concurrently.
///
/// # Errors
///
/// Returns `AuditError::IndexUnavailable` if versions cannot be enumerated.
pub async fn run_audit(ctx: &AuditCtx, only: Option<&[String]>) -> Result<AuditReport, Error> {
    let versions = list_versions(ctx.index.as_ref(), &ctx.package, ctx.tx.as_ref()).await?;
    let versions = select_versions(ctx, versions, only);

    ctx.emit_audit_started(&ctx.package, versions.len());
    tracing::info!(
        package = %ctx.package,
        repository = %ctx.repository,
        versions = versions.len(),
        jobs = ctx.jobs,
        "starting audit"
    );

    let outcomes: Vec<VersionOutcome> = stream::iter(&versions)
        .map(|version| audit_version(ctx, version))
        .buffered(ctx.jobs)
        .collect()
        .await;

    let report = AuditReport::new(&ctx.package, &ctx.repository, outcomes);
    ctx.emit_audit_completed(&ctx.package, report.summary);
    tracing::info!(
        package = %ctx.package,
        matched = report.summary.matched,
        mismatched = report.summary.mismatched,
        skipped = report.summary.skipped,
        "audit completed"
    );

    Ok(report)
}

/// Keep enumeration order; warn about requested versions the index lacks
fn select_versions(ctx: &AuditCtx, versions: Vec<String>, only: Option<&[String]>) -> Vec<String> {
    let Some(only) = only else {
        return versions;
    };

    let known: HashSet<&str> = versions.iter().map(String::as_str).collect();
    for requested in only {
        if !known.contains(requested.as_str()) {
            ctx.emit_warning(format!(
                "version {requested} is not published for {}; ignoring",
                ctx.package
            ));
        }
    }

    let wanted: HashSet<&str> = only.iter().map(String::as_str).collect();
    versions
        .into_iter()
        .filter(|v| wanted.contains(v.as_str()))
        .collect()
}

/// Fetch, compare and record one version
///
/// Every failure past enumeration, including a crashed comparison task,
/// becomes a `Skipped` outcome.
pub async fn audit_version(ctx: &AuditCtx, version: &str) -> VersionOutcome {
    ctx.emit(AppEvent::Audit(AuditEvent::VersionStarted {
        version: version.to_string(),
    }));

    let (registry, source) = tokio::join!(
        fetch_channel(ctx, ctx.registry.as_ref(), version),
        fetch_channel(ctx, ctx.source.as_ref(), version),
    );

    let outcome = match (registry, source) {
        (Ok(registry), Ok(source)) => {
            let comparator = ctx.comparator.clone();
            let owned = version.to_string();
            let joined = tokio::task::spawn_blocking(move || {
                compare_artifacts(&comparator, &owned, &registry, &source)
            })
            .await;
            comparison_outcome(version, joined)
        }
        (registry, source) => {
            let failures = [registry.err(), source.err()].into_iter().flatten().collect();
            VersionOutcome::skipped(version, SkipReason::FetchFailed { failures })
        }
    };

    emit_outcome(ctx, &outcome);
    outcome
}

fn comparison_outcome(
    version: &str,
    joined: Result<Result<ComparisonResult, SkipReason>, JoinError>,
) -> VersionOutcome {
    match joined {
        Ok(Ok(result)) => VersionOutcome::compared(version, result),
        Ok(Err(reason)) => VersionOutcome::skipped(version, reason),
        Err(e) => {
            tracing::error!(version, error = %e, "comparison task failed");
            VersionOutcome::skipped(
                version,
                SkipReason::ComparisonFailed {
                    message: e.to_string(),
                },
            )
        }
    }
}

async fn fetch_channel(
    ctx: &AuditCtx,
    artifact: &dyn ArtifactSource,
    version: &str,
) -> Result<Vec<u8>, ChannelFailure> {
    let channel = artifact.channel();
    ctx.emit_download_started(channel, version, artifact.location(version));

    match artifact.fetch(version).await {
        Ok(bytes) => {
            ctx.emit_download_completed(channel, version, bytes.len() as u64);
            stage(ctx, channel, version, &bytes).await;
            Ok(bytes)
        }
        Err(e) => {
            let message = failure_message(&e);
            tracing::debug!(%channel, version, error = %e, "fetch failed");
            ctx.emit_download_failed(channel, version, message.clone());
            Err(ChannelFailure { channel, message })
        }
    }
}

async fn stage(ctx: &AuditCtx, channel: Channel, version: &str, bytes: &[u8]) {
    let Some(staging) = &ctx.staging else {
        return;
    };
    if let Err(e) = staging.store(channel, version, bytes).await {
        tracing::warn!(%channel, version, error = %e, "staging failed");
        ctx.emit(AppEvent::General(GeneralEvent::warning_with_context(
            format!("could not stage {channel} artifact for {version}"),
            e.to_string(),
        )));
    }
}

/// Strip the channel/version wrapper the outcome already carries
fn failure_message(err: &Error) -> String {
    match err {
        Error::Audit(AuditError::FetchFailed { message, .. }) => message.clone(),
        other => other.to_string(),
    }
}

fn compare_artifacts(
    comparator: &Comparator,
    version: &str,
    registry: &[u8],
    source: &[u8],
) -> Result<ComparisonResult, SkipReason> {
    let left = comparator
        .file_set(registry, version, Channel::Registry)
        .map_err(|e| skip_reason(Channel::Registry, e))?;
    let right = comparator
        .file_set(source, version, Channel::Source)
        .map_err(|e| skip_reason(Channel::Source, e))?;

    Ok(provaudit_compare::diff(&left, &right))
}

fn skip_reason(channel: Channel, err: Error) -> SkipReason {
    match err {
        Error::Audit(AuditError::DecodeFailed { path, .. }) => {
            SkipReason::DecodeFailed { channel, path }
        }
        Error::Audit(AuditError::ArchiveCorrupt { message, .. }) => {
            SkipReason::ArchiveCorrupt { channel, message }
        }
        other => SkipReason::ArchiveCorrupt {
            channel,
            message: other.to_string(),
        },
    }
}

fn emit_outcome(ctx: &AuditCtx, outcome: &VersionOutcome) {
    let version = outcome.version.clone();
    let event = match &outcome.status {
        OutcomeStatus::Match => AuditEvent::VersionMatched { version },
        OutcomeStatus::Mismatch(result) => AuditEvent::VersionMismatched {
            version,
            files: result.file_count(),
            lines: result.line_count(),
        },
        OutcomeStatus::Skipped(reason) => AuditEvent::VersionSkipped {
            version,
            reason: reason.to_string(),
        },
    };
    ctx.emit(AppEvent::Audit(event));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_panicked_comparison_is_skipped() {
        let joined = tokio::task::spawn_blocking(|| -> Result<ComparisonResult, SkipReason> {
            panic!("inflate overflow")
        })
        .await;

        let outcome = comparison_outcome("1.0", joined);
        assert!(matches!(
            outcome.status,
            OutcomeStatus::Skipped(SkipReason::ComparisonFailed { .. })
        ));
        assert_eq!(outcome.version, "1.0");
    }

    #[test]
    fn test_finished_comparison_is_recorded() {
        let outcome = comparison_outcome("2.0", Ok(Ok(ComparisonResult::default())));
        assert!(outcome.is_match());

        let reason = SkipReason::ArchiveCorrupt {
            channel: Channel::Source,
            message: "bad zip".to_string(),
        };
        let outcome = comparison_outcome("2.0", Ok(Err(reason.clone())));
        assert_eq!(outcome.status, OutcomeStatus::Skipped(reason));
    }
}
