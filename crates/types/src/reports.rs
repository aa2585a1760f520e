//! Per-version outcomes and the audit report

use crate::{Channel, ComparisonResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a single channel could not be fetched
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFailure {
    pub channel: Channel,
    pub message: String,
}

/// Why a version was not compared
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// One or both downloads failed
    FetchFailed { failures: Vec<ChannelFailure> },
    /// A download succeeded but is not a readable archive
    ArchiveCorrupt { channel: Channel, message: String },
    /// An entry could not be decoded as text under the strict policy
    DecodeFailed { channel: Channel, path: String },
    /// The comparison itself aborted after both downloads succeeded
    ComparisonFailed { message: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FetchFailed { failures } => {
                for (i, failure) in failures.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} fetch failed ({})", failure.channel, failure.message)?;
                }
                Ok(())
            }
            Self::ArchiveCorrupt { channel, message } => {
                write!(f, "{channel} archive corrupt ({message})")
            }
            Self::DecodeFailed { channel, path } => {
                write!(f, "{channel} entry {path} is not text")
            }
            Self::ComparisonFailed { message } => write!(f, "comparison failed ({message})"),
        }
    }
}

/// Terminal state of one audited version
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Match,
    Mismatch(ComparisonResult),
    Skipped(SkipReason),
}

/// Outcome recorded for one enumerated version
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionOutcome {
    pub version: String,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

impl VersionOutcome {
    /// Build the outcome of a completed comparison
    #[must_use]
    pub fn compared(version: impl Into<String>, result: ComparisonResult) -> Self {
        let status = if result.is_identical() {
            OutcomeStatus::Match
        } else {
            OutcomeStatus::Mismatch(result)
        };
        Self {
            version: version.into(),
            status,
        }
    }

    #[must_use]
    pub fn skipped(version: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            version: version.into(),
            status: OutcomeStatus::Skipped(reason),
        }
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        matches!(self.status, OutcomeStatus::Match)
    }

    #[must_use]
    pub fn is_mismatch(&self) -> bool {
        matches!(self.status, OutcomeStatus::Mismatch(_))
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self.status, OutcomeStatus::Skipped(_))
    }
}

/// Outcome counts for a run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub skipped: usize,
}

impl AuditSummary {
    #[must_use]
    pub fn from_outcomes(outcomes: &[VersionOutcome]) -> Self {
        let mut summary = Self {
            total: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.status {
                OutcomeStatus::Match => summary.matched += 1,
                OutcomeStatus::Mismatch(_) => summary.mismatched += 1,
                OutcomeStatus::Skipped(_) => summary.skipped += 1,
            }
        }
        summary
    }
}

/// Result of a full audit run, one outcome per enumerated version in
/// enumeration order
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditReport {
    pub package: String,
    pub repository: String,
    pub generated_at: DateTime<Utc>,
    pub outcomes: Vec<VersionOutcome>,
    pub summary: AuditSummary,
}

impl AuditReport {
    #[must_use]
    pub fn new(
        package: impl Into<String>,
        repository: impl Into<String>,
        outcomes: Vec<VersionOutcome>,
    ) -> Self {
        let summary = AuditSummary::from_outcomes(&outcomes);
        Self {
            package: package.into(),
            repository: repository.into(),
            generated_at: Utc::now(),
            outcomes,
            summary,
        }
    }

    /// Versions in report order
    #[must_use]
    pub fn versions(&self) -> Vec<&str> {
        self.outcomes.iter().map(|o| o.version.as_str()).collect()
    }

    #[must_use]
    pub fn has_mismatches(&self) -> bool {
        self.summary.mismatched > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FileDifference, LineDifference};

    fn mismatch() -> ComparisonResult {
        ComparisonResult::new(vec![FileDifference {
            path: "x.py".into(),
            differences: vec![LineDifference::new(1, Some("a".into()), Some("b".into()))],
        }])
    }

    #[test]
    fn test_compared_picks_status() {
        assert!(VersionOutcome::compared("1.0.0", ComparisonResult::default()).is_match());
        assert!(VersionOutcome::compared("1.0.0", mismatch()).is_mismatch());
    }

    #[test]
    fn test_summary_counts() {
        let report = AuditReport::new(
            "pkg",
            "owner/pkg",
            vec![
                VersionOutcome::compared("2.0.0", mismatch()),
                VersionOutcome::compared("1.1.0", ComparisonResult::default()),
                VersionOutcome::skipped(
                    "1.0.0",
                    SkipReason::FetchFailed {
                        failures: vec![ChannelFailure {
                            channel: Channel::Source,
                            message: "HTTP error 404".into(),
                        }],
                    },
                ),
            ],
        );
        assert_eq!(
            report.summary,
            AuditSummary {
                total: 3,
                matched: 1,
                mismatched: 1,
                skipped: 1
            }
        );
        assert!(report.has_mismatches());
        assert_eq!(report.versions(), vec!["2.0.0", "1.1.0", "1.0.0"]);
    }

    #[test]
    fn test_skip_reason_names_failed_side() {
        let reason = SkipReason::FetchFailed {
            failures: vec![
                ChannelFailure {
                    channel: Channel::Registry,
                    message: "no wheel".into(),
                },
                ChannelFailure {
                    channel: Channel::Source,
                    message: "HTTP error 404".into(),
                },
            ],
        };
        assert_eq!(
            reason.to_string(),
            "registry fetch failed (no wheel); source fetch failed (HTTP error 404)"
        );
    }

    #[test]
    fn test_comparison_failure_display() {
        let reason = SkipReason::ComparisonFailed {
            message: "task panicked".into(),
        };
        assert_eq!(reason.to_string(), "comparison failed (task panicked)");
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome = VersionOutcome::compared("1.0.0", ComparisonResult::default());
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert_eq!(json["status"], "match");
    }
}
