#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! High-level operations orchestration for provaudit
//!
//! This crate serves as the orchestration layer between the CLI and the
//! specialized crates: it enumerates versions, drives both artifact
//! sources, runs the comparator and assembles the report.

mod audit;
mod context;
mod query;

pub use audit::{audit_version, run_audit};
pub use context::{version_index, AuditContextBuilder, AuditCtx};
pub use query::{compare_local, list_versions};

use provaudit_errors::{Error, OpsError};
use provaudit_types::{AuditReport, ComparisonResult};

/// Operation result that can be serialized for CLI output
#[derive(Clone, Debug, serde::Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OperationResult {
    /// Full audit report
    AuditReport(AuditReport),
    /// Published versions, newest first
    VersionList {
        package: String,
        versions: Vec<String>,
    },
    /// Comparison of two local archives
    Comparison {
        package: String,
        result: ComparisonResult,
    },
}

impl OperationResult {
    /// Convert to JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the result cannot be serialized.
    pub fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(|e| {
            OpsError::SerializationError {
                message: e.to_string(),
            }
            .into()
        })
    }

    /// True when any compared archives differ
    #[must_use]
    pub fn has_mismatches(&self) -> bool {
        match self {
            OperationResult::AuditReport(report) => report.has_mismatches(),
            OperationResult::Comparison { result, .. } => !result.is_identical(),
            OperationResult::VersionList { .. } => false,
        }
    }
}
