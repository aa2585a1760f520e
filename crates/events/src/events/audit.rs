use provaudit_types::AuditSummary;
use serde::{Deserialize, Serialize};

/// Audit run and per-version progress events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuditEvent {
    /// Versions were enumerated and the run is starting
    RunStarted {
        package: String,
        version_count: usize,
    },

    /// Fetching for a version has begun
    VersionStarted { version: String },

    /// Both archives are content-identical
    VersionMatched { version: String },

    /// The archives differ
    VersionMismatched {
        version: String,
        files: usize,
        lines: usize,
    },

    /// The version could not be compared
    VersionSkipped { version: String, reason: String },

    /// Every version has an outcome
    RunCompleted {
        package: String,
        summary: AuditSummary,
    },
}
