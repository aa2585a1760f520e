use serde::{Deserialize, Serialize};

pub mod audit;
pub mod download;
pub mod general;

pub use audit::AuditEvent;
pub use download::DownloadEvent;
pub use general::GeneralEvent;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// General utility events (warnings, errors, debug)
    General(GeneralEvent),

    /// Audit run and per-version progress
    Audit(AuditEvent),

    /// Artifact downloads per channel
    Download(DownloadEvent),
}

impl AppEvent {
    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::General(GeneralEvent::Error { .. }) => Level::ERROR,

            Self::General(GeneralEvent::Warning { .. })
            | Self::Audit(AuditEvent::VersionMismatched { .. } | AuditEvent::VersionSkipped { .. })
            | Self::Download(DownloadEvent::Failed { .. }) => Level::WARN,

            Self::General(GeneralEvent::DebugLog { .. })
            | Self::Download(DownloadEvent::Started { .. } | DownloadEvent::Completed { .. })
            | Self::Audit(AuditEvent::VersionStarted { .. }) => Level::DEBUG,

            Self::Audit(
                AuditEvent::RunStarted { .. }
                | AuditEvent::RunCompleted { .. }
                | AuditEvent::VersionMatched { .. },
            ) => Level::INFO,
        }
    }
}
