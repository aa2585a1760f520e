//! Structured logging integration for events
//!
//! Every event the handler sees is also recorded through tracing, at the
//! level the event declares, with its fields attached.

use provaudit_events::{AppEvent, AuditEvent, DownloadEvent, GeneralEvent};
use tracing::Level;

macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        match $level {
            Level::ERROR => tracing::error!($($arg)+),
            Level::WARN => tracing::warn!($($arg)+),
            Level::INFO => tracing::info!($($arg)+),
            Level::DEBUG => tracing::debug!($($arg)+),
            _ => tracing::trace!($($arg)+),
        }
    };
}

/// Log an `AppEvent` using the tracing infrastructure with structured fields
pub fn log_event_with_tracing(event: &AppEvent) {
    let level = event.log_level();

    match event {
        AppEvent::General(general) => match general {
            GeneralEvent::Warning { message, context } => {
                log_at!(level, context = ?context, "{message}");
            }
            GeneralEvent::Error { message, details } => {
                log_at!(level, details = ?details, "{message}");
            }
            GeneralEvent::DebugLog { message } => {
                log_at!(level, "{message}");
            }
        },

        AppEvent::Download(download) => match download {
            DownloadEvent::Started {
                channel,
                version,
                url,
            } => {
                log_at!(level, %channel, version = %version, url = %url, "Download started");
            }
            DownloadEvent::Completed {
                channel,
                version,
                bytes,
            } => {
                log_at!(level, %channel, version = %version, bytes = bytes, "Download completed");
            }
            DownloadEvent::Failed {
                channel,
                version,
                error,
            } => {
                log_at!(level, %channel, version = %version, error = %error, "Download failed");
            }
        },

        AppEvent::Audit(audit) => match audit {
            AuditEvent::RunStarted {
                package,
                version_count,
            } => {
                log_at!(level, package = %package, version_count = version_count, "Audit started");
            }
            AuditEvent::VersionStarted { version } => {
                log_at!(level, version = %version, "Version started");
            }
            AuditEvent::VersionMatched { version } => {
                log_at!(level, version = %version, "Version matched");
            }
            AuditEvent::VersionMismatched {
                version,
                files,
                lines,
            } => {
                log_at!(level, version = %version, files = files, lines = lines, "Version mismatched");
            }
            AuditEvent::VersionSkipped { version, reason } => {
                log_at!(level, version = %version, reason = %reason, "Version skipped");
            }
            AuditEvent::RunCompleted { package, summary } => {
                log_at!(
                    level,
                    package = %package,
                    total = summary.total,
                    matched = summary.matched,
                    mismatched = summary.mismatched,
                    skipped = summary.skipped,
                    "Audit completed"
                );
            }
        },
    }
}
