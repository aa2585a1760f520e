#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in provaudit
//!
//! Library crates never print. Progress and diagnostics travel as events
//! over an unbounded channel to the CLI, which renders them and forwards
//! them to tracing.
//!
//! ## Architecture
//!
//! - **Domain-driven events**: events grouped by functional domain (Audit, Download, General)
//! - **Unified `EventEmitter` trait**: one API for raw senders and structs holding one
//! - **Tracing integration**: every event knows its own log level

pub mod events;
pub use events::{AppEvent, AuditEvent, DownloadEvent, GeneralEvent};

use provaudit_types::{AuditSummary, Channel};
use tokio::sync::mpsc::UnboundedSender;

/// Type alias for event sender using the `AppEvent` system
pub type EventSender = UnboundedSender<AppEvent>;

/// Type alias for event receiver using the `AppEvent` system
pub type EventReceiver = tokio::sync::mpsc::UnboundedReceiver<AppEvent>;

/// Create a new event channel with the `AppEvent` system
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout provaudit
///
/// This trait provides a single, consistent API for emitting events regardless of
/// whether you have a raw `EventSender` or a struct that contains one.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        if let Some(sender) = self.event_sender() {
            // Ignore send errors - if receiver is dropped, we just continue
            let _ = sender.send(event);
        }
    }

    /// Emit a debug log event
    fn emit_debug(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::debug(message)));
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a download started event
    fn emit_download_started(&self, channel: Channel, version: &str, url: impl Into<String>) {
        self.emit(AppEvent::Download(DownloadEvent::Started {
            channel,
            version: version.to_string(),
            url: url.into(),
        }));
    }

    /// Emit a download completed event
    fn emit_download_completed(&self, channel: Channel, version: &str, bytes: u64) {
        self.emit(AppEvent::Download(DownloadEvent::Completed {
            channel,
            version: version.to_string(),
            bytes,
        }));
    }

    /// Emit a download failed event
    fn emit_download_failed(&self, channel: Channel, version: &str, error: impl Into<String>) {
        self.emit(AppEvent::Download(DownloadEvent::Failed {
            channel,
            version: version.to_string(),
            error: error.into(),
        }));
    }

    /// Emit an audit run started event
    fn emit_audit_started(&self, package: &str, version_count: usize) {
        self.emit(AppEvent::Audit(AuditEvent::RunStarted {
            package: package.to_string(),
            version_count,
        }));
    }

    /// Emit an audit run completed event
    fn emit_audit_completed(&self, package: &str, summary: AuditSummary) {
        self.emit(AppEvent::Audit(AuditEvent::RunCompleted {
            package: package.to_string(),
            summary,
        }));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}

impl EventEmitter for Option<EventSender> {
    fn event_sender(&self) -> Option<&EventSender> {
        self.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_emit_through_sender() {
        let (tx, mut rx) = channel();
        tx.emit_audit_started("pkg", 2);
        tx.emit_download_failed(Channel::Source, "1.1.0", "HTTP error 404");

        match rx.recv().await {
            Some(AppEvent::Audit(AuditEvent::RunStarted { version_count, .. })) => {
                assert_eq!(version_count, 2);
            }
            other => panic!("unexpected event: {other:?}"),
        }
        match rx.recv().await {
            Some(AppEvent::Download(DownloadEvent::Failed { channel, .. })) => {
                assert_eq!(channel, Channel::Source);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (tx, rx) = channel();
        drop(rx);
        tx.emit_warning("nobody is listening");

        let none: Option<EventSender> = None;
        none.emit_debug("no sender at all");
    }
}
