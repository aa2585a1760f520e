//! Event handling and progress display

use crate::logging::log_event_with_tracing;
use console::{Style, Term};
use provaudit_events::{AppEvent, AuditEvent, DownloadEvent, GeneralEvent};

/// Event handler for progress display and user feedback
///
/// Progress goes to stderr so stdout carries only the rendered result.
pub struct EventHandler {
    term: Term,
    /// Print nothing; JSON output must stay clean
    quiet: bool,
    /// Also show debug and per-download events
    debug_enabled: bool,
    colors_enabled: bool,
}

impl EventHandler {
    /// Create new event handler
    pub fn new(colors_enabled: bool, debug_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            quiet,
            debug_enabled,
            colors_enabled,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, event: AppEvent) {
        log_event_with_tracing(&event);

        if self.quiet {
            return;
        }

        match event {
            AppEvent::General(general) => self.handle_general(general),
            AppEvent::Audit(audit) => self.handle_audit(audit),
            AppEvent::Download(download) => self.handle_download(download),
        }
    }

    fn handle_general(&self, event: GeneralEvent) {
        match event {
            GeneralEvent::Warning { message, context } => {
                let line = match context {
                    Some(context) => format!("warning: {message} ({context})"),
                    None => format!("warning: {message}"),
                };
                self.show_line(&self.style(Style::new().yellow(), &line));
            }
            GeneralEvent::Error { message, details } => {
                let line = match details {
                    Some(details) => format!("error: {message}\n  {details}"),
                    None => format!("error: {message}"),
                };
                self.show_error(&line);
            }
            GeneralEvent::DebugLog { message } => {
                if self.debug_enabled {
                    self.show_line(&self.style(Style::new().dim(), &format!("debug: {message}")));
                }
            }
        }
    }

    fn handle_audit(&self, event: AuditEvent) {
        match event {
            AuditEvent::RunStarted {
                package,
                version_count,
            } => {
                let noun = if version_count == 1 { "version" } else { "versions" };
                self.show_status(&format!("Auditing {version_count} {noun} of {package}"));
            }
            AuditEvent::VersionStarted { version } => {
                if self.debug_enabled {
                    self.show_status(&format!("  {version}: fetching"));
                }
            }
            // Per-version results are part of the rendered report
            AuditEvent::VersionMatched { .. }
            | AuditEvent::VersionMismatched { .. }
            | AuditEvent::VersionSkipped { .. } => {}
            AuditEvent::RunCompleted { package, summary } => {
                self.show_status(&format!(
                    "Finished {package}: {} matched, {} mismatched, {} skipped",
                    summary.matched, summary.mismatched, summary.skipped
                ));
            }
        }
    }

    fn handle_download(&self, event: DownloadEvent) {
        if !self.debug_enabled {
            return;
        }
        match event {
            DownloadEvent::Started {
                channel,
                version,
                url,
            } => {
                self.show_status(&format!("  {version}: {channel} <- {url}"));
            }
            DownloadEvent::Completed {
                channel,
                version,
                bytes,
            } => {
                self.show_status(&format!("  {version}: {channel} {bytes} bytes"));
            }
            DownloadEvent::Failed {
                channel,
                version,
                error,
            } => {
                self.show_line(&self.style(
                    Style::new().yellow(),
                    &format!("  {version}: {channel} failed: {error}"),
                ));
            }
        }
    }

    fn style(&self, style: Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Show status message
    fn show_status(&self, message: &str) {
        self.show_line(&self.style(Style::new().cyan(), message));
    }

    /// Show error message
    fn show_error(&self, message: &str) {
        self.show_line(&self.style(Style::new().red().bold(), message));
    }

    fn show_line(&self, line: &str) {
        self.term.write_line(line).unwrap_or(());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provaudit_types::{AuditSummary, Channel};

    #[test]
    fn test_event_handler_accepts_every_domain() {
        let mut handler = EventHandler::new(false, true, false);

        handler.handle_event(AppEvent::Audit(AuditEvent::RunStarted {
            package: "requests".to_string(),
            version_count: 2,
        }));
        handler.handle_event(AppEvent::Download(DownloadEvent::Failed {
            channel: Channel::Source,
            version: "2.31.0".to_string(),
            error: "HTTP 404".to_string(),
        }));
        handler.handle_event(AppEvent::General(GeneralEvent::warning("tag missing")));
        handler.handle_event(AppEvent::Audit(AuditEvent::RunCompleted {
            package: "requests".to_string(),
            summary: AuditSummary::default(),
        }));
    }

    #[test]
    fn test_style_without_colors_is_plain() {
        let handler = EventHandler::new(false, false, true);
        assert_eq!(handler.style(Style::new().red(), "text"), "text");
    }
}
