//! Output rendering and formatting

use comfy_table::{
    presets::{ASCII_FULL, UTF8_FULL},
    Attribute, Cell, Color, ContentArrangement, Table,
};
use console::{Style, Term};
use provaudit_ops::OperationResult;
use provaudit_types::{
    AuditReport, AuditSummary, ColorChoice, ComparisonResult, FileDifference, LineDifference,
    OutcomeStatus, OutputFormat, VersionOutcome,
};
use std::fmt::Write as _;
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    format: OutputFormat,
    /// Color configuration
    color_choice: ColorChoice,
    /// List every differing line instead of a per-file count
    full_diff: bool,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(format: OutputFormat, color_choice: ColorChoice, full_diff: bool) -> Self {
        Self {
            format,
            color_choice,
            full_diff,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        let rendered = match self.format {
            OutputFormat::Json => result.to_json().map_err(io::Error::other)?,
            OutputFormat::Tty | OutputFormat::Plain => self.render_text(result),
        };
        self.term.write_line(rendered.trim_end())
    }

    fn render_text(&self, result: &OperationResult) -> String {
        match result {
            OperationResult::AuditReport(report) => self.render_audit_report(report),
            OperationResult::VersionList { package, versions } => {
                self.render_version_list(package, versions)
            }
            OperationResult::Comparison { package, result } => {
                self.render_comparison(package, result)
            }
        }
    }

    fn render_audit_report(&self, report: &AuditReport) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({})",
            self.paint(Style::new().bold(), &report.package),
            report.repository
        );
        let _ = writeln!(
            out,
            "Generated: {}",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        out.push('\n');

        if report.outcomes.is_empty() {
            out.push_str("No versions audited\n");
        }

        let width = report
            .outcomes
            .iter()
            .map(|o| o.version.len())
            .max()
            .unwrap_or(0);
        for outcome in &report.outcomes {
            self.render_outcome(&mut out, outcome, width);
        }

        out.push('\n');
        out.push_str(&self.summary_table(&report.summary).to_string());
        out.push('\n');
        out
    }

    fn render_outcome(&self, out: &mut String, outcome: &VersionOutcome, width: usize) {
        let version = format!("{:width$}", outcome.version);
        match &outcome.status {
            OutcomeStatus::Match => {
                let _ = writeln!(out, "  {version}  {}", self.paint(Style::new().green(), "OK"));
            }
            OutcomeStatus::Mismatch(result) => {
                let label = format!("MISMATCH ({})", plural(result.file_count(), "file"));
                let _ = writeln!(
                    out,
                    "  {version}  {}",
                    self.paint(Style::new().red().bold(), &label)
                );
                let indent = " ".repeat(width + 6);
                self.render_differences(out, result, &indent);
            }
            OutcomeStatus::Skipped(reason) => {
                let _ = writeln!(
                    out,
                    "  {version}  {}",
                    self.paint(Style::new().yellow(), &format!("SKIPPED: {reason}"))
                );
            }
        }
    }

    fn render_version_list(&self, package: &str, versions: &[String]) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{} ({})",
            self.paint(Style::new().bold(), package),
            plural(versions.len(), "version")
        );
        for version in versions {
            let _ = writeln!(out, "  {version}");
        }
        out
    }

    fn render_comparison(&self, package: &str, result: &ComparisonResult) -> String {
        let mut out = String::new();
        if result.is_identical() {
            let _ = writeln!(
                out,
                "{}: {}",
                package,
                self.paint(Style::new().green(), "archives are identical")
            );
            return out;
        }

        let _ = writeln!(
            out,
            "{}: {}",
            package,
            self.paint(
                Style::new().red().bold(),
                &format!(
                    "differences in {} ({})",
                    plural(result.file_count(), "file"),
                    plural(result.line_count(), "line")
                )
            )
        );
        self.render_differences(&mut out, result, "  ");
        out
    }

    fn render_differences(&self, out: &mut String, result: &ComparisonResult, indent: &str) {
        for file in &result.files {
            if self.full_diff {
                let _ = writeln!(out, "{indent}{}", self.paint(Style::new().bold(), &file.path));
                for line in &file.differences {
                    self.render_line(out, line, indent);
                }
            } else {
                let _ = writeln!(out, "{indent}{}", file_summary(file));
            }
        }
    }

    fn render_line(&self, out: &mut String, line: &LineDifference, indent: &str) {
        let number = line.line_number;
        let _ = writeln!(
            out,
            "{indent}  {number:>5} {}",
            self.paint(Style::new().red(), &format!("- {}", side(line.left.as_deref())))
        );
        let _ = writeln!(
            out,
            "{indent}        {}",
            self.paint(Style::new().green(), &format!("+ {}", side(line.right.as_deref())))
        );
    }

    fn summary_table(&self, summary: &AuditSummary) -> Table {
        let mut table = Table::new();
        table
            .load_preset(if self.format == OutputFormat::Plain {
                ASCII_FULL
            } else {
                UTF8_FULL
            })
            .set_content_arrangement(ContentArrangement::Dynamic);
        if self.supports_color() {
            table.enforce_styling();
        } else {
            table.force_no_tty();
        }

        table.set_header(vec![
            Cell::new("Versions").add_attribute(Attribute::Bold),
            Cell::new("Matched").add_attribute(Attribute::Bold),
            Cell::new("Mismatched").add_attribute(Attribute::Bold),
            Cell::new("Skipped").add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new(summary.total),
            Cell::new(summary.matched).fg(Color::Green),
            if summary.mismatched > 0 {
                Cell::new(summary.mismatched).fg(Color::Red)
            } else {
                Cell::new(summary.mismatched)
            },
            if summary.skipped > 0 {
                Cell::new(summary.skipped).fg(Color::Yellow)
            } else {
                Cell::new(summary.skipped)
            },
        ]);
        table
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.supports_color() {
            style.force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        if self.format == OutputFormat::Plain {
            return false;
        }
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}

fn file_summary(file: &FileDifference) -> String {
    format!("{} ({})", file.path, plural(file.differences.len(), "line"))
}

fn side(line: Option<&str>) -> &str {
    line.unwrap_or("<absent>")
}

fn plural(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
