//! Terminal output for DriveMirror commands
//!
//! Two modes: human-readable lines for interactive use and JSON documents
//! for scripting. The cycle summary is the main payload, so it gets its
//! own rendering; everything else is short status lines. In JSON mode
//! every call emits a document, nothing is silently dropped.

use drivemirror_sync::CycleSummary;

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Renders command results in the selected format.
///
/// Status lines go to stdout, warnings and errors to stderr, so piped
/// JSON output stays parseable.
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn status(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("\u{2713} {message}"),
            OutputFormat::Json => println!("{}", serde_json::json!({ "status": message })),
        }
    }

    pub fn warn(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("\u{26a0} Warning: {message}"),
            OutputFormat::Json => eprintln!("{}", serde_json::json!({ "warning": message })),
        }
    }

    pub fn error(&self, message: &str) {
        match self.format {
            OutputFormat::Human => eprintln!("\u{2717} Error: {message}"),
            OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": message })),
        }
    }

    /// Pretty-printed JSON document on stdout, regardless of format.
    pub fn document(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }

    /// Renders the outcome of one sync cycle: the full summary document
    /// in JSON mode, a counts block plus warnings in human mode.
    pub fn cycle_summary(&self, summary: &CycleSummary) {
        match self.format {
            OutputFormat::Json => {
                if let Ok(doc) = serde_json::to_value(summary) {
                    self.document(&doc);
                }
            }
            OutputFormat::Human => {
                self.status(&format!(
                    "Sync cycle finished in {:.1}s",
                    summary.duration_ms as f64 / 1000.0
                ));
                for line in count_lines(summary) {
                    println!("  {line}");
                }
                for warning in summary_warnings(summary) {
                    self.warn(&warning);
                }
            }
        }
    }
}

/// Transfer counts for the human summary block. Skipped items only
/// happen on cancellation, so the line is omitted when zero.
fn count_lines(summary: &CycleSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Uploaded:   {}", summary.uploaded),
        format!("Downloaded: {}", summary.downloaded),
    ];
    if summary.skipped > 0 {
        lines.push(format!("Skipped:    {}", summary.skipped));
    }
    lines
}

/// Conditions worth calling out after the counts.
fn summary_warnings(summary: &CycleSummary) -> Vec<String> {
    let mut warnings = Vec::new();
    if summary.conflicts > 0 {
        warnings.push(format!(
            "{} conflict(s): local content kept, see log for paths",
            summary.conflicts
        ));
    }
    if summary.failed > 0 {
        warnings.push(format!(
            "{} transfer(s) failed and will be retried on the next run",
            summary.failed
        ));
    }
    warnings
}
