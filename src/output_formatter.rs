use crate::errors::Result;
use crate::replacer::{RunSummary, TargetReport};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Defines the possible output formats for a patch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One `<outcome>: <path>` line per target, printed as each target finishes.
    Text,
    /// A single JSON document printed after the run.
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            _ => OutputFormat::Text,
        }
    }
}

/// Renders per-target outcomes and run summaries.
pub struct OutputFormatter {
    format: OutputFormat,
    tool_name: String,
    tool_version: String,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            tool_name: env!("CARGO_PKG_NAME").to_string(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// The line to print as soon as a target is processed, if any.
    pub fn format_line(&self, report: &TargetReport) -> Option<String> {
        match self.format {
            OutputFormat::Text => Some(format!(
                "{}: {}",
                report.outcome.label(),
                report.path.display()
            )),
            OutputFormat::Json => None,
        }
    }

    /// The document to print once the run is over, if any.
    pub fn format_summary(&self, summary: &RunSummary) -> Result<Option<String>> {
        match self.format {
            OutputFormat::Text => Ok(None),
            OutputFormat::Json => self.format_json(summary).map(Some),
        }
    }

    fn format_json(&self, summary: &RunSummary) -> Result<String> {
        #[derive(Serialize)]
        struct JsonOutput<'a> {
            tool: ToolInfo<'a>,
            run_time: DateTime<Utc>,
            changed: bool,
            targets: &'a [TargetReport],
        }

        #[derive(Serialize)]
        struct ToolInfo<'a> {
            name: &'a str,
            version: &'a str,
        }

        let output = JsonOutput {
            tool: ToolInfo {
                name: &self.tool_name,
                version: &self.tool_version,
            },
            run_time: Utc::now(),
            changed: summary.changed,
            targets: &summary.targets,
        };

        Ok(serde_json::to_string_pretty(&output)?)
    }
}
