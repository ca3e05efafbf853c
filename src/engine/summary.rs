//! Markdown summary of a fetched run
//!
//! One section per job, one line per step. Failed steps that carry a log get
//! a collapsible block with a short preview of it.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::engine::error::SummaryError;
use crate::snapshot::{truncate_log, RunRecord, SnapshotLoader};

/// Preview cap for failed-step logs in the report
pub const SUMMARY_LOG_CAP: usize = 2_000;

pub const SUMMARY_TITLE: &str = "# Workflow Fix Attempt Summary";

const SUCCESS_GLYPH: &str = "✅";
const FAILURE_GLYPH: &str = "❌";

pub struct SummaryRenderer {
    log_cap: usize,
}

impl Default for SummaryRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryRenderer {
    pub fn new() -> Self {
        Self {
            log_cap: SUMMARY_LOG_CAP,
        }
    }

    pub fn with_log_cap(mut self, cap: usize) -> Self {
        self.log_cap = cap;
        self
    }

    /// Load the snapshot at `path` and render it.
    pub fn render_file(
        &self,
        path: &Path,
        generated_at: DateTime<Utc>,
    ) -> Result<String, SummaryError> {
        let run = SnapshotLoader::load_file(path)?;
        Ok(self.render(&run, generated_at))
    }

    pub fn render(&self, run: &RunRecord, generated_at: DateTime<Utc>) -> String {
        let mut lines = vec![
            SUMMARY_TITLE.to_string(),
            String::new(),
            format!("Generated at: {}", generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
            String::new(),
            "## Workflow Details".to_string(),
            format!("- **Name:** {}", run.workflow_name),
            format!("- **Run ID:** {}", run.run_id),
            format!("- **Status:** {}", run.status),
        ];
        if let Some(error) = &run.error {
            lines.push(format!("- **Error:** {}", error));
        }
        lines.push(String::new());

        lines.push("## Job Results".to_string());
        for job in &run.jobs {
            lines.push(format!("### {}", job.name));
            lines.push(format!("Status: {}", job.status));
            lines.push(String::new());
            lines.push("#### Steps:".to_string());

            for step in &job.steps {
                let glyph = if step.status.is_success() {
                    SUCCESS_GLYPH
                } else {
                    FAILURE_GLYPH
                };
                lines.push(format!("{} {}", glyph, step.name));

                if let (true, Some(log)) = (step.status.is_failure(), &step.log_content) {
                    lines.push(String::new());
                    lines.push("<details><summary>Error Logs</summary>".to_string());
                    lines.push(String::new());
                    lines.push("```".to_string());
                    lines.push(truncate_log(log, self.log_cap));
                    lines.push("```".to_string());
                    lines.push("</details>".to_string());
                    lines.push(String::new());
                }
            }
            lines.push(String::new());
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// Report written when the summary itself could not be built
pub fn fallback_report(error: &SummaryError) -> String {
    format!("{}\n\nError creating summary: {}\n", SUMMARY_TITLE, error)
}
