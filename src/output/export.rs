//! Report export
//!
//! Writes run results to a file, choosing the format from the extension.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

use super::{OutputFormat, ResultFormatter};
use crate::report::RunSummary;

/// Export file formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ExportFormat::Json,
            Some("csv") => ExportFormat::Csv,
            _ => ExportFormat::Text,
        }
    }
}

/// Write all rounds to `path`
pub fn write_report(path: &Path, summaries: &[RunSummary]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    match ExportFormat::from_path(path) {
        ExportFormat::Json => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            serde_json::to_writer_pretty(BufWriter::new(file), summaries)
                .context("Failed to serialize report")?;
        }
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_path(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;

            writer.write_record([
                "round",
                "qualified_name",
                "size",
                "runner",
                "outcome",
                "duration_ms",
                "message",
            ])?;

            for summary in summaries {
                for result in &summary.results {
                    writer.write_record([
                        summary.round.to_string(),
                        result.unit.qualified_name.clone(),
                        result.unit.size.name().to_string(),
                        result.unit.runner_kind.clone(),
                        result.outcome.to_string(),
                        result.duration_ms.to_string(),
                        result.failure_message.clone().unwrap_or_default(),
                    ])?;
                }
            }
            writer.flush()?;
        }
        ExportFormat::Text => {
            let formatter = ResultFormatter::new(OutputFormat::Table).no_color();
            let mut file = BufWriter::new(
                File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
            );
            for summary in summaries {
                writeln!(file, "{}", formatter.format_summary(summary))?;
            }
            file.flush()?;
        }
    }

    info!("Wrote report to {}", path.display());
    Ok(())
}
