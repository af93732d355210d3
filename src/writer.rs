use crate::error::{FcaError, FcaResult};
use crate::excel::ReportExporter;
use crate::session::Selection;
use crate::types::{ComparisonRow, H1Comparison};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Comparison of two products as written to disk, with free-text annotations.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub selection: Selection,
    pub h2: Vec<ComparisonRow>,
    pub h1: Vec<H1Comparison>,
    pub annotations: Vec<String>,
}

impl ComparisonReport {
    pub fn new(
        selection: Selection,
        h2: Vec<ComparisonRow>,
        h1: Vec<H1Comparison>,
        annotations: Vec<String>,
    ) -> Self {
        Self {
            generated_at: Utc::now(),
            selection,
            h2,
            h1,
            annotations,
        }
    }
}

/// Write a report; the format follows the file extension (.json, .yaml/.yml, .xlsx).
pub fn write_report(path: &Path, report: &ComparisonReport) -> FcaResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "json" => {
            let content = serde_json::to_string_pretty(report)?;
            fs::write(path, content)?;
        }
        "yaml" | "yml" => {
            let content = serde_yaml::to_string(report)?;
            fs::write(path, content)?;
        }
        "xlsx" => ReportExporter::new(report).export(path)?,
        _ => {
            return Err(FcaError::Export(format!(
                "Unsupported output format: '{}'. Use .json, .yaml or .xlsx",
                extension
            )))
        }
    }
    Ok(())
}
