//! Analysis report decoding.
//!
//! Turns a findings report (Checkstyle XML, or a JSON list of findings)
//! into [`FindingsByFile`], keeping the report's file and finding order.

pub mod checkstyle;
pub mod json;

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use thiserror::Error;

use crate::models::finding::FindingsByFile;

/// Errors from report loading.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("report not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read report {path}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed {format} report: {reason}")]
    Parse {
        format: &'static str,
        reason: String,
    },
}

/// Supported report formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Pick by file extension (`.json` → JSON, anything else → Checkstyle).
    #[default]
    Auto,
    /// Checkstyle XML (`<checkstyle><file><error/></file></checkstyle>`).
    Checkstyle,
    /// JSON array of findings.
    Json,
}

impl ReportFormat {
    /// Resolve `Auto` against the report path.
    pub fn resolve(self, path: &Path) -> Self {
        match self {
            ReportFormat::Auto => match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("json") => ReportFormat::Json,
                _ => ReportFormat::Checkstyle,
            },
            other => other,
        }
    }
}

/// Decode report text in the given (already resolved) format.
pub fn parse_report(text: &str, format: ReportFormat) -> Result<FindingsByFile, ReportError> {
    match format {
        ReportFormat::Json => json::parse_json_report(text),
        ReportFormat::Checkstyle | ReportFormat::Auto => checkstyle::parse_checkstyle(text),
    }
}

/// Read and decode the report at `path`.
pub async fn load_report(path: &Path, format: ReportFormat) -> Result<FindingsByFile, ReportError> {
    if !path.exists() {
        return Err(ReportError::NotFound(path.to_path_buf()));
    }
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ReportError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let findings = parse_report(&text, format.resolve(path))?;
    tracing::info!(
        files = findings.len(),
        findings = findings.values().map(Vec::len).sum::<usize>(),
        report = %path.display(),
        "loaded report"
    );
    Ok(findings)
}
