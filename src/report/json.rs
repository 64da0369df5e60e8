//! JSON report decoder.
//!
//! Accepts either a bare array of findings or `{"findings": [...]}` (the
//! shape written by `--format json`), where each finding has `file`,
//! `line`, `message`, and optionally `column`, `severity` and `source`.

use serde::Deserialize;

use super::ReportError;
use crate::models::finding::{Finding, FindingsByFile};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonReport {
    List(Vec<JsonFinding>),
    Wrapped { findings: Vec<JsonFinding> },
}

#[derive(Debug, Deserialize)]
struct JsonFinding {
    file: String,
    line: u32,
    #[serde(default)]
    column: Option<u32>,
    message: String,
    #[serde(default)]
    severity: String,
    #[serde(default, alias = "rule")]
    source: Option<String>,
}

/// Decode a JSON findings report, grouping by `file` in first-seen order.
pub fn parse_json_report(text: &str) -> Result<FindingsByFile, ReportError> {
    let report: JsonReport = serde_json::from_str(text).map_err(|e| ReportError::Parse {
        format: "json",
        reason: e.to_string(),
    })?;
    let items = match report {
        JsonReport::List(items) | JsonReport::Wrapped { findings: items } => items,
    };

    let mut findings = FindingsByFile::new();
    for item in items {
        findings.entry(item.file.clone()).or_default().push(Finding {
            file: item.file,
            line: item.line,
            column: item.column,
            message: item.message,
            severity: item.severity,
            source: item.source,
        });
    }
    Ok(findings)
}
