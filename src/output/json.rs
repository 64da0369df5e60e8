//! JSON output renderer.
//!
//! Outputs `{"findings": [...], "summary": {...}}` with one flat object
//! per finding, readable back as a JSON report.

use serde::Serialize;

use crate::models::{IdentityKey, Summary, SurfacedFinding};
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

#[derive(Serialize)]
struct JsonFinding<'a> {
    file: &'a str,
    line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    column: Option<u32>,
    message: &'a str,
    severity: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<&'a str>,
    key: &'a IdentityKey,
}

impl OutputRenderer for JsonRenderer {
    fn render(&self, findings: &[SurfacedFinding]) -> String {
        let summary = Summary::from_surfaced(findings);
        let items: Vec<JsonFinding<'_>> = findings
            .iter()
            .map(|s| JsonFinding {
                file: &s.path,
                line: s.finding.line,
                column: s.finding.column,
                message: &s.finding.message,
                severity: &s.finding.severity,
                source: s.finding.source.as_deref(),
                key: &s.key,
            })
            .collect();

        let output = serde_json::json!({
            "findings": items,
            "summary": summary,
        });

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::surfaced;
    use crate::report::json::parse_json_report;

    #[test]
    fn render_json() {
        let findings = vec![surfaced("src/a.go", 42, "warning", Some("govet"), "unused var")];

        let output = JsonRenderer.render(&findings);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(parsed["findings"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["findings"][0]["file"], "src/a.go");
        assert_eq!(parsed["findings"][0]["key"], "002a");
        assert_eq!(parsed["summary"]["total"], 1);
        assert_eq!(parsed["summary"]["warnings"], 1);
    }

    #[test]
    fn render_empty_json() {
        let output = JsonRenderer.render(&[]);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["findings"].as_array().unwrap().len(), 0);
        assert_eq!(parsed["summary"]["total"], 0);
    }

    #[test]
    fn output_reads_back_as_report() {
        let findings = vec![
            surfaced("src/a.go", 42, "warning", Some("govet"), "unused var"),
            surfaced("src/b.go", 1, "error", None, "syntax"),
        ];
        let report = parse_json_report(&JsonRenderer.render(&findings)).unwrap();
        assert_eq!(report["src/a.go"][0].line, 42);
        assert_eq!(report["src/a.go"][0].source.as_deref(), Some("govet"));
        assert_eq!(report["src/b.go"][0].severity, "error");
    }
}
