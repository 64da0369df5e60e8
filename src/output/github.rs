//! GitHub Actions workflow-command renderer.
//!
//! Each finding becomes `::<level> file=..,line=..,col=..,title=..::message`,
//! which Actions turns into an annotation on the pull request's Files tab.

use crate::models::{Severity, SurfacedFinding};
use crate::output::OutputRenderer;

/// GitHub Actions annotation renderer.
pub struct GithubRenderer;

impl OutputRenderer for GithubRenderer {
    fn render(&self, findings: &[SurfacedFinding]) -> String {
        let mut output = String::new();
        for s in findings {
            let level = match s.finding.level() {
                Some(Severity::Error) => "error",
                Some(Severity::Warning) => "warning",
                Some(Severity::Info) | None => "notice",
            };
            let mut props = vec![
                format!("file={}", escape_property(&s.path)),
                format!("line={}", s.finding.line),
            ];
            if let Some(col) = s.finding.column {
                props.push(format!("col={col}"));
            }
            if let Some(source) = s.finding.source.as_deref() {
                props.push(format!("title={}", escape_property(source)));
            }
            output.push_str(&format!("::{level} {}::{}\n", props.join(","), escape_data(&s.finding.message)));
        }
        output
    }
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures::surfaced;

    #[test]
    fn renders_annotation_per_finding() {
        let findings = vec![
            surfaced("src/a.go", 42, "warning", Some("govet"), "unused var"),
            surfaced("src/b.go", 7, "error", None, "bad"),
            surfaced("src/c.go", 1, "note", None, "fyi"),
        ];
        let output = GithubRenderer.render(&findings);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "::warning file=src/a.go,line=42,col=3,title=govet::unused var");
        assert_eq!(lines[1], "::error file=src/b.go,line=7,col=3::bad");
        assert_eq!(lines[2], "::notice file=src/c.go,line=1,col=3::fyi");
    }

    #[test]
    fn escapes_special_characters() {
        let findings = vec![surfaced("a.go", 1, "error", Some("a:b,c"), "100% wrong\nreally")];
        let output = GithubRenderer.render(&findings);
        assert!(output.contains("title=a%3Ab%2Cc"));
        assert!(output.contains("::100%25 wrong%0Areally"));
    }

    #[test]
    fn empty_renders_nothing() {
        assert_eq!(GithubRenderer.render(&[]), "");
    }
}
