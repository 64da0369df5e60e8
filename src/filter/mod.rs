//! Finding filter: keep only findings on lines the diff touched.
//!
//! Findings on unmodified files, on untouched lines of modified files, or
//! with paths that cannot be placed in the repository are dropped.

use tracing::debug;

use crate::identity::identify;
use crate::index::{LineIndex, PathNormalizer};
use crate::models::finding::{FindingsByFile, SurfacedFinding};

/// Filter `findings` against `index`.
///
/// Files are visited in the order of the findings collection, and findings
/// keep their input order within a file. The result does not depend on
/// anything but the arguments.
pub fn filter_findings(
    findings: &FindingsByFile,
    index: &LineIndex,
    normalizer: &PathNormalizer,
) -> Vec<SurfacedFinding> {
    let mut surfaced = Vec::new();

    for (file, file_findings) in findings {
        let Some(path) = normalizer.normalize_report_path(file) else {
            debug!(file = %file, "cannot place report path in repository, skipping");
            continue;
        };
        if !index.contains_file(&path) {
            debug!(file = %path, count = file_findings.len(), "file not in diff");
            continue;
        }

        for finding in file_findings {
            match index.lookup(&path, finding.line) {
                Some(diff_line) => surfaced.push(SurfacedFinding {
                    key: identify(&path, finding),
                    path: path.clone(),
                    diff_line: diff_line.clone(),
                    finding: finding.clone(),
                }),
                None => debug!(file = %path, line = finding.line, "line not touched by diff"),
            }
        }
    }

    surfaced
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parser::parse_unified_diff;
    use crate::models::finding::Finding;
    use pretty_assertions::assert_eq;

    const DIFF: &str = "diff --git a/src/A.java b/src/A.java\n--- a/src/A.java\n+++ b/src/A.java\n@@ -1,2 +1,3 @@\n class A {\n+  int x;\n }\ndiff --git a/src/B.java b/src/B.java\n--- a/src/B.java\n+++ b/src/B.java\n@@ -5 +5 @@\n-old\n+new\n";

    fn finding(file: &str, line: u32, message: &str) -> Finding {
        Finding {
            file: file.into(),
            line,
            column: None,
            message: message.into(),
            severity: "warning".into(),
            source: None,
        }
    }

    fn grouped(findings: Vec<Finding>) -> FindingsByFile {
        let mut map = FindingsByFile::new();
        for f in findings {
            map.entry(f.file.clone()).or_default().push(f);
        }
        map
    }

    fn index() -> LineIndex {
        LineIndex::build(&parse_unified_diff(DIFF).unwrap(), &PathNormalizer::new())
    }

    #[test]
    fn keeps_findings_on_touched_lines_only() {
        let findings = grouped(vec![
            finding("src/A.java", 2, "added line"),
            finding("src/A.java", 1, "context line"),
            finding("src/A.java", 40, "far away"),
            finding("src/C.java", 1, "unmodified file"),
        ]);
        let out = filter_findings(&findings, &index(), &PathNormalizer::new());
        let messages: Vec<_> = out.iter().map(|s| s.finding.message.as_str()).collect();
        assert_eq!(messages, vec!["added line", "context line"]);
        assert_eq!(out[0].diff_line.content, "  int x;");
    }

    #[test]
    fn preserves_findings_collection_order() {
        let findings = grouped(vec![
            finding("src/B.java", 5, "b5"),
            finding("src/A.java", 3, "a3"),
            finding("src/A.java", 2, "a2"),
        ]);
        let out = filter_findings(&findings, &index(), &PathNormalizer::new());
        let messages: Vec<_> = out.iter().map(|s| s.finding.message.as_str()).collect();
        assert_eq!(messages, vec!["b5", "a3", "a2"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let findings = grouped(vec![
            finding("src/A.java", 2, "x"),
            finding("src/B.java", 5, "y"),
            finding("src/B.java", 6, "z"),
        ]);
        let idx = index();
        let n = PathNormalizer::new();
        assert_eq!(filter_findings(&findings, &idx, &n), filter_findings(&findings, &idx, &n));
    }

    #[test]
    fn report_paths_are_normalized_before_lookup() {
        let findings = grouped(vec![
            finding("/ci/repo/src/A.java", 2, "absolute"),
            finding("./src/B.java", 5, "dotted"),
            finding("/elsewhere/A.java", 2, "outside"),
        ]);
        let n = PathNormalizer::new().with_root("/ci/repo");
        let out = filter_findings(&findings, &index(), &n);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].path, "src/A.java");
        assert_eq!(out[0].finding.file, "/ci/repo/src/A.java");
        assert_eq!(out[1].path, "src/B.java");
    }

    #[test]
    fn surfaced_findings_carry_identity() {
        let findings = grouped(vec![finding("src/A.java", 2, "x")]);
        let out = filter_findings(&findings, &index(), &PathNormalizer::new());
        assert_eq!(out[0].key, identify("src/A.java", &out[0].finding));
    }
}
