//! Line index: which new-file lines a diff touched.
//!
//! Built once per diff and read many times while filtering findings.
//! Only lines that exist in the new revision (added or context) are
//! indexed, since a removed line cannot carry a new-revision comment.

pub mod paths;

use std::collections::{BTreeMap, HashMap};

use crate::models::diff::{DiffLine, FileDiff};

pub use paths::PathNormalizer;

/// Normalized path → new-file line number → originating diff line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineIndex {
    files: HashMap<String, BTreeMap<u32, DiffLine>>,
}

impl LineIndex {
    /// Build the index from parsed file diffs.
    ///
    /// Hunks are applied in document order; if two hunks claim the same
    /// new-file line, the later one wins. Deleted files contribute nothing.
    /// Files without hunks (pure renames, mode changes) are registered with
    /// no lines.
    pub fn build(diffs: &[FileDiff], normalizer: &PathNormalizer) -> Self {
        let mut files: HashMap<String, BTreeMap<u32, DiffLine>> = HashMap::new();

        for file in diffs {
            if file.is_deleted {
                continue;
            }
            let path = normalizer.normalize_diff_path(&file.new_path);
            let lines = files.entry(path).or_default();

            for line in file.hunks.iter().flat_map(|h| &h.lines) {
                if !line.is_indexable() {
                    continue;
                }
                if let Some(no) = line.new_line_no {
                    lines.insert(no, line.clone());
                }
            }
        }

        let index = Self { files };
        tracing::debug!(
            files = index.file_count(),
            lines = index.line_count(),
            "built line index"
        );
        index
    }

    /// The diff line at `line` of the normalized `path`, if the diff touched it.
    pub fn lookup(&self, path: &str, line: u32) -> Option<&DiffLine> {
        self.files.get(path)?.get(&line)
    }

    /// Whether the diff mentions `path` at all.
    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Indexed line numbers for `path`, ascending.
    pub fn lines_for(&self, path: &str) -> Vec<u32> {
        self.files
            .get(path)
            .map(|lines| lines.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    /// Total indexed lines across all files.
    pub fn line_count(&self) -> usize {
        self.files.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::parser::parse_unified_diff;
    use crate::models::diff::{DiffLineType, Hunk};

    const DIFF: &str = "diff --git a/src/A.java b/src/A.java\n--- a/src/A.java\n+++ b/src/A.java\n@@ -10,4 +10,4 @@\n ctx10\n-old11\n+new11\n ctx12\n ctx13\n";

    fn hunk(new_start: u32, contents: &[&str]) -> Hunk {
        Hunk {
            old_start: new_start,
            old_count: contents.len() as u32,
            new_start,
            new_count: contents.len() as u32,
            header: None,
            lines: contents
                .iter()
                .enumerate()
                .map(|(i, c)| DiffLine {
                    line_type: DiffLineType::Context,
                    content: c.to_string(),
                    old_line_no: Some(new_start + i as u32),
                    new_line_no: Some(new_start + i as u32),
                })
                .collect(),
        }
    }

    fn file(path: &str, hunks: Vec<Hunk>) -> FileDiff {
        FileDiff {
            old_path: path.into(),
            new_path: path.into(),
            is_new: false,
            is_deleted: false,
            is_rename: false,
            is_binary: false,
            hunks,
        }
    }

    #[test]
    fn indexes_added_and_context_lines() {
        let diffs = parse_unified_diff(DIFF).unwrap();
        let index = LineIndex::build(&diffs, &PathNormalizer::new());

        assert_eq!(index.lines_for("src/A.java"), vec![10, 11, 12, 13]);
        assert_eq!(index.lookup("src/A.java", 11).unwrap().content, "new11");
        assert_eq!(
            index.lookup("src/A.java", 11).unwrap().line_type,
            DiffLineType::Added
        );
        assert!(index.lookup("src/A.java", 14).is_none());
        assert!(index.lookup("src/B.java", 10).is_none());
    }

    #[test]
    fn removed_lines_are_never_indexed() {
        let diffs = parse_unified_diff(DIFF).unwrap();
        let index = LineIndex::build(&diffs, &PathNormalizer::new());
        for line in diffs.iter().flat_map(|f| &f.hunks).flat_map(|h| &h.lines) {
            if line.line_type == DiffLineType::Removed {
                let indexed = (1..=20).any(|n| index.lookup("src/A.java", n) == Some(line));
                assert!(!indexed, "removed line {line:?} was indexed");
            }
        }
    }

    #[test]
    fn later_hunk_wins_on_overlap() {
        let diffs = vec![file(
            "A.java",
            vec![hunk(5, &["first5", "first6"]), hunk(6, &["second6", "second7"])],
        )];
        let index = LineIndex::build(&diffs, &PathNormalizer::new());
        assert_eq!(index.lookup("A.java", 5).unwrap().content, "first5");
        assert_eq!(index.lookup("A.java", 6).unwrap().content, "second6");
        assert_eq!(index.lookup("A.java", 7).unwrap().content, "second7");
    }

    #[test]
    fn repeated_file_sections_merge() {
        let diffs = vec![
            file("A.java", vec![hunk(1, &["a1"])]),
            file("A.java", vec![hunk(9, &["a9"])]),
        ];
        let index = LineIndex::build(&diffs, &PathNormalizer::new());
        assert_eq!(index.file_count(), 1);
        assert_eq!(index.lines_for("A.java"), vec![1, 9]);
    }

    #[test]
    fn strip_applies_to_index_keys() {
        let diffs = vec![file("module/src/A.java", vec![hunk(1, &["x"])])];
        let index = LineIndex::build(&diffs, &PathNormalizer::new().with_strip(1));
        assert!(index.contains_file("src/A.java"));
        assert!(!index.contains_file("module/src/A.java"));
    }

    #[test]
    fn deleted_files_are_skipped_and_renames_use_new_path() {
        let diff = "diff --git a/Gone.java b/Gone.java\ndeleted file mode 100644\n--- a/Gone.java\n+++ /dev/null\n@@ -1 +0,0 @@\n-x\ndiff --git a/Old.java b/New.java\nsimilarity index 100%\nrename from Old.java\nrename to New.java\n";
        let diffs = parse_unified_diff(diff).unwrap();
        let index = LineIndex::build(&diffs, &PathNormalizer::new());
        assert!(!index.contains_file("Gone.java"));
        assert!(!index.contains_file("/dev/null"));
        assert!(index.contains_file("New.java"));
        assert!(!index.contains_file("Old.java"));
        assert_eq!(index.line_count(), 0);
    }

    #[test]
    fn empty_diff_builds_empty_index() {
        let index = LineIndex::build(&[], &PathNormalizer::new());
        assert!(index.is_empty());
        assert_eq!(index.line_count(), 0);
    }
}
