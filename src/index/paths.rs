//! Path normalization between diff paths and report paths.
//!
//! A diff is usually expressed relative to the repository root, while an
//! analysis report may use absolute paths or paths relative to a build
//! directory below that root. Both sides are mapped to a canonical,
//! forward-slash, repository-relative form before lookups.

/// Maps diff paths and report paths onto the same repository-relative form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathNormalizer {
    /// Leading segments removed from diff paths.
    strip: usize,
    /// Offset of the report's working directory from the repository root.
    workdir: String,
    /// Directory the report was produced in. Absolute report paths are
    /// made relative to it and then resolved like relative ones.
    root: Option<String>,
}

impl PathNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip `n` leading segments from every diff path.
    pub fn with_strip(mut self, n: usize) -> Self {
        self.strip = n;
        self
    }

    /// Resolve relative report paths under `dir` (relative to the repository root).
    pub fn with_workdir(mut self, dir: impl AsRef<str>) -> Self {
        let cleaned = clean(dir.as_ref());
        self.workdir = if cleaned == "." { String::new() } else { cleaned };
        self
    }

    /// Make absolute report paths relative to `root`, the report's working
    /// directory, before resolving them under the workdir offset.
    pub fn with_root(mut self, root: impl AsRef<str>) -> Self {
        self.root = Some(clean(root.as_ref()));
        self
    }

    pub fn strip(&self) -> usize {
        self.strip
    }

    pub fn workdir(&self) -> &str {
        &self.workdir
    }

    /// Normalize a path taken from the diff.
    pub fn normalize_diff_path(&self, path: &str) -> String {
        let cleaned = clean(path);
        if self.strip == 0 || is_absolute(&cleaned) {
            return cleaned;
        }
        let segments: Vec<&str> = cleaned.split('/').collect();
        if segments.len() > self.strip {
            segments[self.strip..].join("/")
        } else {
            cleaned
        }
    }

    /// Normalize a path taken from an analysis report.
    ///
    /// Returns `None` when the path cannot be placed inside the repository:
    /// it is empty, absolute without a `root`, or climbs above the
    /// repository root.
    pub fn normalize_report_path(&self, path: &str) -> Option<String> {
        let cleaned = clean(path);
        if cleaned == "." {
            return None;
        }

        let relative = if is_absolute(&cleaned) {
            relative_to(self.root.as_deref()?, &cleaned)
        } else {
            cleaned
        };

        let joined = if self.workdir.is_empty() {
            relative
        } else {
            clean(&format!("{}/{}", self.workdir, relative))
        };

        if joined == "." || joined == ".." || joined.starts_with("../") {
            return None;
        }
        Some(joined)
    }
}

/// Lexical path from the absolute directory `base` to the absolute `path`,
/// using `..` to climb out of `base`.
fn relative_to(base: &str, path: &str) -> String {
    let base: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    let target: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let common = base.iter().zip(&target).take_while(|(a, b)| a == b).count();

    let mut parts = vec![".."; base.len() - common];
    parts.extend_from_slice(&target[common..]);
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Whether `path` (already using `/`) is absolute, including `C:/` forms.
pub fn is_absolute(path: &str) -> bool {
    let bytes = path.as_bytes();
    path.starts_with('/') || (bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/')
}

/// Lexically clean a path: forward slashes, no empty or `.` segments,
/// `..` resolved where possible. An empty result is `"."`.
pub fn clean(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let absolute = unified.starts_with('/');

    let mut parts: Vec<&str> = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else if !absolute {
                    // `/..` is `/`, but a relative path keeps its leading `..`
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }

    let joined = parts.join("/");
    match (absolute, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_collapses_segments() {
        assert_eq!(clean("src/./main//App.java"), "src/main/App.java");
        assert_eq!(clean("src/main/../test/T.java"), "src/test/T.java");
        assert_eq!(clean("./a.go"), "a.go");
        assert_eq!(clean(""), ".");
        assert_eq!(clean("."), ".");
        assert_eq!(clean("../x"), "../x");
        assert_eq!(clean("/../x"), "/x");
        assert_eq!(clean("/repo/src/"), "/repo/src");
    }

    #[test]
    fn clean_converts_backslashes() {
        assert_eq!(clean("src\\main\\App.java"), "src/main/App.java");
        assert_eq!(clean("C:\\work\\repo\\A.java"), "C:/work/repo/A.java");
    }

    #[test]
    fn absolute_detection() {
        assert!(is_absolute("/repo/a"));
        assert!(is_absolute("C:/repo/a"));
        assert!(!is_absolute("repo/a"));
        assert!(!is_absolute("a:b"));
    }

    #[test]
    fn diff_path_strip_one_segment() {
        let n = PathNormalizer::new().with_strip(1);
        assert_eq!(n.normalize_diff_path("a/src/a.go"), "src/a.go");
    }

    #[test]
    fn diff_path_strip_keeps_short_paths() {
        let n = PathNormalizer::new().with_strip(2);
        assert_eq!(n.normalize_diff_path("src/a.go"), "src/a.go");
        assert_eq!(n.normalize_diff_path("/abs/src/a.go"), "/abs/src/a.go");
    }

    #[test]
    fn diff_path_without_strip_is_only_cleaned() {
        let n = PathNormalizer::new();
        assert_eq!(n.normalize_diff_path("src\\a.go"), "src/a.go");
    }

    #[test]
    fn report_path_joined_under_workdir() {
        let n = PathNormalizer::new().with_workdir("src/");
        assert_eq!(n.normalize_report_path("a.go").as_deref(), Some("src/a.go"));
        assert_eq!(n.normalize_report_path("../docs/x.md").as_deref(), Some("docs/x.md"));
    }

    #[test]
    fn report_path_absolute_inside_root() {
        let n = PathNormalizer::new()
            .with_root("/home/ci/repo/service")
            .with_workdir("service");
        assert_eq!(
            n.normalize_report_path("/home/ci/repo/service/src/A.java").as_deref(),
            Some("service/src/A.java")
        );
    }

    #[test]
    fn report_path_absolute_in_sibling_module() {
        let n = PathNormalizer::new()
            .with_root("/home/ci/repo/service")
            .with_workdir("service/");
        assert_eq!(
            n.normalize_report_path("/home/ci/repo/shared/src/B.java").as_deref(),
            Some("shared/src/B.java")
        );
        assert_eq!(n.normalize_report_path("/home/ci/other/B.java"), None);
    }

    #[test]
    fn report_path_equal_to_root_is_ambiguous() {
        let n = PathNormalizer::new().with_root("/home/ci/repo");
        assert_eq!(n.normalize_report_path("/home/ci/repo"), None);
    }

    #[test]
    fn report_path_absolute_outside_root_is_ambiguous() {
        let n = PathNormalizer::new().with_root("/home/ci/repo");
        assert_eq!(n.normalize_report_path("/opt/other/A.java"), None);
        assert_eq!(n.normalize_report_path("/home/ci/repository/A.java"), None);
        let no_root = PathNormalizer::new();
        assert_eq!(no_root.normalize_report_path("/home/ci/repo/A.java"), None);
    }

    #[test]
    fn report_path_escaping_repo_is_ambiguous() {
        let n = PathNormalizer::new();
        assert_eq!(n.normalize_report_path("../outside.java"), None);
        assert_eq!(n.normalize_report_path(""), None);
        assert_eq!(n.normalize_report_path("./"), None);
    }

    #[test]
    fn workdir_dot_means_root() {
        let n = PathNormalizer::new().with_workdir("./");
        assert_eq!(n.workdir(), "");
        assert_eq!(n.normalize_report_path("src/a.go").as_deref(), Some("src/a.go"));
    }
}
