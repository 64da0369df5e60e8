//! Unified diff format parser.
//!
//! Parses the output of `git diff` (or any unified diff) into `Vec<FileDiff>`.
//! Hunk bodies are consumed by their declared line counts, so a removed
//! line that happens to start with `---` is never mistaken for a header.

use std::iter::{Enumerate, Peekable};
use std::str::Lines;

use super::DiffError;
use crate::models::diff::{DiffLine, DiffLineType, FileDiff, Hunk};

type LineIter<'a> = Peekable<Enumerate<Lines<'a>>>;

/// Marker used by unified diffs for a missing side.
const DEV_NULL: &str = "/dev/null";

/// Parse a unified diff string into a list of file diffs.
///
/// Fails on the first structurally broken hunk; no partial result is
/// returned in that case.
pub fn parse_unified_diff(input: &str) -> Result<Vec<FileDiff>, DiffError> {
    let mut files: Vec<FileDiff> = Vec::new();
    let mut current: Option<Section> = None;
    let mut lines: LineIter<'_> = input.lines().enumerate().peekable();

    while let Some((idx, line)) = lines.next() {
        if let Some(rest) = line.strip_prefix("diff --git ") {
            if let Some(section) = current.take() {
                files.push(section.file);
            }
            let (old_path, new_path) = parse_diff_header(rest);
            current = Some(Section::new(old_path, new_path, true));
            continue;
        }

        if line.starts_with("--- ") && next_starts_with(&mut lines, "+++ ") {
            let old_raw = &line[4..];
            let (_, plus_line) = lines.next().ok_or_else(|| parse_error(idx + 1, "missing +++ line"))?;
            let new_raw = &plus_line[4..];

            let refine = current
                .as_ref()
                .is_some_and(|s| s.from_git_header && !s.saw_path_lines && s.file.hunks.is_empty());
            if !refine {
                if let Some(section) = current.take() {
                    files.push(section.file);
                }
                current = Some(Section::new(String::new(), String::new(), false));
            }
            if let Some(section) = current.as_mut() {
                section.apply_path_lines(old_raw, new_raw);
            }
            continue;
        }

        if line.starts_with("@@") {
            let Some(section) = current.as_mut() else {
                return Err(parse_error(idx, "hunk header outside of a file section"));
            };
            let hunk = parse_hunk(idx, line, &mut lines)?;
            section.file.hunks.push(hunk);
            continue;
        }

        let Some(section) = current.as_mut() else {
            continue;
        };
        if line.starts_with("new file mode") {
            section.file.is_new = true;
        } else if line.starts_with("deleted file mode") {
            section.file.is_deleted = true;
        } else if let Some(from) = line.strip_prefix("rename from ") {
            section.file.is_rename = true;
            section.file.old_path = unquote(from).to_string();
        } else if let Some(to) = line.strip_prefix("rename to ") {
            section.file.is_rename = true;
            section.file.new_path = unquote(to).to_string();
        } else if line.starts_with("Binary files ") || line == "GIT binary patch" {
            section.file.is_binary = true;
        }
        // index, mode, similarity, copy and "\ No newline" lines carry
        // nothing we index on.
    }

    if let Some(section) = current.take() {
        files.push(section.file);
    }

    Ok(files)
}

/// A file section under construction.
struct Section {
    file: FileDiff,
    /// Started by a `diff --git` line rather than a bare `---`/`+++` pair.
    from_git_header: bool,
    saw_path_lines: bool,
}

impl Section {
    fn new(old_path: String, new_path: String, from_git_header: bool) -> Self {
        Self {
            file: FileDiff {
                old_path,
                new_path,
                is_new: false,
                is_deleted: false,
                is_rename: false,
                is_binary: false,
                hunks: Vec::new(),
            },
            from_git_header,
            saw_path_lines: false,
        }
    }

    /// Record the `--- old` / `+++ new` path pair.
    fn apply_path_lines(&mut self, old_raw: &str, new_raw: &str) {
        self.saw_path_lines = true;
        let old = marker_path(old_raw);
        let new = marker_path(new_raw);

        if old == DEV_NULL {
            self.file.is_new = true;
            self.file.old_path = DEV_NULL.to_string();
        } else {
            self.file.old_path = strip_diff_prefix(old).to_string();
        }

        if new == DEV_NULL {
            self.file.is_deleted = true;
            self.file.new_path = DEV_NULL.to_string();
        } else {
            self.file.new_path = strip_diff_prefix(new).to_string();
        }

        if !self.from_git_header && self.file.old_path != self.file.new_path && !self.file.is_new && !self.file.is_deleted {
            self.file.is_rename = true;
        }
    }
}

fn next_starts_with(lines: &mut LineIter<'_>, prefix: &str) -> bool {
    lines.peek().is_some_and(|(_, l)| l.starts_with(prefix))
}

fn parse_error(idx: usize, reason: impl Into<String>) -> DiffError {
    DiffError::Parse {
        line: idx + 1,
        reason: reason.into(),
    }
}

/// Extract the path from a `---`/`+++` line body, dropping a trailing
/// tab-separated timestamp.
fn marker_path(raw: &str) -> &str {
    let path = raw.split('\t').next().unwrap_or(raw).trim_end();
    unquote(path)
}

fn unquote(path: &str) -> &str {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .unwrap_or(path)
}

/// Parse the "diff --git a/path b/path" header line (without the leading keyword).
fn parse_diff_header(rest: &str) -> (String, String) {
    // Handle paths with spaces by finding the second prefix separator.
    // Paths are prefixed with a/ and b/ (default), or c/w/i/o/ when
    // git's diff.mnemonicPrefix is enabled.
    if let Some(b_idx) = find_second_prefix(rest) {
        let a_part = unquote(&rest[..b_idx]);
        let b_part = unquote(&rest[b_idx + 1..]);
        (
            strip_diff_prefix(a_part).to_string(),
            strip_diff_prefix(b_part).to_string(),
        )
    } else {
        let mut parts = rest.splitn(2, ' ');
        let old_path = strip_diff_prefix(unquote(parts.next().unwrap_or(""))).to_string();
        let new_path = strip_diff_prefix(unquote(parts.next().unwrap_or(""))).to_string();
        (old_path, new_path)
    }
}

/// Strip a single-character git diff prefix (`a/`, `b/`, `c/`, `w/`, `i/`, `o/`).
///
/// These prefixes appear in `diff --git` headers:
/// - `a/` and `b/` are the defaults.
/// - `c/` (commit), `w/` (working tree), `i/` (index), `o/` (object)
///   are used when `diff.mnemonicPrefix` is enabled.
fn strip_diff_prefix(path: &str) -> &str {
    if path.len() >= 2 {
        let bytes = path.as_bytes();
        if bytes[1] == b'/' && matches!(bytes[0], b'a' | b'b' | b'c' | b'w' | b'i' | b'o') {
            return &path[2..];
        }
    }
    path
}

/// Find the position of the second path prefix separator in a diff header.
///
/// Looks for ` X/` where X is any known single-letter prefix.
fn find_second_prefix(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    for i in 1..bytes.len().saturating_sub(1) {
        if bytes[i] == b' '
            && bytes.get(i + 2) == Some(&b'/')
            && matches!(bytes.get(i + 1), Some(b'a' | b'b' | b'c' | b'w' | b'i' | b'o'))
        {
            return Some(i);
        }
    }
    // Quoted new path: `"a/x y" "b/x y"`
    s.find("\" \"").map(|i| i + 1)
}

/// Parse a single hunk whose `@@` header is `header_line` (at index `idx`).
///
/// Consumes exactly as many body lines as the header declares.
fn parse_hunk(idx: usize, header_line: &str, lines: &mut LineIter<'_>) -> Result<Hunk, DiffError> {
    let (old_start, old_count, new_start, new_count, header) =
        parse_hunk_header(header_line).map_err(|reason| parse_error(idx, reason))?;
    // Line numbers advance up to start + count on each side.
    if old_start.checked_add(old_count).is_none() || new_start.checked_add(new_count).is_none() {
        return Err(parse_error(idx, format!("hunk range out of bounds: {header_line}")));
    }

    let mut hunk_lines: Vec<DiffLine> = Vec::new();
    let mut old_line = old_start;
    let mut new_line = new_start;
    let mut old_left = old_count;
    let mut new_left = new_count;

    while old_left > 0 || new_left > 0 {
        let Some((line_idx, line)) = lines.next() else {
            return Err(parse_error(
                idx,
                format!("hunk truncated: {old_left} old and {new_left} new line(s) missing"),
            ));
        };

        if line.starts_with('\\') {
            // "\ No newline at end of file"
            continue;
        }

        let (line_type, content) = match line.as_bytes().first() {
            Some(b'+') => (DiffLineType::Added, &line[1..]),
            Some(b'-') => (DiffLineType::Removed, &line[1..]),
            Some(b' ') => (DiffLineType::Context, &line[1..]),
            // Some tools strip the trailing space of empty context lines.
            None => (DiffLineType::Context, ""),
            Some(_) => {
                return Err(parse_error(
                    line_idx,
                    format!("hunk ended early: {old_left} old and {new_left} new line(s) missing"),
                ));
            }
        };

        match line_type {
            DiffLineType::Added => {
                if new_left == 0 {
                    return Err(parse_error(line_idx, "added line exceeds declared new count"));
                }
                hunk_lines.push(DiffLine {
                    line_type,
                    content: content.to_string(),
                    old_line_no: None,
                    new_line_no: Some(new_line),
                });
                new_line += 1;
                new_left -= 1;
            }
            DiffLineType::Removed => {
                if old_left == 0 {
                    return Err(parse_error(line_idx, "removed line exceeds declared old count"));
                }
                hunk_lines.push(DiffLine {
                    line_type,
                    content: content.to_string(),
                    old_line_no: Some(old_line),
                    new_line_no: None,
                });
                old_line += 1;
                old_left -= 1;
            }
            DiffLineType::Context => {
                if old_left == 0 || new_left == 0 {
                    return Err(parse_error(line_idx, "context line exceeds declared counts"));
                }
                hunk_lines.push(DiffLine {
                    line_type,
                    content: content.to_string(),
                    old_line_no: Some(old_line),
                    new_line_no: Some(new_line),
                });
                old_line += 1;
                new_line += 1;
                old_left -= 1;
                new_left -= 1;
            }
        }
    }

    Ok(Hunk {
        old_start,
        old_count,
        new_start,
        new_count,
        header,
        lines: hunk_lines,
    })
}

/// Parse a `@@ -old_start,old_count +new_start,new_count @@ header` line.
fn parse_hunk_header(line: &str) -> Result<(u32, u32, u32, u32, Option<String>), String> {
    let malformed = || format!("malformed hunk header: {line}");

    let rest = line.strip_prefix("@@ ").ok_or_else(malformed)?;
    let end = rest.find(" @@").ok_or_else(malformed)?;
    let range_part = &rest[..end];
    let header = {
        let tail = rest[end + 3..].trim();
        if tail.is_empty() {
            None
        } else {
            Some(tail.to_string())
        }
    };

    let mut parts = range_part.split(' ');
    let (Some(old), Some(new), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let (old_start, old_count) = parse_range(old.strip_prefix('-').ok_or_else(malformed)?)?;
    let (new_start, new_count) = parse_range(new.strip_prefix('+').ok_or_else(malformed)?)?;

    Ok((old_start, old_count, new_start, new_count, header))
}

/// Parse "start,count" or "start" (count defaults to 1).
fn parse_range(s: &str) -> Result<(u32, u32), String> {
    let number = |v: &str| {
        v.parse::<u32>()
            .map_err(|_| format!("hunk range `{s}` is not numeric"))
    };
    match s.split_once(',') {
        Some((start, count)) => Ok((number(start)?, number(count)?)),
        None => Ok((number(s)?, 1)),
    }
}
