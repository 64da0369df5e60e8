//! Shared types used across all modules.
//!
//! This module defines the core data structures for diffs and findings.
//! Other modules import from here rather than reaching into each other's
//! internals.

pub mod diff;
pub mod finding;

use std::path::PathBuf;

pub use diff::{DiffLine, DiffLineType, FileDiff, Hunk};
pub use finding::{Finding, FindingsByFile, IdentityKey, Severity, SurfacedFinding, Summary};

/// Where the unified diff for the run comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    /// Read a pre-computed unified diff from a file.
    DiffFile(PathBuf),
    /// Read a unified diff from stdin.
    Stdin,
    /// Diff the working tree against a git branch or commit.
    GitBase(String),
    /// Fetch the pull request diff from the GitHub API.
    GitHub,
}

impl InputMode {
    /// Whether this mode needs a resolved GitHub pull request.
    pub fn needs_pull_request(&self) -> bool {
        matches!(self, InputMode::GitHub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_github_mode_needs_pull_request() {
        assert!(InputMode::GitHub.needs_pull_request());
        assert!(!InputMode::Stdin.needs_pull_request());
        assert!(!InputMode::GitBase("main".into()).needs_pull_request());
        assert!(!InputMode::DiffFile("x.diff".into()).needs_pull_request());
    }
}
