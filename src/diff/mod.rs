//! Diff engine: diff sources (file, stdin, git CLI) and unified diff parsing.

pub mod file;
pub mod git;
pub mod parser;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{FileDiff, InputMode};

/// Errors from the diff engine.
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("git command failed: {0}")]
    GitError(String),

    #[error("failed to read diff")]
    FileReadError(#[from] std::io::Error),

    #[error("diff parse error at line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("failed to fetch diff: {0}")]
    Remote(String),
}

/// Something that can supply the raw unified diff text for a run.
#[async_trait]
pub trait DiffSource: Send + Sync {
    /// Return the complete unified diff text.
    async fn diff_text(&self) -> Result<String, DiffError>;
}

/// Diff source backed by the local machine: a file, stdin, or `git diff`.
#[derive(Debug, Clone)]
pub struct LocalDiffSource {
    input: InputMode,
    repo_root: PathBuf,
}

impl LocalDiffSource {
    pub fn new(input: InputMode, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            input,
            repo_root: repo_root.into(),
        }
    }
}

#[async_trait]
impl DiffSource for LocalDiffSource {
    async fn diff_text(&self) -> Result<String, DiffError> {
        match &self.input {
            InputMode::DiffFile(path) => file::read_diff_file(path).await,
            InputMode::Stdin => read_diff_stdin().await,
            InputMode::GitBase(base_ref) => git::git_diff(&self.repo_root, base_ref).await,
            InputMode::GitHub => Err(DiffError::Remote(
                "the GitHub diff source needs a resolved pull request".to_string(),
            )),
        }
    }
}

/// Read a unified diff from stdin.
pub async fn read_diff_stdin() -> Result<String, DiffError> {
    use tokio::io::AsyncReadExt;
    let mut buf = Vec::new();
    tokio::io::stdin()
        .read_to_end(&mut buf)
        .await
        .map_err(DiffError::FileReadError)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Fetch the diff text from `source` and parse it.
pub async fn get_diffs(source: &dyn DiffSource) -> Result<Vec<FileDiff>, DiffError> {
    let text = source.diff_text().await?;
    tracing::debug!(bytes = text.len(), "fetched diff");
    parser::parse_unified_diff(&text)
}

/// Convenience for callers that already hold a repository path.
pub async fn get_local_diffs(input: &InputMode, repo_root: &Path) -> Result<Vec<FileDiff>, DiffError> {
    get_diffs(&LocalDiffSource::new(input.clone(), repo_root)).await
}
