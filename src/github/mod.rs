//! GitHub integration: Actions build info, the REST client, and the
//! pull request diff source.

pub mod client;
pub mod event;
pub mod pull_request;

use std::path::PathBuf;

use thiserror::Error;

pub use client::GitHubClient;
pub use event::BuildInfo;
pub use pull_request::PullRequest;

/// Errors from talking to GitHub or reading the Actions environment.
#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("environment variable ${0} is not set")]
    MissingEnv(&'static str),

    #[error("no GitHub token: set $CHANGELINT_GITHUB_TOKEN or $GITHUB_TOKEN")]
    MissingToken,

    #[error("failed to read event payload {path}: {reason}")]
    Event { path: PathBuf, reason: String },

    #[error("GitHub base URL {url} is invalid: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("GitHub API request failed: {0}")]
    Request(String),

    #[error("GitHub API returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("pull request not found, query: {0}")]
    PullRequestNotFound(String),
}

impl GitHubError {
    /// GitHub answers 406 when a pull request diff is too large to render.
    pub fn is_not_acceptable(&self) -> bool {
        matches!(self, GitHubError::Status { status: 406, .. })
    }
}
