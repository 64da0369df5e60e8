//! A GitHub pull request as a diff source.

use std::path::PathBuf;

use async_trait::async_trait;

use super::event::BuildInfo;
use super::{GitHubClient, GitHubError};
use crate::diff::{DiffError, DiffSource, git};

/// The pull request a run reviews.
#[derive(Debug, Clone)]
pub struct PullRequest {
    pub client: GitHubClient,
    pub owner: String,
    pub repo: String,
    pub number: u64,
    /// Head commit that review comments are anchored to.
    pub sha: String,
    repo_root: PathBuf,
    fallback_to_git: bool,
}

impl PullRequest {
    pub fn new(client: GitHubClient, info: &BuildInfo, number: u64, repo_root: impl Into<PathBuf>) -> Self {
        Self {
            client,
            owner: info.owner.clone(),
            repo: info.repo.clone(),
            number,
            sha: info.sha.clone(),
            repo_root: repo_root.into(),
            fallback_to_git: true,
        }
    }

    pub fn with_git_fallback(mut self, enabled: bool) -> Self {
        self.fallback_to_git = enabled;
        self
    }

    async fn diff_using_git(&self) -> Result<String, DiffError> {
        let refs = self
            .client
            .pull_request(&self.owner, &self.repo, self.number)
            .await
            .map_err(remote)?;
        let merge_base = self
            .client
            .merge_base(&self.owner, &self.repo, &refs.base.sha, &refs.head.sha)
            .await
            .map_err(remote)?;
        tracing::debug!(merge_base = %merge_base, head = %refs.head.sha, "diffing with git");
        git::git_diff_between(&self.repo_root, &merge_base, &refs.head.sha).await
    }
}

#[async_trait]
impl DiffSource for PullRequest {
    async fn diff_text(&self) -> Result<String, DiffError> {
        match self
            .client
            .pull_request_diff(&self.owner, &self.repo, self.number)
            .await
        {
            Ok(text) => Ok(text),
            Err(e) if e.is_not_acceptable() && self.fallback_to_git => {
                tracing::warn!("pull request diff is too large for the API, falling back to git");
                self.diff_using_git().await
            }
            Err(e) => Err(remote(e)),
        }
    }
}

/// Pull request number for a build, searching by branch or commit when
/// the event did not carry one.
///
/// Returns `None` for builds that are not attached to an open pull request.
pub async fn resolve_number(client: &GitHubClient, info: &BuildInfo) -> Result<Option<u64>, GitHubError> {
    if let Some(number) = info.pull_request {
        return Ok(Some(number));
    }
    if info.branch.is_none() && info.sha.is_empty() {
        return Ok(None);
    }
    match client.find_pull_request(info).await {
        Ok(number) => Ok(Some(number)),
        Err(GitHubError::PullRequestNotFound(query)) => {
            tracing::warn!("no open pull request found (query: {query})");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn remote(e: GitHubError) -> DiffError {
    DiffError::Remote(e.to_string())
}
