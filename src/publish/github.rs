//! Pull request review comments on GitHub.

use async_trait::async_trait;

use super::{PublishError, Publisher, parse_marker};
use crate::github::PullRequest;
use crate::github::client::NewReviewComment;
use crate::models::{IdentityKey, SurfacedFinding};

/// Posts each finding as a review comment on the new side of the diff.
#[derive(Debug, Clone)]
pub struct GitHubPublisher {
    pr: PullRequest,
}

impl GitHubPublisher {
    pub fn new(pr: PullRequest) -> Self {
        Self { pr }
    }
}

#[async_trait]
impl Publisher for GitHubPublisher {
    async fn post(&self, finding: &SurfacedFinding, body: &str) -> Result<(), PublishError> {
        let comment = NewReviewComment {
            body,
            commit_id: &self.pr.sha,
            path: &finding.path,
            line: finding.finding.line,
            side: "RIGHT",
        };
        self.pr
            .client
            .create_review_comment(&self.pr.owner, &self.pr.repo, self.pr.number, &comment)
            .await?;
        tracing::debug!(path = %finding.path, line = finding.finding.line, "posted review comment");
        Ok(())
    }

    async fn existing_keys(&self) -> Result<Vec<IdentityKey>, PublishError> {
        let comments = self
            .pr
            .client
            .review_comments(&self.pr.owner, &self.pr.repo, self.pr.number)
            .await?;
        Ok(comments.iter().filter_map(|c| parse_marker(&c.body)).collect())
    }
}
