//! Publishing surfaced findings as review comments.
//!
//! [`publish_all`] is the only place the [`PostedSet`] is mutated: a key
//! is marked after its comment was posted successfully, so a failed post
//! can be retried and a duplicate is never posted twice in one run.

pub mod github;
pub mod stdout;

use std::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::constants;
use crate::github::GitHubError;
use crate::identity::PostedSet;
use crate::models::{IdentityKey, SurfacedFinding};

pub use self::github::GitHubPublisher;
pub use self::stdout::StdoutPublisher;

/// Why a single comment could not be posted.
#[derive(Error, Debug)]
pub enum PublishError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("failed to write comment: {0}")]
    Io(#[from] std::io::Error),
}

/// A finding whose comment failed to post.
#[derive(Debug)]
pub struct PublishFailure {
    pub path: String,
    pub line: u32,
    pub key: IdentityKey,
    pub error: PublishError,
}

/// Every publish failure of a run.
#[derive(Debug, Default)]
pub struct PublishErrors(pub Vec<PublishFailure>);

impl PublishErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublishFailure> {
        self.0.iter()
    }
}

impl fmt::Display for PublishErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} comment(s) failed to post", self.0.len())?;
        for failure in &self.0 {
            write!(f, "\n  {}:{}: {}", failure.path, failure.line, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for PublishErrors {}

/// Counts from a publish pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    pub posted: usize,
    /// Findings whose key was already in the posted set.
    pub skipped: usize,
}

/// Destination for review comments.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Post one comment for `finding` with the rendered `body`.
    async fn post(&self, finding: &SurfacedFinding, body: &str) -> Result<(), PublishError>;

    /// Identity keys of comments already present at the destination.
    async fn existing_keys(&self) -> Result<Vec<IdentityKey>, PublishError> {
        Ok(Vec::new())
    }
}

/// Post every finding whose key is not yet in `posted`.
///
/// Posting is sequential. A failure does not stop later posts; all
/// failures are returned together once every finding was attempted.
pub async fn publish_all(
    posted: &mut PostedSet,
    publisher: &dyn Publisher,
    findings: &[SurfacedFinding],
    tool_name: &str,
) -> Result<PublishOutcome, PublishErrors> {
    let mut outcome = PublishOutcome::default();
    let mut failures = Vec::new();

    for finding in findings {
        if posted.is_posted(&finding.key) {
            tracing::debug!(path = %finding.path, line = finding.finding.line, "already posted, skipping");
            outcome.skipped += 1;
            continue;
        }

        let body = render_comment(finding, tool_name);
        match publisher.post(finding, &body).await {
            Ok(()) => {
                posted.mark_posted(finding.key.clone());
                outcome.posted += 1;
            }
            Err(error) => {
                tracing::warn!(path = %finding.path, line = finding.finding.line, "failed to post comment: {error}");
                failures.push(PublishFailure {
                    path: finding.path.clone(),
                    line: finding.finding.line,
                    key: finding.key.clone(),
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(outcome)
    } else {
        Err(PublishErrors(failures))
    }
}

/// Markdown body for a review comment.
///
/// Severity glyph, `<source>` and message on the first line, then the
/// reporting tool and a hidden marker carrying the identity key.
pub fn render_comment(finding: &SurfacedFinding, tool_name: &str) -> String {
    let mut body = String::new();
    if let Some(level) = finding.finding.level() {
        body.push_str(level.glyph());
        body.push(' ');
    }
    if let Some(source) = finding.finding.source.as_deref().filter(|s| !s.is_empty()) {
        body.push_str(&format!("<{source}> "));
    }
    body.push_str(&finding.finding.message);
    if !tool_name.is_empty() {
        body.push_str(&format!("\n\n<sub>Reported by {tool_name}</sub>"));
    }
    body.push_str(&format!("\n{}{} -->", constants::COMMENT_MARKER_PREFIX, finding.key));
    body
}

/// Extract the identity key from a comment body written by [`render_comment`].
pub fn parse_marker(body: &str) -> Option<IdentityKey> {
    let start = body.find(constants::COMMENT_MARKER_PREFIX)? + constants::COMMENT_MARKER_PREFIX.len();
    let rest = &body[start..];
    let end = rest.find("-->")?;
    let key = rest[..end].trim();
    if key.is_empty() || !key.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    Some(IdentityKey::from_hex(key))
}
