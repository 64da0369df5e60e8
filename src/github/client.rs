//! Minimal GitHub REST client over `reqwest`.
//!
//! Covers the handful of endpoints a review run needs: the pull request
//! (raw diff and refs), the compare API for merge bases, issue search,
//! and pull request review comments.

use std::time::Duration;

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::GitHubError;
use super::event::BuildInfo;
use crate::config::GitHubConfig;
use crate::constants;

const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";
const DIFF_MEDIA_TYPE: &str = "application/vnd.github.v3.diff";
const PER_PAGE: usize = 100;

/// Authenticated client bound to one API base URL.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl std::fmt::Debug for GitHubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubClient")
            .field("base_url", &self.base_url)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Head and base commits of a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestRefs {
    pub number: u64,
    pub head: CommitRef,
    pub base: CommitRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    #[serde(default, rename = "ref")]
    pub name: String,
}

/// An existing pull request review comment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReviewComment {
    pub id: u64,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub line: Option<u32>,
}

/// Body of `POST /repos/{owner}/{repo}/pulls/{number}/comments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewReviewComment<'a> {
    pub body: &'a str,
    pub commit_id: &'a str,
    pub path: &'a str,
    pub line: u32,
    pub side: &'static str,
}

#[derive(Debug, Deserialize)]
struct Comparison {
    merge_base_commit: CommitSha,
}

#[derive(Debug, Deserialize)]
struct CommitSha {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    total_count: u64,
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    number: u64,
}

impl GitHubClient {
    /// Build a client from config. A token is required.
    pub fn new(config: &GitHubConfig) -> Result<Self, GitHubError> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GitHubError::MissingToken)?;
        let base_url = resolve_base_url(config.api_url.as_deref())?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(constants::HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| GitHubError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { http, base_url, token })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the unified diff of a pull request.
    ///
    /// Fails with a 406 status when GitHub considers the diff too large.
    pub async fn pull_request_diff(&self, owner: &str, repo: &str, number: u64) -> Result<String, GitHubError> {
        let path = format!("repos/{owner}/{repo}/pulls/{number}");
        let resp = self
            .send(self.request(Method::GET, &path).header(ACCEPT, DIFF_MEDIA_TYPE), &path)
            .await?;
        resp.text()
            .await
            .map_err(|e| GitHubError::Request(format!("{path}: {e}")))
    }

    /// Fetch the head and base commits of a pull request.
    pub async fn pull_request(&self, owner: &str, repo: &str, number: u64) -> Result<PullRequestRefs, GitHubError> {
        self.get_json(&format!("repos/{owner}/{repo}/pulls/{number}")).await
    }

    /// Merge base of `base` and `head` via the compare API.
    pub async fn merge_base(&self, owner: &str, repo: &str, base: &str, head: &str) -> Result<String, GitHubError> {
        let comparison: Comparison = self
            .get_json(&format!("repos/{owner}/{repo}/compare/{base}...{head}"))
            .await?;
        Ok(comparison.merge_base_commit.sha)
    }

    /// Find the most recently updated open pull request for a branch or commit.
    pub async fn find_pull_request(&self, info: &BuildInfo) -> Result<u64, GitHubError> {
        let query = search_query(info);
        let request = self.request(Method::GET, "search/issues").query(&[
            ("q", query.as_str()),
            ("sort", "updated"),
            ("order", "desc"),
        ]);
        let result: SearchResult = self
            .send(request, "search/issues")
            .await?
            .json()
            .await
            .map_err(|e| GitHubError::Request(format!("search/issues: {e}")))?;

        match result.items.first() {
            Some(item) if result.total_count > 0 => Ok(item.number),
            _ => Err(GitHubError::PullRequestNotFound(query)),
        }
    }

    /// All review comments on a pull request, following pagination.
    pub async fn review_comments(&self, owner: &str, repo: &str, number: u64) -> Result<Vec<ReviewComment>, GitHubError> {
        let mut comments = Vec::new();
        for page in 1.. {
            let path = format!("repos/{owner}/{repo}/pulls/{number}/comments?per_page={PER_PAGE}&page={page}");
            let batch: Vec<ReviewComment> = self.get_json(&path).await?;
            let done = batch.len() < PER_PAGE;
            comments.extend(batch);
            if done {
                break;
            }
        }
        Ok(comments)
    }

    /// Create a review comment anchored to a line of the pull request.
    pub async fn create_review_comment(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
        comment: &NewReviewComment<'_>,
    ) -> Result<(), GitHubError> {
        let path = format!("repos/{owner}/{repo}/pulls/{number}/comments");
        self.send(self.request(Method::POST, &path).json(comment), &path)
            .await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(path))
            .header(USER_AGENT, constants::USER_AGENT)
            .header(ACCEPT, JSON_MEDIA_TYPE)
            .bearer_auth(&self.token)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        self.send(self.request(Method::GET, path), path)
            .await?
            .json()
            .await
            .map_err(|e| GitHubError::Request(format!("{path}: failed to parse response: {e}")))
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, GitHubError> {
        let resp = request
            .send()
            .await
            .map_err(|e| GitHubError::Request(format!("{path}: {e}")))?;
        if !resp.status().is_success() {
            return Err(GitHubError::Status {
                status: resp.status().as_u16(),
                url: path.to_string(),
            });
        }
        Ok(resp)
    }
}

/// Normalise the configured API base URL, defaulting to the public API.
///
/// The result always ends with `/` so endpoint paths can be appended.
pub fn resolve_base_url(configured: Option<&str>) -> Result<String, GitHubError> {
    let raw = configured
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .unwrap_or(constants::DEFAULT_GITHUB_API);
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let parsed = reqwest::Url::parse(&with_slash).map_err(|e| GitHubError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(GitHubError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", parsed.scheme()),
        });
    }
    Ok(with_slash)
}

/// Search query locating an open pull request by branch and/or commit.
pub fn search_query(info: &BuildInfo) -> String {
    let mut parts = vec![
        "type:pr".to_string(),
        "state:open".to_string(),
        format!("repo:{}/{}", info.owner, info.repo),
    ];
    if let Some(branch) = info.branch.as_deref().filter(|b| !b.is_empty()) {
        parts.push(format!("head:{branch}"));
    }
    if !info.sha.is_empty() {
        parts.push(info.sha.clone());
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn config(api_url: Option<&str>, token: Option<&str>) -> GitHubConfig {
        GitHubConfig {
            api_url: api_url.map(String::from),
            token: token.map(String::from),
            fallback_to_git: true,
        }
    }

    #[test]
    fn base_url_defaults_to_public_api() {
        assert_eq!(resolve_base_url(None).unwrap(), "https://api.github.com/");
        assert_eq!(resolve_base_url(Some("  ")).unwrap(), "https://api.github.com/");
    }

    #[test]
    fn base_url_gets_trailing_slash() {
        assert_eq!(
            resolve_base_url(Some("https://ghe.example.com/api/v3")).unwrap(),
            "https://ghe.example.com/api/v3/"
        );
        assert_eq!(
            resolve_base_url(Some("https://ghe.example.com/api/v3/")).unwrap(),
            "https://ghe.example.com/api/v3/"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            resolve_base_url(Some("not a url")),
            Err(GitHubError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            resolve_base_url(Some("ftp://example.com")),
            Err(GitHubError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn client_requires_token() {
        assert!(matches!(
            GitHubClient::new(&config(None, None)),
            Err(GitHubError::MissingToken)
        ));
        assert!(matches!(
            GitHubClient::new(&config(None, Some(""))),
            Err(GitHubError::MissingToken)
        ));
    }

    #[test]
    fn client_joins_paths_onto_base() {
        let client = GitHubClient::new(&config(Some("https://ghe.example.com/api/v3"), Some("t"))).unwrap();
        assert_eq!(client.base_url(), "https://ghe.example.com/api/v3/");
        assert_eq!(
            client.url("/repos/o/r/pulls/1"),
            "https://ghe.example.com/api/v3/repos/o/r/pulls/1"
        );
    }

    #[test]
    fn debug_redacts_token() {
        let client = GitHubClient::new(&config(None, Some("ghp_secret"))).unwrap();
        let debug = format!("{client:?}");
        assert!(!debug.contains("ghp_secret"));
    }

    #[test]
    fn search_query_with_branch_and_sha() {
        let info = BuildInfo {
            owner: "acme".into(),
            repo: "widgets".into(),
            sha: "abc123".into(),
            pull_request: None,
            branch: Some("feature/x".into()),
        };
        assert_eq!(
            search_query(&info),
            "type:pr state:open repo:acme/widgets head:feature/x abc123"
        );
    }

    #[test]
    fn search_query_sha_only() {
        let info = BuildInfo {
            owner: "acme".into(),
            repo: "widgets".into(),
            sha: "abc123".into(),
            ..Default::default()
        };
        assert_eq!(search_query(&info), "type:pr state:open repo:acme/widgets abc123");
    }

    #[test]
    fn new_comment_serializes_for_api() {
        let comment = NewReviewComment {
            body: "⚠️ unused var",
            commit_id: "abc",
            path: "src/a.go",
            line: 42,
            side: "RIGHT",
        };
        let json = serde_json::to_value(&comment).unwrap();
        assert_eq!(json["path"], "src/a.go");
        assert_eq!(json["line"], 42);
        assert_eq!(json["side"], "RIGHT");
        assert_eq!(json["commit_id"], "abc");
    }

    #[test]
    fn decodes_pull_request_refs() {
        let refs: PullRequestRefs = serde_json::from_str(
            r#"{"number": 9, "title": "x", "head": {"sha": "h", "ref": "feat"}, "base": {"sha": "b", "ref": "main"}}"#,
        )
        .unwrap();
        assert_eq!(refs.head.sha, "h");
        assert_eq!(refs.base.name, "main");
    }

    #[test]
    fn decodes_review_comment_without_line() {
        let comment: ReviewComment =
            serde_json::from_str(r#"{"id": 1, "body": "hi", "path": "a.go", "line": null}"#).unwrap();
        assert_eq!(comment.line, None);
    }
}
