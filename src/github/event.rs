//! Build information from the GitHub Actions environment.
//!
//! The event payload at `$GITHUB_EVENT_PATH` carries the repository and,
//! for `pull_request` and re-run `check_suite` events, the pull request.

use std::path::Path;

use serde::Deserialize;

use super::GitHubError;
use crate::constants;
use crate::env::Env;

/// Where a build is running.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInfo {
    pub owner: String,
    pub repo: String,
    pub sha: String,
    pub pull_request: Option<u64>,
    pub branch: Option<String>,
}

impl BuildInfo {
    /// Resolve build info from `$GITHUB_EVENT_PATH`.
    pub fn from_env(env: &Env) -> Result<Self, GitHubError> {
        let path = env
            .non_empty(constants::ENV_GITHUB_EVENT_PATH)
            .ok_or(GitHubError::MissingEnv(constants::ENV_GITHUB_EVENT_PATH))?;
        Self::from_event_path(Path::new(&path), env)
    }

    /// Resolve build info from an event payload file.
    pub fn from_event_path(path: &Path, env: &Env) -> Result<Self, GitHubError> {
        let text = std::fs::read_to_string(path).map_err(|e| GitHubError::Event {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let event: Event = serde_json::from_str(&text).map_err(|e| GitHubError::Event {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::from_event(event, env))
    }

    fn from_event(event: Event, env: &Env) -> Self {
        let mut info = BuildInfo::default();

        if let Some(repository) = event.repository {
            info.owner = repository.owner.login;
            info.repo = repository.name;
        }
        if info.owner.is_empty() || info.repo.is_empty() {
            if let Some((owner, repo)) = env
                .non_empty(constants::ENV_GITHUB_REPOSITORY)
                .as_deref()
                .and_then(|r| r.split_once('/'))
            {
                info.owner = owner.to_string();
                info.repo = repo.to_string();
            }
        }

        let pr = event
            .pull_request
            .filter(|pr| pr.number > 0)
            // A re-run check suite lists its pull requests instead.
            .or_else(|| event.check_suite.and_then(|cs| cs.pull_requests.into_iter().next()));
        if let Some(pr) = pr {
            info.pull_request = Some(pr.number).filter(|n| *n > 0);
            info.branch = Some(pr.head.r#ref).filter(|b| !b.is_empty());
            info.sha = pr.head.sha;
        }

        if info.sha.is_empty() {
            if let Some(commit) = event.head_commit {
                info.sha = commit.id;
            }
        }
        if info.sha.is_empty() {
            info.sha = env.non_empty(constants::ENV_GITHUB_SHA).unwrap_or_default();
        }

        info
    }

    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Event {
    pull_request: Option<EventPullRequest>,
    repository: Option<EventRepository>,
    check_suite: Option<EventCheckSuite>,
    head_commit: Option<EventCommit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventPullRequest {
    number: u64,
    head: EventHead,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventHead {
    sha: String,
    r#ref: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventRepository {
    owner: EventOwner,
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventOwner {
    login: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventCheckSuite {
    pull_requests: Vec<EventPullRequest>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EventCommit {
    id: String,
}
