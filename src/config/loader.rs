//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.changelint.toml` in repo root
//! 4. `~/.config/changelint/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::report::ReportFormat;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub report: ReportConfig,
    pub paths: PathsConfig,
    pub github: GitHubConfig,
    pub review: ReviewConfig,
}

/// Which analysis report to read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub path: String,
    pub format: ReportFormat,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            path: constants::DEFAULT_REPORT_PATH.to_string(),
            format: ReportFormat::Auto,
        }
    }
}

/// How diff paths and report paths are reconciled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Leading segments stripped from diff paths.
    pub strip: usize,
    /// Report working directory relative to the repository root. When
    /// unset it is discovered from git.
    pub workdir: Option<String>,
}

/// GitHub API settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: Option<String>,
    pub token: Option<String>,
    /// Fall back to `git diff` when the API refuses to render a large diff.
    pub fallback_to_git: bool,
}

impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("fallback_to_git", &self.fallback_to_git)
            .finish()
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            token: None,
            fallback_to_git: true,
        }
    }
}

/// Publishing behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Name of the analysis tool, shown in comment bodies.
    pub tool_name: String,
    /// Seed the posted set from markers in existing pull request comments.
    pub skip_existing: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            tool_name: constants::DEFAULT_TOOL_NAME.to_string(),
            skip_existing: false,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, repo-local config, then applies
    /// environment variable overrides.
    pub fn load(repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let global = Self::global_config_path();
        Self::load_from(global.as_deref(), repo_root, env)
    }

    /// Same as [`Config::load`] with an explicit global config path.
    pub fn load_from(global_path: Option<&Path>, repo_root: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut layered = toml::Table::new();
        let mut last_path: Option<PathBuf> = None;

        // Layer 4: global config
        if let Some(global_path) = global_path {
            if global_path.exists() {
                merge_tables(&mut layered, Self::load_file(global_path)?);
                last_path = Some(global_path.to_path_buf());
            }
        }

        // Layer 3: repo-local config
        if let Some(root) = repo_root {
            let local_path = root.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                merge_tables(&mut layered, Self::load_file(&local_path)?);
                last_path = Some(local_path);
            }
        }

        let mut config = match last_path {
            Some(path) => toml::Value::Table(layered)
                .try_into::<Config>()
                .map_err(|source| ConfigError::ParseFile { path, source })?,
            None => Config::default(),
        };

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Read one config file as a raw table, checking it against the schema.
    fn load_file(path: &Path) -> Result<toml::Table, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        let parse_error = |e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        };
        toml::from_str::<Config>(&content).map_err(parse_error)?;
        toml::from_str(&content).map_err(parse_error)
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(val) = env.non_empty(constants::ENV_REPORT) {
            self.report.path = val;
        }
        if let Some(val) = env.non_empty(constants::ENV_STRIP) {
            match val.trim().parse::<usize>() {
                Ok(n) => self.paths.strip = n,
                Err(_) => tracing::warn!("ignoring invalid {} value: {val}", constants::ENV_STRIP),
            }
        }
        if let Some(val) = env.non_empty(constants::ENV_WORKDIR) {
            self.paths.workdir = Some(val);
        }
        if let Some(val) = env.non_empty(constants::ENV_TOOL_NAME) {
            self.review.tool_name = val;
        }

        // GITHUB_API wins over the Actions-provided GITHUB_API_URL.
        if let Some(val) = env
            .non_empty(constants::ENV_GITHUB_API)
            .or_else(|| env.non_empty(constants::ENV_GITHUB_API_URL))
        {
            self.github.api_url = Some(val);
        }

        let token = env
            .non_empty(constants::ENV_GITHUB_TOKEN)
            .or_else(|| env.non_empty(constants::ENV_GITHUB_TOKEN_FALLBACK));
        if token.is_some() {
            self.github.token = token;
        }
    }
}

/// Overlay `other` onto `base` key by key. Keys set in `other` win even
/// when they hold the built-in default.
fn merge_tables(base: &mut toml::Table, other: toml::Table) {
    for (key, value) in other {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(nested)) => merge_tables(existing, nested),
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
