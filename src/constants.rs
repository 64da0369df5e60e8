//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! and URLs so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "changelint";

/// Version string baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.changelint.toml` in repo root).
pub const CONFIG_FILENAME: &str = ".changelint.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "changelint";

/// Report read when `--report` is not given (Gradle's Checkstyle plugin output).
pub const DEFAULT_REPORT_PATH: &str = "build/reports/checkstyle/main.xml";

/// Analysis tool name shown in comment bodies by default.
pub const DEFAULT_TOOL_NAME: &str = "checkstyle";

/// User-Agent header sent with every API request.
pub const USER_AGENT: &str = concat!("changelint/", env!("CARGO_PKG_VERSION"));

/// Timeout applied to every HTTP request.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// Public GitHub REST API.
pub const DEFAULT_GITHUB_API: &str = "https://api.github.com/";

/// Prefix of the hidden marker embedded in posted comments.
pub const COMMENT_MARKER_PREFIX: &str = "<!-- changelint:";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_GITHUB_TOKEN: &str = "CHANGELINT_GITHUB_TOKEN";
pub const ENV_GITHUB_TOKEN_FALLBACK: &str = "GITHUB_TOKEN";
pub const ENV_GITHUB_API: &str = "GITHUB_API";
pub const ENV_GITHUB_API_URL: &str = "GITHUB_API_URL";
pub const ENV_STRIP: &str = "CHANGELINT_STRIP";
pub const ENV_WORKDIR: &str = "CHANGELINT_WORKDIR";
pub const ENV_TOOL_NAME: &str = "CHANGELINT_TOOL_NAME";
pub const ENV_REPORT: &str = "CHANGELINT_REPORT";
pub const ENV_GITHUB_EVENT_PATH: &str = "GITHUB_EVENT_PATH";
pub const ENV_GITHUB_SHA: &str = "GITHUB_SHA";
pub const ENV_GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
