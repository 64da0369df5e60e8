//! Clap argument types and validation.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use changelint::models::SurfacedFinding;
use changelint::report::ReportFormat;

// InputMode is defined in models/ and re-exported here for convenience.
pub use changelint::models::InputMode;

/// Surface static-analysis findings on the lines a change touched.
#[derive(Parser, Debug)]
#[command(name = "changelint", version = changelint::constants::VERSION, about)]
pub struct Cli {
    /// Working directory the report paths are relative to (default: current directory).
    #[arg(long, default_value = ".")]
    pub path: PathBuf,

    // --- Report ---
    /// Analysis report to read [default: build/reports/checkstyle/main.xml].
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Report format; `auto` picks by file extension.
    #[arg(long)]
    pub report_format: Option<ReportFormat>,

    // --- Input (one required) ---
    /// Pre-computed unified diff file.
    #[arg(long)]
    pub diff_file: Option<PathBuf>,

    /// Read unified diff from stdin.
    #[arg(long, default_value_t = false)]
    pub diff_stdin: bool,

    /// Branch or commit to diff against (uses git diff).
    #[arg(long)]
    pub diff_base: Option<String>,

    /// Fetch the pull request diff from GitHub and post review comments.
    #[arg(long, default_value_t = false)]
    pub github: bool,

    // --- Paths ---
    /// Leading path segments to strip from diff paths (after `a/`/`b/`).
    #[arg(long)]
    pub strip: Option<usize>,

    /// Report working directory relative to the repository root
    /// (default: discovered from git).
    #[arg(long)]
    pub workdir: Option<String>,

    // --- Review ---
    /// Tool name shown in comment bodies.
    #[arg(long)]
    pub tool_name: Option<String>,

    /// Print the comments that would be posted instead of posting them.
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Skip findings already commented on by a previous run.
    #[arg(long, default_value_t = false)]
    pub skip_existing: bool,

    /// Never fall back to `git diff` when the pull request diff is too large.
    #[arg(long, default_value_t = false)]
    pub no_git_fallback: bool,

    // --- Output ---
    /// Output format for the surfaced findings.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,

    /// Debug logging.
    #[arg(long, short = 'v', default_value_t = false, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only errors are logged.
    #[arg(long, short = 'q', default_value_t = false)]
    pub quiet: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
    Github,
}

impl OutputFormat {
    /// Render findings using the renderer for this format.
    pub fn render(&self, findings: &[SurfacedFinding]) -> String {
        use changelint::output::OutputRenderer;
        match self {
            OutputFormat::Terminal => changelint::output::terminal::TerminalRenderer.render(findings),
            OutputFormat::Json => changelint::output::json::JsonRenderer.render(findings),
            OutputFormat::Github => changelint::output::github::GithubRenderer.render(findings),
        }
    }
}

impl Cli {
    /// Validate that exactly one input source is provided.
    pub fn validate_input(&self) -> Result<InputMode, String> {
        let sources = [
            self.diff_file.is_some(),
            self.diff_stdin,
            self.diff_base.is_some(),
            self.github,
        ];
        let count = sources.iter().filter(|&&x| x).count();

        if count == 0 {
            return Err(
                "one input source is required: --diff-file, --diff-stdin, --diff-base, or --github"
                    .to_string(),
            );
        }
        if count > 1 {
            return Err(
                "only one input source allowed: --diff-file, --diff-stdin, --diff-base, or --github"
                    .to_string(),
            );
        }

        if let Some(ref path) = self.diff_file {
            Ok(InputMode::DiffFile(path.clone()))
        } else if self.diff_stdin {
            Ok(InputMode::Stdin)
        } else if let Some(ref base) = self.diff_base {
            Ok(InputMode::GitBase(base.clone()))
        } else {
            Ok(InputMode::GitHub)
        }
    }

    /// `tracing` filter directive for the chosen verbosity.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "changelint=debug"
        } else if self.quiet {
            "changelint=error"
        } else {
            "changelint=info"
        }
    }
}
