//! Finding types: diagnostics decoded from an analysis report and the
//! subset that survives diff filtering.

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::diff::DiffLine;

/// Coarse severity level used for rendering.
///
/// Findings keep the severity string exactly as the analysis tool reported
/// it; this enum is only derived from it for glyphs, summaries and CI
/// annotation levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational note.
    Info,
    /// Potential issue that should be addressed.
    Warning,
    /// Issue that must be fixed.
    Error,
}

impl Severity {
    /// Map a tool-reported severity string to a level.
    ///
    /// Accepts the spellings Checkstyle, ESLint and friends emit, including
    /// single-letter forms. `note` is treated as info. Returns `None` for
    /// anything else (e.g. Checkstyle's `ignore`).
    pub fn from_report(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "error" | "e" => Some(Severity::Error),
            "warning" | "warn" | "w" => Some(Severity::Warning),
            "info" | "i" | "note" | "n" => Some(Severity::Info),
            _ => None,
        }
    }

    /// Glyph prefixed to review comments.
    pub fn glyph(self) -> &'static str {
        match self {
            Severity::Error => "🚫",
            Severity::Warning => "⚠️",
            Severity::Info => "📝",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single diagnostic as reported by a static-analysis tool.
///
/// `file` is the path exactly as it appears in the report; it is only
/// normalized when matched against a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
    pub message: String,
    /// Severity string as reported (may be empty).
    pub severity: String,
    /// Rule or check identifier, e.g. `com.puppycrawl.tools.checkstyle.checks.UnusedImportsCheck`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl Finding {
    /// Severity level derived from the reported string.
    pub fn level(&self) -> Option<Severity> {
        Severity::from_report(&self.severity)
    }
}

/// Findings grouped by the file key used in the report, in report order.
pub type FindingsByFile = IndexMap<String, Vec<Finding>>;

/// Stable fingerprint of a surfaced finding. See [`crate::identity::identify`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityKey(String);

impl IdentityKey {
    /// Wrap an already-computed hex digest.
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Self(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finding that landed on a line touched by the diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfacedFinding {
    pub finding: Finding,
    /// Repository-relative path the finding was matched under.
    pub path: String,
    pub key: IdentityKey,
    /// The diff line the finding matched.
    pub diff_line: DiffLine,
}

/// Summary statistics for a set of surfaced findings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    /// Findings whose severity string is not a recognised level.
    pub other: usize,
}

impl Summary {
    /// Compute summary from a list of surfaced findings.
    pub fn from_surfaced(findings: &[SurfacedFinding]) -> Self {
        let mut s = Summary::default();
        for f in findings {
            s.total += 1;
            match f.finding.level() {
                Some(Severity::Error) => s.errors += 1,
                Some(Severity::Warning) => s.warnings += 1,
                Some(Severity::Info) => s.info += 1,
                None => s.other += 1,
            }
        }
        s
    }
}
