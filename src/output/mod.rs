//! Output renderers for surfaced findings: terminal, JSON, GitHub Actions.

pub mod github;
pub mod json;
pub mod terminal;

use crate::models::SurfacedFinding;

/// Trait for rendering surfaced findings to an output format.
pub trait OutputRenderer {
    /// Render findings to a string.
    fn render(&self, findings: &[SurfacedFinding]) -> String;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{DiffLine, DiffLineType, Finding, IdentityKey, SurfacedFinding};

    pub fn surfaced(path: &str, line: u32, severity: &str, source: Option<&str>, message: &str) -> SurfacedFinding {
        SurfacedFinding {
            finding: Finding {
                file: path.rsplit('/').next().unwrap_or(path).into(),
                line,
                column: Some(3),
                message: message.into(),
                severity: severity.into(),
                source: source.map(String::from),
            },
            path: path.into(),
            key: IdentityKey::from_hex(format!("{line:04x}")),
            diff_line: DiffLine {
                line_type: DiffLineType::Added,
                content: "let x = 1;".into(),
                old_line_no: None,
                new_line_no: Some(line),
            },
        }
    }
}
