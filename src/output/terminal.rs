//! Terminal renderer: styled flowing text grouped by file.

use colored::Colorize;

use crate::models::{Severity, Summary, SurfacedFinding};
use crate::output::OutputRenderer;

/// Terminal output renderer with colored, flowing text.
pub struct TerminalRenderer;

impl OutputRenderer for TerminalRenderer {
    fn render(&self, findings: &[SurfacedFinding]) -> String {
        if findings.is_empty() {
            return format!("{}", "  ✔ No findings on changed lines.\n".green());
        }

        let mut output = String::new();
        let mut sorted = findings.to_vec();
        sorted.sort_by(|a, b| a.path.cmp(&b.path).then(a.finding.line.cmp(&b.finding.line)));

        let mut current_file = "";

        for surfaced in &sorted {
            // Group by file
            if surfaced.path != current_file {
                if !current_file.is_empty() {
                    output.push('\n');
                }
                current_file = &surfaced.path;
            }

            let finding = &surfaced.finding;
            let (icon, severity_str) = match finding.level() {
                Some(Severity::Error) => ("✖".red().bold().to_string(), "error".red().bold().to_string()),
                Some(Severity::Warning) => ("⚠".yellow().bold().to_string(), "warning".yellow().bold().to_string()),
                Some(Severity::Info) => ("ℹ".blue().bold().to_string(), "info".blue().bold().to_string()),
                None if finding.severity.is_empty() => ("•".dimmed().to_string(), "finding".dimmed().to_string()),
                None => ("•".dimmed().to_string(), finding.severity.dimmed().to_string()),
            };

            let location = match finding.column {
                Some(col) => format!("{}:{}:{}", surfaced.path, finding.line, col),
                None => format!("{}:{}", surfaced.path, finding.line),
            };

            output.push_str(&format!(" {icon} {severity_str} in {}\n", location.bold()));
            match finding.source.as_deref() {
                Some(source) => output.push_str(&format!("   {} {}\n", finding.message, format!("({source})").dimmed())),
                None => output.push_str(&format!("   {}\n", finding.message)),
            }
            output.push_str(&format!("   {} {}\n", "│".cyan(), surfaced.diff_line.content.trim_end()));

            output.push('\n');
        }

        // Summary line
        let summary = Summary::from_surfaced(findings);
        output.push_str(&format!("{}\n", "───────────────────────────────────".dimmed()));
        output.push_str(&format!(
            " {} findings on changed lines: {} {}, {} {}, {} {}\n",
            summary.total.to_string().bold(),
            summary.errors.to_string().red().bold(),
            if summary.errors == 1 { "error" } else { "errors" },
            summary.warnings.to_string().yellow().bold(),
            if summary.warnings == 1 { "warning" } else { "warnings" },
            summary.info.to_string().blue().bold(),
            if summary.info == 1 { "info" } else { "infos" },
        ));

        output
    }
}
