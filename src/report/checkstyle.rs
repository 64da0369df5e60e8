//! Checkstyle XML decoder.
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <checkstyle version="10.12.0">
//!   <file name="src/main/java/App.java">
//!     <error line="12" column="5" severity="warning"
//!            message="Unused import - java.util.List."
//!            source="com.puppycrawl.tools.checkstyle.checks.imports.UnusedImportsCheck"/>
//!   </file>
//! </checkstyle>
//! ```
//!
//! The same format is produced by ESLint, ktlint, PHP_CodeSniffer and
//! others, so only the attributes common to all of them are read.

use serde::Deserialize;

use super::ReportError;
use crate::models::finding::{Finding, FindingsByFile};

#[derive(Debug, Deserialize)]
struct CheckstyleXml {
    #[serde(rename = "file", default)]
    files: Vec<XmlFile>,
}

#[derive(Debug, Deserialize)]
struct XmlFile {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "error", default)]
    errors: Vec<XmlError>,
}

#[derive(Debug, Deserialize)]
struct XmlError {
    #[serde(rename = "@line", default)]
    line: u32,
    #[serde(rename = "@column", default)]
    column: Option<u32>,
    #[serde(rename = "@severity", default)]
    severity: String,
    #[serde(rename = "@message", default)]
    message: String,
    #[serde(rename = "@source", default)]
    source: Option<String>,
}

/// Decode a Checkstyle XML document.
///
/// A file listed more than once has its findings appended under the first
/// occurrence. `<file>` elements without errors still appear, with an
/// empty list.
pub fn parse_checkstyle(xml: &str) -> Result<FindingsByFile, ReportError> {
    let doc: CheckstyleXml = quick_xml::de::from_str(xml).map_err(|e| ReportError::Parse {
        format: "checkstyle",
        reason: e.to_string(),
    })?;

    let mut findings = FindingsByFile::new();
    for file in doc.files {
        let entry = findings.entry(file.name.clone()).or_default();
        entry.extend(file.errors.into_iter().map(|e| Finding {
            file: file.name.clone(),
            line: e.line,
            column: e.column.filter(|c| *c > 0),
            message: e.message,
            severity: e.severity,
            source: e.source.filter(|s| !s.is_empty()),
        }));
    }
    Ok(findings)
}
