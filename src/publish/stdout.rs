//! Dry-run publisher that prints comments instead of posting them.

use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use colored::Colorize;

use super::{PublishError, Publisher};
use crate::models::SurfacedFinding;

/// Writes each comment, prefixed by its location, to a writer.
pub struct StdoutPublisher {
    out: Mutex<Box<dyn Write + Send>>,
}

impl StdoutPublisher {
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(out: Box<dyn Write + Send>) -> Self {
        Self { out: Mutex::new(out) }
    }
}

impl Default for StdoutPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Publisher for StdoutPublisher {
    async fn post(&self, finding: &SurfacedFinding, body: &str) -> Result<(), PublishError> {
        // A poisoned lock only means an earlier write panicked; the writer is still usable.
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
        let location = format!("{}:{}", finding.path, finding.finding.line);
        writeln!(out, "{} {}", "would comment on".dimmed(), location.bold())?;
        for line in body.lines() {
            writeln!(out, "  {line}")?;
        }
        writeln!(out)?;
        Ok(())
    }
}
