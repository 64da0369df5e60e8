//! One review run: diff → line index → filter → publish.
//!
//! All run state lives in [`RunContext`]; nothing is kept in globals, so
//! separate runs in the same process never share an index or a posted set.

use thiserror::Error;

use crate::diff::{self, DiffError, DiffSource};
use crate::filter::filter_findings;
use crate::identity::PostedSet;
use crate::index::LineIndex;
use crate::index::paths::PathNormalizer;
use crate::models::{FileDiff, FindingsByFile, IdentityKey, SurfacedFinding};
use crate::publish::{self, PublishError, PublishErrors, PublishOutcome, Publisher};

/// Errors that end a run.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to get diff")]
    Diff(#[from] DiffError),

    #[error("failed to list existing comments")]
    ExistingComments(#[source] PublishError),

    #[error(transparent)]
    Publish(#[from] PublishErrors),
}

/// State owned by a single run.
#[derive(Debug)]
pub struct RunContext {
    normalizer: PathNormalizer,
    index: LineIndex,
    posted: PostedSet,
    tool_name: String,
}

/// What a run surfaced and published.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub surfaced: Vec<SurfacedFinding>,
    pub outcome: PublishOutcome,
}

impl RunContext {
    pub fn new(normalizer: PathNormalizer, tool_name: impl Into<String>) -> Self {
        Self {
            normalizer,
            index: LineIndex::default(),
            posted: PostedSet::new(),
            tool_name: tool_name.into(),
        }
    }

    /// Replace the line index with one built from `diffs`.
    pub fn index_diffs(&mut self, diffs: &[FileDiff]) {
        self.index = LineIndex::build(diffs, &self.normalizer);
    }

    /// Mark keys as already posted, e.g. from a previous run's comments.
    pub fn seed_posted(&mut self, keys: impl IntoIterator<Item = IdentityKey>) {
        self.posted.extend(keys);
    }

    /// Findings that land on lines of the indexed diff.
    pub fn surface(&self, findings: &FindingsByFile) -> Vec<SurfacedFinding> {
        filter_findings(findings, &self.index, &self.normalizer)
    }

    pub async fn publish(
        &mut self,
        publisher: &dyn Publisher,
        surfaced: &[SurfacedFinding],
    ) -> Result<PublishOutcome, PublishErrors> {
        publish::publish_all(&mut self.posted, publisher, surfaced, &self.tool_name).await
    }

    pub fn index(&self) -> &LineIndex {
        &self.index
    }

    pub fn posted(&self) -> &PostedSet {
        &self.posted
    }

    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }
}

/// Options for [`run`].
#[derive(Default, Clone, Copy)]
pub struct RunOptions<'a> {
    /// Where comments go. `None` only surfaces findings.
    pub publisher: Option<&'a dyn Publisher>,
    /// Seed the posted set from comments the publisher already holds.
    pub skip_existing: bool,
}

/// Fetch and index the diff, filter `findings` against it, and publish
/// what surfaced.
pub async fn run(
    ctx: &mut RunContext,
    findings: &FindingsByFile,
    source: &dyn DiffSource,
    options: RunOptions<'_>,
) -> Result<RunReport, RunError> {
    let diffs = diff::get_diffs(source).await?;
    ctx.index_diffs(&diffs);
    tracing::info!(
        "diff touches {} file(s), {} indexed line(s)",
        ctx.index.file_count(),
        ctx.index.line_count()
    );

    let surfaced = ctx.surface(findings);
    let total: usize = findings.values().map(Vec::len).sum();
    tracing::info!("{} of {total} finding(s) on changed lines", surfaced.len());

    let mut outcome = PublishOutcome::default();
    if let Some(publisher) = options.publisher {
        if options.skip_existing {
            let existing = publisher
                .existing_keys()
                .await
                .map_err(RunError::ExistingComments)?;
            tracing::info!("{} existing comment(s) carry an identity marker", existing.len());
            ctx.seed_posted(existing);
        }
        outcome = ctx.publish(publisher, &surfaced).await?;
        tracing::info!(
            "posted {} comment(s), skipped {} already posted",
            outcome.posted,
            outcome.skipped
        );
    }

    Ok(RunReport { surfaced, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Finding;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedDiff(&'static str);

    #[async_trait]
    impl DiffSource for FixedDiff {
        async fn diff_text(&self) -> Result<String, DiffError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct Counting {
        posts: Mutex<Vec<String>>,
        existing: Vec<IdentityKey>,
    }

    #[async_trait]
    impl Publisher for Counting {
        async fn post(&self, finding: &SurfacedFinding, _body: &str) -> Result<(), PublishError> {
            self.posts.lock().unwrap().push(finding.path.clone());
            Ok(())
        }

        async fn existing_keys(&self) -> Result<Vec<IdentityKey>, PublishError> {
            Ok(self.existing.clone())
        }
    }

    const DIFF: &str = "\
diff --git a/src/a.go b/src/a.go
--- a/src/a.go
+++ b/src/a.go
@@ -40,2 +40,3 @@
 func f() {
+\tx := 1
 }
";

    fn findings() -> FindingsByFile {
        let mut map = FindingsByFile::new();
        map.insert(
            "src/a.go".into(),
            vec![
                Finding {
                    file: "src/a.go".into(),
                    line: 41,
                    column: None,
                    message: "unused var".into(),
                    severity: "warning".into(),
                    source: None,
                },
                Finding {
                    file: "src/a.go".into(),
                    line: 10,
                    column: None,
                    message: "untouched".into(),
                    severity: "warning".into(),
                    source: None,
                },
            ],
        );
        map
    }

    #[tokio::test]
    async fn surfaces_without_publisher() {
        let mut ctx = RunContext::new(PathNormalizer::new(), "checkstyle");
        let report = run(&mut ctx, &findings(), &FixedDiff(DIFF), RunOptions::default())
            .await
            .unwrap();
        assert_eq!(report.surfaced.len(), 1);
        assert_eq!(report.surfaced[0].finding.line, 41);
        assert_eq!(report.outcome, PublishOutcome::default());
        assert!(ctx.posted().is_empty());
    }

    #[tokio::test]
    async fn rerun_in_same_context_posts_nothing_new() {
        let publisher = Counting::default();
        let mut ctx = RunContext::new(PathNormalizer::new(), "checkstyle");
        let options = RunOptions {
            publisher: Some(&publisher),
            skip_existing: false,
        };

        run(&mut ctx, &findings(), &FixedDiff(DIFF), options).await.unwrap();
        let second = run(&mut ctx, &findings(), &FixedDiff(DIFF), options).await.unwrap();

        assert_eq!(second.outcome.skipped, 1);
        assert_eq!(publisher.posts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn skip_existing_seeds_posted_set() {
        let mut first = RunContext::new(PathNormalizer::new(), "checkstyle");
        first.index_diffs(&crate::diff::parser::parse_unified_diff(DIFF).unwrap());
        let key = first.surface(&findings())[0].key.clone();

        let publisher = Counting {
            existing: vec![key],
            ..Default::default()
        };
        let mut ctx = RunContext::new(PathNormalizer::new(), "checkstyle");
        let report = run(
            &mut ctx,
            &findings(),
            &FixedDiff(DIFF),
            RunOptions {
                publisher: Some(&publisher),
                skip_existing: true,
            },
        )
        .await
        .unwrap();

        assert_eq!(report.outcome.posted, 0);
        assert_eq!(report.outcome.skipped, 1);
        assert!(publisher.posts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_diff_is_fatal() {
        let mut ctx = RunContext::new(PathNormalizer::new(), "checkstyle");
        let err = run(
            &mut ctx,
            &findings(),
            &FixedDiff("--- a/x\n+++ b/x\n@@ -1,2 +1,2 @@\n+only one\n"),
            RunOptions::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RunError::Diff(DiffError::Parse { .. })));
    }

    #[tokio::test]
    async fn error_chain_names_each_cause_once() {
        let mut ctx = RunContext::new(PathNormalizer::new(), "checkstyle");
        let err = run(
            &mut ctx,
            &findings(),
            &FixedDiff("--- a/x\n+++ b/x\n@@ -1,2 +1,2 @@\n+only one\n"),
            RunOptions::default(),
        )
        .await
        .unwrap_err();

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert!(chain.starts_with("failed to get diff: "), "got: {chain}");
        assert_eq!(chain.matches("diff parse error").count(), 1, "got: {chain}");
    }
}
