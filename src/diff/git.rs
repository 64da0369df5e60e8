//! Git CLI wrapper for producing diffs and locating the repository.
//!
//! Shells out to `git` via `tokio::process::Command`.

use std::path::Path;

use super::DiffError;

/// Run `git diff <base_ref>` and return the unified diff output.
pub async fn git_diff(repo_root: &Path, base_ref: &str) -> Result<String, DiffError> {
    run_git(
        repo_root,
        &["diff", "--src-prefix=a/", "--dst-prefix=b/", "--find-renames", base_ref],
        "git diff",
    )
    .await
}

/// Run `git diff --find-renames <base> <head>` between two commits.
///
/// Used when the hosting API refuses to render a pull request diff.
pub async fn git_diff_between(repo_root: &Path, base: &str, head: &str) -> Result<String, DiffError> {
    run_git(
        repo_root,
        &["diff", "--src-prefix=a/", "--dst-prefix=b/", "--find-renames", base, head],
        "git diff",
    )
    .await
}

/// Find the root of the git repository containing `start_dir`.
pub async fn find_repo_root(start_dir: &Path) -> Result<String, DiffError> {
    let out = run_git(start_dir, &["rev-parse", "--show-toplevel"], "git rev-parse")
        .await
        .map_err(|e| match e {
            DiffError::GitError(msg) => DiffError::GitError(format!("not a git repository: {msg}")),
            other => other,
        })?;
    Ok(out.trim().to_string())
}

/// Path of `dir` relative to the repository root, with a trailing `/`,
/// or an empty string at the root.
pub async fn relative_workdir(dir: &Path) -> Result<String, DiffError> {
    let out = run_git(dir, &["rev-parse", "--show-prefix"], "git rev-parse").await?;
    Ok(out.trim().to_string())
}

async fn run_git(dir: &Path, args: &[&str], what: &str) -> Result<String, DiffError> {
    let output = tokio::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|e| DiffError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(DiffError::GitError(format!(
            "{what} failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    // Files in the diff may use any encoding.
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
