//! Read a unified diff from a file.

use std::path::Path;

use super::DiffError;

/// Read a unified diff from a file path.
pub async fn read_diff_file(path: &Path) -> Result<String, DiffError> {
    if !path.exists() {
        return Err(DiffError::PathNotFound(path.display().to_string()));
    }

    let bytes = tokio::fs::read(path).await.map_err(DiffError::FileReadError)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn read_existing_diff_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pr.diff");
        std::fs::write(&path, "diff --git a/f b/f\n").unwrap();

        let content = read_diff_file(&path).await.unwrap();
        assert!(content.starts_with("diff --git"));
    }

    #[tokio::test]
    async fn read_diff_file_with_latin1_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pr.diff");
        let mut diff = b"diff --git a/L.txt b/L.txt\n--- a/L.txt\n+++ b/L.txt\n@@ -1 +1 @@\n-cafe\n+caf".to_vec();
        diff.extend_from_slice(b"\xe9\n");
        std::fs::write(&path, diff).unwrap();

        let content = read_diff_file(&path).await.unwrap();
        assert!(content.ends_with("+caf\u{FFFD}\n"));
        let files = crate::diff::parser::parse_unified_diff(&content).unwrap();
        assert_eq!(files[0].new_path, "L.txt");
    }

    #[tokio::test]
    async fn read_nonexistent_diff_file() {
        let result = read_diff_file(Path::new("/tmp/changelint_no_such.diff")).await;
        assert!(result.unwrap_err().to_string().contains("not found"));
    }
}
