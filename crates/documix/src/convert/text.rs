//! Plain-text and Markdown pass-through.

use crate::error::Result;
use crate::text::normalize_newlines;
use std::path::Path;

/// Read a text file as-is, replacing invalid UTF-8 sequences.
pub async fn convert(path: &Path) -> Result<(String, &'static str)> {
    let bytes = tokio::fs::read(path).await?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok((normalize_newlines(&text), "direct-read"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "héllo\r\nworld").unwrap();

        let (text, method) = convert(&path).await.unwrap();
        assert_eq!(text, "héllo\nworld");
        assert_eq!(method, "direct-read");
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        std::fs::write(&path, b"caf\xe9").unwrap();

        let (text, _) = convert(&path).await.unwrap();
        assert!(text.starts_with("caf"));
        assert!(text.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_missing_file_errors() {
        let result = convert(Path::new("/nonexistent/documix.txt")).await;
        assert!(result.is_err());
    }
}
