//! EPUB conversion: Calibre's `ebook-convert` primary, pandoc fallback.

use crate::convert::ScopedTempDir;
use crate::convert::command::{is_fallback_worthy, run_tool};
use crate::error::{DocumixError, Result};
use std::ffi::OsStr;
use std::path::Path;

/// Convert an EPUB with `ebook-convert`. Calibre refuses to write to
/// stdout, so the output goes through a scoped temp file.
pub async fn convert_with_calibre(path: &Path, timeout_seconds: u64) -> Result<(String, &'static str)> {
    let temp = ScopedTempDir::create("epub").await?;
    let output_path = temp.path().join("converted.txt");

    let args: Vec<&OsStr> = vec![path.as_os_str(), output_path.as_os_str()];
    run_tool("ebook-convert", &args, timeout_seconds).await?;

    let bytes = tokio::fs::read(&output_path).await.map_err(|e| {
        DocumixError::conversion_with_source("ebook-convert finished but produced no output file", e)
    })?;
    Ok((String::from_utf8_lossy(&bytes).into_owned(), "ebook-convert"))
}

/// Pandoc reads EPUB containers directly; used when Calibre is absent.
pub async fn convert_with_pandoc(path: &Path, timeout_seconds: u64) -> Result<(String, &'static str)> {
    let args: Vec<&OsStr> = vec![
        OsStr::new("-f"),
        OsStr::new("epub"),
        OsStr::new("-t"),
        OsStr::new("markdown"),
        OsStr::new("--wrap=preserve"),
        OsStr::new("--quiet"),
        path.as_os_str(),
    ];
    let output = run_tool("pandoc", &args, timeout_seconds).await?;
    Ok((output.stdout_text(), "pandoc"))
}

/// Full EPUB chain: ebook-convert, then pandoc.
pub async fn convert(path: &Path, timeout_seconds: u64) -> Result<(String, &'static str)> {
    match convert_with_calibre(path, timeout_seconds).await {
        Ok(converted) => Ok(converted),
        Err(primary) if is_fallback_worthy(&primary) => {
            tracing::debug!(path = %path.display(), error = %primary, "ebook-convert failed, trying pandoc");
            convert_with_pandoc(path, timeout_seconds).await.map_err(|fallback| {
                DocumixError::conversion(format!("ebook-convert: {primary}; pandoc: {fallback}"))
            })
        }
        Err(primary) => Err(primary),
    }
}
