//! DOCX conversion: pandoc primary, docx-lite in-process fallback.

use crate::convert::command::{is_fallback_worthy, run_tool};
use crate::error::{DocumixError, Result};
use std::ffi::OsStr;
use std::path::Path;

/// Convert a DOCX file to Markdown with pandoc.
pub async fn convert_with_pandoc(path: &Path, timeout_seconds: u64) -> Result<(String, &'static str)> {
    let args: Vec<&OsStr> = vec![
        OsStr::new("-f"),
        OsStr::new("docx"),
        OsStr::new("-t"),
        OsStr::new("markdown"),
        OsStr::new("--wrap=preserve"),
        OsStr::new("--quiet"),
        path.as_os_str(),
    ];
    let output = run_tool("pandoc", &args, timeout_seconds).await?;
    Ok((output.stdout_text(), "pandoc"))
}

/// In-process fallback using docx-lite's streaming XML extraction.
pub async fn convert_with_docx_lite(path: &Path) -> Result<(String, &'static str)> {
    let bytes = tokio::fs::read(path).await?;
    let text = docx_lite::extract_text_from_bytes(&bytes)
        .map_err(|e| DocumixError::parse(format!("DOCX text extraction failed: {e}")))?;
    if text.trim().is_empty() {
        return Err(DocumixError::conversion("docx-lite produced empty output"));
    }
    Ok((text, "docx-lite"))
}

/// Full DOCX chain: pandoc, then docx-lite. A fallback success after a
/// primary failure still counts as `ok`.
pub async fn convert(path: &Path, timeout_seconds: u64) -> Result<(String, &'static str)> {
    match convert_with_pandoc(path, timeout_seconds).await {
        Ok(converted) => Ok(converted),
        Err(primary) if is_fallback_worthy(&primary) => {
            tracing::debug!(path = %path.display(), error = %primary, "pandoc failed, trying docx-lite");
            convert_with_docx_lite(path).await.map_err(|fallback| {
                DocumixError::conversion(format!("pandoc: {primary}; docx-lite: {fallback}"))
            })
        }
        Err(primary) => Err(primary),
    }
}
