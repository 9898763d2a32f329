//! Legacy Word (.doc) conversion.
//!
//! The primary attempt converts the file to DOCX with LibreOffice's
//! headless mode and hands the result to the DOCX chain; the source file is
//! first copied into the temp workspace so the original is never touched.
//! When LibreOffice is absent the chain falls back to `antiword`, then
//! `catdoc`.

use crate::convert::ScopedTempDir;
use crate::convert::command::{is_fallback_worthy, run_tool};
use crate::convert::docx;
use crate::error::{DocumixError, Result};
use std::ffi::OsStr;
use std::path::Path;

/// Convert via LibreOffice: .doc → .docx in a scoped temp dir, then the
/// DOCX chain. Returns a combined method name such as `soffice+pandoc`.
pub async fn convert_with_soffice(path: &Path, timeout_seconds: u64) -> Result<(String, String)> {
    let temp = ScopedTempDir::create("doc").await?;

    let file_name = path
        .file_name()
        .ok_or_else(|| DocumixError::validation(format!("invalid .doc file name: {}", path.display())))?;
    let staged_input = temp.path().join(file_name);
    tokio::fs::copy(path, &staged_input).await?;

    let args: Vec<&OsStr> = vec![
        OsStr::new("--headless"),
        OsStr::new("--convert-to"),
        OsStr::new("docx"),
        OsStr::new("--outdir"),
        temp.path().as_os_str(),
        staged_input.as_os_str(),
    ];
    run_tool("soffice", &args, timeout_seconds).await?;

    let stem = staged_input
        .file_stem()
        .ok_or_else(|| DocumixError::validation("invalid .doc file name".to_string()))?;
    let converted = temp.path().join(format!("{}.docx", stem.to_string_lossy()));
    if !converted.exists() {
        return Err(DocumixError::conversion(format!(
            "LibreOffice finished but did not produce {}",
            converted.display()
        )));
    }

    let (text, docx_method) = docx::convert(&converted, timeout_seconds).await?;
    Ok((text, format!("soffice+{docx_method}")))
}

async fn convert_with_tool(tool: &'static str, path: &Path, timeout_seconds: u64) -> Result<(String, String)> {
    let args: Vec<&OsStr> = vec![path.as_os_str()];
    let output = run_tool(tool, &args, timeout_seconds).await?;
    let text = output.stdout_text();
    if text.trim().is_empty() {
        return Err(DocumixError::conversion(format!("{tool} produced empty output")));
    }
    Ok((text, tool.to_string()))
}

/// Full DOC chain: soffice → antiword → catdoc.
pub async fn convert(path: &Path, timeout_seconds: u64) -> Result<(String, String)> {
    let mut failures = Vec::new();

    match convert_with_soffice(path, timeout_seconds).await {
        Ok(converted) => return Ok(converted),
        Err(e) if is_fallback_worthy(&e) => {
            tracing::debug!(path = %path.display(), error = %e, "soffice chain failed, trying antiword");
            failures.push(format!("soffice: {e}"));
        }
        Err(e) => return Err(e),
    }

    for tool in ["antiword", "catdoc"] {
        match convert_with_tool(tool, path, timeout_seconds).await {
            Ok(converted) => return Ok(converted),
            Err(e) if is_fallback_worthy(&e) => failures.push(format!("{tool}: {e}")),
            Err(e) => return Err(e),
        }
    }

    Err(DocumixError::conversion(failures.join("; ")))
}
