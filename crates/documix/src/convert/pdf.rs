//! PDF text extraction via `pdftotext` (poppler-utils).

use crate::convert::command::run_tool;
use crate::error::Result;
use std::ffi::OsStr;
use std::path::Path;

/// Extract text from a PDF, preserving layout. The single attempt in the
/// PDF chain; `pdftotext` writes to stdout when the output argument is `-`.
pub async fn convert(path: &Path, timeout_seconds: u64) -> Result<(String, &'static str)> {
    let args: Vec<&OsStr> = vec![OsStr::new("-layout"), path.as_os_str(), OsStr::new("-")];
    let output = run_tool("pdftotext", &args, timeout_seconds).await?;
    Ok((output.stdout_text(), "pdftotext"))
}
