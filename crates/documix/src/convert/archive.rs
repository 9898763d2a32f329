//! ZIP archive expansion.
//!
//! Extracts the archive into a scoped temporary directory, validating every
//! entry path against traversal before writing, then feeds the extracted
//! files back through the converter dispatch as nested items. The summary
//! Markdown (entry listing plus per-entry content) becomes the archive's
//! own conversion result, so an archive occupies exactly one section of the
//! output document.

use crate::convert::{ConverterDispatch, ScopedTempDir};
use crate::core::formats::{DocumentKind, fence_language};
use crate::error::{DocumixError, Result};
use crate::security;
use crate::types::{ConversionResult, ConversionStatus, Origin, SourceItem};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::PathBuf;
use zip::ZipArchive;

/// Expand one ZIP item. Parse and extraction failures degrade into an
/// `Error` result; they never abort the run.
pub async fn expand(dispatch: &ConverterDispatch, item: SourceItem) -> ConversionResult {
    match expand_inner(dispatch, &item).await {
        Ok((text, method)) => ConversionResult::ok(item, text, method),
        Err(e) => {
            tracing::warn!(path = %item.display_path(), error = %e, "ZIP expansion failed");
            ConversionResult::error(item, e.to_string())
        }
    }
}

async fn expand_inner(dispatch: &ConverterDispatch, item: &SourceItem) -> Result<(String, String)> {
    let temp = ScopedTempDir::create("zip").await?;

    let (entries, rejected) = extract_entries(&item.path, &temp)?;

    let archive_name = item
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| item.display_path());

    let mut summary = format!("# ZIP Archive Contents: {archive_name}\n\n");
    summary.push_str("## Files in archive:\n\n");
    for entry in &entries {
        summary.push_str(&format!("- {}\n", entry.display()));
    }
    for name in &rejected {
        summary.push_str(&format!("- {name} (skipped, suspicious: path escapes archive root)\n"));
    }

    summary.push_str("\n## Extracted file contents:\n\n");

    let mut methods = BTreeSet::new();
    for relative in &entries {
        let full_path = temp.path().join(relative);
        if DocumentKind::from_path(&full_path) == DocumentKind::Unsupported {
            continue;
        }

        let metadata = std::fs::metadata(&full_path)?;
        let nested = SourceItem {
            path: full_path.clone(),
            relative_path: relative.clone(),
            extension: crate::core::formats::normalized_extension(&full_path),
            size: metadata.len(),
            origin: Origin::ZipEntry {
                archive: item.relative_path.clone(),
            },
        };

        summary.push_str(&format!("### File: {}\n\n", relative.display()));

        let result = dispatch.convert(nested).await;
        match &result.status {
            ConversionStatus::Ok => {
                methods.insert(result.method.clone());
                if result.method.starts_with("zip-extract") || result.method == "email" {
                    // Nested archives and emails are already Markdown.
                    summary.push_str(&result.text);
                    summary.push_str("\n\n");
                } else {
                    let language = fence_language(&full_path);
                    summary.push_str(&format!("```{language}\n{}\n```\n\n", result.text));
                }
            }
            ConversionStatus::Skipped { reason } => {
                summary.push_str(&format!("[Skipped: {reason}]\n\n"));
            }
            ConversionStatus::Error { detail } => {
                summary.push_str(&format!("[Error processing file: {detail}]\n\n"));
            }
        }
    }

    let method = if methods.is_empty() {
        "zip-extract".to_string()
    } else {
        format!("zip-extract+{}", methods.into_iter().collect::<Vec<_>>().join("+"))
    };

    Ok((summary, method))
}

/// Extract all safe entries, returning their relative paths (sorted) and
/// the names of rejected traversal entries.
fn extract_entries(archive_path: &std::path::Path, temp: &ScopedTempDir) -> Result<(Vec<PathBuf>, Vec<String>)> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| DocumixError::parse_with_source(format!("{} is not a valid ZIP file", archive_path.display()), e))?;

    let mut entries = Vec::new();
    let mut rejected = Vec::new();

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| DocumixError::parse_with_source("failed to read ZIP entry", e))?;

        if entry.is_dir() {
            continue;
        }

        let raw_name = entry.name().to_string();
        if !security::is_safe_archive_path(&raw_name) {
            tracing::warn!(entry = %raw_name, "rejecting ZIP entry escaping extraction root");
            rejected.push(raw_name);
            continue;
        }
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!(entry = %raw_name, "rejecting ZIP entry with unresolvable name");
            rejected.push(raw_name);
            continue;
        };

        let destination = temp.path().join(&relative);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut output = File::create(&destination)?;
        std::io::copy(&mut entry, &mut output)?;
        entries.push(relative);
    }

    entries.sort();
    Ok((entries, rejected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::tools::ToolInventory;
    use std::io::Write;
    use zip::write::{FileOptions, ZipWriter};

    fn write_zip(path: &std::path::Path, files: &[(&str, &[u8])]) {
        let file = File::create(path).unwrap();
        let mut zip = ZipWriter::new(file);
        let options = FileOptions::<'_, ()>::default();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
        zip.finish().unwrap();
    }

    fn zip_item(path: &std::path::Path) -> SourceItem {
        SourceItem {
            path: path.to_path_buf(),
            relative_path: PathBuf::from(path.file_name().unwrap()),
            extension: "zip".to_string(),
            size: std::fs::metadata(path).unwrap().len(),
            origin: Origin::Filesystem,
        }
    }

    #[tokio::test]
    async fn test_expand_lists_and_converts_entries() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("bundle.zip");
        write_zip(
            &archive_path,
            &[("readme.md", b"# Hello".as_slice()), ("data/notes.txt", b"notes".as_slice())],
        );

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let result = expand(&dispatch, zip_item(&archive_path)).await;

        assert!(result.status.is_ok());
        assert!(result.text.contains("# ZIP Archive Contents: bundle.zip"));
        assert!(result.text.contains("- readme.md"));
        assert!(result.text.contains("# Hello"));
        assert!(result.text.contains("notes"));
        assert!(result.method.starts_with("zip-extract+"));
    }

    #[tokio::test]
    async fn test_traversal_entries_never_escape() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("evil.zip");
        write_zip(
            &archive_path,
            &[
                ("../../escape.txt", b"malicious".as_slice()),
                ("safe.txt", b"fine".as_slice()),
            ],
        );

        let marker = dir.path().join("escape.txt");

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let result = expand(&dispatch, zip_item(&archive_path)).await;

        assert!(result.status.is_ok());
        assert!(!marker.exists(), "traversal entry must not be written outside the root");
        assert!(result.text.contains("suspicious: path escapes archive root"));
        assert!(result.text.contains("fine"));
    }

    #[tokio::test]
    async fn test_invalid_zip_records_error() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("broken.zip");
        std::fs::write(&archive_path, b"definitely not a zip").unwrap();

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let result = expand(&dispatch, zip_item(&archive_path)).await;

        assert!(result.status.is_error());
    }

    #[tokio::test]
    async fn test_unsupported_entries_are_listed_but_not_converted() {
        let dir = tempfile::tempdir().unwrap();
        let archive_path = dir.path().join("mixed.zip");
        write_zip(
            &archive_path,
            &[("image.bin", b"\x00\x01".as_slice()), ("notes.txt", b"text".as_slice())],
        );

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let result = expand(&dispatch, zip_item(&archive_path)).await;

        assert!(result.text.contains("- image.bin"));
        assert!(!result.text.contains("### File: image.bin"));
        assert!(result.text.contains("### File: notes.txt"));
    }

    #[tokio::test]
    async fn test_nested_zip_is_expanded_inline() {
        let dir = tempfile::tempdir().unwrap();

        let inner_path = dir.path().join("inner.zip");
        write_zip(&inner_path, &[("deep.txt", b"deep content".as_slice())]);
        let inner_bytes = std::fs::read(&inner_path).unwrap();

        let outer_path = dir.path().join("outer.zip");
        write_zip(
            &outer_path,
            &[("inner.zip", inner_bytes.as_slice()), ("top.txt", b"top".as_slice())],
        );

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let result = expand(&dispatch, zip_item(&outer_path)).await;

        assert!(result.status.is_ok());
        assert!(result.text.contains("deep content"));
    }
}
