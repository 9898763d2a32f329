//! Standard multi-document layout.
//!
//! Repomix-style aggregation: a fixed preamble, directory information, the
//! directory structure block, a table of contents, then one titled section
//! per result in discovery order. Failed and skipped items stay visible
//! with their reason instead of being silently omitted.

use crate::core::config::CompileConfig;
use crate::core::formats::fence_language;
use crate::output::email_layout;
use crate::types::{CompiledItem, ConversionResult, ConversionStatus};

const PREAMBLE: &str = "\
This file is a merged representation of all documents, combined into a single document.

# File Summary

## Purpose
This file contains a packed representation of the entire directory's contents.
It is designed to be easily consumable by AI systems for analysis, review,
or other automated processes.

## File Format
The content is organized as follows:
1. This summary section
2. Directory information
3. Directory structure
4. A table of contents
5. Multiple file entries, each consisting of:
  a. A header with the file path (## File: path/to/file)
  b. Per-file metadata (size, estimated tokens, conversion method)
  c. The full contents of the file in a code block

## Usage Guidelines
- This file should be treated as read-only. Any changes should be made to the
  original files, not this packed version.
- When processing this file, use the file path to distinguish
  between different files in the directory.

## Notes
- Some files may have been excluded based on extension filters or exclusion patterns
- Binary files are only partially supported (PDF, EPUB, DOCX) and conversion quality may vary
- ZIP files are automatically extracted and their contents are included
- Files matching specified exclude patterns are skipped
- Files flagged by the security screener are listed but their content is omitted

";

/// Render the standard layout.
pub fn render(items: &[CompiledItem], config: &CompileConfig, structure: &[String]) -> String {
    let mut out = String::from(PREAMBLE);

    out.push_str("# Directory Information\n");
    out.push_str(&format!("- Source Path: {}\n", config.source.display()));
    out.push_str(&format!("- Total Files Processed: {}\n\n", items.len()));

    out.push_str("# Directory Structure\n```\n");
    for line in structure {
        out.push_str(line);
        out.push('\n');
    }
    out.push_str("```\n\n");

    out.push_str("# Table of Contents\n\n");
    for item in items {
        out.push_str(&format!("- {}\n", item.display_path()));
    }
    out.push('\n');

    out.push_str("# Files\n\n");
    for item in items {
        match item {
            CompiledItem::Document(result) => push_document(&mut out, result),
            CompiledItem::Email(record) => {
                out.push_str(&format!(
                    "## File: {} (converted with email)\n\n",
                    record.relative_path.display()
                ));
                out.push_str(&email_layout::render_email_document(record));
                out.push('\n');
            }
        }
    }

    out
}

fn push_document(out: &mut String, result: &ConversionResult) {
    out.push_str(&format!(
        "## File: {} (converted with {})\n",
        result.item.display_path(),
        result.method
    ));
    out.push_str(&format!(
        "- Size: {} bytes\n- Estimated tokens: {}\n\n",
        result.item.size, result.token_estimate
    ));

    match &result.status {
        ConversionStatus::Ok => {
            if result.method.starts_with("zip-extract") {
                // ZIP summaries are already Markdown; no fence.
                out.push_str(&result.text);
                out.push('\n');
            } else {
                // Four backticks so embedded triple-backtick fences survive.
                let language = fence_language(&result.item.path);
                out.push_str(&format!("````{language}\n"));
                out.push_str(result.text.trim_end());
                out.push_str("\n````\n\n");
            }
        }
        ConversionStatus::Skipped { reason } => {
            out.push_str(&format!("[Skipped: {reason}]\n\n"));
        }
        ConversionStatus::Error { detail } => {
            out.push_str(&format!("[Conversion failed: {detail}]\n\n"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Origin, SkipReason, SourceItem};
    use std::path::PathBuf;

    fn doc_item(path: &str, text: &str) -> CompiledItem {
        let item = SourceItem {
            path: PathBuf::from(path),
            relative_path: PathBuf::from(path),
            extension: crate::core::formats::normalized_extension(&PathBuf::from(path)),
            size: text.len() as u64,
            origin: Origin::Filesystem,
        };
        CompiledItem::Document(ConversionResult::ok(item, text.to_string(), "direct-read"))
    }

    fn config() -> CompileConfig {
        CompileConfig::new("docs")
    }

    #[test]
    fn test_preamble_and_sections() {
        let items = vec![doc_item("a.md", "# alpha")];
        let output = render(&items, &config(), &["  a.md".to_string()]);

        assert!(output.contains("merged representation of all documents"));
        assert!(output.contains("# File Summary"));
        assert!(output.contains("## Purpose"));
        assert!(output.contains("# Directory Information"));
        assert!(output.contains("# Directory Structure"));
        assert!(output.contains("# Table of Contents"));
        assert!(output.contains("- a.md"));
        assert!(output.contains("## File: a.md (converted with direct-read)"));
        assert!(output.contains("# alpha"));
    }

    #[test]
    fn test_sections_in_discovery_order() {
        let items = vec![doc_item("a.md", "alpha"), doc_item("b.md", "beta")];
        let output = render(&items, &config(), &[]);

        let a_pos = output.find("## File: a.md").unwrap();
        let b_pos = output.find("## File: b.md").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn test_code_files_get_language_fence() {
        let items = vec![doc_item("script.py", "print('hi')")];
        let output = render(&items, &config(), &[]);
        assert!(output.contains("````python\n"));
    }

    #[test]
    fn test_failed_items_stay_visible() {
        let item = SourceItem {
            path: PathBuf::from("broken.pdf"),
            relative_path: PathBuf::from("broken.pdf"),
            extension: "pdf".to_string(),
            size: 10,
            origin: Origin::Filesystem,
        };
        let items = vec![CompiledItem::Document(ConversionResult::error(item, "pdftotext died"))];
        let output = render(&items, &config(), &[]);
        assert!(output.contains("## File: broken.pdf"));
        assert!(output.contains("[Conversion failed: pdftotext died]"));
    }

    #[test]
    fn test_skipped_items_show_reason() {
        let item = SourceItem {
            path: PathBuf::from("malware.pdf.exe"),
            relative_path: PathBuf::from("malware.pdf.exe"),
            extension: "exe".to_string(),
            size: 10,
            origin: Origin::Filesystem,
        };
        let items = vec![CompiledItem::Document(ConversionResult::skipped(
            item,
            SkipReason::Suspicious {
                detail: "executable disguised as .pdf document".to_string(),
            },
        ))];
        let output = render(&items, &config(), &[]);
        assert!(output.contains("[Skipped: suspicious"));
    }

    #[test]
    fn test_empty_run_renders_empty_files_section() {
        let output = render(&[], &config(), &[]);
        assert!(output.contains("# Files"));
        assert!(output.contains("- Total Files Processed: 0"));
    }

    #[test]
    fn test_zip_summary_not_fenced() {
        let item = SourceItem {
            path: PathBuf::from("bundle.zip"),
            relative_path: PathBuf::from("bundle.zip"),
            extension: "zip".to_string(),
            size: 10,
            origin: Origin::Filesystem,
        };
        let items = vec![CompiledItem::Document(ConversionResult::ok(
            item,
            "# ZIP Archive Contents: bundle.zip\n".to_string(),
            "zip-extract+direct-read",
        ))];
        let output = render(&items, &config(), &[]);
        assert!(output.contains("# ZIP Archive Contents: bundle.zip"));
        assert!(!output.contains("````\n# ZIP Archive Contents"));
    }
}
