//! Email-specific rendering.
//!
//! Two forms: [`render_email_report`] is the whole-document layout used
//! when a run contains exactly one email; [`render_email_document`] is the
//! per-email block embedded in the standard layout and in nested contexts
//! (archives, forwarded attachments).

use crate::core::formats::fence_language;
use crate::types::{ConversionStatus, EmailRecord};

/// Render the full email analysis layout for a single-email run.
pub fn render_email_report(record: &EmailRecord) -> String {
    let mut out = String::new();

    out.push_str("# Email Analysis Report\n\n");
    out.push_str("Processing mode: Single Email\n\n");

    out.push_str("## Email Summary\n\n");
    out.push_str(&format!(
        "- **Subject**: {}\n",
        record.subject.as_deref().unwrap_or("(no subject)")
    ));
    out.push_str(&format!(
        "- **From**: {}\n",
        record.from.as_deref().unwrap_or("(unknown sender)")
    ));
    out.push_str(&format!("- **Attachments**: {}\n\n", record.attachments.len()));

    out.push_str("## Email Details\n\n");
    out.push_str("### Message Information\n\n");
    push_metadata(&mut out, record);
    out.push('\n');

    out.push_str("### Authentication\n\n");
    out.push_str(&format!("- **SPF**: {}\n", record.auth.spf));
    out.push_str(&format!("- **DKIM**: {}\n", record.auth.dkim));
    out.push_str(&format!("- **DMARC**: {}\n\n", record.auth.dmarc));

    out.push_str("### Body\n\n");
    if record.body.trim().is_empty() {
        out.push_str("(empty body)\n\n");
    } else {
        out.push_str(record.body.trim_end());
        out.push_str("\n\n");
    }

    if !record.attachments.is_empty() {
        out.push_str("## Attachments\n\n");
        if record.folder_attachments {
            out.push_str("Attachment source: adjacent `attachments/` directory\n\n");
        }
        for attachment in &record.attachments {
            push_attachment(&mut out, attachment);
        }
    }

    out
}

/// Render one email as a Markdown document block for embedding in larger
/// layouts.
pub fn render_email_document(record: &EmailRecord) -> String {
    let name = record
        .path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| record.relative_path.display().to_string());

    let mut out = String::new();
    out.push_str(&format!("# Email Document: {name}\n\n"));

    out.push_str("## Email Metadata\n\n");
    push_metadata(&mut out, record);
    out.push_str(&format!("- **SPF**: {}\n", record.auth.spf));
    out.push_str(&format!("- **DKIM**: {}\n", record.auth.dkim));
    out.push_str(&format!("- **DMARC**: {}\n", record.auth.dmarc));
    out.push('\n');

    out.push_str("## Email Content\n\n");
    if record.body.trim().is_empty() {
        out.push_str("(empty body)\n\n");
    } else {
        out.push_str(record.body.trim_end());
        out.push_str("\n\n");
    }

    if !record.attachments.is_empty() {
        out.push_str("## Attachments\n\n");
        for attachment in &record.attachments {
            push_attachment(&mut out, attachment);
        }
    }

    out
}

fn push_metadata(out: &mut String, record: &EmailRecord) {
    if let Some(from) = &record.from {
        out.push_str(&format!("- **From**: {from}\n"));
    }
    if !record.to.is_empty() {
        out.push_str(&format!("- **To**: {}\n", record.to.join(", ")));
    }
    if !record.cc.is_empty() {
        out.push_str(&format!("- **CC**: {}\n", record.cc.join(", ")));
    }
    if let Some(subject) = &record.subject {
        out.push_str(&format!("- **Subject**: {subject}\n"));
    }
    if let Some(date) = &record.date {
        out.push_str(&format!("- **Date**: {date}\n"));
    }
    if let Some(message_id) = &record.message_id {
        out.push_str(&format!("- **Message-ID**: {message_id}\n"));
    }
}

fn push_attachment(out: &mut String, attachment: &crate::types::ConversionResult) {
    out.push_str(&format!("### Attachment: {}\n\n", attachment.item.display_path()));
    out.push_str(&format!(
        "- Size: {} bytes\n- Estimated tokens: {}\n- Converted with: {}\n\n",
        attachment.item.size, attachment.token_estimate, attachment.method
    ));

    match &attachment.status {
        ConversionStatus::Ok => {
            if attachment.method.starts_with("zip-extract") || attachment.method == "email" {
                out.push_str(&attachment.text);
                out.push_str("\n\n");
            } else {
                let language = fence_language(&attachment.item.path);
                out.push_str(&format!("```{language}\n{}\n```\n\n", attachment.text.trim_end()));
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
    use crate::types::{ConversionResult, EmailAuth, AuthState, Origin, SkipReason, SourceItem};
    use std::path::PathBuf;

    fn record() -> EmailRecord {
        EmailRecord {
            path: PathBuf::from("/mail/test.eml"),
            relative_path: PathBuf::from("test.eml"),
            from: Some("test@example.com".to_string()),
            to: vec!["recipient@example.com".to_string()],
            cc: vec![],
            subject: Some("Test Email".to_string()),
            date: Some("2025-01-01T12:00:00Z".to_string()),
            message_id: Some("test123@example.com".to_string()),
            auth: EmailAuth {
                spf: AuthState::Pass,
                dkim: AuthState::Absent,
                dmarc: AuthState::Absent,
            },
            body: "This is a **test** email body.".to_string(),
            folder_attachments: false,
            attachments: vec![],
        }
    }

    fn attachment(path: &str, text: &str) -> ConversionResult {
        let item = SourceItem {
            path: PathBuf::from(path),
            relative_path: PathBuf::from(path),
            extension: "txt".to_string(),
            size: text.len() as u64,
            origin: Origin::EmailAttachment {
                email: PathBuf::from("test.eml"),
            },
        };
        ConversionResult::ok(item, text.to_string(), "direct-read")
    }

    #[test]
    fn test_report_layout_headings() {
        let output = render_email_report(&record());
        assert!(output.contains("# Email Analysis Report"));
        assert!(output.contains("Processing mode: Single Email"));
        assert!(output.contains("## Email Summary"));
        assert!(output.contains("## Email Details"));
        assert!(output.contains("### Message Information"));
        assert!(output.contains("**From**: test@example.com"));
        assert!(output.contains("- **SPF**: pass"));
    }

    #[test]
    fn test_report_layout_excludes_standard_preamble() {
        let output = render_email_report(&record());
        assert!(!output.contains("merged representation"));
        assert!(!output.contains("packed representation"));
    }

    #[test]
    fn test_document_block_headings() {
        let output = render_email_document(&record());
        assert!(output.contains("# Email Document: test.eml"));
        assert!(output.contains("## Email Metadata"));
        assert!(output.contains("## Email Content"));
        assert!(output.contains("**test**"));
    }

    #[test]
    fn test_attachments_render_inline() {
        let mut rec = record();
        rec.attachments.push(attachment("doc.txt", "attachment body"));

        let output = render_email_report(&rec);
        assert!(output.contains("## Attachments"));
        assert!(output.contains("### Attachment: doc.txt"));
        assert!(output.contains("attachment body"));
    }

    #[test]
    fn test_failed_attachment_marked_inline() {
        let mut rec = record();
        let item = SourceItem {
            path: PathBuf::from("bad.pdf"),
            relative_path: PathBuf::from("bad.pdf"),
            extension: "pdf".to_string(),
            size: 10,
            origin: Origin::EmailAttachment {
                email: PathBuf::from("test.eml"),
            },
        };
        rec.attachments.push(ConversionResult::error(item, "pdftotext failed"));

        let output = render_email_report(&rec);
        assert!(output.contains("[Conversion failed: pdftotext failed]"));
    }

    #[test]
    fn test_skipped_attachment_marked_inline() {
        let mut rec = record();
        let item = SourceItem {
            path: PathBuf::from("evil.pdf.exe"),
            relative_path: PathBuf::from("evil.pdf.exe"),
            extension: "exe".to_string(),
            size: 10,
            origin: Origin::EmailAttachment {
                email: PathBuf::from("test.eml"),
            },
        };
        rec.attachments.push(ConversionResult::skipped(
            item,
            SkipReason::Suspicious {
                detail: "executable disguised as .pdf document".to_string(),
            },
        ));

        let output = render_email_report(&rec);
        assert!(output.contains("[Skipped: suspicious"));
    }
}
