//! Email (.eml) processing.
//!
//! Parses the MIME structure with `mail-parser`, converts the best body
//! part to Markdown (HTML preferred, plain text fallback), extracts
//! SPF/DKIM/DMARC verdicts from the authentication headers, and resolves
//! attachments.
//!
//! Attachment policy: when a sibling directory named `attachments` exists
//! next to the .eml file, its contents are the attachment set and the
//! MIME-embedded bytes are ignored; otherwise the embedded attachments are
//! written to a scoped temporary directory. Either way each attachment runs
//! through the converter dispatch.

use crate::convert::{ConverterDispatch, ScopedTempDir, html};
use crate::error::{DocumixError, Result};
use crate::types::{AuthState, ConversionResult, EmailAuth, EmailRecord, Origin, SourceItem};
use mail_parser::{MessageParser, MimeHeaders};
use std::path::{Path, PathBuf};

/// One MIME attachment lifted out of the parsed message.
struct MimeAttachment {
    file_name: String,
    data: Vec<u8>,
}

/// Owned parse of one message, so nothing borrows the raw bytes across the
/// attachment-conversion awaits.
struct ParsedEmail {
    from: Option<String>,
    to: Vec<String>,
    cc: Vec<String>,
    subject: Option<String>,
    date: Option<String>,
    message_id: Option<String>,
    auth: EmailAuth,
    body: String,
    attachments: Vec<MimeAttachment>,
}

/// Process one top-level .eml item into an [`EmailRecord`].
pub async fn process_email(dispatch: &ConverterDispatch, item: &SourceItem) -> Result<EmailRecord> {
    let bytes = tokio::fs::read(&item.path).await?;
    let parsed = parse_message(&bytes)?;

    let sibling_attachments = item
        .path
        .parent()
        .map(|dir| dir.join("attachments"))
        .filter(|dir| dir.is_dir());
    let use_folder = sibling_attachments.is_some();

    let attachments = match &sibling_attachments {
        Some(dir) => {
            tracing::info!(path = %item.display_path(), dir = %dir.display(), "using attachments directory");
            convert_folder_attachments(dispatch, item, dir).await?
        }
        None => convert_mime_attachments(dispatch, item, &parsed.attachments).await?,
    };

    Ok(EmailRecord {
        path: item.path.clone(),
        relative_path: item.relative_path.clone(),
        from: parsed.from,
        to: parsed.to,
        cc: parsed.cc,
        subject: parsed.subject,
        date: parsed.date,
        message_id: parsed.message_id,
        auth: parsed.auth,
        body: parsed.body,
        folder_attachments: use_folder,
        attachments,
    })
}

/// Nested form used for emails found inside archives or attached to other
/// emails: the record is rendered inline as a Markdown document block.
pub async fn convert_as_document(dispatch: &ConverterDispatch, item: SourceItem) -> ConversionResult {
    match process_email(dispatch, &item).await {
        Ok(record) => {
            let text = crate::output::email_layout::render_email_document(&record);
            ConversionResult::ok(item, text, "email")
        }
        Err(e) => {
            tracing::warn!(path = %item.display_path(), error = %e, "email processing failed");
            ConversionResult::error(item, e.to_string())
        }
    }
}

fn parse_message(bytes: &[u8]) -> Result<ParsedEmail> {
    if bytes.is_empty() {
        return Err(DocumixError::parse("email file is empty"));
    }

    let message = MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| DocumixError::parse("failed to parse EML file: invalid email format"))?;

    let subject = message.subject().map(|s| s.to_string());

    let from = message
        .from()
        .and_then(|from| from.first())
        .and_then(|addr| addr.address())
        .map(|s| s.to_string());

    let to: Vec<String> = message
        .to()
        .map(|to| {
            to.iter()
                .filter_map(|addr| addr.address().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let cc: Vec<String> = message
        .cc()
        .map(|cc| {
            cc.iter()
                .filter_map(|addr| addr.address().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default();

    let date = message.date().map(|d| d.to_rfc3339());
    let message_id = message.message_id().map(|id| id.to_string());

    let html_body = message.body_html(0).map(|s| s.to_string());
    let plain_body = message.body_text(0).map(|s| s.to_string());

    // Prefer the HTML part converted to Markdown; fall back to the plain
    // part, then to tag stripping when the converter rejects the HTML.
    let body = match (&html_body, &plain_body) {
        (Some(html_content), plain) => match html::html_to_markdown(html_content) {
            Ok(markdown) => markdown,
            Err(e) => {
                tracing::debug!(error = %e, "HTML body conversion failed, degrading");
                plain.clone().unwrap_or_else(|| html::strip_tags(html_content))
            }
        },
        (None, Some(plain)) => plain.clone(),
        (None, None) => String::new(),
    };

    let mut attachments = Vec::new();
    for (index, attachment) in message.attachments().enumerate() {
        let data = attachment.contents().to_vec();
        if data.is_empty() {
            continue;
        }
        let file_name = attachment
            .attachment_name()
            .map(sanitize_attachment_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| {
                let extension = attachment
                    .content_type()
                    .and_then(|ct| {
                        let mime = format!("{}/{}", ct.ctype(), ct.subtype().unwrap_or("octet-stream"));
                        mime_guess::get_mime_extensions_str(&mime).and_then(|exts| exts.first().copied())
                    })
                    .unwrap_or("bin");
                format!("attachment-{}.{extension}", index + 1)
            });
        attachments.push(MimeAttachment { file_name, data });
    }

    let auth = parse_auth_headers(bytes);

    Ok(ParsedEmail {
        from,
        to,
        cc,
        subject,
        date,
        message_id,
        auth,
        body,
        attachments,
    })
}

/// Attachment filenames come from the wire; keep only the final path
/// component so a crafted name cannot escape the extraction root.
fn sanitize_attachment_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn convert_folder_attachments(
    dispatch: &ConverterDispatch,
    email_item: &SourceItem,
    dir: &Path,
) -> Result<Vec<ConversionResult>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .map_err(|e| DocumixError::access_with_source(format!("cannot read {}", dir.display()), e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut results = Vec::new();
    for path in paths {
        results.push(convert_attachment(dispatch, email_item, &path).await);
    }
    Ok(results)
}

async fn convert_mime_attachments(
    dispatch: &ConverterDispatch,
    email_item: &SourceItem,
    attachments: &[MimeAttachment],
) -> Result<Vec<ConversionResult>> {
    if attachments.is_empty() {
        return Ok(Vec::new());
    }

    let temp = ScopedTempDir::create("eml").await?;
    let mut results = Vec::new();
    for attachment in attachments {
        let path = temp.path().join(&attachment.file_name);
        tokio::fs::write(&path, &attachment.data).await?;
        results.push(convert_attachment(dispatch, email_item, &path).await);
    }
    Ok(results)
}

async fn convert_attachment(dispatch: &ConverterDispatch, email_item: &SourceItem, path: &Path) -> ConversionResult {
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let relative_path = path.file_name().map(PathBuf::from).unwrap_or_default();

    let nested = SourceItem {
        path: path.to_path_buf(),
        relative_path,
        extension: crate::core::formats::normalized_extension(path),
        size,
        origin: Origin::EmailAttachment {
            email: email_item.relative_path.clone(),
        },
    };

    dispatch.convert(nested).await
}

/// Scan the raw RFC 5322 header block for authentication results.
///
/// `Authentication-Results` carries the verdicts when present;
/// `Received-SPF` and `DKIM-Signature` alone only prove the mechanism was
/// in play, which maps to [`AuthState::Present`].
fn parse_auth_headers(bytes: &[u8]) -> EmailAuth {
    let text = String::from_utf8_lossy(bytes);
    let header_block = text
        .split_once("\r\n\r\n")
        .map(|(headers, _)| headers)
        .or_else(|| text.split_once("\n\n").map(|(headers, _)| headers))
        .unwrap_or(&text);

    let unfolded = unfold_headers(header_block);
    let auth_results = header_value(&unfolded, "authentication-results").map(|v| v.to_lowercase());
    let received_spf = header_value(&unfolded, "received-spf").map(|v| v.to_lowercase());
    let has_dkim_signature = header_value(&unfolded, "dkim-signature").is_some();

    let spf = auth_results
        .as_deref()
        .and_then(|results| verdict_after(results, "spf="))
        .or_else(|| {
            received_spf.as_deref().map(|value| {
                let first_word: String = value.chars().take_while(|c| c.is_ascii_alphanumeric()).collect();
                match first_word.as_str() {
                    "pass" => AuthState::Pass,
                    "fail" | "softfail" | "permerror" | "temperror" => AuthState::Fail,
                    _ => AuthState::Present,
                }
            })
        })
        .unwrap_or(AuthState::Absent);

    let dkim = auth_results
        .as_deref()
        .and_then(|results| verdict_after(results, "dkim="))
        .or(if has_dkim_signature { Some(AuthState::Present) } else { None })
        .unwrap_or(AuthState::Absent);

    let dmarc = auth_results
        .as_deref()
        .and_then(|results| verdict_after(results, "dmarc="))
        .unwrap_or(AuthState::Absent);

    EmailAuth { spf, dkim, dmarc }
}

/// Join folded continuation lines so multi-line headers scan as one value.
fn unfold_headers(block: &str) -> Vec<(String, String)> {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in block.lines() {
        if (line.starts_with(' ') || line.starts_with('\t'))
            && let Some((_, value)) = headers.last_mut()
        {
            value.push(' ');
            value.push_str(line.trim());
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_lowercase(), value.trim().to_string()));
        }
    }
    headers
}

fn header_value<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(header_name, _)| header_name == name)
        .map(|(_, value)| value.as_str())
}

fn verdict_after(text: &str, key: &str) -> Option<AuthState> {
    let index = text.find(key)?;
    let rest = &text[index + key.len()..];
    let word: String = rest.chars().take_while(|c| c.is_ascii_alphanumeric()).collect();
    let state = match word.as_str() {
        "pass" => AuthState::Pass,
        "fail" | "hardfail" | "softfail" | "permerror" | "temperror" => AuthState::Fail,
        _ => AuthState::Present,
    };
    Some(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::tools::ToolInventory;

    const SAMPLE_EMAIL: &str = "From: test@example.com\r\n\
To: recipient@example.com\r\n\
Subject: Test Email\r\n\
Date: Mon, 1 Jan 2025 12:00:00 +0000\r\n\
Message-ID: <test123@example.com>\r\n\
Authentication-Results: mx.example.com; spf=pass; dkim=pass; dmarc=fail\r\n\
Content-Type: multipart/mixed; boundary=\"boundary123\"\r\n\
\r\n\
--boundary123\r\n\
Content-Type: text/plain\r\n\
\r\n\
This is a test email body.\r\n\
--boundary123\r\n\
Content-Type: text/html\r\n\
\r\n\
<html><body><p>This is a <b>test</b> email body.</p></body></html>\r\n\
--boundary123\r\n\
Content-Type: text/plain; name=\"notes.txt\"\r\n\
Content-Disposition: attachment; filename=\"notes.txt\"\r\n\
\r\n\
attached notes\r\n\
--boundary123--\r\n";

    fn email_item(path: &Path) -> SourceItem {
        SourceItem {
            path: path.to_path_buf(),
            relative_path: PathBuf::from(path.file_name().unwrap()),
            extension: "eml".to_string(),
            size: std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
            origin: Origin::Filesystem,
        }
    }

    #[tokio::test]
    async fn test_parses_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.eml");
        std::fs::write(&path, SAMPLE_EMAIL).unwrap();

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let record = process_email(&dispatch, &email_item(&path)).await.unwrap();

        assert_eq!(record.from.as_deref(), Some("test@example.com"));
        assert_eq!(record.to, vec!["recipient@example.com"]);
        assert_eq!(record.subject.as_deref(), Some("Test Email"));
        assert_eq!(record.message_id.as_deref(), Some("test123@example.com"));
    }

    #[tokio::test]
    async fn test_html_body_converts_to_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.eml");
        std::fs::write(&path, SAMPLE_EMAIL).unwrap();

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let record = process_email(&dispatch, &email_item(&path)).await.unwrap();

        assert!(record.body.to_lowercase().contains("test"));
        assert!(record.body.contains("**test**"));
    }

    #[tokio::test]
    async fn test_auth_states_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.eml");
        std::fs::write(&path, SAMPLE_EMAIL).unwrap();

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let record = process_email(&dispatch, &email_item(&path)).await.unwrap();

        assert_eq!(record.auth.spf, AuthState::Pass);
        assert_eq!(record.auth.dkim, AuthState::Pass);
        assert_eq!(record.auth.dmarc, AuthState::Fail);
    }

    #[tokio::test]
    async fn test_mime_attachments_are_converted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.eml");
        std::fs::write(&path, SAMPLE_EMAIL).unwrap();

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let record = process_email(&dispatch, &email_item(&path)).await.unwrap();

        assert!(!record.folder_attachments);
        assert_eq!(record.attachments.len(), 1);
        assert_eq!(record.attachments[0].item.display_path(), "notes.txt");
        assert!(record.attachments[0].text.contains("attached notes"));
    }

    #[tokio::test]
    async fn test_attachments_folder_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.eml");
        std::fs::write(&path, SAMPLE_EMAIL).unwrap();

        let attachments_dir = dir.path().join("attachments");
        std::fs::create_dir(&attachments_dir).unwrap();
        std::fs::write(attachments_dir.join("document.txt"), "folder attachment content").unwrap();

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let record = process_email(&dispatch, &email_item(&path)).await.unwrap();

        assert!(record.folder_attachments);
        assert_eq!(record.attachments.len(), 1);
        assert_eq!(record.attachments[0].item.display_path(), "document.txt");
        assert!(record.attachments[0].text.contains("folder attachment content"));
    }

    #[tokio::test]
    async fn test_invalid_email_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.eml");
        std::fs::write(&path, "").unwrap();

        let dispatch = ConverterDispatch::new(ToolInventory::assume_all(), 10);
        let result = process_email(&dispatch, &email_item(&path)).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_auth_absent_without_headers() {
        let auth = parse_auth_headers(b"From: a@example.com\r\nSubject: x\r\n\r\nbody");
        assert_eq!(auth.spf, AuthState::Absent);
        assert_eq!(auth.dkim, AuthState::Absent);
        assert_eq!(auth.dmarc, AuthState::Absent);
    }

    #[test]
    fn test_auth_present_without_verdict() {
        let raw = b"From: a@example.com\r\nDKIM-Signature: v=1; a=rsa-sha256; d=example.com\r\nReceived-SPF: neutral (example.com)\r\n\r\nbody";
        let auth = parse_auth_headers(raw);
        assert_eq!(auth.spf, AuthState::Present);
        assert_eq!(auth.dkim, AuthState::Present);
        assert_eq!(auth.dmarc, AuthState::Absent);
    }

    #[test]
    fn test_folded_auth_header_unfolds() {
        let raw = b"Authentication-Results: mx.example.com;\r\n\tspf=fail;\r\n\tdkim=pass\r\n\r\nbody";
        let auth = parse_auth_headers(raw);
        assert_eq!(auth.spf, AuthState::Fail);
        assert_eq!(auth.dkim, AuthState::Pass);
    }

    #[test]
    fn test_sanitize_attachment_name_strips_directories() {
        assert_eq!(sanitize_attachment_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_attachment_name("report.pdf"), "report.pdf");
    }
}
