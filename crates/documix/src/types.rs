//! Core data model for the compilation pipeline.
//!
//! A run discovers [`SourceItem`]s, converts each into exactly one
//! [`ConversionResult`] (or an [`EmailRecord`] for top-level emails), and
//! accumulates everything into a [`RunSummary`]. Per-item failures never
//! abort the run; they degrade into `Error`/`Skipped` statuses that stay
//! visible in the rendered document and the console report.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a discovered file came from.
///
/// Nested items keep a reference to their container so reports can trace a
/// ZIP entry or an email attachment back to the file that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Origin {
    Filesystem,
    ZipEntry { archive: PathBuf },
    EmailAttachment { email: PathBuf },
}

impl Origin {
    pub fn is_nested(&self) -> bool {
        !matches!(self, Origin::Filesystem)
    }
}

/// One discovered file pending conversion. Immutable once discovered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceItem {
    /// Absolute path on disk (possibly inside a temporary extraction root).
    pub path: PathBuf,
    /// Path relative to the discovery root (or to the container for nested
    /// items); used for display and exclusion matching.
    pub relative_path: PathBuf,
    /// Normalized extension: lowercase, without the leading dot.
    pub extension: String,
    /// Size in bytes at discovery time.
    pub size: u64,
    pub origin: Origin,
}

impl SourceItem {
    pub fn display_path(&self) -> String {
        self.relative_path.display().to_string()
    }
}

/// Why an item was skipped instead of converted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// Flagged by the security screener.
    Suspicious { detail: String },
    /// No handler for this extension.
    UnsupportedFormat,
    /// Every tool in the format's conversion chain is unavailable.
    MissingTool { tool: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Suspicious { detail } => write!(f, "suspicious: {detail}"),
            SkipReason::UnsupportedFormat => write!(f, "unsupported format"),
            SkipReason::MissingTool { tool } => write!(f, "converter unavailable: {tool}"),
        }
    }
}

/// Outcome status of one conversion attempt chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConversionStatus {
    Ok,
    Skipped { reason: SkipReason },
    Error { detail: String },
}

impl ConversionStatus {
    pub fn is_ok(&self) -> bool {
        matches!(self, ConversionStatus::Ok)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ConversionStatus::Skipped { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ConversionStatus::Error { .. })
    }
}

/// Outcome of attempting to extract text from a [`SourceItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    pub item: SourceItem,
    /// Extracted Markdown/plain text; empty for skipped and failed items.
    pub text: String,
    pub status: ConversionStatus,
    /// Conversion method chain actually used, e.g. `pdftotext` or
    /// `soffice+pandoc`.
    pub method: String,
    pub token_estimate: usize,
}

impl ConversionResult {
    pub fn ok(item: SourceItem, text: String, method: impl Into<String>) -> Self {
        let token_estimate = crate::text::estimate_tokens(&text);
        Self {
            item,
            text,
            status: ConversionStatus::Ok,
            method: method.into(),
            token_estimate,
        }
    }

    pub fn skipped(item: SourceItem, reason: SkipReason) -> Self {
        Self {
            item,
            text: String::new(),
            status: ConversionStatus::Skipped { reason },
            method: "none".to_string(),
            token_estimate: 0,
        }
    }

    pub fn error(item: SourceItem, detail: impl Into<String>) -> Self {
        Self {
            item,
            text: String::new(),
            status: ConversionStatus::Error { detail: detail.into() },
            method: "failed".to_string(),
            token_estimate: 0,
        }
    }
}

/// Result of an email authentication check parsed from message headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthState {
    Pass,
    Fail,
    /// The mechanism's header is present but carries no verdict.
    Present,
    Absent,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthState::Pass => "pass",
            AuthState::Fail => "fail",
            AuthState::Present => "present",
            AuthState::Absent => "absent",
        };
        f.write_str(s)
    }
}

/// SPF/DKIM/DMARC verdicts for one message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAuth {
    pub spf: AuthState,
    pub dkim: AuthState,
    pub dmarc: AuthState,
}

impl Default for EmailAuth {
    fn default() -> Self {
        Self {
            spf: AuthState::Absent,
            dkim: AuthState::Absent,
            dmarc: AuthState::Absent,
        }
    }
}

/// Parsed representation of a single `.eml` file and its attachments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRecord {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub from: Option<String>,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: Option<String>,
    pub date: Option<String>,
    pub message_id: Option<String>,
    pub auth: EmailAuth,
    /// Body as Markdown (HTML part converted, or the plain-text part).
    pub body: String,
    /// True when attachments came from a sibling `attachments/` directory
    /// rather than the MIME structure.
    pub folder_attachments: bool,
    /// Attachment conversion results, in resolution order.
    pub attachments: Vec<ConversionResult>,
}

/// One aggregated pipeline entry, in discovery order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CompiledItem {
    Document(ConversionResult),
    Email(EmailRecord),
}

impl CompiledItem {
    pub fn display_path(&self) -> String {
        match self {
            CompiledItem::Document(result) => result.item.display_path(),
            CompiledItem::Email(record) => record.relative_path.display().to_string(),
        }
    }
}

/// Which document layout a run rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputLayout {
    Standard,
    Email,
}

/// Per-file statistics line for the console report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStat {
    pub path: String,
    pub chars: usize,
    pub tokens: usize,
    pub method: String,
}

/// Aggregate statistics for one run. Built incrementally, read once at the
/// end of the program.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_files: usize,
    pub ok: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total_chars: usize,
    pub total_tokens: usize,
    /// Relative paths of files the security screener flagged.
    pub flagged: Vec<String>,
    pub file_stats: Vec<FileStat>,
    pub elapsed_seconds: f64,
}

impl RunSummary {
    pub fn record_document(&mut self, result: &ConversionResult) {
        self.total_files += 1;
        match &result.status {
            ConversionStatus::Ok => {
                self.ok += 1;
                self.total_chars += result.text.len();
                self.total_tokens += result.token_estimate;
                self.file_stats.push(FileStat {
                    path: result.item.display_path(),
                    chars: result.text.len(),
                    tokens: result.token_estimate,
                    method: result.method.clone(),
                });
            }
            ConversionStatus::Skipped { reason } => {
                self.skipped += 1;
                if let SkipReason::Suspicious { .. } = reason {
                    self.flagged.push(result.item.display_path());
                }
            }
            ConversionStatus::Error { .. } => {
                self.errors += 1;
            }
        }
    }

    pub fn record_email(&mut self, record: &EmailRecord) {
        self.total_files += 1;
        self.ok += 1;
        self.total_chars += record.body.len();
        self.total_tokens += crate::text::estimate_tokens(&record.body);
        self.file_stats.push(FileStat {
            path: record.relative_path.display().to_string(),
            chars: record.body.len(),
            tokens: crate::text::estimate_tokens(&record.body),
            method: "email".to_string(),
        });
        for attachment in &record.attachments {
            self.record_document(attachment);
        }
    }

    /// Top `n` successfully converted files by character count.
    pub fn top_files(&self, n: usize) -> Vec<&FileStat> {
        let mut stats: Vec<&FileStat> = self.file_stats.iter().collect();
        stats.sort_by(|a, b| b.chars.cmp(&a.chars));
        stats.truncate(n);
        stats
    }
}
