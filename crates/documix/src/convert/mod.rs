//! Converter dispatch.
//!
//! Routes each [`SourceItem`] to its format chain, degrades per-item
//! failures into recorded results, and recurses into archives and emails.
//! All conversions are sequential; every external invocation is bounded by
//! the configured timeout.

pub mod archive;
pub mod command;
pub mod doc;
pub mod docx;
pub mod email;
pub mod epub;
pub mod html;
pub mod pdf;
pub mod text;
pub mod tools;

use crate::core::formats::DocumentKind;
use crate::error::Result;
use crate::security;
use crate::types::{ConversionResult, SkipReason, SourceItem};
use self::tools::ToolInventory;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

/// RAII guard for a per-item temporary directory. The directory is removed
/// when the guard drops, success or failure.
pub(crate) struct ScopedTempDir {
    path: PathBuf,
}

impl ScopedTempDir {
    pub(crate) async fn create(label: &str) -> Result<Self> {
        let path = std::env::temp_dir().join(format!("documix_{label}_{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScopedTempDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "temp dir cleanup failed");
        }
    }
}

/// Format dispatch for one run.
pub struct ConverterDispatch {
    tools: ToolInventory,
    timeout_seconds: u64,
}

impl ConverterDispatch {
    pub fn new(tools: ToolInventory, timeout_seconds: u64) -> Self {
        Self { tools, timeout_seconds }
    }

    pub fn tools(&self) -> &ToolInventory {
        &self.tools
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.timeout_seconds
    }

    /// Convert one item, screening it first. Never fails: tool errors and
    /// security flags degrade into the returned result's status.
    ///
    /// Boxed because archives and emails re-enter the dispatch for their
    /// nested entries.
    pub fn convert<'a>(&'a self, item: SourceItem) -> Pin<Box<dyn Future<Output = ConversionResult> + Send + 'a>> {
        Box::pin(async move {
            if let Some(reason) = security::screen(&item) {
                tracing::warn!(path = %item.display_path(), %reason, "security screener flagged file");
                return ConversionResult::skipped(item, reason);
            }

            let kind = DocumentKind::from_extension(&item.extension);

            if let Some(tool) = self.tools.format_unavailable(kind) {
                tracing::warn!(path = %item.display_path(), tool = %tool, "no converter available, skipping");
                return ConversionResult::skipped(item, SkipReason::MissingTool { tool });
            }

            match kind {
                DocumentKind::Zip => archive::expand(self, item).await,
                DocumentKind::Email => email::convert_as_document(self, item).await,
                DocumentKind::Unsupported => ConversionResult::skipped(item, SkipReason::UnsupportedFormat),
                _ => self.convert_plain(item, kind).await,
            }
        })
    }

    async fn convert_plain(&self, item: SourceItem, kind: DocumentKind) -> ConversionResult {
        let timeout = self.timeout_seconds;
        let outcome: Result<(String, String)> = match kind {
            DocumentKind::Pdf => pdf::convert(&item.path, timeout)
                .await
                .map(|(text, method)| (text, method.to_string())),
            DocumentKind::Epub => epub::convert(&item.path, timeout)
                .await
                .map(|(text, method)| (text, method.to_string())),
            DocumentKind::Docx => docx::convert(&item.path, timeout)
                .await
                .map(|(text, method)| (text, method.to_string())),
            DocumentKind::Doc => doc::convert(&item.path, timeout).await,
            DocumentKind::PlainText | DocumentKind::Markdown => text::convert(&item.path)
                .await
                .map(|(text, method)| (text, method.to_string())),
            // Zip/Email/Unsupported handled by the caller.
            _ => unreachable!("non-document kind reached convert_plain"),
        };

        match outcome {
            Ok((text, method)) => {
                tracing::info!(path = %item.display_path(), method = %method, "converted");
                ConversionResult::ok(item, text, method)
            }
            Err(e) => {
                tracing::warn!(path = %item.display_path(), error = %e, "conversion failed");
                ConversionResult::error(item, e.to_string())
            }
        }
    }
}
