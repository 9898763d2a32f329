//! Startup probing of external converter tools.
//!
//! Each format's conversion chain names the binaries it depends on. The
//! inventory probes them once per run; a format whose entire chain is
//! unavailable degrades to "skip with warning" instead of failing the run
//! or erroring on every file.

use crate::core::formats::DocumentKind;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;

/// External binaries DocuMix may invoke, with the argument used to probe
/// them cheaply.
pub const KNOWN_TOOLS: &[(&str, &str)] = &[
    ("pdftotext", "-v"),
    ("ebook-convert", "--version"),
    ("pandoc", "--version"),
    ("soffice", "--version"),
    ("antiword", "-h"),
    ("catdoc", "-V"),
];

/// Availability of external tools, probed once at startup.
#[derive(Debug, Clone, Default)]
pub struct ToolInventory {
    available: HashMap<&'static str, bool>,
}

impl ToolInventory {
    /// Probe every known tool. A tool counts as available when its binary
    /// can be spawned at all; exit codes are ignored because several tools
    /// (antiword, pdftotext) exit non-zero on version/usage queries.
    pub async fn probe() -> Self {
        let mut available = HashMap::new();
        for (tool, probe_arg) in KNOWN_TOOLS {
            let found = Command::new(tool)
                .arg(probe_arg)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await
                .is_ok();
            if !found {
                tracing::warn!(tool = %tool, "converter not found; formats depending on it degrade to skip");
            }
            available.insert(*tool, found);
        }
        Self { available }
    }

    /// An inventory that reports every tool as present. Used by tests that
    /// exercise dispatch plumbing without shelling out.
    pub fn assume_all() -> Self {
        let available = KNOWN_TOOLS.iter().map(|(tool, _)| (*tool, true)).collect();
        Self { available }
    }

    pub fn has(&self, tool: &str) -> bool {
        self.available.get(tool).copied().unwrap_or(false)
    }

    /// Binaries participating in a format's conversion chain. Formats with
    /// an in-process path (DOCX via docx-lite, text, zip, email) never
    /// fully degrade, so they report no required tools.
    pub fn chain_for(kind: DocumentKind) -> &'static [&'static str] {
        match kind {
            DocumentKind::Pdf => &["pdftotext"],
            DocumentKind::Epub => &["ebook-convert", "pandoc"],
            DocumentKind::Doc => &["soffice", "antiword", "catdoc"],
            DocumentKind::Docx => &[],
            _ => &[],
        }
    }

    /// True when no tool in the format's chain is available, meaning items
    /// of this format are skipped with a warning.
    pub fn format_unavailable(&self, kind: DocumentKind) -> Option<String> {
        let chain = Self::chain_for(kind);
        if chain.is_empty() || chain.iter().any(|tool| self.has(tool)) {
            None
        } else {
            Some(chain.join("/"))
        }
    }
}
