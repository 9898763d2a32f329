//! Compilation configuration.
//!
//! [`CompileConfig`] carries every knob for a run. It can be built from CLI
//! arguments, loaded from a `documix.toml` discovered in the source
//! directory hierarchy, or assembled programmatically. Console styling is an
//! explicit [`ConsoleOptions`] value handed to the reporter; there is no
//! process-wide mutable state.

use crate::error::{DocumixError, Result};
use crate::core::formats::DEFAULT_EXTENSIONS;
use serde::{Deserialize, Serialize};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Default per-tool timeout for external converters, in seconds.
pub const DEFAULT_TOOL_TIMEOUT_SECONDS: u64 = 120;

/// Configuration file name looked up next to (and above) the source path.
pub const CONFIG_FILE_NAME: &str = "documix.toml";

/// Console styling passed into the reporter.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConsoleOptions {
    /// Emit ANSI color codes.
    #[serde(default = "default_true")]
    pub color: bool,
    /// Emit emoji markers in the summary.
    #[serde(default = "default_true")]
    pub emoji: bool,
}

impl Default for ConsoleOptions {
    fn default() -> Self {
        Self { color: true, emoji: true }
    }
}

impl ConsoleOptions {
    /// Detect sensible defaults: color only when stdout is a terminal.
    pub fn detect() -> Self {
        let tty = std::io::stdout().is_terminal();
        Self { color: tty, emoji: true }
    }
}

/// All options for one compilation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileConfig {
    /// Source file or directory to compile.
    pub source: PathBuf,

    /// Output Markdown path.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Recurse into subdirectories.
    #[serde(default)]
    pub recursive: bool,

    /// Extension allow-list, normalized lowercase without dots. Empty means
    /// the built-in default set.
    #[serde(default)]
    pub include_extensions: Vec<String>,

    /// Exclusion patterns (regular expressions matched against the path
    /// relative to the source root). Invalid patterns are warned about and
    /// ignored at discovery time.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Force the standard layout even for a lone email.
    #[serde(default)]
    pub standard_format: bool,

    /// Timeout applied to each external converter invocation.
    #[serde(default = "default_timeout")]
    pub tool_timeout_seconds: u64,

    #[serde(default)]
    pub console: ConsoleOptions,
}

impl CompileConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            output: default_output(),
            recursive: false,
            include_extensions: Vec::new(),
            exclude_patterns: Vec::new(),
            standard_format: false,
            tool_timeout_seconds: DEFAULT_TOOL_TIMEOUT_SECONDS,
            console: ConsoleOptions::default(),
        }
    }

    /// The effective extension allow-list, falling back to the default set.
    pub fn effective_extensions(&self) -> Vec<String> {
        if self.include_extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
        } else {
            self.include_extensions.clone()
        }
    }

    /// Normalize a user-provided comma-separated extension list:
    /// `"PDF, .docx"` becomes `["pdf", "docx"]`.
    pub fn parse_extension_list(csv: &str) -> Vec<String> {
        csv.split(',')
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect()
    }

    /// Split a comma-separated exclusion pattern list, keeping patterns raw.
    pub fn parse_exclude_list(csv: &str) -> Vec<String> {
        csv.split(',')
            .map(|pattern| pattern.trim().to_string())
            .filter(|pattern| !pattern.is_empty())
            .collect()
    }

    /// Load a configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| DocumixError::parse_with_source(format!("invalid config file {}", path.display()), e))
    }

    /// Search for a `documix.toml` starting at `start` and walking up the
    /// directory hierarchy. Returns the first match, if any.
    pub fn find_config_file(start: &Path) -> Option<PathBuf> {
        let mut dir = if start.is_dir() { start } else { start.parent()? };
        loop {
            let candidate = dir.join(CONFIG_FILE_NAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            dir = dir.parent()?;
        }
    }

    /// Validate setup-fatal conditions: the source must exist, and the
    /// output's parent directory must exist.
    pub fn validate(&self) -> Result<()> {
        if !self.source.exists() {
            return Err(DocumixError::validation(format!(
                "source path does not exist: {}",
                self.source.display()
            )));
        }
        if let Some(parent) = self.output.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(DocumixError::write(format!(
                "output directory does not exist: {}",
                parent.display()
            )));
        }
        Ok(())
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("documix-output.md")
}

fn default_timeout() -> u64 {
    DEFAULT_TOOL_TIMEOUT_SECONDS
}

fn default_true() -> bool {
    true
}
