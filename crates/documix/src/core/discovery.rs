//! File discovery.
//!
//! Walks the source tree (one level or fully recursive), applies the
//! extension allow-list and then the exclusion patterns, and produces a
//! sorted sequence of [`SourceItem`]s. Unreadable directories are logged
//! and skipped; they never abort the run.

use crate::core::config::CompileConfig;
use crate::core::formats::normalized_extension;
use crate::error::Result;
use crate::security;
use crate::types::{Origin, SourceItem};
use regex::Regex;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Outcome of walking the source tree.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Accepted items in sorted relative-path order.
    pub items: Vec<SourceItem>,
    /// Human-readable access failures (unreadable directories/files).
    pub access_errors: Vec<String>,
}

/// Compiled filter set for one run.
pub struct DiscoveryFilter {
    allowed: HashSet<String>,
    exclude: Vec<Regex>,
}

impl DiscoveryFilter {
    /// Build the filter from configuration. Invalid exclusion patterns are
    /// warned about and dropped, matching the CLI's lenient behavior.
    pub fn from_config(config: &CompileConfig) -> Self {
        let allowed: HashSet<String> = config.effective_extensions().into_iter().collect();

        let mut exclude = Vec::new();
        for pattern in &config.exclude_patterns {
            match Regex::new(pattern) {
                Ok(regex) => exclude.push(regex),
                Err(e) => tracing::warn!(pattern = %pattern, error = %e, "invalid exclusion pattern, ignoring"),
            }
        }

        Self { allowed, exclude }
    }

    /// Extension gate: allow-listed extensions plus double-extension
    /// candidates, which are kept so the security screener can report them.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        let ext = normalized_extension(path);
        self.allowed.contains(&ext) || security::is_double_extension_candidate(path, &self.allowed)
    }

    /// Exclusion gate, applied after the extension gate, against the path
    /// relative to the discovery root.
    pub fn excludes(&self, relative_path: &Path) -> bool {
        let text = relative_path.to_string_lossy();
        self.exclude.iter().any(|regex| regex.is_match(&text))
    }

    pub fn accepts(&self, path: &Path, relative_path: &Path) -> bool {
        self.accepts_extension(path) && !self.excludes(relative_path)
    }
}

/// Walk the configured source and collect items to convert.
///
/// A file source yields exactly that file (bypassing the extension gate so
/// `documix message.eml` always works). A directory source is walked one
/// level deep, or fully when `recursive` is set.
pub fn discover(config: &CompileConfig) -> Result<Discovery> {
    let source = &config.source;

    if source.is_file() {
        let mut discovery = Discovery::default();
        if let Some(item) = make_item(source, source.parent().unwrap_or(Path::new("")), &mut discovery) {
            discovery.items.push(item);
        }
        return Ok(discovery);
    }

    let filter = DiscoveryFilter::from_config(config);
    let mut discovery = Discovery::default();

    let max_depth = if config.recursive { usize::MAX } else { 1 };
    for entry in WalkDir::new(source).min_depth(1).max_depth(max_depth).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| source.display().to_string());
                tracing::warn!(path = %location, error = %e, "cannot read directory entry, skipping");
                discovery.access_errors.push(format!("{location}: {e}"));
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(source).unwrap_or(path);
        if !filter.accepts(path, relative) {
            continue;
        }

        if let Some(item) = make_item(path, source, &mut discovery) {
            discovery.items.push(item);
        }
    }

    discovery.items.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    Ok(discovery)
}

fn make_item(path: &Path, root: &Path, discovery: &mut Discovery) -> Option<SourceItem> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "cannot stat file, skipping");
            discovery.access_errors.push(format!("{}: {e}", path.display()));
            return None;
        }
    };

    let relative_path = path
        .strip_prefix(root)
        .map(PathBuf::from)
        .unwrap_or_else(|_| path.file_name().map(PathBuf::from).unwrap_or_default());

    Some(SourceItem {
        path: path.to_path_buf(),
        relative_path,
        extension: normalized_extension(path),
        size: metadata.len(),
        origin: Origin::Filesystem,
    })
}

/// Render the directory-structure block shown in the standard layout:
/// directories suffixed with `/`, accepted files indented beneath.
pub fn directory_structure(config: &CompileConfig) -> Vec<String> {
    let source = &config.source;
    if source.is_file() {
        let name = source.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        return vec![format!("  {name}")];
    }

    let filter = DiscoveryFilter::from_config(config);
    let mut lines = Vec::new();
    let max_depth = if config.recursive { usize::MAX } else { 1 };

    let walker = WalkDir::new(source)
        .min_depth(1)
        .max_depth(max_depth)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry.path()));

    for entry in walker.flatten() {
        let relative = entry.path().strip_prefix(source).unwrap_or(entry.path());
        if entry.file_type().is_dir() {
            lines.push(format!("{}/", relative.display()));
        } else if entry.file_type().is_file() && filter.accepts(entry.path(), relative) {
            lines.push(format!("  {}", relative.display()));
        }
    }

    lines
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}
