//! Security screening for discovered files and archive entries.
//!
//! Three checks gate the converter dispatch:
//!
//! 1. Double extensions — an executable suffix stacked on a document
//!    suffix (`invoice.pdf.exe`).
//! 2. Executable magic bytes under a binary document extension — a PE/ELF/
//!    Mach-O payload renamed to `.pdf` and similar disguises.
//! 3. Archive entry traversal — entry paths that resolve outside the
//!    extraction root.
//!
//! Script files additionally run through a content heuristic: anything over
//! 1 MiB, or whose first 4 KiB matches an exec/eval/system pattern, is
//! flagged. A flagged item is recorded as skipped with a `suspicious`
//! reason; it is reported but never converted.

use crate::core::formats::DocumentKind;
use crate::types::{SkipReason, SourceItem};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::io::Read;
use std::path::{Component, Path};

/// Executable-ish extensions that make a trailing suffix suspicious.
pub const EXECUTABLE_EXTENSIONS: &[&str] = &["exe", "bat", "com", "scr", "vbs", "ps1", "sh", "cmd", "msi"];

/// Script extensions subject to the content heuristic.
const SCRIPT_EXTENSIONS: &[&str] = &["py", "rb", "js", "sh"];

/// Size above which a script file is flagged without inspecting content.
const SCRIPT_SIZE_LIMIT: u64 = 1024 * 1024;

/// How much of a file the content heuristics read.
const SNIFF_LEN: usize = 4096;

static EXEC_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(exec|eval|system|subprocess|os\.)").expect("static regex"));

/// MIME types `infer` reports for native executables.
static EXECUTABLE_MIMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut set = HashSet::new();
    set.insert("application/vnd.microsoft.portable-executable");
    set.insert("application/x-executable");
    set.insert("application/x-mach-binary");
    set.insert("application/x-msdownload");
    set
});

/// True when `path` stacks an executable suffix on an allow-listed document
/// suffix, e.g. `invoice.pdf.exe` with `pdf` in the allow-list.
pub fn is_double_extension_candidate(path: &Path, allowed_extensions: &HashSet<String>) -> bool {
    let Some(outer) = path.extension().map(|e| e.to_string_lossy().to_lowercase()) else {
        return false;
    };
    if !EXECUTABLE_EXTENSIONS.contains(&outer.as_str()) {
        return false;
    }
    let Some(stem) = path.file_stem() else {
        return false;
    };
    let inner = Path::new(stem)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    !inner.is_empty() && allowed_extensions.contains(&inner)
}

/// True when an archive entry path stays inside its extraction root: no
/// absolute paths, no drive prefixes, no `..` components.
pub fn is_safe_archive_path(entry_name: &str) -> bool {
    let path = Path::new(entry_name);
    if path.is_absolute() {
        return false;
    }
    for component in path.components() {
        match component {
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
            Component::Normal(_) | Component::CurDir => {}
        }
    }
    true
}

/// Screen one discovered item. Returns the skip reason when the item must
/// not reach the converter dispatch.
pub fn screen(item: &SourceItem) -> Option<SkipReason> {
    let path = &item.path;

    // Cheap name-level check first: the extension stack alone condemns a
    // file, no content read needed.
    if EXECUTABLE_EXTENSIONS.contains(&item.extension.as_str()) {
        let inner = path
            .file_stem()
            .map(|stem| {
                Path::new(stem)
                    .extension()
                    .map(|e| e.to_string_lossy().to_lowercase())
                    .unwrap_or_default()
            })
            .unwrap_or_default();
        if !inner.is_empty() && DocumentKind::from_extension(&inner) != DocumentKind::Unsupported {
            return Some(SkipReason::Suspicious {
                detail: format!("executable disguised as .{inner} document"),
            });
        }
        return Some(SkipReason::Suspicious {
            detail: format!("executable file type .{}", item.extension),
        });
    }

    let kind = DocumentKind::from_extension(&item.extension);

    if kind.is_binary_format()
        && let Some(detail) = executable_magic(path)
    {
        return Some(SkipReason::Suspicious { detail });
    }

    if SCRIPT_EXTENSIONS.contains(&item.extension.as_str()) {
        if item.size > SCRIPT_SIZE_LIMIT {
            return Some(SkipReason::Suspicious {
                detail: format!("script file larger than {} bytes", SCRIPT_SIZE_LIMIT),
            });
        }
        if let Some(detail) = suspicious_script_content(path) {
            return Some(SkipReason::Suspicious { detail });
        }
    }

    None
}

/// Detect executable magic bytes in a file claiming to be a document.
fn executable_magic(path: &Path) -> Option<String> {
    let header = read_prefix(path, 512)?;
    if header.starts_with(b"#!") {
        return Some("shebang header under a document extension".to_string());
    }
    let detected = infer::get(&header)?;
    if EXECUTABLE_MIMES.contains(detected.mime_type()) {
        return Some(format!("executable content ({})", detected.mime_type()));
    }
    None
}

/// Content heuristic for script files: exec/eval/system patterns in the
/// first 4 KiB.
fn suspicious_script_content(path: &Path) -> Option<String> {
    let prefix = read_prefix(path, SNIFF_LEN)?;
    let text = String::from_utf8_lossy(&prefix);
    if EXEC_PATTERN.is_match(&text) {
        Some("script contains exec/eval/system calls".to_string())
    } else {
        None
    }
}

fn read_prefix(path: &Path, len: usize) -> Option<Vec<u8>> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut buf = vec![0u8; len];
    let read = file.read(&mut buf).ok()?;
    buf.truncate(read);
    if buf.is_empty() { None } else { Some(buf) }
}
