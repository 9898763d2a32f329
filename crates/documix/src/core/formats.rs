//! Extension classification.
//!
//! Maps normalized file extensions to conversion handlers. Unknown
//! extensions classify as [`DocumentKind::Unsupported`] explicitly rather
//! than falling through to a text reader.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::path::Path;

/// Handler identifier for one document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Pdf,
    Epub,
    Docx,
    Doc,
    PlainText,
    Markdown,
    Zip,
    Email,
    Unsupported,
}

impl DocumentKind {
    /// Classify a normalized (lowercase, dotless) extension.
    pub fn from_extension(extension: &str) -> Self {
        match extension {
            "pdf" => DocumentKind::Pdf,
            "epub" => DocumentKind::Epub,
            "docx" => DocumentKind::Docx,
            "doc" => DocumentKind::Doc,
            "md" | "markdown" => DocumentKind::Markdown,
            "zip" => DocumentKind::Zip,
            "eml" => DocumentKind::Email,
            ext if FENCE_LANGUAGES.contains_key(ext) || ext == "txt" => DocumentKind::PlainText,
            _ => DocumentKind::Unsupported,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        Self::from_extension(&normalized_extension(path))
    }

    /// Formats whose on-disk representation is binary. Used by the
    /// security screener: executable magic bytes under one of these
    /// extensions are a disguise signal, while a text format could
    /// legitimately start with arbitrary bytes only in corrupt files.
    pub fn is_binary_format(&self) -> bool {
        matches!(
            self,
            DocumentKind::Pdf | DocumentKind::Epub | DocumentKind::Docx | DocumentKind::Doc | DocumentKind::Zip
        )
    }
}

/// Lowercase extension without the leading dot; empty string when absent.
pub fn normalized_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Default include set when the user passes no `--extensions` filter.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    "pdf", "epub", "docx", "doc", "txt", "md", "py", "rb", "js", "html", "css", "json", "yml", "yaml", "zip", "eml",
];

/// Fenced-code language tags for text-ish extensions, used when rendering
/// file contents into the aggregated document.
static FENCE_LANGUAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();

    m.insert("py", "python");
    m.insert("rb", "ruby");
    m.insert("js", "javascript");
    m.insert("ts", "typescript");
    m.insert("html", "html");
    m.insert("css", "css");
    m.insert("json", "json");
    m.insert("yml", "yaml");
    m.insert("yaml", "yaml");
    m.insert("toml", "toml");
    m.insert("sh", "bash");
    m.insert("java", "java");
    m.insert("c", "c");
    m.insert("h", "c");
    m.insert("cpp", "cpp");
    m.insert("php", "php");
    m.insert("sql", "sql");
    m.insert("xml", "xml");
    m.insert("go", "go");
    m.insert("rs", "rust");
    m.insert("swift", "swift");
    m.insert("kt", "kotlin");
    m.insert("csv", "csv");
    m.insert("log", "text");

    m
});

/// Language tag for a file's code fence, or empty when none applies.
pub fn fence_language(path: &Path) -> &'static str {
    let ext = normalized_extension(path);
    match ext.as_str() {
        "md" | "markdown" => "markdown",
        "txt" => "text",
        other => FENCE_LANGUAGES.get(other).copied().unwrap_or(""),
    }
}
