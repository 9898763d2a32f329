//! Error types for DocuMix.
//!
//! All fallible operations return [`Result`], and the taxonomy follows the
//! run-degradation policy of the pipeline:
//!
//! - `Access` — a directory or file could not be read; the subtree is
//!   skipped and the run continues.
//! - `Conversion` — an external tool failed, timed out, or produced
//!   unusable output; recorded on the item, the run continues.
//! - `Security` — a suspicious file was detected; recorded as skipped.
//! - `Write` — the output document could not be written; fatal.
//! - `Validation` — bad setup input (missing source path, invalid
//!   configuration); fatal.
//!
//! System IO errors bubble up unchanged via `#[from]` so that real
//! filesystem problems surface with their original context.
use thiserror::Error;

/// Result type alias using [`DocumixError`].
pub type Result<T> = std::result::Result<T, DocumixError>;

/// Main error type for all DocuMix operations.
#[derive(Debug, Error)]
pub enum DocumixError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Access error: {message}")]
    Access {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Conversion error: {message}")]
    Conversion {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Parse error: {message}")]
    Parse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Security flag: {message}")]
    Security {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Write error: {message}")]
    Write {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("{tool} timed out after {seconds} seconds")]
    Timeout { tool: String, seconds: u64 },

    #[error("{0}")]
    Other(String),
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pub fn $name<S: Into<String>>(message: S) -> Self {
            Self::$variant {
                message: message.into(),
                source: None,
            }
        }
    };
    ($name:ident, $variant:ident, with_source $with:ident) => {
        error_constructor!($name, $variant);

        pub fn $with<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
            message: S,
            source: E,
        ) -> Self {
            Self::$variant {
                message: message.into(),
                source: Some(Box::new(source)),
            }
        }
    };
}

impl DocumixError {
    error_constructor!(access, Access, with_source access_with_source);
    error_constructor!(conversion, Conversion, with_source conversion_with_source);
    error_constructor!(parse, Parse, with_source parse_with_source);
    error_constructor!(security, Security);
    error_constructor!(validation, Validation);
    error_constructor!(write, Write, with_source write_with_source);

    /// True when the error is fatal to the whole run rather than to a
    /// single item.
    pub fn is_fatal(&self) -> bool {
        matches!(self, DocumixError::Validation { .. } | DocumixError::Write { .. })
    }
}
