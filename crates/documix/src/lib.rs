//! DocuMix - Document Aggregation for AI Consumption
//!
//! DocuMix walks a directory tree, converts heterogeneous document formats
//! (PDF, EPUB, DOCX, DOC, TXT, MD, ZIP, EML) into Markdown using external
//! converter programs and in-process fallbacks, and concatenates the
//! results into one output file with statistics and light security
//! screening.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use documix::{CompileConfig, DocumentCompiler};
//!
//! # async fn example() -> documix::Result<()> {
//! let config = CompileConfig::new("./documents");
//! let compiler = DocumentCompiler::new(config)?;
//! let report = compiler.run().await?;
//! println!("wrote {}", report.output_path.display());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core** (`core`): configuration, file discovery, extension
//!   classification, and run orchestration
//! - **Security** (`security`): suspicious-file screening and archive
//!   traversal defense
//! - **Convert** (`convert`): per-format conversion chains around external
//!   tools (pdftotext, pandoc, ebook-convert, LibreOffice, antiword,
//!   catdoc) with in-process fallbacks
//! - **Output** (`output`): layout selection, Markdown rendering, console
//!   reporting

#![deny(unsafe_code)]

pub mod convert;
pub mod core;
pub mod error;
pub mod output;
pub mod security;
pub mod text;
pub mod types;

pub use error::{DocumixError, Result};
pub use types::*;

pub use crate::core::compiler::{CompileReport, DocumentCompiler};
pub use crate::core::config::{CompileConfig, ConsoleOptions};
pub use crate::core::formats::{DEFAULT_EXTENSIONS, DocumentKind};

pub use output::report::{print_banner, print_summary};
