//! Compilation orchestration.
//!
//! [`DocumentCompiler`] drives one run end to end: discovery, security
//! screening, conversion dispatch, aggregation, layout selection, and the
//! final write. Processing is strictly sequential; per-item failures
//! degrade into recorded results and only setup or output-write failures
//! abort the run.

use crate::convert::email;
use crate::convert::tools::ToolInventory;
use crate::convert::ConverterDispatch;
use crate::core::config::CompileConfig;
use crate::core::discovery;
use crate::core::formats::DocumentKind;
use crate::error::{DocumixError, Result};
use crate::output;
use crate::security;
use crate::types::{CompiledItem, ConversionResult, Origin, OutputLayout, RunSummary};
use std::path::PathBuf;
use std::time::Instant;

/// Everything a finished run produced, for the reporter and for tests.
#[derive(Debug)]
pub struct CompileReport {
    pub summary: RunSummary,
    pub layout: OutputLayout,
    pub output_path: PathBuf,
    /// The rendered Markdown document.
    pub document: String,
}

/// One-shot compiler for a configured source tree.
#[derive(Debug)]
pub struct DocumentCompiler {
    config: CompileConfig,
}

impl DocumentCompiler {
    /// Validate setup-fatal conditions and build the compiler.
    pub fn new(config: CompileConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Run discovery, screening, conversion, and rendering. Does not write
    /// the output file; see [`DocumentCompiler::write_output`].
    pub async fn compile(&self) -> Result<CompileReport> {
        let started = Instant::now();

        let tools = ToolInventory::probe().await;
        let dispatch = ConverterDispatch::new(tools, self.config.tool_timeout_seconds);

        let discovered = discovery::discover(&self.config)?;
        tracing::info!(count = discovered.items.len(), "discovered files");

        let mut summary = RunSummary::default();
        let mut items: Vec<CompiledItem> = Vec::new();

        for item in discovered.items {
            tracing::info!(path = %item.display_path(), "processing");

            let kind = DocumentKind::from_extension(&item.extension);
            let is_top_level_email = kind == DocumentKind::Email && item.origin == Origin::Filesystem;

            if is_top_level_email {
                if let Some(reason) = security::screen(&item) {
                    let result = ConversionResult::skipped(item, reason);
                    summary.record_document(&result);
                    items.push(CompiledItem::Document(result));
                    continue;
                }
                match email::process_email(&dispatch, &item).await {
                    Ok(record) => {
                        summary.record_email(&record);
                        items.push(CompiledItem::Email(record));
                    }
                    Err(e) => {
                        tracing::warn!(path = %item.display_path(), error = %e, "email processing failed");
                        let result = ConversionResult::error(item, e.to_string());
                        summary.record_document(&result);
                        items.push(CompiledItem::Document(result));
                    }
                }
            } else {
                let result = dispatch.convert(item).await;
                summary.record_document(&result);
                items.push(CompiledItem::Document(result));
            }
        }

        let layout = output::select_layout(&items, self.config.standard_format);
        let structure = discovery::directory_structure(&self.config);
        let document = output::render(layout, &items, &self.config, &structure);

        summary.elapsed_seconds = started.elapsed().as_secs_f64();

        Ok(CompileReport {
            summary,
            layout,
            output_path: self.config.output.clone(),
            document,
        })
    }

    /// Write the rendered document. An unwritable path is fatal.
    pub fn write_output(&self, report: &CompileReport) -> Result<()> {
        std::fs::write(&report.output_path, &report.document).map_err(|e| {
            DocumixError::write_with_source(
                format!("cannot write output file {}", report.output_path.display()),
                e,
            )
        })
    }

    /// Convenience wrapper: compile and write in one call.
    pub async fn run(&self) -> Result<CompileReport> {
        let report = self.compile().await?;
        self.write_output(&report)?;
        Ok(report)
    }
}
