//! Aggregated document rendering.
//!
//! The aggregator collects per-file results in discovery order and renders
//! one of two layouts, chosen once per run:
//!
//! - **Email layout** — exactly one top-level email and nothing else.
//! - **Standard layout** — everything else, including the forced
//!   `--standard-format` case and the empty run.

pub mod email_layout;
pub mod report;
pub mod standard;

use crate::core::config::CompileConfig;
use crate::types::{CompiledItem, OutputLayout};

/// Apply the layout decision rule.
pub fn select_layout(items: &[CompiledItem], force_standard: bool) -> OutputLayout {
    if force_standard {
        return OutputLayout::Standard;
    }

    let emails = items.iter().filter(|i| matches!(i, CompiledItem::Email(_))).count();
    let documents = items.len() - emails;

    if emails == 1 && documents == 0 {
        OutputLayout::Email
    } else {
        OutputLayout::Standard
    }
}

/// Render the aggregated document for the selected layout.
pub fn render(layout: OutputLayout, items: &[CompiledItem], config: &CompileConfig, structure: &[String]) -> String {
    match layout {
        OutputLayout::Email => {
            let record = items.iter().find_map(|item| match item {
                CompiledItem::Email(record) => Some(record),
                _ => None,
            });
            match record {
                Some(record) => email_layout::render_email_report(record),
                // Unreachable by the decision rule, but degrade sanely.
                None => standard::render(items, config, structure),
            }
        }
        OutputLayout::Standard => standard::render(items, config, structure),
    }
}
