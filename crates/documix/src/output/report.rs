//! Console reporting.
//!
//! Prints the end-of-run summary: top files by size, the security verdict,
//! and aggregate counts. Styling goes through the explicit
//! [`ConsoleOptions`] value; nothing here touches global state, and color
//! is plain ANSI that callers can switch off for non-terminal output.

use crate::core::config::ConsoleOptions;
use crate::types::RunSummary;
use std::io::Write;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";

/// Small styling helper bound to one [`ConsoleOptions`].
struct Style {
    options: ConsoleOptions,
}

impl Style {
    fn paint(&self, code: &str, text: &str) -> String {
        if self.options.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn marker(&self, emoji: &str, fallback: &str) -> String {
        if self.options.emoji {
            emoji.to_string()
        } else {
            fallback.to_string()
        }
    }
}

/// Banner printed before processing starts.
pub fn print_banner(version: &str, options: ConsoleOptions, writer: &mut impl Write) -> std::io::Result<()> {
    let style = Style { options };
    writeln!(
        writer,
        "{} DocuMix v{version}",
        style.marker("📦", "::")
    )
}

/// Print the colored end-of-run summary.
pub fn print_summary(
    summary: &RunSummary,
    output_path: &std::path::Path,
    options: ConsoleOptions,
    writer: &mut impl Write,
) -> std::io::Result<()> {
    let style = Style { options };

    writeln!(writer)?;
    writeln!(
        writer,
        "{}",
        style.paint(GREEN, &format!("{} Packing completed successfully!", style.marker("✔", "ok:")))
    )?;

    let top = summary.top_files(5);
    if !top.is_empty() {
        writeln!(writer)?;
        writeln!(
            writer,
            "{} Top {} Files by Character Count and Token Count:",
            style.marker("📈", "--"),
            top.len()
        )?;
        writeln!(writer, "──────────────────────────────────────────────────")?;
        for (rank, stat) in top.iter().enumerate() {
            writeln!(
                writer,
                "{}. {} ({} chars, {} tokens, via {})",
                rank + 1,
                stat.path,
                stat.chars,
                stat.tokens,
                stat.method
            )?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "{} Security Check:", style.marker("🔎", "--"))?;
    writeln!(writer, "─────────────────────")?;
    if summary.flagged.is_empty() {
        writeln!(
            writer,
            "{}",
            style.paint(GREEN, &format!("{} No suspicious files detected.", style.marker("✔", "ok:")))
        )?;
    } else {
        writeln!(
            writer,
            "{}",
            style.paint(RED, &format!("{} Suspicious files detected:", style.marker("❌", "!!")))
        )?;
        for path in &summary.flagged {
            writeln!(writer, "  - {path}")?;
        }
    }

    writeln!(writer)?;
    writeln!(writer, "{} Pack Summary:", style.marker("📊", "--"))?;
    writeln!(writer, "─────────────────────")?;
    writeln!(writer, "  Total Files: {} files", summary.total_files)?;
    writeln!(writer, "           Ok: {}", summary.ok)?;
    writeln!(writer, "      Skipped: {}", summary.skipped)?;
    if summary.errors > 0 {
        writeln!(
            writer,
            "       Errors: {}",
            style.paint(YELLOW, &summary.errors.to_string())
        )?;
    } else {
        writeln!(writer, "       Errors: 0")?;
    }
    writeln!(writer, "  Total Chars: {} chars", summary.total_chars)?;
    writeln!(writer, " Total Tokens: {} tokens", summary.total_tokens)?;
    writeln!(writer, "       Output: {}", style.paint(BOLD, &output_path.display().to_string()))?;
    writeln!(writer, "         Time: {:.2} seconds", summary.elapsed_seconds)?;

    Ok(())
}
