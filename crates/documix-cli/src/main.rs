//! DocuMix command-line interface.

use anyhow::Context;
use clap::Parser;
use documix::{CompileConfig, ConsoleOptions, DocumentCompiler, DocumixError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Compiles documents from a folder into a single Markdown file.
#[derive(Parser, Debug)]
#[command(
    name = "documix",
    about = "Compiles documents from a folder into a single Markdown file, similar to Repomix.",
    disable_version_flag = true
)]
struct Cli {
    /// Path to the folder (or single file) with documents.
    folder: Option<PathBuf>,

    /// Path to the output file.
    #[arg(short, long, default_value = "documix-output.md")]
    output: PathBuf,

    /// Search folders recursively.
    #[arg(short, long)]
    recursive: bool,

    /// List of file extensions to process (comma-separated).
    #[arg(short, long)]
    extensions: Option<String>,

    /// File exclusion patterns (regular expressions, comma-separated).
    #[arg(short = 'x', long)]
    exclude: Option<String>,

    /// Force the standard layout even for a lone email.
    #[arg(long)]
    standard_format: bool,

    /// Display program version.
    #[arg(short = 'v', long = "version")]
    version: bool,
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli, source: PathBuf) -> CompileConfig {
    // A documix.toml next to (or above) the source provides defaults; CLI
    // flags win.
    let mut config = CompileConfig::find_config_file(&source)
        .and_then(|path| match CompileConfig::from_toml_file(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "loaded configuration file");
                Some(config)
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable configuration file");
                None
            }
        })
        .unwrap_or_else(|| CompileConfig::new(&source));

    config.source = source;
    config.output = cli.output.clone();
    config.recursive |= cli.recursive;
    config.standard_format |= cli.standard_format;
    config.console = ConsoleOptions::detect();

    if let Some(extensions) = &cli.extensions {
        config.include_extensions = CompileConfig::parse_extension_list(extensions);
    }
    if let Some(exclude) = &cli.exclude {
        config.exclude_patterns = CompileConfig::parse_exclude_list(exclude);
    }

    config
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let version = env!("CARGO_PKG_VERSION");

    if cli.version {
        println!("DocuMix v{version}");
        return Ok(ExitCode::SUCCESS);
    }

    let Some(source) = cli.folder.clone() else {
        anyhow::bail!("no source folder given; see --help");
    };

    let config = build_config(&cli, source);
    let console = config.console;

    let mut stdout = std::io::stdout();
    documix::print_banner(version, console, &mut stdout)?;

    let compiler = DocumentCompiler::new(config).context("invalid setup")?;
    let report = compiler.compile().await?;

    let write_result = compiler.write_output(&report);

    // The summary reports what was gathered even when the final write
    // failed, so a partial run is never silent.
    documix::print_summary(&report.summary, &report.output_path, console, &mut stdout)?;

    match write_result {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("fatal: {e}");
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // Setup failures (missing source, unwritable output) are fatal.
            if let Some(documix_error) = e.downcast_ref::<DocumixError>() {
                eprintln!("fatal: {documix_error}");
            } else {
                eprintln!("fatal: {e:#}");
            }
            ExitCode::FAILURE
        }
    }
}
