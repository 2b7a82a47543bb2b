//! qawHaq CLI
//!
//! Command-line interface for the lexicon build:
//! - Checking a data directory and reporting every finding in one batch
//! - Regenerating the E-K reverse-lookup index
//! - Writing single exports (SQL, JSON, E-K, tree) or all of them at once
//! - Trying the definition parser on one gloss

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use qawhaq_export::ExportKind;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;

use config::{BuildConfig, ConfigOverrides, ReportFormat};

#[derive(Parser)]
#[command(name = "qawhaq")]
#[command(author, version, about = "qawHaq: Klingon lexicon build and E-K index generator")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project config file (defaults to `qawhaq.toml`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Default)]
struct DataArgs {
    /// Lexicon data directory (entries/, notes/, examples/, sources.yaml).
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Source registry file, relative to the data directory.
    #[arg(long)]
    sources: Option<PathBuf>,
    /// Output directory, relative to the data directory.
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Version written into the exports (defaults to `<data_dir>/VERSION`).
    #[arg(long = "lexicon-version")]
    lexicon_version: Option<String>,
}

#[derive(Args, Clone, Default)]
struct ReportArgs {
    /// Report format: json|text
    #[arg(long, value_enum)]
    format: Option<ReportFormat>,
    /// Do not fail the process even if errors are found (always exit 0).
    #[arg(long)]
    no_fail: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportTarget {
    Sql,
    Json,
    EkJson,
    EkMarkdown,
    Tree,
}

impl From<ExportTarget> for ExportKind {
    fn from(target: ExportTarget) -> Self {
        match target {
            ExportTarget::Sql => ExportKind::Sql,
            ExportTarget::Json => ExportKind::Json,
            ExportTarget::EkJson => ExportKind::EkJson,
            ExportTarget::EkMarkdown => ExportKind::EkMarkdown,
            ExportTarget::Tree => ExportKind::Tree,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Load and validate the lexicon; print the build report.
    ///
    /// Exits non-zero when the report has errors (unknown sources, duplicate
    /// slugs, unreadable files) unless `--no-fail` is given.
    Check {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        report: ReportArgs,
        /// Output report path (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Regenerate the E-K index (`ek_index.json` + `ek_index.md`).
    Ek {
        #[command(flatten)]
        data: DataArgs,
        /// Print the records a word finds.
        #[arg(long)]
        lookup: Vec<String>,
    },

    /// Write one export.
    Export {
        #[command(flatten)]
        data: DataArgs,
        #[arg(long, value_enum)]
        kind: ExportTarget,
        /// Output path (defaults to stdout).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Write every export and the build report into the output directory.
    Build {
        #[command(flatten)]
        data: DataArgs,
        #[command(flatten)]
        report: ReportArgs,
    },

    /// Parse one gloss and print its parts, sort keys and E-K records.
    Permute {
        /// The English gloss, e.g. "be hostile, be malicious".
        gloss: String,
        /// Part of speech, e.g. `v:is`.
        #[arg(long, default_value = "v")]
        pos: String,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli_config: Option<&PathBuf>, data: &DataArgs, report: Option<&ReportArgs>) -> Result<BuildConfig> {
    let overrides = ConfigOverrides {
        data_dir: data.data_dir.clone(),
        sources_file: data.sources.clone(),
        out_dir: data.out_dir.clone(),
        version: data.lexicon_version.clone(),
        report_format: report.and_then(|r| r.format),
        fail_on_error: report.filter(|r| r.no_fail).map(|_| false),
    };
    BuildConfig::load(cli_config.map(PathBuf::as_path), &overrides)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Check { data, report, out } => {
            let config = resolve_config(cli.config.as_ref(), data, Some(report))?;
            commands::cmd_check(&config, out.as_deref())?;
        }
        Commands::Ek { data, lookup } => {
            let config = resolve_config(cli.config.as_ref(), data, None)?;
            commands::cmd_ek(&config, lookup)?;
        }
        Commands::Export { data, kind, out } => {
            let config = resolve_config(cli.config.as_ref(), data, None)?;
            commands::cmd_export(&config, (*kind).into(), out.as_deref())?;
        }
        Commands::Build { data, report } => {
            let config = resolve_config(cli.config.as_ref(), data, Some(report))?;
            commands::cmd_build(&config)?;
        }
        Commands::Permute { gloss, pos, json } => {
            commands::cmd_permute(gloss, pos, *json).context("permute failed")?;
        }
    }
    Ok(())
}

/// `ok` / `warn` / `error` tag for a one-line status on stderr.
fn status_tag(errors: usize, warnings: usize) -> colored::ColoredString {
    if errors > 0 {
        "error".red().bold()
    } else if warnings > 0 {
        "warn".yellow().bold()
    } else {
        "ok".green().bold()
    }
}
