//! Subcommand bodies.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use qawhaq_definition::{generate_ek_records, parse_definition, sort_key, PosContext};
use qawhaq_export::{build_ek_index, render, write_exports, write_file, ExportKind};
use qawhaq_lexicon::{build_lexicon, load_store, BuildReport, LexiconBuild, PartOfSpeech};
use qawhaq_sources::SourceRegistry;
use tracing::{debug, warn};

use crate::config::{BuildConfig, ReportFormat};
use crate::status_tag;

pub const REPORT_FILE: &str = "build_report.json";

/// Registry, store, build: the shared front half of every data command.
pub fn load_build(config: &BuildConfig) -> Result<LexiconBuild> {
    let sources_path = config.sources_path();
    let registry = SourceRegistry::load(&sources_path)
        .with_context(|| format!("failed to load source registry `{}`", sources_path.display()))?;
    debug!(sources = registry.len(), "loaded source registry");

    let store = load_store(&config.data_dir)
        .with_context(|| format!("failed to load lexicon data from `{}`", config.data_dir.display()))?;
    Ok(build_lexicon(&store, &registry))
}

fn render_report(report: &BuildReport, format: ReportFormat) -> Result<String> {
    Ok(match format {
        ReportFormat::Json => report.to_json()?,
        ReportFormat::Text => report.render_text(),
    })
}

/// Level headings in color; the rest of the text as is.
fn colorize_report(text: &str) -> String {
    text.lines()
        .map(|line| match line {
            "error" => line.red().bold().to_string(),
            "warning" => line.yellow().bold().to_string(),
            "info" => line.blue().bold().to_string(),
            "build report" | "excluded" => line.bold().to_string(),
            _ => line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn print_summary(build: &LexiconBuild) {
    let summary = &build.report.summary;
    eprintln!(
        "{} {} entries, {} E-K records, {} error(s), {} warning(s)",
        status_tag(summary.error_count, summary.warning_count),
        build.entries.len(),
        build.ek_records().count(),
        summary.error_count,
        summary.warning_count,
    );
}

fn fail_on_errors(report: &BuildReport, config: &BuildConfig) -> Result<()> {
    if report.has_errors() && config.fail_on_error {
        return Err(anyhow!("lexicon build found {} error(s)", report.summary.error_count));
    }
    Ok(())
}

pub fn cmd_check(config: &BuildConfig, out: Option<&Path>) -> Result<()> {
    let build = load_build(config)?;
    let rendered = render_report(&build.report, config.report_format)?;

    match out {
        Some(path) => {
            write_file(path, &rendered)?;
            println!("wrote {}", path.display());
        }
        None if config.report_format == ReportFormat::Text => {
            println!("{}", colorize_report(&rendered));
        }
        None => {
            println!("{rendered}");
        }
    }

    print_summary(&build);
    fail_on_errors(&build.report, config)
}

pub fn cmd_ek(config: &BuildConfig, lookup: &[String]) -> Result<()> {
    let build = load_build(config)?;
    let out_dir = config.out_path();
    let written = write_exports(
        &build,
        &config.export_options(),
        &out_dir,
        &[ExportKind::EkJson, ExportKind::EkMarkdown],
    )?;
    for path in &written {
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }

    if !lookup.is_empty() {
        let index = build_ek_index(&build);
        for word in lookup {
            let lines = index.lookup(word);
            if lines.is_empty() {
                println!("{word}: (no records)");
                continue;
            }
            println!("{word}:");
            for line in lines {
                println!("  {} -> {} ({})", line.display, line.klingon, line.pos_label());
            }
        }
    }

    print_summary(&build);
    Ok(())
}

pub fn cmd_export(config: &BuildConfig, kind: ExportKind, out: Option<&Path>) -> Result<()> {
    let build = load_build(config)?;
    let rendered = render(kind, &build, &config.export_options())?;

    match out {
        Some(path) => {
            write_file(path, &rendered)?;
            eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
        }
        None => print!("{rendered}"),
    }

    if build.report.has_errors() {
        warn!(
            errors = build.report.summary.error_count,
            "export written from a build with errors; run `qawhaq check` for details"
        );
    }
    Ok(())
}

pub fn cmd_build(config: &BuildConfig) -> Result<()> {
    let build = load_build(config)?;
    let out_dir = config.out_path();
    let mut written = write_exports(&build, &config.export_options(), &out_dir, &ExportKind::ALL)?;

    let report_path = out_dir.join(REPORT_FILE);
    write_file(&report_path, &format!("{}\n", build.report.to_json()?))?;
    written.push(report_path);

    for path in &written {
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }

    let rendered = render_report(&build.report, config.report_format)?;
    match config.report_format {
        ReportFormat::Text => println!("{}", colorize_report(&rendered)),
        ReportFormat::Json => println!("{rendered}"),
    }

    print_summary(&build);
    fail_on_errors(&build.report, config)
}

pub fn cmd_permute(gloss: &str, pos: &str, json: bool) -> Result<()> {
    let pos = PartOfSpeech::parse(pos);
    let ctx = PosContext::new(&pos.pos, pos.subtype.as_deref());
    let outcome = parse_definition(gloss, ctx);
    for flag in &outcome.flags {
        eprintln!("{} {}: {}", "review".yellow().bold(), flag.reason.describe(), flag.text);
    }

    let ek = generate_ek_records(&outcome.definition, ctx, "-");
    let parts: Vec<_> = outcome
        .definition
        .parts
        .iter()
        .map(|part| (part.text.as_str(), sort_key(part, ctx)))
        .collect();

    if json {
        let value = serde_json::json!({
            "pos": pos.label(),
            "display": outcome.definition.flatten(),
            "global_parenthetical": outcome.definition.global_parenthetical,
            "no_permute": outcome.definition.no_permute,
            "dedup": outcome.definition.dedup,
            "parts": parts
                .iter()
                .map(|(text, key)| serde_json::json!({ "text": text, "sort_key": key }))
                .collect::<Vec<_>>(),
            "records": ek.records,
            "collisions": ek.collisions,
            "flags": outcome.flags,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("{} ({})", outcome.definition.flatten().bold(), pos.label());
    if let Some(paren) = &outcome.definition.global_parenthetical {
        println!("  global: ({paren})");
    }
    println!("parts");
    for (text, key) in &parts {
        println!("  - {text}  [key: {key}]");
    }
    println!("records");
    if ek.records.is_empty() {
        println!("  (none)");
    }
    for record in &ek.records {
        println!("  {}: {}", record.sort_key, record.display);
    }
    for collision in &ek.collisions {
        println!("  {} {}: {} (same as {})", "dropped".dimmed(), collision.sort_key, collision.display, collision.kept);
    }
    Ok(())
}
