use super::{report_parse_errors, OutputFormat};
use crate::config::Config;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use redline_commands::{parse_with_area, ParseError};
use redline_editor::{
    BatchOutcome, BlockTree, Document, ExecutionResult, ReviewOutcome, ReviewSession,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Document JSON file to edit
    pub document: PathBuf,

    /// Markup file holding the command area
    pub markup: PathBuf,

    /// Approve the edit and write the document (otherwise it is rejected)
    #[arg(long)]
    pub approve: bool,

    /// Write the approved document here instead of over the input
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Keep paragraph ids as they are after approval
    #[arg(long)]
    pub no_renumber: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApplyReport<'a> {
    parse_errors: &'a [ParseError],
    #[serde(flatten)]
    batch: &'a BatchOutcome,
    outcome: Option<ReviewOutcome>,
    written: Option<&'a Path>,
}

pub fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let document = Document::load(&args.document)
        .with_context(|| format!("Cannot load document {}", args.document.display()))?;
    let source = fs::read_to_string(&args.markup)
        .with_context(|| format!("Cannot read {}", args.markup.display()))?;

    let parsed = parse_with_area(&source, &config.command_area());
    report_parse_errors(&source, &args.markup.display().to_string(), &parsed.errors);

    let mut session = ReviewSession::new(document);
    let batch = session.run_batch(&parsed.commands);

    if args.format == OutputFormat::Text {
        print_results(&batch.results);
        print_document(session.tree());
    }

    let mut written = None;
    if !session.is_pending() {
        if args.format == OutputFormat::Text {
            println!("{}", "Nothing to review, document unchanged".yellow());
        }
    } else if args.approve {
        let renumber = config.renumber_on_approve && !args.no_renumber;
        let target = args.out.clone().unwrap_or_else(|| args.document.clone());

        let document = session.approve()?;
        if renumber {
            document.renumber();
        }
        document
            .save_to(&target)
            .with_context(|| format!("Cannot write {}", target.display()))?;
        written = Some(target);
    } else {
        session.reject()?;
    }

    match args.format {
        OutputFormat::Json => {
            let report = ApplyReport {
                parse_errors: &parsed.errors,
                batch: &batch,
                outcome: session.last_outcome(),
                written: written.as_deref(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => match (session.last_outcome(), &written) {
            (Some(ReviewOutcome::Approved), Some(path)) => {
                println!("✨ {} written to {}", "Approved".green().bold(), path.display());
            }
            (Some(ReviewOutcome::Reverted), _) => {
                println!(
                    "↩️  {} document unchanged (pass --approve to write)",
                    "Rejected".yellow().bold()
                );
            }
            _ => {}
        },
    }

    Ok(())
}

fn print_results(results: &[ExecutionResult]) {
    for result in results {
        if result.success() {
            println!(
                "  {} {} {}",
                "✓".green(),
                result.command_id().dimmed(),
                result.affected_paragraph_ids().join(", ")
            );
        } else {
            let message = result.error().map(|e| e.message.as_str()).unwrap_or("");
            println!(
                "  {} {} {} - {}",
                "✗".red(),
                result.command_id().dimmed(),
                result.raw_command(),
                message.red()
            );
        }
    }
    println!();
}

fn print_document(document: &Document) {
    for page in document.pages() {
        println!("{}", format!("── page {} ──", page.number).dimmed());
        for block in &page.blocks {
            let id = block.display_id().unwrap_or("?");
            if block.is_marked() {
                println!("  {} {}", id.yellow().bold(), block.text.on_yellow().black());
            } else {
                println!("  {} {}", id.dimmed(), block.text);
            }
        }
    }
    println!("   {} blocks", document.block_count());
    println!();
}
