use super::OutputFormat;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use redline_commands::ParagraphId;
use redline_editor::{BlockTree, Document};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Document JSON file to check
    pub document: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckReport {
    pages: usize,
    blocks: usize,

    /// Ids carried by more than one block; commands reach only the first
    duplicate_ids: Vec<String>,

    /// Document-order positions of blocks no command can address
    unaddressable: Vec<usize>,
}

impl CheckReport {
    fn of(document: &Document) -> Self {
        let unaddressable = document
            .blocks()
            .enumerate()
            .filter(|(_, (_, block))| {
                block
                    .display_id()
                    .map_or(true, |id| id.parse::<ParagraphId>().is_err())
            })
            .map(|(ordinal, _)| ordinal)
            .collect();

        Self {
            pages: document.page_count(),
            blocks: document.block_count(),
            duplicate_ids: document.duplicate_ids(),
            unaddressable,
        }
    }

    fn issues(&self) -> usize {
        self.duplicate_ids.len() + self.unaddressable.len()
    }
}

pub fn check(args: CheckArgs, _cwd: &str) -> Result<()> {
    // loading already enforces a non-empty first page
    let document = Document::load(&args.document)
        .with_context(|| format!("Invalid document {}", args.document.display()))?;
    let report = CheckReport::of(&document);

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("🔍 {} {}", "Checking".green().bold(), args.document.display());
        println!("   {} pages, {} blocks", report.pages, report.blocks);

        for id in &report.duplicate_ids {
            println!(
                "   {} duplicate id {} (only the first occurrence is addressable)",
                "warning".yellow().bold(),
                id
            );
        }
        for ordinal in &report.unaddressable {
            println!(
                "   {} block {} has no valid paragraph id",
                "warning".yellow().bold(),
                ordinal
            );
        }
        if report.issues() == 0 {
            println!("   {} No issues found!", "✓".green());
        }
    }

    if report.issues() == 0 {
        Ok(())
    } else {
        Err(anyhow!("{} issue(s) found", report.issues()))
    }
}
