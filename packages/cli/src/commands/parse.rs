use super::{report_parse_errors, OutputFormat};
use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use clap::Args;
use colored::Colorize;
use redline_commands::parse_with_area;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Markup file holding the command area
    pub markup: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

pub fn parse(args: ParseArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let area = config.command_area();
    let source = fs::read_to_string(&args.markup)
        .with_context(|| format!("Cannot read {}", args.markup.display()))?;

    let parsed = parse_with_area(&source, &area);

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        if area.locate(&source).is_none() {
            println!(
                "{} No command area between {} and {}",
                "⚠️ ".yellow(),
                area.start_marker,
                area.end_marker
            );
            return Ok(());
        }

        println!("{}", args.markup.display());
        for command in &parsed.commands {
            let line = command
                .line_number
                .map(|n| format!("{n:>4}"))
                .unwrap_or_else(|| "   -".to_string());
            println!(
                "  {} {} {} {}",
                "✓".green(),
                line.dimmed(),
                command.id.dimmed(),
                command.raw
            );
        }
        println!();
        println!(
            "   {} command(s), {} error(s)",
            parsed.commands.len(),
            parsed.errors.len()
        );
    }

    report_parse_errors(&source, &args.markup.display().to_string(), &parsed.errors);

    if parsed.errors.is_empty() {
        Ok(())
    } else {
        Err(anyhow!(
            "{} command line(s) could not be parsed",
            parsed.errors.len()
        ))
    }
}
