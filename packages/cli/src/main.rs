mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{apply, check, parse, ApplyArgs, CheckArgs, ParseArgs};

/// Redline CLI - apply embedded paragraph edit commands behind a review step
#[derive(Parser, Debug)]
#[command(name = "redline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse the command area of a markup file
    Parse(ParseArgs),

    /// Run a markup file's commands against a document and review the result
    Apply(ApplyArgs),

    /// Check a document for duplicate or unaddressable paragraph ids
    Check(CheckArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?.display().to_string();

    match cli.command {
        Command::Parse(args) => parse(args, &cwd),
        Command::Apply(args) => apply(args, &cwd),
        Command::Check(args) => check(args, &cwd),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
