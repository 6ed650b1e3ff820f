pub mod apply;
pub mod check;
pub mod parse;

pub use apply::{apply, ApplyArgs};
pub use check::{check, CheckArgs};
pub use parse::{parse, ParseArgs};

use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Print parse diagnostics to stderr with source context
pub(crate) fn report_parse_errors(
    source: &str,
    filename: &str,
    errors: &[redline_commands::ParseError],
) {
    if errors.is_empty() {
        return;
    }
    eprint!("{}", redline_commands::format_errors(source, filename, errors));
}
