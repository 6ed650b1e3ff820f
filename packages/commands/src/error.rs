//! Error types for the command parser

use crate::command::CommandType;
use serde::Serialize;
use std::ops::Range;
use thiserror::Error;

/// What went wrong with a single command
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "camelCase")]
pub enum ParseErrorKind {
    #[error("unknown command type '{0}'")]
    UnknownCommand(String),

    #[error("expected '(' after {0}")]
    MissingOpenParen(CommandType),

    #[error("expected ')' at end of {0}")]
    MissingCloseParen(CommandType),

    #[error("{command} expects {expected} argument(s), found {found}")]
    ArgumentCount {
        command: CommandType,
        expected: usize,
        found: usize,
    },

    #[error("malformed paragraph id '{0}'")]
    MalformedParagraphId(String),

    #[error("invalid position '{0}': expected 'before' or 'after'")]
    InvalidPosition(String),

    #[error("invalid direction '{0}': expected 'prev' or 'next'")]
    InvalidDirection(String),

    #[error("invalid split offset '{0}': expected a non-negative integer")]
    InvalidOffset(String),

    #[error("unterminated '[' at column {0}")]
    UnterminatedBracket(usize),
}

/// Diagnostic for one command line. Never thrown; collected by [`crate::parse`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,

    pub raw_command: String,

    #[serde(skip)]
    pub span: Option<Range<usize>>,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, raw_command: impl Into<String>) -> Self {
        Self {
            kind,
            line_number: None,
            raw_command: raw_command.into(),
            span: None,
        }
    }

    pub fn at_line(mut self, line_number: usize, span: Range<usize>) -> Self {
        self.line_number = Some(line_number);
        self.span = Some(span);
        self
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }
}

/// Pretty-print errors with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_errors(source: &str, filename: &str, errors: &[ParseError]) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let mut output = Vec::new();
    // ariadne positions are character offsets, spans are byte offsets
    let to_char = |byte: usize| {
        source
            .get(..byte.min(source.len()))
            .map_or_else(|| source.chars().count(), |prefix| prefix.chars().count())
    };

    for error in errors {
        let span = error
            .span
            .clone()
            .map(|span| to_char(span.start)..to_char(span.end))
            .unwrap_or_else(|| {
                let end = source.chars().count();
                end..end
            });

        let report = Report::build(ReportKind::Error, filename, span.start)
            .with_message(error.message())
            .with_label(
                Label::new((filename, span))
                    .with_color(Color::Red)
                    .with_message(match &error.kind {
                        ParseErrorKind::ArgumentCount { expected, .. } => {
                            format!("expected {} bracketed argument(s)", expected)
                        }
                        ParseErrorKind::UnknownCommand(_) => "unrecognized verb".to_string(),
                        other => other.to_string(),
                    }),
            )
            .finish();

        if report
            .write((filename, Source::from(source)), &mut output)
            .is_err()
        {
            break;
        }
    }

    String::from_utf8(output).unwrap_or_else(|_| "Error formatting failed".to_string())
}
