//! Command-area extraction and argument scanning.
//!
//! The command area is the text strictly between two sentinel comments.
//! Inside it, every line that is itself a single-line comment of the form
//! `<!-- VERB(...) -->` is a command line; everything else (blank lines,
//! placeholder and instructional text) is dropped.

use crate::command::CommandType;
use logos::Logos;
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const START_MARKER: &str = "<!-- EDIT_COMMANDS_START -->";
pub const END_MARKER: &str = "<!-- EDIT_COMMANDS_END -->";

/// The pair of sentinel comments delimiting the command area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandArea {
    pub start_marker: String,
    pub end_marker: String,
}

impl Default for CommandArea {
    fn default() -> Self {
        Self::new(START_MARKER, END_MARKER)
    }
}

impl CommandArea {
    pub fn new(start_marker: impl Into<String>, end_marker: impl Into<String>) -> Self {
        Self {
            start_marker: start_marker.into(),
            end_marker: end_marker.into(),
        }
    }

    /// Byte range of the text between the markers.
    ///
    /// `None` when either marker is missing or the start marker does not end
    /// before the end marker begins.
    pub fn locate(&self, markup: &str) -> Option<Range<usize>> {
        if self.start_marker.is_empty() || self.end_marker.is_empty() {
            return None;
        }

        let start = markup.find(&self.start_marker)?;
        let end = markup.find(&self.end_marker)?;
        let inner_start = start + self.start_marker.len();

        if start >= end || inner_start > end {
            return None;
        }

        Some(inner_start..end)
    }

    pub fn extract<'src>(&self, markup: &'src str) -> Option<&'src str> {
        self.locate(markup).map(|range| &markup[range])
    }
}

/// Extract the command area using the default markers
pub fn extract_command_area(markup: &str) -> Option<&str> {
    CommandArea::default().extract(markup)
}

/// One comment-wrapped command found in the command area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'src> {
    /// Comment body, trimmed (e.g. `DELETE_PARAGRAPH([p1-2])`)
    pub text: &'src str,

    /// 1-based line number within the whole markup
    pub line_number: usize,

    /// Byte range of `text` within the whole markup
    pub span: Range<usize>,
}

/// Collect the command lines of `markup`. Empty when there is no command area.
pub fn command_lines<'src>(markup: &'src str, area: &CommandArea) -> Vec<CommandLine<'src>> {
    let Some(range) = area.locate(markup) else {
        tracing::trace!("no command area found");
        return Vec::new();
    };

    let first_line = markup[..range.start].matches('\n').count() + 1;
    let mut lines = Vec::new();
    let mut offset = range.start;

    for (i, segment) in markup[range.clone()].split('\n').enumerate() {
        let segment_start = offset;
        offset += segment.len() + 1;

        let line = segment.strip_suffix('\r').unwrap_or(segment);
        match comment_body(line) {
            Some((body_offset, body)) if starts_with_verb(body) => {
                let start = segment_start + body_offset;
                lines.push(CommandLine {
                    text: body,
                    line_number: first_line + i,
                    span: start..start + body.len(),
                });
            }
            _ => {
                if !line.trim().is_empty() {
                    tracing::trace!(line = first_line + i, "dropping non-command line");
                }
            }
        }
    }

    lines
}

/// Trimmed body of a line that is exactly one `<!-- ... -->` comment,
/// with the body's byte offset inside `line`.
fn comment_body(line: &str) -> Option<(usize, &str)> {
    let leading = line.len() - line.trim_start().len();
    let inner = line
        .trim()
        .strip_prefix("<!--")?
        .strip_suffix("-->")?;

    if inner.contains("-->") {
        return None;
    }

    let body_leading = inner.len() - inner.trim_start().len();
    let body = inner.trim();
    if body.is_empty() {
        return None;
    }

    Some((leading + "<!--".len() + body_leading, body))
}

fn starts_with_verb(body: &str) -> bool {
    CommandType::ALL.iter().any(|ty| {
        body.strip_prefix(ty.verb())
            .map_or(false, |rest| rest.trim_start().starts_with('('))
    })
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum ArgToken {
    #[token("[")]
    Open,

    #[token("]")]
    Close,

    #[regex(r"[^\[\]]+")]
    Text,
}

/// A `[` with no matching `]` before the end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnterminatedBracket {
    /// Byte offset of the opening bracket
    pub offset: usize,
}

/// Split a command's argument list into its top-level `[...]` spans.
///
/// Brackets nested inside a span are kept verbatim as part of that argument.
/// Text between spans (commas, whitespace) is ignored, as is a stray `]`
/// outside any span.
pub fn split_arguments(input: &str) -> Result<Vec<&str>, UnterminatedBracket> {
    let mut lexer = ArgToken::lexer(input);
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut open_at = 0usize;

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        match token {
            Ok(ArgToken::Open) => {
                if depth == 0 {
                    open_at = span.start;
                }
                depth += 1;
            }
            Ok(ArgToken::Close) => match depth {
                0 => {}
                1 => {
                    args.push(&input[open_at + 1..span.start]);
                    depth = 0;
                }
                _ => depth -= 1,
            },
            Ok(ArgToken::Text) | Err(()) => {}
        }
    }

    if depth > 0 {
        return Err(UnterminatedBracket { offset: open_at });
    }

    Ok(args)
}
