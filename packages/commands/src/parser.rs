use crate::command::{Command, CommandKind, CommandType, MergeDirection, ParagraphId, Placement};
use crate::error::{ParseError, ParseErrorKind};
use crate::id_generator::IdGenerator;
use crate::tokenizer::{command_lines, split_arguments, CommandArea, CommandLine};
use serde::Serialize;

/// Every command and diagnostic found in one piece of markup, in line order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParseResult {
    pub commands: Vec<Command>,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.errors.is_empty()
    }
}

/// Parser for command strings.
///
/// Pure: it never looks at a document tree. Every input yields exactly one
/// [`Command`] or one [`ParseError`].
#[derive(Debug, Clone)]
pub struct CommandParser {
    id_generator: IdGenerator,
}

impl Default for CommandParser {
    fn default() -> Self {
        Self::new(IdGenerator::new("cmd"))
    }
}

impl CommandParser {
    pub fn new(id_generator: IdGenerator) -> Self {
        Self { id_generator }
    }

    /// Parse one command string such as `DELETE_PARAGRAPH([p1-2])`
    pub fn parse_command(&mut self, raw: &str) -> Result<Command, ParseError> {
        let kind = parse_kind(raw).map_err(|kind| ParseError::new(kind, raw))?;

        Ok(Command {
            id: self.id_generator.new_id(),
            kind,
            raw: raw.to_string(),
            line_number: None,
            span: None,
        })
    }

    /// Parse a command line found by the tokenizer, keeping its position
    pub fn parse_line(&mut self, line: &CommandLine<'_>) -> Result<Command, ParseError> {
        match self.parse_command(line.text) {
            Ok(mut command) => {
                command.line_number = Some(line.line_number);
                command.span = Some(line.span.clone());
                Ok(command)
            }
            Err(err) => Err(err.at_line(line.line_number, line.span.clone())),
        }
    }

    /// Parse every command line in the command area of `markup`
    pub fn parse_markup(&mut self, markup: &str, area: &CommandArea) -> ParseResult {
        let mut result = ParseResult::default();

        for line in command_lines(markup, area) {
            match self.parse_line(&line) {
                Ok(command) => result.commands.push(command),
                Err(err) => result.errors.push(err),
            }
        }

        result
    }
}

/// Parse a single command string with a fresh id sequence
pub fn parse_command(raw: &str) -> Result<Command, ParseError> {
    CommandParser::default().parse_command(raw)
}

/// Parse the command area of `markup` using the default markers
pub fn parse(markup: &str) -> ParseResult {
    parse_with_area(markup, &CommandArea::default())
}

/// Parse the command area delimited by `area`.
///
/// Command ids are seeded from a checksum of the markup so that two parses
/// of the same document hand out the same ids.
pub fn parse_with_area(markup: &str, area: &CommandArea) -> ParseResult {
    let mut parser = CommandParser::new(IdGenerator::from_content("cmd", markup));
    parser.parse_markup(markup, area)
}

fn parse_kind(raw: &str) -> Result<CommandKind, ParseErrorKind> {
    let text = raw.trim();
    let (head, rest) = match text.split_once('(') {
        Some((head, rest)) => (head, Some(rest)),
        None => (text, None),
    };

    let verb = head.trim();
    let command = verb
        .parse::<CommandType>()
        .map_err(|_| ParseErrorKind::UnknownCommand(verb.to_string()))?;

    let rest = rest.ok_or(ParseErrorKind::MissingOpenParen(command))?;
    let body = rest
        .trim_end()
        .strip_suffix(')')
        .ok_or(ParseErrorKind::MissingCloseParen(command))?;

    let args = split_arguments(body).map_err(|err| {
        // column of the bracket within the trimmed command text
        ParseErrorKind::UnterminatedBracket(head.len() + 1 + err.offset + 1)
    })?;

    if args.len() != command.arity() {
        return Err(ParseErrorKind::ArgumentCount {
            command,
            expected: command.arity(),
            found: args.len(),
        });
    }

    let kind = match command {
        CommandType::ReplaceParagraph => CommandKind::ReplaceParagraph {
            target: paragraph_id(args[0])?,
            content: args[1].to_string(),
        },
        CommandType::InsertParagraph => CommandKind::InsertParagraph {
            anchor: paragraph_id(args[0])?,
            position: placement(args[1])?,
            content: args[2].to_string(),
        },
        CommandType::DeleteParagraph => CommandKind::DeleteParagraph {
            target: paragraph_id(args[0])?,
        },
        CommandType::MoveParagraph => CommandKind::MoveParagraph {
            target: paragraph_id(args[0])?,
            anchor: paragraph_id(args[1])?,
            position: placement(args[2])?,
        },
        CommandType::SplitParagraph => CommandKind::SplitParagraph {
            target: paragraph_id(args[0])?,
            offset: split_offset(args[1])?,
        },
        CommandType::MergeParagraph => CommandKind::MergeParagraph {
            target: paragraph_id(args[0])?,
            direction: direction(args[1])?,
        },
    };

    Ok(kind)
}

fn paragraph_id(arg: &str) -> Result<ParagraphId, ParseErrorKind> {
    arg.trim()
        .parse()
        .map_err(|_| ParseErrorKind::MalformedParagraphId(arg.trim().to_string()))
}

fn placement(arg: &str) -> Result<Placement, ParseErrorKind> {
    arg.trim()
        .parse()
        .map_err(|_| ParseErrorKind::InvalidPosition(arg.trim().to_string()))
}

fn direction(arg: &str) -> Result<MergeDirection, ParseErrorKind> {
    arg.trim()
        .parse()
        .map_err(|_| ParseErrorKind::InvalidDirection(arg.trim().to_string()))
}

fn split_offset(arg: &str) -> Result<usize, ParseErrorKind> {
    let value = arg.trim();
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidOffset(value.to_string()));
    }
    value
        .parse()
        .map_err(|_| ParseErrorKind::InvalidOffset(value.to_string()))
}
