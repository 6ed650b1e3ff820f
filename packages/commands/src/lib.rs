//! # Redline Commands
//!
//! Tokenizer and parser for the edit command language an external agent
//! embeds in a document's markup.
//!
//! ```text
//! <!-- EDIT_COMMANDS_START -->
//! <!-- REPLACE_PARAGRAPH([p1-1],[Hello World]) -->
//! <!-- SPLIT_PARAGRAPH([p1-2],[14]) -->
//! <!-- EDIT_COMMANDS_END -->
//! ```
//!
//! Parsing never fails as a whole: [`parse`] returns every well-formed
//! [`Command`] plus one [`ParseError`] per malformed line.

pub mod command;
pub mod error;
pub mod id_generator;
pub mod parser;
pub mod tokenizer;

#[cfg(test)]
mod tests_comprehensive;

pub use command::{
    Command, CommandKind, CommandType, MergeDirection, ParagraphId, ParagraphIdError, Placement,
    TEMP_ID_PREFIX,
};
pub use error::{ParseError, ParseErrorKind};
pub use id_generator::{content_seed, IdGenerator};
pub use parser::{parse, parse_command, parse_with_area, CommandParser, ParseResult};
pub use tokenizer::{
    command_lines, extract_command_area, split_arguments, CommandArea, CommandLine, END_MARKER,
    START_MARKER,
};

#[cfg(feature = "pretty-errors")]
pub use error::format_errors;
