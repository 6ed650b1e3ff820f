//! Command types produced by the parser.
//!
//! A [`Command`] is always fully populated: the parser either builds every
//! field of a verb or reports a [`ParseError`](crate::ParseError) instead.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use thiserror::Error;

/// Prefix of temporary, client-only paragraph ids
pub const TEMP_ID_PREFIX: &str = "tmp-";

/// Address of one block in the document tree
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ParagraphId {
    /// `p<page>-<index>`, both 1-based
    Persisted { page: u32, index: u32 },

    /// `tmp-...`, assigned to blocks created before the document was saved
    Temporary(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed paragraph id '{0}'")]
pub struct ParagraphIdError(pub String);

impl ParagraphId {
    pub fn persisted(page: u32, index: u32) -> Self {
        ParagraphId::Persisted { page, index }
    }

    /// Page number when this id names the first block of a page
    pub fn first_of_page(&self) -> Option<u32> {
        match self {
            ParagraphId::Persisted { page, index: 1 } => Some(*page),
            _ => None,
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, ParagraphId::Temporary(_))
    }
}

impl FromStr for ParagraphId {
    type Err = ParagraphIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParagraphIdError(s.to_string());

        if let Some(rest) = s.strip_prefix(TEMP_ID_PREFIX) {
            let valid = !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
            return if valid {
                Ok(ParagraphId::Temporary(s.to_string()))
            } else {
                Err(malformed())
            };
        }

        let rest = s.strip_prefix('p').ok_or_else(malformed)?;
        let (page, index) = rest.split_once('-').ok_or_else(malformed)?;
        let number = |part: &str| -> Result<u32, ParagraphIdError> {
            // no leading zeros: `p01-1` must not reach the block `p1-1`
            if part.is_empty()
                || part.starts_with('0')
                || !part.chars().all(|c| c.is_ascii_digit())
            {
                return Err(malformed());
            }
            match part.parse::<u32>() {
                Ok(n) if n >= 1 => Ok(n),
                _ => Err(malformed()),
            }
        };

        Ok(ParagraphId::Persisted {
            page: number(page)?,
            index: number(index)?,
        })
    }
}

impl fmt::Display for ParagraphId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParagraphId::Persisted { page, index } => write!(f, "p{}-{}", page, index),
            ParagraphId::Temporary(id) => f.write_str(id),
        }
    }
}

impl From<ParagraphId> for String {
    fn from(id: ParagraphId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for ParagraphId {
    type Error = ParagraphIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Where a block goes relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Before,
    After,
}

impl FromStr for Placement {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "before" => Ok(Placement::Before),
            "after" => Ok(Placement::After),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Placement::Before => "before",
            Placement::After => "after",
        })
    }
}

/// Which neighbor a merge absorbs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeDirection {
    Prev,
    Next,
}

impl FromStr for MergeDirection {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "prev" => Ok(MergeDirection::Prev),
            "next" => Ok(MergeDirection::Next),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MergeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MergeDirection::Prev => "prev",
            MergeDirection::Next => "next",
        })
    }
}

/// The six verbs of the command language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandType {
    ReplaceParagraph,
    InsertParagraph,
    DeleteParagraph,
    MoveParagraph,
    SplitParagraph,
    MergeParagraph,
}

impl CommandType {
    pub const ALL: [CommandType; 6] = [
        CommandType::ReplaceParagraph,
        CommandType::InsertParagraph,
        CommandType::DeleteParagraph,
        CommandType::MoveParagraph,
        CommandType::SplitParagraph,
        CommandType::MergeParagraph,
    ];

    /// Verb as written in the command area
    pub fn verb(self) -> &'static str {
        match self {
            CommandType::ReplaceParagraph => "REPLACE_PARAGRAPH",
            CommandType::InsertParagraph => "INSERT_PARAGRAPH",
            CommandType::DeleteParagraph => "DELETE_PARAGRAPH",
            CommandType::MoveParagraph => "MOVE_PARAGRAPH",
            CommandType::SplitParagraph => "SPLIT_PARAGRAPH",
            CommandType::MergeParagraph => "MERGE_PARAGRAPH",
        }
    }

    /// Number of bracketed arguments the verb takes
    pub fn arity(self) -> usize {
        match self {
            CommandType::DeleteParagraph => 1,
            CommandType::ReplaceParagraph
            | CommandType::SplitParagraph
            | CommandType::MergeParagraph => 2,
            CommandType::InsertParagraph | CommandType::MoveParagraph => 3,
        }
    }
}

impl FromStr for CommandType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CommandType::ALL
            .into_iter()
            .find(|ty| ty.verb() == s)
            .ok_or(())
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Verb-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum CommandKind {
    ReplaceParagraph {
        target: ParagraphId,
        content: String,
    },
    InsertParagraph {
        anchor: ParagraphId,
        position: Placement,
        content: String,
    },
    DeleteParagraph {
        target: ParagraphId,
    },
    MoveParagraph {
        target: ParagraphId,
        anchor: ParagraphId,
        position: Placement,
    },
    SplitParagraph {
        target: ParagraphId,
        offset: usize,
    },
    MergeParagraph {
        target: ParagraphId,
        direction: MergeDirection,
    },
}

impl CommandKind {
    pub fn command_type(&self) -> CommandType {
        match self {
            CommandKind::ReplaceParagraph { .. } => CommandType::ReplaceParagraph,
            CommandKind::InsertParagraph { .. } => CommandType::InsertParagraph,
            CommandKind::DeleteParagraph { .. } => CommandType::DeleteParagraph,
            CommandKind::MoveParagraph { .. } => CommandType::MoveParagraph,
            CommandKind::SplitParagraph { .. } => CommandType::SplitParagraph,
            CommandKind::MergeParagraph { .. } => CommandType::MergeParagraph,
        }
    }

    /// Every paragraph id the command references, target first
    pub fn paragraph_ids(&self) -> Vec<&ParagraphId> {
        match self {
            CommandKind::ReplaceParagraph { target, .. }
            | CommandKind::DeleteParagraph { target }
            | CommandKind::SplitParagraph { target, .. }
            | CommandKind::MergeParagraph { target, .. } => vec![target],
            CommandKind::InsertParagraph { anchor, .. } => vec![anchor],
            CommandKind::MoveParagraph { target, anchor, .. } => vec![target, anchor],
        }
    }
}

/// A parsed edit command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Command {
    pub id: String,

    #[serde(flatten)]
    pub kind: CommandKind,

    /// Command text as written, without the comment delimiters
    pub raw: String,

    /// 1-based line in the markup the command came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,

    /// Byte range of `raw` within the markup
    #[serde(skip)]
    pub span: Option<Range<usize>>,
}

impl Command {
    pub fn command_type(&self) -> CommandType {
        self.kind.command_type()
    }
}
