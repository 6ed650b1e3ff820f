//! # Command Execution
//!
//! Applies one parsed [`Command`] to a [`BlockTree`].
//!
//! ## Semantics
//!
//! ### Replace
//! - Atomic text replacement, block kind kept
//!
//! ### Insert
//! - New paragraph before/after the anchor, with a fresh temporary id
//! - A virtual anchor (`p<N>-1`, N past the last page) appends a new page
//!
//! ### Delete / Merge / Move
//! - Checked against the simulated post-edit state first: if page 1 would
//!   end up empty the command fails and the tree is not touched
//! - Merge keeps the target block and absorbs its neighbor
//! - Moving a block to where it already is succeeds without editing
//!
//! ### Split
//! - Offset counts characters from the start; `0` and `len` are accepted and
//!   leave an empty block on one side

use crate::errors::{ExecutionError, FailureKind};
use crate::resolver::{resolve, resolve_target, Resolution};
use crate::tree::{Block, BlockTree, Location};
use chrono::{DateTime, Utc};
use redline_commands::{Command, CommandKind, CommandType, MergeDirection, ParagraphId, Placement};
use serde::Serialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Outcome of one command. Holds no reference into the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    success: bool,
    command_id: String,
    command_type: CommandType,
    affected_paragraph_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ExecutionFailure>,
    raw_command: String,
    timestamp: DateTime<Utc>,
}

impl ExecutionResult {
    fn succeeded(command: &Command, affected_paragraph_ids: Vec<String>) -> Self {
        Self {
            success: true,
            command_id: command.id.clone(),
            command_type: command.command_type(),
            affected_paragraph_ids,
            error: None,
            raw_command: command.raw.clone(),
            timestamp: Utc::now(),
        }
    }

    fn failed(command: &Command, error: &ExecutionError) -> Self {
        Self {
            success: false,
            command_id: command.id.clone(),
            command_type: command.command_type(),
            affected_paragraph_ids: Vec::new(),
            error: Some(ExecutionFailure {
                kind: error.kind(),
                message: error.to_string(),
            }),
            raw_command: command.raw.clone(),
            timestamp: Utc::now(),
        }
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn command_id(&self) -> &str {
        &self.command_id
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn affected_paragraph_ids(&self) -> &[String] {
        &self.affected_paragraph_ids
    }

    pub fn error(&self) -> Option<&ExecutionFailure> {
        self.error.as_ref()
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    pub fn raw_command(&self) -> &str {
        &self.raw_command
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Apply `command` and report the outcome. Never panics on bad input.
pub fn execute<T: BlockTree>(tree: &mut T, command: &Command) -> ExecutionResult {
    match apply(tree, &command.kind) {
        Ok(affected) => {
            debug!(
                command_id = %command.id,
                command_type = %command.command_type(),
                affected = ?affected,
                "command applied"
            );
            ExecutionResult::succeeded(command, affected)
        }
        Err(err) => {
            warn!(
                command_id = %command.id,
                command_type = %command.command_type(),
                error = %err,
                "command failed"
            );
            ExecutionResult::failed(command, &err)
        }
    }
}

/// Apply a command payload, returning the affected paragraph ids
pub fn apply<T: BlockTree>(tree: &mut T, kind: &CommandKind) -> Result<Vec<String>, ExecutionError> {
    match kind {
        CommandKind::ReplaceParagraph { target, content } => {
            apply_replace(tree, target, content)
        }
        CommandKind::InsertParagraph { anchor, position, content } => {
            apply_insert(tree, anchor, *position, content)
        }
        CommandKind::DeleteParagraph { target } => apply_delete(tree, target),
        CommandKind::MoveParagraph { target, anchor, position } => {
            apply_move(tree, target, anchor, *position)
        }
        CommandKind::SplitParagraph { target, offset } => apply_split(tree, target, *offset),
        CommandKind::MergeParagraph { target, direction } => {
            apply_merge(tree, target, *direction)
        }
    }
}

fn require<T: BlockTree>(tree: &T, id: &ParagraphId) -> Result<Location, ExecutionError> {
    resolve(tree, id).ok_or_else(|| ExecutionError::NotFound(id.clone()))
}

/// Blocks page 1 would hold after removing `removed` and adding `added`
fn page_one_len_after<T: BlockTree>(tree: &T, removed: &[Location], added: usize) -> usize {
    let removed = removed.iter().filter(|at| at.page == 0).count();
    (tree.page_len(0) + added).saturating_sub(removed)
}

fn guard_page_one<T: BlockTree>(
    tree: &T,
    removed: &[Location],
    added: usize,
) -> Result<(), ExecutionError> {
    if page_one_len_after(tree, removed, added) == 0 {
        return Err(ExecutionError::InvariantViolation(
            "page 1 would be left without blocks".to_string(),
        ));
    }
    Ok(())
}

fn apply_replace<T: BlockTree>(
    tree: &mut T,
    target: &ParagraphId,
    content: &str,
) -> Result<Vec<String>, ExecutionError> {
    let at = require(tree, target)?;
    tree.set_text(at, content.to_string())?;
    Ok(vec![target.to_string()])
}

fn apply_insert<T: BlockTree>(
    tree: &mut T,
    anchor: &ParagraphId,
    position: Placement,
    content: &str,
) -> Result<Vec<String>, ExecutionError> {
    match resolve_target(tree, anchor) {
        Resolution::Found(at) => {
            let id = tree.allocate_temp_id();
            let block = Block::paragraph(content).with_temp_id(id.clone());
            let index = match position {
                Placement::Before => at.block,
                Placement::After => at.block + 1,
            };
            tree.insert_block(Location::new(at.page, index), block)?;
            Ok(vec![id])
        }
        Resolution::VirtualPage { page } => {
            let id = tree.allocate_temp_id();
            debug!(requested_page = page, "appending page for virtual target");
            tree.append_page(Block::paragraph(content).with_temp_id(id.clone()))?;
            Ok(vec![id])
        }
        Resolution::Missing => Err(ExecutionError::NotFound(anchor.clone())),
    }
}

fn apply_delete<T: BlockTree>(
    tree: &mut T,
    target: &ParagraphId,
) -> Result<Vec<String>, ExecutionError> {
    let at = require(tree, target)?;
    guard_page_one(tree, &[at], 0)?;
    tree.remove_block(at)?;
    Ok(Vec::new())
}

fn apply_move<T: BlockTree>(
    tree: &mut T,
    target: &ParagraphId,
    anchor: &ParagraphId,
    position: Placement,
) -> Result<Vec<String>, ExecutionError> {
    let from = require(tree, target)?;
    let anchor_at = require(tree, anchor)?;

    if from == anchor_at {
        return Ok(vec![target.to_string()]);
    }

    // anchor index once the moved block has been detached
    let anchor_index = if anchor_at.page == from.page && anchor_at.block > from.block {
        anchor_at.block - 1
    } else {
        anchor_at.block
    };
    let to = Location::new(
        anchor_at.page,
        match position {
            Placement::Before => anchor_index,
            Placement::After => anchor_index + 1,
        },
    );

    if to == from {
        return Ok(vec![target.to_string()]);
    }

    guard_page_one(tree, &[from], usize::from(to.page == 0))?;
    tree.move_block(from, to)?;
    Ok(vec![target.to_string()])
}

fn apply_split<T: BlockTree>(
    tree: &mut T,
    target: &ParagraphId,
    offset: usize,
) -> Result<Vec<String>, ExecutionError> {
    let at = require(tree, target)?;
    let len = tree.block(at).map_or(0, Block::char_len);
    if offset > len {
        return Err(ExecutionError::OffsetOutOfBounds {
            id: target.clone(),
            offset,
            len,
        });
    }

    let new_id = tree.allocate_temp_id();
    tree.split_block(at, offset, new_id.clone())?;
    Ok(vec![target.to_string(), new_id])
}

fn apply_merge<T: BlockTree>(
    tree: &mut T,
    target: &ParagraphId,
    direction: MergeDirection,
) -> Result<Vec<String>, ExecutionError> {
    let at = require(tree, target)?;
    let neighbor = match direction {
        MergeDirection::Prev => tree.previous_location(at),
        MergeDirection::Next => tree.next_location(at),
    }
    .ok_or_else(|| ExecutionError::NoNeighbor {
        id: target.clone(),
        direction,
    })?;

    guard_page_one(tree, &[neighbor], 0)?;
    tree.merge_blocks(at, neighbor)?;
    Ok(vec![target.to_string()])
}
