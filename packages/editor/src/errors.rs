//! Error types for the editor

use crate::tree::Location;
use redline_commands::{MergeDirection, ParagraphId};
use serde::Serialize;
use thiserror::Error;

/// Failure of a structural edit primitive of the block tree
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("no block at {0}")]
    InvalidLocation(Location),

    #[error("page 1 must keep at least one block")]
    PageOneEmpty,

    #[error("offset {offset} is outside a block of {len} characters")]
    OffsetOutOfBounds { offset: usize, len: usize },

    #[error("blocks at {0} and {1} are not adjacent")]
    NotAdjacent(Location, Location),

    #[error("document has no pages")]
    EmptyDocument,
}

pub type TreeResult<T> = Result<T, TreeError>;

/// How a command failed, as reported to the review UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Id not found and not a valid virtual target
    Resolution,

    /// The edit would empty page 1
    InvariantViolation,

    /// A tree primitive refused the edit
    HostFailure,

    /// Arguments that can only be checked against the tree
    InvalidArgument,
}

/// Why a single command could not be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("paragraph '{0}' not found")]
    NotFound(ParagraphId),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("split offset {offset} is beyond the end of '{id}' ({len} characters)")]
    OffsetOutOfBounds {
        id: ParagraphId,
        offset: usize,
        len: usize,
    },

    #[error("'{id}' has no {direction} paragraph to merge with")]
    NoNeighbor {
        id: ParagraphId,
        direction: MergeDirection,
    },

    #[error("host edit failed: {0}")]
    Host(#[from] TreeError),
}

impl ExecutionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExecutionError::NotFound(_) => FailureKind::Resolution,
            ExecutionError::InvariantViolation(_) => FailureKind::InvariantViolation,
            ExecutionError::OffsetOutOfBounds { .. } | ExecutionError::NoNeighbor { .. } => {
                FailureKind::InvalidArgument
            }
            ExecutionError::Host(_) => FailureKind::HostFailure,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("no automatic edit is pending review")]
    NothingPending,
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Review error: {0}")]
    Review(#[from] ReviewError),

    #[error("Document is not file-backed")]
    NotFileBacked,
}
