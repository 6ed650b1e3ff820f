//! # Redline Editor
//!
//! Applies parsed edit commands to a paged paragraph tree and gates the
//! result behind a review step.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ commands: markup → Command list             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: batch → results → review            │
//! │  - Resolve paragraph ids (incl. new pages)  │
//! │  - Execute through BlockTree primitives     │
//! │  - Mark changed blocks                      │
//! │  - Approve or revert to snapshot            │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ host: persistence, rendering                │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use redline_commands::parse;
//! use redline_editor::{Document, ReviewSession};
//!
//! let parsed = parse(&markup);
//! let mut session = ReviewSession::new(Document::load("doc.json")?);
//!
//! let outcome = session.run_batch(&parsed.commands);
//! for result in &outcome.results {
//!     println!("{} {}", result.command_id(), result.success());
//! }
//!
//! session.approve()?.save()?;
//! ```

pub mod batch;
pub mod document;
pub mod errors;
pub mod executor;
pub mod highlight;
pub mod hover;
pub mod resolver;
pub mod review;
pub mod tree;

pub use batch::{execute_all, BatchSummary};
pub use document::{Document, Page};
pub use errors::{EditorError, ExecutionError, FailureKind, ReviewError, TreeError, TreeResult};
pub use executor::{execute, ExecutionFailure, ExecutionResult};
pub use highlight::{
    clear_highlights, highlight, ranges_for_ids, ChangeRange, HighlightReport, RangePoint,
    SkippedRange,
};
pub use hover::{HoverState, HoverTracker};
pub use resolver::{duplicate_ids, resolve, resolve_target, Resolution};
pub use review::{
    BatchOutcome, ProcessingGuard, ProcessingSignal, ReviewOutcome, ReviewSession, ReviewState,
};
pub use tree::{Block, BlockKind, BlockTree, Blocks, Location};
