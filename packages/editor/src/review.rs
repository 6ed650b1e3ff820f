//! # Review Workflow
//!
//! Gates an automatic edit batch behind an explicit approve/reject.
//!
//! ```text
//!            run_batch (>= 1 success)
//!   Clean ────────────────────────────▶ AutoEditPending
//!     ▲                                     │
//!     └──────── approve / reject ───────────┘
//! ```
//!
//! Before the first batch out of `Clean` the session snapshots the tree.
//! `reject` restores that snapshot, `approve` keeps the edited tree. Both
//! clear every "changed" mark. There is no timeout transition.
//!
//! The editing surface is only locked while `run_batch` itself runs; the
//! session raises its [`ProcessingSignal`] for that span and the caller is
//! expected to block other mutations while it is set.

use crate::batch::{execute_all, BatchSummary};
use crate::errors::ReviewError;
use crate::executor::ExecutionResult;
use crate::highlight::{self, ranges_for_ids, ChangeRange, HighlightReport};
use crate::tree::BlockTree;
use redline_commands::Command;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReviewState {
    Clean,
    AutoEditPending,
}

/// How the last pending edit was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReviewOutcome {
    Approved,
    Reverted,
}

/// Shared "batch in progress" flag for the editing surface
#[derive(Debug, Clone, Default)]
pub struct ProcessingSignal(Arc<AtomicBool>);

impl ProcessingSignal {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Set the flag until the returned guard is dropped
    pub fn raise(&self) -> ProcessingGuard {
        self.0.store(true, Ordering::Release);
        ProcessingGuard(self.0.clone())
    }
}

pub struct ProcessingGuard(Arc<AtomicBool>);

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Everything a batch produced
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<ExecutionResult>,
    pub summary: BatchSummary,
    pub highlight: HighlightReport,
}

pub struct ReviewSession<T: BlockTree> {
    tree: T,
    snapshot: Option<T>,
    state: ReviewState,
    processing: ProcessingSignal,
    last_outcome: Option<ReviewOutcome>,
}

impl<T: BlockTree> ReviewSession<T> {
    pub fn new(tree: T) -> Self {
        Self {
            tree,
            snapshot: None,
            state: ReviewState::Clean,
            processing: ProcessingSignal::default(),
            last_outcome: None,
        }
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    /// Direct access for user edits made outside the review workflow
    pub fn tree_mut(&mut self) -> &mut T {
        &mut self.tree
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ReviewState::AutoEditPending
    }

    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }

    /// Clone of the processing flag, for the editing surface to poll
    pub fn processing_signal(&self) -> ProcessingSignal {
        self.processing.clone()
    }

    pub fn last_outcome(&self) -> Option<ReviewOutcome> {
        self.last_outcome
    }

    /// Run `commands` as one automatic edit and highlight what they touched
    pub fn run_batch(&mut self, commands: &[Command]) -> BatchOutcome {
        let _busy = self.processing.raise();

        let fresh_snapshot = self.state == ReviewState::Clean;
        if fresh_snapshot {
            self.snapshot = Some(self.tree.clone());
        }

        let results = execute_all(&mut self.tree, commands);
        let summary = BatchSummary::of(&results);

        let touched: Vec<&str> = results
            .iter()
            .filter(|r| r.success())
            .flat_map(|r| r.affected_paragraph_ids())
            .map(String::as_str)
            .collect();
        let ranges = ranges_for_ids(&self.tree, &touched);
        let highlight = highlight::highlight(&mut self.tree, &ranges);

        if summary.succeeded > 0 {
            if self.state == ReviewState::Clean {
                info!(succeeded = summary.succeeded, "automatic edit pending review");
            }
            self.state = ReviewState::AutoEditPending;
        } else if fresh_snapshot {
            self.snapshot = None;
        }

        BatchOutcome {
            results,
            summary,
            highlight,
        }
    }

    pub fn highlight(&mut self, ranges: &[ChangeRange]) -> HighlightReport {
        highlight::highlight(&mut self.tree, ranges)
    }

    pub fn clear_highlights(&mut self) -> usize {
        highlight::clear_highlights(&mut self.tree)
    }

    /// Keep the pending edit. Returns the tree for persisting.
    pub fn approve(&mut self) -> Result<&mut T, ReviewError> {
        self.settle(ReviewOutcome::Approved)?;
        Ok(&mut self.tree)
    }

    /// Discard the pending edit, restoring the pre-batch tree
    pub fn reject(&mut self) -> Result<&T, ReviewError> {
        self.settle(ReviewOutcome::Reverted)?;
        Ok(&self.tree)
    }

    pub fn into_tree(self) -> T {
        self.tree
    }

    fn settle(&mut self, outcome: ReviewOutcome) -> Result<(), ReviewError> {
        if self.state != ReviewState::AutoEditPending {
            return Err(ReviewError::NothingPending);
        }

        let snapshot = self.snapshot.take();
        if outcome == ReviewOutcome::Reverted {
            if let Some(snapshot) = snapshot {
                self.tree = snapshot;
            }
        }
        highlight::clear_highlights(&mut self.tree);

        self.state = ReviewState::Clean;
        self.last_outcome = Some(outcome);
        info!(?outcome, "automatic edit settled");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use redline_commands::parse_command;

    fn commands(raws: &[&str]) -> Vec<Command> {
        raws.iter().map(|r| parse_command(r).unwrap()).collect()
    }

    fn session() -> ReviewSession<Document> {
        ReviewSession::new(Document::from_paragraphs("review.json", &["one", "two"]).unwrap())
    }

    #[test]
    fn test_batch_marks_and_enters_pending() {
        let mut session = session();
        let outcome = session.run_batch(&commands(&["REPLACE_PARAGRAPH([p1-2],[TWO])"]));

        assert_eq!(outcome.summary.succeeded, 1);
        assert_eq!(outcome.highlight.applied, 1);
        assert_eq!(session.state(), ReviewState::AutoEditPending);
        assert!(session.tree().find("p1-2").unwrap().is_marked());
        assert!(!session.is_processing());
    }

    #[test]
    fn test_all_failures_stay_clean() {
        let mut session = session();
        let outcome = session.run_batch(&commands(&["DELETE_PARAGRAPH([p4-4])"]));

        assert_eq!(outcome.summary.failed, 1);
        assert_eq!(session.state(), ReviewState::Clean);
        assert_eq!(session.approve().unwrap_err(), ReviewError::NothingPending);
        assert_eq!(session.reject().unwrap_err(), ReviewError::NothingPending);
    }

    #[test]
    fn test_approve_keeps_edit_and_clears_marks() {
        let mut session = session();
        session.run_batch(&commands(&["REPLACE_PARAGRAPH([p1-1],[ONE])"]));

        let tree = session.approve().unwrap();
        assert_eq!(tree.texts(), vec!["ONE", "two"]);
        assert!(tree.blocks().all(|(_, b)| !b.is_marked()));
        assert_eq!(session.state(), ReviewState::Clean);
        assert_eq!(session.last_outcome(), Some(ReviewOutcome::Approved));
    }

    #[test]
    fn test_reject_restores_pre_batch_tree() {
        let mut session = session();
        let before = session.tree().to_json().unwrap();

        session.run_batch(&commands(&[
            "SPLIT_PARAGRAPH([p1-1],[1])",
            "DELETE_PARAGRAPH([p1-2])",
        ]));
        assert_ne!(session.tree().to_json().unwrap(), before);

        session.reject().unwrap();
        assert_eq!(session.tree().to_json().unwrap(), before);
        assert_eq!(session.last_outcome(), Some(ReviewOutcome::Reverted));
    }

    #[test]
    fn test_second_batch_keeps_first_snapshot() {
        let mut session = session();
        session.run_batch(&commands(&["REPLACE_PARAGRAPH([p1-1],[first])"]));
        session.run_batch(&commands(&["REPLACE_PARAGRAPH([p1-2],[second])"]));

        let tree = session.reject().unwrap();
        assert_eq!(tree.texts(), vec!["one", "two"]);
    }

    #[test]
    fn test_signal_is_shared_and_released() {
        let session = session();
        let signal = session.processing_signal();

        let guard = signal.raise();
        assert!(session.is_processing());
        drop(guard);
        assert!(!session.is_processing());
    }
}
