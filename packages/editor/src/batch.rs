//! Ordered batch execution.
//!
//! Commands run strictly in sequence against the live tree, so a later
//! command sees every edit made by the earlier ones (including temporary ids
//! created by inserts and splits). A failed command is recorded and the
//! batch carries on.

use crate::executor::{execute, ExecutionResult};
use crate::resolver::duplicate_ids;
use crate::tree::BlockTree;
use redline_commands::Command;
use serde::Serialize;
use tracing::{info, instrument, warn};

/// Counts over a batch's results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn of(results: &[ExecutionResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success()).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Execute `commands` in order, returning one result per command
#[instrument(skip_all, fields(commands = commands.len()))]
pub fn execute_all<T: BlockTree>(tree: &mut T, commands: &[Command]) -> Vec<ExecutionResult> {
    for id in duplicate_ids(tree) {
        warn!(paragraph_id = %id, "duplicate paragraph id, first occurrence will be used");
    }

    let results: Vec<ExecutionResult> = commands
        .iter()
        .map(|command| execute(tree, command))
        .collect();

    let summary = BatchSummary::of(&results);
    info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "batch finished"
    );

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::errors::{FailureKind, TreeError, TreeResult};
    use crate::tree::{Block, Location};
    use redline_commands::parse;
    use std::ops::Range;

    /// Document whose text replacement is refused for one block
    #[derive(Debug, Clone)]
    struct ReadOnlyBlock {
        inner: Document,
        locked: &'static str,
    }

    impl BlockTree for ReadOnlyBlock {
        fn page_count(&self) -> usize {
            self.inner.page_count()
        }

        fn page_number(&self, page: usize) -> Option<u32> {
            self.inner.page_number(page)
        }

        fn page_len(&self, page: usize) -> usize {
            self.inner.page_len(page)
        }

        fn block(&self, at: Location) -> Option<&Block> {
            self.inner.block(at)
        }

        fn set_text(&mut self, at: Location, text: String) -> TreeResult<()> {
            if self.inner.block(at).is_some_and(|b| b.answers_to(self.locked)) {
                return Err(TreeError::InvalidLocation(at));
            }
            self.inner.set_text(at, text)
        }

        fn insert_block(&mut self, at: Location, block: Block) -> TreeResult<Location> {
            self.inner.insert_block(at, block)
        }

        fn append_page(&mut self, block: Block) -> TreeResult<Location> {
            self.inner.append_page(block)
        }

        fn remove_block(&mut self, at: Location) -> TreeResult<Block> {
            self.inner.remove_block(at)
        }

        fn split_block(
            &mut self,
            at: Location,
            offset: usize,
            temp_id: String,
        ) -> TreeResult<Location> {
            self.inner.split_block(at, offset, temp_id)
        }

        fn merge_blocks(&mut self, survivor: Location, absorbed: Location) -> TreeResult<()> {
            self.inner.merge_blocks(survivor, absorbed)
        }

        fn move_block(&mut self, from: Location, to: Location) -> TreeResult<Location> {
            self.inner.move_block(from, to)
        }

        fn allocate_temp_id(&mut self) -> String {
            self.inner.allocate_temp_id()
        }

        fn mark_changed(&mut self, at: Location, span: Range<usize>) -> TreeResult<()> {
            self.inner.mark_changed(at, span)
        }

        fn clear_changed_marks(&mut self) -> usize {
            self.inner.clear_changed_marks()
        }
    }

    fn batch(lines: &[&str]) -> Vec<Command> {
        let markup = format!(
            "<!-- EDIT_COMMANDS_START -->\n{}\n<!-- EDIT_COMMANDS_END -->",
            lines
                .iter()
                .map(|l| format!("<!-- {l} -->"))
                .collect::<Vec<_>>()
                .join("\n")
        );
        let parsed = parse(&markup);
        assert!(parsed.is_clean(), "{:?}", parsed.errors);
        parsed.commands
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let mut doc = Document::from_paragraphs("batch.json", &["a", "b"]).unwrap();
        let commands = batch(&[
            "REPLACE_PARAGRAPH([p1-9],[missing])",
            "REPLACE_PARAGRAPH([p1-2],[B])",
        ]);

        let results = execute_all(&mut doc, &commands);

        assert_eq!(results.len(), 2);
        assert!(!results[0].success());
        assert!(results[1].success());
        assert_eq!(doc.texts(), vec!["a", "B"]);
        assert_eq!(
            BatchSummary::of(&results),
            BatchSummary {
                succeeded: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_results_follow_command_order() {
        let mut doc = Document::from_paragraphs("batch.json", &["a"]).unwrap();
        let commands = batch(&[
            "INSERT_PARAGRAPH([p1-1],[after],[b])",
            "DELETE_PARAGRAPH([p1-1])",
            "REPLACE_PARAGRAPH([p1-1],[gone])",
        ]);

        let results = execute_all(&mut doc, &commands);
        let ids: Vec<&str> = results.iter().map(|r| r.command_id()).collect();
        let expected: Vec<&str> = commands.iter().map(|c| c.id.as_str()).collect();

        assert_eq!(ids, expected);
        assert!(results[0].success());
        assert!(results[1].success());
        assert!(!results[2].success());
        assert_eq!(doc.texts(), vec!["b"]);
    }

    #[test]
    fn test_empty_batch() {
        let mut doc = Document::from_paragraphs("batch.json", &["a"]).unwrap();
        let results = execute_all(&mut doc, &[]);

        assert!(results.is_empty());
        assert_eq!(BatchSummary::of(&results).total(), 0);
        assert_eq!(doc.version, 0);
    }

    #[test]
    fn test_refused_primitive_is_host_failure() {
        let mut tree = ReadOnlyBlock {
            inner: Document::from_paragraphs("batch.json", &["a", "b"]).unwrap(),
            locked: "p1-1",
        };
        let commands = batch(&[
            "REPLACE_PARAGRAPH([p1-1],[A])",
            "REPLACE_PARAGRAPH([p1-2],[B])",
        ]);

        let results = execute_all(&mut tree, &commands);

        assert_eq!(results[0].failure_kind(), Some(FailureKind::HostFailure));
        assert_eq!(results[0].raw_command(), "REPLACE_PARAGRAPH([p1-1],[A])");
        assert!(results[0].affected_paragraph_ids().is_empty());
        assert!(results[1].success());
        assert_eq!(tree.inner.texts(), vec!["a", "B"]);
    }
}
