//! # Change Highlighting
//!
//! Maps reported change ranges onto the current tree and applies the
//! "changed" mark. A range names blocks by their document-order position
//! (headings and paragraphs counted alike), so it is only meaningful against
//! the tree it was computed for and is resolved at highlight time.
//!
//! Ranges that fall outside the current tree are skipped, never raised; each
//! skip is returned in the [`HighlightReport`] and logged.

use crate::resolver::ordinal_of;
use crate::tree::{BlockTree, Location};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// One end of a change range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePoint {
    /// Document-order block position, 0-based
    pub paragraph: usize,

    /// Character offset in the block; start of block for a range start,
    /// end of block for a range end when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRange {
    pub start: RangePoint,
    pub end: RangePoint,
}

impl ChangeRange {
    /// The whole of one block
    pub fn block(paragraph: usize) -> Self {
        Self {
            start: RangePoint {
                paragraph,
                offset: None,
            },
            end: RangePoint {
                paragraph,
                offset: None,
            },
        }
    }

    /// Characters `start..end` of one block
    pub fn within(paragraph: usize, start: usize, end: usize) -> Self {
        Self {
            start: RangePoint {
                paragraph,
                offset: Some(start),
            },
            end: RangePoint {
                paragraph,
                offset: Some(end),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRange {
    /// Position of the range in the request
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HighlightReport {
    pub applied: usize,
    pub skipped: Vec<SkippedRange>,
}

impl HighlightReport {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// A range checked against the tree: per-block character spans to mark
struct ResolvedRange {
    spans: Vec<(Location, std::ops::Range<usize>)>,
}

/// Apply a "changed" mark over every range that resolves against `tree`
pub fn highlight<T: BlockTree>(tree: &mut T, ranges: &[ChangeRange]) -> HighlightReport {
    let mut report = HighlightReport::default();

    for (index, range) in ranges.iter().enumerate() {
        let resolved = match resolve_range(tree, range) {
            Ok(resolved) => resolved,
            Err(reason) => {
                warn!(index, %reason, "skipping highlight range");
                report.skipped.push(SkippedRange { index, reason });
                continue;
            }
        };

        // spans are in bounds here
        let marked = resolved
            .spans
            .into_iter()
            .try_for_each(|(at, span)| tree.mark_changed(at, span));
        match marked {
            Ok(()) => report.applied += 1,
            Err(err) => {
                warn!(index, error = %err, "highlight range rejected by tree");
                report.skipped.push(SkippedRange {
                    index,
                    reason: err.to_string(),
                });
            }
        }
    }

    debug!(
        applied = report.applied,
        skipped = report.skipped.len(),
        "highlight applied"
    );
    report
}

/// Remove every "changed" mark in the document
pub fn clear_highlights<T: BlockTree>(tree: &mut T) -> usize {
    let cleared = tree.clear_changed_marks();
    debug!(cleared, "highlights cleared");
    cleared
}

/// Whole-block ranges for the blocks currently answering to `ids`.
/// Ids no longer in the tree are left out.
pub fn ranges_for_ids<T: BlockTree, S: AsRef<str>>(tree: &T, ids: &[S]) -> Vec<ChangeRange> {
    ids.iter()
        .filter_map(|id| ordinal_of(tree, id.as_ref()))
        .map(ChangeRange::block)
        .collect()
}

fn resolve_range<T: BlockTree>(tree: &T, range: &ChangeRange) -> Result<ResolvedRange, String> {
    let (first, last) = (range.start.paragraph, range.end.paragraph);
    let count = tree.block_count();
    if last >= count || first >= count {
        return Err(format!(
            "paragraph {} is outside a document of {count} blocks",
            first.max(last)
        ));
    }
    if first > last {
        return Err(format!("range starts at paragraph {first} after it ends at {last}"));
    }

    let blocks: Vec<_> = tree
        .blocks()
        .skip(first)
        .take(last - first + 1)
        .map(|(at, block)| (at, block.char_len()))
        .collect();

    let mut spans = Vec::with_capacity(blocks.len());
    let last_index = blocks.len() - 1;
    for (i, (at, len)) in blocks.into_iter().enumerate() {
        let start = if i == 0 { range.start.offset.unwrap_or(0) } else { 0 };
        let end = if i == last_index {
            range.end.offset.unwrap_or(len)
        } else {
            len
        };

        if start > len || end > len {
            return Err(format!(
                "offset {} is outside paragraph {} ({len} characters)",
                start.max(end),
                first + i
            ));
        }
        if start > end {
            return Err(format!("offset {start} is after {end} in paragraph {}", first + i));
        }
        spans.push((at, start..end));
    }

    Ok(ResolvedRange { spans })
}
