//! # Block Tree Interface
//!
//! The editing surface owns the document tree; the command engine only
//! reaches it through [`BlockTree`]. Each structural primitive is expected
//! to be atomic: it either applies completely or returns a [`TreeError`]
//! and leaves the tree untouched.
//!
//! [`TreeError`]: crate::TreeError

use crate::errors::TreeResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Position of a block: page index and block index, both 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub page: usize,
    pub block: usize,
}

impl Location {
    pub fn new(page: usize, block: usize) -> Self {
        Self { page, block }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page index {}, block {}", self.page, self.block)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,
    Heading { level: u8 },
}

/// One paragraph or heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(flatten)]
    pub kind: BlockKind,

    /// Persisted id attribute, normally `p<page>-<index>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Client-only id for blocks created since the last save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,

    #[serde(default)]
    pub text: String,

    /// "changed" marks as character ranges, sorted and non-overlapping
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub changed: Vec<Range<usize>>,
}

impl Block {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(BlockKind::Paragraph, text)
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self::new(BlockKind::Heading { level }, text)
    }

    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            id: None,
            temp_id: None,
            text: text.into(),
            changed: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_temp_id(mut self, temp_id: impl Into<String>) -> Self {
        self.temp_id = Some(temp_id.into());
        self
    }

    /// Length in text units (Unicode scalar values)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether either id attribute equals `id`
    pub fn answers_to(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id) || self.temp_id.as_deref() == Some(id)
    }

    /// The id a reader should use for this block
    pub fn display_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.temp_id.as_deref())
    }

    pub fn is_marked(&self) -> bool {
        !self.changed.is_empty()
    }

    /// Add a "changed" mark. Marking an already-marked span is a no-op.
    pub fn mark(&mut self, span: Range<usize>) {
        if span.start >= span.end {
            return;
        }
        self.changed.push(span);
        normalize_marks(&mut self.changed);
    }
}

/// Sort and coalesce overlapping or touching ranges
pub(crate) fn normalize_marks(marks: &mut Vec<Range<usize>>) {
    marks.retain(|m| m.start < m.end);
    marks.sort_by_key(|m| (m.start, m.end));

    let mut merged: Vec<Range<usize>> = Vec::with_capacity(marks.len());
    for mark in marks.drain(..) {
        match merged.last_mut() {
            Some(last) if mark.start <= last.end => last.end = last.end.max(mark.end),
            _ => merged.push(mark),
        }
    }
    *marks = merged;
}

/// Byte index of the `offset`-th character, or `None` past the end
pub(crate) fn byte_index(text: &str, offset: usize) -> Option<usize> {
    if offset == 0 {
        return Some(0);
    }
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(offset)
}

/// Structural access to the live document, as provided by the editing surface.
///
/// Traversal is pre-order: pages in order, blocks in order within a page.
pub trait BlockTree: Clone {
    fn page_count(&self) -> usize;

    /// Page number attribute of the page at `page`
    fn page_number(&self, page: usize) -> Option<u32>;

    fn page_len(&self, page: usize) -> usize;

    fn block(&self, at: Location) -> Option<&Block>;

    fn set_text(&mut self, at: Location, text: String) -> TreeResult<()>;

    /// Insert `block` so that it ends up at `at`, shifting later blocks
    fn insert_block(&mut self, at: Location, block: Block) -> TreeResult<Location>;

    /// Append a new last page holding only `block`
    fn append_page(&mut self, block: Block) -> TreeResult<Location>;

    fn remove_block(&mut self, at: Location) -> TreeResult<Block>;

    /// Split at a character offset; the tail becomes a new block with `temp_id`
    fn split_block(&mut self, at: Location, offset: usize, temp_id: String)
        -> TreeResult<Location>;

    /// Fold the adjacent block `absorbed` into `survivor` and remove it
    fn merge_blocks(&mut self, survivor: Location, absorbed: Location) -> TreeResult<()>;

    /// Detach the block at `from` and reinsert it at `to`.
    ///
    /// `to` is expressed in coordinates after the block has been detached.
    fn move_block(&mut self, from: Location, to: Location) -> TreeResult<Location>;

    fn allocate_temp_id(&mut self) -> String;

    fn mark_changed(&mut self, at: Location, span: Range<usize>) -> TreeResult<()>;

    /// Remove every "changed" mark, returning how many blocks carried one
    fn clear_changed_marks(&mut self) -> usize;

    fn blocks(&self) -> Blocks<'_, Self>
    where
        Self: Sized,
    {
        Blocks {
            tree: self,
            next: Location::new(0, 0),
        }
    }

    fn block_count(&self) -> usize {
        (0..self.page_count()).map(|p| self.page_len(p)).sum()
    }

    fn max_page_number(&self) -> Option<u32> {
        (0..self.page_count())
            .filter_map(|p| self.page_number(p))
            .max()
    }

    /// Next block in document order, crossing page boundaries
    fn next_location(&self, at: Location) -> Option<Location> {
        if at.block + 1 < self.page_len(at.page) {
            return Some(Location::new(at.page, at.block + 1));
        }
        ((at.page + 1)..self.page_count())
            .find(|&p| self.page_len(p) > 0)
            .map(|p| Location::new(p, 0))
    }

    /// Previous block in document order, crossing page boundaries
    fn previous_location(&self, at: Location) -> Option<Location> {
        if at.block > 0 {
            return Some(Location::new(at.page, at.block - 1));
        }
        (0..at.page)
            .rev()
            .find(|&p| self.page_len(p) > 0)
            .map(|p| Location::new(p, self.page_len(p) - 1))
    }
}

/// Pre-order iterator over `(Location, &Block)`
pub struct Blocks<'a, T: BlockTree> {
    tree: &'a T,
    next: Location,
}

impl<'a, T: BlockTree> Iterator for Blocks<'a, T> {
    type Item = (Location, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next.page < self.tree.page_count() {
            let at = self.next;
            if let Some(block) = self.tree.block(at) {
                self.next.block += 1;
                return Some((at, block));
            }
            self.next = Location::new(at.page + 1, 0);
        }
        None
    }
}
