//! # Document Handle
//!
//! In-memory paged document used as the block tree by the CLI and tests.
//!
//! A Document is an ordered list of pages, each an ordered list of blocks.
//! It enforces its own structural invariant: page 1 never loses its last
//! block. Documents can be memory-backed or loaded from a JSON file:
//!
//! ```text
//! { "pages": [ { "number": 1, "blocks": [ { "type": "paragraph", "id": "p1-1", "text": "Hello" } ] } ] }
//! ```

use crate::errors::{EditorError, TreeError, TreeResult};
use crate::resolver;
use crate::tree::{byte_index, normalize_marks, Block, BlockTree, Location};
use redline_commands::IdGenerator;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub number: u32,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Page {
    pub fn new(number: u32, blocks: Vec<Block>) -> Self {
        Self { number, blocks }
    }
}

#[derive(Serialize, Deserialize)]
struct StoredDocument {
    pages: Vec<Page>,
}

/// Editable paged document
#[derive(Debug, Clone)]
pub struct Document {
    /// Source file, if loaded from disk
    pub path: Option<PathBuf>,

    /// Increments on each successful structural edit
    pub version: u64,

    pages: Vec<Page>,
    temp_ids: IdGenerator,
    dirty: bool,
}

impl Document {
    /// Create a memory-backed document. `name` seeds temporary block ids.
    pub fn new(name: &str, pages: Vec<Page>) -> TreeResult<Self> {
        match pages.first() {
            None => return Err(TreeError::EmptyDocument),
            Some(first) if first.blocks.is_empty() => return Err(TreeError::PageOneEmpty),
            Some(_) => {}
        }

        Ok(Self {
            path: None,
            version: 0,
            pages,
            temp_ids: IdGenerator::from_content("tmp", name),
            dirty: false,
        })
    }

    /// Single-page document of paragraphs with ids `p1-1`, `p1-2`, ...
    pub fn from_paragraphs<S: AsRef<str>>(name: &str, texts: &[S]) -> TreeResult<Self> {
        let blocks = texts
            .iter()
            .enumerate()
            .map(|(i, text)| Block::paragraph(text.as_ref()).with_id(format!("p1-{}", i + 1)))
            .collect();
        Self::new(name, vec![Page::new(1, blocks)])
    }

    pub fn from_json(name: &str, json: &str) -> Result<Self, EditorError> {
        let stored: StoredDocument = serde_json::from_str(json)?;
        Ok(Self::new(name, stored.pages)?)
    }

    /// Load document from a JSON file (file-backed)
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let mut doc = Self::from_json(&path.to_string_lossy(), &json)?;
        doc.path = Some(path.to_path_buf());
        Ok(doc)
    }

    pub fn to_json(&self) -> Result<String, EditorError> {
        let stored = StoredDocument {
            pages: self.pages.clone(),
        };
        Ok(serde_json::to_string_pretty(&stored)?)
    }

    /// Save document back to the file it was loaded from
    pub fn save(&mut self) -> Result<(), EditorError> {
        let path = self.path.clone().ok_or(EditorError::NotFileBacked)?;
        self.save_to(path)
    }

    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        std::fs::write(path, self.to_json()?)?;
        self.dirty = false;
        Ok(())
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Texts of all blocks in document order
    pub fn texts(&self) -> Vec<&str> {
        self.blocks().map(|(_, block)| block.text.as_str()).collect()
    }

    /// Ids of all blocks in document order (persisted id, else temp id)
    pub fn ids(&self) -> Vec<&str> {
        self.blocks()
            .map(|(_, block)| block.display_id().unwrap_or(""))
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Block> {
        self.blocks()
            .find(|(_, block)| block.answers_to(id))
            .map(|(_, block)| block)
    }

    /// Ids carried by more than one block
    pub fn duplicate_ids(&self) -> Vec<String> {
        resolver::duplicate_ids(self)
    }

    /// Rewrite ids from position: pages become 1..n and every block gets
    /// `p<page>-<index>`. Temporary ids are dropped.
    pub fn renumber(&mut self) {
        for (page_index, page) in self.pages.iter_mut().enumerate() {
            page.number = page_index as u32 + 1;
            for (block_index, block) in page.blocks.iter_mut().enumerate() {
                block.id = Some(format!("p{}-{}", page.number, block_index + 1));
                block.temp_id = None;
            }
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    fn block_mut(&mut self, at: Location) -> TreeResult<&mut Block> {
        self.pages
            .get_mut(at.page)
            .and_then(|page| page.blocks.get_mut(at.block))
            .ok_or(TreeError::InvalidLocation(at))
    }

    fn check(&self, at: Location) -> TreeResult<()> {
        self.block(at).map(|_| ()).ok_or(TreeError::InvalidLocation(at))
    }

    fn would_empty_page_one(&self, removed: Location) -> bool {
        removed.page == 0 && self.page_len(0) == 1
    }
}

impl BlockTree for Document {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_number(&self, page: usize) -> Option<u32> {
        self.pages.get(page).map(|p| p.number)
    }

    fn page_len(&self, page: usize) -> usize {
        self.pages.get(page).map_or(0, |p| p.blocks.len())
    }

    fn block(&self, at: Location) -> Option<&Block> {
        self.pages.get(at.page)?.blocks.get(at.block)
    }

    fn set_text(&mut self, at: Location, text: String) -> TreeResult<()> {
        let block = self.block_mut(at)?;
        block.text = text;
        block.changed.clear();
        self.touch();
        Ok(())
    }

    fn insert_block(&mut self, at: Location, block: Block) -> TreeResult<Location> {
        let page = self
            .pages
            .get_mut(at.page)
            .ok_or(TreeError::InvalidLocation(at))?;
        if at.block > page.blocks.len() {
            return Err(TreeError::InvalidLocation(at));
        }
        page.blocks.insert(at.block, block);
        self.touch();
        Ok(at)
    }

    fn append_page(&mut self, block: Block) -> TreeResult<Location> {
        let number = self.max_page_number().map_or(1, |n| n + 1);
        self.pages.push(Page::new(number, vec![block]));
        self.touch();
        Ok(Location::new(self.pages.len() - 1, 0))
    }

    fn remove_block(&mut self, at: Location) -> TreeResult<Block> {
        self.check(at)?;
        if self.would_empty_page_one(at) {
            return Err(TreeError::PageOneEmpty);
        }
        let block = self.pages[at.page].blocks.remove(at.block);
        self.touch();
        Ok(block)
    }

    fn split_block(
        &mut self,
        at: Location,
        offset: usize,
        temp_id: String,
    ) -> TreeResult<Location> {
        let block = self.block_mut(at)?;
        let len = block.char_len();
        let split_at = byte_index(&block.text, offset)
            .ok_or(TreeError::OffsetOutOfBounds { offset, len })?;

        let tail_text = block.text.split_off(split_at);
        let mut tail = Block::new(block.kind, tail_text).with_temp_id(temp_id);

        let (head_marks, tail_marks) = split_marks(&block.changed, offset);
        block.changed = head_marks;
        tail.changed = tail_marks;

        let new_at = Location::new(at.page, at.block + 1);
        self.pages[at.page].blocks.insert(new_at.block, tail);
        self.touch();
        Ok(new_at)
    }

    fn merge_blocks(&mut self, survivor: Location, absorbed: Location) -> TreeResult<()> {
        self.check(survivor)?;
        self.check(absorbed)?;

        let absorbed_is_next = self.next_location(survivor) == Some(absorbed);
        let absorbed_is_prev = self.previous_location(survivor) == Some(absorbed);
        if !absorbed_is_next && !absorbed_is_prev {
            return Err(TreeError::NotAdjacent(survivor, absorbed));
        }
        if self.would_empty_page_one(absorbed) {
            return Err(TreeError::PageOneEmpty);
        }

        let removed = self.pages[absorbed.page].blocks.remove(absorbed.block);
        let survivor = if absorbed.page == survivor.page && absorbed.block < survivor.block {
            Location::new(survivor.page, survivor.block - 1)
        } else {
            survivor
        };

        let block = self.block_mut(survivor)?;
        if absorbed_is_next {
            let shift = block.char_len();
            block.text.push_str(&removed.text);
            block
                .changed
                .extend(removed.changed.iter().map(|m| m.start + shift..m.end + shift));
        } else {
            let shift = removed.char_len();
            block.text.insert_str(0, &removed.text);
            for mark in block.changed.iter_mut() {
                *mark = mark.start + shift..mark.end + shift;
            }
            block.changed.extend(removed.changed.iter().cloned());
        }
        normalize_marks(&mut block.changed);

        self.touch();
        Ok(())
    }

    fn move_block(&mut self, from: Location, to: Location) -> TreeResult<Location> {
        self.check(from)?;
        let len_after = self.page_len(to.page) - usize::from(from.page == to.page);
        if to.page >= self.pages.len() || to.block > len_after {
            return Err(TreeError::InvalidLocation(to));
        }
        if to.page != from.page && self.would_empty_page_one(from) {
            return Err(TreeError::PageOneEmpty);
        }

        let block = self.pages[from.page].blocks.remove(from.block);
        self.pages[to.page].blocks.insert(to.block, block);
        self.touch();
        Ok(to)
    }

    fn allocate_temp_id(&mut self) -> String {
        self.temp_ids.new_id()
    }

    fn mark_changed(&mut self, at: Location, span: Range<usize>) -> TreeResult<()> {
        let block = self.block_mut(at)?;
        let len = block.char_len();
        if span.end > len {
            return Err(TreeError::OffsetOutOfBounds {
                offset: span.end,
                len,
            });
        }
        block.mark(span);
        Ok(())
    }

    fn clear_changed_marks(&mut self) -> usize {
        let mut cleared = 0;
        for block in self.pages.iter_mut().flat_map(|p| p.blocks.iter_mut()) {
            if block.is_marked() {
                block.changed.clear();
                cleared += 1;
            }
        }
        cleared
    }
}

/// Partition marks at a character offset into head and (rebased) tail
fn split_marks(marks: &[Range<usize>], offset: usize) -> (Vec<Range<usize>>, Vec<Range<usize>>) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    for mark in marks {
        if mark.start < offset {
            head.push(mark.start..mark.end.min(offset));
        }
        if mark.end > offset {
            tail.push(mark.start.max(offset) - offset..mark.end - offset);
        }
    }
    (head, tail)
}
