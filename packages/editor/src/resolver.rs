//! Paragraph id resolution.
//!
//! Ids are matched against both the persisted id attribute and the temporary
//! client id of every block, in document order. The first match wins, so a
//! duplicated id always resolves to its earliest occurrence.

use crate::tree::{BlockTree, Location};
use redline_commands::ParagraphId;
use std::collections::HashMap;

/// Outcome of resolving an id that may name a page not yet created
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Found(Location),

    /// `p<N>-1` with N beyond the last existing page
    VirtualPage { page: u32 },

    Missing,
}

/// Locate the first block answering to `id`
pub fn resolve<T: BlockTree>(tree: &T, id: &ParagraphId) -> Option<Location> {
    let needle = id.to_string();
    tree.blocks()
        .find(|(_, block)| block.answers_to(&needle))
        .map(|(at, _)| at)
}

/// Resolve `id`, treating the first block of a not-yet-existing page as virtual
pub fn resolve_target<T: BlockTree>(tree: &T, id: &ParagraphId) -> Resolution {
    if let Some(at) = resolve(tree, id) {
        return Resolution::Found(at);
    }

    match id.first_of_page() {
        Some(page) if tree.max_page_number().map_or(true, |max| page > max) => {
            Resolution::VirtualPage { page }
        }
        _ => Resolution::Missing,
    }
}

/// Document-order position among all blocks (0-based)
pub fn ordinal_of<T: BlockTree>(tree: &T, id: &str) -> Option<usize> {
    tree.blocks().position(|(_, block)| block.answers_to(id))
}

/// Ids carried by more than one block, in order of first repetition
pub fn duplicate_ids<T: BlockTree>(tree: &T) -> Vec<String> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut duplicates = Vec::new();

    for (_, block) in tree.blocks() {
        for id in [block.id.as_deref(), block.temp_id.as_deref()]
            .into_iter()
            .flatten()
        {
            let count = counts.entry(id).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(id.to_string());
            }
        }
    }

    duplicates
}
