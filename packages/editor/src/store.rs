//! # Block Store
//!
//! Ordered block sequence plus the id generator that owns block identity.
//! Vector order is rendering order.
//!
//! The store never accepts caller-chosen ids for new blocks: every id comes
//! from [`IdGenerator`] and is checked against the blocks already present, so
//! loading a document whose ids happen to collide with the generator's
//! sequence cannot produce duplicates.

use crate::block::{Block, BlockId, BlockKind};

pub const DEFAULT_ID_SEED: &str = "block";

/// Sequential id generator for blocks within a document
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::from_seed(DEFAULT_ID_SEED)
    }

    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential id
    pub fn new_id(&mut self) -> BlockId {
        self.count += 1;
        BlockId::new(format!("{}-{}", self.seed, self.count))
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockStore {
    blocks: Vec<Block>,
    ids: IdGenerator,
}

impl BlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt an existing block sequence (e.g. one fetched from the document service)
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            ids: IdGenerator::new(),
        }
    }

    /// Deep-copy `blocks`, giving every copy a fresh store-owned id
    pub fn from_template(blocks: &[Block]) -> Self {
        let mut store = Self::new();
        for block in blocks {
            let mut copy = block.clone();
            copy.id = store.fresh_id();
            store.blocks.push(copy);
        }
        store
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn get(&self, id: &BlockId) -> Option<&Block> {
        self.blocks.iter().find(|b| &b.id == id)
    }

    pub fn get_mut(&mut self, id: &BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|b| &b.id == id)
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.blocks.iter().position(|b| &b.id == id)
    }

    pub fn contains(&self, id: &BlockId) -> bool {
        self.index_of(id).is_some()
    }

    /// Next generated id that is not already in use
    pub fn fresh_id(&mut self) -> BlockId {
        loop {
            let id = self.ids.new_id();
            if !self.contains(&id) {
                return id;
            }
        }
    }

    /// Insert a new block at `position` (clamped to `0..=len`, default append).
    ///
    /// Returns the generated id and the index the block landed at.
    pub fn insert(
        &mut self,
        position: Option<usize>,
        kind: BlockKind,
        content: String,
    ) -> (BlockId, usize) {
        let id = self.fresh_id();
        let index = position.map_or(self.blocks.len(), |p| p.min(self.blocks.len()));

        self.blocks.insert(index, Block::new(id.clone(), kind).with_content(content));
        (id, index)
    }

    /// Put a previously removed block back. Refuses ids already present.
    pub fn restore(&mut self, index: usize, block: Block) -> Option<usize> {
        if self.contains(&block.id) {
            return None;
        }

        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
        Some(index)
    }

    /// Swap a block in place for a new version with the same id
    pub fn replace(&mut self, block: Block) -> Option<Block> {
        let slot = self.get_mut(&block.id)?;
        Some(std::mem::replace(slot, block))
    }

    pub fn remove(&mut self, id: &BlockId) -> Option<(usize, Block)> {
        let index = self.index_of(id)?;
        Some((index, self.blocks.remove(index)))
    }

    /// Swap with the predecessor. `false` at the first position or for an absent id.
    pub fn swap_with_previous(&mut self, id: &BlockId) -> bool {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                self.blocks.swap(index, index - 1);
                true
            }
            _ => false,
        }
    }

    /// Swap with the successor. `false` at the last position or for an absent id.
    pub fn swap_with_next(&mut self, id: &BlockId) -> bool {
        match self.index_of(id) {
            Some(index) if index + 1 < self.blocks.len() => {
                self.blocks.swap(index, index + 1);
                true
            }
            _ => false,
        }
    }

    /// Ids that occur more than once, in first-seen order
    pub fn duplicate_ids(&self) -> Vec<BlockId> {
        let mut seen = std::collections::HashSet::new();
        let mut duplicates = Vec::new();

        for block in &self.blocks {
            if !seen.insert(&block.id) && !duplicates.contains(&block.id) {
                duplicates.push(block.id.clone());
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    fn ids(store: &BlockStore) -> Vec<&str> {
        store.blocks().iter().map(|b| b.id.as_str()).collect()
    }

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::from_seed("doc");

        assert_eq!(gen.new_id().as_str(), "doc-1");
        assert_eq!(gen.new_id().as_str(), "doc-2");
        assert_eq!(gen.seed(), "doc");
    }

    #[test]
    fn test_insert_clamps_position() {
        let mut store = BlockStore::new();
        let (_, first) = store.insert(None, BlockKind::Paragraph, "a".into());
        let (_, far) = store.insert(Some(99), BlockKind::Paragraph, "b".into());
        let (_, front) = store.insert(Some(0), BlockKind::Quote, "c".into());

        assert_eq!((first, far, front), (0, 1, 0));
        assert_eq!(store.blocks()[0].content, "c");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_fresh_id_skips_loaded_ids() {
        let mut store = BlockStore::from_blocks(vec![
            Block::new("block-1", BlockKind::Paragraph),
            Block::new("block-2", BlockKind::Paragraph),
        ]);

        let (id, _) = store.insert(None, BlockType::Heading.default_kind(), String::new());
        assert_eq!(id.as_str(), "block-3");
        assert!(store.duplicate_ids().is_empty());
    }

    #[test]
    fn test_swaps_are_noops_at_boundaries() {
        let mut store = BlockStore::new();
        let (a, _) = store.insert(None, BlockKind::Paragraph, String::new());
        let (b, _) = store.insert(None, BlockKind::Paragraph, String::new());

        assert!(!store.swap_with_previous(&a));
        assert!(!store.swap_with_next(&b));
        assert!(!store.swap_with_next(&BlockId::from("missing")));
        assert_eq!(ids(&store), vec!["block-1", "block-2"]);

        assert!(store.swap_with_next(&a));
        assert_eq!(ids(&store), vec!["block-2", "block-1"]);
    }

    #[test]
    fn test_restore_refuses_duplicates() {
        let mut store = BlockStore::new();
        let (a, _) = store.insert(None, BlockKind::Paragraph, String::new());
        let (_, removed) = store.remove(&a).unwrap();

        assert_eq!(store.restore(5, removed.clone()), Some(0));
        assert_eq!(store.restore(0, removed), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_template_copy_gets_fresh_ids() {
        let template = vec![
            Block::new("default-1", BlockKind::heading(1)).with_content("Plan"),
            Block::new("default-2", BlockKind::Paragraph).with_content("Intro"),
        ];

        let store = BlockStore::from_template(&template);
        assert_eq!(ids(&store), vec!["block-1", "block-2"]);
        assert_eq!(store.blocks()[0].content, "Plan");
        assert_eq!(template[0].id.as_str(), "default-1");
    }

    #[test]
    fn test_duplicate_ids_reported_once() {
        let store = BlockStore::from_blocks(vec![
            Block::new("x", BlockKind::Paragraph),
            Block::new("x", BlockKind::Paragraph),
            Block::new("x", BlockKind::Quote),
        ]);

        assert_eq!(store.duplicate_ids(), vec![BlockId::from("x")]);
    }
}
