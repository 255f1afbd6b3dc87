//! # Undo/Redo Stack
//!
//! Tracks mutation history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each applied mutation yields its inverse and a replay form
//! - Undo applies the inverses and moves the batch to the redo stack
//! - Redo applies the replay forms, so regenerated ids stay identical
//! - New mutations clear the redo stack
//! - Mutations that change nothing are not recorded
//! - Batches group several mutations into one undo step
//! - A batch that fails midway is rolled back and stays on its stack
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//! let mut doc = EditorDocument::new();
//!
//! stack.apply(Mutation::add(BlockKind::Quote, None), &mut doc)?;
//! stack.undo(&mut doc)?;
//! stack.redo(&mut doc)?;
//! ```

use crate::config::EditorConfig;
use crate::document::EditorDocument;
use crate::mutations::{Mutation, MutationError, MutationResult};

pub const DEFAULT_UNDO_LEVELS: usize = 100;

/// A group of mutations that should be undone/redone together
#[derive(Debug, Clone)]
pub struct MutationBatch {
    /// Replay forms, in application order
    pub mutations: Vec<Mutation>,

    /// Inverses, in reverse order for undo
    pub inverses: Vec<Mutation>,

    pub description: Option<String>,
}

impl MutationBatch {
    pub fn single(mutation: Mutation, inverse: Mutation) -> Self {
        Self {
            mutations: vec![mutation],
            inverses: vec![inverse],
            description: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            mutations: Vec::new(),
            inverses: Vec::new(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Undo/redo history for one editor document
#[derive(Debug)]
pub struct UndoStack {
    undo_stack: Vec<MutationBatch>,

    redo_stack: Vec<MutationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    current_batch: Option<MutationBatch>,
}

impl UndoStack {
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_UNDO_LEVELS)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// History depth taken from `undoLevels`
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::with_max_levels(config.undo_levels)
    }

    /// Apply a mutation and record it for undo
    pub fn apply(
        &mut self,
        mutation: Mutation,
        doc: &mut EditorDocument,
    ) -> Result<MutationResult, MutationError> {
        let result = doc.apply(mutation)?;

        let Some(inverse) = result.inverse.clone() else {
            return Ok(result);
        };

        if let Some(batch) = &mut self.current_batch {
            batch.mutations.push(result.replay.clone());
            batch.inverses.insert(0, inverse);
        } else {
            self.push_batch(MutationBatch::single(result.replay.clone(), inverse));
        }

        Ok(result)
    }

    /// Start a batch of mutations (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        self.current_batch = Some(MutationBatch::empty());
    }

    pub fn end_batch(&mut self) {
        if let Some(batch) = self.current_batch.take() {
            if !batch.mutations.is_empty() {
                self.push_batch(batch);
            }
        }
    }

    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    fn push_batch(&mut self, batch: MutationBatch) {
        self.undo_stack.push(batch);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        self.redo_stack.clear();
    }

    /// Undo the most recent batch. `false` when there is nothing to undo.
    pub fn undo(&mut self, doc: &mut EditorDocument) -> Result<bool, MutationError> {
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        if let Err(e) = apply_all(&batch.inverses, doc) {
            self.undo_stack.push(batch);
            return Err(e);
        }

        tracing::debug!(steps = batch.inverses.len(), "Undo");
        self.redo_stack.push(batch);
        Ok(true)
    }

    /// Redo the most recently undone batch. `false` when there is nothing to redo.
    pub fn redo(&mut self, doc: &mut EditorDocument) -> Result<bool, MutationError> {
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if let Err(e) = apply_all(&batch.mutations, doc) {
            self.redo_stack.push(batch);
            return Err(e);
        }

        tracing::debug!(steps = batch.mutations.len(), "Redo");
        self.undo_stack.push(batch);
        Ok(true)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop all history (after loading or resetting the document)
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

/// Apply `mutations` in order, reverting the applied prefix if one fails
fn apply_all(mutations: &[Mutation], doc: &mut EditorDocument) -> Result<(), MutationError> {
    let mut applied = Vec::new();

    for mutation in mutations {
        match doc.apply(mutation.clone()) {
            Ok(result) => applied.extend(result.inverse),
            Err(e) => {
                tracing::warn!(op = mutation.name(), "Batch step failed, rolling back: {}", e);
                for inverse in applied.into_iter().rev() {
                    if let Err(rollback) = doc.apply(inverse) {
                        tracing::error!("Rollback failed: {}", rollback);
                    }
                }
                return Err(e);
            }
        }
    }

    Ok(())
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{Block, BlockId, BlockKind};
    use crate::mutations::{BlockPatch, KindPatch};

    fn contents(doc: &EditorDocument) -> Vec<String> {
        doc.blocks().iter().map(|b| b.content.clone()).collect()
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_apply_undo_redo_update() {
        let mut doc = EditorDocument::new();
        let mut stack = UndoStack::new();
        let id = doc.blocks()[1].id.clone();
        let before = contents(&doc);

        stack
            .apply(Mutation::update(id.clone(), BlockPatch::content("World")), &mut doc)
            .unwrap();
        assert_eq!(doc.block(&id).unwrap().content, "World");

        assert!(stack.undo(&mut doc).unwrap());
        assert_eq!(contents(&doc), before);
        assert!(stack.can_redo());

        assert!(stack.redo(&mut doc).unwrap());
        assert_eq!(doc.block(&id).unwrap().content, "World");
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_redo_add_keeps_id() {
        let mut doc = EditorDocument::new();
        let mut stack = UndoStack::new();

        let added = stack
            .apply(Mutation::add(BlockKind::Quote, Some(0)), &mut doc)
            .unwrap()
            .block_id
            .unwrap();

        stack.undo(&mut doc).unwrap();
        assert!(doc.block(&added).is_none());

        stack.redo(&mut doc).unwrap();
        assert_eq!(doc.blocks()[0].id, added);
    }

    #[test]
    fn test_batched_mutations() {
        let mut doc = EditorDocument::new();
        let mut stack = UndoStack::new();
        let before = contents(&doc);

        stack.begin_batch();
        stack.set_batch_description("Insert section");
        stack
            .apply(Mutation::add(BlockKind::heading(2), None), &mut doc)
            .unwrap();
        stack
            .apply(Mutation::add(BlockKind::Paragraph, None), &mut doc)
            .unwrap();
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Insert section"));

        stack.undo(&mut doc).unwrap();
        assert_eq!(contents(&doc), before);
    }

    #[test]
    fn test_unchanged_not_recorded() {
        let mut doc = EditorDocument::new();
        let mut stack = UndoStack::new();
        let first = doc.blocks()[0].id.clone();

        stack
            .apply(Mutation::MoveBlockUp { id: first }, &mut doc)
            .unwrap();
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_new_mutation_clears_redo() {
        let mut doc = EditorDocument::new();
        let mut stack = UndoStack::new();

        stack
            .apply(Mutation::add(BlockKind::Quote, None), &mut doc)
            .unwrap();
        stack.undo(&mut doc).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        stack
            .apply(Mutation::add(BlockKind::Paragraph, None), &mut doc)
            .unwrap();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = EditorDocument::new();
        let mut stack = UndoStack::with_max_levels(2);
        let id = doc.blocks()[1].id.clone();

        for i in 0..3 {
            stack
                .apply(
                    Mutation::update(id.clone(), BlockPatch::content(format!("Text {}", i))),
                    &mut doc,
                )
                .unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
    }

    #[test]
    fn test_from_config_limits_levels() {
        let config = EditorConfig {
            undo_levels: 2,
            ..EditorConfig::default()
        };
        let mut doc = EditorDocument::new();
        let mut stack = UndoStack::from_config(&config);

        for _ in 0..4 {
            stack
                .apply(Mutation::add(BlockKind::Quote, None), &mut doc)
                .unwrap();
        }

        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(
            UndoStack::from_config(&EditorConfig::default()).max_levels,
            DEFAULT_UNDO_LEVELS
        );
    }

    #[test]
    fn test_undo_restores_loaded_block_with_out_of_range_level() {
        let mut doc = EditorDocument::from_blocks(
            "Imported",
            vec![Block::new("h", BlockKind::heading(9)).with_content("old")],
        );
        let mut stack = UndoStack::new();
        let id = BlockId::from("h");

        stack
            .apply(Mutation::update("h", BlockPatch::content("new")), &mut doc)
            .unwrap();

        assert!(stack.undo(&mut doc).unwrap());
        assert_eq!(doc.block(&id).unwrap().content, "old");
        assert_eq!(doc.block(&id).unwrap().kind, BlockKind::heading(9));
        assert!(stack.can_redo());
    }

    #[test]
    fn test_failed_redo_rolls_back_and_keeps_batch() {
        let mut doc = EditorDocument::new();
        let mut stack = UndoStack::new();
        let heading = doc.blocks()[0].id.clone();
        let paragraph = doc.blocks()[1].id.clone();
        let before = contents(&doc);

        stack.begin_batch();
        stack
            .apply(
                Mutation::update(paragraph.clone(), BlockPatch::content("Edited")),
                &mut doc,
            )
            .unwrap();
        stack
            .apply(
                Mutation::update(
                    heading.clone(),
                    BlockPatch::fields(KindPatch::Heading { level: Some(3) }),
                ),
                &mut doc,
            )
            .unwrap();
        stack.end_batch();
        stack.undo(&mut doc).unwrap();

        // converted outside the stack, so the heading patch no longer applies
        doc.set_block_kind(&heading, BlockKind::Paragraph).unwrap();

        let err = stack.redo(&mut doc).unwrap_err();
        assert!(matches!(err, MutationError::KindMismatch { .. }));
        assert_eq!(contents(&doc), before);
        assert!(stack.can_redo());
        assert!(!stack.can_undo());
    }
}
