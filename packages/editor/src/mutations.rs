//! # Block Mutations
//!
//! Serializable operations over the [`BlockStore`].
//!
//! ## Mutation Semantics
//!
//! ### Not found
//! - A mutation naming an absent block is a no-op, reported as
//!   [`MutationOutcome::Unchanged`], never an error
//! - Moving the first block up or the last block down is also a no-op
//!
//! ### UpdateBlock
//! - Content is replaced atomically, style fields overlay (last write wins)
//! - Type-specific fields must target the block's own kind; a heading level
//!   written onto a paragraph is rejected with [`MutationError::KindMismatch`]
//! - Validation runs before any write, so a rejected patch leaves the block untouched
//!
//! ### AddBlock
//! - Ids are generated by the store; callers learn the id from the result
//!
//! ### ReplaceBlock / RestoreBlock
//! - Put back a previously captured block as-is, without kind validation, so
//!   undo works on blocks that were loaded with out-of-range fields
//!
//! Every applied mutation yields its inverse so the undo stack can revert it,
//! and a replay form that reproduces exactly the same state (including the
//! generated id) on redo.

use crate::block::{Block, BlockId, BlockKind, BlockStyle, BlockType, ListFormat};
use crate::qcm::Qcm;
use crate::store::BlockStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Semantic block operations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Mutation {
    /// Insert a new block (clamped position, default append)
    AddBlock {
        kind: BlockKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        position: Option<usize>,
        #[serde(default)]
        content: String,
    },

    /// Merge a patch into an existing block
    UpdateBlock { id: BlockId, patch: BlockPatch },

    /// Convert a block to another kind, keeping content and style
    SetBlockKind { id: BlockId, kind: BlockKind },

    /// Replace a block wholesale (same id)
    ReplaceBlock { block: Block },

    DeleteBlock { id: BlockId },

    /// Re-insert a block with its original id
    RestoreBlock { index: usize, block: Block },

    MoveBlockUp { id: BlockId },

    MoveBlockDown { id: BlockId },
}

/// Partial update for a block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(default)]
    pub style: BlockStyle,

    /// Type-specific fields; must match the block's kind
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<KindPatch>,
}

/// Type-specific fields of a patch, one variant per kind that has any
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KindPatch {
    Heading {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<u8>,
    },
    List {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<ListFormat>,
    },
    Image {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
    Table {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rows: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cols: Option<u32>,
    },
    Qcm {
        #[serde(rename = "qcmData", default, skip_serializing_if = "Option::is_none")]
        qcm_data: Option<Qcm>,
    },
}

impl KindPatch {
    pub fn block_type(&self) -> BlockType {
        match self {
            KindPatch::Heading { .. } => BlockType::Heading,
            KindPatch::List { .. } => BlockType::List,
            KindPatch::Image { .. } => BlockType::Image,
            KindPatch::Table { .. } => BlockType::Table,
            KindPatch::Qcm { .. } => BlockType::Qcm,
        }
    }
}

impl BlockPatch {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    pub fn style(style: BlockStyle) -> Self {
        Self {
            style,
            ..Default::default()
        }
    }

    pub fn fields(fields: KindPatch) -> Self {
        Self {
            fields: Some(fields),
            ..Default::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_fields(mut self, fields: KindPatch) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.style.is_empty() && self.fields.is_none()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Block {id} is a {actual} block, patch targets {requested}")]
    KindMismatch {
        id: BlockId,
        actual: BlockType,
        requested: BlockType,
    },

    #[error("Heading level must be between 1 and 6, got {0}")]
    InvalidHeadingLevel(u8),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),
}

/// Whether a mutation changed the document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Unchanged,
}

impl MutationOutcome {
    pub fn is_applied(self) -> bool {
        self == MutationOutcome::Applied
    }
}

/// Result of applying a mutation
#[derive(Debug, Clone)]
pub struct MutationResult {
    pub outcome: MutationOutcome,

    /// Block created or restored by the mutation
    pub block_id: Option<BlockId>,

    /// Reverts the mutation (None when nothing changed)
    pub inverse: Option<Mutation>,

    /// Reproduces the applied state exactly on redo
    pub replay: Mutation,
}

impl MutationResult {
    fn unchanged(mutation: &Mutation) -> Self {
        Self {
            outcome: MutationOutcome::Unchanged,
            block_id: None,
            inverse: None,
            replay: mutation.clone(),
        }
    }

    fn applied(replay: Mutation, inverse: Mutation) -> Self {
        Self {
            outcome: MutationOutcome::Applied,
            block_id: None,
            inverse: Some(inverse),
            replay,
        }
    }
}

pub fn validate_kind(kind: &BlockKind) -> Result<(), MutationError> {
    match kind {
        BlockKind::Heading { level } => validate_level(*level),
        BlockKind::Table { rows, cols } => validate_table(*rows, *cols),
        _ => Ok(()),
    }
}

fn validate_level(level: u8) -> Result<(), MutationError> {
    if (1..=6).contains(&level) {
        Ok(())
    } else {
        Err(MutationError::InvalidHeadingLevel(level))
    }
}

fn validate_table(rows: u32, cols: u32) -> Result<(), MutationError> {
    if rows == 0 || cols == 0 {
        return Err(MutationError::InvalidStructure(format!(
            "table must have at least one row and column, got {}x{}",
            rows, cols
        )));
    }
    Ok(())
}

impl Mutation {
    pub fn add(kind: BlockKind, position: Option<usize>) -> Self {
        Mutation::AddBlock {
            kind,
            position,
            content: String::new(),
        }
    }

    pub fn update(id: impl Into<BlockId>, patch: BlockPatch) -> Self {
        Mutation::UpdateBlock {
            id: id.into(),
            patch,
        }
    }

    pub fn delete(id: impl Into<BlockId>) -> Self {
        Mutation::DeleteBlock { id: id.into() }
    }

    /// Debug name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::AddBlock { .. } => "AddBlock",
            Mutation::UpdateBlock { .. } => "UpdateBlock",
            Mutation::SetBlockKind { .. } => "SetBlockKind",
            Mutation::ReplaceBlock { .. } => "ReplaceBlock",
            Mutation::DeleteBlock { .. } => "DeleteBlock",
            Mutation::RestoreBlock { .. } => "RestoreBlock",
            Mutation::MoveBlockUp { .. } => "MoveBlockUp",
            Mutation::MoveBlockDown { .. } => "MoveBlockDown",
        }
    }

    /// Apply mutation to the store with validation
    pub fn apply(&self, store: &mut BlockStore) -> Result<MutationResult, MutationError> {
        match self {
            Mutation::AddBlock {
                kind,
                position,
                content,
            } => {
                validate_kind(kind)?;
                let (id, index) = store.insert(*position, kind.clone(), content.clone());

                let block = store
                    .get(&id)
                    .cloned()
                    .unwrap_or_else(|| Block::new(id.clone(), kind.clone()));
                let mut result = MutationResult::applied(
                    Mutation::RestoreBlock { index, block },
                    Mutation::DeleteBlock { id: id.clone() },
                );
                result.block_id = Some(id);
                Ok(result)
            }

            Mutation::UpdateBlock { id, patch } => Self::apply_update(store, id, patch, self),

            Mutation::SetBlockKind { id, kind } => {
                validate_kind(kind)?;
                let Some(block) = store.get_mut(id) else {
                    return Ok(MutationResult::unchanged(self));
                };

                let previous = block.clone();
                block.kind = kind.clone();
                Ok(MutationResult::applied(
                    self.clone(),
                    Mutation::ReplaceBlock { block: previous },
                ))
            }

            Mutation::ReplaceBlock { block } => {
                match store.replace(block.clone()) {
                    Some(previous) => Ok(MutationResult::applied(
                        self.clone(),
                        Mutation::ReplaceBlock { block: previous },
                    )),
                    None => Ok(MutationResult::unchanged(self)),
                }
            }

            Mutation::DeleteBlock { id } => match store.remove(id) {
                Some((index, block)) => Ok(MutationResult::applied(
                    self.clone(),
                    Mutation::RestoreBlock { index, block },
                )),
                None => Ok(MutationResult::unchanged(self)),
            },

            Mutation::RestoreBlock { index, block } => {
                match store.restore(*index, block.clone()) {
                    Some(_) => {
                        let mut result = MutationResult::applied(
                            self.clone(),
                            Mutation::DeleteBlock {
                                id: block.id.clone(),
                            },
                        );
                        result.block_id = Some(block.id.clone());
                        Ok(result)
                    }
                    None => Ok(MutationResult::unchanged(self)),
                }
            }

            Mutation::MoveBlockUp { id } => {
                if store.swap_with_previous(id) {
                    Ok(MutationResult::applied(
                        self.clone(),
                        Mutation::MoveBlockDown { id: id.clone() },
                    ))
                } else {
                    Ok(MutationResult::unchanged(self))
                }
            }

            Mutation::MoveBlockDown { id } => {
                if store.swap_with_next(id) {
                    Ok(MutationResult::applied(
                        self.clone(),
                        Mutation::MoveBlockUp { id: id.clone() },
                    ))
                } else {
                    Ok(MutationResult::unchanged(self))
                }
            }
        }
    }

    fn apply_update(
        store: &mut BlockStore,
        id: &BlockId,
        patch: &BlockPatch,
        mutation: &Mutation,
    ) -> Result<MutationResult, MutationError> {
        let Some(block) = store.get_mut(id) else {
            return Ok(MutationResult::unchanged(mutation));
        };

        if patch.is_empty() {
            return Ok(MutationResult::unchanged(mutation));
        }

        if let Some(fields) = &patch.fields {
            Self::validate_fields(block, fields)?;
        }

        let previous = block.clone();

        if let Some(content) = &patch.content {
            block.content = content.clone();
        }
        block.style.merge(&patch.style);
        if let Some(fields) = &patch.fields {
            Self::write_fields(&mut block.kind, fields);
        }

        Ok(MutationResult::applied(
            mutation.clone(),
            Mutation::ReplaceBlock { block: previous },
        ))
    }

    fn validate_fields(block: &Block, fields: &KindPatch) -> Result<(), MutationError> {
        let requested = fields.block_type();
        if block.block_type() != requested {
            return Err(MutationError::KindMismatch {
                id: block.id.clone(),
                actual: block.block_type(),
                requested,
            });
        }

        match fields {
            KindPatch::Heading { level: Some(level) } => validate_level(*level),
            KindPatch::Table { rows, cols } => {
                let (current_rows, current_cols) = match block.kind {
                    BlockKind::Table { rows, cols } => (rows, cols),
                    _ => (1, 1),
                };
                validate_table(rows.unwrap_or(current_rows), cols.unwrap_or(current_cols))
            }
            _ => Ok(()),
        }
    }

    /// Kinds already checked by `validate_fields`
    fn write_fields(kind: &mut BlockKind, fields: &KindPatch) {
        match (kind, fields) {
            (BlockKind::Heading { level }, KindPatch::Heading { level: new_level }) => {
                if let Some(l) = new_level {
                    *level = *l;
                }
            }
            (BlockKind::List { format }, KindPatch::List { format: new_format }) => {
                if let Some(f) = new_format {
                    *format = *f;
                }
            }
            (
                BlockKind::Image { url, alt, caption },
                KindPatch::Image {
                    url: new_url,
                    alt: new_alt,
                    caption: new_caption,
                },
            ) => {
                if let Some(u) = new_url {
                    *url = u.clone();
                }
                if let Some(a) = new_alt {
                    *alt = a.clone();
                }
                if let Some(c) = new_caption {
                    *caption = Some(c.clone());
                }
            }
            (BlockKind::Table { rows, cols }, KindPatch::Table { rows: r, cols: c }) => {
                if let Some(r) = r {
                    *rows = *r;
                }
                if let Some(c) = c {
                    *cols = *c;
                }
            }
            (BlockKind::Qcm { qcm_data }, KindPatch::Qcm { qcm_data: new_data }) => {
                if let Some(q) = new_data {
                    *qcm_data = q.clone();
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(kinds: &[BlockKind]) -> (BlockStore, Vec<BlockId>) {
        let mut store = BlockStore::new();
        let ids = kinds
            .iter()
            .map(|k| store.insert(None, k.clone(), String::new()).0)
            .collect();
        (store, ids)
    }

    #[test]
    fn test_mutation_serialization() {
        let mutation = Mutation::update(
            "block-1",
            BlockPatch::content("Hello").with_fields(KindPatch::Heading { level: Some(3) }),
        );

        let json = serde_json::to_string(&mutation).unwrap();
        let deserialized: Mutation = serde_json::from_str(&json).unwrap();

        assert_eq!(mutation, deserialized);
        assert!(json.contains("\"op\":\"updateBlock\""));
    }

    #[test]
    fn test_update_absent_block_is_unchanged() {
        let (mut store, _) = store_with(&[BlockKind::Paragraph]);
        let before = store.blocks().to_vec();

        let result = Mutation::update("nope", BlockPatch::content("x"))
            .apply(&mut store)
            .unwrap();

        assert_eq!(result.outcome, MutationOutcome::Unchanged);
        assert!(result.inverse.is_none());
        assert_eq!(store.blocks(), before.as_slice());
    }

    #[test]
    fn test_cross_kind_fields_rejected() {
        let (mut store, ids) = store_with(&[BlockKind::Paragraph]);

        let err = Mutation::update(
            ids[0].clone(),
            BlockPatch::content("changed").with_fields(KindPatch::Heading { level: Some(1) }),
        )
        .apply(&mut store)
        .unwrap_err();

        assert_eq!(
            err,
            MutationError::KindMismatch {
                id: ids[0].clone(),
                actual: BlockType::Paragraph,
                requested: BlockType::Heading,
            }
        );
        // no partial write
        assert_eq!(store.blocks()[0].content, "");
    }

    #[test]
    fn test_heading_level_validated() {
        let (mut store, ids) = store_with(&[BlockKind::heading(2)]);

        let err = Mutation::update(
            ids[0].clone(),
            BlockPatch::fields(KindPatch::Heading { level: Some(7) }),
        )
        .apply(&mut store)
        .unwrap_err();
        assert_eq!(err, MutationError::InvalidHeadingLevel(7));

        assert!(Mutation::add(BlockKind::heading(0), None)
            .apply(&mut store)
            .is_err());
    }

    #[test]
    fn test_image_fields_merge() {
        let (mut store, ids) = store_with(&[BlockType::Image.default_kind()]);

        Mutation::update(
            ids[0].clone(),
            BlockPatch::fields(KindPatch::Image {
                url: Some("/x.png".into()),
                alt: Some("Diagram".into()),
                caption: None,
            }),
        )
        .apply(&mut store)
        .unwrap();

        assert_eq!(
            store.blocks()[0].kind,
            BlockKind::image("/x.png", "Diagram", None)
        );
    }

    #[test]
    fn test_inverse_restores_previous_state() {
        let (mut store, ids) = store_with(&[BlockKind::Paragraph, BlockKind::Quote]);
        let before = store.blocks().to_vec();

        let result = Mutation::delete(ids[0].clone()).apply(&mut store).unwrap();
        assert_eq!(store.len(), 1);

        result.inverse.unwrap().apply(&mut store).unwrap();
        assert_eq!(store.blocks(), before.as_slice());
    }

    #[test]
    fn test_add_block_replay_keeps_generated_id() {
        let mut store = BlockStore::new();
        let result = Mutation::add(BlockKind::Paragraph, None)
            .apply(&mut store)
            .unwrap();
        let id = result.block_id.clone().unwrap();

        result.inverse.unwrap().apply(&mut store).unwrap();
        assert!(store.is_empty());

        result.replay.apply(&mut store).unwrap();
        assert_eq!(store.blocks()[0].id, id);
    }

    #[test]
    fn test_move_boundaries_unchanged() {
        let (mut store, ids) = store_with(&[BlockKind::Paragraph, BlockKind::Quote]);

        let up = Mutation::MoveBlockUp { id: ids[0].clone() }
            .apply(&mut store)
            .unwrap();
        let down = Mutation::MoveBlockDown { id: ids[1].clone() }
            .apply(&mut store)
            .unwrap();

        assert_eq!(up.outcome, MutationOutcome::Unchanged);
        assert_eq!(down.outcome, MutationOutcome::Unchanged);
        assert_eq!(store.blocks()[0].id, ids[0]);
    }

    #[test]
    fn test_set_block_kind_keeps_content() {
        let mut store = BlockStore::new();
        let (id, _) = store.insert(None, BlockKind::Paragraph, "Chapter".into());

        Mutation::SetBlockKind {
            id: id.clone(),
            kind: BlockKind::heading(2),
        }
        .apply(&mut store)
        .unwrap();

        let block = store.get(&id).unwrap();
        assert_eq!(block.heading_level(), Some(2));
        assert_eq!(block.content, "Chapter");
    }
}
