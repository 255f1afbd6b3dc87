//! # Editor Document
//!
//! In-memory editing state for one document: title, block store, selection,
//! dirty flag and save bookkeeping.
//!
//! ## Lifecycle
//!
//! ```text
//! new / template / load → mutate → save_request → (remote call) → complete_save
//!                            ↑                                         │
//!                            └──────── dirty again if edited ──────────┘
//! ```
//!
//! Every state change bumps `version`. A save captures the version in its
//! [`SaveRequest`]; [`EditorDocument::complete_save`] only clears the dirty
//! flag when no edit happened while the request was in flight.
//!
//! `create_new` and `load` start a new generation. A save that completes for
//! an older generation only releases the in-flight flag; it never hands the
//! old remote id to the new document.

use crate::block::{Block, BlockId, BlockKind, BlockType};
use crate::mutations::{BlockPatch, Mutation, MutationError, MutationOutcome, MutationResult};
use crate::service::{DocumentPayload, StoredDocument, Template};
use crate::store::BlockStore;
use chrono::{DateTime, Utc};

pub const UNTITLED: &str = "Untitled document";
pub const PLACEHOLDER_TEXT: &str = "Start writing your content here...";

/// Characters of the first paragraph kept in the preview
pub const PREVIEW_LENGTH: usize = 100;

/// Editable document state
#[derive(Debug, Clone)]
pub struct EditorDocument {
    /// Identity assigned by the document service after the first save
    remote_id: Option<String>,

    title: String,

    store: BlockStore,

    selected: Option<BlockId>,

    dirty: bool,

    /// Increments on each state change
    version: u64,

    /// Increments each time the editing state is discarded
    generation: u64,

    last_saved: Option<DateTime<Utc>>,

    last_error: Option<String>,

    save_in_flight: bool,
}

/// Snapshot handed to the persistence bridge
#[derive(Debug, Clone, PartialEq)]
pub struct SaveRequest {
    pub remote_id: Option<String>,
    pub payload: DocumentPayload,
    pub version: u64,
    pub generation: u64,
}

/// What the bridge reports back after a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReceipt {
    pub document_id: String,
    pub created: bool,
    pub saved_at: DateTime<Utc>,
    pub version: u64,
    pub generation: u64,
}

/// Entry of the structure navigator
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub id: BlockId,
    pub level: u8,
    pub text: String,
}

impl EditorDocument {
    /// Fresh document with the canonical two-block seed
    pub fn new() -> Self {
        let mut doc = Self {
            remote_id: None,
            title: UNTITLED.to_string(),
            store: BlockStore::new(),
            selected: None,
            dirty: false,
            version: 0,
            generation: 0,
            last_saved: None,
            last_error: None,
            save_in_flight: false,
        };
        doc.seed();
        doc
    }

    /// Deep copy of a template's blocks, with fresh ids. Unsaved, so dirty.
    pub fn from_template(template: &Template) -> Self {
        let mut doc = Self::new();
        doc.title = format!("New {}", template.title);
        doc.store = BlockStore::from_template(&template.blocks);
        doc.dirty = true;
        doc
    }

    pub fn from_stored(stored: StoredDocument) -> Self {
        let mut doc = Self::new();
        doc.replace_with(stored);
        doc
    }

    /// Build an unsaved document from a title and block list
    pub fn from_blocks(title: impl Into<String>, blocks: Vec<Block>) -> Self {
        let mut doc = Self::new();
        doc.title = title.into();
        doc.store = BlockStore::from_blocks(blocks);
        doc.dirty = true;
        doc
    }

    fn seed(&mut self) {
        self.store = BlockStore::new();
        self.store.insert(None, BlockKind::heading(1), UNTITLED.to_string());
        self.store
            .insert(None, BlockKind::Paragraph, PLACEHOLDER_TEXT.to_string());
    }

    /// Discard everything and start over from the seed
    pub fn create_new(&mut self) {
        self.remote_id = None;
        self.title = UNTITLED.to_string();
        self.seed();
        self.selected = None;
        self.dirty = false;
        self.last_saved = None;
        self.last_error = None;
        self.version += 1;
        self.generation += 1;
        tracing::debug!(generation = self.generation, "Created new document");
    }

    /// Replace the whole editing state with a document fetched from the service
    pub fn replace_with(&mut self, stored: StoredDocument) {
        self.remote_id = Some(stored.id);
        self.title = stored.title;
        self.store = BlockStore::from_blocks(stored.blocks);
        self.last_saved = Some(stored.last_modified);
        self.selected = None;
        self.dirty = false;
        self.last_error = None;
        self.version += 1;
        self.generation += 1;
    }

    // ===== Accessors =====

    pub fn remote_id(&self) -> Option<&str> {
        self.remote_id.as_deref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn blocks(&self) -> &[Block] {
        self.store.blocks()
    }

    pub fn store(&self) -> &BlockStore {
        &self.store
    }

    pub fn block(&self, id: &BlockId) -> Option<&Block> {
        self.store.get(id)
    }

    pub fn index_of(&self, id: &BlockId) -> Option<usize> {
        self.store.index_of(id)
    }

    pub fn selected_block_id(&self) -> Option<&BlockId> {
        self.selected.as_ref()
    }

    pub fn selected_block(&self) -> Option<&Block> {
        self.selected.as_ref().and_then(|id| self.store.get(id))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected.as_ref().and_then(|id| self.store.index_of(id))
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    // ===== Mutation API =====

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.touch();
        }
    }

    /// Force the dirty flag (e.g. after edits the store cannot see)
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
    }

    /// Apply a mutation; marks dirty only when something changed
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, MutationError> {
        let result = mutation.apply(&mut self.store)?;

        if result.outcome.is_applied() {
            self.touch();
            tracing::debug!(
                op = mutation.name(),
                version = self.version,
                "Applied mutation"
            );

            match &mutation {
                Mutation::AddBlock { .. } => self.selected = result.block_id.clone(),
                Mutation::DeleteBlock { id } if self.selected.as_ref() == Some(id) => {
                    self.selected = None
                }
                _ => {}
            }
        } else {
            tracing::debug!(op = mutation.name(), "Mutation left document unchanged");
        }

        Ok(result)
    }

    /// Insert a block of `block_type` with default fields and select it
    pub fn add_block(&mut self, block_type: BlockType, position: Option<usize>) -> BlockId {
        let kind = block_type.default_kind();
        match self.add_block_with(kind.clone(), String::new(), position) {
            Ok(id) => id,
            Err(e) => {
                // Default kinds always validate
                tracing::error!("Unexpected insert failure: {}", e);
                let (id, _) = self.store.insert(position, kind, String::new());
                self.selected = Some(id.clone());
                self.touch();
                id
            }
        }
    }

    /// Insert a fully populated block and select it
    pub fn add_block_with(
        &mut self,
        kind: BlockKind,
        content: impl Into<String>,
        position: Option<usize>,
    ) -> Result<BlockId, MutationError> {
        let result = self.apply(Mutation::AddBlock {
            kind,
            position,
            content: content.into(),
        })?;

        result.block_id.ok_or_else(|| {
            MutationError::InvalidStructure("insert produced no block".to_string())
        })
    }

    pub fn update_block(
        &mut self,
        id: &BlockId,
        patch: BlockPatch,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::UpdateBlock {
            id: id.clone(),
            patch,
        })
        .map(|r| r.outcome)
    }

    pub fn set_block_kind(
        &mut self,
        id: &BlockId,
        kind: BlockKind,
    ) -> Result<MutationOutcome, MutationError> {
        self.apply(Mutation::SetBlockKind {
            id: id.clone(),
            kind,
        })
        .map(|r| r.outcome)
    }

    pub fn delete_block(&mut self, id: &BlockId) -> MutationOutcome {
        self.infallible(Mutation::DeleteBlock { id: id.clone() })
    }

    pub fn move_block_up(&mut self, id: &BlockId) -> MutationOutcome {
        self.infallible(Mutation::MoveBlockUp { id: id.clone() })
    }

    pub fn move_block_down(&mut self, id: &BlockId) -> MutationOutcome {
        self.infallible(Mutation::MoveBlockDown { id: id.clone() })
    }

    /// Delete and moves never validate anything
    fn infallible(&mut self, mutation: Mutation) -> MutationOutcome {
        match self.apply(mutation) {
            Ok(result) => result.outcome,
            Err(e) => {
                tracing::error!("Unexpected mutation failure: {}", e);
                MutationOutcome::Unchanged
            }
        }
    }

    /// Set or clear the active block. Unknown ids are ignored.
    pub fn select_block(&mut self, id: Option<&BlockId>) -> MutationOutcome {
        match id {
            Some(id) if !self.store.contains(id) => MutationOutcome::Unchanged,
            Some(id) => {
                self.selected = Some(id.clone());
                MutationOutcome::Applied
            }
            None => {
                self.selected = None;
                MutationOutcome::Applied
            }
        }
    }

    fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    // ===== Derived views =====

    /// First paragraph's leading text
    pub fn preview(&self) -> String {
        self.store
            .blocks()
            .iter()
            .find(|b| b.block_type() == BlockType::Paragraph)
            .map(|b| b.content.chars().take(PREVIEW_LENGTH).collect())
            .unwrap_or_default()
    }

    pub fn payload(&self) -> DocumentPayload {
        DocumentPayload {
            title: self.title.clone(),
            blocks: self.store.blocks().to_vec(),
            preview: self.preview(),
        }
    }

    /// Heading blocks in document order
    pub fn outline(&self) -> Vec<OutlineEntry> {
        self.store
            .blocks()
            .iter()
            .filter_map(|b| {
                b.heading_level().map(|level| OutlineEntry {
                    id: b.id.clone(),
                    level,
                    text: b.content.clone(),
                })
            })
            .collect()
    }

    // ===== Save bookkeeping =====

    /// Snapshot the document for saving. `None` while another save is in flight.
    pub fn begin_save(&mut self) -> Option<SaveRequest> {
        if self.save_in_flight {
            return None;
        }

        self.save_in_flight = true;
        self.last_error = None;
        Some(SaveRequest {
            remote_id: self.remote_id.clone(),
            payload: self.payload(),
            version: self.version,
            generation: self.generation,
        })
    }

    pub fn complete_save(&mut self, receipt: &SaveReceipt) {
        self.save_in_flight = false;

        if receipt.generation != self.generation {
            tracing::debug!(
                id = %receipt.document_id,
                "Document replaced during save, ignoring receipt"
            );
            return;
        }

        self.remote_id = Some(receipt.document_id.clone());
        self.last_saved = Some(receipt.saved_at);

        if receipt.version == self.version {
            self.dirty = false;
        } else {
            tracing::debug!(
                saved = receipt.version,
                current = self.version,
                "Document edited during save, staying dirty"
            );
        }
    }

    /// Record a failed save. Errors from an older generation are dropped.
    pub fn fail_save(&mut self, generation: u64, error: &impl std::fmt::Display) {
        self.save_in_flight = false;
        if generation == self.generation {
            self.last_error = Some(error.to_string());
        }
    }

    pub fn record_error(&mut self, error: &impl std::fmt::Display) {
        self.last_error = Some(error.to_string());
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }
}

impl Default for EditorDocument {
    fn default() -> Self {
        Self::new()
    }
}
