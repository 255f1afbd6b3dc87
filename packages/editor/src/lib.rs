//! # Lectern Editor
//!
//! Core editing engine for Lectern course documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ UI events: toolbar, drops, shortcuts        │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditorDocument + mutations          │
//! │  - Serializable Mutation API                │
//! │  - Store-owned block ids                    │
//! │  - Selection + dirty tracking               │
//! │  - Undo/redo via inverse mutations          │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ persistence: autosave timer + bridge        │
//! │  - DocumentService / ActivityLog traits     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Blocks are a tagged union**: kind-specific fields live on their kind
//! 2. **The store owns identity**: callers never choose block ids
//! 3. **No-ops are not errors**: absent ids report `Unchanged` and stay clean
//! 4. **Services are injected**: nothing in the core reaches a global
//!
//! ## Usage
//!
//! ```rust,ignore
//! use lectern_editor::{BlockType, EditorDocument, MemoryDocumentService, PersistenceBridge};
//!
//! let mut doc = EditorDocument::new();
//! let id = doc.add_block(BlockType::Heading, None);
//! doc.update_block(&id, BlockPatch::content("Chapter 1"))?;
//!
//! let service = Arc::new(MemoryDocumentService::new());
//! let bridge = PersistenceBridge::new(service.clone(), service);
//! let remote_id = bridge.save(&mut doc).await?;
//! ```

pub mod autosave;
pub mod block;
pub mod config;
pub mod document;
mod errors;
pub mod import;
pub mod insertion;
pub mod memory;
pub mod mutations;
pub mod persistence;
pub mod qcm;
pub mod service;
pub mod store;
pub mod templates;
pub mod toolbar;
mod undo_stack;

pub use autosave::{Autosave, AutosaveEvent, AutosaveOptions, AutosaveState, SkipReason};
pub use block::{Alignment, Block, BlockId, BlockKind, BlockStyle, BlockType, ListFormat};
pub use config::EditorConfig;
pub use document::{EditorDocument, OutlineEntry, SaveReceipt, SaveRequest};
pub use errors::{EditorError, Result};
pub use import::{parse_document, parse_document_lenient, DetectedFormat, ImportError, ParsedDocument};
pub use insertion::{
    compute_insertion_index, handle_drop, insert_resource, BlockBounds, Insertion, InsertionPoint,
    Notice, Resource, ResourceType,
};
pub use memory::MemoryDocumentService;
pub use mutations::{BlockPatch, KindPatch, Mutation, MutationError, MutationOutcome, MutationResult};
pub use persistence::PersistenceBridge;
pub use qcm::{Qcm, QcmError, QcmOption, QcmType};
pub use service::{
    Activity, ActivityAction, ActivityLog, DocumentPayload, DocumentService, ServiceError,
    StoredDocument, Template, TemplateProvider,
};
pub use store::{BlockStore, IdGenerator};
pub use templates::BuiltinTemplates;
pub use toolbar::{Formatting, Shortcut};
pub use undo_stack::{MutationBatch, UndoStack};
