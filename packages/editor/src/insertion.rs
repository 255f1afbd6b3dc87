//! # Resource Insertion
//!
//! Turns a library resource (dragged from the sidebar or clicked) into a
//! block at the right position.
//!
//! ```text
//! drag payload ─▶ Resource ─▶ insertion index ─▶ AddBlock mutation ─▶ Notice
//!                               ▲
//!        block bounds + pointer ┘ (or selection + 1, or end)
//! ```
//!
//! The populated block kind is built before the mutation, so an insertion is
//! a single `AddBlock` and therefore a single undo step.

use crate::block::{BlockId, BlockKind};
use crate::document::EditorDocument;
use crate::errors::{EditorError, Result};
use crate::mutations::Mutation;
use serde::{Deserialize, Serialize};

/// Vertical extent of a rendered block, in editor coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockBounds {
    pub id: BlockId,
    pub top: f64,
    pub height: f64,
}

impl BlockBounds {
    pub fn new(id: impl Into<BlockId>, top: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            top,
            height,
        }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Index of the first block whose midpoint lies below the pointer,
/// or `bounds.len()` when the pointer is past every midpoint.
pub fn compute_insertion_index(bounds: &[BlockBounds], pointer_y: f64) -> usize {
    bounds
        .iter()
        .position(|b| pointer_y < b.midpoint())
        .unwrap_or(bounds.len())
}

/// Where an inserted resource should land
#[derive(Debug, Clone, PartialEq)]
pub enum InsertionPoint {
    /// Drop with pointer context
    Pointer {
        bounds: Vec<BlockBounds>,
        pointer_y: f64,
    },
    /// After the selected block, or at the end without a selection
    AfterSelection,
    Index(usize),
}

impl InsertionPoint {
    pub fn resolve(&self, doc: &EditorDocument) -> usize {
        match self {
            InsertionPoint::Pointer { bounds, pointer_y } => {
                compute_insertion_index(bounds, *pointer_y)
            }
            InsertionPoint::AfterSelection => doc
                .selected_index()
                .map_or(doc.blocks().len(), |index| index + 1),
            InsertionPoint::Index(index) => *index,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Image,
    Video,
    Document,
    Quiz,
}

impl ResourceType {
    pub fn label(self) -> &'static str {
        match self {
            ResourceType::Image => "Image",
            ResourceType::Video => "Video",
            ResourceType::Document => "Document",
            ResourceType::Quiz => "Quiz",
        }
    }
}

/// Item of the resource library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ResourceType,
    pub url: String,
}

impl Resource {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: ResourceType,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            url: url.into(),
        }
    }

    /// Decode the JSON a drag source attaches to the drag event
    pub fn from_drag_payload(payload: &str) -> Result<Self> {
        serde_json::from_str(payload).map_err(|e| EditorError::MalformedPayload(e.to_string()))
    }

    /// Block kind and content the resource becomes
    pub fn to_block(&self) -> (BlockKind, String) {
        match self.kind {
            ResourceType::Image => (
                BlockKind::image(&self.url, &self.name, Some(self.name.clone())),
                String::new(),
            ),
            ResourceType::Video | ResourceType::Document | ResourceType::Quiz => {
                (BlockKind::Paragraph, link_markup(&self.url, &self.name))
            }
        }
    }
}

/// Toast shown after an insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
}

impl Notice {
    fn added(resource: &Resource) -> Self {
        let label = resource.kind.label();
        Self {
            title: format!("{} added", label),
            description: format!(
                "The {} \"{}\" was added to the document.",
                label.to_lowercase(),
                resource.name
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Insertion {
    pub block_id: BlockId,
    pub index: usize,
    pub notice: Notice,
}

fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn link_markup(url: &str, name: &str) -> String {
    format!(
        r#"<a href="{}" target="_blank">{}</a>"#,
        html_escape(url),
        html_escape(name)
    )
}

/// The `AddBlock` that inserts `resource` at `index`
pub fn resource_mutation(resource: &Resource, index: usize) -> Mutation {
    let (kind, content) = resource.to_block();
    Mutation::AddBlock {
        kind,
        position: Some(index),
        content,
    }
}

pub fn insert_resource(
    doc: &mut EditorDocument,
    resource: &Resource,
    point: &InsertionPoint,
) -> Result<Insertion> {
    let index = point.resolve(doc);
    let result = doc.apply(resource_mutation(resource, index))?;

    let block_id = result.block_id.ok_or_else(|| {
        EditorError::MalformedPayload(format!("resource {} produced no block", resource.id))
    })?;
    let index = doc.index_of(&block_id).unwrap_or(index);

    tracing::info!(
        resource = %resource.id,
        block = %block_id,
        index,
        "Inserted resource"
    );

    Ok(Insertion {
        block_id,
        index,
        notice: Notice::added(resource),
    })
}

/// Drop handler: decode the payload, then insert. Nothing changes on a bad payload.
pub fn handle_drop(
    doc: &mut EditorDocument,
    payload: &str,
    point: &InsertionPoint,
) -> Result<Insertion> {
    let resource = Resource::from_drag_payload(payload).map_err(|e| {
        tracing::error!("Error during drop: {}", e);
        e
    })?;

    insert_resource(doc, &resource, point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockType;

    fn three_blocks() -> Vec<BlockBounds> {
        vec![
            BlockBounds::new("a", 0.0, 40.0),
            BlockBounds::new("b", 40.0, 40.0),
            BlockBounds::new("c", 80.0, 40.0),
        ]
    }

    #[test]
    fn test_compute_insertion_index() {
        let bounds = three_blocks();

        assert_eq!(compute_insertion_index(&bounds, 0.0), 0);
        assert_eq!(compute_insertion_index(&bounds, 19.9), 0);
        assert_eq!(compute_insertion_index(&bounds, 20.0), 1);
        assert_eq!(compute_insertion_index(&bounds, 70.0), 2);
        assert_eq!(compute_insertion_index(&bounds, 500.0), 3);
        assert_eq!(compute_insertion_index(&[], 10.0), 0);
    }

    #[test]
    fn test_image_resource_inserted_at_pointer() {
        let mut doc = EditorDocument::new();
        doc.add_block(BlockType::Paragraph, None);
        doc.set_dirty(false);

        let resource = Resource::new("r1", "Cell diagram", ResourceType::Image, "/img/cell.png");
        let point = InsertionPoint::Pointer {
            bounds: three_blocks(),
            pointer_y: 30.0,
        };

        let insertion = insert_resource(&mut doc, &resource, &point).unwrap();

        assert_eq!(insertion.index, 1);
        assert_eq!(doc.blocks().len(), 4);
        assert_eq!(
            doc.blocks()[1].kind,
            BlockKind::image(
                "/img/cell.png",
                "Cell diagram",
                Some("Cell diagram".to_string())
            )
        );
        assert!(doc.is_dirty());
        assert_eq!(insertion.notice.title, "Image added");
    }

    #[test]
    fn test_link_resource_is_escaped_paragraph() {
        let mut doc = EditorDocument::new();
        let resource = Resource::new("r2", "Q&A <intro>", ResourceType::Quiz, "/q?a=1&b=2");

        let insertion = insert_resource(&mut doc, &resource, &InsertionPoint::AfterSelection).unwrap();
        let block = doc.block(&insertion.block_id).unwrap();

        assert_eq!(insertion.index, 2);
        assert_eq!(block.block_type(), BlockType::Paragraph);
        assert_eq!(
            block.content,
            r#"<a href="/q?a=1&amp;b=2" target="_blank">Q&amp;A &lt;intro&gt;</a>"#
        );
    }

    #[test]
    fn test_after_selection() {
        let mut doc = EditorDocument::new();
        let first = doc.blocks()[0].id.clone();
        doc.select_block(Some(&first));

        assert_eq!(InsertionPoint::AfterSelection.resolve(&doc), 1);
    }

    #[test]
    fn test_malformed_drop_changes_nothing() {
        let mut doc = EditorDocument::new();
        let before = doc.blocks().to_vec();

        let err = handle_drop(&mut doc, "{\"name\": 3}", &InsertionPoint::AfterSelection)
            .unwrap_err();

        assert!(matches!(err, EditorError::MalformedPayload(_)));
        assert_eq!(doc.blocks(), before.as_slice());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_drop_payload_shape() {
        let payload = r#"{"id":"v1","name":"Lecture","type":"video","url":"https://x/v.mp4"}"#;
        let mut doc = EditorDocument::new();

        let insertion = handle_drop(&mut doc, payload, &InsertionPoint::Index(0)).unwrap();
        assert_eq!(insertion.index, 0);
        assert_eq!(insertion.notice.title, "Video added");
    }
}
