//! # Toolbar
//!
//! Formatting of the selected block, structured inserts and keyboard
//! shortcuts. Every action is expressed as a [`Mutation`] first, so callers
//! holding an [`crate::UndoStack`] can route it through history instead of
//! applying it directly.

use crate::block::{Alignment, BlockKind, BlockStyle, BlockType, ListFormat};
use crate::document::EditorDocument;
use crate::errors::{EditorError, Result};
use crate::insertion::{Insertion, InsertionPoint, Notice};
use crate::mutations::{BlockPatch, Mutation, MutationOutcome};
use crate::qcm::Qcm;

pub const DEFAULT_FONT_FAMILY: &str = "arial";
pub const DEFAULT_FONT_SIZE: &str = "16";
pub const DEFAULT_TEXT_COLOR: &str = "#000000";
pub const DEFAULT_BG_COLOR: &str = "transparent";
pub const DEFAULT_IMAGE_ALT: &str = "Image";

pub const LIST_PLACEHOLDER: &str = "List item";
pub const TABLE_CELL: &str = "Cell";

/// Swatches offered by the color pickers
pub const PREDEFINED_COLORS: [&str; 20] = [
    "#000000", "#5c5c5c", "#8a8a8a", "#cfcfcf", "#ffffff", "#ff0000", "#ff8000", "#ffff00",
    "#80ff00", "#00ff00", "#00ff80", "#00ffff", "#0080ff", "#0000ff", "#8000ff", "#ff00ff",
    "#ff0080", "#4a86e8", "#6aa84f", "#e69138",
];

/// Effective formatting of a block, style overrides resolved against defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Formatting {
    pub font_family: String,
    pub font_size: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub is_underline: bool,
    pub alignment: Alignment,
    pub text_color: String,
    pub bg_color: String,
}

impl Default for Formatting {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE.to_string(),
            is_bold: false,
            is_italic: false,
            is_underline: false,
            alignment: Alignment::Left,
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            bg_color: DEFAULT_BG_COLOR.to_string(),
        }
    }
}

impl Formatting {
    pub fn resolve(style: &BlockStyle) -> Self {
        let defaults = Self::default();
        Self {
            font_family: style.font_family.clone().unwrap_or(defaults.font_family),
            font_size: style.font_size.clone().unwrap_or(defaults.font_size),
            is_bold: style.is_bold.unwrap_or(false),
            is_italic: style.is_italic.unwrap_or(false),
            is_underline: style.is_underline.unwrap_or(false),
            alignment: style.alignment.unwrap_or_default(),
            text_color: style.text_color.clone().unwrap_or(defaults.text_color),
            bg_color: style.bg_color.clone().unwrap_or(defaults.bg_color),
        }
    }
}

/// Formatting of the selected block, defaults when nothing is selected
pub fn current_formatting(doc: &EditorDocument) -> Formatting {
    doc.selected_block()
        .map(|block| Formatting::resolve(&block.style))
        .unwrap_or_default()
}

pub fn formatting_mutation(doc: &EditorDocument, style: BlockStyle) -> Result<Mutation> {
    let id = doc.selected_block_id().ok_or(EditorError::NoSelection)?;
    Ok(Mutation::update(id.clone(), BlockPatch::style(style)))
}

/// Overlay `style` onto the selected block
pub fn apply_formatting(doc: &mut EditorDocument, style: BlockStyle) -> Result<MutationOutcome> {
    let mutation = formatting_mutation(doc, style)?;
    Ok(doc.apply(mutation)?.outcome)
}

pub fn toggle_bold(doc: &mut EditorDocument) -> Result<MutationOutcome> {
    let is_bold = !current_formatting(doc).is_bold;
    apply_formatting(
        doc,
        BlockStyle {
            is_bold: Some(is_bold),
            ..Default::default()
        },
    )
}

pub fn toggle_italic(doc: &mut EditorDocument) -> Result<MutationOutcome> {
    let is_italic = !current_formatting(doc).is_italic;
    apply_formatting(
        doc,
        BlockStyle {
            is_italic: Some(is_italic),
            ..Default::default()
        },
    )
}

pub fn toggle_underline(doc: &mut EditorDocument) -> Result<MutationOutcome> {
    let is_underline = !current_formatting(doc).is_underline;
    apply_formatting(
        doc,
        BlockStyle {
            is_underline: Some(is_underline),
            ..Default::default()
        },
    )
}

pub fn set_alignment(doc: &mut EditorDocument, alignment: Alignment) -> Result<MutationOutcome> {
    apply_formatting(
        doc,
        BlockStyle {
            alignment: Some(alignment),
            ..Default::default()
        },
    )
}

pub fn set_font_family(doc: &mut EditorDocument, family: &str) -> Result<MutationOutcome> {
    apply_formatting(
        doc,
        BlockStyle {
            font_family: Some(family.to_string()),
            ..Default::default()
        },
    )
}

pub fn set_font_size(doc: &mut EditorDocument, size: &str) -> Result<MutationOutcome> {
    apply_formatting(
        doc,
        BlockStyle {
            font_size: Some(size.to_string()),
            ..Default::default()
        },
    )
}

pub fn set_text_color(doc: &mut EditorDocument, color: &str) -> Result<MutationOutcome> {
    apply_formatting(
        doc,
        BlockStyle {
            text_color: Some(color.to_string()),
            ..Default::default()
        },
    )
}

pub fn set_bg_color(doc: &mut EditorDocument, color: &str) -> Result<MutationOutcome> {
    apply_formatting(
        doc,
        BlockStyle {
            bg_color: Some(color.to_string()),
            ..Default::default()
        },
    )
}

// ===== Structured inserts =====

/// HTML grid of `rows` x `cols` placeholder cells
pub fn table_markup(rows: u32, cols: u32) -> String {
    let mut html = String::from(r#"<table style="width:100%; border-collapse: collapse;">"#);
    for _ in 0..rows {
        html.push_str("<tr>");
        for _ in 0..cols {
            html.push_str(r#"<td style="border: 1px solid #ccc; padding: 8px;">"#);
            html.push_str(TABLE_CELL);
            html.push_str("</td>");
        }
        html.push_str("</tr>");
    }
    html.push_str("</table>");
    html
}

/// Three placeholder items with the format's prefix
pub fn list_markup(format: ListFormat) -> String {
    let item = format!("{}{}", format.item_prefix(), LIST_PLACEHOLDER);
    [item.as_str(); 3].join("\n")
}

fn insert_after_selection(
    doc: &mut EditorDocument,
    kind: BlockKind,
    content: String,
    notice: Notice,
) -> Result<Insertion> {
    let index = InsertionPoint::AfterSelection.resolve(doc);
    let block_id = doc.add_block_with(kind, content, Some(index))?;

    Ok(Insertion {
        block_id,
        index,
        notice,
    })
}

pub fn insert_image(doc: &mut EditorDocument, url: &str, alt: Option<&str>) -> Result<Insertion> {
    if url.trim().is_empty() {
        return Err(EditorError::MissingImageUrl);
    }

    let alt = alt.filter(|a| !a.trim().is_empty()).unwrap_or(DEFAULT_IMAGE_ALT);
    insert_after_selection(
        doc,
        BlockKind::image(url, alt, None),
        String::new(),
        Notice {
            title: "Image inserted".to_string(),
            description: "The image was inserted into the document.".to_string(),
        },
    )
}

pub fn insert_table(doc: &mut EditorDocument, rows: u32, cols: u32) -> Result<Insertion> {
    insert_after_selection(
        doc,
        BlockKind::Table { rows, cols },
        table_markup(rows, cols),
        Notice {
            title: "Table inserted".to_string(),
            description: format!("A {}×{} table was inserted into the document.", rows, cols),
        },
    )
}

pub fn insert_list(doc: &mut EditorDocument, format: ListFormat) -> Result<Insertion> {
    let label = match format {
        ListFormat::Ordered => "numbered",
        ListFormat::Unordered => "bulleted",
    };

    insert_after_selection(
        doc,
        BlockKind::List { format },
        list_markup(format),
        Notice {
            title: "List inserted".to_string(),
            description: format!("A {} list was inserted into the document.", label),
        },
    )
}

/// Validates the question, then inserts it with its JSON as content
pub fn insert_qcm(doc: &mut EditorDocument, qcm: Qcm) -> Result<Insertion> {
    qcm.validate()?;
    let content = serde_json::to_string(&qcm)?;

    insert_after_selection(
        doc,
        BlockKind::Qcm { qcm_data: qcm },
        content,
        Notice {
            title: "Question inserted".to_string(),
            description: "A multiple-choice question was inserted into the document.".to_string(),
        },
    )
}

// ===== Keyboard shortcuts =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Enter: new paragraph after the selected block
    NewParagraph,
    /// Delete: remove the selected block
    DeleteSelected,
}

impl Shortcut {
    /// `None` without a selection
    pub fn to_mutation(self, doc: &EditorDocument) -> Option<Mutation> {
        let id = doc.selected_block_id()?;

        match self {
            Shortcut::NewParagraph => {
                let index = doc.index_of(id)?;
                Some(Mutation::add(
                    BlockType::Paragraph.default_kind(),
                    Some(index + 1),
                ))
            }
            Shortcut::DeleteSelected => Some(Mutation::delete(id.clone())),
        }
    }
}

pub fn apply_shortcut(doc: &mut EditorDocument, shortcut: Shortcut) -> Result<MutationOutcome> {
    match shortcut.to_mutation(doc) {
        Some(mutation) => Ok(doc.apply(mutation)?.outcome),
        None => Ok(MutationOutcome::Unchanged),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qcm::{QcmOption, QcmType};

    fn selected_doc() -> EditorDocument {
        let mut doc = EditorDocument::new();
        let id = doc.blocks()[0].id.clone();
        doc.select_block(Some(&id));
        doc
    }

    #[test]
    fn test_default_formatting_without_selection() {
        let doc = EditorDocument::new();
        let formatting = current_formatting(&doc);

        assert_eq!(formatting.font_family, "arial");
        assert_eq!(formatting.font_size, "16");
        assert_eq!(formatting.alignment, Alignment::Left);
        assert_eq!(formatting.bg_color, "transparent");
    }

    #[test]
    fn test_formatting_requires_selection() {
        let mut doc = EditorDocument::new();
        assert!(matches!(
            toggle_bold(&mut doc),
            Err(EditorError::NoSelection)
        ));
        assert!(!doc.is_dirty());
    }

    #[test]
    fn test_toggle_bold_twice() {
        let mut doc = selected_doc();

        toggle_bold(&mut doc).unwrap();
        assert!(current_formatting(&doc).is_bold);

        toggle_bold(&mut doc).unwrap();
        assert!(!current_formatting(&doc).is_bold);
        assert!(doc.is_dirty());
    }

    #[test]
    fn test_style_fields_overlay() {
        let mut doc = selected_doc();

        set_alignment(&mut doc, Alignment::Center).unwrap();
        set_text_color(&mut doc, PREDEFINED_COLORS[5]).unwrap();

        let formatting = current_formatting(&doc);
        assert_eq!(formatting.alignment, Alignment::Center);
        assert_eq!(formatting.text_color, "#ff0000");
        assert_eq!(formatting.font_family, "arial");
    }

    #[test]
    fn test_insert_table_after_selection() {
        let mut doc = selected_doc();

        let insertion = insert_table(&mut doc, 2, 3).unwrap();
        let block = doc.block(&insertion.block_id).unwrap();

        assert_eq!(insertion.index, 1);
        assert_eq!(block.kind, BlockKind::Table { rows: 2, cols: 3 });
        assert_eq!(block.content.matches("<td").count(), 6);
        assert_eq!(block.content.matches("<tr>").count(), 2);
    }

    #[test]
    fn test_insert_table_rejects_empty_grid() {
        let mut doc = EditorDocument::new();
        assert!(insert_table(&mut doc, 0, 2).is_err());
        assert_eq!(doc.blocks().len(), 2);
    }

    #[test]
    fn test_insert_image_requires_url() {
        let mut doc = EditorDocument::new();
        assert!(matches!(
            insert_image(&mut doc, " ", None),
            Err(EditorError::MissingImageUrl)
        ));

        let insertion = insert_image(&mut doc, "/a.png", None).unwrap();
        assert_eq!(insertion.index, 2);
        assert_eq!(
            doc.block(&insertion.block_id).unwrap().kind,
            BlockKind::image("/a.png", "Image", None)
        );
    }

    #[test]
    fn test_insert_list_prefixes() {
        assert_eq!(
            list_markup(ListFormat::Ordered),
            "1. List item\n1. List item\n1. List item"
        );

        let mut doc = EditorDocument::new();
        let insertion = insert_list(&mut doc, ListFormat::Unordered).unwrap();
        assert!(doc
            .block(&insertion.block_id)
            .unwrap()
            .content
            .starts_with("• "));
    }

    #[test]
    fn test_insert_qcm_validates_first() {
        let mut doc = EditorDocument::new();
        assert!(matches!(
            insert_qcm(&mut doc, Qcm::default()),
            Err(EditorError::Qcm(_))
        ));
        assert_eq!(doc.blocks().len(), 2);

        let qcm = Qcm::new("q-1", "2 + 2?", QcmType::Single).with_options(vec![
            QcmOption::new("a", "4", true),
            QcmOption::new("b", "5", false),
        ]);
        let insertion = insert_qcm(&mut doc, qcm.clone()).unwrap();
        let block = doc.block(&insertion.block_id).unwrap();

        assert_eq!(block.kind, BlockKind::Qcm { qcm_data: qcm.clone() });
        let decoded: Qcm = serde_json::from_str(&block.content).unwrap();
        assert_eq!(decoded, qcm);
    }

    #[test]
    fn test_shortcuts() {
        let mut doc = EditorDocument::new();
        assert_eq!(
            apply_shortcut(&mut doc, Shortcut::NewParagraph).unwrap(),
            MutationOutcome::Unchanged
        );

        let first = doc.blocks()[0].id.clone();
        doc.select_block(Some(&first));
        apply_shortcut(&mut doc, Shortcut::NewParagraph).unwrap();

        assert_eq!(doc.blocks().len(), 3);
        assert_eq!(doc.selected_index(), Some(1));

        apply_shortcut(&mut doc, Shortcut::DeleteSelected).unwrap();
        assert_eq!(doc.blocks().len(), 2);
        assert!(doc.selected_block_id().is_none());
    }
}
