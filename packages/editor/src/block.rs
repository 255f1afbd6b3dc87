//! # Block Model
//!
//! A document body is an ordered list of [`Block`]s. Each block carries a
//! [`BlockKind`] tag with the fields that only make sense for that kind, an
//! opaque markup `content` string and a set of optional style overrides.
//!
//! ## Wire shape
//!
//! Blocks serialize flat, with the kind tag under `"type"`:
//!
//! ```json
//! { "id": "block-3", "type": "heading", "content": "Introduction", "level": 2, "isBold": true }
//! ```

use crate::qcm::Qcm;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable block identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(String);

impl BlockId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlockId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BlockId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Kind tag without payload, used to request a block with default fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockType {
    Paragraph,
    Heading,
    List,
    Image,
    Table,
    Quote,
    Qcm,
}

impl BlockType {
    /// Default fields for a freshly added block of this type
    pub fn default_kind(self) -> BlockKind {
        match self {
            BlockType::Paragraph => BlockKind::Paragraph,
            BlockType::Heading => BlockKind::Heading {
                level: DEFAULT_HEADING_LEVEL,
            },
            BlockType::List => BlockKind::List {
                format: ListFormat::Unordered,
            },
            BlockType::Image => BlockKind::Image {
                url: String::new(),
                alt: String::new(),
                caption: None,
            },
            BlockType::Table => BlockKind::Table {
                rows: DEFAULT_TABLE_SIZE,
                cols: DEFAULT_TABLE_SIZE,
            },
            BlockType::Quote => BlockKind::Quote,
            BlockType::Qcm => BlockKind::Qcm {
                qcm_data: Qcm::default(),
            },
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlockType::Paragraph => "paragraph",
            BlockType::Heading => "heading",
            BlockType::List => "list",
            BlockType::Image => "image",
            BlockType::Table => "table",
            BlockType::Quote => "quote",
            BlockType::Qcm => "qcm",
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub const DEFAULT_HEADING_LEVEL: u8 = 2;
pub const DEFAULT_TABLE_SIZE: u32 = 2;

fn default_heading_level() -> u8 {
    DEFAULT_HEADING_LEVEL
}

fn default_table_size() -> u32 {
    DEFAULT_TABLE_SIZE
}

/// Ordered or bulleted list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListFormat {
    Ordered,
    #[default]
    Unordered,
}

impl ListFormat {
    /// Item prefix used when seeding list content
    pub fn item_prefix(self) -> &'static str {
        match self {
            ListFormat::Ordered => "1. ",
            ListFormat::Unordered => "• ",
        }
    }
}

/// Type tag plus the fields that only exist for that type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BlockKind {
    Paragraph,

    Heading {
        #[serde(default = "default_heading_level")]
        level: u8,
    },

    List {
        #[serde(default)]
        format: ListFormat,
    },

    Image {
        #[serde(default)]
        url: String,
        #[serde(default)]
        alt: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },

    Table {
        #[serde(default = "default_table_size")]
        rows: u32,
        #[serde(default = "default_table_size")]
        cols: u32,
    },

    Quote,

    Qcm {
        #[serde(rename = "qcmData", default)]
        qcm_data: Qcm,
    },
}

impl BlockKind {
    pub fn block_type(&self) -> BlockType {
        match self {
            BlockKind::Paragraph => BlockType::Paragraph,
            BlockKind::Heading { .. } => BlockType::Heading,
            BlockKind::List { .. } => BlockType::List,
            BlockKind::Image { .. } => BlockType::Image,
            BlockKind::Table { .. } => BlockType::Table,
            BlockKind::Quote => BlockType::Quote,
            BlockKind::Qcm { .. } => BlockType::Qcm,
        }
    }

    pub fn heading(level: u8) -> Self {
        BlockKind::Heading { level }
    }

    pub fn image(url: impl Into<String>, alt: impl Into<String>, caption: Option<String>) -> Self {
        BlockKind::Image {
            url: url.into(),
            alt: alt.into(),
            caption,
        }
    }
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_str(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

/// Per-block style overrides, independent of the block kind.
///
/// Every field is optional: `None` means "inherit the editor default".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_bold: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_italic: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_underline: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment: Option<Alignment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
}

impl BlockStyle {
    pub fn is_empty(&self) -> bool {
        *self == BlockStyle::default()
    }

    /// Overlay every field set in `patch` (last write wins)
    pub fn merge(&mut self, patch: &BlockStyle) {
        fn overlay<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }

        overlay(&mut self.font_family, &patch.font_family);
        overlay(&mut self.font_size, &patch.font_size);
        overlay(&mut self.is_bold, &patch.is_bold);
        overlay(&mut self.is_italic, &patch.is_italic);
        overlay(&mut self.is_underline, &patch.is_underline);
        overlay(&mut self.alignment, &patch.alignment);
        overlay(&mut self.text_color, &patch.text_color);
        overlay(&mut self.bg_color, &patch.bg_color);
    }
}

/// One unit of document content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,

    #[serde(flatten)]
    pub kind: BlockKind,

    /// Opaque markup, never validated
    #[serde(default)]
    pub content: String,

    #[serde(flatten)]
    pub style: BlockStyle,
}

impl Block {
    pub fn new(id: impl Into<BlockId>, kind: BlockKind) -> Self {
        Self {
            id: id.into(),
            kind,
            content: String::new(),
            style: BlockStyle::default(),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_style(mut self, style: BlockStyle) -> Self {
        self.style = style;
        self
    }

    pub fn block_type(&self) -> BlockType {
        self.kind.block_type()
    }

    /// Heading level, if this is a heading
    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            BlockKind::Heading { level } => Some(level),
            _ => None,
        }
    }
}
