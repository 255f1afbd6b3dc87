//! # Document Import
//!
//! Best-effort conversion of uploaded files into a title plus chapters.
//!
//! Detection order: binary signatures, then JSON, then UTF-8 text. Binary
//! office formats are recognised but not parsed; they produce a single
//! chapter explaining why.
//!
//! Plain text heuristic:
//! - title = first non-blank line
//! - a non-blank line shorter than 100 characters immediately followed by a
//!   blank line starts a chapter
//! - text before the first chapter title lands in an "Introduction" chapter

use crate::block::{Block, BlockKind};
use crate::document::{EditorDocument, UNTITLED};
use crate::store::BlockStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const PDF_SIGNATURE: &[u8] = b"%PDF";
const ZIP_SIGNATURE: &[u8] = &[0x50, 0x4b, 0x03, 0x04];
const DOC_SIGNATURE: &[u8] = &[0xd0, 0xcf, 0x11, 0xe0];

/// Lines at least this long are never chapter titles
pub const MAX_CHAPTER_TITLE_LEN: usize = 100;

pub const INTRODUCTION: &str = "Introduction";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    Json,
    Text,
    Pdf,
    /// DOCX, or any other ZIP container
    Docx,
    Doc,
    Unknown,
}

impl DetectedFormat {
    pub fn name(self) -> &'static str {
        match self {
            DetectedFormat::Json => "JSON",
            DetectedFormat::Text => "TEXT",
            DetectedFormat::Pdf => "PDF",
            DetectedFormat::Docx => "DOCX",
            DetectedFormat::Doc => "DOC",
            DetectedFormat::Unknown => "UNKNOWN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Chapter {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid JSON document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File is empty")]
    Empty,
}

pub fn detect_format(bytes: &[u8]) -> DetectedFormat {
    if bytes.starts_with(PDF_SIGNATURE) {
        return DetectedFormat::Pdf;
    }
    if bytes.starts_with(ZIP_SIGNATURE) {
        return DetectedFormat::Docx;
    }
    if bytes.starts_with(DOC_SIGNATURE) {
        return DetectedFormat::Doc;
    }

    match std::str::from_utf8(bytes) {
        Ok(text) if serde_json::from_str::<serde_json::Value>(text).is_ok() => DetectedFormat::Json,
        Ok(text) if !text.trim().is_empty() => DetectedFormat::Text,
        _ => DetectedFormat::Unknown,
    }
}

/// Parse a file. JSON that does not have the `{title, chapters}` shape is an error.
pub fn parse_document(bytes: &[u8]) -> Result<ParsedDocument, ImportError> {
    if bytes.is_empty() {
        return Err(ImportError::Empty);
    }

    let format = detect_format(bytes);
    tracing::debug!(format = format.name(), len = bytes.len(), "Detected import format");

    let parsed = match format {
        DetectedFormat::Json => serde_json::from_slice(bytes)?,
        DetectedFormat::Text => parse_text(&String::from_utf8_lossy(bytes)),
        DetectedFormat::Pdf => unparsed(
            "PDF document detected",
            "Cannot parse the PDF",
            "Parsing PDF files requires a dedicated text extraction library.",
        ),
        DetectedFormat::Docx => unparsed(
            "DOCX document detected",
            "Cannot parse the DOCX",
            "Parsing DOCX files requires a dedicated library to convert them to text or HTML.",
        ),
        DetectedFormat::Doc => unparsed(
            "DOC document detected",
            "Cannot parse the DOC",
            "The legacy binary Word format requires a dedicated library and is harder to process than DOCX.",
        ),
        DetectedFormat::Unknown => unparsed(
            "Unrecognised document format",
            "Unsupported format",
            "The format of this document could not be identified or is not supported.",
        ),
    };

    Ok(parsed)
}

/// Like [`parse_document`], but failures become a one-chapter error document
pub fn parse_document_lenient(bytes: &[u8]) -> ParsedDocument {
    parse_document(bytes).unwrap_or_else(|e| {
        tracing::warn!("Error while parsing document: {}", e);
        unparsed(
            "Parsing error",
            "An error occurred",
            "The document could not be parsed. Check the file format and try again.",
        )
    })
}

fn unparsed(title: &str, chapter: &str, explanation: &str) -> ParsedDocument {
    ParsedDocument {
        title: title.to_string(),
        chapters: vec![Chapter::new(chapter, explanation)],
    }
}

pub fn parse_text(text: &str) -> ParsedDocument {
    let lines: Vec<&str> = text.lines().collect();

    let Some(title_index) = lines.iter().position(|l| !l.trim().is_empty()) else {
        return ParsedDocument {
            title: UNTITLED.to_string(),
            chapters: Vec::new(),
        };
    };

    let mut chapters = Vec::new();
    let mut current: Option<String> = None;
    let mut body: Vec<&str> = Vec::new();

    for (i, raw) in lines.iter().enumerate().skip(title_index + 1) {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        let followed_by_blank = lines.get(i + 1).is_some_and(|next| next.trim().is_empty());
        let is_chapter_title = line.chars().count() < MAX_CHAPTER_TITLE_LEN && followed_by_blank;

        if is_chapter_title {
            if let Some(title) = current.take() {
                chapters.push(Chapter::new(title, body.join("\n")));
                body.clear();
            }
            current = Some(line.to_string());
        } else {
            if current.is_none() {
                current = Some(INTRODUCTION.to_string());
            }
            body.push(line);
        }
    }

    if let Some(title) = current {
        chapters.push(Chapter::new(title, body.join("\n")));
    }

    ParsedDocument {
        title: lines[title_index].trim().to_string(),
        chapters,
    }
}

impl ParsedDocument {
    /// Heading 1 title, then a heading 2 and a paragraph per chapter
    pub fn to_blocks(&self) -> Vec<Block> {
        let mut store = BlockStore::new();
        store.insert(None, BlockKind::heading(1), self.title.clone());

        for chapter in &self.chapters {
            store.insert(None, BlockKind::heading(2), chapter.title.clone());
            store.insert(None, BlockKind::Paragraph, chapter.content.clone());
        }

        store.into_blocks()
    }

    pub fn to_document(&self) -> EditorDocument {
        EditorDocument::from_blocks(self.title.clone(), self.to_blocks())
    }
}
