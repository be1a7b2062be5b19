//! Domain types for representing segmented lecture content.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One numbered "Тема N" section of a source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Number captured from the header line. Not necessarily unique or contiguous.
    pub number: u32,

    /// Trimmed remainder of the header line.
    pub title: String,

    /// Newline-joined body lines up to the next header, trimmed.
    pub body: String,
}

impl Topic {
    /// Create a new topic.
    pub fn new(number: u32, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            body: body.into(),
        }
    }

    /// Heading used for the presentation and lecture built from this topic.
    pub fn heading(&self) -> String {
        format!("Тема {}. {}", self.number, self.title)
    }
}

/// A single list entry on a `list` slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Short label (the item truncated for display).
    pub title: String,

    /// Full item text.
    pub text: String,
}

impl ListItem {
    /// Create a new list item.
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// One typed, renderable unit of presentation output.
///
/// Serialized with a `type` tag matching the renderer's slide keys
/// (`title`, `highlight`, `list`, `two-column`, `content`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Slide {
    /// Opening slide of every presentation.
    Title { title: String, subtitle: String },

    /// A short paragraph shown on its own.
    Highlight {
        title: String,
        #[serde(rename = "highlightText")]
        highlight_text: String,
    },

    /// A paragraph recognized as a bulleted or numbered list.
    List {
        title: String,
        #[serde(rename = "listItems")]
        list_items: Vec<ListItem>,
    },

    /// A long paragraph balanced into two halves.
    TwoColumn {
        title: String,
        #[serde(rename = "leftContent")]
        left_content: Vec<String>,
        #[serde(rename = "rightContent")]
        right_content: Vec<String>,
    },

    /// Plain text content.
    Content { title: String, content: Vec<String> },
}

impl Slide {
    /// The renderer key of this slide.
    pub fn kind(&self) -> &'static str {
        match self {
            Slide::Title { .. } => "title",
            Slide::Highlight { .. } => "highlight",
            Slide::List { .. } => "list",
            Slide::TwoColumn { .. } => "two-column",
            Slide::Content { .. } => "content",
        }
    }

    /// The slide heading.
    pub fn title(&self) -> &str {
        match self {
            Slide::Title { title, .. }
            | Slide::Highlight { title, .. }
            | Slide::List { title, .. }
            | Slide::TwoColumn { title, .. }
            | Slide::Content { title, .. } => title,
        }
    }
}

/// The ordered slide sequence built from one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// "Тема N. title".
    pub title: String,

    /// Slides in presentation order; the first one is always a title slide.
    pub slides: Vec<Slide>,
}

impl Presentation {
    /// Create an empty presentation with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            slides: Vec::new(),
        }
    }

    /// Add a slide to the presentation.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    /// Count slides by renderer key, in key order.
    pub fn slide_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for slide in &self.slides {
            *counts.entry(slide.kind()).or_insert(0) += 1;
        }
        counts
    }
}

/// A continuous-reading document built from one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lecture {
    /// `tema-<N>`, with a numeric suffix on collision.
    pub id: String,

    /// "Тема N. title".
    pub title: String,

    /// HTML-escaped body wrapped in a whitespace-preserving block.
    pub content: String,
}

/// All lectures attributed to one discipline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisciplineLectures {
    pub id: String,
    pub name: String,
    pub description: String,
    pub lectures: Vec<Lecture>,
}

/// Lectures keyed by discipline id.
pub type LectureMap = BTreeMap<String, DisciplineLectures>;

/// The format of a source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceFormat {
    /// Modern DOCX (Office Open XML).
    Docx,
    /// Legacy Word 97-2003 DOC (OLE/CFB binary).
    Doc,
    /// Plain text in an unknown encoding.
    Text,
}

impl SourceFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "docx" => Some(Self::Docx),
            "doc" => Some(Self::Doc),
            "txt" | "text" => Some(Self::Text),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // DOCX is a ZIP file (PK\x03\x04)
        if bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04]) {
            return Some(Self::Docx);
        }

        // DOC is an OLE/CFB file (D0 CF 11 E0 A1 B1 1A E1)
        if bytes.len() >= 8
            && bytes.starts_with(&[0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1])
        {
            return Some(Self::Doc);
        }

        None
    }

    /// Detect format from magic bytes, then the file name's extension.
    ///
    /// Anything unrecognized is treated as plain text.
    pub fn detect(bytes: &[u8], filename: &str) -> Self {
        Self::from_magic(bytes)
            .or_else(|| {
                filename
                    .rsplit_once('.')
                    .and_then(|(_, ext)| Self::from_extension(ext))
            })
            .unwrap_or(Self::Text)
    }
}
