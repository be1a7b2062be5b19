//! Tunable thresholds for the segmentation pipeline.
//!
//! The numbers are empirical and differ between the document sets they were
//! tuned on, so every one of them is configuration. All lengths are counted
//! in characters, not bytes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// When the paragraph chunker falls back to single-newline splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParagraphFallback {
    /// Fall back only when the body has no blank-line boundary at all and the
    /// blank-line split yields too few paragraphs.
    #[default]
    Unseparated,
    /// Fall back whenever the blank-line split yields too few paragraphs.
    Always,
    /// Never fall back.
    Never,
}

/// Options controlling how topic bodies become slides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SegmentOptions {
    /// Bodies shorter than this produce only the title slide.
    pub min_body_chars: usize,

    /// Blank-line blocks shorter than this are discarded.
    pub min_block_chars: usize,

    /// Single-line blocks shorter than this are discarded in fallback mode.
    pub min_line_chars: usize,

    /// Fewer blank-line paragraphs than this triggers the fallback.
    pub min_paragraphs: usize,

    /// Fallback policy for bodies without enough paragraphs.
    pub paragraph_fallback: ParagraphFallback,

    /// Paragraphs shorter than this produce no slide.
    pub min_paragraph_chars: usize,

    /// Paragraphs shorter than this become highlight slides.
    pub highlight_below: usize,

    /// Non-list paragraphs longer than this are balanced or re-chunked.
    pub long_above: usize,

    /// List items shorter than this are discarded.
    pub min_list_item_chars: usize,

    /// Maximum number of items on one list slide.
    pub max_list_items: usize,

    /// Length of a list item's short label.
    pub list_title_chars: usize,

    /// Truncation for a list-like paragraph that yielded no usable items.
    pub list_fallback_chars: usize,

    /// Sentence fragments shorter than this are discarded.
    pub min_sentence_chars: usize,

    /// Each half of a two-column slide must stay below this length.
    pub column_max_chars: usize,

    /// Truncation for a long paragraph with too few sentences to balance.
    pub long_fallback_chars: usize,

    /// Number of content slides an unbalanceable long paragraph is split into.
    pub content_groups: usize,

    /// Marker substituted for a leading `?` placeholder in rendered text.
    pub bullet_marker: String,
}

impl Default for SegmentOptions {
    fn default() -> Self {
        Self {
            min_body_chars: 50,
            min_block_chars: 20,
            min_line_chars: 30,
            min_paragraphs: 3,
            paragraph_fallback: ParagraphFallback::default(),
            min_paragraph_chars: 20,
            highlight_below: 120,
            long_above: 500,
            min_list_item_chars: 15,
            max_list_items: 10,
            list_title_chars: 80,
            list_fallback_chars: 800,
            min_sentence_chars: 11,
            column_max_chars: 600,
            long_fallback_chars: 600,
            content_groups: 3,
            bullet_marker: "• ".to_string(),
        }
    }
}

impl SegmentOptions {
    /// Create options with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// The thresholds of the first-generation slide builder, which never
    /// split paragraphs on single newlines.
    ///
    /// Only numbers and the fallback policy carry over. List detection and
    /// long-paragraph balancing still follow the current rules.
    pub fn compact() -> Self {
        Self {
            paragraph_fallback: ParagraphFallback::Never,
            highlight_below: 150,
            long_above: 400,
            min_list_item_chars: 11,
            max_list_items: 8,
            list_title_chars: 60,
            ..Self::default()
        }
    }

    /// Look up a named preset.
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "standard" | "default" => Some(Self::default()),
            "compact" => Some(Self::compact()),
            _ => None,
        }
    }

    /// Parse options from JSON. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    /// Check that caps and group counts are usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_list_items < 2 {
            return Err(Error::InvalidOptions(
                "maxListItems must allow at least 2 items".to_string(),
            ));
        }
        if self.content_groups == 0 {
            return Err(Error::InvalidOptions(
                "contentGroups must be at least 1".to_string(),
            ));
        }
        if self.list_title_chars == 0 {
            return Err(Error::InvalidOptions(
                "listTitleChars must be at least 1".to_string(),
            ));
        }
        if self.highlight_below > self.long_above {
            return Err(Error::InvalidOptions(format!(
                "highlightBelow ({}) must not exceed longAbove ({})",
                self.highlight_below, self.long_above
            )));
        }
        Ok(())
    }
}
