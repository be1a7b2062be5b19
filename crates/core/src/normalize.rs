//! Text normalization for extracted lecture text.
//!
//! Handles whitespace collapsing, repair of bullet glyphs lost during text
//! extraction, line cleanup for lecture documents, and the normalized form
//! used when comparing names and hashing content.

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

/// Regex to collapse whitespace runs (including non-breaking spaces) into one space.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A leading `?` left behind when a bullet glyph could not be decoded.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\s\x{00A0}]*\?[\s\x{00A0}]*").unwrap());

/// Editorial marker lines ("патч") that are not part of the lecture text.
static PATCH_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[ \t]*патч[ \t]*$").unwrap());

/// Unicode replacement character produced by lossy decoding.
const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// Number of characters (not bytes) in a string.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// The first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Collapse internal whitespace runs to single spaces and trim.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_COLLAPSE_REGEX
        .replace_all(text.trim(), " ")
        .into_owned()
}

/// Normalize a string for comparison and hashing.
///
/// Applies NFC, lowercases, folds "ё" to "е", collapses whitespace and trims.
pub fn normalize_for_comparison(text: &str) -> String {
    let composed: String = text.nfc().collect();
    let lowered = composed.to_lowercase().replace('ё', "е");
    collapse_whitespace(&lowered)
}

/// Escape the characters that are significant in HTML text content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Text normalizer for extracted lecture text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    /// Marker substituted for a leading `?` placeholder.
    bullet_marker: String,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self {
            bullet_marker: "• ".to_string(),
        }
    }
}

impl TextNormalizer {
    /// Create a new normalizer that repairs placeholders with "• ".
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the marker substituted for a leading `?` placeholder.
    pub fn with_bullet_marker(mut self, marker: impl Into<String>) -> Self {
        self.bullet_marker = marker.into();
        self
    }

    /// The configured bullet marker.
    pub fn bullet_marker(&self) -> &str {
        &self.bullet_marker
    }

    /// Trim a source line and collapse its internal whitespace.
    pub fn normalize_line(&self, line: &str) -> String {
        collapse_whitespace(line)
    }

    /// Replace a leading `?` placeholder (with any surrounding whitespace)
    /// by the bullet marker.
    pub fn repair_placeholder<'a>(&self, text: &'a str) -> Cow<'a, str> {
        PLACEHOLDER_REGEX.replace(text, regex::NoExpand(self.bullet_marker.as_str()))
    }

    /// Clean one raw line of lecture text.
    ///
    /// Drops replacement characters and repairs the placeholder. Returns
    /// `None` for lines that should not appear in the lecture: empty lines
    /// and editorial "патч" markers.
    pub fn clean_lecture_line(&self, raw: &str) -> Option<String> {
        let without_replacements: String = raw.chars().filter(|&c| c != REPLACEMENT_CHAR).collect();
        let cleaned = self.repair_placeholder(&without_replacements).into_owned();

        if cleaned.is_empty() || PATCH_LINE_REGEX.is_match(&cleaned) {
            return None;
        }

        Some(cleaned)
    }
}
