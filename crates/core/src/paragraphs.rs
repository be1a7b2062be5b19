//! Paragraph chunking of topic bodies.
//!
//! Paragraphs are blank-line delimited blocks. Documents converted without
//! blank lines between paragraphs get a second pass that treats every line
//! as a paragraph candidate. Neither pass guarantees semantically correct
//! paragraphs.
//!
//! The default [`ParagraphFallback::Unseparated`] only takes the second pass
//! when the body has no blank line at all. Falling back whenever fewer than
//! `min_paragraphs` blocks survive would break a short highlight followed by
//! a bulleted list into one slide per line. [`ParagraphFallback::Always`]
//! restores that stricter rule.

use crate::normalize::char_len;
use crate::options::{ParagraphFallback, SegmentOptions};
use regex::Regex;
use std::sync::LazyLock;

/// One or more blank (or whitespace-only) lines.
static BLANK_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Splits a topic body into paragraph strings.
#[derive(Debug, Clone)]
pub struct ParagraphChunker {
    min_block_chars: usize,
    min_line_chars: usize,
    min_paragraphs: usize,
    fallback: ParagraphFallback,
}

impl Default for ParagraphChunker {
    fn default() -> Self {
        Self::from_options(&SegmentOptions::default())
    }
}

impl ParagraphChunker {
    /// Create a chunker with the default thresholds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a chunker from segmentation options.
    pub fn from_options(options: &SegmentOptions) -> Self {
        Self {
            min_block_chars: options.min_block_chars,
            min_line_chars: options.min_line_chars,
            min_paragraphs: options.min_paragraphs,
            fallback: options.paragraph_fallback,
        }
    }

    /// Set the fallback policy.
    pub fn with_fallback(mut self, fallback: ParagraphFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Split a body into trimmed paragraphs, in order.
    pub fn chunk(&self, body: &str) -> Vec<String> {
        let blocks: Vec<&str> = BLANK_LINE_REGEX.split(body).collect();
        let paragraphs = keep_long_enough(&blocks, self.min_block_chars);

        if paragraphs.len() >= self.min_paragraphs {
            return paragraphs;
        }

        let use_fallback = match self.fallback {
            ParagraphFallback::Always => true,
            ParagraphFallback::Unseparated => blocks.len() <= 1,
            ParagraphFallback::Never => false,
        };
        if !use_fallback {
            return paragraphs;
        }

        let lines: Vec<&str> = body.split('\n').collect();
        let fallback = keep_long_enough(&lines, self.min_line_chars);
        log::debug!(
            "Paragraph fallback: {} blank-line paragraphs, {} line paragraphs",
            paragraphs.len(),
            fallback.len()
        );
        fallback
    }
}

fn keep_long_enough(blocks: &[&str], min_chars: usize) -> Vec<String> {
    blocks
        .iter()
        .map(|block| block.trim())
        .filter(|block| !block.is_empty() && char_len(block) >= min_chars)
        .map(str::to_string)
        .collect()
}

/// Split a body into paragraphs with the default settings.
pub fn split_paragraphs(body: &str) -> Vec<String> {
    ParagraphChunker::new().chunk(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_A: &str = "Первый абзац достаточно длинный для слайда.";
    const LONG_B: &str = "Второй абзац тоже вполне длинный для слайда.";
    const LONG_C: &str = "Третий абзац завершает это небольшое описание.";

    #[test]
    fn test_blank_line_paragraphs() {
        let body = format!("{}\n\n{}\n\n{}", LONG_A, LONG_B, LONG_C);
        assert_eq!(split_paragraphs(&body), vec![LONG_A, LONG_B, LONG_C]);
    }

    #[test]
    fn test_whitespace_only_separator_lines() {
        let body = format!("{}\n   \n{}\n\t\n\n{}", LONG_A, LONG_B, LONG_C);
        assert_eq!(split_paragraphs(&body), vec![LONG_A, LONG_B, LONG_C]);
    }

    #[test]
    fn test_short_blocks_are_discarded() {
        let body = format!("{}\n\nкоротко\n\n{}\n\n{}", LONG_A, LONG_B, LONG_C);
        assert_eq!(split_paragraphs(&body), vec![LONG_A, LONG_B, LONG_C]);
    }

    #[test]
    fn test_block_keeps_internal_newlines() {
        let body = format!("{}\n{}\n\n{}\n\n{}", LONG_A, LONG_B, LONG_C, LONG_A);
        let paragraphs = split_paragraphs(&body);

        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0], format!("{}\n{}", LONG_A, LONG_B));
    }

    #[test]
    fn test_fallback_for_unseparated_body() {
        let body = format!("{}\n{}\nкороткая строка\n{}", LONG_A, LONG_B, LONG_C);
        assert_eq!(split_paragraphs(&body), vec![LONG_A, LONG_B, LONG_C]);
    }

    #[test]
    fn test_no_fallback_when_blank_lines_present() {
        let list = format!("• {}\n• {}", LONG_A, LONG_B);
        let body = format!("{}\n\n{}", LONG_C, list);
        assert_eq!(split_paragraphs(&body), vec![LONG_C.to_string(), list]);
    }

    #[test]
    fn test_always_fallback_policy() {
        let body = format!("{}\n\n{}\n{}", LONG_C, LONG_A, LONG_B);
        let chunker = ParagraphChunker::new().with_fallback(ParagraphFallback::Always);
        assert_eq!(chunker.chunk(&body), vec![LONG_C, LONG_A, LONG_B]);
    }

    #[test]
    fn test_never_fallback_policy() {
        let body = format!("{}\n{}", LONG_A, LONG_B);
        let chunker = ParagraphChunker::new().with_fallback(ParagraphFallback::Never);
        assert_eq!(chunker.chunk(&body), vec![format!("{}\n{}", LONG_A, LONG_B)]);
    }

    #[test]
    fn test_fallback_uses_higher_threshold() {
        // 25 characters: enough for a block, not for a fallback line.
        let line = "Строка ровно двадцать пят";
        assert_eq!(char_len(line), 25);

        let body = format!("{}\n{}", line, LONG_A);
        assert_eq!(split_paragraphs(&body), vec![LONG_A]);
    }

    #[test]
    fn test_empty_body() {
        assert!(split_paragraphs("").is_empty());
    }
}
