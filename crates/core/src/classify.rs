//! Slide classification: decides the shape of the slide(s) a paragraph becomes.
//!
//! Rules are tried in order and the first match wins:
//!
//! 1. too short: no slide
//! 2. short: one `highlight` slide
//! 3. list-like (bullets, numbering, dashes): one `list` slide, or a truncated
//!    `content` slide when no usable items can be extracted
//! 4. long: one balanced `two-column` slide, or several `content` slides
//! 5. anything else: one `content` slide
//!
//! Each paragraph is classified on its own, without looking at its neighbours.

use crate::normalize::{char_len, truncate_chars, TextNormalizer};
use crate::options::SegmentOptions;
use crate::types::{ListItem, Slide};
use regex::Regex;
use std::sync::LazyLock;

/// A line starting with "1." or "1)" followed by whitespace.
static NUMBERED_LINE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+[.)]\s").unwrap());

/// An item that is nothing but its numbering.
static BARE_NUMBERING_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+[.)]\s*$").unwrap());

/// Bullet characters and newlines.
static BULLET_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[•\n]").unwrap());

/// An em dash, en dash or hyphen followed by whitespace.
static DASH_SPLIT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[—–-]\s+").unwrap());

/// End of a sentence: terminal punctuation followed by whitespace.
static SENTENCE_SPLIT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

const BULLET: char = '•';
const EM_DASH: char = '—';
const EN_DASH: char = '–';

/// Classifies paragraphs into slides.
#[derive(Debug, Clone)]
pub struct SlideClassifier {
    options: SegmentOptions,
    normalizer: TextNormalizer,
}

impl Default for SlideClassifier {
    fn default() -> Self {
        Self::new(SegmentOptions::default())
    }
}

impl SlideClassifier {
    /// Create a classifier from segmentation options.
    pub fn new(options: SegmentOptions) -> Self {
        let normalizer = TextNormalizer::new().with_bullet_marker(options.bullet_marker.clone());
        Self {
            options,
            normalizer,
        }
    }

    /// Classify one paragraph, returning the slides it produces in order.
    pub fn classify(&self, paragraph: &str, topic_title: &str) -> Vec<Slide> {
        let mut slides = Vec::new();
        self.classify_into(paragraph, topic_title, &mut slides);
        slides
    }

    /// Classify one paragraph, appending its slides to `out`.
    pub fn classify_into(&self, paragraph: &str, topic_title: &str, out: &mut Vec<Slide>) {
        let paragraph = paragraph.trim();
        let len = char_len(paragraph);
        let opts = &self.options;

        if len < opts.min_paragraph_chars {
            log::trace!("Dropping paragraph of {} chars", len);
            return;
        }

        if len < opts.highlight_below {
            out.push(Slide::Highlight {
                title: topic_title.to_string(),
                highlight_text: self.render(paragraph),
            });
            return;
        }

        if is_list_like(paragraph) {
            let items = self.extract_list_items(paragraph);
            if items.len() >= 2 {
                let list_items = items
                    .iter()
                    .take(opts.max_list_items.max(2))
                    .map(|item| {
                        let text = self.render(item);
                        ListItem::new(truncate_chars(&text, opts.list_title_chars), text.as_str())
                    })
                    .collect();
                out.push(Slide::List {
                    title: topic_title.to_string(),
                    list_items,
                });
            } else {
                log::trace!("List markers without usable items, using content slide");
                out.push(self.content_slide(topic_title, paragraph, Some(opts.list_fallback_chars)));
            }
            return;
        }

        if len > opts.long_above {
            self.split_long(paragraph, topic_title, out);
            return;
        }

        out.push(self.content_slide(topic_title, paragraph, None));
    }

    /// Balance a long paragraph into two columns, or spread it over several
    /// content slides when the halves would not fit.
    fn split_long(&self, paragraph: &str, topic_title: &str, out: &mut Vec<Slide>) {
        let opts = &self.options;
        let sentences = split_sentences(paragraph, opts.min_sentence_chars);
        let mid = sentences.len() / 2;

        if sentences.len() <= 3 || mid == 0 {
            out.push(self.content_slide(topic_title, paragraph, Some(opts.long_fallback_chars)));
            return;
        }

        let left = join_sentences(&sentences[..mid]);
        let right = join_sentences(&sentences[mid..]);

        if char_len(&left) < opts.column_max_chars && char_len(&right) < opts.column_max_chars {
            out.push(Slide::TwoColumn {
                title: topic_title.to_string(),
                left_content: vec![self.render(&left)],
                right_content: vec![self.render(&right)],
            });
            return;
        }

        let group_size = sentences.len().div_ceil(opts.content_groups.max(1));
        for group in sentences.chunks(group_size) {
            out.push(self.content_slide(topic_title, &join_sentences(group), None));
        }
    }

    /// Pull list items out of a list-like paragraph.
    ///
    /// Tries bullets and newlines, then newlines alone, then dashes; each
    /// attempt only runs when the previous one produced fewer than two items.
    fn extract_list_items(&self, paragraph: &str) -> Vec<String> {
        let min = self.options.min_list_item_chars;
        let usable = |item: &str| char_len(item) >= min && !BARE_NUMBERING_REGEX.is_match(item);

        let mut items = collect_items(BULLET_SPLIT_REGEX.split(paragraph), usable);
        if items.len() < 2 {
            items = collect_items(paragraph.split('\n'), usable);
        }
        if items.len() < 2 {
            items = collect_items(DASH_SPLIT_REGEX.split(paragraph), |item| char_len(item) >= min);
        }
        items
    }

    fn content_slide(&self, topic_title: &str, text: &str, limit: Option<usize>) -> Slide {
        let rendered = self.render(text);
        let content = match limit {
            Some(limit) => truncate_chars(&rendered, limit).to_string(),
            None => rendered,
        };
        Slide::Content {
            title: topic_title.to_string(),
            content: vec![content],
        }
    }

    fn render(&self, text: &str) -> String {
        self.normalizer.repair_placeholder(text).into_owned()
    }
}

/// Whether a paragraph carries list markers: bullets, line-leading numbering,
/// or dashes.
pub fn is_list_like(paragraph: &str) -> bool {
    paragraph.contains(BULLET)
        || NUMBERED_LINE_REGEX.is_match(paragraph)
        || paragraph.contains(EM_DASH)
        || paragraph.contains(EN_DASH)
        || paragraph.contains("- ")
}

/// Split text into sentences at `.`, `!` or `?` followed by whitespace,
/// dropping fragments shorter than `min_chars`.
pub fn split_sentences(text: &str, min_chars: usize) -> Vec<&str> {
    SENTENCE_SPLIT_REGEX
        .split(text)
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty() && char_len(sentence) >= min_chars)
        .collect()
}

/// Join sentences back with ". ", ending with a period unless the last
/// sentence already carries terminal punctuation.
fn join_sentences(sentences: &[&str]) -> String {
    let mut joined = sentences.join(". ");
    if !joined.ends_with(['.', '!', '?']) {
        joined.push('.');
    }
    joined
}

fn collect_items<'a>(
    parts: impl Iterator<Item = &'a str>,
    usable: impl Fn(&str) -> bool,
) -> Vec<String> {
    parts
        .map(str::trim)
        .filter(|&item| usable(item))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TITLE: &str = "Введение";

    /// A sentence of exactly `len` characters ending with a period.
    fn sentence(len: usize, letter: char) -> String {
        let mut s: String = std::iter::repeat(letter).take(len - 1).collect();
        s.push('.');
        s
    }

    /// A paragraph of `count` sentences, each `len` characters, joined by spaces.
    fn paragraph_of(count: usize, len: usize) -> String {
        (0..count)
            .map(|i| sentence(len, if i % 2 == 0 { 'а' } else { 'б' }))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn classify(paragraph: &str) -> Vec<Slide> {
        SlideClassifier::default().classify(paragraph, TITLE)
    }

    #[test]
    fn test_too_short_is_dropped() {
        assert!(classify("").is_empty());
        assert!(classify("Совсем коротко.").is_empty());
    }

    #[test]
    fn test_highlight_boundary() {
        let text: String = "я".repeat(119);
        let slides = classify(&text);
        assert_eq!(
            slides,
            vec![Slide::Highlight {
                title: TITLE.to_string(),
                highlight_text: text.clone()
            }]
        );

        let text: String = "я".repeat(120);
        let slides = classify(&text);
        assert_eq!(
            slides,
            vec![Slide::Content {
                title: TITLE.to_string(),
                content: vec![text.clone()]
            }]
        );
    }

    #[test]
    fn test_bullet_list() {
        let first = "Первый пункт списка, который описывает основную идею раздела";
        let second = "Второй пункт списка, который дополняет основную идею раздела";
        let paragraph = format!("• {}\n• {}", first, second);
        assert!(char_len(&paragraph) >= 120);

        let slides = classify(&paragraph);
        assert_eq!(slides.len(), 1);
        match &slides[0] {
            Slide::List { title, list_items } => {
                assert_eq!(title, TITLE);
                assert_eq!(list_items.len(), 2);
                assert_eq!(list_items[0].text, first);
                assert_eq!(list_items[1].text, second);
                assert_eq!(list_items[0].title, truncate_chars(first, 80));
            }
            other => panic!("expected list slide, got {:?}", other),
        }
    }

    #[test]
    fn test_list_item_titles_truncated() {
        let long_item: String = "д".repeat(100);
        let paragraph = format!("• {}\n• {}", long_item, long_item);

        let slides = classify(&paragraph);
        match &slides[0] {
            Slide::List { list_items, .. } => {
                assert_eq!(char_len(&list_items[0].title), 80);
                assert_eq!(char_len(&list_items[0].text), 100);
            }
            other => panic!("expected list slide, got {:?}", other),
        }
    }

    #[test]
    fn test_numbered_list_skips_bare_numbers() {
        let paragraph = "1. Первый нумерованный пункт с подробным пояснением\n2.\n\
                         2) Второй нумерованный пункт с подробным пояснением\n\
                         3) Третий нумерованный пункт с подробным пояснением";
        let slides = classify(paragraph);
        match &slides[0] {
            Slide::List { list_items, .. } => {
                assert_eq!(list_items.len(), 3);
                assert!(list_items[0].text.starts_with("1. Первый"));
                assert!(list_items[2].text.starts_with("3) Третий"));
            }
            other => panic!("expected list slide, got {:?}", other),
        }
    }

    #[test]
    fn test_list_capped_at_max_items() {
        let paragraph = (0..14)
            .map(|i| format!("• Пункт номер {} с достаточным описанием", i))
            .collect::<Vec<_>>()
            .join("\n");

        let slides = classify(&paragraph);
        match &slides[0] {
            Slide::List { list_items, .. } => assert_eq!(list_items.len(), 10),
            other => panic!("expected list slide, got {:?}", other),
        }
    }

    #[test]
    fn test_newline_tier_when_bullet_pieces_are_short() {
        let line = vec!["часть пункта"; 5].join(" • ");
        let paragraph = format!("{}\n{}", line, line);
        assert!(char_len(&paragraph) >= 120);

        let slides = classify(&paragraph);
        match &slides[0] {
            Slide::List { list_items, .. } => {
                assert_eq!(list_items.len(), 2);
                assert_eq!(list_items[0].text, line);
                assert_eq!(list_items[1].text, line);
            }
            other => panic!("expected list slide, got {:?}", other),
        }
    }

    #[test]
    fn test_dash_list_fallback() {
        let paragraph = "Основные понятия — педагогика как наука о воспитании человека — \
                         дидактика как теория обучения и образования — \
                         методика как частная теория обучения предмету";
        let slides = classify(paragraph);
        match &slides[0] {
            Slide::List { list_items, .. } => {
                assert_eq!(list_items.len(), 4);
                assert_eq!(list_items[0].text, "Основные понятия");
                assert_eq!(list_items[3].text, "методика как частная теория обучения предмету");
            }
            other => panic!("expected list slide, got {:?}", other),
        }
    }

    #[test]
    fn test_false_positive_list_becomes_truncated_content() {
        let paragraph = format!("Слово - {}", "ж".repeat(900));
        let slides = classify(&paragraph);
        match &slides[0] {
            Slide::Content { content, .. } => {
                assert_eq!(content.len(), 1);
                assert_eq!(char_len(&content[0]), 800);
            }
            other => panic!("expected content slide, got {:?}", other),
        }
    }

    #[test]
    fn test_two_column_balance() {
        let paragraph = paragraph_of(10, 79);
        assert!(char_len(&paragraph) >= 790);

        let slides = classify(&paragraph);
        assert_eq!(slides.len(), 1);
        match &slides[0] {
            Slide::TwoColumn {
                left_content,
                right_content,
                ..
            } => {
                assert!(char_len(&left_content[0]) < 600);
                assert!(char_len(&right_content[0]) < 600);
                assert!(left_content[0].ends_with('.'));
                assert!(!left_content[0].ends_with(".."));
                assert!(right_content[0].ends_with('.'));
            }
            other => panic!("expected two-column slide, got {:?}", other),
        }
    }

    #[test]
    fn test_long_paragraph_spreads_over_three_slides() {
        let paragraph = paragraph_of(12, 125);
        assert!(char_len(&paragraph) >= 1500);

        let slides = classify(&paragraph);
        assert_eq!(slides.len(), 3);
        assert!(slides.iter().all(|s| s.kind() == "content"));
    }

    #[test]
    fn test_long_paragraph_with_few_sentences_is_truncated() {
        let paragraph = paragraph_of(3, 250);
        let slides = classify(&paragraph);

        assert_eq!(slides.len(), 1);
        match &slides[0] {
            Slide::Content { content, .. } => assert_eq!(char_len(&content[0]), 600),
            other => panic!("expected content slide, got {:?}", other),
        }
    }

    #[test]
    fn test_medium_paragraph_is_untruncated_content() {
        let paragraph = paragraph_of(4, 100);
        let slides = classify(&paragraph);
        assert_eq!(
            slides,
            vec![Slide::Content {
                title: TITLE.to_string(),
                content: vec![paragraph.clone()]
            }]
        );
    }

    #[test]
    fn test_placeholder_repaired_in_rendered_text() {
        let slides = classify("?Некоторый заголовок раздела");
        assert_eq!(
            slides,
            vec![Slide::Highlight {
                title: TITLE.to_string(),
                highlight_text: "• Некоторый заголовок раздела".to_string()
            }]
        );
    }

    #[test]
    fn test_is_list_like() {
        assert!(is_list_like("• пункт"));
        assert!(is_list_like("вступление\n2) пункт"));
        assert!(is_list_like("это — определение"));
        assert!(is_list_like("это – определение"));
        assert!(is_list_like("слово - значение"));
        assert!(!is_list_like("как-то так, 2024 год"));
        assert!(!is_list_like("2.5 литра"));
    }

    #[test]
    fn test_split_sentences() {
        let sentences = split_sentences("Первое предложение. Второе предложение! Мало. Итог?", 11);
        assert_eq!(sentences, vec!["Первое предложение", "Второе предложение"]);
    }

    #[test]
    fn test_zero_caps_do_not_panic() {
        let options = SegmentOptions {
            content_groups: 0,
            column_max_chars: 10,
            max_list_items: 0,
            list_title_chars: 0,
            ..SegmentOptions::default()
        };
        let classifier = SlideClassifier::new(options);

        let slides = classifier.classify(&paragraph_of(12, 125), TITLE);
        assert_eq!(slides.len(), 1);
        assert_eq!(slides[0].kind(), "content");

        let item: String = "д".repeat(70);
        let slides = classifier.classify(&format!("• {}\n• {}", item, item), TITLE);
        match &slides[0] {
            Slide::List { list_items, .. } => {
                assert_eq!(list_items.len(), 2);
                assert_eq!(list_items[0].title, "");
            }
            other => panic!("expected list slide, got {:?}", other),
        }
    }

    #[test]
    fn test_compact_options() {
        let classifier = SlideClassifier::new(SegmentOptions::compact());
        let text: String = "я".repeat(140);
        let slides = classifier.classify(&text, TITLE);
        assert_eq!(slides[0].kind(), "highlight");
    }
}
