//! The slide pipeline: topics, then paragraphs, then slides, then presentations.

use crate::classify::SlideClassifier;
use crate::normalize::char_len;
use crate::options::SegmentOptions;
use crate::paragraphs::ParagraphChunker;
use crate::topics::TopicSplitter;
use crate::types::{Presentation, Slide, Topic};

/// Turns document text into one presentation per topic.
#[derive(Debug, Clone)]
pub struct Segmenter {
    min_body_chars: usize,
    chunker: ParagraphChunker,
    classifier: SlideClassifier,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(SegmentOptions::default())
    }
}

impl Segmenter {
    /// Create a segmenter from options.
    pub fn new(options: SegmentOptions) -> Self {
        Self {
            min_body_chars: options.min_body_chars,
            chunker: ParagraphChunker::from_options(&options),
            classifier: SlideClassifier::new(options),
        }
    }

    /// Segment a whole document, in topic order.
    pub fn segment(&self, text: &str) -> Vec<Presentation> {
        let topics = TopicSplitter::new().split(text);
        topics.iter().map(|topic| self.build_presentation(topic)).collect()
    }

    /// Build the presentation for one topic.
    pub fn build_presentation(&self, topic: &Topic) -> Presentation {
        let mut presentation = Presentation::new(topic.heading());
        presentation.add_slide(Slide::Title {
            title: format!("Тема {}", topic.number),
            subtitle: topic.title.clone(),
        });

        if char_len(&topic.body) < self.min_body_chars {
            log::debug!(
                "Topic {} body too short ({} chars), title slide only",
                topic.number,
                char_len(&topic.body)
            );
            return presentation;
        }

        for paragraph in self.chunker.chunk(&topic.body) {
            self.classifier
                .classify_into(&paragraph, &topic.title, &mut presentation.slides);
        }

        log::debug!("Topic {}: {} slides", topic.number, presentation.slides.len());
        presentation
    }
}

/// Segment document text into presentations.
///
/// Never fails: text without topic headers yields an empty list, and topics
/// without usable paragraphs yield only their title slide.
pub fn segment(text: &str, options: &SegmentOptions) -> Vec<Presentation> {
    Segmenter::new(options.clone()).segment(text)
}
