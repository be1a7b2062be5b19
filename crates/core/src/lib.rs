//! Core domain types, the topic-to-slide segmentation pipeline, lecture
//! extraction, and output formatting for lecture documents.

pub mod classify;
pub mod decode;
pub mod discipline;
pub mod error;
pub mod format;
pub mod lectures;
pub mod normalize;
pub mod options;
pub mod paragraphs;
pub mod segment;
pub mod topics;
pub mod types;

pub use classify::SlideClassifier;
pub use decode::{decode_text, DecodedText};
pub use discipline::{Discipline, DisciplineRegistry};
pub use error::{Error, Result};
pub use format::{format_lectures_module, to_json_pretty, DeckSummary, ScriptFormatter};
pub use lectures::{extract_discipline_lectures, extract_lectures, LectureExtractor};
pub use normalize::TextNormalizer;
pub use options::{ParagraphFallback, SegmentOptions};
pub use paragraphs::ParagraphChunker;
pub use segment::{segment, Segmenter};
pub use topics::{split_topics, TopicSplitter};
pub use types::{
    DisciplineLectures, Lecture, LectureMap, ListItem, Presentation, Slide, SourceFormat, Topic,
};
