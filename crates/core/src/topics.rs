//! Topic splitting: partitions line-oriented text into numbered topics.
//!
//! A topic starts at a header line such as "Тема 3. Методы обучения" and
//! runs until the next header or the end of input. Text before the first
//! header has no topic to belong to and is dropped.

use crate::normalize::TextNormalizer;
use crate::types::Topic;
use regex::Regex;
use std::sync::LazyLock;

/// "Тема <N><separator><title>", separator being `.`, `)`, `:` or whitespace.
static TOPIC_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^Тема\s+(\d+)(?:\s*[.):]\s*|\s+)(.+?)\s*$").unwrap()
});

/// Same as [`TOPIC_HEADER_REGEX`], also accepting the "Старая)" prefix used
/// for superseded topics in combined lecture sources.
static LEGACY_TOPIC_HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:Старая\)\s*)?Тема\s+(\d+)(?:\s*[.):]\s*|\s+)(.+?)\s*$").unwrap()
});

/// A parsed topic header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicHeader {
    pub number: u32,
    pub title: String,
}

impl TopicHeader {
    /// Parse a trimmed line as a topic header.
    ///
    /// Returns `None` for anything that does not match, including headers
    /// without a title and numbers that do not fit in a `u32`.
    pub fn parse(line: &str, allow_legacy_prefix: bool) -> Option<Self> {
        let regex = if allow_legacy_prefix {
            &*LEGACY_TOPIC_HEADER_REGEX
        } else {
            &*TOPIC_HEADER_REGEX
        };

        let caps = regex.captures(line)?;
        let number = match caps[1].parse::<u32>() {
            Ok(number) => number,
            Err(_) => {
                log::debug!("Topic number out of range, treating as body text: {}", line);
                return None;
            }
        };
        let title = caps[2].trim().to_string();
        if title.is_empty() {
            return None;
        }

        Some(Self { number, title })
    }
}

/// How body lines are stored while a topic is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyMode {
    /// Lines are trimmed and whitespace-collapsed; runs of blank lines are kept
    /// as a single empty separator so paragraph boundaries survive.
    #[default]
    Collapsed,
    /// Lines are kept as they are apart from lecture cleanup; blank lines and
    /// editorial markers are dropped.
    Raw,
}

/// The splitter's state.
#[derive(Debug, Default)]
enum SplitState {
    #[default]
    NoTopic,
    InTopic(OpenTopic),
}

/// A topic whose header has been seen but whose body is still accumulating.
#[derive(Debug)]
struct OpenTopic {
    header: TopicHeader,
    lines: Vec<String>,
}

impl OpenTopic {
    fn close(self) -> Topic {
        let body = self.lines.join("\n").trim().to_string();
        Topic::new(self.header.number, self.header.title, body)
    }
}

/// Line-driven state machine that turns text into topics.
///
/// Feed lines with [`TopicSplitter::push_line`]; a header closes the open
/// topic and returns it. [`TopicSplitter::flush`] closes whatever is still
/// open at the end of input.
#[derive(Debug)]
pub struct TopicSplitter {
    normalizer: TextNormalizer,
    body_mode: BodyMode,
    allow_legacy_prefix: bool,
    state: SplitState,
}

impl Default for TopicSplitter {
    fn default() -> Self {
        Self::new()
    }
}

impl TopicSplitter {
    /// Create a splitter that collapses body whitespace.
    pub fn new() -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            body_mode: BodyMode::Collapsed,
            allow_legacy_prefix: false,
            state: SplitState::NoTopic,
        }
    }

    /// Set how body lines are stored.
    pub fn with_body_mode(mut self, mode: BodyMode) -> Self {
        self.body_mode = mode;
        self
    }

    /// Accept the "Старая)" header prefix.
    pub fn with_legacy_prefix(mut self, allow: bool) -> Self {
        self.allow_legacy_prefix = allow;
        self
    }

    /// Use a custom normalizer for body lines.
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Whether a topic is currently open.
    pub fn in_topic(&self) -> bool {
        matches!(self.state, SplitState::InTopic(_))
    }

    /// Feed one line of source text.
    ///
    /// Returns the previously open topic when this line is a header.
    pub fn push_line(&mut self, raw: &str) -> Option<Topic> {
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            self.push_blank();
            return None;
        }

        let header_line = match self.body_mode {
            BodyMode::Collapsed => self.normalizer.normalize_line(trimmed),
            BodyMode::Raw => trimmed.to_string(),
        };

        if let Some(header) = TopicHeader::parse(&header_line, self.allow_legacy_prefix) {
            log::trace!("Topic header {}: {}", header.number, header.title);
            let closed = self.flush();
            self.state = SplitState::InTopic(OpenTopic {
                header,
                lines: Vec::new(),
            });
            return closed;
        }

        if let SplitState::InTopic(open) = &mut self.state {
            match self.body_mode {
                BodyMode::Collapsed => open.lines.push(header_line),
                BodyMode::Raw => {
                    if let Some(cleaned) = self.normalizer.clean_lecture_line(raw) {
                        open.lines.push(cleaned);
                    }
                }
            }
        }

        None
    }

    /// Close the open topic, if any.
    pub fn flush(&mut self) -> Option<Topic> {
        match std::mem::take(&mut self.state) {
            SplitState::InTopic(open) => Some(open.close()),
            SplitState::NoTopic => None,
        }
    }

    /// Split a whole document into topics.
    pub fn split(mut self, text: &str) -> Vec<Topic> {
        let mut topics = Vec::new();

        for line in text.lines() {
            if let Some(topic) = self.push_line(line) {
                topics.push(topic);
            }
        }
        if let Some(topic) = self.flush() {
            topics.push(topic);
        }

        log::debug!("Split {} topics", topics.len());
        topics
    }

    fn push_blank(&mut self) {
        if self.body_mode == BodyMode::Raw {
            return;
        }
        if let SplitState::InTopic(open) = &mut self.state {
            // Leading blanks and repeated blanks are not kept.
            if open.lines.last().is_some_and(|last| !last.is_empty()) {
                open.lines.push(String::new());
            }
        }
    }
}

/// Split a document into topics with the default settings.
pub fn split_topics(text: &str) -> Vec<Topic> {
    TopicSplitter::new().split(text)
}
