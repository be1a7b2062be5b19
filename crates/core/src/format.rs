//! Output formatting for presentations and lecture maps.
//!
//! Besides plain JSON, presentations can be rendered as a JavaScript object
//! literal (`presentations: [ ... ]`) for pasting into a hand-maintained data
//! file, and lecture maps as a `var lecturesData = ...;` module.

use crate::error::Result;
use crate::types::{LectureMap, ListItem, Presentation, Slide};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Serialize any output value as pretty-printed JSON (two-space indent).
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render a lecture map as a script that assigns it to `lecturesData`.
pub fn format_lectures_module(lectures: &LectureMap) -> Result<String> {
    Ok(format!("var lecturesData = {};\n", to_json_pretty(lectures)?))
}

/// Escape a string for a single-quoted JavaScript literal.
pub fn escape_single_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Formats presentations as a `presentations: [ ... ]` object-literal
/// property.
#[derive(Debug, Clone)]
pub struct ScriptFormatter {
    /// Indentation of the `presentations:` line.
    base_indent: String,
    /// Indentation added per nesting level.
    step: String,
}

impl Default for ScriptFormatter {
    fn default() -> Self {
        Self {
            base_indent: "    ".to_string(),
            step: "  ".to_string(),
        }
    }
}

impl ScriptFormatter {
    /// Create a formatter with a four-space base indent and two-space steps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation of the outermost line.
    pub fn with_base_indent(mut self, indent: impl Into<String>) -> Self {
        self.base_indent = indent.into();
        self
    }

    /// Render the presentations property, ending in a newline.
    pub fn format(&self, presentations: &[Presentation]) -> String {
        let mut out = ScriptWriter::new(&self.base_indent, &self.step);

        out.line(0, "presentations: [");
        for presentation in presentations {
            out.line(1, "{");
            out.string_field(2, "title", &presentation.title);
            out.line(2, "slides: [");
            for slide in &presentation.slides {
                out.line(3, "{");
                write_slide(&mut out, 4, slide);
                out.line(3, "},");
            }
            out.line(2, "],");
            out.line(1, "},");
        }
        out.line(0, "]");

        out.finish()
    }
}

fn write_slide(out: &mut ScriptWriter, level: usize, slide: &Slide) {
    out.string_field(level, "type", slide.kind());
    out.string_field(level, "title", slide.title());

    match slide {
        Slide::Title { subtitle, .. } => out.string_field(level, "subtitle", subtitle),
        Slide::Highlight { highlight_text, .. } => {
            out.string_field(level, "highlightText", highlight_text)
        }
        Slide::Content { content, .. } => out.string_array(level, "content", content),
        Slide::TwoColumn {
            left_content,
            right_content,
            ..
        } => {
            out.string_array(level, "leftContent", left_content);
            out.string_array(level, "rightContent", right_content);
        }
        Slide::List { list_items, .. } => write_list_items(out, level, list_items),
    }
}

fn write_list_items(out: &mut ScriptWriter, level: usize, items: &[ListItem]) {
    out.line(level, "listItems: [");
    for item in items {
        out.line(level + 1, "{");
        out.string_field(level + 2, "title", &item.title);
        out.string_field(level + 2, "text", &item.text);
        out.line(level + 1, "},");
    }
    out.line(level, "],");
}

/// Line buffer with level-based indentation.
struct ScriptWriter<'a> {
    base: &'a str,
    step: &'a str,
    buf: String,
}

impl<'a> ScriptWriter<'a> {
    fn new(base: &'a str, step: &'a str) -> Self {
        Self {
            base,
            step,
            buf: String::new(),
        }
    }

    fn line(&mut self, level: usize, text: &str) {
        self.buf.push_str(self.base);
        for _ in 0..level {
            self.buf.push_str(self.step);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    fn string_field(&mut self, level: usize, key: &str, value: &str) {
        self.line(level, &format!("{}: '{}',", key, escape_single_quoted(value)));
    }

    fn string_array(&mut self, level: usize, key: &str, values: &[String]) {
        self.line(level, &format!("{}: [", key));
        for value in values {
            self.line(level + 1, &format!("'{}',", escape_single_quoted(value)));
        }
        self.line(level, "],");
    }

    fn finish(self) -> String {
        self.buf
    }
}

/// Slide totals for a batch of presentations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeckSummary {
    pub presentations: usize,
    pub slides: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
}

impl DeckSummary {
    /// Count presentations and slides by kind.
    pub fn from_presentations(presentations: &[Presentation]) -> Self {
        let mut summary = Self {
            presentations: presentations.len(),
            ..Self::default()
        };

        for presentation in presentations {
            summary.slides += presentation.slides.len();
            for (kind, count) in presentation.slide_counts() {
                *summary.by_kind.entry(kind).or_insert(0) += count;
            }
        }

        summary
    }
}

impl fmt::Display for DeckSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} presentations, {} slides", self.presentations, self.slides)?;
        if !self.by_kind.is_empty() {
            let parts: Vec<String> = self
                .by_kind
                .iter()
                .map(|(kind, count)| format!("{} {}", count, kind))
                .collect();
            write!(f, " ({})", parts.join(", "))?;
        }
        Ok(())
    }
}
