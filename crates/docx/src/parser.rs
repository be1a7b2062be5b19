//! DOCX file parser implementation.

use lecdeck_core::{Error, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Read, Seek};
use zip::ZipArchive;

/// Main document part inside the archive.
const DOCUMENT_PATH: &str = "word/document.xml";

/// Parser for DOCX (Office Open XML) files.
#[derive(Debug, Clone)]
pub struct DocxParser {
    /// Prefix for paragraphs that belong to a Word numbered or bulleted list.
    list_marker: String,
}

impl DocxParser {
    /// Create a new DOCX parser.
    pub fn new() -> Self {
        Self {
            list_marker: "• ".to_string(),
        }
    }

    /// Set the prefix for list paragraphs.
    pub fn with_list_marker(mut self, marker: impl Into<String>) -> Self {
        self.list_marker = marker.into();
        self
    }

    /// Extract the plain text of a DOCX file, one line per paragraph.
    pub fn extract_text<R: Read + Seek>(&self, reader: R) -> Result<String> {
        let mut archive =
            ZipArchive::new(reader).map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let content = self.read_file_from_archive(&mut archive, DOCUMENT_PATH)?;
        Ok(self.extract_from_xml(&content))
    }

    /// Flatten `word/document.xml` content to text.
    pub fn extract_from_xml(&self, xml_content: &str) -> String {
        let mut reader = Reader::from_str(xml_content);
        reader.trim_text(false);

        let mut lines: Vec<String> = Vec::new();
        // Paragraphs nest when a text box sits inside a run.
        let mut open: Vec<ParagraphBuf> = Vec::new();
        let mut in_text = false;
        let mut fallback_depth = 0usize;
        let mut last_error_pos = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"Fallback" => fallback_depth += 1,
                        _ if fallback_depth > 0 => {}
                        b"p" => open.push(ParagraphBuf::default()),
                        b"t" => in_text = true,
                        _ => self.handle_marker(e, &mut open),
                    }
                }
                Ok(Event::Empty(ref e)) => {
                    if fallback_depth > 0 {
                        continue;
                    }
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"p" => lines.push(String::new()),
                        _ => self.handle_marker(e, &mut open),
                    }
                }
                Ok(Event::Text(ref e)) => {
                    if in_text && fallback_depth == 0 {
                        if let Some(paragraph) = open.last_mut() {
                            match e.unescape() {
                                Ok(text) => paragraph.text.push_str(&text),
                                Err(err) => log::warn!("Bad text escape (skipped): {}", err),
                            }
                        }
                    }
                }
                Ok(Event::End(ref e)) => {
                    let name = e.name();
                    match local_name(name.as_ref()) {
                        b"Fallback" => fallback_depth = fallback_depth.saturating_sub(1),
                        _ if fallback_depth > 0 => {}
                        b"t" => in_text = false,
                        b"p" => {
                            if let Some(paragraph) = open.pop() {
                                lines.push(paragraph.finish(&self.list_marker));
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    let pos = reader.buffer_position();
                    log::warn!("XML parsing error at {} (continuing): {}", pos, e);
                    if last_error_pos == Some(pos) {
                        break;
                    }
                    last_error_pos = Some(pos);
                }
                _ => {}
            }
        }

        // Unclosed paragraphs in truncated documents.
        while let Some(paragraph) = open.pop() {
            lines.push(paragraph.finish(&self.list_marker));
        }

        log::debug!("Extracted {} paragraphs from DOCX", lines.len());
        lines.join("\n")
    }

    /// Tabs, breaks and list numbering inside the current paragraph.
    fn handle_marker(&self, e: &BytesStart, open: &mut [ParagraphBuf]) {
        let Some(paragraph) = open.last_mut() else {
            return;
        };
        let name = e.name();
        match local_name(name.as_ref()) {
            b"tab" => paragraph.text.push('\t'),
            b"br" | b"cr" => paragraph.text.push('\n'),
            b"numPr" => paragraph.is_list = true,
            _ => {}
        }
    }

    /// Read a file from the ZIP archive.
    fn read_file_from_archive<R: Read + Seek>(
        &self,
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| Error::DocxParseError(format!("Part not found in archive '{}': {}", path, e)))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| Error::ZipError(format!("Failed to read '{}': {}", path, e)))?;

        Ok(content)
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Text collected for one `w:p`.
#[derive(Debug, Default)]
struct ParagraphBuf {
    text: String,
    is_list: bool,
}

impl ParagraphBuf {
    fn finish(self, list_marker: &str) -> String {
        if self.is_list {
            format!("{}{}", list_marker, self.text)
        } else {
            self.text
        }
    }
}

/// Extract the local name from a potentially namespaced XML element name.
fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}
