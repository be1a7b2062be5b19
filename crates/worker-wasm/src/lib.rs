//! WASM-compatible wrapper for lecture segmentation.
//!
//! This crate exposes slide segmentation and lecture extraction to
//! JavaScript for use in the browser and in Cloudflare Workers.

use lecdeck_core::{
    decode_text, segment, DeckSummary, Discipline, DisciplineRegistry, LectureMap, Presentation,
    SegmentOptions, SourceFormat,
};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in the console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Result of segmenting a document.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentResult {
    /// Detected format of the source ("docx", "doc" or "text").
    pub format: String,
    /// One presentation per topic.
    pub presentations: Vec<Presentation>,
    /// Total number of slides across all presentations.
    pub slide_count: usize,
    /// Warning message if no topics were found.
    pub warning: Option<String>,
}

/// Segment already-decoded text into presentations.
///
/// # Arguments
/// * `text` - Document text containing "Тема N" headers
/// * `options` - Optional threshold overrides (camelCase keys)
///
/// # Returns
/// A JavaScript object with the segmentation result, or throws on invalid options.
#[wasm_bindgen]
pub fn segment_text(text: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options = parse_options(options)?;
    to_js(&segment_text_impl(text, "text", &options))
}

/// Extract text from a document file and segment it.
///
/// # Arguments
/// * `data` - The raw bytes of the DOCX, DOC or text file
/// * `filename` - The original filename (used for format detection)
/// * `options` - Optional threshold overrides (camelCase keys)
#[wasm_bindgen]
pub fn segment_document(data: &[u8], filename: &str, options: JsValue) -> Result<JsValue, JsValue> {
    let options = parse_options(options)?;
    let result = segment_document_impl(data, filename, &options).map_err(|e| JsValue::from_str(&e))?;
    to_js(&result)
}

/// Extract lectures from a combined multi-discipline text.
///
/// # Arguments
/// * `text` - Document text with discipline headers and "Тема N" topics
/// * `registry` - Array of `{id, name, description}` disciplines
///
/// # Returns
/// An object keyed by discipline id.
#[wasm_bindgen]
pub fn extract_lectures(text: &str, registry: JsValue) -> Result<JsValue, JsValue> {
    let disciplines: Vec<Discipline> = serde_wasm_bindgen::from_value(registry)
        .map_err(|e| JsValue::from_str(&format!("Invalid registry array: {}", e)))?;

    to_js(&extract_lectures_impl(text, disciplines))
}

fn parse_options(options: JsValue) -> Result<SegmentOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(SegmentOptions::default());
    }

    let options: SegmentOptions = serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid options: {}", e)))?;
    options
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(options)
}

/// Serialize plain objects rather than ES2015 `Map`s.
fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {}", e)))
}

fn format_name(format: SourceFormat) -> &'static str {
    match format {
        SourceFormat::Docx => "docx",
        SourceFormat::Doc => "doc",
        SourceFormat::Text => "text",
    }
}

fn segment_text_impl(text: &str, format: &str, options: &SegmentOptions) -> SegmentResult {
    let presentations = segment(text, options);
    let summary = DeckSummary::from_presentations(&presentations);

    let warning = if presentations.is_empty() {
        Some("No \"Тема N\" topic headers found".to_string())
    } else {
        None
    };

    SegmentResult {
        format: format.to_string(),
        presentations,
        slide_count: summary.slides,
        warning,
    }
}

fn segment_document_impl(
    data: &[u8],
    filename: &str,
    options: &SegmentOptions,
) -> Result<SegmentResult, String> {
    let (format, text) = read_document(data, filename)?;
    Ok(segment_text_impl(&text, format_name(format), options))
}

fn read_document(data: &[u8], filename: &str) -> Result<(SourceFormat, String), String> {
    let format = SourceFormat::detect(data, filename);

    let text = match format {
        SourceFormat::Docx => lecdeck_docx::DocxParser::new()
            .extract_text(Cursor::new(data))
            .map_err(|e| format!("DOCX parsing error: {}", e))?,
        SourceFormat::Doc => lecdeck_doc::DocParser::new()
            .extract_text(Cursor::new(data))
            .map_err(|e| format!("DOC parsing error: {}", e))?,
        SourceFormat::Text => decode_text(data).text,
    };

    Ok((format, text))
}

fn extract_lectures_impl(text: &str, disciplines: Vec<Discipline>) -> LectureMap {
    let registry = DisciplineRegistry::new(disciplines);
    lecdeck_core::extract_lectures(text, &registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Тема 1. Введение\n\
        Первый абзац, который достаточно длинный для выделения.\n\n\
        Второй абзац, который достаточно длинный для выделения.\n";

    #[test]
    fn test_segment_text() {
        let result = segment_text_impl(SAMPLE, "text", &SegmentOptions::default());

        assert_eq!(result.presentations.len(), 1);
        assert_eq!(result.presentations[0].title, "Тема 1. Введение");
        assert_eq!(result.slide_count, 3);
        assert!(result.warning.is_none());
    }

    #[test]
    fn test_segment_text_without_topics() {
        let result = segment_text_impl("просто текст", "text", &SegmentOptions::default());

        assert!(result.presentations.is_empty());
        assert_eq!(result.slide_count, 0);
        assert!(result.warning.is_some());
    }

    #[test]
    fn test_segment_plain_text_document() {
        let result =
            segment_document_impl(SAMPLE.as_bytes(), "lecture.txt", &SegmentOptions::default())
                .unwrap();

        assert_eq!(result.format, "text");
        assert_eq!(result.presentations.len(), 1);
    }

    #[test]
    fn test_broken_docx_reports_error() {
        let err = segment_document_impl(b"PK\x03\x04broken", "lecture.docx", &SegmentOptions::default())
            .unwrap_err();
        assert!(err.starts_with("DOCX parsing error"));
    }

    #[test]
    fn test_extract_lectures() {
        let disciplines = vec![Discipline::new("ethno", "Этнопедагогика", "")];
        let map = extract_lectures_impl("Этнопедагогика\nТема 1. А\nтекст\n", disciplines);

        assert_eq!(map.len(), 1);
        assert_eq!(map["ethno"].lectures[0].id, "tema-1");
    }
}
