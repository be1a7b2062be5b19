//! DOCX (Office Open XML) text extraction for lecture documents.
//!
//! Reads `word/document.xml` from the ZIP container and flattens it to one
//! line per paragraph.

pub mod parser;

pub use parser::DocxParser;
