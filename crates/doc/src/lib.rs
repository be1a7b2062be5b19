//! Legacy Word 97-2003 (.doc) text extraction for lecture documents.
//!
//! Parses .doc files stored in the Microsoft Compound File Binary (CFB)
//! container by walking the piece table of the main document. This is a
//! best-effort implementation: only the main text is extracted, and
//! formatting, headers, footnotes and embedded objects are ignored.

pub mod parser;

pub use parser::DocParser;
