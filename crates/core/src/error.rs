//! Error types for lecture document processing.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring or configuring a segmentation run.
///
/// The segmentation itself never fails; these cover the document-acquisition
/// boundary and the decoding of options and registries.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to open or read the input file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse the DOCX file structure.
    #[error("DOCX parsing error: {0}")]
    DocxParseError(String),

    /// Failed to parse the legacy DOC file structure.
    #[error("DOC parsing error: {0}")]
    DocParseError(String),

    /// The document is password protected.
    #[error("Document is encrypted")]
    EncryptedDocument,

    /// ZIP archive error (for DOCX).
    #[error("ZIP error: {0}")]
    ZipError(String),

    /// XML parsing error (for DOCX).
    #[error("XML parsing error: {0}")]
    XmlError(String),

    /// OLE/CFB container error (for DOC).
    #[error("OLE/CFB error: {0}")]
    CfbError(String),

    /// Segmentation options are out of range.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// JSON (de)serialization error for options, registries and output.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
