//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type Result<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur during XLSX reading/writing
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Malformed XML attribute
    #[error("XML attribute error: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),

    /// Invalid file format
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Streaming workbook used out of order (after close, or a finished sheet)
    #[error("Streaming workbook: {0}")]
    Streaming(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] tabula_core::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl XlsxError {
    pub fn other<S: Into<String>>(msg: S) -> Self {
        XlsxError::Other(msg.into())
    }

    /// Whether the error comes from malformed container content rather than I/O
    pub fn is_format(&self) -> bool {
        matches!(
            self,
            XlsxError::Zip(_)
                | XlsxError::Xml(_)
                | XlsxError::Attribute(_)
                | XlsxError::InvalidFormat(_)
                | XlsxError::MissingPart(_)
                | XlsxError::Parse(_)
        )
    }
}
