//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type Result<T> = std::result::Result<T, CsvError>;

/// Errors that can occur during CSV operations
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed input, e.g. a ragged row in strict mode
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Charset label encoding_rs does not know
    #[error("Unsupported charset: {0}")]
    UnsupportedCharset(String),

    /// Delimiter or qualifier the codec cannot use
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] tabula_core::Error),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl CsvError {
    pub fn other<S: Into<String>>(msg: S) -> Self {
        CsvError::Other(msg.into())
    }

    /// Whether the input text itself is at fault
    pub fn is_format(&self) -> bool {
        match self {
            CsvError::Csv(e) => !matches!(e.kind(), csv::ErrorKind::Io(_)),
            _ => false,
        }
    }
}
