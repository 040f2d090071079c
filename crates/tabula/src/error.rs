//! Error type shared by the facade

use thiserror::Error;

use tabula_csv::CsvError;
use tabula_xlsx::XlsxError;

/// Result type for facade operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad class of an [`Error`], stable across codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A typed accessor was used on a cell of another type
    TypeMismatch,
    /// The input is not a valid document of its format
    Format,
    /// Out-of-range index or invalid argument
    Bounds,
    /// Underlying I/O failure
    Io,
    /// Operation not allowed in the document's current state
    Lifecycle,
    Other,
}

/// Errors from the model, the codecs and the pipeline
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] tabula_core::Error),

    #[error(transparent)]
    Xlsx(#[from] XlsxError),

    #[error(transparent)]
    Csv(#[from] CsvError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No registered file type handles the path
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Pipeline used out of order
    #[error("Invalid state: {0}")]
    Lifecycle(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    pub(crate) fn lifecycle<S: Into<String>>(msg: S) -> Self {
        Error::Lifecycle(msg.into())
    }

    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Core(e) => core_kind(e),
            Error::Xlsx(XlsxError::Io(_)) => ErrorKind::Io,
            Error::Xlsx(XlsxError::Core(e)) => core_kind(e),
            Error::Xlsx(XlsxError::Streaming(_)) => ErrorKind::Lifecycle,
            Error::Xlsx(e) if e.is_format() => ErrorKind::Format,
            Error::Xlsx(_) => ErrorKind::Other,
            Error::Csv(CsvError::Io(_)) => ErrorKind::Io,
            Error::Csv(CsvError::Core(e)) => core_kind(e),
            Error::Csv(CsvError::UnsupportedCharset(_) | CsvError::InvalidOption(_)) => {
                ErrorKind::Bounds
            }
            Error::Csv(e) if e.is_format() => ErrorKind::Format,
            Error::Csv(CsvError::Csv(_)) => ErrorKind::Io,
            Error::Csv(_) => ErrorKind::Other,
            Error::Io(_) => ErrorKind::Io,
            Error::UnsupportedFileType(_) => ErrorKind::Bounds,
            Error::Lifecycle(_) => ErrorKind::Lifecycle,
            Error::Other(_) => ErrorKind::Other,
        }
    }
}

fn core_kind(e: &tabula_core::Error) -> ErrorKind {
    match e {
        tabula_core::Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
        tabula_core::Error::Closed | tabula_core::Error::RowFlushed(_) => ErrorKind::Lifecycle,
        tabula_core::Error::InvalidFormat(_) => ErrorKind::Format,
        e if e.is_bounds() => ErrorKind::Bounds,
        _ => ErrorKind::Other,
    }
}
