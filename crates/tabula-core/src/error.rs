//! Error types for tabula-core

use crate::cell::CellType;
use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tabula-core
#[derive(Debug, Error)]
pub enum Error {
    /// Typed accessor called on a cell holding a different type
    #[error("Cannot get {expected} value from cell of type {actual}")]
    TypeMismatch {
        expected: CellType,
        actual: CellType,
    },

    /// Invalid cell address format
    #[error("Invalid cell address: {0}")]
    InvalidAddress(String),

    /// Invalid cell range format
    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    /// Row index out of bounds
    #[error("Row index {0} out of bounds (max: {1})")]
    RowOutOfBounds(u32, u32),

    /// Column index out of bounds
    #[error("Column index {0} out of bounds (max: {1})")]
    ColumnOutOfBounds(u32, u32),

    /// Row has already been flushed by a streaming workbook
    #[error("Row {0} has already been flushed and is no longer accessible")]
    RowFlushed(u32),

    /// Sheet index out of bounds
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),

    /// Sheet not found by name
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Invalid sheet name
    #[error("Invalid sheet name: {0}")]
    InvalidSheetName(String),

    /// Duplicate sheet name
    #[error("Sheet name already exists: {0}")]
    DuplicateSheetName(String),

    /// Merge span smaller than one cell
    #[error("Invalid merge span: {cols} columns x {rows} rows")]
    InvalidMergeSpan { cols: u32, rows: u32 },

    /// Merge rectangle overlaps an existing merged region
    #[error("Region {0} overlaps an existing merged region")]
    MergeConflict(String),

    /// Unmerge requested on a cell that is not part of a merged region
    #[error("Cell {0} is not part of a merged region")]
    NotMerged(String),

    /// Argument outside its allowed domain
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown or unsupported locale identifier
    #[error("Unsupported locale: {0}")]
    UnsupportedLocale(String),

    /// Text could not be parsed as a number format or date pattern
    #[error("Invalid format pattern: {0}")]
    InvalidFormat(String),

    /// Operation on a workbook that has been closed
    #[error("Workbook has been closed")]
    Closed,

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Whether this error is a caller-fixable bounds/argument error
    pub fn is_bounds(&self) -> bool {
        matches!(
            self,
            Error::InvalidAddress(_)
                | Error::InvalidRange(_)
                | Error::RowOutOfBounds(..)
                | Error::ColumnOutOfBounds(..)
                | Error::SheetOutOfBounds(..)
                | Error::SheetNotFound(_)
                | Error::InvalidSheetName(_)
                | Error::DuplicateSheetName(_)
                | Error::InvalidMergeSpan { .. }
                | Error::MergeConflict(_)
                | Error::NotMerged(_)
                | Error::InvalidArgument(_)
                | Error::UnsupportedLocale(_)
        )
    }
}
