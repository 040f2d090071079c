//! # tabula-core
//!
//! Core data structures for the tabula spreadsheet library.
//!
//! This crate provides the fundamental types used throughout tabula:
//! - [`Cell`], [`CellValue`] and [`CellType`] - typed cell values with merge state
//! - [`Row`], [`Sheet`], [`Workbook`] - the document structures, reserved on access
//! - [`Style`] and [`StyleRegistry`] - named cell styles shared per workbook
//! - [`format`] - locale-aware number and date rendering
//! - [`IoOptions`] - options understood by the codecs
//!
//! ## Example
//!
//! ```rust
//! use tabula_core::{format::Locale, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.create_sheet("Sheet1").unwrap();
//!
//! sheet.get_cell(0, 0).unwrap().set("Hello");
//! sheet.get_cell(0, 1).unwrap().set(123.5);
//! sheet.merge_cell(1, 0, 2, 1).unwrap();
//!
//! let styles = sheet.styles().clone();
//! let cell = sheet.cell(0, 1).unwrap();
//! assert_eq!(cell.as_text(&styles, Locale::DE_DE), "123,5");
//! ```

pub mod cell;
pub mod error;
pub mod event;
pub mod format;
pub mod options;
pub mod progress;
pub mod row;
pub mod sheet;
pub mod style;
pub mod workbook;

// Re-exports for convenience
pub use cell::{
    Cell, CellAddress, CellError, CellMut, CellType, CellValue, MergeState, Region, SharedString,
};
pub use error::{Error, Result};
pub use event::WorkbookEvent;
pub use options::{DateFormatStyle, Delimiter, IoOptions, OptionKey};
pub use progress::Progress;
pub use row::{Row, RowMut};
pub use sheet::{SearchOptions, Sheet, DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT};
pub use workbook::{BackingKind, Workbook};

// Re-export all style types for convenience
pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontDef, FontStyle,
    HorizontalAlignment, NumberFormat, Style, StyleId, StyleRegistry, VerticalAlignment,
};

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a sheet
pub const MAX_COLS: u32 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Text rendered for every ERROR cell
pub const ERROR_TEXT: &str = "#ERROR";
