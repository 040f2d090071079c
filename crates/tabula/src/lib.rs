//! # tabula
//!
//! A Rust library for reading, writing, and converting spreadsheets.
//!
//! ## Features
//!
//! - Read and write XLSX files (Office Open XML), styles and merges included
//! - Read and write CSV files with locale-aware typing of fields
//! - Stream large XLSX files with a bounded window of rows in memory
//! - Export workbooks as HTML tables
//! - Import database query results
//!
//! File types are resolved by extension through a [`FileTypeRegistry`]. Writing
//! a workbook to a format that cannot serialize its representation copies it
//! into one that can first.
//!
//! ## Example
//!
//! ```rust
//! use tabula::prelude::*;
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.create_sheet("Sheet1").unwrap();
//!
//! sheet.get_cell(0, 0).unwrap().set("Hello");
//! sheet.get_cell(0, 1).unwrap().set(42.0);
//! sheet.get_cell(0, 2).unwrap().set_formula("=B1*2");
//!
//! let mut out = std::io::Cursor::new(Vec::new());
//! workbook
//!     .write(&FileType::csv(), &mut out, &IoOptions::default(), &mut Progress::none())
//!     .unwrap();
//! assert_eq!(out.into_inner(), b"Hello,42,=B1*2\n");
//! ```

pub mod codec;
pub mod db;
pub mod error;
pub mod file_type;
pub mod html;
pub mod pipeline;
pub mod prelude;

pub use codec::{
    CsvCodec, HtmlCodec, ReadSeek, WorkbookFactory, WorkbookReader, WorkbookWriter, WriteSeek,
    XlsxCodec,
};
pub use db::{import_result_set, DbValue, MemoryResultSet, ResultSet};
pub use error::{Error, ErrorKind, Result};
pub use file_type::{FileType, FileTypeRegistry, OpenMode};
pub use html::HtmlWriter;
pub use pipeline::{open_workbook, save_workbook, write_workbook, Document, DocumentState};

// Re-export core types
pub use tabula_core::{
    format, Alignment, BackingKind, BorderEdge, BorderLineStyle, BorderStyle, Cell, CellAddress,
    CellError, CellMut, CellType, CellValue, Color, DateFormatStyle, Delimiter, FillStyle, FontDef,
    FontStyle, HorizontalAlignment, IoOptions, MergeState, NumberFormat, OptionKey, Progress,
    Region, Row, RowMut, SearchOptions, Sheet, Style, StyleId, StyleRegistry, VerticalAlignment,
    Workbook, WorkbookEvent, MAX_COLS, MAX_ROWS, MAX_SHEET_NAME_LEN,
};

// Re-export I/O types
pub use tabula_csv::{CsvError, CsvReader, CsvWriter, RowBuilder, SheetRowBuilder};
pub use tabula_xlsx::{StreamingXlsxWorkbook, XlsxError, XlsxReader, XlsxWriter};

use std::path::Path;

/// Extension trait for Workbook to add file I/O through the default registry
pub trait WorkbookExt {
    /// Open a workbook from a file, choosing the format by extension
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the workbook to a file, choosing the format by extension
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;

    /// Write the workbook as `file_type`
    fn write(
        &self,
        file_type: &FileType,
        out: &mut dyn WriteSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        open_workbook(
            &FileTypeRegistry::with_defaults(),
            path.as_ref(),
            &IoOptions::default(),
            &mut Progress::none(),
        )
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let options = IoOptions::default().with_locale(self.locale());
        save_workbook(
            self,
            &FileTypeRegistry::with_defaults(),
            path.as_ref(),
            &options,
            &mut Progress::none(),
        )
    }

    fn write(
        &self,
        file_type: &FileType,
        out: &mut dyn WriteSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        write_workbook(self, file_type, out, options, progress)
    }
}
