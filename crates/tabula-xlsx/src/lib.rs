//! # tabula-xlsx
//!
//! XLSX (Office Open XML) codec for tabula.
//!
//! - [`XlsxReader`] maps a container onto a [`tabula_core::Workbook`]
//! - [`XlsxWriter`] serializes an in-memory workbook
//! - [`StreamingXlsxWorkbook`] appends rows straight into an archive, keeping only
//!   a window of rows in memory
//!
//! Style names survive a round trip: every registry style is published as a named
//! cell style, and cell `s` indexes equal style ids.

pub mod error;
pub mod reader;
pub mod streaming;
pub mod writer;

mod styles;
mod xml;

pub use error::{Result, XlsxError};
pub use reader::XlsxReader;
pub use streaming::{StreamingXlsxWorkbook, DEFAULT_WINDOW};
pub use writer::XlsxWriter;
