//! # tabula-csv
//!
//! CSV reader and writer for tabula.
//!
//! Fields are typed on read by [`SheetRowBuilder`]; custom sinks implement
//! [`RowBuilder`] and are fed by [`CsvReader::read_rows`].

mod error;
mod reader;
mod row_builder;
mod writer;

pub use error::{CsvError, Result};
pub use reader::{CsvReader, SHEET_NAME};
pub use row_builder::{RowBuilder, SheetRowBuilder};
pub use writer::CsvWriter;
