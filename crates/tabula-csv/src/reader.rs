//! CSV reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use encoding_rs::Encoding;
use tabula_core::{BackingKind, IoOptions, Progress, Workbook};

use crate::error::{CsvError, Result};
use crate::row_builder::{RowBuilder, SheetRowBuilder};

/// Name of the single sheet a CSV file is read into
pub const SHEET_NAME: &str = "Sheet 1";

/// CSV file reader
pub struct CsvReader;

impl CsvReader {
    /// Read a CSV file into a new workbook; the path is remembered by the workbook
    pub fn read_file<P: AsRef<Path>>(path: P, options: &IoOptions) -> Result<Workbook> {
        let file = File::open(path.as_ref())?;
        let mut workbook = Self::read(file, options, &mut Progress::none())?;
        workbook.set_path(Some(path.as_ref()));
        Ok(workbook)
    }

    /// Read CSV from a reader into a new workbook with one sheet
    pub fn read<R: Read>(
        reader: R,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<Workbook> {
        let mut workbook = Workbook::with_kind(BackingKind::Generic);
        workbook.set_locale(options.locale);
        let sheet = workbook.create_sheet(SHEET_NAME)?;
        let mut builder = SheetRowBuilder::new(sheet, options);
        Self::read_rows(reader, options, &mut builder, progress)?;
        Ok(workbook)
    }

    /// Feed every record of `reader` to a row builder
    ///
    /// Returns the number of records read.
    pub fn read_rows<R: Read, B: RowBuilder>(
        mut reader: R,
        options: &IoOptions,
        builder: &mut B,
        progress: &mut Progress<'_>,
    ) -> Result<usize> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = decode(&bytes, &options.charset)?;
        let total = text.len();

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(ascii_byte(options.delimiter_char(), "delimiter")?)
            .quote(ascii_byte(options.text_qualifier, "text qualifier")?)
            .has_headers(false)
            .flexible(!options.strict)
            .from_reader(text.as_bytes());

        let mut count = 0;
        let mut record = csv::StringRecord::new();
        while csv_reader.read_record(&mut record)? {
            builder.start_row()?;
            for field in record.iter() {
                builder.add(field)?;
            }
            builder.end_row()?;
            count += 1;
            progress.update(record.position().map_or(0, |p| p.byte() as usize), total);
        }
        progress.finish();
        log::debug!("read {} CSV records", count);
        Ok(count)
    }
}

/// Decode `bytes` using `charset`; a byte order mark takes precedence
fn decode(bytes: &[u8], charset: &str) -> Result<String> {
    let encoding = Encoding::for_label(charset.trim().as_bytes())
        .ok_or_else(|| CsvError::UnsupportedCharset(charset.to_string()))?;
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        log::warn!("malformed {} input replaced with U+FFFD", used.name());
    }
    if used != encoding {
        log::debug!("byte order mark selects {} over {}", used.name(), encoding.name());
    }
    Ok(text.into_owned())
}

pub(crate) fn ascii_byte(c: char, what: &str) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(CsvError::InvalidOption(format!(
            "{} '{}' must be an ASCII character",
            what, c
        )))
    }
}
