//! CSV writer

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use encoding_rs::Encoding;
use tabula_core::format::format_exact;
use tabula_core::{CellValue, IoOptions, NumberFormat, Progress, Sheet, StyleRegistry, Workbook};

use crate::error::{CsvError, Result};
use crate::reader::ascii_byte;

/// CSV file writer
///
/// Every sheet is written in order, separated by a blank line. Dates use the
/// configured date format and unformatted numbers their exact value; every
/// other cell is written as its logical text.
pub struct CsvWriter;

impl CsvWriter {
    /// Write a workbook to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        workbook: &Workbook,
        path: P,
        options: &IoOptions,
    ) -> Result<()> {
        let file = File::create(path)?;
        Self::write(workbook, BufWriter::new(file), options, &mut Progress::none())
    }

    /// Write a workbook to a writer
    pub fn write<W: Write>(
        workbook: &Workbook,
        mut writer: W,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        workbook.ensure_open()?;
        let encoding = Encoding::for_label(options.charset.trim().as_bytes())
            .ok_or_else(|| CsvError::UnsupportedCharset(options.charset.clone()))?;
        let delimiter = ascii_byte(options.delimiter_char(), "delimiter")?;
        let quote = ascii_byte(options.text_qualifier, "text qualifier")?;

        let total: usize = workbook
            .sheets()
            .map(|s| (s.row_count() - s.first_row()) as usize)
            .sum();
        let mut done = 0;
        let mut text = String::new();
        for (i, sheet) in workbook.sheets().enumerate() {
            if i > 0 {
                text.push('\n');
            }
            let mut csv_writer = csv::WriterBuilder::new()
                .delimiter(delimiter)
                .quote(quote)
                .quote_style(csv::QuoteStyle::Necessary)
                .from_writer(Vec::new());
            for row in sheet.first_row()..sheet.row_count() {
                csv_writer.write_record(record(sheet, row, workbook.styles(), options))?;
                done += 1;
                progress.update(done, total);
            }
            let bytes = csv_writer
                .into_inner()
                .map_err(|e| CsvError::Io(e.into_error()))?;
            text.push_str(&String::from_utf8_lossy(&bytes));
        }

        let (bytes, used, unmappable) = encoding.encode(&text);
        if unmappable {
            log::warn!("characters not representable in {} written as references", used.name());
        }
        if used != encoding {
            log::debug!("{} output written as {}", encoding.name(), used.name());
        }
        writer.write_all(&bytes)?;
        writer.flush()?;
        progress.finish();
        log::debug!("wrote {} CSV rows from {} sheets", done, workbook.sheet_count());
        Ok(())
    }
}

/// The fields of one row; a row without cells becomes a single empty field so
/// its line survives a re-read
fn record(sheet: &Sheet, row: u32, styles: &StyleRegistry, options: &IoOptions) -> Vec<String> {
    let row = match sheet.row(row) {
        Some(row) => row,
        None => return vec![String::new()],
    };
    let last = match row.last_used_col() {
        Some(last) => last,
        None => return vec![String::new()],
    };
    (0..=last)
        .map(|col| match row.cell(col) {
            Some(cell) => match cell.value() {
                CellValue::Date(d) => options
                    .date_format
                    .pattern(options.locale, false)
                    .format(&d.and_time(chrono::NaiveTime::MIN), options.locale),
                CellValue::DateTime(dt) => options
                    .date_format
                    .pattern(options.locale, true)
                    .format(dt, options.locale),
                CellValue::Numeric(n)
                    if styles.with_style(cell.style_id(), |s| {
                        s.number_format == NumberFormat::General
                    }) =>
                {
                    format_exact(*n, options.locale)
                }
                _ => cell.as_text(styles, options.locale),
            },
            None => String::new(),
        })
        .collect()
}
