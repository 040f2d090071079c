//! XLSX writer

pub(crate) mod package;
pub(crate) mod worksheet;

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tabula_core::{BackingKind, Progress, Sheet, Workbook};
use zip::ZipWriter;

use crate::error::{Result, XlsxError};
use crate::styles::XlsxStyleTable;
use package::SheetEntry;
use worksheet::SheetLinks;

/// XLSX file writer for workbooks held fully in memory
pub struct XlsxWriter;

impl XlsxWriter {
    /// Write a workbook to a file path
    pub fn write_file<P: AsRef<Path>>(workbook: &Workbook, path: P) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        Self::write(workbook, file, &mut Progress::none())
    }

    /// Write a workbook to a writer
    ///
    /// Streaming workbooks have already flushed their rows and are refused.
    pub fn write<W: Write + Seek>(
        workbook: &Workbook,
        writer: W,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        workbook.ensure_open()?;
        if workbook.kind() == BackingKind::Streaming {
            return Err(XlsxError::Streaming(
                "a streaming workbook is written by closing it".into(),
            ));
        }

        let mut zip = ZipWriter::new(writer);
        let style_table = XlsxStyleTable::build(workbook.styles());
        let active = workbook.current_sheet().unwrap_or(0);
        let total_rows: usize = workbook.sheets().map(|s| s.rows().count()).sum();
        let mut done = 0;

        let mut entries = Vec::with_capacity(workbook.sheet_count());
        for (i, sheet) in workbook.sheets().enumerate() {
            package::start_part(&mut zip, &package::sheet_part_name(i))?;
            let (last_col, links) =
                Self::write_worksheet(&mut zip, sheet, i == active, &style_table, |n| {
                    done += n;
                    progress.update(done, total_rows);
                })?;
            package::write_sheet_rels(&mut zip, i, &links)?;
            entries.push(SheetEntry {
                name: sheet.name().to_string(),
                filter: worksheet::auto_filter_region(sheet, last_col),
            });
        }

        package::write_package_parts(&mut zip, &entries, active, &style_table)?;
        zip.finish()?;
        progress.finish();
        log::debug!(
            "wrote {} sheets and {} styles as XLSX",
            entries.len(),
            style_table.len()
        );
        Ok(())
    }

    /// Write one worksheet part, returning the last used column and the sheet's links
    fn write_worksheet<W: Write + Seek>(
        zip: &mut ZipWriter<W>,
        sheet: &Sheet,
        selected: bool,
        style_table: &XlsxStyleTable,
        mut on_rows: impl FnMut(usize),
    ) -> Result<(u32, SheetLinks)> {
        zip.write_all(worksheet::header(sheet, selected).as_bytes())?;
        let mut last_col = 0;
        let mut links = SheetLinks::default();
        for row in sheet.rows() {
            if let Some(col) = row.last_used_col() {
                last_col = last_col.max(col);
            }
            links.collect(row);
            zip.write_all(worksheet::row_xml(row, style_table).as_bytes())?;
            on_rows(1);
        }
        zip.write_all(worksheet::footer(sheet, last_col, &links).as_bytes())?;
        Ok((last_col, links))
    }
}
