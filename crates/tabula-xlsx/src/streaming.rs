//! Streaming XLSX workbook
//!
//! Rows are appended in order and only a window of the most recent rows is kept in
//! memory; older rows are written to the archive and can no longer be reached.
//! Only the sheet created last accepts rows, and creating a new sheet finishes the
//! previous one. The archive is complete only after [`StreamingXlsxWorkbook::close`].
//!
//! View settings and column widths go into the worksheet header, which is written
//! with the first flushed rows, so they must be set before then. Merges and the
//! autofilter are written when the sheet is finished.

use std::io::{Seek, Write};

use tabula_core::{
    BackingKind, CellMut, CellValue, Progress, RowMut, Sheet, Style, StyleId, Workbook,
};
use zip::ZipWriter;

use crate::error::{Result, XlsxError};
use crate::styles::XlsxStyleTable;
use crate::writer::package::{self, SheetEntry};
use crate::writer::worksheet::{self, SheetLinks};

/// Rows kept in memory unless configured otherwise
pub const DEFAULT_WINDOW: usize = 100;

/// The sheet currently receiving rows
#[derive(Debug)]
struct OpenSheet {
    index: usize,
    header_written: bool,
    last_col: u32,
    links: SheetLinks,
}

/// An append-only workbook writing its rows straight into an XLSX archive
pub struct StreamingXlsxWorkbook<W: Write + Seek> {
    workbook: Workbook,
    zip: Option<ZipWriter<W>>,
    output: Option<W>,
    window: usize,
    open: Option<OpenSheet>,
    entries: Vec<SheetEntry>,
}

impl<W: Write + Seek> StreamingXlsxWorkbook<W> {
    pub fn new(writer: W) -> Self {
        Self {
            workbook: Workbook::with_kind(BackingKind::Streaming),
            zip: Some(ZipWriter::new(writer)),
            output: None,
            window: DEFAULT_WINDOW,
            open: None,
            entries: Vec::new(),
        }
    }

    /// Keep `rows` rows in memory (at least one)
    pub fn with_window(mut self, rows: usize) -> Self {
        self.window = rows.max(1);
        self
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Read access to the model; flushed rows are gone from it
    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn cell_style(&self, name: &str) -> Result<StyleId> {
        Ok(self.workbook.cell_style(name)?)
    }

    pub fn copy_cell_style(&self, name: &str, style: &Style) -> Result<StyleId> {
        Ok(self.workbook.copy_cell_style(name, style)?)
    }

    pub fn is_closed(&self) -> bool {
        self.zip.is_none()
    }

    /// Finish the current sheet and start a new one
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        self.ensure_writable()?;
        self.finish_sheet()?;
        self.workbook.create_sheet(name)?;
        let index = self.workbook.sheet_count() - 1;
        self.open = Some(OpenSheet {
            index,
            header_written: false,
            last_col: 0,
            links: SheetLinks::default(),
        });
        self.current_sheet()
    }

    /// The sheet currently receiving rows
    pub fn sheet_mut(&mut self) -> Result<&mut Sheet> {
        self.ensure_writable()?;
        self.current_sheet()
    }

    /// Get a row of the current sheet, flushing rows that fall out of the window
    pub fn get_row(&mut self, row: u32) -> Result<RowMut<'_>> {
        self.flush_for(row)?;
        Ok(self.current_sheet()?.get_row(row)?)
    }

    pub fn get_cell(&mut self, row: u32, col: u32) -> Result<CellMut<'_>> {
        self.flush_for(row)?;
        Ok(self.current_sheet()?.get_cell(row, col)?)
    }

    /// Append a row to the current sheet
    pub fn create_row<I, V>(&mut self, values: I) -> Result<RowMut<'_>>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let next = self.current_sheet()?.row_count();
        self.flush_for(next)?;
        Ok(self.current_sheet()?.create_row(values)?)
    }

    /// Stream the content of an in-memory workbook into this one
    ///
    /// Styles are copied by name. Merged regions are applied as their first row is
    /// reached, so memory stays bounded by the window plus the tallest merge.
    pub fn copy_from(&mut self, other: &Workbook, progress: &mut Progress<'_>) -> Result<()> {
        self.ensure_writable()?;
        for (_, name, style) in other.styles().entries() {
            self.workbook.copy_cell_style(&name, &style)?;
        }

        let total_rows: usize = other.sheets().map(|s| s.rows().count()).sum();
        let mut done = 0;
        for source in other.sheets() {
            let target = self.create_sheet(source.name())?;
            target.split_at(source.split_row(), source.split_col())?;
            target.set_zoom(source.zoom())?;
            target.set_auto_filter_row(source.auto_filter_row());
            for (col, width) in source.column_widths() {
                target.set_column_width(col, width)?;
            }
            let cursor = source.current_cell();
            target.set_current_cell(cursor.row, cursor.col)?;

            let mut regions = source.merged_regions().to_vec();
            regions.sort_by_key(|r| (r.first_row, r.first_col));
            let mut pending = regions.into_iter().peekable();

            for row in source.rows() {
                self.flush_for(row.index())?;
                let sheet = self.current_sheet()?;
                while let Some(region) = pending.next_if(|r| r.first_row <= row.index()) {
                    sheet.merge_cell(
                        region.first_row,
                        region.first_col,
                        region.span_cols(),
                        region.span_rows(),
                    )?;
                }
                sheet.get_row(row.index())?.copy_from(row, other.styles())?;
                done += 1;
                progress.update(done, total_rows);
            }
        }
        if let Some(current) = other.current_sheet() {
            self.workbook.set_current_sheet(current)?;
        }
        progress.finish();
        Ok(())
    }

    /// Finish the last sheet and write the workbook parts
    ///
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.zip.is_none() {
            return Ok(());
        }
        self.finish_sheet()?;

        let style_table = XlsxStyleTable::build(self.workbook.styles());
        let active = self.workbook.current_sheet().unwrap_or(0);
        if let Some(mut zip) = self.zip.take() {
            package::write_package_parts(&mut zip, &self.entries, active, &style_table)?;
            self.output = Some(zip.finish()?);
        }
        log::debug!(
            "closed streaming workbook with {} sheets",
            self.entries.len()
        );
        self.workbook.close();
        Ok(())
    }

    /// Close the workbook and hand back the underlying writer
    pub fn into_inner(mut self) -> Result<W> {
        self.close()?;
        self.output
            .take()
            .ok_or_else(|| XlsxError::Streaming("archive output already taken".into()))
    }

    fn ensure_writable(&self) -> Result<()> {
        if self.zip.is_none() {
            return Err(XlsxError::Streaming("workbook is closed".into()));
        }
        Ok(())
    }

    fn current_sheet(&mut self) -> Result<&mut Sheet> {
        let index = self
            .open
            .as_ref()
            .map(|open| open.index)
            .ok_or_else(|| XlsxError::Streaming("no sheet is open for writing".into()))?;
        Ok(self.workbook.sheet_mut(index)?)
    }

    /// Flush rows so that `row` and the rows before it fit the window
    fn flush_for(&mut self, row: u32) -> Result<()> {
        self.ensure_writable()?;
        let keep_from = (row as u64 + 1).saturating_sub(self.window as u64) as u32;
        self.flush_before(keep_from, false)
    }

    /// Write rows before `keep_from`; the header goes out with the first rows,
    /// or unconditionally when `force_header` is set
    fn flush_before(&mut self, keep_from: u32, force_header: bool) -> Result<()> {
        let (Some(open), Some(zip)) = (self.open.as_mut(), self.zip.as_mut()) else {
            return Ok(());
        };
        let selected = self.workbook.current_sheet() == Some(open.index);
        let Ok(sheet) = self.workbook.sheet_mut(open.index) else {
            return Ok(());
        };
        let evicted = sheet.evict_rows_before(keep_from);
        if evicted.is_empty() && (open.header_written || !force_header) {
            return Ok(());
        }
        let sheet: &Sheet = sheet;

        if !open.header_written {
            package::start_part(zip, &package::sheet_part_name(open.index))?;
            zip.write_all(worksheet::header(sheet, selected).as_bytes())?;
            open.header_written = true;
        }
        if evicted.is_empty() {
            return Ok(());
        }

        let style_table = XlsxStyleTable::build(sheet.styles());
        for row in &evicted {
            if let Some(col) = row.last_used_col() {
                open.last_col = open.last_col.max(col);
            }
            open.links.collect(row);
            zip.write_all(worksheet::row_xml(row, &style_table).as_bytes())?;
        }
        log::debug!(
            "flushed {} rows of sheet '{}', {} kept",
            evicted.len(),
            sheet.name(),
            sheet.rows().count()
        );
        Ok(())
    }

    /// Write out every remaining row of the open sheet and close its part
    fn finish_sheet(&mut self) -> Result<()> {
        let Some(index) = self.open.as_ref().map(|open| open.index) else {
            return Ok(());
        };
        let row_count = self
            .workbook
            .sheet(index)
            .map_or(0, Sheet::row_count);
        self.flush_before(row_count, true)?;

        if let (Some(open), Some(zip), Some(sheet)) = (
            self.open.take(),
            self.zip.as_mut(),
            self.workbook.sheet(index),
        ) {
            zip.write_all(worksheet::footer(sheet, open.last_col, &open.links).as_bytes())?;
            package::write_sheet_rels(zip, index, &open.links)?;
            self.entries.push(SheetEntry {
                name: sheet.name().to_string(),
                filter: worksheet::auto_filter_region(sheet, open.last_col),
            });
        }
        Ok(())
    }
}

impl<W: Write + Seek> std::fmt::Debug for StreamingXlsxWorkbook<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamingXlsxWorkbook")
            .field("window", &self.window)
            .field("open", &self.open)
            .field("sheets", &self.entries.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
