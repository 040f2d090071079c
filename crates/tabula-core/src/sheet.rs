//! Sheet type

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::cell::{Cell, CellAddress, CellMut, CellValue, MergeState, Region};
use crate::error::{Error, Result};
use crate::format::Locale;
use crate::row::{Row, RowMut};
use crate::style::StyleRegistry;
use crate::{MAX_COLS, MAX_ROWS};

/// Column width used when no override is set, in character units
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// Row height used when no override is set, in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Options for [`Sheet::find`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchOptions {
    pub ignore_case: bool,
    /// The whole cell text must equal the search text
    pub match_complete_text: bool,
    /// Start after the current cell and wrap around
    pub search_from_current: bool,
    /// Move the current cell to the match
    pub update_current_cell: bool,
    /// Match formula cells against their formula text instead of the rendered text
    pub search_formula_text: bool,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_case(mut self, yes: bool) -> Self {
        self.ignore_case = yes;
        self
    }

    pub fn match_complete_text(mut self, yes: bool) -> Self {
        self.match_complete_text = yes;
        self
    }

    pub fn search_from_current(mut self, yes: bool) -> Self {
        self.search_from_current = yes;
        self
    }

    pub fn update_current_cell(mut self, yes: bool) -> Self {
        self.update_current_cell = yes;
        self
    }

    pub fn search_formula_text(mut self, yes: bool) -> Self {
        self.search_formula_text = yes;
        self
    }
}

/// A sheet (single table in a workbook)
///
/// Rows are reserved on access, like the cells inside them. A streaming workbook
/// evicts rows from the front; those rows report [`Error::RowFlushed`] afterwards.
#[derive(Debug)]
pub struct Sheet {
    /// Sheet name
    name: String,
    /// Styles shared with the owning workbook
    styles: Arc<StyleRegistry>,
    /// Locale used to render cells for searching
    locale: Locale,
    /// Rows from `first_row` on
    rows: Vec<Row>,
    /// Index of the first row still held in memory
    first_row: u32,
    /// Merged regions, pairwise disjoint
    merged: Vec<Region>,
    /// Frozen rows and columns above/left of the split
    split: (u32, u32),
    /// Zoom factor, 1.0 = 100%
    zoom: f64,
    /// Column width overrides
    column_widths: BTreeMap<u32, f64>,
    auto_filter_row: Option<u32>,
    current_cell: CellAddress,
}

impl Sheet {
    /// Create an empty sheet using `styles` for its cells
    pub fn new<S: Into<String>>(name: S, styles: Arc<StyleRegistry>) -> Self {
        Self {
            name: name.into(),
            styles,
            locale: Locale::default(),
            rows: Vec::new(),
            first_row: 0,
            merged: Vec::new(),
            split: (0, 0),
            zoom: 1.0,
            column_widths: BTreeMap::new(),
            auto_filter_row: None,
            current_cell: CellAddress::new(0, 0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn styles(&self) -> &Arc<StyleRegistry> {
        &self.styles
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub(crate) fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
    }

    // === Rows and cells ===

    /// Number of rows, counting rows already flushed by a streaming workbook
    pub fn row_count(&self) -> u32 {
        self.first_row + self.rows.len() as u32
    }

    /// Index of the first row still accessible
    pub fn first_row(&self) -> u32 {
        self.first_row
    }

    /// One past the last reserved column over all rows in memory
    pub fn column_count(&self) -> u32 {
        self.rows.iter().map(Row::len).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn row(&self, row: u32) -> Option<&Row> {
        let index = row.checked_sub(self.first_row)?;
        self.rows.get(index as usize)
    }

    /// Rows held in memory, in order
    pub fn rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows.iter()
    }

    pub fn cell(&self, row: u32, col: u32) -> Option<&Cell> {
        self.row(row)?.cell(col)
    }

    /// The cell a merged member stands for, or the cell itself
    pub fn logical_cell(&self, row: u32, col: u32) -> Option<&Cell> {
        let cell = self.cell(row, col)?;
        match cell.merge_state() {
            MergeState::Member {
                anchor_row,
                anchor_col,
            } => self.cell(anchor_row, anchor_col),
            _ => Some(cell),
        }
    }

    fn reserve_row(rows: &mut Vec<Row>, first_row: u32, row: u32) -> Result<&mut Row> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if row < first_row {
            return Err(Error::RowFlushed(row));
        }
        let index = (row - first_row) as usize;
        while rows.len() <= index {
            let next = first_row + rows.len() as u32;
            rows.push(Row::new(next));
        }
        Ok(&mut rows[index])
    }

    fn reserve_cell(&mut self, row: u32, col: u32) -> Result<&mut Cell> {
        Self::reserve_row(&mut self.rows, self.first_row, row)?.reserve(col)
    }

    /// Get the row at `row`, reserving empty rows up to it
    pub fn get_row(&mut self, row: u32) -> Result<RowMut<'_>> {
        let reserved = Self::reserve_row(&mut self.rows, self.first_row, row)?;
        Ok(RowMut::new(reserved, &self.styles))
    }

    /// Get the cell at `(row, col)`, reserving rows and cells up to it
    ///
    /// ```
    /// use tabula_core::{CellType, Workbook};
    ///
    /// let mut workbook = Workbook::new();
    /// let sheet = workbook.create_sheet("Data").unwrap();
    /// sheet.get_cell(2, 3).unwrap().set("x");
    /// assert_eq!(sheet.row_count(), 3);
    /// assert_eq!(sheet.cell(1, 0).map(|c| c.cell_type()), Some(CellType::Blank));
    /// ```
    pub fn get_cell(&mut self, row: u32, col: u32) -> Result<CellMut<'_>> {
        let reserved = Self::reserve_row(&mut self.rows, self.first_row, row)?;
        let cell = reserved.reserve(col)?;
        Ok(CellMut::new(cell, &self.styles))
    }

    /// Append a row after the last one, filling it with `values` from column 0
    pub fn create_row<I, V>(&mut self, values: I) -> Result<RowMut<'_>>
    where
        I: IntoIterator<Item = V>,
        V: Into<CellValue>,
    {
        let index = self.row_count();
        let row = Self::reserve_row(&mut self.rows, self.first_row, index)?;
        let mut handle = RowMut::new(row, &self.styles);
        for (col, value) in values.into_iter().enumerate() {
            handle.get_cell(col as u32)?.set(value);
        }
        Ok(handle)
    }

    /// Remove rows before `row` from memory and return them
    ///
    /// Used by streaming writers; evicted rows can no longer be accessed.
    pub fn evict_rows_before(&mut self, row: u32) -> Vec<Row> {
        if row <= self.first_row {
            return Vec::new();
        }
        let count = ((row - self.first_row) as usize).min(self.rows.len());
        self.first_row += count as u32;
        self.rows.drain(..count).collect()
    }

    // === View settings ===

    /// Freeze rows above `row` and columns left of `col`; `(0, 0)` removes the split
    pub fn split_at(&mut self, row: u32, col: u32) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        self.split = (row, col);
        Ok(())
    }

    pub fn split_row(&self) -> u32 {
        self.split.0
    }

    pub fn split_col(&self) -> u32 {
        self.split.1
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Set the zoom factor (1.0 = 100%); must be positive
    pub fn set_zoom(&mut self, zoom: f64) -> Result<()> {
        if !(zoom > 0.0 && zoom.is_finite()) {
            return Err(Error::InvalidArgument(format!("zoom must be positive, got {}", zoom)));
        }
        self.zoom = zoom;
        Ok(())
    }

    pub fn auto_filter_row(&self) -> Option<u32> {
        self.auto_filter_row
    }

    pub fn set_auto_filter_row(&mut self, row: Option<u32>) {
        self.auto_filter_row = row;
    }

    pub fn current_cell(&self) -> CellAddress {
        self.current_cell
    }

    /// Move the cursor; a merge member moves it to the region's anchor
    pub fn set_current_cell(&mut self, row: u32, col: u32) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        self.current_cell = self
            .cell(row, col)
            .map_or(CellAddress::new(row, col), Cell::logical_address);
        Ok(())
    }

    // === Sizing ===

    pub fn column_width(&self, col: u32) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    pub fn set_column_width(&mut self, col: u32, width: f64) -> Result<()> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        self.column_widths.insert(col, width);
        Ok(())
    }

    /// Column width overrides, by column
    pub fn column_widths(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.column_widths.iter().map(|(c, w)| (*c, *w))
    }

    pub fn row_height(&self, row: u32) -> f64 {
        self.row(row)
            .and_then(Row::height)
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) -> Result<()> {
        self.get_row(row)?.set_height(Some(height));
        Ok(())
    }

    /// Fit every column holding content to its widest rendered cell
    ///
    /// Cells that span several columns are not measured.
    pub fn auto_size_columns(&mut self, locale: Locale) {
        let mut widths: BTreeMap<u32, f64> = BTreeMap::new();
        for cell in self.rows.iter().flat_map(Row::cells) {
            if cell.is_blank() || cell.span_cols() > 1 {
                continue;
            }
            let text = cell.to_display_string(&self.styles, locale);
            let width = self
                .styles
                .with_style(cell.style_id(), |style| style.font.text_width(&text));
            let entry = widths.entry(cell.col()).or_insert(0.0);
            *entry = entry.max(width + 1.0);
        }
        log::debug!("auto-sized {} columns of sheet '{}'", widths.len(), self.name);
        self.column_widths.extend(widths);
    }

    // === Merging ===

    pub fn merged_regions(&self) -> &[Region] {
        &self.merged
    }

    /// Merge the `span_cols` x `span_rows` rectangle anchored at `(row, col)`
    ///
    /// The anchor keeps its value; all other cells of the rectangle are cleared.
    /// A 1x1 merge is accepted and changes nothing.
    pub fn merge_cell(&mut self, row: u32, col: u32, span_cols: u32, span_rows: u32) -> Result<()> {
        if span_cols < 1 || span_rows < 1 {
            return Err(Error::InvalidMergeSpan {
                cols: span_cols,
                rows: span_rows,
            });
        }
        let last_row = row as u64 + span_rows as u64 - 1;
        let last_col = col as u64 + span_cols as u64 - 1;
        if last_row >= MAX_ROWS as u64 || last_col >= MAX_COLS as u64 {
            return Err(Error::MergeConflict(format!(
                "{} spanning {}x{} exceeds the sheet bounds",
                CellAddress::new(row, col),
                span_cols,
                span_rows
            )));
        }
        if row < self.first_row {
            return Err(Error::RowFlushed(row));
        }
        if span_cols == 1 && span_rows == 1 {
            return Ok(());
        }

        let region = Region::from_span(row, col, span_cols, span_rows);
        if let Some(existing) = self.merged.iter().find(|r| r.overlaps(&region)) {
            return Err(Error::MergeConflict(format!(
                "{} overlaps {}",
                region, existing
            )));
        }

        for address in region.cells() {
            let cell = self.reserve_cell(address.row, address.col)?;
            if address.row == row && address.col == col {
                cell.set_merge(MergeState::Anchor {
                    span_cols,
                    span_rows,
                });
            } else {
                cell.set_merge(MergeState::Member {
                    anchor_row: row,
                    anchor_col: col,
                });
                cell.set_value_raw(CellValue::Blank);
                cell.remove_hyperlink_raw();
            }
        }
        self.merged.push(region);
        Ok(())
    }

    /// Dissolve the merged region containing `(row, col)`
    ///
    /// Every cell of the region becomes independent; the anchor keeps its value.
    pub fn unmerge_cell(&mut self, row: u32, col: u32) -> Result<()> {
        let position = self
            .merged
            .iter()
            .position(|r| r.contains(row, col))
            .ok_or_else(|| Error::NotMerged(CellAddress::new(row, col).to_string()))?;
        let region = self.merged.remove(position);
        for address in region.cells() {
            if let Some(cell) = self.cell_mut(address.row, address.col) {
                cell.set_merge(MergeState::Unmerged);
            }
        }
        Ok(())
    }

    fn cell_mut(&mut self, row: u32, col: u32) -> Option<&mut Cell> {
        let index = row.checked_sub(self.first_row)?;
        self.rows.get_mut(index as usize)?.cell_mut(col)
    }

    // === Search ===

    /// Find the first cell whose text matches, in row-major order
    pub fn find(&mut self, text: &str, options: &SearchOptions) -> Option<CellAddress> {
        let addresses: Vec<CellAddress> = self
            .rows
            .iter()
            .flat_map(Row::cells)
            .map(Cell::address)
            .collect();
        if addresses.is_empty() {
            return None;
        }

        let start = if options.search_from_current {
            let current = self.current_cell;
            addresses
                .iter()
                .position(|a| (a.row, a.col) > (current.row, current.col))
                .unwrap_or(0)
        } else {
            0
        };

        let needle = if options.ignore_case {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let found = (0..addresses.len())
            .map(|i| addresses[(start + i) % addresses.len()])
            .find(|address| {
                let Some(cell) = self.cell(address.row, address.col) else {
                    return false;
                };
                let haystack = match cell.value() {
                    CellValue::Formula(formula) if options.search_formula_text => formula.clone(),
                    _ => cell.as_text(&self.styles, self.locale),
                };
                let haystack = if options.ignore_case {
                    haystack.to_lowercase()
                } else {
                    haystack
                };
                if options.match_complete_text {
                    haystack == needle
                } else {
                    haystack.contains(&needle)
                }
            })?;

        if options.update_current_cell {
            self.current_cell = found;
        }
        Some(found)
    }

    // === Copy ===

    /// Copy content and layout of another sheet, which may belong to another workbook
    ///
    /// Order: merged regions, rows with their heights, split and autofilter,
    /// column widths, zoom. Styles are resolved by name in this sheet's registry.
    pub fn copy_from(&mut self, other: &Sheet) -> Result<()> {
        for region in other.merged_regions() {
            self.merge_cell(
                region.first_row,
                region.first_col,
                region.span_cols(),
                region.span_rows(),
            )?;
        }
        for row in other.rows() {
            self.get_row(row.index())?.copy_from(row, &other.styles)?;
        }
        self.split = other.split;
        self.auto_filter_row = other.auto_filter_row;
        self.column_widths
            .extend(other.column_widths.iter().map(|(c, w)| (*c, *w)));
        self.zoom = other.zoom;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellType;
    use crate::style::Style;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn sheet() -> Sheet {
        Sheet::new("Test", Arc::new(StyleRegistry::new()))
    }

    #[test]
    fn test_new_sheet() {
        let sheet = sheet();
        assert_eq!(sheet.name(), "Test");
        assert!(sheet.is_empty());
        assert_eq!(sheet.zoom(), 1.0);
        assert_eq!(sheet.current_cell(), CellAddress::new(0, 0));
    }

    #[test]
    fn test_reserve_on_access() {
        let mut sheet = sheet();
        sheet.get_cell(3, 2).unwrap().set(1.0);
        assert_eq!(sheet.row_count(), 4);
        for row in 0..3 {
            assert_eq!(sheet.row(row).unwrap().index(), row);
        }
        assert_eq!(sheet.cell(3, 1).unwrap().cell_type(), CellType::Blank);
        assert!(sheet.cell(2, 0).is_none());

        // a lower row never shrinks the sheet
        sheet.get_row(1).unwrap();
        assert_eq!(sheet.row_count(), 4);
        assert!(matches!(sheet.get_row(MAX_ROWS), Err(Error::RowOutOfBounds(..))));
    }

    #[test]
    fn test_create_row_types() {
        let mut sheet = sheet();
        let date = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        sheet
            .create_row::<_, CellValue>([
                "text".into(),
                1.5.into(),
                true.into(),
                date.into(),
                CellValue::formula("=A1"),
                CellValue::Blank,
            ])
            .unwrap();
        sheet.create_row(["second"]).unwrap();

        let types: Vec<CellType> = sheet.row(0).unwrap().cells().map(Cell::cell_type).collect();
        assert_eq!(
            types,
            vec![
                CellType::Text,
                CellType::Numeric,
                CellType::Boolean,
                CellType::Date,
                CellType::Formula,
                CellType::Blank,
            ]
        );
        assert_eq!(sheet.row_count(), 2);
        assert_eq!(sheet.cell(1, 0).unwrap().get_text().unwrap(), "second");
    }

    #[test]
    fn test_merge_and_unmerge() {
        let mut sheet = sheet();
        sheet.get_cell(0, 0).unwrap().set("anchor");
        sheet.get_cell(0, 0).unwrap().set_hyperlink("#Other!A1");
        sheet.get_cell(1, 1).unwrap().set("covered").set_hyperlink("https://example.com");

        sheet.merge_cell(0, 0, 2, 3).unwrap();
        assert_eq!(sheet.merged_regions(), &[Region::new(0, 0, 2, 1)]);

        let anchor = sheet.cell(0, 0).unwrap();
        assert_eq!((anchor.span_cols(), anchor.span_rows()), (2, 3));
        assert_eq!(anchor.hyperlink(), Some("#Other!A1"));
        let member = sheet.cell(1, 1).unwrap();
        assert!(member.is_blank());
        assert_eq!(member.hyperlink(), None);
        assert_eq!(member.logical_address(), CellAddress::new(0, 0));
        assert_eq!(
            sheet.logical_cell(2, 1).unwrap().get_text().unwrap(),
            "anchor"
        );

        // setting a value never unmerges
        sheet.get_cell(0, 0).unwrap().set("changed");
        assert!(sheet.cell(0, 0).unwrap().is_merged());

        sheet.unmerge_cell(2, 1).unwrap();
        assert!(sheet.merged_regions().is_empty());
        for row in 0..3 {
            for col in 0..2 {
                let cell = sheet.cell(row, col).unwrap();
                assert!(!cell.is_merged());
                assert_eq!((cell.span_cols(), cell.span_rows()), (1, 1));
            }
        }
        assert_eq!(sheet.cell(0, 0).unwrap().get_text().unwrap(), "changed");
        assert!(matches!(sheet.unmerge_cell(0, 0), Err(Error::NotMerged(_))));
    }

    #[test]
    fn test_merge_errors() {
        let mut sheet = sheet();
        assert!(matches!(
            sheet.merge_cell(0, 0, 0, 2),
            Err(Error::InvalidMergeSpan { cols: 0, rows: 2 })
        ));
        sheet.merge_cell(1, 1, 2, 2).unwrap();
        assert!(matches!(
            sheet.merge_cell(0, 0, 2, 2),
            Err(Error::MergeConflict(_))
        ));
        assert!(matches!(
            sheet.merge_cell(0, MAX_COLS - 1, 2, 1),
            Err(Error::MergeConflict(_))
        ));

        sheet.merge_cell(5, 5, 1, 1).unwrap();
        assert_eq!(sheet.merged_regions().len(), 1);
        assert!(sheet.cell(5, 5).is_none());
    }

    #[test]
    fn test_split_zoom_and_sizes() {
        let mut sheet = sheet();
        sheet.split_at(1, 2).unwrap();
        assert_eq!((sheet.split_row(), sheet.split_col()), (1, 2));
        sheet.split_at(0, 0).unwrap();
        assert_eq!((sheet.split_row(), sheet.split_col()), (0, 0));

        assert!(sheet.set_zoom(0.0).is_err());
        assert!(sheet.set_zoom(-1.0).is_err());
        sheet.set_zoom(1.5).unwrap();
        assert_eq!(sheet.zoom(), 1.5);

        assert_eq!(sheet.column_width(3), DEFAULT_COLUMN_WIDTH);
        assert_eq!(sheet.row_height(3), DEFAULT_ROW_HEIGHT);
        sheet.set_column_width(3, 20.0).unwrap();
        sheet.set_row_height(3, 30.0).unwrap();
        assert_eq!(sheet.column_width(3), 20.0);
        assert_eq!(sheet.row_height(3), 30.0);
    }

    #[test]
    fn test_auto_size_columns() {
        let mut sheet = sheet();
        sheet.get_cell(0, 0).unwrap().set("a much longer piece of text");
        sheet.get_cell(1, 0).unwrap().set("short");
        sheet.get_cell(0, 2).unwrap().set(1.0);
        sheet.auto_size_columns(Locale::EN_US);

        assert!(sheet.column_width(0) > DEFAULT_COLUMN_WIDTH);
        assert!(sheet.column_width(2) < DEFAULT_COLUMN_WIDTH);
        // column 1 holds no content and keeps the default
        assert_eq!(sheet.column_widths().count(), 2);
    }

    #[test]
    fn test_current_cell_moves_to_anchor() {
        let mut sheet = sheet();
        sheet.merge_cell(2, 2, 3, 3).unwrap();
        sheet.set_current_cell(4, 3).unwrap();
        assert_eq!(sheet.current_cell(), CellAddress::new(2, 2));
    }

    #[test]
    fn test_find() {
        let mut sheet = sheet();
        sheet.create_row(["alpha", "Beta"]).unwrap();
        sheet.create_row(["gamma", "beta"]).unwrap();
        sheet.get_cell(2, 0).unwrap().set_formula("SUM(B1:B2)");

        let found = sheet.find("beta", &SearchOptions::new());
        assert_eq!(found, Some(CellAddress::new(1, 1)));

        let options = SearchOptions::new().ignore_case(true).update_current_cell(true);
        assert_eq!(sheet.find("BETA", &options), Some(CellAddress::new(0, 1)));
        assert_eq!(sheet.current_cell(), CellAddress::new(0, 1));

        let options = options.search_from_current(true);
        assert_eq!(sheet.find("beta", &options), Some(CellAddress::new(1, 1)));
        // wraps around to the start
        assert_eq!(sheet.find("beta", &options), Some(CellAddress::new(0, 1)));

        let complete = SearchOptions::new().match_complete_text(true);
        assert_eq!(sheet.find("alp", &complete), None);
        assert_eq!(sheet.find("=SUM(B1:B2)", &complete), Some(CellAddress::new(2, 0)));
        let formula = complete.search_formula_text(true);
        assert_eq!(sheet.find("SUM(B1:B2)", &formula), Some(CellAddress::new(2, 0)));
    }

    #[test]
    fn test_copy_from_other_workbook_styles() {
        let source_styles = Arc::new(StyleRegistry::new());
        source_styles.copy_style("header", &Style::new().bold(true));
        let mut source = Sheet::new("Source", source_styles);
        source.create_row(["a", "b", "c"]).unwrap();
        source.get_cell(0, 0).unwrap().set_style("header");
        source.merge_cell(1, 0, 3, 1).unwrap();
        source.get_cell(1, 0).unwrap().set("merged");
        source.set_row_height(1, 25.0).unwrap();
        source.set_column_width(2, 12.0).unwrap();
        source.split_at(1, 0).unwrap();
        source.set_auto_filter_row(Some(0));
        source.set_zoom(0.75).unwrap();

        let mut target = sheet();
        target.copy_from(&source).unwrap();

        assert_eq!(target.merged_regions(), source.merged_regions());
        assert_eq!(target.cell(1, 0).unwrap().get_text().unwrap(), "merged");
        assert!(target.cell(1, 1).unwrap().is_merged());
        assert_eq!(target.row_height(1), 25.0);
        assert_eq!(target.column_width(2), 12.0);
        assert_eq!((target.split_row(), target.split_col()), (1, 0));
        assert_eq!(target.auto_filter_row(), Some(0));
        assert_eq!(target.zoom(), 0.75);

        let header = target.cell(0, 0).unwrap().style_id();
        assert_eq!(target.styles().name(header), "header");
        assert!(target.styles().get(header).font.bold);
    }

    #[test]
    fn test_evicted_rows_are_flushed() {
        let mut sheet = sheet();
        for i in 0..5 {
            sheet.create_row([i]).unwrap();
        }
        let evicted = sheet.evict_rows_before(3);
        assert_eq!(evicted.len(), 3);
        assert_eq!(sheet.first_row(), 3);
        assert_eq!(sheet.row_count(), 5);
        assert!(sheet.row(1).is_none());
        assert!(matches!(sheet.get_row(2), Err(Error::RowFlushed(2))));
        assert_eq!(sheet.cell(4, 0).unwrap().get_number().unwrap(), 4.0);
        sheet.create_row([5]).unwrap();
        assert_eq!(sheet.row(5).unwrap().index(), 5);
    }
}
