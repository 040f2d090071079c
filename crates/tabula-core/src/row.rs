//! Row types

use crate::cell::{Cell, CellMut};
use crate::error::{Error, Result};
use crate::style::StyleRegistry;
use crate::MAX_COLS;
use std::ops::Deref;

/// A row of cells
///
/// Cells are stored densely from column 0; asking for a column past the end
/// fills the gap with blank cells. A row never shrinks.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Row {
    index: u32,
    cells: Vec<Cell>,
    /// Custom height in points (None = default)
    height: Option<f64>,
}

impl Row {
    pub fn new(index: u32) -> Self {
        Self {
            index,
            cells: Vec::new(),
            height: None,
        }
    }

    /// Row index (0-based)
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Number of reserved cells; one past the last reserved column
    pub fn len(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, col: u32) -> Option<&Cell> {
        self.cells.get(col as usize)
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> + '_ {
        self.cells.iter()
    }

    /// Index of the last cell holding a value or a merge, if any
    pub fn last_used_col(&self) -> Option<u32> {
        self.cells
            .iter()
            .rposition(|c| !c.is_blank() || c.is_merged())
            .map(|i| i as u32)
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn set_height(&mut self, height: Option<f64>) {
        self.height = height;
    }

    /// Reserve cells up to and including `col`
    pub(crate) fn reserve(&mut self, col: u32) -> Result<&mut Cell> {
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        let index = self.index;
        while self.cells.len() <= col as usize {
            let next = self.cells.len() as u32;
            self.cells.push(Cell::new(index, next));
        }
        Ok(&mut self.cells[col as usize])
    }

    pub(crate) fn cell_mut(&mut self, col: u32) -> Option<&mut Cell> {
        self.cells.get_mut(col as usize)
    }
}

/// Mutable access to a row together with its workbook's style registry
#[derive(Debug)]
pub struct RowMut<'a> {
    row: &'a mut Row,
    styles: &'a StyleRegistry,
}

impl<'a> RowMut<'a> {
    pub(crate) fn new(row: &'a mut Row, styles: &'a StyleRegistry) -> Self {
        Self { row, styles }
    }

    /// Get the cell at `col`, reserving blank cells up to it
    pub fn get_cell(&mut self, col: u32) -> Result<CellMut<'_>> {
        let cell = self.row.reserve(col)?;
        Ok(CellMut::new(cell, self.styles))
    }

    pub fn set_height(&mut self, height: Option<f64>) {
        self.row.set_height(height);
    }

    /// Copy every cell value and style of `other`, plus its height
    ///
    /// Merge state is left to the sheet, which copies merged regions separately.
    pub fn copy_from(&mut self, other: &Row, other_styles: &StyleRegistry) -> Result<()> {
        self.row.height = other.height;
        for source in other.cells() {
            self.get_cell(source.col())?.copy_from(source, other_styles);
        }
        Ok(())
    }
}

impl Deref for RowMut<'_> {
    type Target = Row;

    fn deref(&self) -> &Row {
        self.row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::CellType;

    #[test]
    fn test_reserve_on_access() {
        let styles = StyleRegistry::new();
        let mut row = Row::new(2);
        {
            let mut handle = RowMut::new(&mut row, &styles);
            handle.get_cell(4).unwrap().set("x");
            // a lower column never shrinks the row
            handle.get_cell(1).unwrap();
        }
        assert_eq!(row.len(), 5);
        for col in 0..4 {
            let cell = row.cell(col).unwrap();
            assert_eq!(cell.cell_type(), CellType::Blank);
            assert_eq!((cell.row(), cell.col()), (2, col));
        }
        assert_eq!(row.last_used_col(), Some(4));
    }

    #[test]
    fn test_column_bounds() {
        let styles = StyleRegistry::new();
        let mut row = Row::new(0);
        let mut handle = RowMut::new(&mut row, &styles);
        assert!(handle.get_cell(MAX_COLS - 1).is_ok());
        assert!(matches!(
            handle.get_cell(MAX_COLS),
            Err(Error::ColumnOutOfBounds(..))
        ));
    }
}
