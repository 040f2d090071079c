//! Cell-related types
//!
//! This module contains:
//! - [`Cell`] - a positioned value with its style and merge state
//! - [`CellMut`] - a mutable cell handle bound to its workbook's styles
//! - [`CellValue`] - the value stored in a cell
//! - [`CellAddress`] and [`Region`] - A1 addressing

mod address;
mod value;

pub use address::{CellAddress, Region};
pub use value::{CellError, CellType, CellValue, SharedString};

use crate::error::{Error, Result};
use crate::format::{self, Locale};
use crate::style::{HorizontalAlignment, StyleId, StyleRegistry};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::ops::Deref;

/// Merge role of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MergeState {
    #[default]
    Unmerged,
    /// Top-left cell of a merged region
    Anchor { span_cols: u32, span_rows: u32 },
    /// Covered cell of a merged region
    Member { anchor_row: u32, anchor_col: u32 },
}

/// A single cell
///
/// The coordinate is fixed at creation. The value's variant is the cell type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    row: u32,
    col: u32,
    value: CellValue,
    style: StyleId,
    merge: MergeState,
    /// Link target; `#Sheet!A1` points inside the workbook
    hyperlink: Option<String>,
}

impl Cell {
    /// Create a blank cell with the default style
    pub fn new(row: u32, col: u32) -> Self {
        Self {
            row,
            col,
            value: CellValue::Blank,
            style: StyleId::DEFAULT,
            merge: MergeState::Unmerged,
            hyperlink: None,
        }
    }

    pub fn row(&self) -> u32 {
        self.row
    }

    pub fn col(&self) -> u32 {
        self.col
    }

    pub fn address(&self) -> CellAddress {
        CellAddress::new(self.row, self.col)
    }

    pub fn value(&self) -> &CellValue {
        &self.value
    }

    pub fn cell_type(&self) -> CellType {
        self.value.cell_type()
    }

    pub fn is_blank(&self) -> bool {
        self.value.is_blank()
    }

    pub fn style_id(&self) -> StyleId {
        self.style
    }

    pub fn merge_state(&self) -> MergeState {
        self.merge
    }

    pub fn hyperlink(&self) -> Option<&str> {
        self.hyperlink.as_deref()
    }

    /// Whether the cell is an anchor or member of a merged region
    pub fn is_merged(&self) -> bool {
        self.merge != MergeState::Unmerged
    }

    /// Columns covered by the cell; 1 unless it anchors a merge
    pub fn span_cols(&self) -> u32 {
        match self.merge {
            MergeState::Anchor { span_cols, .. } => span_cols,
            _ => 1,
        }
    }

    /// Rows covered by the cell; 1 unless it anchors a merge
    pub fn span_rows(&self) -> u32 {
        match self.merge {
            MergeState::Anchor { span_rows, .. } => span_rows,
            _ => 1,
        }
    }

    /// Address of the logical cell: the anchor for a merge member, this cell otherwise
    pub fn logical_address(&self) -> CellAddress {
        match self.merge {
            MergeState::Member {
                anchor_row,
                anchor_col,
            } => CellAddress::new(anchor_row, anchor_col),
            _ => self.address(),
        }
    }

    fn mismatch(&self, expected: CellType) -> Error {
        Error::TypeMismatch {
            expected,
            actual: self.cell_type(),
        }
    }

    pub fn get_boolean(&self) -> Result<bool> {
        match self.value {
            CellValue::Boolean(b) => Ok(b),
            _ => Err(self.mismatch(CellType::Boolean)),
        }
    }

    pub fn get_number(&self) -> Result<f64> {
        match self.value {
            CellValue::Numeric(n) => Ok(n),
            _ => Err(self.mismatch(CellType::Numeric)),
        }
    }

    pub fn get_text(&self) -> Result<&str> {
        match &self.value {
            CellValue::Text(s) => Ok(s.as_str()),
            _ => Err(self.mismatch(CellType::Text)),
        }
    }

    /// Formula text without the leading '='
    pub fn get_formula(&self) -> Result<&str> {
        match &self.value {
            CellValue::Formula(f) => Ok(f),
            _ => Err(self.mismatch(CellType::Formula)),
        }
    }

    pub fn get_date(&self) -> Result<NaiveDate> {
        match self.value {
            CellValue::Date(d) => Ok(d),
            _ => Err(self.mismatch(CellType::Date)),
        }
    }

    pub fn get_date_time(&self) -> Result<NaiveDateTime> {
        match self.value {
            CellValue::DateTime(dt) => Ok(dt),
            _ => Err(self.mismatch(CellType::DateTime)),
        }
    }

    pub fn get_error(&self) -> Result<CellError> {
        match self.value {
            CellValue::Error(e) => Ok(e),
            _ => Err(self.mismatch(CellType::Error)),
        }
    }

    /// The logical text of the cell, rendered through its style's format
    pub fn as_text(&self, styles: &StyleRegistry, locale: Locale) -> String {
        match &self.value {
            CellValue::Blank => String::new(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Error(_) => crate::ERROR_TEXT.to_string(),
            CellValue::Formula(f) => format!("={}", f),
            CellValue::Numeric(n) => styles.with_style(self.style, |style| {
                format::format_number(*n, &style.number_format, locale)
            }),
            CellValue::Text(s) => s.to_string(),
            CellValue::Date(d) => styles.with_style(self.style, |style| {
                format::format_temporal(&d.and_time(NaiveTime::MIN), &style.number_format, locale, false)
            }),
            CellValue::DateTime(dt) => styles.with_style(self.style, |style| {
                format::format_temporal(dt, &style.number_format, locale, true)
            }),
        }
    }

    /// [`as_text`](Self::as_text) padded for the style's horizontal indent
    ///
    /// Left and general alignment indent with leading spaces, right alignment with
    /// trailing spaces.
    pub fn to_display_string(&self, styles: &StyleRegistry, locale: Locale) -> String {
        let text = self.as_text(styles, locale);
        let alignment = styles.with_style(self.style, |style| style.alignment);
        let pad = " ".repeat(alignment.indent as usize);
        match alignment.horizontal {
            HorizontalAlignment::General | HorizontalAlignment::Left => pad + &text,
            HorizontalAlignment::Right => text + &pad,
            _ => text,
        }
    }

    pub(crate) fn set_value_raw(&mut self, value: CellValue) {
        self.value = value;
    }

    pub(crate) fn set_merge(&mut self, merge: MergeState) {
        self.merge = merge;
    }

    pub(crate) fn remove_hyperlink_raw(&mut self) {
        self.hyperlink = None;
    }
}

/// Mutable access to a cell together with its workbook's style registry
///
/// Obtained from [`Sheet::get_cell`](crate::Sheet::get_cell) or
/// [`RowMut::get_cell`](crate::RowMut::get_cell).
pub struct CellMut<'a> {
    cell: &'a mut Cell,
    styles: &'a StyleRegistry,
}

impl<'a> CellMut<'a> {
    pub(crate) fn new(cell: &'a mut Cell, styles: &'a StyleRegistry) -> Self {
        Self { cell, styles }
    }

    /// Set the cell's value; the type follows the value
    ///
    /// Dates stored on a style without a date format switch the cell to the
    /// style's `#DATE#`/`#DATETIME#` variant. Merge state is not touched.
    ///
    /// ```
    /// use tabula_core::{CellType, Workbook};
    ///
    /// let mut workbook = Workbook::new();
    /// let sheet = workbook.create_sheet("Data").unwrap();
    /// let mut cell = sheet.get_cell(0, 0).unwrap();
    /// cell.set(42.0);
    /// assert_eq!(cell.cell_type(), CellType::Numeric);
    /// cell.set(None::<f64>);
    /// assert_eq!(cell.cell_type(), CellType::Blank);
    /// ```
    pub fn set<V: Into<CellValue>>(&mut self, value: V) -> &mut Self {
        let value = value.into();
        match value {
            CellValue::Date(_) => self.cell.style = self.styles.date_variant(self.cell.style, false),
            CellValue::DateTime(_) => self.cell.style = self.styles.date_variant(self.cell.style, true),
            _ => {}
        }
        self.cell.value = value;
        self
    }

    /// Set a formula; a leading '=' is not stored
    pub fn set_formula<S: AsRef<str>>(&mut self, formula: S) -> &mut Self {
        self.cell.value = CellValue::formula(formula);
        self
    }

    pub fn set_error(&mut self, error: CellError) -> &mut Self {
        self.cell.value = CellValue::Error(error);
        self
    }

    /// Reset the value to BLANK, keeping style, merge state and hyperlink
    pub fn clear(&mut self) -> &mut Self {
        self.cell.value = CellValue::Blank;
        self
    }

    /// Link the cell to a URI, or to a location such as `#Sheet2!B3`
    pub fn set_hyperlink<S: Into<String>>(&mut self, target: S) -> &mut Self {
        self.cell.hyperlink = Some(target.into());
        self
    }

    pub fn remove_hyperlink(&mut self) -> &mut Self {
        self.cell.hyperlink = None;
        self
    }

    /// Apply a named style, creating it from the default style if needed
    pub fn set_style(&mut self, name: &str) -> &mut Self {
        self.cell.style = self.styles.get_or_create(name);
        self
    }

    pub fn set_style_id(&mut self, style: StyleId) -> &mut Self {
        self.cell.style = style;
        self
    }

    /// Copy value, style and hyperlink from a cell of any workbook
    ///
    /// The style is looked up by name in this cell's registry and copied there if absent.
    pub fn copy_from(&mut self, other: &Cell, other_styles: &StyleRegistry) -> &mut Self {
        self.cell.value = other.value.clone();
        self.cell.hyperlink = other.hyperlink.clone();
        self.cell.style = self.styles.import(other_styles, other.style);
        self
    }

    pub fn as_text(&self, locale: Locale) -> String {
        self.cell.as_text(self.styles, locale)
    }

    pub fn to_display_string(&self, locale: Locale) -> String {
        self.cell.to_display_string(self.styles, locale)
    }

    pub fn styles(&self) -> &StyleRegistry {
        self.styles
    }
}

impl Deref for CellMut<'_> {
    type Target = Cell;

    fn deref(&self) -> &Cell {
        self.cell
    }
}

impl std::fmt::Debug for CellMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CellMut").field(&self.cell).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Alignment, NumberFormat, Style};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_accessor_matrix() {
        let styles = StyleRegistry::new();
        let values = [
            CellValue::Blank,
            CellValue::Boolean(true),
            CellValue::Error(CellError::Div0),
            CellValue::formula("A1+1"),
            CellValue::Numeric(1.5),
            CellValue::text("x"),
            CellValue::Date(date(2023, 2, 1)),
            CellValue::DateTime(date(2023, 2, 1).and_hms_opt(1, 0, 0).unwrap()),
        ];
        for value in values {
            let mut cell = Cell::new(0, 0);
            CellMut::new(&mut cell, &styles).set(value.clone());
            let ty = cell.cell_type();
            assert_eq!(ty, value.cell_type());

            assert_eq!(cell.get_boolean().is_ok(), ty == CellType::Boolean);
            assert_eq!(cell.get_number().is_ok(), ty == CellType::Numeric);
            assert_eq!(cell.get_text().is_ok(), ty == CellType::Text);
            assert_eq!(cell.get_formula().is_ok(), ty == CellType::Formula);
            assert_eq!(cell.get_date().is_ok(), ty == CellType::Date);
            assert_eq!(cell.get_date_time().is_ok(), ty == CellType::DateTime);
            assert_eq!(cell.get_error().is_ok(), ty == CellType::Error);
        }
    }

    #[test]
    fn test_type_mismatch_reports_both_types() {
        let cell = Cell::new(0, 0);
        match cell.get_number() {
            Err(Error::TypeMismatch { expected, actual }) => {
                assert_eq!(expected, CellType::Numeric);
                assert_eq!(actual, CellType::Blank);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rendering() {
        let styles = StyleRegistry::new();
        let mut cell = Cell::new(0, 0);
        let mut handle = CellMut::new(&mut cell, &styles);

        assert_eq!(handle.as_text(Locale::EN_US), "");
        handle.set(true);
        assert_eq!(handle.as_text(Locale::EN_US), "TRUE");
        handle.set_error(CellError::Ref);
        assert_eq!(handle.as_text(Locale::EN_US), "#ERROR");
        handle.set_formula("=SUM(A1:A3)");
        assert_eq!(handle.get_formula().unwrap(), "SUM(A1:A3)");
        assert_eq!(handle.as_text(Locale::EN_US), "=SUM(A1:A3)");
        handle.set(123.5);
        assert_eq!(handle.as_text(Locale::EN_US), "123.5");
        assert_eq!(handle.as_text(Locale::DE_DE), "123,5");
        assert_eq!(handle.as_text(Locale::FR_FR), "123,5");
    }

    #[test]
    fn test_date_gets_derived_style() {
        let styles = StyleRegistry::new();
        let mut cell = Cell::new(0, 0);
        let mut handle = CellMut::new(&mut cell, &styles);
        handle.set(date(2023, 2, 1));

        assert_eq!(styles.name(handle.style_id()), "#DATE#");
        assert_eq!(handle.as_text(Locale::EN_US), "2/1/23");
        assert_eq!(handle.as_text(Locale::DE_DE), "01.02.23");
        assert_eq!(handle.as_text(Locale::FR_FR), "01/02/2023");
    }

    #[test]
    fn test_date_keeps_date_style() {
        let styles = StyleRegistry::new();
        let iso = styles.copy_style("iso", &Style::new().number_format("yyyy-mm-dd"));
        let mut cell = Cell::new(0, 0);
        let mut handle = CellMut::new(&mut cell, &styles);
        handle.set_style_id(iso).set(date(2023, 2, 1));
        assert_eq!(handle.style_id(), iso);
        assert_eq!(handle.as_text(Locale::EN_US), "2023-02-01");
        assert!(styles.get(iso).number_format != NumberFormat::General);
    }

    #[test]
    fn test_indent_padding() {
        let styles = StyleRegistry::new();
        let left = styles.copy_style("left", &Style {
            alignment: Alignment::new().with_indent(2),
            ..Style::default()
        });
        let right = styles.copy_style("right", &Style {
            alignment: Alignment::new()
                .with_horizontal(HorizontalAlignment::Right)
                .with_indent(1),
            ..Style::default()
        });

        let mut cell = Cell::new(0, 0);
        CellMut::new(&mut cell, &styles).set("ab").set_style_id(left);
        assert_eq!(cell.to_display_string(&styles, Locale::EN_US), "  ab");
        assert_eq!(cell.as_text(&styles, Locale::EN_US), "ab");

        CellMut::new(&mut cell, &styles).set_style_id(right);
        assert_eq!(cell.to_display_string(&styles, Locale::EN_US), "ab ");
    }

    #[test]
    fn test_copy_from_other_registry() {
        let source_styles = StyleRegistry::new();
        let bold = source_styles.copy_style("bold", &Style::new().bold(true));
        let mut source = Cell::new(3, 4);
        CellMut::new(&mut source, &source_styles).set("hello").set_style_id(bold);

        let target_styles = StyleRegistry::new();
        let mut target = Cell::new(0, 0);
        CellMut::new(&mut target, &target_styles).copy_from(&source, &source_styles);

        assert_eq!(target.get_text().unwrap(), "hello");
        assert_eq!(target.address(), CellAddress::new(0, 0));
        assert_eq!(target.hyperlink(), None);
        assert_eq!(target_styles.name(target.style_id()), "bold");
        assert!(target_styles.get(target.style_id()).font.bold);
    }

    #[test]
    fn test_hyperlink() {
        let styles = StyleRegistry::new();
        let mut cell = Cell::new(0, 0);
        let mut handle = CellMut::new(&mut cell, &styles);
        handle.set("docs").set_hyperlink("https://example.com/docs");
        handle.clear();
        assert_eq!(handle.hyperlink(), Some("https://example.com/docs"));

        let mut copy = Cell::new(1, 1);
        CellMut::new(&mut copy, &styles).copy_from(&cell, &styles);
        assert_eq!(copy.hyperlink(), Some("https://example.com/docs"));

        CellMut::new(&mut copy, &styles).remove_hyperlink();
        assert_eq!(copy.hyperlink(), None);
    }
}
