//! Row builders turn a stream of text fields into rows

use tabula_core::format::{parse_number, DatePattern, Locale};
use tabula_core::{CellValue, DateFormatStyle, IoOptions, Sheet};

use crate::error::Result;

/// Receives parsed rows field by field
///
/// The reader calls `start_row`, then `add` once per field, then `end_row`.
pub trait RowBuilder {
    fn start_row(&mut self) -> Result<()>;

    fn add(&mut self, field: &str) -> Result<()>;

    fn end_row(&mut self) -> Result<()>;
}

/// Builds rows at the end of a sheet, guessing each field's type
///
/// Fields are tried as, in order: empty (blank), `=` prefix (formula), boolean
/// literal, locale number, locale date, and text otherwise.
pub struct SheetRowBuilder<'a> {
    sheet: &'a mut Sheet,
    locale: Locale,
    date_patterns: Vec<DatePattern>,
    row: Option<u32>,
    col: u32,
}

impl<'a> SheetRowBuilder<'a> {
    pub fn new(sheet: &'a mut Sheet, options: &IoOptions) -> Self {
        Self::with_date_format(sheet, options.locale, options.date_format)
    }

    pub fn with_date_format(sheet: &'a mut Sheet, locale: Locale, date_format: DateFormatStyle) -> Self {
        Self {
            sheet,
            locale,
            date_patterns: date_format.parse_patterns(locale),
            row: None,
            col: 0,
        }
    }

    /// The value a field would be stored as
    pub fn sniff(&self, field: &str) -> CellValue {
        if field.is_empty() {
            return CellValue::Blank;
        }
        if field.starts_with('=') {
            return CellValue::formula(field);
        }
        if let Some(b) = self.parse_boolean(field) {
            return CellValue::Boolean(b);
        }
        if let Some(n) = parse_number(field, self.locale) {
            return CellValue::Numeric(n);
        }
        let date = self
            .date_patterns
            .iter()
            .find_map(|p| p.parse(field, self.locale).map(|dt| (p.has_time(), dt)));
        match date {
            Some((true, dt)) => CellValue::DateTime(dt),
            Some((false, dt)) => CellValue::Date(dt.date()),
            None => CellValue::text(field),
        }
    }

    fn parse_boolean(&self, field: &str) -> Option<bool> {
        let field = field.trim();
        let (true_literal, false_literal) = self.locale.boolean_literals();
        if field.eq_ignore_ascii_case("true") || field.to_lowercase() == true_literal.to_lowercase() {
            Some(true)
        } else if field.eq_ignore_ascii_case("false")
            || field.to_lowercase() == false_literal.to_lowercase()
        {
            Some(false)
        } else {
            None
        }
    }
}

impl RowBuilder for SheetRowBuilder<'_> {
    fn start_row(&mut self) -> Result<()> {
        self.row = Some(self.sheet.row_count());
        self.col = 0;
        Ok(())
    }

    fn add(&mut self, field: &str) -> Result<()> {
        let row = match self.row {
            Some(row) => row,
            None => {
                self.start_row()?;
                self.sheet.row_count()
            }
        };
        let value = self.sniff(field);
        let mut cell = self.sheet.get_cell(row, self.col)?;
        match value {
            CellValue::Formula(formula) => cell.set_formula(formula),
            value => cell.set(value),
        };
        self.col += 1;
        Ok(())
    }

    fn end_row(&mut self) -> Result<()> {
        // an empty record still occupies a row
        if let Some(row) = self.row.take() {
            self.sheet.get_row(row)?;
        }
        self.col = 0;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tabula_core::{CellType, StyleRegistry};

    fn sheet() -> Sheet {
        Sheet::new("Sheet 1", Arc::new(StyleRegistry::new()))
    }

    #[test]
    fn test_sniff_order() {
        let mut sheet = sheet();
        let builder = SheetRowBuilder::new(&mut sheet, &IoOptions::default());
        assert_eq!(builder.sniff(""), CellValue::Blank);
        assert_eq!(builder.sniff("=A1+1"), CellValue::formula("A1+1"));
        assert_eq!(builder.sniff("TRUE"), CellValue::Boolean(true));
        assert_eq!(builder.sniff("false"), CellValue::Boolean(false));
        assert_eq!(builder.sniff("1,234.5"), CellValue::Numeric(1234.5));
        assert_eq!(
            builder.sniff("2/1/23"),
            CellValue::Date(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap())
        );
        assert_eq!(builder.sniff("hello"), CellValue::text("hello"));
        // numbers win over dates
        assert_eq!(builder.sniff("20230201"), CellValue::Numeric(20230201.0));
    }

    #[test]
    fn test_sniff_german() {
        let mut sheet = sheet();
        let options = IoOptions::default().with_locale(Locale::DE_DE);
        let builder = SheetRowBuilder::new(&mut sheet, &options);
        assert_eq!(builder.sniff("123,5"), CellValue::Numeric(123.5));
        assert_eq!(
            builder.sniff("01.02.23"),
            CellValue::Date(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap())
        );
        let (yes, _) = Locale::DE_DE.boolean_literals();
        assert_eq!(builder.sniff(yes), CellValue::Boolean(true));
    }

    #[test]
    fn test_iso_date_times() {
        let mut sheet = sheet();
        let options = IoOptions::default().with_date_format(DateFormatStyle::Iso);
        let builder = SheetRowBuilder::new(&mut sheet, &options);
        assert_eq!(
            builder.sniff("2023-02-01 08:30:00"),
            CellValue::DateTime(
                NaiveDate::from_ymd_opt(2023, 2, 1)
                    .unwrap()
                    .and_hms_opt(8, 30, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_rows_are_appended() {
        let mut sheet = sheet();
        {
            let mut builder = SheetRowBuilder::new(&mut sheet, &IoOptions::default());
            for record in [vec!["a", "1"], vec![], vec!["", "=B1"]] {
                builder.start_row().unwrap();
                for field in record {
                    builder.add(field).unwrap();
                }
                builder.end_row().unwrap();
            }
        }
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.cell(0, 0).unwrap().get_text().unwrap(), "a");
        assert_eq!(sheet.cell(0, 1).unwrap().cell_type(), CellType::Numeric);
        assert!(sheet.row(1).unwrap().is_empty());
        assert_eq!(sheet.cell(2, 0).unwrap().cell_type(), CellType::Blank);
        assert_eq!(sheet.cell(2, 1).unwrap().get_formula().unwrap(), "B1");
    }
}
