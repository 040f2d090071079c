//! Import of database query results into a sheet

use chrono::{NaiveDate, NaiveDateTime};
use tabula_core::{CellValue, Sheet};

use crate::error::{Error, Result};

/// Text written in place of a field that could not be read
pub const FIELD_ERROR_TEXT: &str = "###";

/// A single field of a result row
#[derive(Debug, Clone, PartialEq)]
pub enum DbValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// Large character object; stored as plain text
    Clob(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl From<DbValue> for CellValue {
    fn from(value: DbValue) -> Self {
        match value {
            DbValue::Null => CellValue::Blank,
            DbValue::Boolean(b) => CellValue::Boolean(b),
            // sheets hold doubles
            DbValue::Integer(i) => CellValue::Numeric(i as f64),
            DbValue::Float(f) => CellValue::Numeric(f),
            DbValue::Text(s) | DbValue::Clob(s) => CellValue::text(s),
            DbValue::Date(d) => CellValue::Date(d),
            DbValue::DateTime(dt) => CellValue::DateTime(dt),
        }
    }
}

/// A forward-only cursor over query results
pub trait ResultSet {
    /// Column labels, in column order
    fn column_labels(&self) -> Vec<String>;

    /// Move to the next row; `false` once the rows are exhausted
    fn advance(&mut self) -> Result<bool>;

    /// Field `col` of the current row
    fn get(&mut self, col: usize) -> Result<DbValue>;
}

/// Append the rows of `rs` to the end of `sheet`
///
/// With `add_header` the column labels form the first appended row. A field
/// that fails to read is written as [`FIELD_ERROR_TEXT`] and the import
/// continues. Returns the number of data rows written.
pub fn import_result_set<R: ResultSet + ?Sized>(
    sheet: &mut Sheet,
    rs: &mut R,
    add_header: bool,
) -> Result<usize> {
    log::debug!("importing result set into sheet {}", sheet.name());
    let labels = rs.column_labels();
    if add_header {
        sheet.create_row(labels.iter().map(String::as_str))?;
    }

    let mut count = 0;
    while rs.advance()? {
        let mut values = Vec::with_capacity(labels.len());
        for col in 0..labels.len() {
            let value = match rs.get(col) {
                Ok(value) => CellValue::from(value),
                Err(e) => {
                    log::warn!(
                        "could not read column {} of row {}: {}",
                        labels[col],
                        count + 1,
                        e
                    );
                    CellValue::text(FIELD_ERROR_TEXT)
                }
            };
            values.push(value);
        }
        sheet.create_row(values)?;
        count += 1;
    }
    log::debug!("imported {} rows", count);
    Ok(count)
}

/// A result set held in memory
///
/// Fields may be stored as read failures to stand in for driver errors.
#[derive(Debug, Clone, Default)]
pub struct MemoryResultSet {
    labels: Vec<String>,
    rows: Vec<Vec<std::result::Result<DbValue, String>>>,
    cursor: Option<usize>,
}

impl MemoryResultSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            cursor: None,
        }
    }

    pub fn push_row(&mut self, row: Vec<DbValue>) {
        self.rows.push(row.into_iter().map(Ok).collect());
    }

    /// Push a row where some fields fail to read with the given message
    pub fn push_fallible_row(&mut self, row: Vec<std::result::Result<DbValue, String>>) {
        self.rows.push(row);
    }
}

impl ResultSet for MemoryResultSet {
    fn column_labels(&self) -> Vec<String> {
        self.labels.clone()
    }

    fn advance(&mut self) -> Result<bool> {
        let next = self.cursor.map_or(0, |c| c + 1);
        self.cursor = Some(next.min(self.rows.len()));
        Ok(next < self.rows.len())
    }

    fn get(&mut self, col: usize) -> Result<DbValue> {
        let row = self
            .cursor
            .and_then(|c| self.rows.get(c))
            .ok_or_else(|| Error::other("no current row"))?;
        match row.get(col) {
            Some(Ok(value)) => Ok(value.clone()),
            Some(Err(message)) => Err(Error::other(message.clone())),
            None => Ok(DbValue::Null),
        }
    }
}
