//! Cell value types

use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::sync::Arc;

/// The type tag of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellType {
    Blank,
    Boolean,
    Error,
    Formula,
    Numeric,
    Text,
    Date,
    DateTime,
}

impl CellType {
    /// All cell types, in declaration order
    pub const ALL: [CellType; 8] = [
        CellType::Blank,
        CellType::Boolean,
        CellType::Error,
        CellType::Formula,
        CellType::Numeric,
        CellType::Text,
        CellType::Date,
        CellType::DateTime,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CellType::Blank => "BLANK",
            CellType::Boolean => "BOOLEAN",
            CellType::Error => "ERROR",
            CellType::Formula => "FORMULA",
            CellType::Numeric => "NUMERIC",
            CellType::Text => "TEXT",
            CellType::Date => "DATE",
            CellType::DateTime => "DATE_TIME",
        }
    }
}

impl fmt::Display for CellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Represents the value stored in a cell
///
/// The variant is the cell's type; there is no separate type field to keep in sync.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Blank,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Error value (#VALUE!, #REF!, etc.)
    Error(CellError),

    /// Formula text, stored without the leading '='
    Formula(String),

    /// Numeric value
    Numeric(f64),

    /// Text value
    Text(SharedString),

    /// Calendar date
    Date(NaiveDate),

    /// Date with time of day
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Create a new text value
    pub fn text<S: AsRef<str>>(s: S) -> Self {
        CellValue::Text(SharedString::new(s))
    }

    /// Create a new formula value; a leading '=' is dropped
    pub fn formula<S: AsRef<str>>(text: S) -> Self {
        let text = text.as_ref();
        CellValue::Formula(text.strip_prefix('=').unwrap_or(text).to_string())
    }

    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Blank => CellType::Blank,
            CellValue::Boolean(_) => CellType::Boolean,
            CellValue::Error(_) => CellType::Error,
            CellValue::Formula(_) => CellType::Formula,
            CellValue::Numeric(_) => CellType::Numeric,
            CellValue::Text(_) => CellType::Text,
            CellValue::Date(_) => CellType::Date,
            CellValue::DateTime(_) => CellType::DateTime,
        }
    }

    /// Check if the cell is blank
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Blank)
    }

    /// Check if the value is a date or date-time
    pub fn is_temporal(&self) -> bool {
        matches!(self, CellValue::Date(_) | CellValue::DateTime(_))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Numeric(n as f64)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Numeric(n as f64)
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Numeric(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Numeric(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::text(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(SharedString::from(s))
    }
}

impl From<SharedString> for CellValue {
    fn from(s: SharedString) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(CellValue::Blank, Into::into)
    }
}

/// Error codes stored in ERROR cells
///
/// The code survives XLSX round-trips; text rendering always uses the
/// generic [`ERROR_TEXT`](crate::ERROR_TEXT) marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellError {
    /// #NULL! - Incorrect range operator
    Null,
    /// #DIV/0! - Division by zero
    Div0,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #REF! - Invalid cell reference
    Ref,
    /// #NAME? - Unrecognized formula name
    Name,
    /// #NUM! - Invalid numeric value
    Num,
    /// #N/A - Value not available
    #[default]
    Na,
}

impl CellError {
    /// Get the container code for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
        }
    }

    /// Parse an error code
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "#NULL!" => Some(CellError::Null),
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#NUM!" => Some(CellError::Num),
            "#N/A" => Some(CellError::Na),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference-counted string for text cells
///
/// Text read from a shared-strings table is cloned into many cells;
/// `Arc<str>` lets those cells share one allocation.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SharedString {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SharedString {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(SharedString::from)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString(Arc::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_conversions() {
        assert_eq!(CellValue::from(true), CellValue::Boolean(true));
        assert_eq!(CellValue::from(42), CellValue::Numeric(42.0));
        assert_eq!(CellValue::from("hi"), CellValue::text("hi"));
        assert_eq!(CellValue::from(None::<f64>), CellValue::Blank);
        assert_eq!(CellValue::from(Some(1.5)), CellValue::Numeric(1.5));
    }

    #[test]
    fn test_formula_strips_equals() {
        assert_eq!(CellValue::formula("=A1+1"), CellValue::Formula("A1+1".into()));
        assert_eq!(CellValue::formula("SUM(A1:A3)"), CellValue::Formula("SUM(A1:A3)".into()));
    }

    #[test]
    fn test_cell_type_of_value() {
        let date = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();
        assert_eq!(CellValue::Blank.cell_type(), CellType::Blank);
        assert_eq!(CellValue::from(date).cell_type(), CellType::Date);
        assert_eq!(
            CellValue::from(date.and_hms_opt(1, 2, 3).unwrap()).cell_type(),
            CellType::DateTime
        );
        assert_eq!(CellType::DateTime.to_string(), "DATE_TIME");
    }

    #[test]
    fn test_cell_error_parse() {
        assert_eq!(CellError::parse("#div/0!"), Some(CellError::Div0));
        assert_eq!(CellError::parse("#N/A"), Some(CellError::Na));
        assert_eq!(CellError::parse("#BOGUS"), None);
        assert_eq!(CellError::Ref.to_string(), "#REF!");
    }
}
