//! Locale-aware value rendering and parsing
//!
//! - [`Locale`] - separators, boolean literals, date patterns and names
//! - [`DatePattern`] - date/time patterns, both pattern letters and format codes
//! - [`NumberPattern`] - spreadsheet number format codes
//! - serial conversion between dates and spreadsheet numbers

mod date;
mod locale;
mod number;
mod serial;

pub use date::DatePattern;
pub use locale::{DateStyle, Locale};
pub use number::{format_exact, format_general, parse_number, NumberPattern};
pub use serial::{date_to_serial, datetime_to_serial, serial_to_datetime};

use crate::style::NumberFormat;
use ahash::AHashMap;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock};

static NUMBER_PATTERNS: Lazy<RwLock<AHashMap<String, NumberPattern>>> =
    Lazy::new(|| RwLock::new(AHashMap::new()));

fn with_number_pattern<R>(code: &str, f: impl FnOnce(&NumberPattern) -> R) -> R {
    if let Some(pattern) = NUMBER_PATTERNS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(code)
    {
        return f(pattern);
    }
    let pattern = NumberPattern::compile(code);
    let result = f(&pattern);
    NUMBER_PATTERNS
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(code.to_string(), pattern);
    result
}

/// The locale's short date pattern, optionally followed by its short time pattern
pub fn locale_date_pattern(locale: Locale, with_time: bool) -> DatePattern {
    let date = locale.date_pattern(DateStyle::Short);
    if with_time {
        DatePattern::from_letters(&format!("{} {}", date, locale.time_pattern(DateStyle::Short)))
    } else {
        DatePattern::from_letters(date)
    }
}

/// Render a number through a cell's number format
///
/// Date formats render the number as a serial date.
pub fn format_number(value: f64, format: &NumberFormat, locale: Locale) -> String {
    match format {
        NumberFormat::General => format_general(value, locale),
        _ if format.is_date_format() => match serial_to_datetime(value) {
            Some(dt) => format_temporal(&dt, format, locale, format.has_time_component()),
            None => format_general(value, locale),
        },
        _ if format.builtin_id() == Some(NumberFormat::ID_TEXT) => format_general(value, locale),
        _ => with_number_pattern(format.code(), |pattern| pattern.format(value, locale)),
    }
}

/// Render a date or date-time through a cell's number format
///
/// The system date formats (ids 14 and 22) and non-date formats fall back to the
/// locale's short date pattern, with its short time when `with_time` is set.
pub fn format_temporal(
    value: &NaiveDateTime,
    format: &NumberFormat,
    locale: Locale,
    with_time: bool,
) -> String {
    if format.is_system_date() || !format.is_date_format() {
        let with_time = match format.builtin_id() {
            Some(NumberFormat::ID_DATETIME) => true,
            Some(NumberFormat::ID_DATE_SHORT) => false,
            _ => with_time,
        };
        return locale_date_pattern(locale, with_time).format(value, locale);
    }
    DatePattern::from_format_code(format.code()).format(value, locale)
}
