//! Codec options shared by the readers and writers

use crate::format::{DatePattern, DateStyle, Locale};
use std::fmt;

/// Field delimiter for text codecs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Delimiter {
    /// `;` for locales whose decimal separator is `,`, otherwise `,`
    #[default]
    LocaleDependent,
    Char(char),
}

impl Delimiter {
    pub fn resolve(self, locale: Locale) -> char {
        match self {
            Delimiter::Char(c) => c,
            Delimiter::LocaleDependent if locale.decimal_separator() == ',' => ';',
            Delimiter::LocaleDependent => ',',
        }
    }
}

impl From<char> for Delimiter {
    fn from(c: char) -> Self {
        Delimiter::Char(c)
    }
}

/// How dates are written to and sniffed from text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DateFormatStyle {
    /// The locale's short date pattern
    #[default]
    LocaleShort,
    /// The locale's long date pattern
    LocaleLong,
    /// `yyyy-MM-dd`, with ` HH:mm:ss` for date-times
    Iso,
}

impl DateFormatStyle {
    pub const ALL: [DateFormatStyle; 3] = [
        DateFormatStyle::LocaleShort,
        DateFormatStyle::LocaleLong,
        DateFormatStyle::Iso,
    ];

    /// Pattern used to write a value of this style
    pub fn pattern(self, locale: Locale, with_time: bool) -> DatePattern {
        let letters = match (self, with_time) {
            (DateFormatStyle::Iso, false) => "yyyy-MM-dd".to_string(),
            (DateFormatStyle::Iso, true) => "yyyy-MM-dd HH:mm:ss".to_string(),
            (style, false) => locale.date_pattern(style.date_style()).to_string(),
            (style, true) => format!(
                "{} {}",
                locale.date_pattern(style.date_style()),
                locale.time_pattern(DateStyle::Short)
            ),
        };
        DatePattern::from_letters(&letters)
    }

    /// Patterns tried, in order, when reading text; date-time patterns come first
    pub fn parse_patterns(self, locale: Locale) -> Vec<DatePattern> {
        match self {
            DateFormatStyle::Iso => [
                "yyyy-MM-dd HH:mm:ss",
                "yyyy-MM-dd'T'HH:mm:ss",
                "yyyy-MM-dd HH:mm",
                "yyyy-MM-dd'T'HH:mm",
                "yyyy-MM-dd",
            ]
            .iter()
            .map(|p| DatePattern::from_letters(p))
            .collect(),
            style => {
                let date = locale.date_pattern(style.date_style());
                [DateStyle::Medium, DateStyle::Short]
                    .iter()
                    .map(|t| DatePattern::from_letters(&format!("{} {}", date, locale.time_pattern(*t))))
                    .chain(std::iter::once(DatePattern::from_letters(date)))
                    .collect()
            }
        }
    }

    fn date_style(self) -> DateStyle {
        match self {
            DateFormatStyle::LocaleLong => DateStyle::Long,
            _ => DateStyle::Short,
        }
    }
}

impl fmt::Display for DateFormatStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DateFormatStyle::LocaleShort => "locale-short",
            DateFormatStyle::LocaleLong => "locale-long",
            DateFormatStyle::Iso => "iso",
        })
    }
}

/// Option a file type understands, as listed by its registry entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionKey {
    Delimiter,
    TextQualifier,
    Charset,
    Locale,
    DateFormat,
}

impl OptionKey {
    pub fn name(self) -> &'static str {
        match self {
            OptionKey::Delimiter => "delimiter",
            OptionKey::TextQualifier => "text-qualifier",
            OptionKey::Charset => "charset",
            OptionKey::Locale => "locale",
            OptionKey::DateFormat => "date-format",
        }
    }
}

/// Options passed to readers and writers
///
/// Codecs ignore the options they do not understand.
#[derive(Debug, Clone, PartialEq)]
pub struct IoOptions {
    pub delimiter: Delimiter,
    /// Quote character for text fields
    pub text_qualifier: char,
    /// Character set label, e.g. `UTF-8`, `windows-1252`
    pub charset: String,
    pub locale: Locale,
    pub date_format: DateFormatStyle,
    /// Reject rows with inconsistent field counts
    pub strict: bool,
}

impl Default for IoOptions {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::LocaleDependent,
            text_qualifier: '"',
            charset: "UTF-8".to_string(),
            locale: Locale::EN_US,
            date_format: DateFormatStyle::LocaleShort,
            strict: false,
        }
    }
}

impl IoOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: impl Into<Delimiter>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn with_text_qualifier(mut self, qualifier: char) -> Self {
        self.text_qualifier = qualifier;
        self
    }

    pub fn with_charset<S: Into<String>>(mut self, charset: S) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_date_format(mut self, date_format: DateFormatStyle) -> Self {
        self.date_format = date_format;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// The delimiter character after resolving the locale default
    pub fn delimiter_char(&self) -> char {
        self.delimiter.resolve(self.locale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_locale_dependent_delimiter() {
        assert_eq!(IoOptions::default().delimiter_char(), ',');
        assert_eq!(IoOptions::default().with_locale(Locale::DE_DE).delimiter_char(), ';');
        assert_eq!(IoOptions::default().with_delimiter('\t').delimiter_char(), '\t');
    }

    #[test]
    fn test_iso_patterns() {
        let dt = NaiveDate::from_ymd_opt(2023, 2, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let iso = DateFormatStyle::Iso;
        assert_eq!(iso.pattern(Locale::DE_DE, false).format(&dt, Locale::DE_DE), "2023-02-01");
        assert_eq!(
            iso.pattern(Locale::DE_DE, true).format(&dt, Locale::DE_DE),
            "2023-02-01 08:30:00"
        );
        let parsed = iso
            .parse_patterns(Locale::EN_US)
            .iter()
            .find_map(|p| p.parse("2023-02-01T08:30", Locale::EN_US));
        assert_eq!(parsed, Some(dt));
    }

    #[test]
    fn test_locale_short_parse_patterns() {
        let patterns = DateFormatStyle::LocaleShort.parse_patterns(Locale::EN_US);
        let parsed = patterns.iter().find_map(|p| p.parse("2/1/23", Locale::EN_US));
        assert_eq!(
            parsed.map(|dt| dt.date()),
            NaiveDate::from_ymd_opt(2023, 2, 1)
        );
    }
}
