//! Number format types

use once_cell::sync::Lazy;
use regex::Regex;

/// Quoted literals, escaped characters and bracket blocks, which never carry date tokens
static NON_TOKEN_PARTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"]*"|\\.|_.|\*.|\[[^\]]*\]"#).expect("valid regex"));

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 14 - system short date, rendered with the locale's short date pattern
    pub const ID_DATE_SHORT: u32 = 14;
    /// 22 - system short date and time
    pub const ID_DATETIME: u32 = 22;
    /// 49 - @
    pub const ID_TEXT: u32 = 49;

    /// Create a number format from a format string, mapping built-in codes to their id
    pub fn from_code<S: AsRef<str>>(code: S) -> Self {
        let code = code.as_ref();
        if code.is_empty() || code.eq_ignore_ascii_case("General") {
            return NumberFormat::General;
        }
        match (1..=49).find(|id| builtin_code(*id) == Some(code)) {
            Some(id) => NumberFormat::BuiltIn(id),
            None => NumberFormat::Custom(code.to_string()),
        }
    }

    pub fn from_id(id: u32) -> Self {
        if id == 0 {
            NumberFormat::General
        } else {
            NumberFormat::BuiltIn(id)
        }
    }

    /// System short date (locale dependent)
    pub fn date() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATE_SHORT)
    }

    /// System short date and time (locale dependent)
    pub fn datetime() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATETIME)
    }

    /// Get the format code
    pub fn code(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => builtin_code(*id).unwrap_or("General"),
            NumberFormat::Custom(s) => s,
        }
    }

    /// Built-in id, if this format has one
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(0),
            NumberFormat::BuiltIn(id) => Some(*id),
            NumberFormat::Custom(_) => None,
        }
    }

    /// Whether the format resolves against the locale's own date patterns
    pub fn is_system_date(&self) -> bool {
        matches!(self, NumberFormat::BuiltIn(Self::ID_DATE_SHORT) | NumberFormat::BuiltIn(Self::ID_DATETIME))
    }

    /// Check if this is a date/time format
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22 | 45..=47),
            NumberFormat::Custom(code) => date_tokens(code).any(|c| matches!(c, 'd' | 'm' | 'y' | 'h' | 's')),
        }
    }

    /// Check if the format shows a time of day
    pub fn has_time_component(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 18..=22 | 45..=47),
            NumberFormat::Custom(code) => date_tokens(code).any(|c| matches!(c, 'h' | 's')),
        }
    }

    /// Check if the format shows a calendar date
    pub fn has_date_component(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 14..=17 | 22),
            NumberFormat::Custom(code) => date_tokens(code).any(|c| matches!(c, 'd' | 'y')) || {
                // a bare 'm' is a month only when no hour/second token is present
                let tokens: Vec<char> = date_tokens(code).collect();
                tokens.contains(&'m') && !tokens.iter().any(|c| matches!(c, 'h' | 's'))
            },
        }
    }
}

/// Lowercased characters of the first section with literal parts removed
fn date_tokens(code: &str) -> impl Iterator<Item = char> + '_ {
    let section = code.split(';').next().unwrap_or("");
    NON_TOKEN_PARTS
        .replace_all(section, "")
        .to_lowercase()
        .chars()
        .collect::<Vec<_>>()
        .into_iter()
}

/// Get built-in format code by ID
pub(crate) fn builtin_code(id: u32) -> Option<&'static str> {
    Some(match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        5 => "\"$\"#,##0_);(\"$\"#,##0)",
        6 => "\"$\"#,##0_);[Red](\"$\"#,##0)",
        7 => "\"$\"#,##0.00_);(\"$\"#,##0.00)",
        8 => "\"$\"#,##0.00_);[Red](\"$\"#,##0.00)",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "m/d/yyyy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yyyy h:mm",
        37 => "#,##0_);(#,##0)",
        38 => "#,##0_);[Red](#,##0)",
        39 => "#,##0.00_);(#,##0.00)",
        40 => "#,##0.00_);[Red](#,##0.00)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mm:ss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_maps_builtins() {
        assert_eq!(NumberFormat::from_code("General"), NumberFormat::General);
        assert_eq!(NumberFormat::from_code("0.00"), NumberFormat::BuiltIn(2));
        assert_eq!(NumberFormat::from_code("m/d/yyyy"), NumberFormat::BuiltIn(14));
        assert_eq!(
            NumberFormat::from_code("yyyy-mm-dd"),
            NumberFormat::Custom("yyyy-mm-dd".into())
        );
    }

    #[test]
    fn test_is_date_format() {
        assert!(NumberFormat::date().is_date_format());
        assert!(NumberFormat::Custom("dd.mm.yyyy".into()).is_date_format());
        assert!(NumberFormat::Custom("[$-409]h:mm".into()).is_date_format());
        assert!(!NumberFormat::Custom("\"days\" 0".into()).is_date_format());
        assert!(!NumberFormat::Custom("[Red]#,##0.00".into()).is_date_format());
        assert!(!NumberFormat::Custom("0.00E+00".into()).is_date_format());
        assert!(!NumberFormat::General.is_date_format());
    }

    #[test]
    fn test_time_and_date_components() {
        let time = NumberFormat::Custom("hh:mm".into());
        assert!(time.has_time_component());
        assert!(!time.has_date_component());

        let month = NumberFormat::Custom("mmm yyyy".into());
        assert!(month.has_date_component());
        assert!(!month.has_time_component());

        assert!(NumberFormat::datetime().has_time_component());
        assert!(NumberFormat::datetime().has_date_component());
    }
}
