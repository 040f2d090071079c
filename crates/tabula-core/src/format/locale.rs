//! Locale data for number and date rendering

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Length class of a locale date or time pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateStyle {
    #[default]
    Short,
    Medium,
    Long,
}

struct LocaleData {
    tag: &'static str,
    decimal_separator: char,
    grouping_separator: char,
    true_literal: &'static str,
    false_literal: &'static str,
    date_short: &'static str,
    date_medium: &'static str,
    date_long: &'static str,
    time_short: &'static str,
    time_medium: &'static str,
    months: [&'static str; 12],
    months_short: [&'static str; 12],
    weekdays: [&'static str; 7],
    weekdays_short: [&'static str; 7],
    am_pm: [&'static str; 2],
}

const EN_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];
const EN_MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const EN_WEEKDAYS: [&str; 7] = [
    "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday",
];
const EN_WEEKDAYS_SHORT: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const ROOT_DATA: LocaleData = LocaleData {
    tag: "",
    decimal_separator: '.',
    grouping_separator: ',',
    true_literal: "true",
    false_literal: "false",
    date_short: "y-MM-dd",
    date_medium: "y MMM d",
    date_long: "y MMMM d",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    months: EN_MONTHS,
    months_short: EN_MONTHS_SHORT,
    weekdays: EN_WEEKDAYS,
    weekdays_short: EN_WEEKDAYS_SHORT,
    am_pm: ["AM", "PM"],
};

const EN_US_DATA: LocaleData = LocaleData {
    tag: "en_US",
    decimal_separator: '.',
    grouping_separator: ',',
    true_literal: "true",
    false_literal: "false",
    date_short: "M/d/yy",
    date_medium: "MMM d, y",
    date_long: "MMMM d, y",
    time_short: "h:mm a",
    time_medium: "h:mm:ss a",
    months: EN_MONTHS,
    months_short: EN_MONTHS_SHORT,
    weekdays: EN_WEEKDAYS,
    weekdays_short: EN_WEEKDAYS_SHORT,
    am_pm: ["AM", "PM"],
};

const EN_GB_DATA: LocaleData = LocaleData {
    tag: "en_GB",
    decimal_separator: '.',
    grouping_separator: ',',
    true_literal: "true",
    false_literal: "false",
    date_short: "dd/MM/y",
    date_medium: "d MMM y",
    date_long: "d MMMM y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    months: EN_MONTHS,
    months_short: EN_MONTHS_SHORT,
    weekdays: EN_WEEKDAYS,
    weekdays_short: EN_WEEKDAYS_SHORT,
    am_pm: ["am", "pm"],
};

const DE_DE_DATA: LocaleData = LocaleData {
    tag: "de_DE",
    decimal_separator: ',',
    grouping_separator: '.',
    true_literal: "wahr",
    false_literal: "falsch",
    date_short: "dd.MM.yy",
    date_medium: "dd.MM.y",
    date_long: "d. MMMM y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    months: [
        "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August", "September",
        "Oktober", "November", "Dezember",
    ],
    months_short: [
        "Jan.", "Feb.", "März", "Apr.", "Mai", "Juni", "Juli", "Aug.", "Sept.", "Okt.", "Nov.",
        "Dez.",
    ],
    weekdays: [
        "Montag", "Dienstag", "Mittwoch", "Donnerstag", "Freitag", "Samstag", "Sonntag",
    ],
    weekdays_short: ["Mo.", "Di.", "Mi.", "Do.", "Fr.", "Sa.", "So."],
    am_pm: ["AM", "PM"],
};

const FR_FR_DATA: LocaleData = LocaleData {
    tag: "fr_FR",
    decimal_separator: ',',
    grouping_separator: '\u{202f}',
    true_literal: "vrai",
    false_literal: "faux",
    date_short: "dd/MM/y",
    date_medium: "d MMM y",
    date_long: "d MMMM y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    months: [
        "janvier", "février", "mars", "avril", "mai", "juin", "juillet", "août", "septembre",
        "octobre", "novembre", "décembre",
    ],
    months_short: [
        "janv.", "févr.", "mars", "avr.", "mai", "juin", "juil.", "août", "sept.", "oct.",
        "nov.", "déc.",
    ],
    weekdays: [
        "lundi", "mardi", "mercredi", "jeudi", "vendredi", "samedi", "dimanche",
    ],
    weekdays_short: ["lun.", "mar.", "mer.", "jeu.", "ven.", "sam.", "dim."],
    am_pm: ["AM", "PM"],
};

const ES_ES_DATA: LocaleData = LocaleData {
    tag: "es_ES",
    decimal_separator: ',',
    grouping_separator: '.',
    true_literal: "verdadero",
    false_literal: "falso",
    date_short: "d/M/yy",
    date_medium: "d MMM y",
    date_long: "d 'de' MMMM 'de' y",
    time_short: "H:mm",
    time_medium: "H:mm:ss",
    months: [
        "enero", "febrero", "marzo", "abril", "mayo", "junio", "julio", "agosto", "septiembre",
        "octubre", "noviembre", "diciembre",
    ],
    months_short: [
        "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
    ],
    weekdays: [
        "lunes", "martes", "miércoles", "jueves", "viernes", "sábado", "domingo",
    ],
    weekdays_short: ["lun", "mar", "mié", "jue", "vie", "sáb", "dom"],
    am_pm: ["a. m.", "p. m."],
};

const IT_IT_DATA: LocaleData = LocaleData {
    tag: "it_IT",
    decimal_separator: ',',
    grouping_separator: '.',
    true_literal: "vero",
    false_literal: "falso",
    date_short: "dd/MM/yy",
    date_medium: "d MMM y",
    date_long: "d MMMM y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    months: [
        "gennaio", "febbraio", "marzo", "aprile", "maggio", "giugno", "luglio", "agosto",
        "settembre", "ottobre", "novembre", "dicembre",
    ],
    months_short: [
        "gen", "feb", "mar", "apr", "mag", "giu", "lug", "ago", "set", "ott", "nov", "dic",
    ],
    weekdays: [
        "lunedì", "martedì", "mercoledì", "giovedì", "venerdì", "sabato", "domenica",
    ],
    weekdays_short: ["lun", "mar", "mer", "gio", "ven", "sab", "dom"],
    am_pm: ["AM", "PM"],
};

const NL_NL_DATA: LocaleData = LocaleData {
    tag: "nl_NL",
    decimal_separator: ',',
    grouping_separator: '.',
    true_literal: "waar",
    false_literal: "onwaar",
    date_short: "dd-MM-y",
    date_medium: "d MMM y",
    date_long: "d MMMM y",
    time_short: "HH:mm",
    time_medium: "HH:mm:ss",
    months: [
        "januari", "februari", "maart", "april", "mei", "juni", "juli", "augustus", "september",
        "oktober", "november", "december",
    ],
    months_short: [
        "jan.", "feb.", "mrt.", "apr.", "mei", "jun.", "jul.", "aug.", "sep.", "okt.", "nov.",
        "dec.",
    ],
    weekdays: [
        "maandag", "dinsdag", "woensdag", "donderdag", "vrijdag", "zaterdag", "zondag",
    ],
    weekdays_short: ["ma", "di", "wo", "do", "vr", "za", "zo"],
    am_pm: ["a.m.", "p.m."],
};

static ALL: [Locale; 8] = [
    Locale::ROOT,
    Locale::EN_US,
    Locale::EN_GB,
    Locale::DE_DE,
    Locale::FR_FR,
    Locale::ES_ES,
    Locale::IT_IT,
    Locale::NL_NL,
];

/// A supported locale
///
/// Locales are a fixed table; parse one with [`Locale::parse`] or use the constants.
#[derive(Clone, Copy)]
pub struct Locale(&'static LocaleData);

impl Locale {
    /// Language-neutral locale with ISO-like dates
    pub const ROOT: Locale = Locale(&ROOT_DATA);
    pub const EN_US: Locale = Locale(&EN_US_DATA);
    pub const EN_GB: Locale = Locale(&EN_GB_DATA);
    pub const DE_DE: Locale = Locale(&DE_DE_DATA);
    pub const FR_FR: Locale = Locale(&FR_FR_DATA);
    pub const ES_ES: Locale = Locale(&ES_ES_DATA);
    pub const IT_IT: Locale = Locale(&IT_IT_DATA);
    pub const NL_NL: Locale = Locale(&NL_NL_DATA);

    /// Every supported locale
    pub fn all() -> &'static [Locale] {
        &ALL
    }

    /// Parse a locale tag such as `de_DE`, `de-DE` or `de`
    ///
    /// A bare language resolves to the first listed locale for that language.
    pub fn parse(tag: &str) -> Result<Locale> {
        let normalized = tag.trim().replace('-', "_");
        if normalized.is_empty() || normalized.eq_ignore_ascii_case("root") {
            return Ok(Locale::ROOT);
        }
        if let Some(locale) = ALL
            .iter()
            .find(|l| l.tag().eq_ignore_ascii_case(&normalized))
        {
            return Ok(*locale);
        }
        let language = normalized.split('_').next().unwrap_or("");
        ALL.iter()
            .find(|l| !l.tag().is_empty() && l.language().eq_ignore_ascii_case(language))
            .copied()
            .ok_or_else(|| Error::UnsupportedLocale(tag.to_string()))
    }

    pub fn tag(&self) -> &'static str {
        self.0.tag
    }

    pub fn language(&self) -> &'static str {
        self.0.tag.split('_').next().unwrap_or("")
    }

    pub fn decimal_separator(&self) -> char {
        self.0.decimal_separator
    }

    pub fn grouping_separator(&self) -> char {
        self.0.grouping_separator
    }

    /// Characters accepted as grouping separator when parsing
    ///
    /// Locales grouping with a narrow no-break space also accept the no-break
    /// space and a plain space, since both renderings are in common use.
    pub fn grouping_separators(&self) -> &'static [char] {
        match self.0.grouping_separator {
            '\u{202f}' | '\u{a0}' | ' ' => &['\u{202f}', '\u{a0}', ' '],
            ',' => &[','],
            '.' => &['.'],
            _ => &[],
        }
    }

    /// Localized boolean literals `(true, false)`
    pub fn boolean_literals(&self) -> (&'static str, &'static str) {
        (self.0.true_literal, self.0.false_literal)
    }

    /// Date pattern in pattern-letter syntax (`d`, `M`, `y`, quoted literals)
    pub fn date_pattern(&self, style: DateStyle) -> &'static str {
        match style {
            DateStyle::Short => self.0.date_short,
            DateStyle::Medium => self.0.date_medium,
            DateStyle::Long => self.0.date_long,
        }
    }

    /// Time pattern; Long resolves to the medium pattern
    pub fn time_pattern(&self, style: DateStyle) -> &'static str {
        match style {
            DateStyle::Short => self.0.time_short,
            DateStyle::Medium | DateStyle::Long => self.0.time_medium,
        }
    }

    /// Month name, `month` in 1..=12
    pub fn month_name(&self, month: u32, abbreviated: bool) -> &'static str {
        let names = if abbreviated {
            &self.0.months_short
        } else {
            &self.0.months
        };
        names
            .get(month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("")
    }

    /// Weekday name, Monday = 0
    pub fn weekday_name(&self, weekday: u32, abbreviated: bool) -> &'static str {
        let names = if abbreviated {
            &self.0.weekdays_short
        } else {
            &self.0.weekdays
        };
        names.get(weekday as usize).copied().unwrap_or("")
    }

    pub(crate) fn months(&self, abbreviated: bool) -> &'static [&'static str; 12] {
        if abbreviated {
            &self.0.months_short
        } else {
            &self.0.months
        }
    }

    /// AM/PM marker for the given half of the day
    pub fn am_pm(&self, pm: bool) -> &'static str {
        self.0.am_pm[pm as usize]
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale::EN_US
    }
}

impl PartialEq for Locale {
    fn eq(&self, other: &Self) -> bool {
        self.0.tag == other.0.tag
    }
}

impl Eq for Locale {}

impl std::hash::Hash for Locale {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.tag.hash(state);
    }
}

impl fmt::Debug for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Locale({})", self.display_tag())
    }
}

impl Locale {
    fn display_tag(&self) -> &'static str {
        if self.0.tag.is_empty() {
            "ROOT"
        } else {
            self.0.tag
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_tag())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Locale::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(Locale::parse("de_DE").unwrap(), Locale::DE_DE);
        assert_eq!(Locale::parse("de-de").unwrap(), Locale::DE_DE);
        assert_eq!(Locale::parse("fr").unwrap(), Locale::FR_FR);
        assert_eq!(Locale::parse("en").unwrap(), Locale::EN_US);
        assert_eq!(Locale::parse("ROOT").unwrap(), Locale::ROOT);
        assert!(matches!(
            Locale::parse("xx_YY"),
            Err(Error::UnsupportedLocale(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Locale::DE_DE.to_string(), "de_DE");
        assert_eq!(Locale::ROOT.to_string(), "ROOT");
        assert_eq!(Locale::parse(&Locale::ROOT.to_string()).unwrap(), Locale::ROOT);
    }

    #[test]
    fn test_separators() {
        assert_eq!(Locale::EN_US.decimal_separator(), '.');
        assert_eq!(Locale::DE_DE.decimal_separator(), ',');
        assert_eq!(Locale::FR_FR.grouping_separators().len(), 3);
    }

    #[test]
    fn test_names() {
        assert_eq!(Locale::DE_DE.month_name(3, false), "März");
        assert_eq!(Locale::EN_US.month_name(12, true), "Dec");
        assert_eq!(Locale::FR_FR.weekday_name(0, false), "lundi");
        assert_eq!(Locale::EN_US.month_name(13, false), "");
    }
}
