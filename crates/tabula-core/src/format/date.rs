//! Date pattern compilation, formatting and parsing
//!
//! Two pattern syntaxes compile to the same token list:
//! - pattern letters (`dd.MM.yy`, `h:mm a`, `'de'` quoted literals) used by locale data
//!   and the ISO option;
//! - spreadsheet format codes (`m/d/yyyy h:mm AM/PM`) found in cell styles.

use super::Locale;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Literal(String),
    Year(usize),
    /// 1-2: numeric, 3: abbreviated name, 4+: full name
    Month(usize),
    Day(usize),
    /// 3: abbreviated name, 4+: full name
    Weekday(usize),
    Hour24(usize),
    Hour12(usize),
    Minute(usize),
    Second(usize),
    /// Fractional seconds digits
    Fraction(usize),
    AmPm,
}

/// A compiled date/time pattern
#[derive(Debug, Clone, PartialEq)]
pub struct DatePattern {
    tokens: Vec<Token>,
}

impl DatePattern {
    /// Compile a pattern-letter pattern such as `"dd.MM.yy"` or `"MMM d, y h:mm a"`
    pub fn from_letters(pattern: &str) -> Self {
        let chars: Vec<char> = pattern.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            if c == '\'' {
                // '' is a literal quote, otherwise text up to the closing quote
                if chars.get(i + 1) == Some(&'\'') {
                    push_literal(&mut tokens, "'");
                    i += 2;
                    continue;
                }
                let mut text = String::new();
                i += 1;
                while i < chars.len() {
                    if chars[i] == '\'' {
                        if chars.get(i + 1) == Some(&'\'') {
                            text.push('\'');
                            i += 2;
                            continue;
                        }
                        break;
                    }
                    text.push(chars[i]);
                    i += 1;
                }
                push_literal(&mut tokens, &text);
                i += 1;
                continue;
            }

            let run = chars[i..].iter().take_while(|&&x| x == c).count();
            let token = match c {
                'y' | 'u' => Some(Token::Year(run)),
                'M' | 'L' => Some(Token::Month(run)),
                'd' => Some(Token::Day(run)),
                'E' => Some(Token::Weekday(run.max(3))),
                'H' => Some(Token::Hour24(run)),
                'h' => Some(Token::Hour12(run)),
                'm' => Some(Token::Minute(run)),
                's' => Some(Token::Second(run)),
                'S' => Some(Token::Fraction(run)),
                'a' => Some(Token::AmPm),
                _ => None,
            };
            match token {
                Some(token) => {
                    tokens.push(token);
                    i += run;
                }
                None => {
                    push_literal(&mut tokens, &c.to_string());
                    i += 1;
                }
            }
        }
        Self { tokens }
    }

    /// Compile the date/time part of a spreadsheet format code such as `"dd/mm/yyyy hh:mm"`
    ///
    /// Only the first section is used. `m`/`mm` is a minute when it follows an hour
    /// or precedes a second, and a month otherwise.
    pub fn from_format_code(code: &str) -> Self {
        let section = code.split(';').next().unwrap_or("");
        let chars: Vec<char> = section.chars().collect();
        let mut tokens = Vec::new();
        let has_am_pm = {
            let upper = section.to_uppercase();
            upper.contains("AM/PM") || upper.contains("A/P")
        };
        let mut i = 0;
        while i < chars.len() {
            let c = chars[i];
            match c {
                '"' => {
                    let text: String = chars[i + 1..].iter().take_while(|&&x| x != '"').collect();
                    i += text.chars().count() + 2;
                    push_literal(&mut tokens, &text);
                }
                '\\' => {
                    if let Some(next) = chars.get(i + 1) {
                        push_literal(&mut tokens, &next.to_string());
                    }
                    i += 2;
                }
                '[' => {
                    let block: String = chars[i + 1..].iter().take_while(|&&x| x != ']').collect();
                    i += block.chars().count() + 2;
                    // elapsed-time blocks like [h] still render as hours
                    match block.to_ascii_lowercase().chars().next() {
                        Some('h') => tokens.push(Token::Hour24(block.len())),
                        Some('m') => tokens.push(Token::Minute(block.len())),
                        Some('s') => tokens.push(Token::Second(block.len())),
                        _ => {}
                    }
                }
                '_' | '*' => i += 2,
                _ if starts_with_ignore_case(&chars[i..], "AM/PM") => {
                    tokens.push(Token::AmPm);
                    i += 5;
                }
                _ if starts_with_ignore_case(&chars[i..], "A/P") => {
                    tokens.push(Token::AmPm);
                    i += 3;
                }
                _ => {
                    let lower = c.to_ascii_lowercase();
                    let run = chars[i..]
                        .iter()
                        .take_while(|x| x.to_ascii_lowercase() == lower)
                        .count();
                    let token = match lower {
                        'y' => Some(Token::Year(if run <= 2 { 2 } else { 4 })),
                        'd' if run >= 3 => Some(Token::Weekday(run)),
                        'd' => Some(Token::Day(run)),
                        'h' if has_am_pm => Some(Token::Hour12(run)),
                        'h' => Some(Token::Hour24(run)),
                        's' => Some(Token::Second(run)),
                        'm' => Some(Token::Month(run)),
                        '0' if matches!(tokens.last(), Some(Token::Literal(l)) if l == ".") => {
                            Some(Token::Fraction(run))
                        }
                        _ => None,
                    };
                    match token {
                        Some(token) => {
                            tokens.push(token);
                            i += run;
                        }
                        None => {
                            push_literal(&mut tokens, &c.to_string());
                            i += 1;
                        }
                    }
                }
            }
        }
        resolve_minutes(&mut tokens);
        Self { tokens }
    }

    /// Whether the pattern renders a time of day
    pub fn has_time(&self) -> bool {
        self.tokens.iter().any(|t| {
            matches!(
                t,
                Token::Hour24(_) | Token::Hour12(_) | Token::Minute(_) | Token::Second(_)
            )
        })
    }

    /// Whether the pattern renders a calendar date
    pub fn has_date(&self) -> bool {
        self.tokens
            .iter()
            .any(|t| matches!(t, Token::Year(_) | Token::Month(_) | Token::Day(_)))
    }

    /// Render a date-time with the locale's names and markers
    pub fn format(&self, value: &NaiveDateTime, locale: Locale) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Literal(text) => out.push_str(text),
                Token::Year(2) => out.push_str(&format!("{:02}", value.year().rem_euclid(100))),
                Token::Year(n) => out.push_str(&format!("{:0width$}", value.year(), width = *n)),
                Token::Month(n) if *n >= 4 => out.push_str(locale.month_name(value.month(), false)),
                Token::Month(3) => out.push_str(locale.month_name(value.month(), true)),
                Token::Month(n) => pad(&mut out, value.month(), *n),
                Token::Day(n) => pad(&mut out, value.day(), *n),
                Token::Weekday(n) => {
                    let weekday = value.weekday().num_days_from_monday();
                    out.push_str(locale.weekday_name(weekday, *n < 4));
                }
                Token::Hour24(n) => pad(&mut out, value.hour(), *n),
                Token::Hour12(n) => {
                    let hour = match value.hour() % 12 {
                        0 => 12,
                        h => h,
                    };
                    pad(&mut out, hour, *n);
                }
                Token::Minute(n) => pad(&mut out, value.minute(), *n),
                Token::Second(n) => pad(&mut out, value.second(), *n),
                Token::Fraction(n) => {
                    let nanos = value.nanosecond() % 1_000_000_000;
                    let digits = format!("{:09}", nanos);
                    out.push_str(&digits[..(*n).min(9)]);
                }
                Token::AmPm => out.push_str(locale.am_pm(value.hour() >= 12)),
            }
        }
        out
    }

    /// Parse text that must match the pattern completely
    ///
    /// Two-digit years resolve to 2000-2099. Returns `None` on any mismatch,
    /// on trailing input, or on an impossible date.
    pub fn parse(&self, text: &str, locale: Locale) -> Option<NaiveDateTime> {
        let mut input: &str = text.trim();
        let mut year: Option<i32> = None;
        let mut month: Option<u32> = None;
        let mut day: Option<u32> = None;
        let mut hour: u32 = 0;
        let mut minute: u32 = 0;
        let mut second: u32 = 0;
        let mut nanos: u32 = 0;
        let mut pm: Option<bool> = None;
        let mut twelve_hour = false;

        for (index, token) in self.tokens.iter().enumerate() {
            // fixed width when the next token is also numeric ("yyyyMMdd")
            let fixed = matches!(
                self.tokens.get(index + 1),
                Some(Token::Year(_) | Token::Day(_) | Token::Hour24(_) | Token::Hour12(_) | Token::Minute(_) | Token::Second(_))
            ) || matches!(self.tokens.get(index + 1), Some(Token::Month(n)) if *n <= 2);
            match token {
                Token::Literal(literal) => input = match_literal(input, literal)?,
                Token::Year(n) => {
                    let max = if fixed { (*n).max(2) } else if *n == 2 { 2 } else { 4 };
                    let (value, digits, rest) = take_number(input, max)?;
                    input = rest;
                    year = Some(if *n == 2 && digits <= 2 {
                        2000 + value as i32
                    } else {
                        value as i32
                    });
                }
                Token::Month(n) if *n >= 3 => {
                    let (value, rest) = match_month_name(input, locale)?;
                    month = Some(value);
                    input = rest;
                }
                Token::Month(n) => {
                    let (value, _, rest) = take_number(input, if fixed { *n } else { 2 })?;
                    month = Some(value);
                    input = rest;
                }
                Token::Day(n) => {
                    let (value, _, rest) = take_number(input, if fixed { *n } else { 2 })?;
                    day = Some(value);
                    input = rest;
                }
                Token::Weekday(_) => {
                    input = skip_weekday_name(input, locale)?;
                }
                Token::Hour24(n) | Token::Hour12(n) => {
                    twelve_hour |= matches!(token, Token::Hour12(_));
                    let (value, _, rest) = take_number(input, if fixed { *n } else { 2 })?;
                    hour = value;
                    input = rest;
                }
                Token::Minute(n) => {
                    let (value, _, rest) = take_number(input, if fixed { *n } else { 2 })?;
                    minute = value;
                    input = rest;
                }
                Token::Second(n) => {
                    let (value, _, rest) = take_number(input, if fixed { *n } else { 2 })?;
                    second = value;
                    input = rest;
                }
                Token::Fraction(_) => {
                    let (value, digits, rest) = take_number(input, 9)?;
                    nanos = value * 10u32.pow(9 - digits as u32);
                    input = rest;
                }
                Token::AmPm => {
                    let (is_pm, rest) = match_am_pm(input, locale)?;
                    pm = Some(is_pm);
                    input = rest;
                }
            }
        }

        if !input.trim().is_empty() {
            return None;
        }

        if twelve_hour {
            if !(1..=12).contains(&hour) {
                return None;
            }
            hour %= 12;
            if pm == Some(true) {
                hour += 12;
            }
        }

        let date = if self.has_date() {
            NaiveDate::from_ymd_opt(year?, month?, day.unwrap_or(1))?
        } else {
            NaiveDate::from_ymd_opt(1899, 12, 31)?
        };
        let time = NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?;
        Some(date.and_time(time))
    }
}

fn push_literal(tokens: &mut Vec<Token>, text: &str) {
    if let Some(Token::Literal(last)) = tokens.last_mut() {
        last.push_str(text);
    } else if !text.is_empty() {
        tokens.push(Token::Literal(text.to_string()));
    }
}

fn pad(out: &mut String, value: u32, width: usize) {
    out.push_str(&format!("{:0width$}", value, width = width.min(2)));
}

fn starts_with_ignore_case(chars: &[char], needle: &str) -> bool {
    let needle: Vec<char> = needle.chars().collect();
    chars.len() >= needle.len()
        && chars
            .iter()
            .zip(&needle)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

/// Turn month tokens into minutes where they sit next to hours or seconds
fn resolve_minutes(tokens: &mut [Token]) {
    let mut last_time_unit: Option<usize> = None;
    for i in 0..tokens.len() {
        match tokens[i] {
            Token::Hour24(_) | Token::Hour12(_) => last_time_unit = Some(i),
            Token::Month(n) if n <= 2 => {
                let after_hour = last_time_unit
                    .map(|h| tokens[h + 1..i].iter().all(|t| matches!(t, Token::Literal(_))))
                    .unwrap_or(false);
                let before_second = tokens[i + 1..]
                    .iter()
                    .find(|t| !matches!(t, Token::Literal(_)))
                    .map(|t| matches!(t, Token::Second(_)))
                    .unwrap_or(false);
                if after_hour || before_second {
                    tokens[i] = Token::Minute(n);
                }
            }
            Token::Year(_) | Token::Day(_) => last_time_unit = None,
            _ => {}
        }
    }
}

fn take_number(input: &str, max_digits: usize) -> Option<(u32, usize, &str)> {
    let digits = input
        .chars()
        .take(max_digits)
        .take_while(|c| c.is_ascii_digit())
        .count();
    if digits == 0 {
        return None;
    }
    let value = input[..digits].parse().ok()?;
    Some((value, digits, &input[digits..]))
}

fn is_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{202f}' || c == '\u{a0}'
}

/// Match a literal; any run of spaces in the literal matches any run of spaces in the input
fn match_literal<'a>(mut input: &'a str, literal: &str) -> Option<&'a str> {
    let mut chars = literal.chars().peekable();
    while let Some(c) = chars.next() {
        if is_space(c) {
            while chars.peek().map_or(false, |c| is_space(*c)) {
                chars.next();
            }
            let trimmed = input.trim_start_matches(is_space);
            if trimmed.len() == input.len() {
                return None;
            }
            input = trimmed;
        } else {
            let mut it = input.chars();
            if it.next()?.to_lowercase().ne(c.to_lowercase()) {
                return None;
            }
            input = it.as_str();
        }
    }
    Some(input)
}

fn strip_prefix_ignore_case<'a>(input: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = input;
    for p in prefix.chars() {
        let mut it = rest.chars();
        if it.next()?.to_lowercase().ne(p.to_lowercase()) {
            return None;
        }
        rest = it.as_str();
    }
    Some(rest)
}

fn match_month_name(input: &str, locale: Locale) -> Option<(u32, &str)> {
    let mut best: Option<(u32, &str, usize)> = None;
    for abbreviated in [false, true] {
        for (i, name) in locale.months(abbreviated).iter().enumerate() {
            if let Some(rest) = strip_prefix_ignore_case(input, name) {
                let len = name.chars().count();
                if best.map_or(true, |(_, _, l)| len > l) {
                    best = Some((i as u32 + 1, rest, len));
                }
            }
        }
    }
    best.map(|(month, rest, _)| (month, rest))
}

fn skip_weekday_name(input: &str, locale: Locale) -> Option<&str> {
    (0..7)
        .flat_map(|d| [locale.weekday_name(d, false), locale.weekday_name(d, true)])
        .filter_map(|name| strip_prefix_ignore_case(input, name))
        .min_by_key(|rest| rest.len())
}

fn match_am_pm(input: &str, locale: Locale) -> Option<(bool, &str)> {
    for (pm, marker) in [(false, locale.am_pm(false)), (true, locale.am_pm(true))] {
        if let Some(rest) = strip_prefix_ignore_case(input, marker) {
            return Some((pm, rest));
        }
    }
    None
}
