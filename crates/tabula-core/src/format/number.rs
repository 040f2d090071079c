//! Number rendering through spreadsheet format codes, and locale-aware number parsing

use super::Locale;

/// Maximum fraction digits of the General format (`0.##########`)
const GENERAL_FRACTION_DIGITS: usize = 10;

/// Decimal exponents outside this range render General numbers in `E` notation
const GENERAL_EXPONENT_RANGE: std::ops::RangeInclusive<i32> = -9..=10;

/// Fraction digits of a General mantissa in `E` notation (`0.#####E+00`)
const GENERAL_MANTISSA_DIGITS: usize = 5;

/// Excel renders at most four denominator digits
const MAX_DENOMINATOR_DIGITS: usize = 4;

/// Render a number with the General format
///
/// Up to ten fraction digits and no grouping; very large and very small
/// magnitudes switch to `E` notation.
///
/// ```
/// use tabula_core::format::{format_general, Locale};
///
/// assert_eq!(format_general(123.5, Locale::EN_US), "123.5");
/// assert_eq!(format_general(123.5, Locale::DE_DE), "123,5");
/// assert_eq!(format_general(1e300, Locale::EN_US), "1E+300");
/// ```
pub fn format_general(value: f64, locale: Locale) -> String {
    if let Some(special) = non_finite(value) {
        return special;
    }
    if value != 0.0 && !GENERAL_EXPONENT_RANGE.contains(&decimal_exponent(value)) {
        return format_general_scientific(value, locale);
    }
    let text = format!("{:.*}", GENERAL_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((&text, ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && !(int_part.trim_start_matches('0').is_empty() && frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(int_part);
    if !frac_part.is_empty() {
        out.push(locale.decimal_separator());
        out.push_str(frac_part);
    }
    out
}

fn decimal_exponent(value: f64) -> i32 {
    value.abs().log10().floor() as i32
}

fn format_general_scientific(value: f64, locale: Locale) -> String {
    // "1.50000e300" -> mantissa "1.5", exponent 300
    let text = format!("{:.*e}", GENERAL_MANTISSA_DIGITS, value);
    let (mantissa, exponent) = text.split_once('e').unwrap_or((&text, "0"));
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);
    format!(
        "{}E{}{:02}",
        mantissa.replace('.', &locale.decimal_separator().to_string()),
        if exponent < 0 { '-' } else { '+' },
        exponent.abs()
    )
}

/// Render a number with the shortest text that parses back to the same value
///
/// Used where text must carry the exact number, as in CSV output. Magnitudes
/// outside `1e-5..1e16` use `E` notation.
///
/// ```
/// use tabula_core::format::{format_exact, parse_number, Locale};
///
/// let text = format_exact(0.1 + 0.2, Locale::DE_DE);
/// assert_eq!(text, "0,30000000000000004");
/// assert_eq!(parse_number(&text, Locale::DE_DE), Some(0.1 + 0.2));
/// ```
pub fn format_exact(value: f64, locale: Locale) -> String {
    if let Some(special) = non_finite(value) {
        return special;
    }
    let magnitude = value.abs();
    let text = if value == 0.0 {
        "0".to_string()
    } else if (1e-5..1e16).contains(&magnitude) {
        value.to_string()
    } else {
        format!("{:E}", value)
    };
    text.replace('.', &locale.decimal_separator().to_string())
}

fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".to_string())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "∞" } else { "-∞" }.to_string())
    } else {
        None
    }
}

/// A compiled numeric section of a format code
#[derive(Debug, Clone, PartialEq, Default)]
struct NumberSection {
    prefix: String,
    suffix: String,
    general: bool,
    int_zeros: usize,
    int_placeholders: usize,
    grouping: bool,
    has_decimal_point: bool,
    frac_zeros: usize,
    frac_placeholders: usize,
    percent: u32,
    /// Each trailing comma divides by 1000
    scale_thousands: u32,
    /// `(show plus sign, minimum exponent digits)`
    exponent: Option<(bool, usize)>,
    /// Denominator digits of a fraction format like `# ?/?`
    fraction: Option<usize>,
}

impl NumberSection {
    fn has_digits(&self) -> bool {
        self.int_placeholders + self.frac_placeholders > 0
            || self.has_decimal_point
            || self.fraction.is_some()
            || self.exponent.is_some()
    }
}

/// A compiled spreadsheet number format code (up to four `;`-separated sections)
#[derive(Debug, Clone, PartialEq)]
pub struct NumberPattern {
    sections: Vec<NumberSection>,
}

impl NumberPattern {
    /// Compile a format code
    ///
    /// Codes are written with `.` as decimal point and `,` as grouping mark regardless
    /// of locale; the locale only changes the rendered symbols.
    pub fn compile(code: &str) -> Self {
        let sections = split_sections(code)
            .iter()
            .map(|section| compile_section(section))
            .collect();
        Self { sections }
    }

    /// Render a number
    pub fn format(&self, value: f64, locale: Locale) -> String {
        if let Some(special) = non_finite(value) {
            return special;
        }
        // sections: [all] | [non-negative, negative] | [positive, negative, zero, text]
        let (section, explicit_sign) = match (self.sections.len(), value) {
            (0, _) => return format_general(value, locale),
            (1, _) => (&self.sections[0], false),
            (_, v) if v < 0.0 => (&self.sections[1], true),
            (n, v) if n >= 3 && v == 0.0 => (&self.sections[2], false),
            _ => (&self.sections[0], false),
        };
        let magnitude = if explicit_sign { value.abs() } else { value };
        format_section(section, magnitude, locale)
    }
}

/// Split on `;` outside quotes and brackets
fn split_sections(code: &str) -> Vec<String> {
    let mut sections = vec![String::new()];
    let mut in_quote = false;
    let mut in_bracket = false;
    let mut escaped = false;
    for c in code.chars() {
        if escaped {
            escaped = false;
        } else if c == '\\' && !in_quote {
            escaped = true;
        } else if c == '"' {
            in_quote = !in_quote;
        } else if c == '[' && !in_quote {
            in_bracket = true;
        } else if c == ']' && !in_quote {
            in_bracket = false;
        } else if c == ';' && !in_quote && !in_bracket {
            sections.push(String::new());
            continue;
        }
        if let Some(last) = sections.last_mut() {
            last.push(c);
        }
    }
    sections
}

fn flush_literal(section: &mut NumberSection, literal: &mut String, seen_digit: bool) {
    if seen_digit {
        section.suffix.push_str(literal);
    } else {
        section.prefix.push_str(literal);
    }
    literal.clear();
}

fn compile_section(code: &str) -> NumberSection {
    let mut section = NumberSection::default();
    let chars: Vec<char> = code.chars().collect();
    let mut seen_digit = false;
    let mut in_fraction = false;
    let mut pending_commas = 0u32;
    // a literal between two digit runs, as in "# ?/?"
    let mut saw_gap = false;
    let mut literal = String::new();

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let text: String = chars[i + 1..].iter().take_while(|&&x| x != '"').collect();
                i += text.chars().count() + 2;
                literal.push_str(&text);
                continue;
            }
            '\\' => {
                if let Some(next) = chars.get(i + 1) {
                    literal.push(*next);
                }
                i += 2;
                continue;
            }
            '_' => {
                literal.push(' ');
                i += 2;
                continue;
            }
            '*' => {
                i += 2;
                continue;
            }
            '[' => {
                let block: String = chars[i + 1..].iter().take_while(|&&x| x != ']').collect();
                i += block.chars().count() + 2;
                // currency blocks like [$€-407] contribute their symbol
                if let Some(currency) = block.strip_prefix('$') {
                    literal.push_str(currency.split('-').next().unwrap_or(""));
                }
                continue;
            }
            'G' | 'g' if code[char_offset(code, i)..].to_ascii_lowercase().starts_with("general") => {
                flush_literal(&mut section, &mut literal, seen_digit);
                section.general = true;
                seen_digit = true;
                i += 7;
                continue;
            }
            _ => {}
        }

        match c {
            '0' | '#' | '?' => {
                if !seen_digit {
                    flush_literal(&mut section, &mut literal, false);
                } else if !literal.is_empty() {
                    literal.clear();
                    saw_gap = true;
                }
                if pending_commas > 0 && !in_fraction && section.exponent.is_none() {
                    section.grouping = true;
                    pending_commas = 0;
                }
                seen_digit = true;
                if let Some(digits) = section.fraction.as_mut() {
                    *digits += 1;
                } else if let Some((_, digits)) = section.exponent.as_mut() {
                    *digits += 1;
                } else if in_fraction {
                    section.frac_placeholders += 1;
                    if c == '0' {
                        section.frac_zeros += 1;
                    }
                } else {
                    section.int_placeholders += 1;
                    if c == '0' {
                        section.int_zeros += 1;
                    }
                }
            }
            '.' if !in_fraction && section.exponent.is_none() => {
                in_fraction = true;
                section.has_decimal_point = true;
                if !seen_digit {
                    flush_literal(&mut section, &mut literal, false);
                    seen_digit = true;
                }
            }
            ',' if seen_digit => pending_commas += 1,
            '%' => {
                section.percent += 1;
                literal.push('%');
            }
            'E' | 'e' if seen_digit && matches!(chars.get(i + 1), Some('+') | Some('-')) => {
                section.exponent = Some((chars[i + 1] == '+', 0));
                i += 2;
                continue;
            }
            '/' if seen_digit && section.exponent.is_none() => {
                // the run before the slash is the numerator, not the whole part
                section.fraction = Some(0);
                section.int_placeholders = usize::from(saw_gap);
                section.int_zeros = section.int_zeros.min(section.int_placeholders);
                literal.clear();
            }
            '@' => {}
            _ => literal.push(c),
        }
        i += 1;
    }
    section.scale_thousands = pending_commas;
    flush_literal(&mut section, &mut literal, seen_digit);
    section
}

fn char_offset(s: &str, char_index: usize) -> usize {
    s.char_indices().nth(char_index).map_or(s.len(), |(o, _)| o)
}

fn format_section(section: &NumberSection, value: f64, locale: Locale) -> String {
    let mut value = value * 100f64.powi(section.percent as i32);
    value /= 1000f64.powi(section.scale_thousands as i32);

    let mut out = String::new();
    if value < 0.0 {
        out.push('-');
        value = -value;
    }
    out.push_str(&section.prefix);

    if section.general {
        out.push_str(&format_general(value, locale));
    } else if !section.has_digits() {
        // pure-literal section such as "zero"
    } else if let Some(digits) = section.fraction {
        out.push_str(&format_fraction(value, section, digits.max(1)));
    } else if let Some((plus, exp_digits)) = section.exponent {
        out.push_str(&format_scientific(value, section, plus, exp_digits, locale));
    } else {
        out.push_str(&format_fixed(value, section, locale));
    }

    out.push_str(&section.suffix);
    if out == "-" {
        out.clear();
    }
    out
}

fn format_fixed(value: f64, section: &NumberSection, locale: Locale) -> String {
    let text = format!("{:.*}", section.frac_placeholders, value);
    let (int_digits, frac_digits) = text.split_once('.').unwrap_or((&text, ""));

    let mut int_digits = int_digits.trim_start_matches('0').to_string();
    while int_digits.len() < section.int_zeros {
        int_digits.insert(0, '0');
    }

    let mut out = String::new();
    if section.grouping {
        let len = int_digits.len();
        for (i, c) in int_digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push(locale.grouping_separator());
            }
            out.push(c);
        }
    } else {
        out.push_str(&int_digits);
    }

    let mut frac = frac_digits.to_string();
    while frac.len() > section.frac_zeros && frac.ends_with('0') {
        frac.pop();
    }
    if section.has_decimal_point && !frac.is_empty() {
        out.push(locale.decimal_separator());
        out.push_str(&frac);
    }
    if out.is_empty() {
        // "#" with zero renders nothing in spreadsheets; keep a visible 0
        out.push('0');
    }
    out
}

fn format_scientific(value: f64, section: &NumberSection, plus: bool, exp_digits: usize, locale: Locale) -> String {
    let int_width = section.int_placeholders.max(1) as i32;
    let mut exponent = if value == 0.0 { 0 } else { value.log10().floor() as i32 };
    if section.int_zeros < section.int_placeholders && int_width > 1 {
        // engineering style "##0.0E+0": exponent is a multiple of the integer width
        exponent = exponent.div_euclid(int_width) * int_width;
    } else {
        exponent -= section.int_zeros.max(1) as i32 - 1;
    }
    let mut mantissa = value / 10f64.powi(exponent);

    // rounding may carry into a new digit, e.g. 9.99 -> 10.0
    let rounded: f64 = format!("{:.*}", section.frac_placeholders, mantissa)
        .parse()
        .unwrap_or(mantissa);
    if rounded >= 10f64.powi(int_width) && value != 0.0 {
        exponent += 1;
        mantissa = value / 10f64.powi(exponent);
    }

    let fixed = NumberSection {
        int_zeros: section.int_zeros.max(1),
        grouping: false,
        ..section.clone()
    };
    let mut out = format_fixed(mantissa, &fixed, locale);
    out.push('E');
    if exponent < 0 {
        out.push('-');
    } else if plus {
        out.push('+');
    }
    out.push_str(&format!("{:0width$}", exponent.abs(), width = exp_digits.max(1)));
    out
}

fn format_fraction(value: f64, section: &NumberSection, digits: usize) -> String {
    let whole = if section.int_placeholders > 0 { value.trunc() } else { 0.0 };
    let remainder = value - whole;
    let max_denominator = 10u64.pow(digits.min(MAX_DENOMINATOR_DIGITS) as u32) - 1;
    let (mut num, den) = best_fraction(remainder, max_denominator);

    let mut whole = whole as u64;
    if num == den && section.int_placeholders > 0 {
        whole += 1;
        num = 0;
    }
    match (whole, num) {
        (w, 0) if section.int_placeholders > 0 => w.to_string(),
        (0, n) => format!("{}/{}", n, den),
        (w, n) => format!("{} {}/{}", w, n, den),
    }
}

/// Closest fraction to a non-negative `x` with a denominator of at most `max_den`
///
/// Walks the continued fraction convergents of `x`; once the next convergent's
/// denominator is too large, the best semiconvergent below the bound competes
/// with the last convergent.
fn best_fraction(x: f64, max_den: u64) -> (u64, u64) {
    let (mut p0, mut q0, mut p1, mut q1) = (0u64, 1u64, 1u64, 0u64);
    let mut rest = x;
    loop {
        let a = rest.floor() as u64;
        let q2 = a.saturating_mul(q1).saturating_add(q0);
        if q2 > max_den {
            let k = (max_den - q0) / q1;
            let (ps, qs) = (k.saturating_mul(p1).saturating_add(p0), k * q1 + q0);
            let error = |p: u64, q: u64| (x - p as f64 / q as f64).abs();
            return if error(ps, qs) < error(p1, q1) { (ps, qs) } else { (p1, q1) };
        }
        let p2 = a.saturating_mul(p1).saturating_add(p0);
        (p0, q0, p1, q1) = (p1, q1, p2, q2);

        let frac = rest - rest.floor();
        if frac < 1e-9 || (x - p1 as f64 / q1 as f64).abs() < f64::EPSILON {
            return (p1, q1);
        }
        rest = 1.0 / frac;
    }
}

/// Parse a number written with the locale's separators
///
/// Accepts an optional sign, grouping separators in groups of three, one decimal
/// separator and an optional exponent. The whole text must be consumed.
///
/// ```
/// use tabula_core::format::{parse_number, Locale};
///
/// assert_eq!(parse_number("1,234.5", Locale::EN_US), Some(1234.5));
/// assert_eq!(parse_number("1.234,5", Locale::DE_DE), Some(1234.5));
/// assert_eq!(parse_number("01.02.23", Locale::DE_DE), None);
/// ```
pub fn parse_number(text: &str, locale: Locale) -> Option<f64> {
    let text = text.trim();
    let (negative, body) = match text.chars().next()? {
        '-' | '\u{2212}' => (true, &text[text.chars().next()?.len_utf8()..]),
        '+' => (false, &text[1..]),
        _ => (false, text),
    };

    let decimal = locale.decimal_separator();
    let grouping = locale.grouping_separators();

    let (mantissa, exponent) = match body.find(['E', 'e']) {
        Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
        None => (body, None),
    };
    let (int_part, frac_part) = match mantissa.split_once(decimal) {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };

    let mut digits = String::new();
    let groups: Vec<&str> = int_part.split(|c| grouping.contains(&c)).collect();
    if groups.len() > 1 {
        // first group 1-3 digits, the rest exactly three
        let first_ok = (1..=3).contains(&groups[0].len());
        if !first_ok || groups[1..].iter().any(|g| g.len() != 3) {
            return None;
        }
    }
    for group in &groups {
        if !group.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        digits.push_str(group);
    }

    let frac = frac_part.unwrap_or("");
    if !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    if digits.is_empty() && frac.is_empty() {
        return None;
    }

    let mut normalized = String::new();
    if negative {
        normalized.push('-');
    }
    normalized.push_str(if digits.is_empty() { "0" } else { &digits });
    if !frac.is_empty() {
        normalized.push('.');
        normalized.push_str(frac);
    }
    if let Some(exp) = exponent {
        let exp_digits = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        if exp_digits.is_empty() || !exp_digits.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        normalized.push('e');
        normalized.push_str(exp);
    }
    normalized.parse().ok()
}
