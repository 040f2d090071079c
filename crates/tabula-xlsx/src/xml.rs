//! Small XML helpers shared by the reader and the writers

use std::borrow::Cow;
use std::str::FromStr;

use quick_xml::events::BytesStart;

use crate::error::Result;

/// Escape text for use in element content or attribute values
///
/// Control characters XML 1.0 cannot carry are written as Excel's `_xHHHH_` escapes.
pub(crate) fn escape_xml(s: &str) -> Cow<'_, str> {
    let needs_escape = s
        .chars()
        .any(|c| matches!(c, '&' | '<' | '>' | '"' | '\'') || is_forbidden_control(c));
    if !needs_escape {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len() + 16);
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_forbidden_control(c) => out.push_str(&format!("_x{:04X}_", c as u32)),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn is_forbidden_control(c: char) -> bool {
    c.is_control() && !matches!(c, '\t' | '\n' | '\r') && (c as u32) < 0x20
}

/// Decode Excel's `_xHHHH_` escape sequences in strings.
///
/// - `_x000d_` = CR (carriage return)
/// - `_x000a_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005f_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> Cow<'_, str> {
    if !s.contains("_x") {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find("_x") {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = candidate
            .get(2..6)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .filter(|_| candidate.as_bytes().get(6) == Some(&b'_'))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

/// Unescaped value of attribute `key`, if present
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Attribute `key` parsed as `T`; unparseable values count as absent
pub(crate) fn parse_attr<T: FromStr>(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<T>> {
    Ok(attr(e, key)?.and_then(|v| v.trim().parse().ok()))
}

/// Boolean attribute in either `1`/`0` or `true`/`false` form
pub(crate) fn bool_attr(e: &BytesStart<'_>, key: &[u8]) -> Result<Option<bool>> {
    Ok(attr(e, key)?.map(|v| v == "1" || v.eq_ignore_ascii_case("true")))
}

/// Format a number for a `<v>` element or numeric attribute
pub(crate) fn format_f64(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("plain"), "plain");
        assert_eq!(escape_xml("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
        assert_eq!(escape_xml("bell\u{7}"), "bell_x0007_");
        assert_eq!(escape_xml("line\nbreak"), "line\nbreak");
    }

    #[test]
    fn test_decode_excel_escapes() {
        assert_eq!(decode_excel_escapes("hello_x000d_world"), "hello\rworld");
        assert_eq!(decode_excel_escapes("col1_x0009_col2"), "col1\tcol2");
        assert_eq!(
            decode_excel_escapes("line1_x000d__x000a_line2"),
            "line1\r\nline2"
        );
        assert_eq!(decode_excel_escapes("under_x005f_score"), "under_score");
        assert_eq!(decode_excel_escapes("_x000D_"), "\r");
        assert_eq!(decode_excel_escapes("plain text"), "plain text");
    }

    #[test]
    fn test_decode_excel_escapes_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("_x000d"), "_x000d");
        assert_eq!(decode_excel_escapes("_xzzzz_"), "_xzzzz_");
    }

    #[test]
    fn test_escape_then_decode() {
        let text = "tab\there\u{1}";
        let escaped = escape_xml(text);
        assert_eq!(decode_excel_escapes(&escaped), text);
    }

    #[test]
    fn test_format_f64() {
        assert_eq!(format_f64(3.0), "3");
        assert_eq!(format_f64(-12.0), "-12");
        assert_eq!(format_f64(0.25), "0.25");
        assert_eq!(format_f64(44958.5), "44958.5");
    }

    #[test]
    fn test_attr_helpers() {
        let e = BytesStart::from_content(r#"row r="4" ht="21.5" customHeight="1" name="a&amp;b""#, 3);
        assert_eq!(parse_attr::<u32>(&e, b"r").unwrap(), Some(4));
        assert_eq!(parse_attr::<f64>(&e, b"ht").unwrap(), Some(21.5));
        assert_eq!(bool_attr(&e, b"customHeight").unwrap(), Some(true));
        assert_eq!(attr(&e, b"name").unwrap().as_deref(), Some("a&b"));
        assert_eq!(attr(&e, b"missing").unwrap(), None);
    }
}
