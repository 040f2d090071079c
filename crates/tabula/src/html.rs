//! HTML export
//!
//! Each sheet becomes a `<table>`. Registered styles turn into CSS classes,
//! merged regions into `colspan`/`rowspan` on their anchor, and hyperlinks
//! into `<a>` elements around the cell text.

use std::fmt::Write as _;
use std::io::Write;

use tabula_core::style::Underline;
use tabula_core::{
    BorderEdge, BorderLineStyle, Cell, Color, HorizontalAlignment, IoOptions, MergeState,
    Progress, Sheet, Style, StyleId, VerticalAlignment, Workbook,
};

use crate::error::Result;

const SHEET_CLASS: &str = "tabula-sheet";

const COMMON_CSS: &str = "    table.tabula-sheet { border-collapse: collapse; table-layout: fixed; }
    table.tabula-sheet td { border: 1px solid #d4d4d4; padding: 3px; white-space: pre; overflow: visible; }
    table.tabula-sheet td:empty::after { content: \"\\00a0\"; }
";

/// HTML document writer
pub struct HtmlWriter;

impl HtmlWriter {
    /// Write every sheet of `workbook` into one HTML document
    pub fn write<W: Write + ?Sized>(
        workbook: &Workbook,
        out: &mut W,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        workbook.ensure_open()?;
        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n");
        html.push_str("  <style>\n");
        html.push_str(COMMON_CSS);
        for (id, _, style) in workbook.styles().entries() {
            if id != StyleId::DEFAULT {
                let _ = writeln!(html, "    .{} {{ {}}}", class_name(id), style_css(&style));
            }
        }
        html.push_str("  </style>\n</head>\n<body>\n");

        let total: usize = workbook
            .sheets()
            .map(|s| (s.row_count() - s.first_row()) as usize)
            .sum();
        let mut done = 0;
        for (i, sheet) in workbook.sheets().enumerate() {
            write_sheet(&mut html, sheet, i, options, |n| {
                done += n;
                progress.update(done, total);
            });
        }
        html.push_str("</body>\n</html>\n");

        out.write_all(html.as_bytes())?;
        out.flush()?;
        progress.finish();
        log::debug!("wrote HTML for {} sheets", workbook.sheet_count());
        Ok(())
    }
}

fn class_name(id: StyleId) -> String {
    format!("tabula-s{}", id.0)
}

fn write_sheet(
    html: &mut String,
    sheet: &Sheet,
    index: usize,
    options: &IoOptions,
    mut on_rows: impl FnMut(usize),
) {
    let _ = writeln!(
        html,
        "<div id=\"sheet{}\" title=\"{}\">\n  <table class=\"{}\">",
        index + 1,
        escape_html(sheet.name()),
        SHEET_CLASS
    );

    let Some(last_col) = last_column(sheet) else {
        html.push_str("  </table>\n</div>\n");
        return;
    };

    html.push_str("    <colgroup>\n");
    for col in 0..=last_col {
        let _ = writeln!(html, "      <col style=\"width: {:.2}ch;\">", sheet.column_width(col));
    }
    html.push_str("    </colgroup>\n    <tbody>\n");

    for index in sheet.first_row()..sheet.row_count() {
        let _ = writeln!(html, "      <tr style=\"height: {:.2}pt;\">", sheet.row_height(index));
        let row = sheet.row(index);
        for col in 0..=last_col {
            match row.and_then(|row| row.cell(col)) {
                Some(cell) => write_cell(html, sheet, cell, options),
                None => html.push_str("        <td></td>\n"),
            }
        }
        html.push_str("      </tr>\n");
        on_rows(1);
    }
    html.push_str("    </tbody>\n  </table>\n</div>\n");
}

fn write_cell(html: &mut String, sheet: &Sheet, cell: &Cell, options: &IoOptions) {
    // covered by the anchor's span
    if let MergeState::Member { .. } = cell.merge_state() {
        return;
    }
    html.push_str("        <td");
    if cell.span_cols() > 1 {
        let _ = write!(html, " colspan=\"{}\"", cell.span_cols());
    }
    if cell.span_rows() > 1 {
        let _ = write!(html, " rowspan=\"{}\"", cell.span_rows());
    }
    if cell.style_id() != StyleId::DEFAULT {
        let _ = write!(html, " class=\"{}\"", class_name(cell.style_id()));
    }
    html.push('>');

    let text = escape_html(&cell.as_text(sheet.styles(), options.locale));
    match cell.hyperlink() {
        Some(target) => {
            let _ = write!(html, "<a href=\"{}\">{}</a>", escape_html(target), text);
        }
        None => html.push_str(&text),
    }
    html.push_str("</td>\n");
}

/// Last column holding a cell or covered by a merge
fn last_column(sheet: &Sheet) -> Option<u32> {
    let cells = sheet.rows().filter_map(|row| row.last_used_col());
    let merges = sheet.merged_regions().iter().map(|region| region.last_col);
    cells.chain(merges).max()
}

fn style_css(style: &Style) -> String {
    let mut css = String::new();
    let font = &style.font;
    if !font.name.is_empty() {
        let family: String = font
            .name
            .chars()
            .filter(|c| !matches!(c, '\'' | '"' | '<' | '>' | '\\' | ';'))
            .collect();
        let _ = write!(css, "font-family: '{}'; ", family);
    }
    if font.size > 0.0 {
        let _ = write!(css, "font-size: {}pt; ", font.size);
    }
    if font.bold {
        css.push_str("font-weight: bold; ");
    }
    if font.italic {
        css.push_str("font-style: italic; ");
    }
    match (font.underline != Underline::None, font.strikethrough) {
        (true, true) => css.push_str("text-decoration: underline line-through; "),
        (true, false) => css.push_str("text-decoration: underline; "),
        (false, true) => css.push_str("text-decoration: line-through; "),
        (false, false) => {}
    }
    if !font.color.is_auto() {
        let _ = write!(css, "color: {}; ", css_color(font.color));
    }

    let alignment = &style.alignment;
    let horizontal = match alignment.horizontal {
        HorizontalAlignment::Left => Some("left"),
        HorizontalAlignment::Center | HorizontalAlignment::CenterContinuous => Some("center"),
        HorizontalAlignment::Right => Some("right"),
        HorizontalAlignment::Justify | HorizontalAlignment::Distributed => Some("justify"),
        HorizontalAlignment::General | HorizontalAlignment::Fill => None,
    };
    if let Some(align) = horizontal {
        let _ = write!(css, "text-align: {}; ", align);
    }
    let vertical = match alignment.vertical {
        VerticalAlignment::Top => "top",
        VerticalAlignment::Center | VerticalAlignment::Justify | VerticalAlignment::Distributed => {
            "middle"
        }
        VerticalAlignment::Bottom => "bottom",
    };
    let _ = write!(css, "vertical-align: {}; ", vertical);
    if alignment.wrap_text {
        css.push_str("white-space: pre-wrap; ");
    }
    if alignment.indent > 0 {
        let _ = write!(css, "padding-left: {}ch; ", alignment.indent as u32 * 2);
    }
    // spreadsheet angles turn counterclockwise
    if alignment.rotation() != 0 {
        let _ = write!(css, "transform: rotate({}deg); ", -alignment.rotation());
    }

    let border = &style.border;
    for (side, edge) in [
        ("top", &border.top),
        ("right", &border.right),
        ("bottom", &border.bottom),
        ("left", &border.left),
    ] {
        if let Some(edge) = edge {
            if let Some(rule) = border_css(edge) {
                let _ = write!(css, "border-{}: {} !important; ", side, rule);
            }
        }
    }

    if let Some(color) = style.fill.background_color() {
        let _ = write!(css, "background-color: {}; ", css_color(color));
    }
    css
}

fn border_css(edge: &BorderEdge) -> Option<String> {
    let (width, line) = match edge.style {
        BorderLineStyle::None => return None,
        BorderLineStyle::Thin => ("1px", "solid"),
        BorderLineStyle::Hair | BorderLineStyle::Dotted => ("1px", "dotted"),
        BorderLineStyle::Dashed | BorderLineStyle::DashDot | BorderLineStyle::DashDotDot => {
            ("1px", "dashed")
        }
        BorderLineStyle::Medium => ("2px", "solid"),
        BorderLineStyle::MediumDashed
        | BorderLineStyle::MediumDashDot
        | BorderLineStyle::MediumDashDotDot
        | BorderLineStyle::SlantDashDot => ("2px", "dashed"),
        BorderLineStyle::Thick => ("3px", "solid"),
        BorderLineStyle::Double => ("3px", "double"),
    };
    Some(format!("{} {} {}", width, line, css_color(edge.color)))
}

fn css_color(color: Color) -> String {
    let (r, g, b) = color.to_rgb();
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
