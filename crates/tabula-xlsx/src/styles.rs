//! XLSX styles (styles.xml) read/write helpers
//!
//! Every registry style becomes one `cellXfs` entry at the index of its [`StyleId`],
//! backed by a `cellStyleXfs` entry and a named `cellStyle`, so style names survive
//! a round-trip. The default style is written as the built-in "Normal" style.

use ahash::AHashMap;
use std::io::{BufReader, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{Result, XlsxError};
use crate::xml::{attr, bool_attr, escape_xml, parse_attr};
use tabula_core::style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, Edge, FillStyle, FontStyle,
    HorizontalAlignment, NumberFormat, PatternType, Style, StyleId, StyleRegistry, Underline,
    VerticalAlignment,
};

/// Name Excel gives the default cell style
const NORMAL_STYLE: &str = "Normal";

/// First id available for custom number formats
const FIRST_CUSTOM_NUMFMT: u32 = 164;

// === Writing ===

#[derive(Debug)]
pub(crate) struct XlsxStyleTable {
    /// `(name, style)` in registry order; index is the xf id
    entries: Vec<(String, Style)>,
}

#[derive(Debug, Clone, Copy)]
struct ResolvedXfIds {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    num_fmt_id: u32,
}

/// Deduplicating table of one styles.xml component
struct Interner<T> {
    items: Vec<T>,
    ids: AHashMap<T, u32>,
}

impl<T: Clone + Eq + std::hash::Hash> Interner<T> {
    fn new(initial: Vec<T>) -> Self {
        let ids = initial
            .iter()
            .enumerate()
            .map(|(i, item)| (item.clone(), i as u32))
            .collect();
        Self {
            items: initial,
            ids,
        }
    }

    fn intern(&mut self, item: &T) -> u32 {
        if let Some(&id) = self.ids.get(item) {
            return id;
        }
        let id = self.items.len() as u32;
        self.items.push(item.clone());
        self.ids.insert(item.clone(), id);
        id
    }
}

impl XlsxStyleTable {
    pub(crate) fn build(registry: &StyleRegistry) -> Self {
        let entries = registry
            .entries()
            .into_iter()
            .map(|(_, name, style)| (name, style))
            .collect();
        Self { entries }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// The cellXfs index for a style id; unknown ids fall back to the default style
    pub(crate) fn xf_id_for(&self, id: StyleId) -> u32 {
        if id.index() < self.entries.len() {
            id.0
        } else {
            log::warn!("style id {} not in the style table, using default", id.0);
            0
        }
    }

    pub(crate) fn to_styles_xml(&self) -> String {
        let mut fonts = Interner::new(vec![FontStyle::default()]);
        // Excel requires the first two fills to be none and gray125
        let mut fills = Interner::new(vec![
            FillStyle::None,
            FillStyle::pattern(PatternType::Gray125, Color::Auto, Color::Auto),
        ]);
        let mut borders = Interner::new(vec![BorderStyle::default()]);

        let mut numfmt_ids: AHashMap<&str, u32> = AHashMap::new();
        let mut numfmts: Vec<(u32, &str)> = Vec::new();

        let mut resolved: Vec<ResolvedXfIds> = Vec::with_capacity(self.entries.len());
        for (_, style) in &self.entries {
            let num_fmt_id = match &style.number_format {
                NumberFormat::General => 0,
                NumberFormat::BuiltIn(id) => *id,
                NumberFormat::Custom(code) => match numfmt_ids.get(code.as_str()) {
                    Some(&id) => id,
                    None => {
                        let id = FIRST_CUSTOM_NUMFMT + numfmts.len() as u32;
                        numfmt_ids.insert(code, id);
                        numfmts.push((id, code));
                        id
                    }
                },
            };
            resolved.push(ResolvedXfIds {
                font_id: fonts.intern(&style.font),
                fill_id: fills.intern(&style.fill),
                border_id: borders.intern(&style.border),
                num_fmt_id,
            });
        }

        let mut xml = String::new();
        xml.push_str(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        );

        if !numfmts.is_empty() {
            xml.push_str(&format!("\n  <numFmts count=\"{}\">", numfmts.len()));
            for (id, code) in &numfmts {
                xml.push_str(&format!(
                    "\n    <numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                    id,
                    escape_xml(code)
                ));
            }
            xml.push_str("\n  </numFmts>");
        }

        xml.push_str(&format!("\n  <fonts count=\"{}\">", fonts.items.len()));
        for font in &fonts.items {
            xml.push_str("\n    ");
            xml.push_str(&write_font(font));
        }
        xml.push_str("\n  </fonts>");

        xml.push_str(&format!("\n  <fills count=\"{}\">", fills.items.len()));
        for fill in &fills.items {
            xml.push_str("\n    ");
            xml.push_str(&write_fill(fill));
        }
        xml.push_str("\n  </fills>");

        xml.push_str(&format!("\n  <borders count=\"{}\">", borders.items.len()));
        for border in &borders.items {
            xml.push_str("\n    ");
            xml.push_str(&write_border(border));
        }
        xml.push_str("\n  </borders>");

        // one named master format per registry style
        xml.push_str(&format!("\n  <cellStyleXfs count=\"{}\">", resolved.len()));
        for ((_, style), ids) in self.entries.iter().zip(&resolved) {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids, None));
        }
        xml.push_str("\n  </cellStyleXfs>");

        xml.push_str(&format!("\n  <cellXfs count=\"{}\">", resolved.len()));
        for (i, ((_, style), ids)) in self.entries.iter().zip(&resolved).enumerate() {
            xml.push_str("\n    ");
            xml.push_str(&write_xf(style, *ids, Some(i as u32)));
        }
        xml.push_str("\n  </cellXfs>");

        xml.push_str(&format!("\n  <cellStyles count=\"{}\">", self.entries.len()));
        for (i, (name, _)) in self.entries.iter().enumerate() {
            if i == 0 {
                xml.push_str(&format!(
                    "\n    <cellStyle name=\"{}\" xfId=\"0\" builtinId=\"0\"/>",
                    NORMAL_STYLE
                ));
            } else {
                xml.push_str(&format!(
                    "\n    <cellStyle name=\"{}\" xfId=\"{}\"/>",
                    escape_xml(name),
                    i
                ));
            }
        }
        xml.push_str("\n  </cellStyles>");

        xml.push_str("\n  <dxfs count=\"0\"/>");
        xml.push_str(
            r#"
  <tableStyles count="0" defaultTableStyle="TableStyleMedium9" defaultPivotStyle="PivotStyleLight16"/>"#,
        );

        xml.push_str("\n</styleSheet>");
        xml
    }
}

fn color_attrs(color: &Color) -> String {
    match color {
        Color::Auto => " auto=\"1\"".to_string(),
        Color::Rgb { .. } | Color::Argb { .. } => format!(" rgb=\"{}\"", color.to_argb_hex()),
        Color::Indexed(i) => format!(" indexed=\"{}\"", i),
        Color::Theme { index, tint } => {
            if *tint == 0 {
                format!(" theme=\"{}\"", index)
            } else {
                format!(" theme=\"{}\" tint=\"{}\"", index, (*tint as f64) / 100.0)
            }
        }
    }
}

fn write_color(tag: &str, color: &Color) -> String {
    format!("<{}{}/>", tag, color_attrs(color))
}

fn write_font(font: &FontStyle) -> String {
    let mut s = String::from("<font>");
    if font.bold {
        s.push_str("<b/>");
    }
    if font.italic {
        s.push_str("<i/>");
    }
    if font.strikethrough {
        s.push_str("<strike/>");
    }
    match font.underline {
        Underline::None => {}
        Underline::Single => s.push_str("<u/>"),
        Underline::Double => s.push_str("<u val=\"double\"/>"),
    }
    s.push_str(&format!("<sz val=\"{}\"/>", font.size));
    if !font.color.is_auto() {
        s.push_str(&write_color("color", &font.color));
    }
    s.push_str(&format!("<name val=\"{}\"/>", escape_xml(&font.name)));
    s.push_str("</font>");
    s
}

fn pattern_type_to_str(p: PatternType) -> &'static str {
    match p {
        PatternType::None => "none",
        PatternType::Solid => "solid",
        PatternType::MediumGray => "mediumGray",
        PatternType::DarkGray => "darkGray",
        PatternType::LightGray => "lightGray",
        PatternType::DarkHorizontal => "darkHorizontal",
        PatternType::DarkVertical => "darkVertical",
        PatternType::DarkDown => "darkDown",
        PatternType::DarkUp => "darkUp",
        PatternType::DarkGrid => "darkGrid",
        PatternType::DarkTrellis => "darkTrellis",
        PatternType::LightHorizontal => "lightHorizontal",
        PatternType::LightVertical => "lightVertical",
        PatternType::LightDown => "lightDown",
        PatternType::LightUp => "lightUp",
        PatternType::LightGrid => "lightGrid",
        PatternType::LightTrellis => "lightTrellis",
        PatternType::Gray125 => "gray125",
        PatternType::Gray0625 => "gray0625",
    }
}

fn write_fill(fill: &FillStyle) -> String {
    match fill {
        FillStyle::None => "<fill><patternFill patternType=\"none\"/></fill>".to_string(),
        FillStyle::Solid { color } => format!(
            "<fill><patternFill patternType=\"solid\">{}<bgColor indexed=\"64\"/></patternFill></fill>",
            write_color("fgColor", color)
        ),
        FillStyle::Pattern {
            pattern: PatternType::Gray125,
            foreground: Color::Auto,
            background: Color::Auto,
        } => "<fill><patternFill patternType=\"gray125\"/></fill>".to_string(),
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => format!(
            "<fill><patternFill patternType=\"{}\">{}{}</patternFill></fill>",
            pattern_type_to_str(*pattern),
            write_color("fgColor", foreground),
            write_color("bgColor", background)
        ),
    }
}

fn border_style_to_str(s: BorderLineStyle) -> Option<&'static str> {
    match s {
        BorderLineStyle::None => None,
        BorderLineStyle::Thin => Some("thin"),
        BorderLineStyle::Medium => Some("medium"),
        BorderLineStyle::Thick => Some("thick"),
        BorderLineStyle::Dashed => Some("dashed"),
        BorderLineStyle::Dotted => Some("dotted"),
        BorderLineStyle::Double => Some("double"),
        BorderLineStyle::Hair => Some("hair"),
        BorderLineStyle::MediumDashed => Some("mediumDashed"),
        BorderLineStyle::DashDot => Some("dashDot"),
        BorderLineStyle::MediumDashDot => Some("mediumDashDot"),
        BorderLineStyle::DashDotDot => Some("dashDotDot"),
        BorderLineStyle::MediumDashDotDot => Some("mediumDashDotDot"),
        BorderLineStyle::SlantDashDot => Some("slantDashDot"),
    }
}

fn write_border_edge(tag: &str, edge: Option<&BorderEdge>) -> String {
    match edge.and_then(|e| border_style_to_str(e.style).map(|style| (style, e.color))) {
        None => format!("<{}/>", tag),
        Some((style, color)) => format!(
            "<{tag} style=\"{}\">{}</{tag}>",
            style,
            write_color("color", &color),
            tag = tag
        ),
    }
}

fn write_border(border: &BorderStyle) -> String {
    let mut s = String::from("<border>");
    s.push_str(&write_border_edge("left", border.edge(Edge::Left)));
    s.push_str(&write_border_edge("right", border.edge(Edge::Right)));
    s.push_str(&write_border_edge("top", border.edge(Edge::Top)));
    s.push_str(&write_border_edge("bottom", border.edge(Edge::Bottom)));
    s.push_str("<diagonal/></border>");
    s
}

fn horiz_to_str(h: HorizontalAlignment) -> &'static str {
    match h {
        HorizontalAlignment::General => "general",
        HorizontalAlignment::Left => "left",
        HorizontalAlignment::Center => "center",
        HorizontalAlignment::Right => "right",
        HorizontalAlignment::Fill => "fill",
        HorizontalAlignment::Justify => "justify",
        HorizontalAlignment::CenterContinuous => "centerContinuous",
        HorizontalAlignment::Distributed => "distributed",
    }
}

fn vert_to_str(v: VerticalAlignment) -> &'static str {
    match v {
        VerticalAlignment::Top => "top",
        VerticalAlignment::Center => "center",
        VerticalAlignment::Bottom => "bottom",
        VerticalAlignment::Justify => "justify",
        VerticalAlignment::Distributed => "distributed",
    }
}

/// Degrees in -90..=90 to the textRotation encoding (91-180 for downward text)
fn rotation_to_xlsx(degrees: i16) -> i16 {
    if degrees < 0 {
        90 - degrees
    } else {
        degrees
    }
}

fn rotation_from_xlsx(value: i16) -> Option<i16> {
    match value {
        0..=90 => Some(value),
        91..=180 => Some(90 - value),
        // 255 is vertical stacked text, which has no rotation equivalent
        _ => None,
    }
}

fn write_alignment(al: &Alignment) -> String {
    let default = Alignment::default();
    if al == &default {
        return String::new();
    }

    let mut s = String::from("<alignment");
    if al.horizontal != default.horizontal {
        s.push_str(&format!(" horizontal=\"{}\"", horiz_to_str(al.horizontal)));
    }
    if al.vertical != default.vertical {
        s.push_str(&format!(" vertical=\"{}\"", vert_to_str(al.vertical)));
    }
    if al.rotation() != 0 {
        s.push_str(&format!(
            " textRotation=\"{}\"",
            rotation_to_xlsx(al.rotation())
        ));
    }
    if al.wrap_text {
        s.push_str(" wrapText=\"1\"");
    }
    if al.indent != 0 {
        s.push_str(&format!(" indent=\"{}\"", al.indent));
    }
    s.push_str("/>");
    s
}

/// One `<xf>`; `xf_id` links a cellXfs entry to its cellStyleXfs master
fn write_xf(style: &Style, ids: ResolvedXfIds, xf_id: Option<u32>) -> String {
    let mut attrs = String::new();
    if let Some(xf_id) = xf_id {
        attrs.push_str(&format!(" xfId=\"{}\"", xf_id));
    }
    if ids.num_fmt_id != 0 {
        attrs.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font != FontStyle::default() {
        attrs.push_str(" applyFont=\"1\"");
    }
    if !style.fill.is_none() {
        attrs.push_str(" applyFill=\"1\"");
    }
    if !style.border.is_empty() {
        attrs.push_str(" applyBorder=\"1\"");
    }
    if style.alignment != Alignment::default() {
        attrs.push_str(" applyAlignment=\"1\"");
    }

    let mut s = format!(
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\"{}",
        ids.num_fmt_id, ids.font_id, ids.fill_id, ids.border_id, attrs
    );

    let alignment_xml = write_alignment(&style.alignment);
    if alignment_xml.is_empty() {
        s.push_str("/>");
    } else {
        s.push('>');
        s.push_str(&alignment_xml);
        s.push_str("</xf>");
    }
    s
}

// === Reading ===

/// A cellXfs entry with the name of the cell style it derives from
#[derive(Debug, Clone)]
pub(crate) struct ParsedXf {
    pub name: Option<String>,
    pub style: Style,
}

/// Result of reading styles.xml
#[derive(Debug, Default)]
pub(crate) struct ParsedStyles {
    pub cell_xfs: Vec<ParsedXf>,
}

impl ParsedStyles {
    /// Publish the parsed styles in `registry`; the result maps cellXfs index to style id
    ///
    /// The first xf becomes the default style. Others take their cell style's name;
    /// an xf whose name is taken by a different style is registered as `xf<index>`.
    pub(crate) fn register(&self, registry: &StyleRegistry) -> Vec<StyleId> {
        let mut ids = Vec::with_capacity(self.cell_xfs.len());
        for (index, xf) in self.cell_xfs.iter().enumerate() {
            if index == 0 {
                registry.update(StyleId::DEFAULT, |style| *style = xf.style.clone());
                ids.push(StyleId::DEFAULT);
                continue;
            }

            let name = xf.name.as_deref().unwrap_or("");
            let id = match registry.id(name) {
                Some(id) if registry.with_style(id, |style| *style == xf.style) => id,
                Some(_) => {
                    let fallback = format!("xf{}", index);
                    log::debug!("style name '{}' already taken, registering '{}'", name, fallback);
                    registry.copy_style(&fallback, &xf.style)
                }
                None => registry.copy_style(name, &xf.style),
            };
            ids.push(id);
        }
        if ids.is_empty() {
            ids.push(StyleId::DEFAULT);
        }
        ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Other,
    Fonts,
    Fills,
    Borders,
    CellXfs,
    CellStyles,
    /// Differential formats and color tables, which carry look-alike elements
    Ignored,
}

#[derive(Debug, Default)]
struct RawXf {
    num_fmt_id: u32,
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    xf_id: Option<u32>,
    alignment: Alignment,
}

/// Accumulated state while walking styles.xml
struct StylesParser {
    section: Section,
    numfmts: AHashMap<u32, String>,
    fonts: Vec<FontStyle>,
    fills: Vec<FillStyle>,
    borders: Vec<BorderStyle>,
    raw_xfs: Vec<RawXf>,
    /// cellStyleXfs index -> cell style name
    style_names: AHashMap<u32, String>,
    current_font: Option<FontStyle>,
    current_fill: Option<(Option<PatternType>, Color, Color)>,
    current_border: Option<BorderStyle>,
    current_edge: Option<Edge>,
    current_xf: Option<RawXf>,
}

impl StylesParser {
    fn new() -> Self {
        Self {
            section: Section::Other,
            numfmts: AHashMap::new(),
            fonts: Vec::new(),
            fills: Vec::new(),
            borders: Vec::new(),
            raw_xfs: Vec::new(),
            style_names: AHashMap::new(),
            current_font: None,
            current_fill: None,
            current_border: None,
            current_edge: None,
            current_xf: None,
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, is_empty: bool) -> Result<()> {
        let name = e.name();
        let tag = name.as_ref();

        if !is_empty {
            let entered = match tag {
                b"fonts" => Some(Section::Fonts),
                b"fills" => Some(Section::Fills),
                b"borders" => Some(Section::Borders),
                b"cellXfs" => Some(Section::CellXfs),
                b"cellStyles" => Some(Section::CellStyles),
                b"cellStyleXfs" | b"dxfs" | b"colors" | b"extLst" => Some(Section::Ignored),
                _ => None,
            };
            if let Some(section) = entered {
                self.section = section;
                return Ok(());
            }
        }

        match (self.section, tag) {
            (Section::Ignored, _) => {}

            (_, b"numFmt") => {
                if let (Some(id), Some(code)) =
                    (parse_attr::<u32>(e, b"numFmtId")?, attr(e, b"formatCode")?)
                {
                    self.numfmts.insert(id, code);
                }
            }

            (Section::Fonts, b"font") => {
                if is_empty {
                    self.fonts.push(FontStyle::default());
                } else {
                    self.current_font = Some(FontStyle::default());
                }
            }
            (Section::Fonts, tag) => {
                if let Some(font) = self.current_font.as_mut() {
                    apply_font_property(font, tag, e)?;
                }
            }

            (Section::Fills, b"fill") => {
                if is_empty {
                    self.fills.push(FillStyle::None);
                } else {
                    self.current_fill = Some((None, Color::Auto, Color::Auto));
                }
            }
            (Section::Fills, b"patternFill") => {
                if let Some(fill) = self.current_fill.as_mut() {
                    fill.0 = attr(e, b"patternType")?.and_then(|p| str_to_pattern_type(&p));
                }
            }
            (Section::Fills, b"fgColor") => {
                if let Some(fill) = self.current_fill.as_mut() {
                    fill.1 = parse_color_attrs(e)?;
                }
            }
            (Section::Fills, b"bgColor") => {
                if let Some(fill) = self.current_fill.as_mut() {
                    fill.2 = parse_color_attrs(e)?;
                }
            }

            (Section::Borders, b"border") => {
                if is_empty {
                    self.borders.push(BorderStyle::default());
                } else {
                    self.current_border = Some(BorderStyle::default());
                }
            }
            (Section::Borders, b"left" | b"right" | b"top" | b"bottom") => {
                let edge = match tag {
                    b"left" => Edge::Left,
                    b"right" => Edge::Right,
                    b"top" => Edge::Top,
                    _ => Edge::Bottom,
                };
                let style = attr(e, b"style")?.and_then(|s| str_to_border_style(&s));
                if let (Some(border), Some(style)) = (self.current_border.as_mut(), style) {
                    if style != BorderLineStyle::None {
                        *border.edge_mut(edge) = Some(BorderEdge::new(style, Color::Auto));
                        if !is_empty {
                            self.current_edge = Some(edge);
                        }
                    }
                }
            }
            (Section::Borders, b"color") => {
                if let (Some(border), Some(edge)) = (self.current_border.as_mut(), self.current_edge)
                {
                    if let Some(edge) = border.edge_mut(edge).as_mut() {
                        edge.color = parse_color_attrs(e)?;
                    }
                }
            }

            (Section::CellXfs, b"xf") => {
                let xf = RawXf {
                    num_fmt_id: parse_attr(e, b"numFmtId")?.unwrap_or(0),
                    font_id: parse_attr(e, b"fontId")?.unwrap_or(0),
                    fill_id: parse_attr(e, b"fillId")?.unwrap_or(0),
                    border_id: parse_attr(e, b"borderId")?.unwrap_or(0),
                    xf_id: parse_attr(e, b"xfId")?,
                    alignment: Alignment::default(),
                };
                if is_empty {
                    self.raw_xfs.push(xf);
                } else {
                    self.current_xf = Some(xf);
                }
            }
            (Section::CellXfs, b"alignment") => {
                if let Some(xf) = self.current_xf.as_mut() {
                    read_alignment(&mut xf.alignment, e)?;
                }
            }

            (Section::CellStyles, b"cellStyle") => {
                let xf_id = parse_attr::<u32>(e, b"xfId")?.unwrap_or(0);
                let name = if parse_attr::<u32>(e, b"builtinId")? == Some(0) {
                    String::new()
                } else {
                    attr(e, b"name")?.unwrap_or_default()
                };
                self.style_names.entry(xf_id).or_insert(name);
            }

            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, tag: &[u8]) {
        match tag {
            b"font" => {
                if let Some(font) = self.current_font.take() {
                    self.fonts.push(font);
                }
            }
            b"fill" => {
                if let Some((pattern, fg, bg)) = self.current_fill.take() {
                    self.fills.push(finalize_fill(pattern, fg, bg));
                }
            }
            b"border" => {
                if let Some(border) = self.current_border.take() {
                    self.borders.push(border);
                }
            }
            b"left" | b"right" | b"top" | b"bottom" => self.current_edge = None,
            b"xf" => {
                if let Some(xf) = self.current_xf.take() {
                    self.raw_xfs.push(xf);
                }
            }
            b"fonts" | b"fills" | b"borders" | b"cellStyleXfs" | b"cellXfs" | b"cellStyles"
            | b"dxfs" | b"colors" | b"extLst" => self.section = Section::Other,
            _ => {}
        }
    }

    fn finish(self) -> ParsedStyles {
        let cell_xfs = self
            .raw_xfs
            .iter()
            .map(|xf| ParsedXf {
                name: xf.xf_id.and_then(|id| self.style_names.get(&id).cloned()),
                style: resolve_style(xf, &self.numfmts, &self.fonts, &self.fills, &self.borders),
            })
            .collect();
        ParsedStyles { cell_xfs }
    }
}

pub(crate) fn read_styles_xml<R: Read>(reader: R) -> Result<ParsedStyles> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut parser = StylesParser::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => parser.start(&e, false)?,
            Ok(Event::Empty(e)) => parser.start(&e, true)?,
            Ok(Event::End(e)) => parser.end(e.name().as_ref()),
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(parser.finish())
}

fn apply_font_property(font: &mut FontStyle, tag: &[u8], e: &BytesStart<'_>) -> Result<()> {
    // `<b/>` means on; `<b val="0"/>` means off
    let flag = || -> Result<bool> { Ok(bool_attr(e, b"val")?.unwrap_or(true)) };
    match tag {
        b"b" => font.bold = flag()?,
        b"i" => font.italic = flag()?,
        b"strike" => font.strikethrough = flag()?,
        b"u" => {
            font.underline = match attr(e, b"val")?.as_deref() {
                Some("none") => Underline::None,
                Some("double") | Some("doubleAccounting") => Underline::Double,
                _ => Underline::Single,
            }
        }
        b"sz" => {
            if let Some(size) = parse_attr::<f64>(e, b"val")? {
                font.size = size;
            }
        }
        b"name" => {
            if let Some(name) = attr(e, b"val")? {
                font.name = name;
            }
        }
        b"color" => font.color = parse_color_attrs(e)?,
        _ => {}
    }
    Ok(())
}

fn read_alignment(align: &mut Alignment, e: &BytesStart<'_>) -> Result<()> {
    if let Some(h) = attr(e, b"horizontal")?.and_then(|v| str_to_horizontal(&v)) {
        align.horizontal = h;
    }
    if let Some(v) = attr(e, b"vertical")?.and_then(|v| str_to_vertical(&v)) {
        align.vertical = v;
    }
    align.wrap_text = bool_attr(e, b"wrapText")?.unwrap_or(false);
    align.indent = parse_attr(e, b"indent")?.unwrap_or(0);
    if let Some(raw) = parse_attr::<i16>(e, b"textRotation")? {
        match rotation_from_xlsx(raw).map(|deg| align.set_rotation(deg)) {
            Some(Ok(())) => {}
            _ => log::warn!("ignoring unsupported text rotation {}", raw),
        }
    }
    Ok(())
}

fn resolve_style(
    xf: &RawXf,
    numfmts: &AHashMap<u32, String>,
    fonts: &[FontStyle],
    fills: &[FillStyle],
    borders: &[BorderStyle],
) -> Style {
    let number_format = match numfmts.get(&xf.num_fmt_id) {
        Some(code) => NumberFormat::from_code(code),
        None => NumberFormat::from_id(xf.num_fmt_id),
    };
    Style {
        font: fonts.get(xf.font_id as usize).cloned().unwrap_or_default(),
        fill: fills.get(xf.fill_id as usize).copied().unwrap_or_default(),
        border: borders.get(xf.border_id as usize).copied().unwrap_or_default(),
        alignment: xf.alignment,
        number_format,
    }
}

fn finalize_fill(pattern: Option<PatternType>, fg: Color, bg: Color) -> FillStyle {
    match pattern.unwrap_or(PatternType::None) {
        PatternType::None => FillStyle::None,
        PatternType::Solid => FillStyle::Solid { color: fg },
        p => FillStyle::Pattern {
            pattern: p,
            foreground: fg,
            background: bg,
        },
    }
}

/// Parse a color element; indexed colors resolve to the default palette
fn parse_color_attrs(e: &BytesStart<'_>) -> Result<Color> {
    if let Some(color) = attr(e, b"rgb")?.and_then(|rgb| Color::from_hex(&rgb)) {
        return Ok(color);
    }
    if let Some(index) = parse_attr::<u8>(e, b"theme")? {
        let tint = parse_attr::<f64>(e, b"tint")?
            .map(|t| (t * 100.0).round().clamp(-100.0, 100.0) as i8)
            .unwrap_or(0);
        return Ok(Color::Theme { index, tint });
    }
    if let Some(index) = parse_attr::<u8>(e, b"indexed")? {
        // 64 and up are the system foreground/background entries
        if index < 64 {
            let (r, g, b) = Color::Indexed(index).to_rgb();
            return Ok(Color::rgb(r, g, b));
        }
    }
    Ok(Color::Auto)
}

fn str_to_pattern_type(s: &str) -> Option<PatternType> {
    Some(match s {
        "none" => PatternType::None,
        "solid" => PatternType::Solid,
        "mediumGray" => PatternType::MediumGray,
        "darkGray" => PatternType::DarkGray,
        "lightGray" => PatternType::LightGray,
        "darkHorizontal" => PatternType::DarkHorizontal,
        "darkVertical" => PatternType::DarkVertical,
        "darkDown" => PatternType::DarkDown,
        "darkUp" => PatternType::DarkUp,
        "darkGrid" => PatternType::DarkGrid,
        "darkTrellis" => PatternType::DarkTrellis,
        "lightHorizontal" => PatternType::LightHorizontal,
        "lightVertical" => PatternType::LightVertical,
        "lightDown" => PatternType::LightDown,
        "lightUp" => PatternType::LightUp,
        "lightGrid" => PatternType::LightGrid,
        "lightTrellis" => PatternType::LightTrellis,
        "gray125" => PatternType::Gray125,
        "gray0625" => PatternType::Gray0625,
        _ => return None,
    })
}

fn str_to_border_style(s: &str) -> Option<BorderLineStyle> {
    Some(match s {
        "none" => BorderLineStyle::None,
        "thin" => BorderLineStyle::Thin,
        "medium" => BorderLineStyle::Medium,
        "thick" => BorderLineStyle::Thick,
        "dashed" => BorderLineStyle::Dashed,
        "dotted" => BorderLineStyle::Dotted,
        "double" => BorderLineStyle::Double,
        "hair" => BorderLineStyle::Hair,
        "mediumDashed" => BorderLineStyle::MediumDashed,
        "dashDot" => BorderLineStyle::DashDot,
        "mediumDashDot" => BorderLineStyle::MediumDashDot,
        "dashDotDot" => BorderLineStyle::DashDotDot,
        "mediumDashDotDot" => BorderLineStyle::MediumDashDotDot,
        "slantDashDot" => BorderLineStyle::SlantDashDot,
        _ => return None,
    })
}

fn str_to_horizontal(s: &str) -> Option<HorizontalAlignment> {
    Some(match s {
        "general" => HorizontalAlignment::General,
        "left" => HorizontalAlignment::Left,
        "center" => HorizontalAlignment::Center,
        "right" => HorizontalAlignment::Right,
        "fill" => HorizontalAlignment::Fill,
        "justify" => HorizontalAlignment::Justify,
        "centerContinuous" => HorizontalAlignment::CenterContinuous,
        "distributed" => HorizontalAlignment::Distributed,
        _ => return None,
    })
}

fn str_to_vertical(s: &str) -> Option<VerticalAlignment> {
    Some(match s {
        "top" => VerticalAlignment::Top,
        "center" => VerticalAlignment::Center,
        "bottom" => VerticalAlignment::Bottom,
        "justify" => VerticalAlignment::Justify,
        "distributed" => VerticalAlignment::Distributed,
        _ => return None,
    })
}
