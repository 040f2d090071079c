//! Worksheet part parsing

use ahash::AHashMap;
use std::io::{BufReader, Read};

use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use tabula_core::format::serial_to_datetime;
use tabula_core::{CellAddress, CellError, CellValue, Region, Sheet, StyleId, MAX_COLS};

use crate::error::{Result, XlsxError};
use crate::xml::{attr, bool_attr, decode_excel_escapes, parse_attr};

/// Where character data currently goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Value,
    Formula,
    InlineText,
}

/// A `<c>` element being read
#[derive(Debug, Default)]
struct PendingCell {
    address: Option<CellAddress>,
    cell_type: Option<String>,
    style: Option<usize>,
    value: String,
    formula: String,
    inline_text: String,
    has_value: bool,
}

/// Accumulated state while walking one worksheet part
pub(super) struct WorksheetParser<'a> {
    sheet: &'a mut Sheet,
    shared_strings: &'a [String],
    style_ids: &'a [StyleId],
    cell: Option<PendingCell>,
    target: TextTarget,
    /// Row of the last `<row>` or cell seen
    current_row: Option<u32>,
    next_col: u32,
    active_cell: Option<CellAddress>,
    /// External hyperlink targets by relationship id
    link_targets: AHashMap<String, String>,
}

impl<'a> WorksheetParser<'a> {
    pub(super) fn new(
        sheet: &'a mut Sheet,
        shared_strings: &'a [String],
        style_ids: &'a [StyleId],
    ) -> Self {
        Self {
            sheet,
            shared_strings,
            style_ids,
            cell: None,
            target: TextTarget::None,
            current_row: None,
            next_col: 0,
            active_cell: None,
            link_targets: AHashMap::new(),
        }
    }

    pub(super) fn link_targets(mut self, targets: AHashMap<String, String>) -> Self {
        self.link_targets = targets;
        self
    }

    pub(super) fn parse<R: Read>(mut self, reader: R) -> Result<()> {
        let mut xml_reader = Reader::from_reader(BufReader::new(reader));
        // whitespace inside <t> is content
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => self.start(&e, false)?,
                Ok(Event::Empty(e)) => self.start(&e, true)?,
                Ok(Event::End(e)) => self.end(e.name().as_ref())?,
                Ok(Event::Text(e)) => {
                    if self.target != TextTarget::None {
                        let text = e.unescape()?;
                        self.push_text(&text);
                    }
                }
                Ok(Event::CData(e)) => {
                    if self.target != TextTarget::None {
                        let text = String::from_utf8_lossy(&e);
                        self.push_text(&text);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        // the cursor is applied last so it lands on the logical cell of a merge
        if let Some(active) = self.active_cell {
            self.sheet.set_current_cell(active.row, active.col)?;
        }
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        let Some(cell) = self.cell.as_mut() else {
            return;
        };
        match self.target {
            TextTarget::Value => {
                cell.value.push_str(text);
                cell.has_value = true;
            }
            TextTarget::Formula => cell.formula.push_str(text),
            TextTarget::InlineText => {
                cell.inline_text.push_str(text);
                cell.has_value = true;
            }
            TextTarget::None => {}
        }
    }

    fn start(&mut self, e: &BytesStart<'_>, is_empty: bool) -> Result<()> {
        match e.name().as_ref() {
            b"sheetView" => {
                if let Some(scale) = parse_attr::<f64>(e, b"zoomScale")? {
                    if scale > 0.0 {
                        self.sheet.set_zoom(scale / 100.0)?;
                    }
                }
            }
            b"pane" => self.read_pane(e)?,
            b"selection" => {
                if let Some(active) = attr(e, b"activeCell")? {
                    match CellAddress::parse(&active) {
                        Ok(address) => self.active_cell = Some(address),
                        Err(_) => log::warn!("ignoring unparseable active cell '{}'", active),
                    }
                }
            }
            b"col" => self.read_col(e)?,
            b"row" => self.read_row(e)?,
            b"c" => {
                let address = match attr(e, b"r")? {
                    Some(r) => Some(CellAddress::parse(&r).map_err(|err| {
                        XlsxError::Parse(format!("invalid cell reference '{}': {}", r, err))
                    })?),
                    None => None,
                };
                let cell = PendingCell {
                    address,
                    cell_type: attr(e, b"t")?,
                    style: parse_attr(e, b"s")?,
                    ..PendingCell::default()
                };
                if is_empty {
                    self.finish_cell(cell)?;
                } else {
                    self.cell = Some(cell);
                }
            }
            b"v" if !is_empty && self.cell.is_some() => self.target = TextTarget::Value,
            b"f" if !is_empty && self.cell.is_some() => self.target = TextTarget::Formula,
            b"t" if !is_empty && self.cell.is_some() => self.target = TextTarget::InlineText,
            b"mergeCell" => {
                if let Some(reference) = attr(e, b"ref")? {
                    let region = Region::parse(&reference)?;
                    self.sheet.merge_cell(
                        region.first_row,
                        region.first_col,
                        region.span_cols(),
                        region.span_rows(),
                    )?;
                }
            }
            b"hyperlink" => self.read_hyperlink(e)?,
            b"autoFilter" => {
                if let Some(reference) = attr(e, b"ref")? {
                    let region = Region::parse(&reference)?;
                    self.sheet.set_auto_filter_row(Some(region.first_row));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, tag: &[u8]) -> Result<()> {
        match tag {
            b"v" | b"f" | b"t" => self.target = TextTarget::None,
            b"c" => {
                self.target = TextTarget::None;
                if let Some(cell) = self.cell.take() {
                    self.finish_cell(cell)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Attach a `<hyperlink>` to the first cell of its range
    fn read_hyperlink(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let Some(reference) = attr(e, b"ref")? else {
            return Ok(());
        };
        let location = attr(e, b"location")?;
        let external = attr(e, b"r:id")?.and_then(|id| {
            let target = self.link_targets.get(&id).cloned();
            if target.is_none() {
                log::warn!("hyperlink at {} has unknown relationship '{}'", reference, id);
            }
            target
        });
        let target = match (external, location) {
            (Some(target), Some(location)) => format!("{}#{}", target, location),
            (Some(target), None) => target,
            (None, Some(location)) => format!("#{}", location),
            (None, None) => return Ok(()),
        };

        let first = reference.split(':').next().unwrap_or_default();
        let address = CellAddress::parse(first).map_err(|err| {
            XlsxError::Parse(format!("invalid hyperlink reference '{}': {}", reference, err))
        })?;
        let address = self
            .sheet
            .logical_cell(address.row, address.col)
            .map_or(address, |cell| cell.address());
        self.sheet
            .get_cell(address.row, address.col)?
            .set_hyperlink(target);
        Ok(())
    }

    fn read_pane(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let state = attr(e, b"state")?.unwrap_or_default();
        if state != "frozen" && state != "frozenSplit" {
            log::debug!("ignoring non-frozen pane split in sheet '{}'", self.sheet.name());
            return Ok(());
        }
        let col = parse_attr::<f64>(e, b"xSplit")?.unwrap_or(0.0);
        let row = parse_attr::<f64>(e, b"ySplit")?.unwrap_or(0.0);
        self.sheet.split_at(row.max(0.0) as u32, col.max(0.0) as u32)?;
        Ok(())
    }

    fn read_col(&mut self, e: &BytesStart<'_>) -> Result<()> {
        if bool_attr(e, b"customWidth")? != Some(true) {
            return Ok(());
        }
        let (Some(min), Some(max), Some(width)) = (
            parse_attr::<u32>(e, b"min")?,
            parse_attr::<u32>(e, b"max")?,
            parse_attr::<f64>(e, b"width")?,
        ) else {
            return Ok(());
        };
        for col in min.max(1)..=max.min(MAX_COLS) {
            self.sheet.set_column_width(col - 1, width)?;
        }
        Ok(())
    }

    fn read_row(&mut self, e: &BytesStart<'_>) -> Result<()> {
        let row = match parse_attr::<u32>(e, b"r")? {
            Some(r) => r.saturating_sub(1),
            None => self.current_row.map_or(0, |r| r + 1),
        };
        self.current_row = Some(row);
        self.next_col = 0;
        if bool_attr(e, b"customHeight")? == Some(true) {
            if let Some(height) = parse_attr::<f64>(e, b"ht")? {
                self.sheet.set_row_height(row, height)?;
            }
        }
        Ok(())
    }

    fn finish_cell(&mut self, cell: PendingCell) -> Result<()> {
        let address = cell
            .address
            .unwrap_or_else(|| CellAddress::new(self.current_row.unwrap_or(0), self.next_col));
        self.current_row = Some(address.row);
        self.next_col = address.col + 1;

        let style = match cell.style {
            Some(index) => self.style_ids.get(index).copied().unwrap_or_else(|| {
                log::warn!("cell {} refers to unknown style {}", address, index);
                StyleId::DEFAULT
            }),
            None => StyleId::DEFAULT,
        };
        let value = self.cell_value(&cell, style, address)?;

        if value.is_blank() && style == StyleId::DEFAULT {
            return Ok(());
        }
        let mut target = self.sheet.get_cell(address.row, address.col)?;
        target.set_style_id(style);
        match value {
            CellValue::Formula(formula) => target.set_formula(formula),
            value => target.set(value),
        };
        Ok(())
    }

    fn cell_value(
        &self,
        cell: &PendingCell,
        style: StyleId,
        address: CellAddress,
    ) -> Result<CellValue> {
        if !cell.formula.is_empty() {
            return Ok(CellValue::formula(&cell.formula));
        }
        if !cell.has_value {
            return Ok(CellValue::Blank);
        }

        let raw = cell.value.as_str();
        let value = match cell.cell_type.as_deref() {
            Some("s") => {
                let index: usize = raw.trim().parse().map_err(|_| {
                    XlsxError::Parse(format!("invalid shared string index '{}'", raw))
                })?;
                let text = self.shared_strings.get(index).ok_or_else(|| {
                    XlsxError::Parse(format!("shared string index {} out of bounds", index))
                })?;
                CellValue::text(text)
            }
            Some("inlineStr") => CellValue::text(decode_excel_escapes(&cell.inline_text)),
            Some("str") => CellValue::text(decode_excel_escapes(raw)),
            Some("b") => CellValue::Boolean(raw.trim() == "1" || raw.trim().eq_ignore_ascii_case("true")),
            Some("e") => match CellError::parse(raw.trim()) {
                Some(error) => CellValue::Error(error),
                None => {
                    log::warn!("unknown error value '{}' in cell {}", raw, address);
                    CellValue::text(raw)
                }
            },
            Some("d") => parse_iso_temporal(raw.trim()).unwrap_or_else(|| {
                log::warn!("unparseable date '{}' in cell {}", raw, address);
                CellValue::text(raw)
            }),
            None | Some("n") => match raw.trim().parse::<f64>() {
                Ok(number) => self.numeric_value(number, style),
                Err(_) => {
                    log::warn!("unparseable number '{}' in cell {}", raw, address);
                    CellValue::text(raw)
                }
            },
            Some(other) => {
                log::warn!("unknown cell type '{}' in cell {}, reading as text", other, address);
                CellValue::text(raw)
            }
        };
        Ok(value)
    }

    /// Numbers under a date format become dates
    fn numeric_value(&self, number: f64, style: StyleId) -> CellValue {
        let (is_date, has_time) = self.sheet.styles().with_style(style, |s| {
            (
                s.number_format.is_date_format(),
                s.number_format.has_time_component(),
            )
        });
        if !is_date {
            return CellValue::Numeric(number);
        }
        match serial_to_datetime(number) {
            Some(dt) if has_time => CellValue::DateTime(dt),
            Some(dt) => CellValue::Date(dt.date()),
            None => CellValue::Numeric(number),
        }
    }
}

fn parse_iso_temporal(s: &str) -> Option<CellValue> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(CellValue::DateTime(dt));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(CellValue::Date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tabula_core::{CellType, Style, StyleRegistry};

    fn parse(xml: &str, registry: Arc<StyleRegistry>, style_ids: &[StyleId]) -> Sheet {
        let mut sheet = Sheet::new("Test", registry);
        let strings = vec!["shared".to_string(), "second".to_string()];
        WorksheetParser::new(&mut sheet, &strings, style_ids)
            .parse(xml.as_bytes())
            .unwrap();
        sheet
    }

    #[test]
    fn test_cell_types() {
        let xml = r#"<worksheet><sheetData>
            <row r="1">
                <c r="A1" t="s"><v>1</v></c>
                <c r="B1"><v>2.5</v></c>
                <c r="C1" t="b"><v>1</v></c>
                <c r="D1" t="e"><v>#N/A</v></c>
                <c r="E1"><f>SUM(B1:B3)</f><v>7</v></c>
                <c r="F1" t="inlineStr"><is><t xml:space="preserve"> padded </t></is></c>
                <c r="G1" t="str"><v>line_x000a_break</v></c>
                <c r="H1" t="d"><v>2023-02-01</v></c>
                <c r="I1" t="x"><v>odd</v></c>
            </row>
        </sheetData></worksheet>"#;
        let sheet = parse(xml, Arc::new(StyleRegistry::new()), &[StyleId::DEFAULT]);
        let row = sheet.row(0).unwrap();
        let values: Vec<CellValue> = row.cells().map(|c| c.value().clone()).collect();
        assert_eq!(
            values,
            vec![
                CellValue::text("second"),
                CellValue::Numeric(2.5),
                CellValue::Boolean(true),
                CellValue::Error(CellError::Na),
                CellValue::formula("SUM(B1:B3)"),
                CellValue::text(" padded "),
                CellValue::text("line\nbreak"),
                CellValue::Date(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()),
                CellValue::text("odd"),
            ]
        );
    }

    #[test]
    fn test_date_styles_produce_dates() {
        let registry = Arc::new(StyleRegistry::new());
        let date = registry.copy_style("date", &Style::default().number_format("yyyy-mm-dd"));
        let stamp = registry.copy_style("stamp", &Style::default().number_format("yyyy-mm-dd hh:mm"));
        let xml = r#"<worksheet><sheetData><row r="2">
            <c r="A2" s="1"><v>44958</v></c>
            <c r="B2" s="2"><v>44958.5</v></c>
        </row></sheetData></worksheet>"#;
        let sheet = parse(xml, registry, &[StyleId::DEFAULT, date, stamp]);

        let a2 = sheet.cell(1, 0).unwrap();
        assert_eq!(a2.cell_type(), CellType::Date);
        assert_eq!(a2.get_date().unwrap(), NaiveDate::from_ymd_opt(2023, 2, 1).unwrap());
        assert_eq!(a2.style_id(), date);

        let b2 = sheet.cell(1, 1).unwrap();
        assert_eq!(b2.cell_type(), CellType::DateTime);
        assert_eq!(
            b2.get_date_time().unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_layout_elements() {
        let xml = r#"<worksheet>
            <sheetViews><sheetView zoomScale="125" workbookViewId="0">
                <pane xSplit="1" ySplit="2" topLeftCell="B3" activePane="bottomRight" state="frozen"/>
                <selection pane="bottomRight" activeCell="B2" sqref="B2"/>
            </sheetView></sheetViews>
            <cols><col min="2" max="3" width="20.5" customWidth="1"/><col min="4" max="4" width="30"/></cols>
            <sheetData>
                <row r="1" ht="28" customHeight="1"><c r="A1"><v>1</v></c></row>
                <row r="2"><c r="A2"><v>2</v></c></row>
            </sheetData>
            <autoFilter ref="A1:C1"/>
            <mergeCells count="1"><mergeCell ref="A2:B3"/></mergeCells>
        </worksheet>"#;
        let sheet = parse(xml, Arc::new(StyleRegistry::new()), &[StyleId::DEFAULT]);

        assert_eq!(sheet.zoom(), 1.25);
        assert_eq!((sheet.split_row(), sheet.split_col()), (2, 1));
        assert_eq!(sheet.column_width(1), 20.5);
        assert_eq!(sheet.column_width(2), 20.5);
        assert_eq!(sheet.column_width(3), tabula_core::DEFAULT_COLUMN_WIDTH);
        assert_eq!(sheet.row_height(0), 28.0);
        assert_eq!(sheet.auto_filter_row(), Some(0));
        assert_eq!(sheet.merged_regions(), &[Region::new(1, 0, 2, 1)]);
        // B2 is a merge member, so the cursor moves to the anchor
        assert_eq!(sheet.current_cell(), CellAddress::new(1, 0));
    }

    #[test]
    fn test_hyperlinks() {
        let xml = r#"<worksheet><sheetData>
            <row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1"><v>1</v></c></row>
        </sheetData>
            <mergeCells count="1"><mergeCell ref="C1:D1"/></mergeCells>
            <hyperlinks>
                <hyperlink ref="A1" r:id="rId1"/>
                <hyperlink ref="B1:B2" location="'Other sheet'!B3"/>
                <hyperlink ref="D1" r:id="rId2" location="top"/>
                <hyperlink ref="E1" r:id="rId9"/>
            </hyperlinks>
        </worksheet>"#;
        let mut sheet = Sheet::new("Test", Arc::new(StyleRegistry::new()));
        let targets = AHashMap::from_iter([
            ("rId1".to_string(), "https://example.com/?a=1&b=2".to_string()),
            ("rId2".to_string(), "https://example.com/page".to_string()),
        ]);
        WorksheetParser::new(&mut sheet, &["shared".to_string()], &[StyleId::DEFAULT])
            .link_targets(targets)
            .parse(xml.as_bytes())
            .unwrap();

        let link = |row, col| sheet.cell(row, col).and_then(|c| c.hyperlink().map(str::to_string));
        assert_eq!(link(0, 0).as_deref(), Some("https://example.com/?a=1&b=2"));
        assert_eq!(link(0, 1).as_deref(), Some("#'Other sheet'!B3"));
        // D1 is covered by the C1 merge
        assert_eq!(link(0, 2).as_deref(), Some("https://example.com/page#top"));
        assert_eq!(link(0, 3), None);
        assert_eq!(link(0, 4), None);
    }

    #[test]
    fn test_cells_without_references() {
        let xml = r#"<worksheet><sheetData>
            <row><c><v>1</v></c><c><v>2</v></c></row>
            <row><c><v>3</v></c></row>
        </sheetData></worksheet>"#;
        let sheet = parse(xml, Arc::new(StyleRegistry::new()), &[StyleId::DEFAULT]);
        assert_eq!(sheet.cell(0, 1).unwrap().get_number().unwrap(), 2.0);
        assert_eq!(sheet.cell(1, 0).unwrap().get_number().unwrap(), 3.0);
    }

    #[test]
    fn test_bad_reference_is_a_parse_error() {
        let mut sheet = Sheet::new("Test", Arc::new(StyleRegistry::new()));
        let xml = r#"<worksheet><sheetData><row r="1"><c r="1A"><v>1</v></c></row></sheetData></worksheet>"#;
        let result = WorksheetParser::new(&mut sheet, &[], &[StyleId::DEFAULT]).parse(xml.as_bytes());
        assert!(matches!(result, Err(XlsxError::Parse(_))));
    }
}
