//! Worksheet XML fragments
//!
//! A worksheet part is written as header, rows, footer so the streaming writer can
//! emit rows as they are evicted and the in-memory writer can emit them in one go.

use tabula_core::format::{date_to_serial, datetime_to_serial};
use tabula_core::{Cell, CellAddress, CellError, CellValue, Region, Row, Sheet};

use crate::styles::XlsxStyleTable;
use crate::xml::{escape_xml, format_f64};

const MIN_ZOOM_SCALE: f64 = 10.0;
const MAX_ZOOM_SCALE: f64 = 400.0;

const HYPERLINK_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

/// Hyperlinks of one worksheet, gathered as its rows are written
///
/// Targets starting with `#` are locations inside the workbook and are written as
/// `location`; all others become external relationships of the worksheet part.
#[derive(Debug, Default)]
pub(crate) struct SheetLinks {
    links: Vec<(CellAddress, String)>,
}

impl SheetLinks {
    pub(crate) fn collect(&mut self, row: &Row) {
        for cell in row.cells() {
            if let Some(target) = cell.hyperlink() {
                self.links.push((cell.address(), target.to_string()));
            }
        }
    }

    fn external(&self) -> impl Iterator<Item = (usize, &str)> + '_ {
        self.links
            .iter()
            .map(|(_, target)| target.as_str())
            .filter(|target| !target.starts_with('#'))
            .enumerate()
            .map(|(i, target)| (i + 1, target))
    }

    fn to_xml(&self) -> String {
        if self.links.is_empty() {
            return String::new();
        }
        let mut xml = String::from("<hyperlinks>");
        let mut next_rel = 0;
        for (address, target) in &self.links {
            match target.strip_prefix('#') {
                Some(location) => xml.push_str(&format!(
                    r#"<hyperlink ref="{}" location="{}"/>"#,
                    address.to_a1_string(),
                    escape_xml(location)
                )),
                None => {
                    next_rel += 1;
                    xml.push_str(&format!(
                        r#"<hyperlink ref="{}" r:id="rId{}"/>"#,
                        address.to_a1_string(),
                        next_rel
                    ));
                }
            }
        }
        xml.push_str("</hyperlinks>");
        xml
    }

    /// The worksheet's relationships part; `None` without external links
    pub(crate) fn rels_xml(&self) -> Option<String> {
        let mut external = self.external().peekable();
        external.peek()?;
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for (id, target) in external {
            xml.push_str(&format!(
                r#"
    <Relationship Id="rId{}" Type="{}" Target="{}" TargetMode="External"/>"#,
                id,
                HYPERLINK_REL_TYPE,
                escape_xml(target)
            ));
        }
        xml.push_str("\n</Relationships>");
        Some(xml)
    }
}

/// Everything before the first `<row>`: views, column widths, `<sheetData>`
pub(crate) fn header(sheet: &Sheet, selected: bool) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    xml.push_str(&sheet_views(sheet, selected));
    xml.push_str(&cols(sheet));
    xml.push_str("<sheetData>");
    xml
}

/// Everything after the last `</row>`
///
/// `last_col` is the widest column seen in the sheet, used for the autofilter range.
pub(crate) fn footer(sheet: &Sheet, last_col: u32, links: &SheetLinks) -> String {
    let mut xml = String::from("</sheetData>");
    if let Some(region) = auto_filter_region(sheet, last_col) {
        xml.push_str(&format!(r#"<autoFilter ref="{}"/>"#, region.to_a1_string()));
    }
    xml.push_str(&merge_cells(sheet.merged_regions()));
    xml.push_str(&links.to_xml());
    xml.push_str("</worksheet>");
    xml
}

/// The header row range an autofilter covers
pub(crate) fn auto_filter_region(sheet: &Sheet, last_col: u32) -> Option<Region> {
    sheet
        .auto_filter_row()
        .map(|row| Region::new(row, 0, row, last_col))
}

fn sheet_views(sheet: &Sheet, selected: bool) -> String {
    let mut xml = String::from("<sheetViews><sheetView");
    if selected {
        xml.push_str(r#" tabSelected="1""#);
    }
    let scale = (sheet.zoom() * 100.0)
        .round()
        .clamp(MIN_ZOOM_SCALE, MAX_ZOOM_SCALE);
    if scale != 100.0 {
        xml.push_str(&format!(r#" zoomScale="{}""#, scale as u32));
    }
    xml.push_str(r#" workbookViewId="0">"#);

    let (split_row, split_col) = (sheet.split_row(), sheet.split_col());
    let active_pane = match (split_row > 0, split_col > 0) {
        (true, true) => Some("bottomRight"),
        (true, false) => Some("bottomLeft"),
        (false, true) => Some("topRight"),
        (false, false) => None,
    };
    if let Some(pane) = active_pane {
        xml.push_str("<pane");
        if split_col > 0 {
            xml.push_str(&format!(r#" xSplit="{}""#, split_col));
        }
        if split_row > 0 {
            xml.push_str(&format!(r#" ySplit="{}""#, split_row));
        }
        xml.push_str(&format!(
            r#" topLeftCell="{}" activePane="{}" state="frozen"/>"#,
            CellAddress::new(split_row, split_col),
            pane
        ));
    }

    let current = sheet.current_cell();
    xml.push_str("<selection");
    if let Some(pane) = active_pane {
        xml.push_str(&format!(r#" pane="{}""#, pane));
    }
    xml.push_str(&format!(
        r#" activeCell="{0}" sqref="{0}"/>"#,
        current.to_a1_string()
    ));
    xml.push_str("</sheetView></sheetViews>");
    xml
}

fn cols(sheet: &Sheet) -> String {
    let widths: Vec<(u32, f64)> = sheet.column_widths().collect();
    if widths.is_empty() {
        return String::new();
    }
    let mut xml = String::from("<cols>");
    for (col, width) in widths {
        xml.push_str(&format!(
            r#"<col min="{0}" max="{0}" width="{1}" customWidth="1"/>"#,
            col + 1,
            format_f64(width)
        ));
    }
    xml.push_str("</cols>");
    xml
}

/// One `<row>` element; an empty row without a custom height writes nothing
pub(crate) fn row_xml(row: &Row, table: &XlsxStyleTable) -> String {
    let cells: String = row.cells().filter_map(|cell| cell_xml(cell, table)).collect();
    if cells.is_empty() && row.height().is_none() {
        return String::new();
    }

    let mut xml = format!(r#"<row r="{}""#, row.index() + 1);
    if let Some(height) = row.height() {
        xml.push_str(&format!(r#" ht="{}" customHeight="1""#, format_f64(height)));
    }
    if cells.is_empty() {
        xml.push_str("/>");
    } else {
        xml.push('>');
        xml.push_str(&cells);
        xml.push_str("</row>");
    }
    xml
}

fn cell_xml(cell: &Cell, table: &XlsxStyleTable) -> Option<String> {
    let xf = table.xf_id_for(cell.style_id());
    let reference = cell.address().to_a1_string();
    let style_attr = if xf != 0 {
        format!(r#" s="{}""#, xf)
    } else {
        String::new()
    };

    let xml = match cell.value() {
        CellValue::Blank => {
            if xf == 0 {
                return None;
            }
            format!(r#"<c r="{}"{}/>"#, reference, style_attr)
        }
        CellValue::Boolean(b) => format!(
            r#"<c r="{}"{} t="b"><v>{}</v></c>"#,
            reference,
            style_attr,
            if *b { 1 } else { 0 }
        ),
        CellValue::Error(e) => error_cell(&reference, &style_attr, *e),
        CellValue::Formula(formula) => format!(
            r#"<c r="{}"{}><f>{}</f></c>"#,
            reference,
            style_attr,
            escape_xml(formula)
        ),
        CellValue::Numeric(n) => numeric_cell(&reference, &style_attr, *n),
        CellValue::Text(text) => format!(
            r#"<c r="{}"{} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            reference,
            style_attr,
            escape_xml(text.as_str())
        ),
        CellValue::Date(date) => numeric_cell(&reference, &style_attr, date_to_serial(date)),
        CellValue::DateTime(dt) => numeric_cell(&reference, &style_attr, datetime_to_serial(dt)),
    };
    Some(xml)
}

fn numeric_cell(reference: &str, style_attr: &str, value: f64) -> String {
    if !value.is_finite() {
        return error_cell(reference, style_attr, CellError::Num);
    }
    format!(
        r#"<c r="{}"{}><v>{}</v></c>"#,
        reference,
        style_attr,
        format_f64(value)
    )
}

fn error_cell(reference: &str, style_attr: &str, error: CellError) -> String {
    format!(
        r#"<c r="{}"{} t="e"><v>{}</v></c>"#,
        reference,
        style_attr,
        escape_xml(error.as_str())
    )
}

fn merge_cells(regions: &[Region]) -> String {
    if regions.is_empty() {
        return String::new();
    }
    let mut xml = format!(r#"<mergeCells count="{}">"#, regions.len());
    for region in regions {
        xml.push_str(&format!(r#"<mergeCell ref="{}"/>"#, region.to_a1_string()));
    }
    xml.push_str("</mergeCells>");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tabula_core::{Style, Workbook};

    fn table(workbook: &Workbook) -> XlsxStyleTable {
        XlsxStyleTable::build(workbook.styles())
    }

    #[test]
    fn test_cell_values() {
        let mut workbook = Workbook::new();
        let sheet = workbook.create_sheet("Data").unwrap();
        sheet
            .create_row::<_, CellValue>([
                "a<b".into(),
                2.5.into(),
                true.into(),
                CellValue::formula("=SUM(B1:B2)"),
                CellError::Div0.into(),
                f64::NAN.into(),
            ])
            .unwrap();
        let xml = row_xml(workbook.sheet(0).unwrap().row(0).unwrap(), &table(&workbook));

        assert_eq!(
            xml,
            concat!(
                r#"<row r="1">"#,
                r#"<c r="A1" t="inlineStr"><is><t xml:space="preserve">a&lt;b</t></is></c>"#,
                r#"<c r="B1"><v>2.5</v></c>"#,
                r#"<c r="C1" t="b"><v>1</v></c>"#,
                r#"<c r="D1"><f>SUM(B1:B2)</f></c>"#,
                r#"<c r="E1" t="e"><v>#DIV/0!</v></c>"#,
                r#"<c r="F1" t="e"><v>#NUM!</v></c>"#,
                "</row>"
            )
        );
    }

    #[test]
    fn test_dates_use_date_style() {
        let mut workbook = Workbook::new();
        let sheet = workbook.create_sheet("Data").unwrap();
        sheet
            .get_cell(0, 0)
            .unwrap()
            .set(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        let table = table(&workbook);
        let sheet = workbook.sheet(0).unwrap();
        let xf = table.xf_id_for(sheet.cell(0, 0).unwrap().style_id());
        assert_ne!(xf, 0);
        assert_eq!(
            row_xml(sheet.row(0).unwrap(), &table),
            format!(r#"<row r="1"><c r="A1" s="{}"><v>44927</v></c></row>"#, xf)
        );
    }

    #[test]
    fn test_blank_cells_and_rows() {
        let mut workbook = Workbook::new();
        let bold = workbook.copy_cell_style("bold", &Style::default().bold(true)).unwrap();
        let sheet = workbook.create_sheet("Data").unwrap();
        sheet.get_cell(0, 3).unwrap();
        sheet.get_cell(1, 1).unwrap().set_style_id(bold);
        sheet.set_row_height(2, 30.0).unwrap();

        let table = table(&workbook);
        let sheet = workbook.sheet(0).unwrap();
        assert_eq!(row_xml(sheet.row(0).unwrap(), &table), "");
        assert_eq!(
            row_xml(sheet.row(1).unwrap(), &table),
            format!(r#"<row r="2"><c r="B2" s="{}"/></row>"#, bold.0)
        );
        assert_eq!(
            row_xml(sheet.row(2).unwrap(), &table),
            r#"<row r="3" ht="30" customHeight="1"/>"#
        );
    }

    #[test]
    fn test_sheet_views() {
        let mut workbook = Workbook::new();
        let sheet = workbook.create_sheet("Data").unwrap();
        assert_eq!(
            sheet_views(sheet, true),
            r#"<sheetViews><sheetView tabSelected="1" workbookViewId="0"><selection activeCell="A1" sqref="A1"/></sheetView></sheetViews>"#
        );

        sheet.split_at(1, 0).unwrap();
        sheet.set_zoom(1.5).unwrap();
        sheet.set_current_cell(4, 2).unwrap();
        assert_eq!(
            sheet_views(sheet, false),
            concat!(
                r#"<sheetViews><sheetView zoomScale="150" workbookViewId="0">"#,
                r#"<pane ySplit="1" topLeftCell="A2" activePane="bottomLeft" state="frozen"/>"#,
                r#"<selection pane="bottomLeft" activeCell="C5" sqref="C5"/>"#,
                "</sheetView></sheetViews>"
            )
        );
    }

    #[test]
    fn test_header_and_footer() {
        let mut workbook = Workbook::new();
        let sheet = workbook.create_sheet("Data").unwrap();
        sheet.set_column_width(1, 20.0).unwrap();
        sheet.set_auto_filter_row(Some(0));
        sheet.merge_cell(2, 0, 3, 1).unwrap();

        let header = header(sheet, true);
        assert!(header.contains(r#"<cols><col min="2" max="2" width="20" customWidth="1"/></cols>"#));
        assert!(header.ends_with("<sheetData>"));

        assert_eq!(
            footer(sheet, 3, &SheetLinks::default()),
            concat!(
                "</sheetData>",
                r#"<autoFilter ref="A1:D1"/>"#,
                r#"<mergeCells count="1"><mergeCell ref="A3:C3"/></mergeCells>"#,
                "</worksheet>"
            )
        );
    }

    #[test]
    fn test_hyperlinks() {
        let mut workbook = Workbook::new();
        let sheet = workbook.create_sheet("Links").unwrap();
        sheet.get_cell(0, 0).unwrap().set("site").set_hyperlink("https://example.com/?a=1&b=2");
        sheet.get_cell(0, 1).unwrap().set("jump").set_hyperlink("#'Other sheet'!B3");
        sheet.get_cell(1, 0).unwrap().set("mail").set_hyperlink("mailto:team@example.com");

        let mut links = SheetLinks::default();
        for row in sheet.rows() {
            links.collect(row);
        }
        assert_eq!(
            footer(sheet, 1, &links),
            concat!(
                "</sheetData>",
                "<hyperlinks>",
                r#"<hyperlink ref="A1" r:id="rId1"/>"#,
                r#"<hyperlink ref="B1" location="&apos;Other sheet&apos;!B3"/>"#,
                r#"<hyperlink ref="A2" r:id="rId2"/>"#,
                "</hyperlinks>",
                "</worksheet>"
            )
        );

        let rels = links.rels_xml().unwrap();
        assert!(rels.contains(r#"Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com/?a=1&amp;b=2" TargetMode="External""#));
        assert!(rels.contains(r#"Id="rId2""#));
        assert!(rels.contains("mailto:team@example.com"));
        assert!(!rels.contains("Other sheet"));
    }

    #[test]
    fn test_no_rels_without_external_links() {
        let mut workbook = Workbook::new();
        let sheet = workbook.create_sheet("Links").unwrap();
        sheet.get_cell(0, 0).unwrap().set_hyperlink("#Links!C1");
        let mut links = SheetLinks::default();
        links.collect(sheet.row(0).unwrap());
        assert!(links.rels_xml().is_none());
        assert!(SheetLinks::default().rels_xml().is_none());
    }
}
