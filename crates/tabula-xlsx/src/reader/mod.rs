//! XLSX reader

mod worksheet;

use ahash::AHashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tabula_core::{BackingKind, Progress, StyleId, Workbook};
use zip::ZipArchive;

use crate::error::{Result, XlsxError};
use crate::styles::read_styles_xml;
use crate::xml::{attr, decode_excel_escapes, parse_attr};
use worksheet::WorksheetParser;

/// A `<sheet>` entry of workbook.xml
#[derive(Debug)]
struct SheetRef {
    name: String,
    r_id: String,
}

#[derive(Debug, Default)]
struct WorkbookInfo {
    sheets: Vec<SheetRef>,
    active_tab: usize,
}

/// XLSX file reader
pub struct XlsxReader;

impl XlsxReader {
    /// Read a workbook from a file path; the path is remembered by the workbook
    pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let file = BufReader::new(File::open(path.as_ref())?);
        let mut workbook = Self::read(file)?;
        workbook.set_path(Some(path.as_ref()));
        Ok(workbook)
    }

    /// Read a workbook from a reader
    pub fn read<R: Read + Seek>(reader: R) -> Result<Workbook> {
        Self::read_with_progress(reader, &mut Progress::none())
    }

    /// Read a workbook, reporting progress once per sheet
    ///
    /// Nothing is returned on failure; a half-read workbook never escapes.
    pub fn read_with_progress<R: Read + Seek>(
        reader: R,
        progress: &mut Progress<'_>,
    ) -> Result<Workbook> {
        let mut archive = ZipArchive::new(reader)?;

        // Verify this is an XLSX file
        if archive.by_name("[Content_Types].xml").is_err() {
            return Err(XlsxError::InvalidFormat(
                "Missing [Content_Types].xml".into(),
            ));
        }

        let shared_strings = Self::read_shared_strings(&mut archive)?;
        let info = Self::read_workbook_xml(&mut archive)?;
        let sheet_paths = Self::read_workbook_rels(&mut archive)?;

        let mut workbook = Workbook::with_kind(BackingKind::Xlsx);
        let style_ids = Self::read_styles(&mut archive, &workbook)?;

        let total = info.sheets.len();
        for (i, sheet_ref) in info.sheets.iter().enumerate() {
            let Some(path) = sheet_paths.get(&sheet_ref.r_id) else {
                log::warn!(
                    "sheet '{}' has no worksheet relationship '{}', skipping",
                    sheet_ref.name,
                    sheet_ref.r_id
                );
                continue;
            };
            let link_targets = Self::read_sheet_rels(&mut archive, path)?;
            let sheet = workbook.create_sheet(&sheet_ref.name)?;
            let part = archive
                .by_name(path)
                .map_err(|_| XlsxError::MissingPart(path.clone()))?;
            WorksheetParser::new(sheet, &shared_strings, &style_ids)
                .link_targets(link_targets)
                .parse(part)?;
            progress.update(i + 1, total);
        }

        if info.active_tab < workbook.sheet_count() {
            workbook.set_current_sheet(info.active_tab)?;
        }
        progress.finish();
        log::debug!(
            "read XLSX workbook with {} sheets and {} styles",
            workbook.sheet_count(),
            workbook.styles().len()
        );
        Ok(workbook)
    }

    /// Read the shared strings table
    fn read_shared_strings<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let mut strings = Vec::new();

        let file = match archive.by_name("xl/sharedStrings.xml") {
            Ok(f) => f,
            Err(_) => return Ok(strings), // No shared strings is valid
        };

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(false);

        let mut buf = Vec::new();
        let mut current = String::new();
        let mut in_si = false;
        let mut in_t = false;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"si" => {
                        in_si = true;
                        current.clear();
                    }
                    b"t" if in_si => in_t = true,
                    // phonetic runs repeat the text in another script
                    b"rPh" => in_si = false,
                    _ => {}
                },
                Ok(Event::Empty(e)) if e.name().as_ref() == b"si" => strings.push(String::new()),
                Ok(Event::End(e)) => match e.name().as_ref() {
                    b"si" => {
                        strings.push(decode_excel_escapes(&current).into_owned());
                        current.clear();
                        in_si = false;
                    }
                    b"rPh" => in_si = true,
                    b"t" => in_t = false,
                    _ => {}
                },
                Ok(Event::Text(e)) if in_t && in_si => current.push_str(&e.unescape()?),
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(strings)
    }

    /// Register the styles of the file; the result maps cellXfs index to style id
    fn read_styles<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        workbook: &Workbook,
    ) -> Result<Vec<StyleId>> {
        let file = match archive.by_name("xl/styles.xml") {
            Ok(f) => f,
            Err(_) => return Ok(vec![StyleId::DEFAULT]),
        };
        let parsed = read_styles_xml(file)?;
        Ok(parsed.register(workbook.styles()))
    }

    /// Read workbook.xml to get sheet names, rIds and the active tab
    fn read_workbook_xml<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<WorkbookInfo> {
        let file = archive
            .by_name("xl/workbook.xml")
            .map_err(|_| XlsxError::MissingPart("xl/workbook.xml".into()))?;

        let mut xml_reader = Reader::from_reader(BufReader::new(file));
        xml_reader.trim_text(true);

        let mut buf = Vec::new();
        let mut info = WorkbookInfo::default();

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.name().as_ref() {
                    b"sheet" => {
                        if let (Some(name), Some(r_id)) = (attr(&e, b"name")?, attr(&e, b"r:id")?) {
                            info.sheets.push(SheetRef { name, r_id });
                        }
                    }
                    b"workbookView" => {
                        info.active_tab = parse_attr(&e, b"activeTab")?.unwrap_or(0);
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(XlsxError::Xml(e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(info)
    }

    /// Read workbook.xml.rels to get worksheet part paths by rId
    fn read_workbook_rels<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<AHashMap<String, String>> {
        let file = archive
            .by_name("xl/_rels/workbook.xml.rels")
            .map_err(|_| XlsxError::MissingPart("xl/_rels/workbook.xml.rels".into()))?;

        let mut rels = AHashMap::new();
        for rel in read_relationships(file)? {
            if rel.rel_type.ends_with("/worksheet") {
                // Target is relative to xl/ unless absolute
                let full_path = match rel.target.strip_prefix('/') {
                    Some(absolute) => absolute.to_string(),
                    None => format!("xl/{}", rel.target),
                };
                rels.insert(rel.id, full_path);
            }
        }
        Ok(rels)
    }

    /// Read the hyperlink targets of a worksheet's relationships part by rId
    ///
    /// A worksheet without a relationships part has no external links.
    fn read_sheet_rels<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        sheet_path: &str,
    ) -> Result<AHashMap<String, String>> {
        let rels_path = match sheet_path.rsplit_once('/') {
            Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
            None => format!("_rels/{}.rels", sheet_path),
        };
        let Ok(file) = archive.by_name(&rels_path) else {
            return Ok(AHashMap::new());
        };

        Ok(read_relationships(file)?
            .into_iter()
            .filter(|rel| rel.rel_type.ends_with("/hyperlink"))
            .map(|rel| (rel.id, rel.target))
            .collect())
    }
}

/// One `<Relationship>` of a relationships part
#[derive(Debug)]
struct Relationship {
    id: String,
    target: String,
    rel_type: String,
}

/// Parse every complete `<Relationship>` of a relationships part
fn read_relationships<R: Read>(reader: R) -> Result<Vec<Relationship>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.name().as_ref() == b"Relationship" => {
                if let (Some(id), Some(target), Some(rel_type)) =
                    (attr(&e, b"Id")?, attr(&e, b"Target")?, attr(&e, b"Type")?)
                {
                    rels.push(Relationship {
                        id,
                        target,
                        rel_type,
                    });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::XlsxWriter;
    use pretty_assertions::assert_eq;
    use std::io::{Cursor, Write};
    use tabula_core::{CellType, CellValue, Color, Style};

    fn minimal_xlsx(shared_strings: Option<&str>, sheet_xml: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options = zip::write::SimpleFileOptions::default();

            zip.start_file("[Content_Types].xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/></Types>"#).unwrap();

            zip.start_file("xl/workbook.xml", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><bookViews><workbookView activeTab="1"/></bookViews><sheets><sheet name="First" sheetId="1" r:id="rId1"/><sheet name="Second" sheetId="2" r:id="rId2"/></sheets></workbook>"#).unwrap();

            zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
            zip.write_all(br#"<?xml version="1.0"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/></Relationships>"#).unwrap();

            if let Some(strings) = shared_strings {
                zip.start_file("xl/sharedStrings.xml", options).unwrap();
                zip.write_all(strings.as_bytes()).unwrap();
            }

            zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
            zip.write_all(sheet_xml.as_bytes()).unwrap();
            zip.start_file("xl/worksheets/sheet2.xml", options).unwrap();
            zip.write_all(br#"<worksheet><sheetData/></worksheet>"#).unwrap();

            zip.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_read_minimal_xlsx() {
        let bytes = minimal_xlsx(
            Some(r#"<sst><si><t>plain</t></si><si><r><t>rich </t></r><r><t>text</t></r></si><si/></sst>"#),
            r#"<worksheet><sheetData><row r="1"><c r="A1" t="s"><v>1</v></c><c r="B1" t="s"><v>0</v></c></row></sheetData></worksheet>"#,
        );
        let workbook = XlsxReader::read(Cursor::new(bytes)).unwrap();

        assert_eq!(workbook.kind(), BackingKind::Xlsx);
        assert_eq!(workbook.sheet_count(), 2);
        assert_eq!(workbook.sheet(1).unwrap().name(), "Second");
        assert_eq!(workbook.current_sheet(), Some(1));
        let first = workbook.sheet(0).unwrap();
        assert_eq!(first.cell(0, 0).unwrap().get_text().unwrap(), "rich text");
        assert_eq!(first.cell(0, 1).unwrap().get_text().unwrap(), "plain");
    }

    #[test]
    fn test_missing_content_types() {
        let mut buf = Vec::new();
        {
            let mut zip = zip::ZipWriter::new(Cursor::new(&mut buf));
            zip.start_file("hello.txt", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(b"hi").unwrap();
            zip.finish().unwrap();
        }
        let err = XlsxReader::read(Cursor::new(buf)).unwrap_err();
        assert!(matches!(err, XlsxError::InvalidFormat(_)));
        assert!(err.is_format());
    }

    #[test]
    fn test_not_a_zip() {
        let err = XlsxReader::read(Cursor::new(b"name,value\n".to_vec())).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_round_trip_through_writer() {
        let mut workbook = Workbook::with_kind(BackingKind::Xlsx);
        let header = workbook.copy_cell_style(
            "header",
            &Style::default().bold(true).fill_color(Color::YELLOW),
        )
        .unwrap();
        let sheet = workbook.create_sheet("Data & more").unwrap();
        sheet.create_row(["Name", "Amount"]).unwrap();
        sheet.get_cell(0, 0).unwrap().set_style_id(header);
        sheet.get_cell(0, 1).unwrap().set_style_id(header);
        sheet
            .create_row::<_, CellValue>(["tab\tand <xml>".into(), 12.75.into()])
            .unwrap();
        sheet.get_cell(2, 1).unwrap().set_formula("=SUM(B2:B2)");
        sheet.merge_cell(3, 0, 2, 1).unwrap();
        sheet.split_at(1, 0).unwrap();
        sheet.set_zoom(0.8).unwrap();
        sheet.set_column_width(0, 24.0).unwrap();
        sheet.set_row_height(1, 18.5).unwrap();
        sheet.set_auto_filter_row(Some(0));
        sheet.get_cell(0, 0).unwrap().set_hyperlink("https://example.com/?q=a&b");
        sheet.get_cell(3, 0).unwrap().set_hyperlink("#'Data & more'!B2");

        let mut out = Cursor::new(Vec::new());
        XlsxWriter::write(&workbook, &mut out, &mut Progress::none()).unwrap();
        let read = XlsxReader::read(Cursor::new(out.into_inner())).unwrap();

        let sheet = read.sheet(0).unwrap();
        assert_eq!(sheet.name(), "Data & more");
        assert_eq!(read.styles().name(sheet.cell(0, 0).unwrap().style_id()), "header");
        assert!(read.styles().get(sheet.cell(0, 1).unwrap().style_id()).font.bold);
        assert_eq!(sheet.cell(1, 0).unwrap().get_text().unwrap(), "tab\tand <xml>");
        assert_eq!(sheet.cell(1, 1).unwrap().get_number().unwrap(), 12.75);
        assert_eq!(sheet.cell(2, 1).unwrap().get_formula().unwrap(), "SUM(B2:B2)");
        assert_eq!(sheet.cell(3, 0).unwrap().span_cols(), 2);
        assert_eq!((sheet.split_row(), sheet.split_col()), (1, 0));
        assert_eq!(sheet.zoom(), 0.8);
        assert_eq!(sheet.column_width(0), 24.0);
        assert_eq!(sheet.row_height(1), 18.5);
        assert_eq!(sheet.auto_filter_row(), Some(0));
        assert_eq!(sheet.cell(2, 0).map(|c| c.cell_type()), Some(CellType::Blank));
        assert_eq!(sheet.cell(0, 0).unwrap().hyperlink(), Some("https://example.com/?q=a&b"));
        assert_eq!(sheet.cell(3, 0).unwrap().hyperlink(), Some("#'Data & more'!B2"));
        assert_eq!(sheet.cell(0, 1).unwrap().hyperlink(), None);
    }
}
