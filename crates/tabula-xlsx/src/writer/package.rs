//! Package-level parts: content types, relationships, workbook.xml, styles.xml

use std::io::{Seek, Write};

use tabula_core::{CellAddress, Region};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::Result;
use crate::styles::XlsxStyleTable;
use crate::xml::escape_xml;
use crate::writer::worksheet::SheetLinks;

/// What workbook.xml needs to know about one sheet
#[derive(Debug, Clone)]
pub(crate) struct SheetEntry {
    pub name: String,
    /// Autofilter range, published as the sheet's `_xlnm._FilterDatabase` name
    pub filter: Option<Region>,
}

pub(crate) fn sheet_part_name(index: usize) -> String {
    format!("xl/worksheets/sheet{}.xml", index + 1)
}

pub(crate) fn sheet_rels_part_name(index: usize) -> String {
    format!("xl/worksheets/_rels/sheet{}.xml.rels", index + 1)
}

/// Write the worksheet's relationships part when its links need one
pub(crate) fn write_sheet_rels<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    index: usize,
    links: &SheetLinks,
) -> Result<()> {
    if let Some(rels) = links.rels_xml() {
        start_part(zip, &sheet_rels_part_name(index))?;
        zip.write_all(rels.as_bytes())?;
    }
    Ok(())
}

pub(crate) fn start_part<W: Write + Seek>(zip: &mut ZipWriter<W>, name: &str) -> Result<()> {
    zip.start_file(name, SimpleFileOptions::default())?;
    Ok(())
}

/// Write everything except the worksheets themselves
pub(crate) fn write_package_parts<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    sheets: &[SheetEntry],
    active_sheet: usize,
    style_table: &XlsxStyleTable,
) -> Result<()> {
    write_content_types(zip, sheets.len())?;
    write_root_rels(zip)?;
    write_workbook_xml(zip, sheets, active_sheet)?;
    write_workbook_rels(zip, sheets.len())?;

    start_part(zip, "xl/styles.xml")?;
    zip.write_all(style_table.to_styles_xml().as_bytes())?;
    Ok(())
}

fn write_content_types<W: Write + Seek>(zip: &mut ZipWriter<W>, sheet_count: usize) -> Result<()> {
    start_part(zip, "[Content_Types].xml")?;

    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
    <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    for i in 0..sheet_count {
        content.push_str(&format!(
            r#"
    <Override PartName="/{}" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            sheet_part_name(i)
        ));
    }
    content.push_str("\n</Types>");

    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn write_root_rels<W: Write + Seek>(zip: &mut ZipWriter<W>) -> Result<()> {
    start_part(zip, "_rels/.rels")?;
    let content = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#;
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn write_workbook_xml<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    sheets: &[SheetEntry],
    active_sheet: usize,
) -> Result<()> {
    start_part(zip, "xl/workbook.xml")?;

    let mut content = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
    <bookViews>
        <workbookView activeTab="{}"/>
    </bookViews>
    <sheets>"#,
        active_sheet
    );
    for (i, sheet) in sheets.iter().enumerate() {
        content.push_str(&format!(
            r#"
        <sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape_xml(&sheet.name),
            i + 1,
            i + 1
        ));
    }
    content.push_str("\n    </sheets>");

    let filters: Vec<(usize, &SheetEntry, Region)> = sheets
        .iter()
        .enumerate()
        .filter_map(|(i, sheet)| sheet.filter.map(|region| (i, sheet, region)))
        .collect();
    if !filters.is_empty() {
        content.push_str("\n    <definedNames>");
        for (i, sheet, region) in filters {
            content.push_str(&format!(
                r#"
        <definedName name="_xlnm._FilterDatabase" localSheetId="{}" hidden="1">{}</definedName>"#,
                i,
                escape_xml(&absolute_reference(&sheet.name, &region))
            ));
        }
        content.push_str("\n    </definedNames>");
    }

    content.push_str("\n</workbook>");
    zip.write_all(content.as_bytes())?;
    Ok(())
}

fn write_workbook_rels<W: Write + Seek>(zip: &mut ZipWriter<W>, sheet_count: usize) -> Result<()> {
    start_part(zip, "xl/_rels/workbook.xml.rels")?;

    let mut content = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for i in 0..sheet_count {
        content.push_str(&format!(
            r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            i + 1,
            i + 1
        ));
    }
    // styles come right after the sheets
    content.push_str(&format!(
        r#"
    <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    ));
    content.push_str("\n</Relationships>");

    zip.write_all(content.as_bytes())?;
    Ok(())
}

/// `'Sheet name'!$A$1:$C$1`
fn absolute_reference(sheet_name: &str, region: &Region) -> String {
    let corner = |row: u32, col: u32| {
        format!("${}${}", CellAddress::column_to_letters(col), row + 1)
    };
    format!(
        "'{}'!{}:{}",
        sheet_name.replace('\'', "''"),
        corner(region.first_row, region.first_col),
        corner(region.last_row, region.last_col)
    )
}
