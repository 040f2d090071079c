//! Cross-format conversion: visible text survives XLSX -> CSV -> XLSX and CSV -> XLSX

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Cursor;
use tabula::format::Locale;
use tabula::prelude::*;
use tabula::{BackingKind, CsvReader, XlsxReader};

fn to_bytes(workbook: &Workbook, file_type: &FileType, options: &IoOptions) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    workbook
        .write(file_type, &mut buf, options, &mut Progress::none())
        .unwrap();
    buf.into_inner()
}

fn from_xlsx(bytes: Vec<u8>) -> Workbook {
    XlsxReader::read(Cursor::new(bytes)).unwrap()
}

fn from_csv(bytes: &[u8], options: &IoOptions) -> Workbook {
    CsvReader::read(bytes, options, &mut Progress::none()).unwrap()
}

/// Visible text of every cell of the first sheet, row by row
fn texts(workbook: &Workbook, locale: Locale) -> Vec<Vec<String>> {
    let sheet = workbook.sheet(0).unwrap();
    sheet
        .rows()
        .map(|row| {
            let mut line: Vec<String> = row
                .cells()
                .map(|c| c.to_display_string(workbook.styles(), locale))
                .collect();
            while line.last().map_or(false, |t| t.is_empty()) {
                line.pop();
            }
            line
        })
        .collect()
}

fn source_workbook() -> Workbook {
    let mut wb = Workbook::with_kind(BackingKind::Xlsx);
    let money = wb.copy_cell_style("money", &Style::default().number_format("#,##0.00")).unwrap();
    let sheet = wb.create_sheet("Report").unwrap();
    sheet.create_row(["Item", "Price", "In stock", "Since"]).unwrap();
    sheet
        .create_row::<_, CellValue>([
            "Widget".into(),
            1234.5.into(),
            true.into(),
            NaiveDate::from_ymd_opt(2023, 2, 1).unwrap().into(),
        ])
        .unwrap()
        .get_cell(1)
        .unwrap()
        .set_style_id(money);
    sheet
        .create_row::<_, CellValue>([
            "Gadget".into(),
            0.5.into(),
            false.into(),
            CellError::Value.into(),
        ])
        .unwrap();
    sheet.get_cell(3, 1).unwrap().set_formula("=B2+B3");
    wb
}

#[test]
fn test_xlsx_to_csv_to_xlsx() {
    let locale = Locale::EN_US;
    let options = IoOptions::default().with_locale(locale);
    let original = from_xlsx(to_bytes(&source_workbook(), &FileType::xlsx(), &options));

    let csv = from_csv(&to_bytes(&original, &FileType::csv(), &options), &options);
    assert_eq!(csv.kind(), BackingKind::Generic);
    let back = from_xlsx(to_bytes(&csv, &FileType::xlsx(), &options));

    let expected = texts(&original, locale);
    let via_csv = texts(&csv, locale);
    // formatted numbers come back as plain numbers from text
    assert!(
        [expected[1][1].as_str(), "1234.5"].contains(&via_csv[1][1].as_str()),
        "{}",
        via_csv[1][1]
    );
    for (r, (a, b)) in expected.iter().zip(&via_csv).enumerate() {
        for (c, (x, y)) in a.iter().zip(b).enumerate() {
            if (r, c) != (1, 1) {
                assert_eq!(x, y, "cell {},{}", r, c);
            }
        }
    }
    assert_eq!(via_csv, texts(&back, locale));
}

#[test]
fn test_csv_to_xlsx() {
    let locale = Locale::DE_DE;
    let options = IoOptions::default().with_locale(locale);
    let input = "Artikel;Preis;Datum;Aktiv\nStuhl;49,95;01.02.23;wahr\n\"Tisch; rund\";-120;15.08.22;FALSCH\n";
    let csv = from_csv(input.as_bytes(), &options);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("moebel.xlsx");
    csv.save(&path).unwrap();
    let back = Workbook::open(&path).unwrap();

    assert_eq!(texts(&csv, locale), texts(&back, locale));
    let sheet = back.sheet(0).unwrap();
    assert_eq!(sheet.name(), "Sheet 1");
    assert_eq!(sheet.cell(1, 1).unwrap().get_number().unwrap(), 49.95);
    assert_eq!(sheet.cell(1, 2).unwrap().cell_type(), CellType::Date);
    assert_eq!(
        sheet.cell(1, 2).unwrap().as_text(back.styles(), locale),
        "01.02.23"
    );
    assert!(!sheet.cell(2, 3).unwrap().get_boolean().unwrap());
    assert_eq!(sheet.cell(2, 0).unwrap().get_text().unwrap(), "Tisch; rund");
}

#[test]
fn test_french_grouping_renderings() {
    let mut wb = Workbook::new();
    let grouped = wb.copy_cell_style("grouped", &Style::default().number_format("#,##0.00")).unwrap();
    wb.create_sheet("Montants")
        .unwrap()
        .get_cell(0, 0)
        .unwrap()
        .set(1234567.891)
        .set_style_id(grouped);
    let back = from_xlsx(to_bytes(&wb, &FileType::xlsx(), &IoOptions::default()));

    let text = texts(&back, Locale::FR_FR)[0][0].clone();
    let accepted = ["1\u{202F}234\u{202F}567,89", "1\u{A0}234\u{A0}567,89", "1 234 567,89"];
    assert!(accepted.contains(&text.as_str()), "{:?}", text);

    // each rendering reads back as the same number
    let options = IoOptions::default().with_locale(Locale::FR_FR);
    for rendering in accepted {
        let csv = from_csv(rendering.as_bytes(), &options);
        assert_eq!(
            csv.sheet(0).unwrap().cell(0, 0).unwrap().get_number().unwrap(),
            1234567.89
        );
    }
}

#[test]
fn test_xlsx_file_to_html() {
    let dir = tempfile::tempdir().unwrap();
    let xlsx = dir.path().join("report.xlsx");
    let html = dir.path().join("report.html");

    let mut wb = source_workbook();
    let sheet = wb.sheet_mut(0).unwrap();
    sheet.merge_cell(0, 0, 2, 1).unwrap();
    sheet.merge_cell(1, 3, 1, 2).unwrap();
    sheet
        .get_cell(2, 0)
        .unwrap()
        .set("manual")
        .set_hyperlink("https://example.com/manual");
    wb.save(&xlsx).unwrap();

    let back = Workbook::open(&xlsx).unwrap();
    back.save(&html).unwrap();
    let text = std::fs::read_to_string(&html).unwrap();
    assert!(text.contains("<td colspan=\"2\">Item</td>"), "{}", text);
    assert!(text.contains(" rowspan=\"2\""), "{}", text);
    assert!(text.contains("<a href=\"https://example.com/manual\">manual</a>"), "{}", text);

    let err = Workbook::open(&html).unwrap_err();
    assert!(matches!(err, Error::UnsupportedFileType(_)), "{}", err);
}
