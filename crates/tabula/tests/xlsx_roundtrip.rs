//! End-to-end tests for XLSX roundtrip (create -> save -> read -> verify)

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Cursor;
use tabula::prelude::*;
use tabula::{BackingKind, XlsxReader};

fn write_and_read(workbook: &Workbook) -> Workbook {
    let mut buf = Cursor::new(Vec::new());
    workbook
        .write(&FileType::xlsx(), &mut buf, &IoOptions::default(), &mut Progress::none())
        .unwrap();
    buf.set_position(0);
    XlsxReader::read(buf).unwrap()
}

/// Every non-blank cell keeps its type, value and style name
fn assert_same_content(original: &Workbook, copy: &Workbook) {
    assert_eq!(original.sheet_count(), copy.sheet_count());
    for (a, b) in original.sheets().zip(copy.sheets()) {
        assert_eq!(a.name(), b.name());
        for row in a.rows() {
            for cell in row.cells().filter(|c| !c.is_blank()) {
                let other = b
                    .cell(cell.row(), cell.col())
                    .unwrap_or_else(|| panic!("missing {}", cell.address()));
                assert_eq!(cell.cell_type(), other.cell_type(), "type at {}", cell.address());
                assert_eq!(cell.value(), other.value(), "value at {}", cell.address());
                assert_eq!(
                    original.styles().name(cell.style_id()),
                    copy.styles().name(other.style_id()),
                    "style at {}",
                    cell.address()
                );
            }
        }
    }
}

/// Test basic roundtrip with numeric values
#[test]
fn test_roundtrip_numbers() {
    for kind in [BackingKind::Xlsx, BackingKind::Generic] {
        let mut wb = Workbook::with_kind(kind);
        let sheet = wb.create_sheet("Numbers").unwrap();
        sheet.create_row([42.0, 3.14159, -100.5]).unwrap();
        sheet.create_row([0.0, 1e10, 1e-7]).unwrap();

        let wb2 = write_and_read(&wb);
        assert_same_content(&wb, &wb2);
    }
}

/// Test roundtrip with string values
#[test]
fn test_roundtrip_strings() {
    let mut wb = Workbook::with_kind(BackingKind::Xlsx);
    let sheet = wb.create_sheet("Strings").unwrap();
    sheet
        .create_row([
            "Hello, World!",
            "Special: <>&\"'",
            "Multi\nLine",
            "  padded  ",
            "Unicode: \u{1F600}",
        ])
        .unwrap();

    let wb2 = write_and_read(&wb);
    assert_same_content(&wb, &wb2);
    assert_eq!(
        wb2.sheet(0).unwrap().cell(0, 3).unwrap().get_text().unwrap(),
        "  padded  "
    );
}

/// Test roundtrip with formulas, booleans, errors and dates
#[test]
fn test_roundtrip_mixed_types() {
    let mut wb = Workbook::with_kind(BackingKind::Xlsx);
    let sheet = wb.create_sheet("Mixed").unwrap();
    sheet.create_row(["Name", "Value", "Active", "Since"]).unwrap();
    sheet
        .create_row::<_, CellValue>([
            "Item 1".into(),
            42.5.into(),
            true.into(),
            NaiveDate::from_ymd_opt(2023, 2, 1).unwrap().into(),
        ])
        .unwrap();
    sheet.get_cell(2, 1).unwrap().set_formula("=SUM(B2:B2)");
    sheet.get_cell(2, 2).unwrap().set_error(CellError::Na);
    sheet.get_cell(2, 3).unwrap().set(
        NaiveDate::from_ymd_opt(2023, 2, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap(),
    );

    let wb2 = write_and_read(&wb);
    assert_same_content(&wb, &wb2);

    let sheet2 = wb2.sheet(0).unwrap();
    assert_eq!(sheet2.cell(2, 1).unwrap().get_formula().unwrap(), "SUM(B2:B2)");
    assert_eq!(sheet2.cell(1, 3).unwrap().cell_type(), CellType::Date);
    assert_eq!(sheet2.cell(2, 3).unwrap().cell_type(), CellType::DateTime);
    assert_eq!(
        wb2.styles().name(sheet2.cell(1, 3).unwrap().style_id()),
        "#DATE#"
    );
}

/// Test roundtrip with multiple worksheets and the current sheet
#[test]
fn test_roundtrip_multiple_sheets() {
    let mut wb = Workbook::with_kind(BackingKind::Xlsx);
    for name in ["Data 2024", "Q1 Report", "Sales-Summary"] {
        wb.create_sheet(name).unwrap().get_cell(0, 0).unwrap().set(name);
    }
    wb.set_current_sheet(1).unwrap();

    let wb2 = write_and_read(&wb);
    assert_same_content(&wb, &wb2);
    assert_eq!(wb2.current_sheet(), Some(1));
}

/// Test sparse cells stay where they were put
#[test]
fn test_roundtrip_sparse_data() {
    let mut wb = Workbook::with_kind(BackingKind::Xlsx);
    let sheet = wb.create_sheet("Sparse").unwrap();
    sheet.get_cell(0, 0).unwrap().set("Start");
    sheet.get_cell(49, 25).unwrap().set("Middle");
    sheet.get_cell(9999, 701).unwrap().set("ZZ10000");

    let wb2 = write_and_read(&wb);
    let sheet2 = wb2.sheet(0).unwrap();
    assert_eq!(sheet2.cell(49, 25).unwrap().address().to_string(), "Z50");
    assert_eq!(sheet2.cell(9999, 701).unwrap().get_text().unwrap(), "ZZ10000");
    assert!(sheet2.cell(0, 1).map_or(true, |c| c.is_blank()));
    assert!(sheet2.cell(1, 0).map_or(true, |c| c.is_blank()));
}

/// Test row heights, column widths and view settings
#[test]
fn test_roundtrip_sheet_settings() {
    let mut wb = Workbook::with_kind(BackingKind::Xlsx);
    let sheet = wb.create_sheet("Layout").unwrap();
    sheet.get_cell(0, 0).unwrap().set("Tall row");
    sheet.set_row_height(0, 30.0).unwrap();
    sheet.set_row_height(2, 50.0).unwrap();
    sheet.set_column_width(0, 20.0).unwrap();
    sheet.set_column_width(2, 5.0).unwrap();
    sheet.split_at(1, 2).unwrap();
    sheet.set_zoom(1.5).unwrap();
    sheet.set_auto_filter_row(Some(0));
    sheet.merge_cell(3, 0, 2, 2).unwrap();
    sheet.set_current_cell(4, 1).unwrap();

    let wb2 = write_and_read(&wb);
    let sheet2 = wb2.sheet(0).unwrap();
    assert!((sheet2.row_height(0) - 30.0).abs() < 0.1);
    assert!((sheet2.row_height(2) - 50.0).abs() < 0.1);
    assert!((sheet2.column_width(0) - 20.0).abs() < 0.1);
    assert!((sheet2.column_width(2) - 5.0).abs() < 0.1);
    assert_eq!((sheet2.split_row(), sheet2.split_col()), (1, 2));
    assert!((sheet2.zoom() - 1.5).abs() < 1e-9);
    assert_eq!(sheet2.auto_filter_row(), Some(0));
    assert_eq!(sheet2.merged_regions(), wb.sheet(0).unwrap().merged_regions());
    // the cursor moved to the merge anchor
    assert_eq!(sheet2.current_cell().to_string(), "A4");
}

/// Test named styles survive, including font, fill and number format
#[test]
fn test_roundtrip_named_styles() {
    let mut wb = Workbook::with_kind(BackingKind::Xlsx);
    let header = wb.copy_cell_style(
        "header",
        &Style::default()
            .bold(true)
            .fill_color(Color::LIGHT_GRAY)
            .horizontal_alignment(HorizontalAlignment::Center),
    )
    .unwrap();
    let percent = wb.copy_cell_style("percent", &Style::default().number_format("0.0%")).unwrap();
    let sheet = wb.create_sheet("Styled").unwrap();
    sheet.get_cell(0, 0).unwrap().set("Rate").set_style_id(header);
    sheet.get_cell(1, 0).unwrap().set(0.125).set_style_id(percent);

    let wb2 = write_and_read(&wb);
    assert_same_content(&wb, &wb2);
    assert!(wb2.has_cell_style("header"));
    let style = wb2.styles().get(wb2.cell_style("header").unwrap());
    assert!(style.font.bold);
    assert_eq!(style.alignment.horizontal, HorizontalAlignment::Center);
    let cell = wb2.sheet(0).unwrap().cell(1, 0).unwrap();
    assert_eq!(cell.as_text(wb2.styles(), tabula::format::Locale::EN_US), "12.5%");
}

/// Test saving and opening through file paths
#[test]
fn test_save_and_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saved.xlsx");

    let mut wb = Workbook::new();
    wb.create_sheet("Sheet1").unwrap().create_row(["a", "b"]).unwrap();
    wb.save(&path).unwrap();

    let wb2 = Workbook::open(&path).unwrap();
    assert_eq!(wb2.kind(), BackingKind::Xlsx);
    assert_eq!(wb2.path(), Some(path.as_path()));
    assert_same_content(&wb, &wb2);
}

/// Test reading something that is not a workbook
#[test]
fn test_open_invalid_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.xlsx");
    std::fs::write(&path, b"definitely not a zip").unwrap();
    let err = Workbook::open(&path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);

    let missing = dir.path().join("missing.xlsx");
    assert_eq!(Workbook::open(&missing).unwrap_err().kind(), ErrorKind::Io);

    let unknown = dir.path().join("file.ods");
    assert_eq!(Workbook::open(&unknown).unwrap_err().kind(), ErrorKind::Bounds);
}
