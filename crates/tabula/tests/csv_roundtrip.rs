//! End-to-end tests for CSV roundtrip through the facade

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Cursor;
use tabula::format::Locale;
use tabula::prelude::*;
use tabula::{BackingKind, CsvReader};

fn write_csv(workbook: &Workbook, options: &IoOptions) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    workbook
        .write(&FileType::csv(), &mut buf, options, &mut Progress::none())
        .unwrap();
    buf.into_inner()
}

fn sample() -> Workbook {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Data").unwrap();
    sheet.create_row(["Name", "Amount", "Paid", "Due"]).unwrap();
    sheet
        .create_row::<_, CellValue>([
            "Smith; J".into(),
            1234.5.into(),
            true.into(),
            NaiveDate::from_ymd_opt(2023, 2, 1).unwrap().into(),
        ])
        .unwrap();
    sheet
        .create_row::<_, CellValue>([
            "Müller".into(),
            (-0.25).into(),
            false.into(),
            CellValue::Blank,
        ])
        .unwrap();
    wb
}

fn assert_same_values(original: &Workbook, copy: &Workbook) {
    let (a, b) = (original.sheet(0).unwrap(), copy.sheet(0).unwrap());
    assert_eq!(a.row_count(), b.row_count());
    for row in a.rows() {
        for cell in row.cells().filter(|c| !c.is_blank()) {
            let other = b.cell(cell.row(), cell.col()).unwrap();
            assert_eq!(cell.cell_type(), other.cell_type(), "type at {}", cell.address());
            assert_eq!(cell.value(), other.value(), "value at {}", cell.address());
        }
    }
}

#[test]
fn test_roundtrip_per_locale() {
    let wb = sample();
    for locale in [Locale::EN_US, Locale::DE_DE, Locale::FR_FR, Locale::EN_GB] {
        let options = IoOptions::default().with_locale(locale);
        let bytes = write_csv(&wb, &options);
        let wb2 = CsvReader::read(&bytes[..], &options, &mut Progress::none()).unwrap();
        assert_same_values(&wb, &wb2);
    }
}

#[test]
fn test_roundtrip_keeps_exact_numbers() {
    let mut wb = Workbook::new();
    wb.create_sheet("Numbers")
        .unwrap()
        .create_row([0.1 + 0.2, 1e-11, 1e300, -123456789.125])
        .unwrap();
    for locale in [Locale::EN_US, Locale::DE_DE, Locale::FR_FR] {
        let options = IoOptions::default().with_locale(locale);
        let bytes = write_csv(&wb, &options);
        let wb2 = CsvReader::read(&bytes[..], &options, &mut Progress::none()).unwrap();
        assert_same_values(&wb, &wb2);
    }
    let text = String::from_utf8(write_csv(&wb, &IoOptions::default())).unwrap();
    assert_eq!(text, "0.30000000000000004,1E-11,1E300,-123456789.125\n");
}

#[test]
fn test_roundtrip_each_date_format() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Dates").unwrap();
    sheet
        .create_row::<_, CellValue>([
            NaiveDate::from_ymd_opt(2019, 12, 31).unwrap().into(),
            NaiveDate::from_ymd_opt(2024, 7, 4)
                .unwrap()
                .and_hms_opt(16, 45, 0)
                .unwrap()
                .into(),
        ])
        .unwrap();
    for date_format in DateFormatStyle::ALL {
        let options = IoOptions::default().with_date_format(date_format);
        let bytes = write_csv(&wb, &options);
        let wb2 = CsvReader::read(&bytes[..], &options, &mut Progress::none()).unwrap();
        assert_same_values(&wb, &wb2);
    }
}

#[test]
fn test_save_and_open_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.csv");
    let wb = sample();
    wb.save(&path).unwrap();

    let wb2 = Workbook::open(&path).unwrap();
    assert_eq!(wb2.kind(), BackingKind::Generic);
    assert_eq!(wb2.path(), Some(path.as_path()));
    assert_same_values(&wb, &wb2);

    // .txt is handled by the same codec
    let txt = dir.path().join("data.txt");
    std::fs::copy(&path, &txt).unwrap();
    assert_same_values(&wb, &Workbook::open(&txt).unwrap());
}

#[test]
fn test_explicit_options() {
    let wb = sample();
    let options = IoOptions::default()
        .with_delimiter('\t')
        .with_text_qualifier('\'')
        .with_charset("windows-1252");
    let bytes = write_csv(&wb, &options);
    assert!(bytes.starts_with(b"Name\tAmount\tPaid\tDue\n"));
    // "Müller" encoded in windows-1252
    assert!(bytes.windows(6).any(|w| w == b"M\xFCller"));

    let wb2 = CsvReader::read(&bytes[..], &options, &mut Progress::none()).unwrap();
    assert_same_values(&wb, &wb2);
}

#[test]
fn test_strict_reading() {
    let options = IoOptions::default().with_strict(true);
    let err = CsvReader::read(&b"a,b\nc\n"[..], &options, &mut Progress::none()).unwrap_err();
    assert_eq!(Error::from(err).kind(), ErrorKind::Format);
}
