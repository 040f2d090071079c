//! Streaming XLSX writes: bounded window, sheet finalization, read-back

use pretty_assertions::assert_eq;
use std::fs::File;
use std::io::Cursor;
use tabula::prelude::*;
use tabula::{BackingKind, XlsxCodec};

#[test]
fn test_stream_large_sheet() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("large.xlsx");

    let mut streaming = XlsxCodec.create_streaming(File::create(&path).unwrap(), 50);
    assert_eq!(streaming.workbook().kind(), BackingKind::Streaming);
    let bold = streaming.copy_cell_style("bold", &Style::default().bold(true)).unwrap();

    let sheet = streaming.create_sheet("Log").unwrap();
    sheet.split_at(1, 0).unwrap();
    sheet.set_column_width(1, 30.0).unwrap();
    streaming
        .create_row(["id", "message"])
        .unwrap()
        .get_cell(0)
        .unwrap()
        .set_style_id(bold);
    for i in 1..=2_000u32 {
        streaming
            .create_row::<_, CellValue>([f64::from(i).into(), format!("event {}", i).into()])
            .unwrap();
        let in_memory = streaming.workbook().sheet(0).unwrap().rows().count();
        assert!(in_memory <= 50, "{} rows held", in_memory);
    }

    // rows outside the window are gone
    let err = streaming.get_row(3).unwrap_err();
    assert_eq!(Error::from(err).kind(), ErrorKind::Lifecycle);

    // a streaming workbook cannot go through the pipeline
    let err = streaming
        .workbook()
        .write(
            &FileType::xlsx(),
            &mut Cursor::new(Vec::new()),
            &IoOptions::default(),
            &mut Progress::none(),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lifecycle);

    let second = streaming.create_sheet("Summary").unwrap();
    second.get_cell(0, 0).unwrap().set("done");
    streaming.close().unwrap();
    streaming.close().unwrap();
    assert!(streaming.is_closed());
    assert!(streaming.create_row(["late"]).is_err());

    let wb = Workbook::open(&path).unwrap();
    assert_eq!(wb.sheet_count(), 2);
    let log = wb.sheet(0).unwrap();
    assert_eq!(log.row_count(), 2_001);
    assert_eq!(log.split_row(), 1);
    assert!((log.column_width(1) - 30.0).abs() < 0.1);
    assert_eq!(log.cell(2_000, 1).unwrap().get_text().unwrap(), "event 2000");
    assert_eq!(wb.styles().name(log.cell(0, 0).unwrap().style_id()), "bold");
    assert_eq!(wb.sheet(1).unwrap().cell(0, 0).unwrap().get_text().unwrap(), "done");
}

#[test]
fn test_generic_write_uses_streaming_copy() {
    let mut wb = Workbook::new();
    let sheet = wb.create_sheet("Data").unwrap();
    for i in 0..500u32 {
        sheet.create_row([f64::from(i), f64::from(i) * 0.5]).unwrap();
    }
    sheet.merge_cell(10, 0, 2, 3).unwrap();
    sheet.set_auto_filter_row(Some(0));

    let mut seen = Vec::new();
    let mut record = |p: f64| seen.push(p);
    let mut buf = Cursor::new(Vec::new());
    wb.write(
        &FileType::xlsx(),
        &mut buf,
        &IoOptions::default(),
        &mut Progress::new(&mut record),
    )
    .unwrap();
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(seen.last(), Some(&1.0));

    buf.set_position(0);
    let back = tabula::XlsxReader::read(buf).unwrap();
    let sheet = back.sheet(0).unwrap();
    assert_eq!(sheet.row_count(), 500);
    assert_eq!(sheet.merged_regions(), wb.sheet(0).unwrap().merged_regions());
    assert_eq!(sheet.auto_filter_row(), Some(0));
    assert_eq!(sheet.cell(499, 1).unwrap().get_number().unwrap(), 249.5);
    // the source is still usable
    assert_eq!(wb.kind(), BackingKind::Generic);
    assert_eq!(wb.sheet(0).unwrap().row_count(), 500);
}
