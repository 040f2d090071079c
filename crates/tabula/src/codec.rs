//! Capability traits implemented by each file format, and the built-in codecs
//!
//! A [`FileType`](crate::FileType) hands out its codec through three narrow
//! traits: a factory creates and opens workbooks, a reader maps bytes onto a
//! workbook, and a writer serializes one.

use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use tabula_core::{BackingKind, IoOptions, Progress, Workbook};
use tabula_csv::{CsvReader, CsvWriter};
use tabula_xlsx::{StreamingXlsxWorkbook, XlsxReader, XlsxWriter};

use crate::error::{Error, Result};
use crate::html::HtmlWriter;

/// A seekable input stream
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

/// A seekable output stream
pub trait WriteSeek: Write + Seek {}

impl<T: Write + Seek> WriteSeek for T {}

/// Creates and opens workbooks of one backing kind
pub trait WorkbookFactory: Send + Sync {
    /// Backing kind of the workbooks this factory creates
    fn kind(&self) -> BackingKind;

    /// A new, empty workbook
    fn create(&self) -> Workbook {
        Workbook::with_kind(self.kind())
    }

    /// Open `path`; the path is remembered by the workbook
    fn open(&self, path: &Path, options: &IoOptions, progress: &mut Progress<'_>) -> Result<Workbook>;
}

/// Maps an input stream onto a new workbook
pub trait WorkbookReader: Send + Sync {
    fn read(
        &self,
        input: &mut dyn ReadSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<Workbook>;
}

/// Serializes workbooks
///
/// [`write_direct`](Self::write_direct) only sees workbooks whose kind passes
/// [`accepts`](Self::accepts); everything else goes through
/// [`write_converted`](Self::write_converted).
pub trait WorkbookWriter: Send + Sync {
    /// Kind of the workbook a conversion copies into
    fn target_kind(&self) -> BackingKind;

    /// Whether a workbook of `kind` can be serialized as is
    fn accepts(&self, kind: BackingKind) -> bool;

    fn write_direct(
        &self,
        workbook: &Workbook,
        out: &mut dyn WriteSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()>;

    /// Copy `workbook` into a fresh workbook of the target kind and write that
    fn write_converted(
        &self,
        workbook: &Workbook,
        out: &mut dyn WriteSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        let mut copy = Workbook::with_kind(self.target_kind());
        copy.set_locale(workbook.locale());
        copy.copy_from(workbook)?;
        self.write_direct(&copy, out, options, progress)
    }
}

/// XLSX container codec
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxCodec;

impl XlsxCodec {
    /// A workbook whose rows stream into `out`, keeping `window` rows in memory
    pub fn create_streaming<W: Write + Seek>(&self, out: W, window: usize) -> StreamingXlsxWorkbook<W> {
        StreamingXlsxWorkbook::new(out).with_window(window)
    }
}

impl WorkbookFactory for XlsxCodec {
    fn kind(&self) -> BackingKind {
        BackingKind::Xlsx
    }

    fn open(&self, path: &Path, options: &IoOptions, progress: &mut Progress<'_>) -> Result<Workbook> {
        let mut input = BufReader::new(File::open(path)?);
        let mut workbook = self.read(&mut input, options, progress)?;
        workbook.set_path(Some(path));
        Ok(workbook)
    }
}

impl WorkbookReader for XlsxCodec {
    fn read(
        &self,
        input: &mut dyn ReadSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<Workbook> {
        let mut workbook = XlsxReader::read_with_progress(input, progress)?;
        workbook.set_locale(options.locale);
        Ok(workbook)
    }
}

impl WorkbookWriter for XlsxCodec {
    fn target_kind(&self) -> BackingKind {
        BackingKind::Streaming
    }

    fn accepts(&self, kind: BackingKind) -> bool {
        kind == BackingKind::Xlsx
    }

    fn write_direct(
        &self,
        workbook: &Workbook,
        out: &mut dyn WriteSeek,
        _options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        XlsxWriter::write(workbook, out, progress)?;
        Ok(())
    }

    /// Rows are copied through a streaming workbook so only its window is held twice
    fn write_converted(
        &self,
        workbook: &Workbook,
        out: &mut dyn WriteSeek,
        _options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        let mut streaming = StreamingXlsxWorkbook::new(out);
        streaming.copy_from(workbook, progress)?;
        streaming.close()?;
        Ok(())
    }
}

/// Delimited text codec
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvCodec;

impl WorkbookFactory for CsvCodec {
    fn kind(&self) -> BackingKind {
        BackingKind::Generic
    }

    fn open(&self, path: &Path, options: &IoOptions, progress: &mut Progress<'_>) -> Result<Workbook> {
        let mut workbook = CsvReader::read(File::open(path)?, options, progress)?;
        workbook.set_path(Some(path));
        Ok(workbook)
    }
}

impl WorkbookReader for CsvCodec {
    fn read(
        &self,
        input: &mut dyn ReadSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<Workbook> {
        Ok(CsvReader::read(input, options, progress)?)
    }
}

impl WorkbookWriter for CsvCodec {
    fn target_kind(&self) -> BackingKind {
        BackingKind::Generic
    }

    fn accepts(&self, kind: BackingKind) -> bool {
        matches!(kind, BackingKind::Generic | BackingKind::Xlsx)
    }

    fn write_direct(
        &self,
        workbook: &Workbook,
        out: &mut dyn WriteSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        CsvWriter::write(workbook, out, options, progress).map_err(Error::from)
    }
}

/// Write-only HTML export codec
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlCodec;

impl HtmlCodec {
    fn write_only() -> Error {
        Error::UnsupportedFileType("HTML is write-only".into())
    }
}

impl WorkbookFactory for HtmlCodec {
    fn kind(&self) -> BackingKind {
        BackingKind::Generic
    }

    fn open(&self, _path: &Path, _options: &IoOptions, _progress: &mut Progress<'_>) -> Result<Workbook> {
        Err(Self::write_only())
    }
}

impl WorkbookReader for HtmlCodec {
    fn read(
        &self,
        _input: &mut dyn ReadSeek,
        _options: &IoOptions,
        _progress: &mut Progress<'_>,
    ) -> Result<Workbook> {
        Err(Self::write_only())
    }
}

impl WorkbookWriter for HtmlCodec {
    fn target_kind(&self) -> BackingKind {
        BackingKind::Generic
    }

    fn accepts(&self, kind: BackingKind) -> bool {
        matches!(kind, BackingKind::Generic | BackingKind::Xlsx)
    }

    fn write_direct(
        &self,
        workbook: &Workbook,
        out: &mut dyn WriteSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        HtmlWriter::write(workbook, out, options, progress)
    }
}
