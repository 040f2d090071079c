//! Reader/writer pipeline
//!
//! [`write_workbook`] decides between serializing a workbook directly and
//! copying it into the writer's own representation first. [`Document`] wraps a
//! workbook in the open/write/close life cycle.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tabula_core::{BackingKind, IoOptions, Progress, Workbook};

use crate::codec::{ReadSeek, WriteSeek};
use crate::error::{Error, Result};
use crate::file_type::{FileType, FileTypeRegistry};

/// Write `workbook` as `file_type`
///
/// The workbook is never mutated. Streaming workbooks have flushed their rows
/// and cannot be written again.
pub fn write_workbook(
    workbook: &Workbook,
    file_type: &FileType,
    out: &mut dyn WriteSeek,
    options: &IoOptions,
    progress: &mut Progress<'_>,
) -> Result<()> {
    workbook.ensure_open()?;
    if !file_type.open_mode().can_write() {
        return Err(Error::UnsupportedFileType(format!(
            "{} is read-only",
            file_type.description()
        )));
    }
    let kind = workbook.kind();
    if kind == BackingKind::Streaming {
        return Err(Error::lifecycle(
            "a streaming workbook cannot be re-read for writing",
        ));
    }

    let writer = file_type.writer();
    if writer.accepts(kind) {
        log::debug!("writing {:?} workbook directly as {}", kind, file_type.description());
        writer.write_direct(workbook, out, options, progress)
    } else {
        log::debug!(
            "copying {:?} workbook into {:?} to write as {}",
            kind,
            writer.target_kind(),
            file_type.description()
        );
        writer.write_converted(workbook, out, options, progress)
    }
}

/// Write `workbook` to `path`, resolving the file type from its extension
pub fn save_workbook(
    workbook: &Workbook,
    registry: &FileTypeRegistry,
    path: &Path,
    options: &IoOptions,
    progress: &mut Progress<'_>,
) -> Result<()> {
    let file_type = resolve(registry, path)?;
    let mut out = BufWriter::new(File::create(path)?);
    write_workbook(workbook, file_type, &mut out, options, progress)?;
    out.flush()?;
    Ok(())
}

/// Open `path`, resolving the file type from its extension
pub fn open_workbook(
    registry: &FileTypeRegistry,
    path: &Path,
    options: &IoOptions,
    progress: &mut Progress<'_>,
) -> Result<Workbook> {
    let file_type = resolve(registry, path)?;
    if !file_type.open_mode().can_read() {
        return Err(Error::UnsupportedFileType(format!(
            "{} is write-only",
            file_type.description()
        )));
    }
    log::debug!("opening {} as {}", path.display(), file_type.description());
    file_type.factory().open(path, options, progress)
}

fn resolve<'r>(registry: &'r FileTypeRegistry, path: &Path) -> Result<&'r FileType> {
    registry
        .for_path(path)
        .ok_or_else(|| Error::UnsupportedFileType(path.display().to_string()))
}

/// Where a [`Document`] is in its life cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentState {
    Unopened,
    Reading,
    Ready,
    Writing,
    Closed,
}

/// A workbook moving through open, write and close
///
/// A failed open leaves the document unopened without a workbook. Writing
/// returns to `Ready` whether or not it succeeded.
#[derive(Debug)]
pub struct Document {
    state: DocumentState,
    workbook: Option<Workbook>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            state: DocumentState::Unopened,
            workbook: None,
        }
    }

    /// A ready document holding a new workbook from `file_type`'s factory
    pub fn create(file_type: &FileType) -> Self {
        Self::from_workbook(file_type.factory().create())
    }

    /// A ready document holding `workbook`
    pub fn from_workbook(workbook: Workbook) -> Self {
        Self {
            state: DocumentState::Ready,
            workbook: Some(workbook),
        }
    }

    pub fn state(&self) -> DocumentState {
        self.state
    }

    /// Open a file, resolving its type through `registry`
    pub fn open(
        &mut self,
        registry: &FileTypeRegistry,
        path: &Path,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        self.begin_read()?;
        let result = open_workbook(registry, path, options, progress);
        self.end_read(result)
    }

    /// Read a stream of a known file type
    pub fn read(
        &mut self,
        file_type: &FileType,
        input: &mut dyn ReadSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        self.begin_read()?;
        let result = file_type.reader().read(input, options, progress);
        self.end_read(result)
    }

    fn begin_read(&mut self) -> Result<()> {
        if self.state != DocumentState::Unopened {
            return Err(Error::lifecycle(format!(
                "cannot open a document that is {:?}",
                self.state
            )));
        }
        self.state = DocumentState::Reading;
        Ok(())
    }

    fn end_read(&mut self, result: Result<Workbook>) -> Result<()> {
        match result {
            Ok(workbook) => {
                self.workbook = Some(workbook);
                self.state = DocumentState::Ready;
                Ok(())
            }
            Err(e) => {
                self.state = DocumentState::Unopened;
                Err(e)
            }
        }
    }

    pub fn workbook(&self) -> Result<&Workbook> {
        match (&self.workbook, self.state) {
            (Some(workbook), DocumentState::Ready) => Ok(workbook),
            _ => Err(self.not_ready()),
        }
    }

    pub fn workbook_mut(&mut self) -> Result<&mut Workbook> {
        if self.state != DocumentState::Ready {
            return Err(self.not_ready());
        }
        self.workbook.as_mut().ok_or_else(|| Error::lifecycle("no workbook"))
    }

    /// Write the workbook as `file_type`
    pub fn write(
        &mut self,
        file_type: &FileType,
        out: &mut dyn WriteSeek,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        if self.state != DocumentState::Ready {
            return Err(self.not_ready());
        }
        self.state = DocumentState::Writing;
        let result = match &self.workbook {
            Some(workbook) => write_workbook(workbook, file_type, out, options, progress),
            None => Err(Error::lifecycle("no workbook")),
        };
        self.state = DocumentState::Ready;
        result
    }

    /// Write the workbook to `path`, resolving the type through `registry`
    pub fn save(
        &mut self,
        registry: &FileTypeRegistry,
        path: &Path,
        options: &IoOptions,
        progress: &mut Progress<'_>,
    ) -> Result<()> {
        let file_type = resolve(registry, path)?;
        let mut out = BufWriter::new(File::create(path)?);
        self.write(file_type, &mut out, options, progress)?;
        out.flush()?;
        Ok(())
    }

    /// Close the document and its workbook; closing again does nothing
    pub fn close(&mut self) {
        if let Some(workbook) = self.workbook.as_mut() {
            workbook.close();
        }
        self.state = DocumentState::Closed;
    }

    /// Take the workbook out of a ready document
    pub fn into_workbook(self) -> Result<Workbook> {
        if self.state != DocumentState::Ready {
            return Err(self.not_ready());
        }
        self.workbook.ok_or_else(|| Error::lifecycle("no workbook"))
    }

    fn not_ready(&self) -> Error {
        Error::lifecycle(format!("document is {:?}, not ready", self.state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;
    use tabula_xlsx::StreamingXlsxWorkbook;

    fn sample(kind: BackingKind) -> Workbook {
        let mut workbook = Workbook::with_kind(kind);
        let sheet = workbook.create_sheet("Data").unwrap();
        sheet.create_row(["name", "value"]).unwrap();
        sheet.create_row::<_, tabula_core::CellValue>(["a".into(), 1.5.into()]).unwrap();
        workbook
    }

    #[test]
    fn test_write_generic_as_xlsx() {
        let workbook = sample(BackingKind::Generic);
        let mut out = Cursor::new(Vec::new());
        write_workbook(
            &workbook,
            &FileType::xlsx(),
            &mut out,
            &IoOptions::default(),
            &mut Progress::none(),
        )
        .unwrap();
        out.set_position(0);
        let read = tabula_xlsx::XlsxReader::read(out).unwrap();
        assert_eq!(read.sheet(0).unwrap().cell(1, 1).unwrap().get_number().unwrap(), 1.5);
        // the source is untouched
        assert_eq!(workbook.kind(), BackingKind::Generic);
        assert!(!workbook.is_closed());
    }

    #[test]
    fn test_write_streaming_fails() {
        let mut streaming = StreamingXlsxWorkbook::new(Cursor::new(Vec::new()));
        streaming.create_sheet("S").unwrap();
        let err = write_workbook(
            streaming.workbook(),
            &FileType::csv(),
            &mut Cursor::new(Vec::new()),
            &IoOptions::default(),
            &mut Progress::none(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lifecycle);
    }

    #[test]
    fn test_write_closed_fails() {
        let mut workbook = sample(BackingKind::Xlsx);
        workbook.close();
        let err = write_workbook(
            &workbook,
            &FileType::xlsx(),
            &mut Cursor::new(Vec::new()),
            &IoOptions::default(),
            &mut Progress::none(),
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lifecycle);
    }

    #[test]
    fn test_document_states() {
        let mut document = Document::new();
        assert_eq!(document.state(), DocumentState::Unopened);
        assert!(document.workbook().is_err());

        let mut input = Cursor::new(b"not a zip".to_vec());
        let err = document
            .read(&FileType::xlsx(), &mut input, &IoOptions::default(), &mut Progress::none())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Format);
        assert_eq!(document.state(), DocumentState::Unopened);
        assert!(document.workbook().is_err());

        let mut input = Cursor::new(b"a,1\n".to_vec());
        document
            .read(&FileType::csv(), &mut input, &IoOptions::default(), &mut Progress::none())
            .unwrap();
        assert_eq!(document.state(), DocumentState::Ready);
        document.workbook_mut().unwrap().create_sheet("Extra").unwrap();

        // opening twice is refused
        let mut again = Cursor::new(b"b\n".to_vec());
        let err = document
            .read(&FileType::csv(), &mut again, &IoOptions::default(), &mut Progress::none())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lifecycle);

        let mut out = Cursor::new(Vec::new());
        document
            .write(&FileType::xlsx(), &mut out, &IoOptions::default(), &mut Progress::none())
            .unwrap();
        assert_eq!(document.state(), DocumentState::Ready);

        document.close();
        document.close();
        assert_eq!(document.state(), DocumentState::Closed);
        let err = document
            .write(&FileType::csv(), &mut out, &IoOptions::default(), &mut Progress::none())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lifecycle);
    }

    #[test]
    fn test_close_without_open() {
        let mut document = Document::default();
        document.close();
        assert_eq!(document.state(), DocumentState::Closed);
    }

    #[test]
    fn test_progress_is_monotonic() {
        let workbook = sample(BackingKind::Xlsx);
        let mut seen = Vec::new();
        let mut record = |p: f64| seen.push(p);
        write_workbook(
            &workbook,
            &FileType::csv(),
            &mut Cursor::new(Vec::new()),
            &IoOptions::default(),
            &mut Progress::new(&mut record),
        )
        .unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert!(seen.iter().all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(seen.last(), Some(&1.0));
    }
}
