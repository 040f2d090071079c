//! File types and the registry resolving paths to them

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tabula_core::{BackingKind, OptionKey};

use crate::codec::{
    CsvCodec, HtmlCodec, WorkbookFactory, WorkbookReader, WorkbookWriter, XlsxCodec,
};

/// What a file type can do
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpenMode {
    Read,
    Write,
    ReadWrite,
}

impl OpenMode {
    pub fn can_read(self) -> bool {
        matches!(self, OpenMode::Read | OpenMode::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::ReadWrite)
    }
}

/// A file format: its extensions, its backing kind and its codec
#[derive(Clone)]
pub struct FileType {
    description: String,
    mode: OpenMode,
    extensions: Vec<String>,
    kind: BackingKind,
    options: Vec<OptionKey>,
    factory: Arc<dyn WorkbookFactory>,
    reader: Arc<dyn WorkbookReader>,
    writer: Arc<dyn WorkbookWriter>,
}

impl FileType {
    /// A file type served by one codec; extensions are given without the dot
    pub fn new<C>(
        description: &str,
        mode: OpenMode,
        extensions: &[&str],
        kind: BackingKind,
        options: &[OptionKey],
        codec: C,
    ) -> Self
    where
        C: WorkbookFactory + WorkbookReader + WorkbookWriter + 'static,
    {
        let codec = Arc::new(codec);
        Self {
            description: description.to_string(),
            mode,
            extensions: extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
            kind,
            options: options.to_vec(),
            factory: codec.clone(),
            reader: codec.clone(),
            writer: codec,
        }
    }

    /// The XLSX container
    pub fn xlsx() -> Self {
        Self::new(
            "Excel Workbook",
            OpenMode::ReadWrite,
            &["xlsx", "xlsm"],
            BackingKind::Xlsx,
            &[OptionKey::Locale],
            XlsxCodec,
        )
    }

    /// Delimited text
    pub fn csv() -> Self {
        Self::new(
            "CSV",
            OpenMode::ReadWrite,
            &["csv", "txt"],
            BackingKind::Generic,
            &[
                OptionKey::Delimiter,
                OptionKey::TextQualifier,
                OptionKey::Charset,
                OptionKey::Locale,
                OptionKey::DateFormat,
            ],
            CsvCodec,
        )
    }

    /// HTML export; cannot be read back
    pub fn html() -> Self {
        Self::new(
            "HTML",
            OpenMode::Write,
            &["html", "htm"],
            BackingKind::Generic,
            &[OptionKey::Locale],
            HtmlCodec,
        )
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn open_mode(&self) -> OpenMode {
        self.mode
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn backing_kind(&self) -> BackingKind {
        self.kind
    }

    /// Options this type's codec honors
    pub fn supported_options(&self) -> &[OptionKey] {
        &self.options
    }

    pub fn factory(&self) -> &dyn WorkbookFactory {
        self.factory.as_ref()
    }

    pub fn reader(&self) -> &dyn WorkbookReader {
        self.reader.as_ref()
    }

    pub fn writer(&self) -> &dyn WorkbookWriter {
        self.writer.as_ref()
    }

    /// Case-insensitive extension match
    pub fn matches_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(extension))
    }
}

impl fmt::Debug for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileType")
            .field("description", &self.description)
            .field("mode", &self.mode)
            .field("extensions", &self.extensions)
            .field("kind", &self.kind)
            .finish()
    }
}

impl PartialEq for FileType {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
            && self.extensions == other.extensions
            && self.kind == other.kind
    }
}

/// Known file types, looked up by extension
#[derive(Debug, Clone, Default)]
pub struct FileTypeRegistry {
    types: Vec<FileType>,
}

impl FileTypeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the XLSX, CSV and HTML types
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(FileType::xlsx());
        registry.register(FileType::csv());
        registry.register(FileType::html());
        registry
    }

    pub fn register(&mut self, file_type: FileType) {
        log::debug!("registering file type {}", file_type.description());
        self.types.push(file_type);
    }

    pub fn types(&self) -> &[FileType] {
        &self.types
    }

    /// The only type claiming `extension`
    ///
    /// Returns `None` when no type, or more than one, claims it.
    pub fn for_extension(&self, extension: &str) -> Option<&FileType> {
        let mut matches = self.types.iter().filter(|t| t.matches_extension(extension));
        let first = matches.next()?;
        if matches.next().is_some() {
            log::debug!("extension {} is ambiguous", extension);
            return None;
        }
        Some(first)
    }

    pub fn for_path<P: AsRef<Path>>(&self, path: P) -> Option<&FileType> {
        let extension = path.as_ref().extension()?.to_str()?;
        self.for_extension(extension)
    }

    /// Look up by the extension of the last path segment of a URI
    ///
    /// Query and fragment are ignored; a URI with no extension yields `None`.
    pub fn for_uri(&self, uri: &str) -> Option<&FileType> {
        let without_scheme = match uri.find("://") {
            Some(i) => &uri[i + 3..],
            None => uri,
        };
        let path = without_scheme
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or_default();
        let segment = path.rsplit('/').next().unwrap_or_default();
        let (stem, extension) = segment.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        self.for_extension(extension)
    }

    /// First type that can write workbooks of `kind` without conversion
    pub fn for_kind(&self, kind: BackingKind) -> Option<&FileType> {
        self.types.iter().find(|t| t.backing_kind() == kind)
    }
}
