//! Workbook type - the main document structure

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::event::{Listener, WorkbookEvent};
use crate::format::Locale;
use crate::sheet::Sheet;
use crate::style::{Style, StyleId, StyleRegistry};
use crate::MAX_SHEET_NAME_LEN;

/// Which representation backs a workbook
///
/// Writers dispatch on this tag to decide between serializing directly and
/// copying into a workbook of their own kind first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BackingKind {
    /// Plain in-memory model
    #[default]
    Generic,
    /// Model read from, or created for, an XLSX container
    Xlsx,
    /// Append-only model whose rows are flushed to an XLSX stream
    Streaming,
}

/// A workbook (spreadsheet document)
///
/// A workbook holds its sheets, the named styles they share and the current-sheet
/// cursor. Structural changes are reported to subscribed listeners.
pub struct Workbook {
    sheets: Vec<Sheet>,
    styles: Arc<StyleRegistry>,
    /// Valid index whenever sheets exist
    current_sheet: Option<usize>,
    /// Default location for saving
    path: Option<PathBuf>,
    locale: Locale,
    kind: BackingKind,
    listeners: Vec<Listener>,
    closed: bool,
}

impl Workbook {
    /// Create an empty in-memory workbook
    pub fn new() -> Self {
        Self::with_kind(BackingKind::Generic)
    }

    /// Create an empty workbook tagged with a backing kind
    pub fn with_kind(kind: BackingKind) -> Self {
        Self {
            sheets: Vec::new(),
            styles: Arc::new(StyleRegistry::new()),
            current_sheet: None,
            path: None,
            locale: Locale::default(),
            kind,
            listeners: Vec::new(),
            closed: false,
        }
    }

    pub fn kind(&self) -> BackingKind {
        self.kind
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn set_path<P: Into<PathBuf>>(&mut self, path: Option<P>) {
        self.path = path.map(Into::into);
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Set the locale used for rendering, on the workbook and every sheet
    pub fn set_locale(&mut self, locale: Locale) {
        self.locale = locale;
        for sheet in &mut self.sheets {
            sheet.set_locale(locale);
        }
    }

    pub fn styles(&self) -> &Arc<StyleRegistry> {
        &self.styles
    }

    // === Sheets ===

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    /// Mutable access to a sheet; fails once the workbook is closed
    pub fn sheet_mut(&mut self, index: usize) -> Result<&mut Sheet> {
        self.ensure_open()?;
        let count = self.sheets.len();
        self.sheets
            .get_mut(index)
            .ok_or(Error::SheetOutOfBounds(index, count))
    }

    /// Get a sheet by name (case-insensitive)
    pub fn sheet_by_name(&self, name: &str) -> Option<&Sheet> {
        self.sheet_index(name).and_then(|i| self.sheets.get(i))
    }

    pub fn sheet_by_name_mut(&mut self, name: &str) -> Result<&mut Sheet> {
        self.ensure_open()?;
        let index = self
            .sheet_index(name)
            .ok_or_else(|| Error::SheetNotFound(name.to_string()))?;
        Ok(&mut self.sheets[index])
    }

    /// Get the index of a sheet by name (case-insensitive)
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        let name = name.to_lowercase();
        self.sheets.iter().position(|s| s.name().to_lowercase() == name)
    }

    pub fn sheets(&self) -> impl Iterator<Item = &Sheet> {
        self.sheets.iter()
    }

    pub fn sheets_mut(&mut self) -> Result<impl Iterator<Item = &mut Sheet>> {
        self.ensure_open()?;
        Ok(self.sheets.iter_mut())
    }

    /// Append a new sheet; the first sheet of a workbook becomes current
    ///
    /// ```
    /// use tabula_core::Workbook;
    ///
    /// let mut workbook = Workbook::new();
    /// for name in ["Test", "foo", "bar"] {
    ///     workbook.create_sheet(name).unwrap();
    /// }
    /// assert_eq!(workbook.sheet_count(), 3);
    /// assert_eq!(workbook.sheet_by_name("foo").unwrap().name(), "foo");
    /// assert!(workbook.create_sheet("FOO").is_err());
    /// ```
    pub fn create_sheet(&mut self, name: &str) -> Result<&mut Sheet> {
        self.ensure_open()?;
        self.validate_sheet_name(name)?;

        let index = self.sheets.len();
        let mut sheet = Sheet::new(name, Arc::clone(&self.styles));
        sheet.set_locale(self.locale);
        self.sheets.push(sheet);
        self.emit(WorkbookEvent::SheetAdded {
            index,
            name: name.to_string(),
        });

        if self.current_sheet.is_none() {
            self.current_sheet = Some(index);
            self.emit(WorkbookEvent::ActiveSheetChanged {
                old: None,
                new: Some(index),
            });
        }
        Ok(&mut self.sheets[index])
    }

    /// Remove a sheet by index
    ///
    /// The current sheet index is clamped to the remaining sheets.
    pub fn remove_sheet(&mut self, index: usize) -> Result<Sheet> {
        self.ensure_open()?;
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.sheets.len()));
        }

        let sheet = self.sheets.remove(index);
        self.emit(WorkbookEvent::SheetRemoved {
            index,
            name: sheet.name().to_string(),
        });

        let old = self.current_sheet;
        let new = match old {
            _ if self.sheets.is_empty() => None,
            Some(current) if current > index => Some(current - 1),
            Some(current) => Some(current.min(self.sheets.len() - 1)),
            None => Some(0),
        };
        if new != old {
            self.current_sheet = new;
            self.emit(WorkbookEvent::ActiveSheetChanged { old, new });
        }
        Ok(sheet)
    }

    /// Index of the current sheet; `None` only when there are no sheets
    pub fn current_sheet(&self) -> Option<usize> {
        self.current_sheet
    }

    pub fn current(&self) -> Option<&Sheet> {
        self.current_sheet.and_then(|i| self.sheets.get(i))
    }

    pub fn current_mut(&mut self) -> Result<&mut Sheet> {
        self.ensure_open()?;
        match self.current_sheet {
            Some(index) => self.sheet_mut(index),
            None => Err(Error::SheetOutOfBounds(0, 0)),
        }
    }

    pub fn set_current_sheet(&mut self, index: usize) -> Result<()> {
        self.ensure_open()?;
        if index >= self.sheets.len() {
            return Err(Error::SheetOutOfBounds(index, self.sheets.len()));
        }
        let old = self.current_sheet;
        if old != Some(index) {
            self.current_sheet = Some(index);
            self.emit(WorkbookEvent::ActiveSheetChanged {
                old,
                new: Some(index),
            });
        }
        Ok(())
    }

    // === Styles ===

    /// Get the style registered under `name`, creating it from the default style if absent
    pub fn cell_style(&self, name: &str) -> Result<StyleId> {
        self.ensure_open()?;
        Ok(self.styles.get_or_create(name))
    }

    /// Register `style` under `name`, overwriting an existing style of that name
    pub fn copy_cell_style(&self, name: &str, style: &Style) -> Result<StyleId> {
        self.ensure_open()?;
        Ok(self.styles.copy_style(name, style))
    }

    pub fn has_cell_style(&self, name: &str) -> bool {
        self.styles.contains(name)
    }

    pub fn cell_style_names(&self) -> Vec<String> {
        self.styles.names()
    }

    // === Events ===

    /// Register a listener for structural changes
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&WorkbookEvent) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    fn emit(&mut self, event: WorkbookEvent) {
        log::trace!("workbook event {:?}", event);
        for listener in &mut self.listeners {
            listener(&event);
        }
    }

    // === Copy and lifecycle ===

    /// Copy every style, then every sheet, of another workbook
    ///
    /// Works across backing kinds; all access goes through the public model.
    pub fn copy_from(&mut self, other: &Workbook) -> Result<()> {
        self.ensure_open()?;
        for (_, name, style) in other.styles.entries() {
            self.styles.copy_style(&name, &style);
        }
        for sheet in other.sheets() {
            self.create_sheet(sheet.name())?.copy_from(sheet)?;
        }
        if let Some(current) = other.current_sheet() {
            let offset = self.sheets.len() - other.sheet_count();
            self.set_current_sheet(offset + current)?;
        }
        Ok(())
    }

    /// Close the workbook; further mutations fail with [`Error::Closed`]
    ///
    /// Closing twice, or closing a workbook that was never opened from a file, is fine.
    pub fn close(&mut self) {
        if !self.closed {
            log::debug!("closing workbook {:?}", self.path);
            self.closed = true;
            self.listeners.clear();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(Error::Closed)
        } else {
            Ok(())
        }
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters): {}",
                MAX_SHEET_NAME_LEN, name
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}': {}",
                c, name
            )));
        }

        if self.sheet_index(name).is_some() {
            return Err(Error::DuplicateSheetName(name.into()));
        }
        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Workbook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workbook")
            .field("kind", &self.kind)
            .field("path", &self.path)
            .field("locale", &self.locale)
            .field("sheets", &self.sheets.iter().map(Sheet::name).collect::<Vec<_>>())
            .field("current_sheet", &self.current_sheet)
            .field("styles", &self.styles.len())
            .field("listeners", &self.listeners.len())
            .field("closed", &self.closed)
            .finish()
    }
}
