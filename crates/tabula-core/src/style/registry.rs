//! Named style table shared by a workbook and its sheets

use super::{FontDef, NumberFormat, Style};
use ahash::AHashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Suffix of the style derived for DATE values set on a non-date style
pub const DATE_STYLE_SUFFIX: &str = "#DATE#";
/// Suffix of the style derived for DATE_TIME values set on a non-date style
pub const DATE_TIME_STYLE_SUFFIX: &str = "#DATETIME#";

/// Index of a style in its workbook's registry
///
/// Ids are stable for the lifetime of the registry; id 0 is the default style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StyleId(pub u32);

impl StyleId {
    /// The default style, named ""
    pub const DEFAULT: StyleId = StyleId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
struct Inner {
    names: Vec<String>,
    styles: Vec<Style>,
    by_name: AHashMap<String, StyleId>,
}

/// Per-workbook table of named cell styles
///
/// Changing a style through [`update`](Self::update) is visible to every cell holding its id.
/// The table is behind a lock so the workbook and its sheets can share one registry.
#[derive(Debug)]
pub struct StyleRegistry {
    inner: RwLock<Inner>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    /// Create a registry holding only the default style
    pub fn new() -> Self {
        let mut by_name = AHashMap::with_capacity(16);
        by_name.insert(String::new(), StyleId::DEFAULT);
        Self {
            inner: RwLock::new(Inner {
                names: vec![String::new()],
                styles: vec![Style::default()],
                by_name,
            }),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of registered styles, including the default
    pub fn len(&self) -> usize {
        self.read().styles.len()
    }

    /// Look up a style id by name
    pub fn id(&self, name: &str) -> Option<StyleId> {
        self.read().by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().by_name.contains_key(name)
    }

    /// Name of a style; unknown ids resolve to the default name
    pub fn name(&self, id: StyleId) -> String {
        self.read().names.get(id.index()).cloned().unwrap_or_default()
    }

    /// Snapshot of a style's properties; unknown ids resolve to the default style
    pub fn get(&self, id: StyleId) -> Style {
        let inner = self.read();
        inner
            .styles
            .get(id.index())
            .or_else(|| inner.styles.first())
            .cloned()
            .unwrap_or_default()
    }

    /// Read a style's properties without cloning
    pub fn with_style<R>(&self, id: StyleId, f: impl FnOnce(&Style) -> R) -> R {
        let inner = self.read();
        match inner.styles.get(id.index()) {
            Some(style) => f(style),
            None => f(&Style::default()),
        }
    }

    /// Style names in registration order
    pub fn names(&self) -> Vec<String> {
        self.read().names.clone()
    }

    /// `(id, name, style)` for every registered style, in id order
    pub fn entries(&self) -> Vec<(StyleId, String, Style)> {
        let inner = self.read();
        inner
            .names
            .iter()
            .zip(&inner.styles)
            .enumerate()
            .map(|(i, (name, style))| (StyleId(i as u32), name.clone(), style.clone()))
            .collect()
    }

    /// Get the style registered under `name`, creating it from the default style if absent
    pub fn get_or_create(&self, name: &str) -> StyleId {
        if let Some(id) = self.id(name) {
            return id;
        }
        let mut inner = self.write();
        // another handle may have registered it between the two locks
        if let Some(id) = inner.by_name.get(name) {
            return *id;
        }
        let style = inner.styles[0].clone();
        Self::insert(&mut inner, name, style)
    }

    /// Register `style` under `name`, overwriting the properties of an existing style
    ///
    /// An existing style keeps its id, so cells already using it see the new properties.
    pub fn copy_style(&self, name: &str, style: &Style) -> StyleId {
        let mut inner = self.write();
        match inner.by_name.get(name).copied() {
            Some(id) => {
                inner.styles[id.index()] = style.clone();
                id
            }
            None => Self::insert(&mut inner, name, style.clone()),
        }
    }

    /// Mutate a style in place
    pub fn update<R>(&self, id: StyleId, f: impl FnOnce(&mut Style) -> R) -> Option<R> {
        let mut inner = self.write();
        inner.styles.get_mut(id.index()).map(f)
    }

    /// Register `name` as a copy of `base` with its font derived from `def`
    pub fn derive_font(&self, name: &str, base: StyleId, def: &FontDef) -> StyleId {
        let style = self.get(base).derive_font(def);
        self.copy_style(name, &style)
    }

    /// The style to use when a DATE or DATE_TIME value is stored on a cell styled `id`
    ///
    /// Returns `id` itself when its format is already date-like; otherwise the
    /// `<name>#DATE#` (or `#DATETIME#`) variant, created on first use.
    pub fn date_variant(&self, id: StyleId, with_time: bool) -> StyleId {
        let (name, mut style) = {
            let inner = self.read();
            let Some(style) = inner.styles.get(id.index()) else {
                return id;
            };
            if style.number_format.is_date_format() {
                return id;
            }
            (inner.names[id.index()].clone(), style.clone())
        };

        let suffix = if with_time {
            DATE_TIME_STYLE_SUFFIX
        } else {
            DATE_STYLE_SUFFIX
        };
        let derived = format!("{}{}", name, suffix);
        if let Some(existing) = self.id(&derived) {
            return existing;
        }

        log::debug!("deriving date style '{}'", derived);
        style.number_format = if with_time {
            NumberFormat::datetime()
        } else {
            NumberFormat::date()
        };
        self.copy_style(&derived, &style)
    }

    /// Resolve a style of another registry in this one, by name
    ///
    /// The style is copied under its name when this registry does not know it yet.
    pub fn import(&self, source: &StyleRegistry, id: StyleId) -> StyleId {
        if std::ptr::eq(self, source) {
            return id;
        }
        let name = source.name(id);
        match self.id(&name) {
            Some(existing) => existing,
            None => self.copy_style(&name, &source.get(id)),
        }
    }

    fn insert(inner: &mut Inner, name: &str, style: Style) -> StyleId {
        let id = StyleId(inner.styles.len() as u32);
        inner.names.push(name.to_string());
        inner.styles.push(style);
        inner.by_name.insert(name.to_string(), id);
        id
    }
}
