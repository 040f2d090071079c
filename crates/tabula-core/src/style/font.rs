//! Font style types

use super::Color;

/// Font style settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontStyle {
    /// Font family name (e.g., "Calibri", "Arial")
    pub name: String,
    /// Font size in points
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub strikethrough: bool,
    pub color: Color,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            name: "Calibri".to_string(),
            size: 11.0,
            bold: false,
            italic: false,
            underline: Underline::None,
            strikethrough: false,
            color: Color::Auto,
        }
    }
}

impl FontStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_underline(mut self, underline: Underline) -> Self {
        self.underline = underline;
        self
    }

    pub fn with_strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = strikethrough;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Create a new font from this one, replacing every attribute the definition sets
    ///
    /// ```
    /// use tabula_core::style::{FontDef, FontStyle};
    ///
    /// let base = FontStyle::default();
    /// let heading = base.derive(&FontDef::new().size(14.0).bold(true));
    /// assert_eq!(heading.name, "Calibri");
    /// assert_eq!(heading.size, 14.0);
    /// assert!(heading.bold);
    /// ```
    pub fn derive(&self, def: &FontDef) -> FontStyle {
        FontStyle {
            name: def.family.clone().unwrap_or_else(|| self.name.clone()),
            size: def.size.unwrap_or(self.size),
            bold: def.bold.unwrap_or(self.bold),
            italic: def.italic.unwrap_or(self.italic),
            underline: def.underline.unwrap_or(self.underline),
            strikethrough: def.strikethrough.unwrap_or(self.strikethrough),
            color: def.color.unwrap_or(self.color),
        }
    }

    /// Width of a rendered string in character units, scaled from the 11pt default
    pub fn text_width(&self, text: &str) -> f64 {
        let widest = text
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0) as f64;
        let bold_factor = if self.bold { 1.1 } else { 1.0 };
        widest * bold_factor * self.size / 11.0
    }
}

impl std::hash::Hash for FontStyle {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.size.to_bits().hash(state);
        self.bold.hash(state);
        self.italic.hash(state);
        self.underline.hash(state);
        self.strikethrough.hash(state);
        self.color.hash(state);
    }
}

impl Eq for FontStyle {}

/// Underline style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Underline {
    #[default]
    None,
    Single,
    Double,
}

/// A partial font definition
///
/// Unset attributes are inherited from the font being derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FontDef {
    pub family: Option<String>,
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<Underline>,
    pub strikethrough: Option<bool>,
    pub color: Option<Color>,
}

impl FontDef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family<S: Into<String>>(mut self, family: S) -> Self {
        self.family = Some(family.into());
        self
    }

    pub fn size(mut self, size: f64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn bold(mut self, bold: bool) -> Self {
        self.bold = Some(bold);
        self
    }

    pub fn italic(mut self, italic: bool) -> Self {
        self.italic = Some(italic);
        self
    }

    pub fn underline(mut self, underline: Underline) -> Self {
        self.underline = Some(underline);
        self
    }

    pub fn strikethrough(mut self, strikethrough: bool) -> Self {
        self.strikethrough = Some(strikethrough);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Parse a CSS-like font definition: `"color: #FF0000; font-size: 12pt; font-weight: bold"`
    ///
    /// Unknown properties are ignored.
    pub fn parse_css(css: &str) -> Self {
        let mut def = FontDef::new();
        for rule in css.split(';') {
            let Some((key, value)) = rule.split_once(':') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "color" => def.color = Color::from_hex(value),
                "font-family" => def.family = Some(value.trim_matches(|c| c == '"' || c == '\'').to_string()),
                "font-size" => {
                    def.size = value.trim_end_matches("pt").trim().parse().ok();
                }
                "font-weight" => def.bold = Some(value.eq_ignore_ascii_case("bold")),
                "font-style" => def.italic = Some(value.eq_ignore_ascii_case("italic")),
                "text-decoration" => {
                    let value = value.to_ascii_lowercase();
                    if value.contains("underline") {
                        def.underline = Some(Underline::Single);
                    }
                    if value.contains("line-through") {
                        def.strikethrough = Some(true);
                    }
                    if value == "none" {
                        def.underline = Some(Underline::None);
                        def.strikethrough = Some(false);
                    }
                }
                _ => {}
            }
        }
        def
    }
}
