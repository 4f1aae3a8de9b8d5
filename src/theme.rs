//! Themes: named frame and alignment styles for text panels
//!
//! A theme is a set of named [`Style`]s. Styles decide how much room a
//! panel's frame takes (which feeds the panel's size hints) and how text is
//! laid out inside it. Colors are left to whatever draws the final frame.
//!
//! Themes load from TOML:
//!
//! ```toml
//! [metadata]
//! name = "Boxy"
//!
//! [flavour]
//! border = "double"
//! align_x = "center"
//!
//! [styles.menu]
//! extends = "primary_noalign"
//! padding = [0, 1]
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Style every theme falls back to
pub const PRIMARY: &str = "primary";

/// Errors that can occur when loading or parsing themes
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to read theme file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse theme TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("style '{style}' extends unknown style '{base}'")]
    UnknownBase { style: String, base: String },
}

/// Frame line set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    #[default]
    None,
    Normal,
    Rounded,
    Double,
    Thick,
}

struct BorderGlyphs {
    top: char,
    bottom: char,
    left: char,
    right: char,
    top_left: char,
    top_right: char,
    bottom_left: char,
    bottom_right: char,
}

impl Border {
    fn glyphs(self) -> Option<BorderGlyphs> {
        let (h, v, tl, tr, bl, br) = match self {
            Border::None => return None,
            Border::Normal => ('─', '│', '┌', '┐', '└', '┘'),
            Border::Rounded => ('─', '│', '╭', '╮', '╰', '╯'),
            Border::Double => ('═', '║', '╔', '╗', '╚', '╝'),
            Border::Thick => ('━', '┃', '┏', '┓', '┗', '┛'),
        };
        Some(BorderGlyphs {
            top: h,
            bottom: h,
            left: v,
            right: v,
            top_left: tl,
            top_right: tr,
            bottom_left: bl,
            bottom_right: br,
        })
    }

    /// Cells taken on each side
    pub fn thickness(self) -> usize {
        match self {
            Border::None => 0,
            _ => 1,
        }
    }
}

/// Placement of text along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    #[serde(alias = "left", alias = "top")]
    Start,
    Center,
    #[serde(alias = "right", alias = "bottom")]
    End,
}

impl Align {
    /// Offset of an item of `size` inside `room`
    pub fn offset(self, size: usize, room: usize) -> usize {
        let free = room.saturating_sub(size);
        match self {
            Align::Start => 0,
            Align::Center => free / 2,
            Align::End => free,
        }
    }
}

/// Inner spacing between frame and text
///
/// Deserializes from one, two or four numbers, CSS style:
/// `[all]`, `[vertical, horizontal]`, `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>")]
pub struct Padding {
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
    pub left: usize,
}

impl Padding {
    pub fn new(top: usize, right: usize, bottom: usize, left: usize) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

impl TryFrom<Vec<usize>> for Padding {
    type Error = String;

    fn try_from(values: Vec<usize>) -> Result<Self, Self::Error> {
        match values.as_slice() {
            [all] => Ok(Padding::new(*all, *all, *all, *all)),
            [v, h] => Ok(Padding::new(*v, *h, *v, *h)),
            [t, r, b, l] => Ok(Padding::new(*t, *r, *b, *l)),
            other => Err(format!(
                "padding takes 1, 2 or 4 values, got {}",
                other.len()
            )),
        }
    }
}

/// Frame and alignment of a text panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Style {
    pub border: Border,
    pub align_x: Align,
    pub align_y: Align,
    pub padding: Padding,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn with_align(mut self, align_x: Align, align_y: Align) -> Self {
        self.align_x = align_x;
        self.align_y = align_y;
        self
    }

    pub fn with_padding(mut self, padding: Padding) -> Self {
        self.padding = padding;
        self
    }

    /// Horizontal cells taken by border and padding
    pub fn frame_width(&self) -> usize {
        2 * self.border.thickness() + self.padding.left + self.padding.right
    }

    /// Vertical cells taken by border and padding
    pub fn frame_height(&self) -> usize {
        2 * self.border.thickness() + self.padding.top + self.padding.bottom
    }

    /// Lay `text` out in a `width` x `height` box
    ///
    /// The result always has exactly `height` lines of `width` cells. Text
    /// that does not fit is clipped; the frame is dropped when the box is
    /// too small to hold it.
    pub fn render(&self, text: &str, width: usize, height: usize) -> String {
        if width == 0 || height == 0 {
            return String::new();
        }
        let glyphs = if width >= 2 && height >= 2 {
            self.border.glyphs()
        } else {
            None
        };
        let edge = usize::from(glyphs.is_some());

        let inner_w = width.saturating_sub(2 * edge + self.padding.left + self.padding.right);
        let inner_h = height.saturating_sub(2 * edge + self.padding.top + self.padding.bottom);
        let lines: Vec<&str> = text.lines().take(inner_h).collect();
        let top = edge + self.padding.top + self.align_y.offset(lines.len(), inner_h);

        let mut rows = Vec::with_capacity(height);
        for row in 0..height {
            let mut out = String::with_capacity(width);
            let body = row.checked_sub(top).and_then(|i| lines.get(i));
            match &glyphs {
                Some(g) if row == 0 => {
                    push_rule(&mut out, g.top_left, g.top, g.top_right, width);
                }
                Some(g) if row == height - 1 => {
                    push_rule(&mut out, g.bottom_left, g.bottom, g.bottom_right, width);
                }
                _ => {
                    if let Some(g) = &glyphs {
                        out.push(g.left);
                    }
                    let (clipped, used) = clip(body.copied().unwrap_or(""), inner_w);
                    let room = width - 2 * edge;
                    let before = (self.padding.left + self.align_x.offset(used, inner_w)).min(room);
                    push_blank(&mut out, before);
                    out.push_str(&clipped);
                    push_blank(&mut out, room.saturating_sub(before + used));
                    if let Some(g) = &glyphs {
                        out.push(g.right);
                    }
                }
            }
            rows.push(out);
        }
        rows.join("\n")
    }
}

fn push_rule(out: &mut String, start: char, fill: char, end: char, width: usize) {
    out.push(start);
    for _ in 0..width.saturating_sub(2) {
        out.push(fill);
    }
    out.push(end);
}

fn push_blank(out: &mut String, count: usize) {
    out.extend(std::iter::repeat(' ').take(count));
}

/// Truncate `line` to at most `width` display cells
pub(crate) fn clip(line: &str, width: usize) -> (String, usize) {
    if line.width() <= width {
        return (line.to_string(), line.width());
    }
    let mut out = String::new();
    let mut used = 0;
    for c in line.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    (out, used)
}

/// Partial style used to derive one style from another
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct StyleOverride {
    pub extends: Option<String>,
    pub border: Option<Border>,
    pub align_x: Option<Align>,
    pub align_y: Option<Align>,
    pub padding: Option<Padding>,
}

impl StyleOverride {
    pub fn is_empty(&self) -> bool {
        self.border.is_none()
            && self.align_x.is_none()
            && self.align_y.is_none()
            && self.padding.is_none()
    }

    pub fn apply(&self, base: Style) -> Style {
        Style {
            border: self.border.unwrap_or(base.border),
            align_x: self.align_x.unwrap_or(base.align_x),
            align_y: self.align_y.unwrap_or(base.align_y),
            padding: self.padding.unwrap_or(base.padding),
        }
    }
}

/// A named set of styles
#[derive(Debug, Clone)]
pub struct Theme {
    /// Optional name for the theme
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    styles: IndexMap<String, Style>,
}

/// TOML structure for deserializing themes
#[derive(Deserialize)]
struct TomlTheme {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    flavour: Flavour,
    #[serde(default)]
    styles: IndexMap<String, StyleOverride>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Frame settings the preset styles are generated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Flavour {
    pub border: Border,
    pub align_x: Align,
    pub align_y: Align,
}

impl Default for Flavour {
    fn default() -> Self {
        Self {
            border: Border::Rounded,
            align_x: Align::Center,
            align_y: Align::Center,
        }
    }
}

impl Flavour {
    /// The four preset styles: framed or not, aligned or not
    pub fn presets(&self) -> IndexMap<String, Style> {
        let framed = Style::new().with_border(self.border);
        let aligned = |s: Style| s.with_align(self.align_x, self.align_y);
        IndexMap::from([
            (PRIMARY.to_string(), aligned(framed)),
            ("primary_noborder".to_string(), aligned(Style::new())),
            ("primary_noalign".to_string(), framed),
            ("primary_noborder_noalign".to_string(), Style::new()),
        ])
    }
}

impl Theme {
    /// Theme holding the presets generated from `flavour`
    pub fn from_flavour(flavour: Flavour) -> Self {
        Self {
            name: None,
            description: None,
            styles: flavour.presets(),
        }
    }

    /// Load theme from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load theme from TOML string
    pub fn from_str(content: &str) -> Result<Self, ThemeError> {
        let parsed: TomlTheme = toml::from_str(content)?;

        let mut theme = Theme::from_flavour(parsed.flavour);
        theme.name = parsed.metadata.as_ref().and_then(|m| m.name.clone());
        theme.description = parsed.metadata.as_ref().and_then(|m| m.description.clone());

        for (name, spec) in parsed.styles {
            let base = match &spec.extends {
                Some(base) => *theme.style(base).ok_or_else(|| ThemeError::UnknownBase {
                    style: name.clone(),
                    base: base.clone(),
                })?,
                None => theme.style(&name).copied().unwrap_or_default(),
            };
            theme.styles.insert(name, spec.apply(base));
        }
        Ok(theme)
    }

    /// Add or replace a style
    pub fn with_style(mut self, name: impl Into<String>, style: Style) -> Self {
        self.styles.insert(name.into(), style);
        self
    }

    /// Look up a style by name
    pub fn style(&self, name: &str) -> Option<&Style> {
        self.styles.get(name)
    }

    /// Look up a style, falling back to [`PRIMARY`]
    pub fn style_or_default(&self, name: &str) -> Style {
        if let Some(style) = self.style(name) {
            return *style;
        }
        tracing::warn!(style = name, "unknown style, using '{}'", PRIMARY);
        self.style(PRIMARY).copied().unwrap_or_default()
    }

    pub fn style_names(&self) -> impl Iterator<Item = &str> {
        self.styles.keys().map(String::as_str)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_flavour(Flavour::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_theme_presets() {
        let theme = Theme::default();
        let names: Vec<_> = theme.style_names().collect();
        assert_eq!(
            names,
            vec![
                "primary",
                "primary_noborder",
                "primary_noalign",
                "primary_noborder_noalign"
            ]
        );
        let primary = theme.style("primary").unwrap();
        assert_eq!(primary.border, Border::Rounded);
        assert_eq!(primary.align_x, Align::Center);
    }

    #[test]
    fn test_frame_size() {
        let style = Style::new()
            .with_border(Border::Normal)
            .with_padding(Padding::new(0, 1, 0, 2));
        assert_eq!(style.frame_width(), 5);
        assert_eq!(style.frame_height(), 2);
        assert_eq!(Style::new().frame_width(), 0);
    }

    #[test]
    fn test_render_plain_clips_and_pads() {
        let out = Style::new().render("hello\nworld\nagain", 4, 2);
        assert_eq!(out, "hell\nworl");
        let out = Style::new().render("hi", 4, 2);
        assert_eq!(out, "hi  \n    ");
    }

    #[test]
    fn test_render_framed_centered() {
        let style = Style::new()
            .with_border(Border::Normal)
            .with_align(Align::Center, Align::Center);
        let out = style.render("ab", 6, 3);
        assert_eq!(out, "┌────┐\n│ ab │\n└────┘");
    }

    #[test]
    fn test_render_end_aligned() {
        let style = Style::new().with_align(Align::End, Align::End);
        assert_eq!(style.render("x", 3, 2), "   \n  x");
    }

    #[test]
    fn test_render_drops_frame_when_too_small() {
        let style = Style::new().with_border(Border::Double);
        assert_eq!(style.render("abc", 3, 1), "abc");
    }

    #[test]
    fn test_clip_wide_glyphs() {
        let (clipped, used) = clip("日本語", 5);
        assert_eq!(clipped, "日本");
        assert_eq!(used, 4);
    }

    #[test]
    fn test_parse_toml_with_flavour_and_styles() {
        let toml_str = r#"
[metadata]
name = "Boxy"

[flavour]
border = "double"

[styles.menu]
extends = "primary_noalign"
padding = [0, 1]

[styles.status]
align_x = "right"
"#;
        let theme = Theme::from_str(toml_str).expect("Should parse");
        assert_eq!(theme.name, Some("Boxy".to_string()));
        assert_eq!(theme.style("primary").unwrap().border, Border::Double);

        let menu = theme.style("menu").unwrap();
        assert_eq!(menu.border, Border::Double);
        assert_eq!(menu.align_x, Align::Start);
        assert_eq!(menu.padding, Padding::new(0, 1, 0, 1));

        let status = theme.style("status").unwrap();
        assert_eq!(status.border, Border::None);
        assert_eq!(status.align_x, Align::End);
    }

    #[test]
    fn test_unknown_base_error() {
        let err = Theme::from_str("[styles.a]\nextends = \"nope\"\n").unwrap_err();
        assert!(matches!(err, ThemeError::UnknownBase { .. }));
    }

    #[test]
    fn test_style_or_default_fallback() {
        let theme = Theme::default();
        assert_eq!(
            theme.style_or_default("missing"),
            *theme.style(PRIMARY).unwrap()
        );
    }

    #[test]
    fn test_invalid_toml_error() {
        assert!(Theme::from_str("this is not valid toml {{{{").is_err());
        assert!(Theme::from_str("[styles.a]\npadding = [1, 2, 3]\n").is_err());
    }
}
