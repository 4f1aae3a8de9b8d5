//! Pluggable panel content
//!
//! The resolver and compositor only see the [`Content`] trait: a content
//! reports intrinsic size hints and renders itself to a string. Concrete
//! kinds decide whether they take part in the bias pass and which
//! attributes may be constrained on their panel.

use std::fmt;

use unicode_width::UnicodeWidthStr;

use super::constraint::{Attribute, Relation};
use crate::theme::Style;

/// One intrinsic bound on a panel extent, e.g. `width >= 12`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeHint {
    pub relation: Relation,
    pub value: f64,
}

impl SizeHint {
    pub fn at_least(value: f64) -> Self {
        Self {
            relation: Relation::Ge,
            value,
        }
    }

    pub fn exactly(value: f64) -> Self {
        Self {
            relation: Relation::Eq,
            value,
        }
    }
}

/// Intrinsic bounds for both extents; added as required constraints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SizeHints {
    pub width: Vec<SizeHint>,
    pub height: Vec<SizeHint>,
}

impl SizeHints {
    /// Minimum width and height
    pub fn minimum(width: usize, height: usize) -> Self {
        Self {
            width: vec![SizeHint::at_least(width as f64)],
            height: vec![SizeHint::at_least(height as f64)],
        }
    }

    /// Fixed width and height
    pub fn fixed(width: usize, height: usize) -> Self {
        Self {
            width: vec![SizeHint::exactly(width as f64)],
            height: vec![SizeHint::exactly(height as f64)],
        }
    }
}

/// Something a panel can show
pub trait Content {
    /// Intrinsic size bounds
    fn size_hints(&self) -> SizeHints;

    /// Render into a `width` x `height` box
    fn render(&mut self, width: usize, height: usize) -> String;

    /// Whether the panel joins the bias pass
    fn can_bias(&self) -> bool {
        true
    }

    /// Whether user constraints may target this attribute
    fn accepts(&self, _attribute: Attribute) -> bool {
        true
    }
}

/// Display size of a block of text
pub fn measure(text: &str) -> (usize, usize) {
    let width = text.lines().map(UnicodeWidthStr::width).max().unwrap_or(0);
    (width, text.lines().count())
}

fn styled_hints(text: &str, style: Option<&Style>) -> SizeHints {
    let (width, height) = measure(text);
    match style {
        Some(style) => SizeHints::minimum(width + style.frame_width(), height + style.frame_height()),
        None => SizeHints::minimum(width, height),
    }
}

fn styled_render(text: &str, style: Option<&Style>, width: usize, height: usize) -> String {
    match style {
        Some(style) => style.render(text, width, height),
        None => Style::default().render(text, width, height),
    }
}

/// Fixed text, optionally framed
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    text: String,
    style: Option<Style>,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl Content for Text {
    fn size_hints(&self) -> SizeHints {
        styled_hints(&self.text, self.style.as_ref())
    }

    fn render(&mut self, width: usize, height: usize) -> String {
        styled_render(&self.text, self.style.as_ref(), width, height)
    }
}

/// Empty region that still claims space
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Guide;

impl Content for Guide {
    fn size_hints(&self) -> SizeHints {
        SizeHints::minimum(0, 0)
    }

    fn render(&mut self, _width: usize, _height: usize) -> String {
        String::new()
    }
}

/// Zero-sized placeholder
///
/// Its size is pinned to zero, so constraints targeting its width or
/// height are skipped rather than fought.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hidden;

impl Content for Hidden {
    fn size_hints(&self) -> SizeHints {
        SizeHints::fixed(0, 0)
    }

    fn render(&mut self, _width: usize, _height: usize) -> String {
        String::new()
    }

    fn can_bias(&self) -> bool {
        false
    }

    fn accepts(&self, attribute: Attribute) -> bool {
        !attribute.is_size()
    }
}

/// Text produced on demand by a caller closure
///
/// Hints are measured from the most recent output, so when the closure
/// starts producing a different size the owning layout turns dirty after
/// the next render.
pub struct View {
    produce: Box<dyn FnMut() -> String>,
    last: String,
    style: Option<Style>,
}

impl View {
    pub fn new(mut produce: impl FnMut() -> String + 'static) -> Self {
        let last = produce();
        Self {
            produce: Box::new(produce),
            last,
            style: None,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Output of the last call
    pub fn last(&self) -> &str {
        &self.last
    }
}

impl fmt::Debug for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("last", &self.last)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

impl Content for View {
    fn size_hints(&self) -> SizeHints {
        styled_hints(&self.last, self.style.as_ref())
    }

    fn render(&mut self, width: usize, height: usize) -> String {
        self.last = (self.produce)();
        styled_render(&self.last, self.style.as_ref(), width, height)
    }
}
