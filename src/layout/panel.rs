//! Panel nodes
//!
//! A panel is a named rectangle owned by a [`Layout`](super::Layout). It
//! carries one or more named contents, exactly one of which is current,
//! and remembers the geometry and size hints of the last resolve so the
//! layout can tell when it needs solving again.

use indexmap::IndexMap;

use super::constraint::{Attribute, Axis};
use super::content::{Content, Hidden, SizeHints};
use super::error::LayoutError;

/// Key under which [`Panel::new`] registers its first content
pub const DEFAULT_CONTENT: &str = "default";

/// Resolved integer rectangle in container cells
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Geometry {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl Geometry {
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> usize {
        self.x + self.width
    }

    pub fn bottom(&self) -> usize {
        self.y + self.height
    }

    pub fn position(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn extent(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    /// Zero width or zero height
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Lengths of the x and y intersections, if the rectangles overlap
    ///
    /// Rectangles that only share an edge do not overlap.
    pub fn overlap(&self, other: &Geometry) -> Option<(usize, usize)> {
        let x = self.right().min(other.right()).saturating_sub(self.x.max(other.x));
        let y = self.bottom().min(other.bottom()).saturating_sub(self.y.max(other.y));
        (x > 0 && y > 0).then_some((x, y))
    }
}

/// A named rectangle with selectable content
pub struct Panel {
    name: String,
    contents: IndexMap<String, Box<dyn Content>>,
    current: String,
    hidden: bool,
    can_hide: bool,
    geometry: Geometry,
    dirty: bool,
    /// Hints used by the last successful resolve
    resolved_hints: Option<SizeHints>,
}

impl Panel {
    /// Create a panel showing `content`, registered as [`DEFAULT_CONTENT`]
    pub fn new(name: impl Into<String>, content: impl Content + 'static) -> Self {
        let mut contents: IndexMap<String, Box<dyn Content>> = IndexMap::new();
        contents.insert(DEFAULT_CONTENT.to_string(), Box::new(content));
        Self {
            name: name.into(),
            contents,
            current: DEFAULT_CONTENT.to_string(),
            hidden: false,
            can_hide: true,
            geometry: Geometry::default(),
            dirty: true,
            resolved_hints: None,
        }
    }

    /// Add another selectable content
    pub fn with_content(mut self, key: &str, content: impl Content + 'static) -> Self {
        self.add_content(key, content);
        self
    }

    pub fn with_can_hide(mut self, can_hide: bool) -> Self {
        self.can_hide = can_hide;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add or replace a content; keys are case-insensitive
    pub fn add_content(&mut self, key: &str, content: impl Content + 'static) {
        let key = key.to_lowercase();
        if key == self.current {
            self.dirty = true;
        }
        self.contents.insert(key, Box::new(content));
    }

    /// Make another content current
    pub fn select(&mut self, key: &str) -> Result<(), LayoutError> {
        let key = key.to_lowercase();
        if !self.contents.contains_key(&key) {
            return Err(LayoutError::unknown_content(&self.name, key));
        }
        if key != self.current {
            tracing::debug!(panel = %self.name, content = %key, "content selected");
            self.current = key;
            self.dirty = true;
        }
        Ok(())
    }

    /// Key of the current content
    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn content_keys(&self) -> impl Iterator<Item = &str> {
        self.contents.keys().map(String::as_str)
    }

    /// Mutable access to the current content
    pub fn content_mut(&mut self) -> Option<&mut (dyn Content + 'static)> {
        self.contents.get_mut(&self.current).map(|c| c.as_mut())
    }

    /// Hide the panel; returns false when the panel cannot hide
    pub fn hide(&mut self) -> bool {
        if !self.can_hide {
            return false;
        }
        if !self.hidden {
            self.hidden = true;
            self.dirty = true;
        }
        true
    }

    pub fn unhide(&mut self) {
        if self.hidden {
            self.hidden = false;
            self.dirty = true;
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn can_hide(&self) -> bool {
        self.can_hide
    }

    pub fn set_can_hide(&mut self, can_hide: bool) {
        self.can_hide = can_hide;
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Intrinsic hints of whatever the panel currently shows
    pub fn size_hints(&self) -> SizeHints {
        match self.active() {
            Some(content) => content.size_hints(),
            None => Hidden.size_hints(),
        }
    }

    pub fn can_bias(&self) -> bool {
        self.active().map_or(false, |c| c.can_bias())
    }

    /// Whether user constraints may target `attribute` on this panel
    pub fn accepts(&self, attribute: Attribute) -> bool {
        match self.active() {
            Some(content) => content.accepts(attribute),
            None => Hidden.accepts(attribute),
        }
    }

    /// Render the current content into the panel's rectangle
    pub fn render(&mut self) -> String {
        let Geometry { width, height, .. } = self.geometry;
        if self.hidden || width == 0 || height == 0 {
            return String::new();
        }
        match self.contents.get_mut(&self.current) {
            Some(content) => content.render(width, height),
            None => String::new(),
        }
    }

    /// Explicitly flagged, or the content's hints changed since the last resolve
    pub fn is_dirty(&self) -> bool {
        self.dirty || self.resolved_hints.as_ref() != Some(&self.size_hints())
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Store solved geometry; returns true when the position moved
    pub(crate) fn set_geometry(&mut self, geometry: Geometry) -> bool {
        let moved = (geometry.x, geometry.y) != (self.geometry.x, self.geometry.y);
        if geometry != self.geometry {
            tracing::trace!(
                panel = %self.name,
                x = geometry.x,
                y = geometry.y,
                width = geometry.width,
                height = geometry.height,
                "geometry updated"
            );
        }
        self.geometry = geometry;
        moved
    }

    /// Remember the hints this resolve was based on
    pub(crate) fn mark_resolved(&mut self, hints: SizeHints) {
        self.resolved_hints = Some(hints);
        self.dirty = false;
    }

    fn active(&self) -> Option<&dyn Content> {
        if self.hidden {
            return None;
        }
        self.contents.get(&self.current).map(|c| c.as_ref())
    }
}

impl std::fmt::Debug for Panel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Panel")
            .field("name", &self.name)
            .field("contents", &self.contents.keys().collect::<Vec<_>>())
            .field("current", &self.current)
            .field("hidden", &self.hidden)
            .field("geometry", &self.geometry)
            .field("dirty", &self.is_dirty())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::content::{Guide, Text};

    #[test]
    fn test_overlap_ignores_shared_edges() {
        let a = Geometry::new(0, 0, 50, 10);
        let b = Geometry::new(50, 0, 50, 10);
        let c = Geometry::new(40, 5, 20, 10);
        assert_eq!(a.overlap(&b), None);
        assert_eq!(a.overlap(&c), Some((10, 5)));
        assert_eq!(b.overlap(&c), Some((10, 5)));
    }

    #[test]
    fn test_select_marks_dirty() {
        let mut panel = Panel::new("side", Text::new("ab")).with_content("Wide", Text::new("abcdef"));
        panel.mark_resolved(panel.size_hints());
        assert!(!panel.is_dirty());

        panel.select("wide").unwrap();
        assert_eq!(panel.current(), "wide");
        assert!(panel.is_dirty());
    }

    #[test]
    fn test_select_unknown_content() {
        let mut panel = Panel::new("side", Guide);
        let err = panel.select("missing").unwrap_err();
        assert_eq!(err.to_string(), "invalid content 'missing' for panel 'side'");
    }

    #[test]
    fn test_hint_change_marks_dirty() {
        let mut panel = Panel::new("status", Text::new("ok"));
        panel.mark_resolved(panel.size_hints());
        assert!(!panel.is_dirty());

        panel.add_content("default", Text::new("a much longer line"));
        assert!(panel.is_dirty());
    }

    #[test]
    fn test_hide_respects_can_hide() {
        let mut panel = Panel::new("menu", Text::new("menu")).with_can_hide(false);
        assert!(!panel.hide());
        assert!(!panel.is_hidden());

        panel.set_can_hide(true);
        assert!(panel.hide());
        assert!(panel.is_hidden());
        assert!(!panel.can_bias());
        assert!(!panel.accepts(Attribute::Width));
        assert_eq!(panel.size_hints(), SizeHints::fixed(0, 0));

        panel.unhide();
        assert!(panel.can_bias());
    }

    #[test]
    fn test_set_geometry_reports_moves() {
        let mut panel = Panel::new("a", Guide);
        assert!(!panel.set_geometry(Geometry::new(0, 0, 5, 5)));
        assert!(panel.set_geometry(Geometry::new(3, 0, 5, 5)));
        assert!(!panel.set_geometry(Geometry::new(3, 0, 8, 2)));
    }

    #[test]
    fn test_render_hidden_is_empty() {
        let mut panel = Panel::new("a", Text::new("abc"));
        panel.set_geometry(Geometry::new(0, 0, 3, 1));
        assert_eq!(panel.render(), "abc");
        panel.hide();
        assert_eq!(panel.render(), "");
    }
}
