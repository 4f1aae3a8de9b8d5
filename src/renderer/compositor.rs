//! Compositing a root layout and its overlays onto one canvas

use indexmap::IndexMap;
use serde::Deserialize;

use super::canvas::Canvas;
use super::config::CanvasConfig;
use crate::layout::{Geometry, Layout, LayoutError};

/// Size of an overlay along one axis, relative to its parent
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum OverlaySize {
    /// The whole parent extent
    #[default]
    Full,
    /// A fixed number of cells
    Fixed(usize),
    /// A percentage of the parent extent
    Percent(f64),
    /// The parent extent minus this many cells
    Inset(usize),
}

impl OverlaySize {
    /// Parse `"full"`, `"N%"` or a signed integer
    ///
    /// Positive integers are fixed sizes, negative ones insets and zero
    /// means full.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("full") {
            return Some(OverlaySize::Full);
        }
        if let Some(percent) = text.strip_suffix('%') {
            let value: f64 = percent.trim().parse().ok()?;
            return (value >= 0.0).then_some(OverlaySize::Percent(value));
        }
        text.parse::<i64>().ok().map(Self::from_cells)
    }

    pub fn from_cells(cells: i64) -> Self {
        match cells {
            0 => OverlaySize::Full,
            n if n < 0 => OverlaySize::Inset(n.unsigned_abs() as usize),
            n => OverlaySize::Fixed(n as usize),
        }
    }

    /// Cells taken out of `parent`, never more than `parent`
    pub fn resolve(self, parent: usize) -> usize {
        let size = match self {
            OverlaySize::Full => parent,
            OverlaySize::Fixed(n) => n,
            OverlaySize::Percent(p) => (parent as f64 * p / 100.0).round() as usize,
            OverlaySize::Inset(n) => parent.saturating_sub(n),
        };
        size.min(parent)
    }
}

/// Placement of an overlay along one axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    #[serde(alias = "left", alias = "top")]
    Start,
    #[default]
    Center,
    #[serde(alias = "right", alias = "bottom")]
    End,
}

impl Anchor {
    /// Offset of an extent of `size` inside `parent`, clamped into it
    pub fn offset(self, size: usize, parent: usize, margin: usize) -> usize {
        let room = parent.saturating_sub(size);
        let offset = match self {
            Anchor::Start => margin,
            Anchor::Center => room / 2 + margin,
            Anchor::End => room.saturating_sub(margin),
        };
        offset.min(room)
    }
}

/// A layout composited over the root
#[derive(Debug)]
pub struct Overlay {
    pub layout: Layout,
    pub z_index: i32,
    pub enabled: bool,
    pub width: OverlaySize,
    pub height: OverlaySize,
    pub x: Anchor,
    pub y: Anchor,
    pub margin: usize,
}

impl Overlay {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            z_index: 0,
            enabled: true,
            width: OverlaySize::Full,
            height: OverlaySize::Full,
            x: Anchor::Center,
            y: Anchor::Center,
            margin: 0,
        }
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_size(mut self, width: OverlaySize, height: OverlaySize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_anchor(mut self, x: Anchor, y: Anchor) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    pub fn with_margin(mut self, margin: usize) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Rectangle the overlay occupies inside a `width` x `height` parent
    pub fn rect(&self, width: usize, height: usize) -> Geometry {
        let w = self.width.resolve(width);
        let h = self.height.resolve(height);
        Geometry::new(
            self.x.offset(w, width, self.margin),
            self.y.offset(h, height, self.margin),
            w,
            h,
        )
    }
}

/// Root layout plus overlays, rendered to text
#[derive(Debug, Default)]
pub struct Compositor {
    root: Layout,
    overlays: IndexMap<String, Overlay>,
    config: CanvasConfig,
    debug: bool,
}

impl Compositor {
    pub fn new(root: Layout, config: CanvasConfig) -> Self {
        Self {
            root,
            overlays: IndexMap::new(),
            config,
            debug: false,
        }
    }

    /// Label every painted panel with its name
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn root(&self) -> &Layout {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Layout {
        &mut self.root
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    /// Add an overlay, replacing any overlay of the same name
    pub fn add_overlay(&mut self, name: impl Into<String>, overlay: Overlay) -> &mut Overlay {
        let name = name.into();
        self.overlays.insert(name.clone(), overlay);
        &mut self.overlays[&name]
    }

    pub fn overlay(&self, name: &str) -> Option<&Overlay> {
        self.overlays.get(name)
    }

    pub fn overlay_mut(&mut self, name: &str) -> Option<&mut Overlay> {
        self.overlays.get_mut(name)
    }

    pub fn overlays(&self) -> impl Iterator<Item = (&str, &Overlay)> {
        self.overlays.iter().map(|(name, o)| (name.as_str(), o))
    }

    /// Render a frame, drawing the placeholder if the root cannot be resolved
    pub fn render(&mut self, width: usize, height: usize) -> String {
        match self.try_render(width, height) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, width, height, "root layout failed, drawing placeholder");
                let mut canvas = Canvas::new(width, height, self.config.blank);
                canvas.placeholder(&self.config.placeholder, Geometry::new(0, 0, width, height));
                canvas.to_string()
            }
        }
    }

    /// Render a frame of `height` lines of `width` cells
    pub fn try_render(&mut self, width: usize, height: usize) -> Result<String, LayoutError> {
        let mut canvas = Canvas::new(width, height, self.config.blank);
        paint_layout(&mut self.root, &mut canvas, Geometry::new(0, 0, width, height), self.debug)?;

        let mut stack: Vec<(&String, &mut Overlay)> = self
            .overlays
            .iter_mut()
            .filter(|(_, o)| o.enabled)
            .collect();
        // stable: equal z-index keeps insertion order
        stack.sort_by_key(|(_, o)| o.z_index);

        for (name, overlay) in stack {
            let rect = overlay.rect(width, height);
            canvas.clear(rect);
            if let Err(e) = paint_layout(&mut overlay.layout, &mut canvas, rect, self.debug) {
                tracing::debug!(overlay = %name, error = %e, "overlay layout failed, drawing placeholder");
                canvas.placeholder(&self.config.placeholder, rect);
            }
        }
        Ok(canvas.to_string())
    }
}

/// Resolve `layout` at the size of `area` and paint its panels there
///
/// Rendering can change a panel's content size. When that leaves the layout
/// dirty the frame is thrown away and resolved again.
fn paint_layout(
    layout: &mut Layout,
    canvas: &mut Canvas,
    area: Geometry,
    labels: bool,
) -> Result<(), LayoutError> {
    layout.resize(area.width, area.height);
    let max_restarts = layout.config().max_retries;
    let mut restarts = 0;
    loop {
        layout.resolve()?;
        let frame: Vec<(String, Geometry, String)> = layout
            .panels_mut()
            .map(|panel| (panel.name().to_string(), panel.geometry(), panel.render()))
            .collect();

        if !layout.is_dirty() {
            for (name, geometry, text) in frame {
                let rect = Geometry::new(
                    area.x + geometry.x,
                    area.y + geometry.y,
                    geometry.width,
                    geometry.height,
                );
                canvas.paint(&text, rect);
                if labels {
                    canvas.paint(&name, rect);
                }
            }
            return Ok(());
        }

        restarts += 1;
        if restarts > max_restarts {
            return Err(LayoutError::unresolvable(
                restarts,
                "content kept changing size while rendering",
            ));
        }
        tracing::debug!(restarts, "content changed during render, restarting");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Guide, Panel, Text};

    #[test]
    fn test_overlay_size_parse() {
        assert_eq!(OverlaySize::parse("50%"), Some(OverlaySize::Percent(50.0)));
        assert_eq!(OverlaySize::parse("full"), Some(OverlaySize::Full));
        assert_eq!(OverlaySize::parse("12"), Some(OverlaySize::Fixed(12)));
        assert_eq!(OverlaySize::parse("-2"), Some(OverlaySize::Inset(2)));
        assert_eq!(OverlaySize::parse("0"), Some(OverlaySize::Full));
        assert_eq!(OverlaySize::parse("wide"), None);
        assert_eq!(OverlaySize::parse("-5%"), None);
    }

    #[test]
    fn test_overlay_size_resolve() {
        assert_eq!(OverlaySize::Percent(50.0).resolve(20), 10);
        assert_eq!(OverlaySize::Fixed(30).resolve(20), 20);
        assert_eq!(OverlaySize::Inset(4).resolve(20), 16);
        assert_eq!(OverlaySize::Inset(40).resolve(20), 0);
    }

    #[test]
    fn test_anchor_offsets() {
        assert_eq!(Anchor::Start.offset(10, 100, 2), 2);
        assert_eq!(Anchor::Center.offset(50, 100, 0), 25);
        assert_eq!(Anchor::End.offset(10, 100, 2), 88);
        // clamped into the parent
        assert_eq!(Anchor::Start.offset(98, 100, 5), 2);
        assert_eq!(Anchor::End.offset(120, 100, 0), 0);
    }

    #[test]
    fn test_overlay_rect_centered_percent() {
        let overlay = Overlay::new(Layout::default())
            .with_size(OverlaySize::Percent(50.0), OverlaySize::Percent(50.0));
        assert_eq!(overlay.rect(100, 20), Geometry::new(25, 5, 50, 10));
    }

    #[test]
    fn test_render_single_panel() {
        let mut root = Layout::default();
        root.add_panel(Panel::new("main", Text::new("hi")));
        let mut compositor = Compositor::new(root, CanvasConfig::new().with_blank('.'));
        assert_eq!(compositor.render(4, 2), "hi..\n....");
    }

    #[test]
    fn test_placeholder_when_root_fails() {
        let mut root = Layout::default();
        root.add_panel(Panel::new("main", Text::new("far too wide for this")));
        let mut compositor = Compositor::new(root, CanvasConfig::new().with_placeholder("small"));
        assert!(compositor.try_render(9, 1).is_err());
        assert_eq!(compositor.render(9, 1), "  small  ");
    }

    #[test]
    fn test_disabled_overlay_is_skipped() {
        let mut root = Layout::default();
        root.add_panel(Panel::new("main", Guide));
        let mut compositor = Compositor::new(root, CanvasConfig::new().with_blank('.'));

        let mut layout = Layout::default();
        layout.add_panel(Panel::new("popup", Text::new("x")));
        compositor.add_overlay("popup", Overlay::new(layout).with_enabled(false));
        assert_eq!(compositor.render(3, 1), "...");

        if let Some(overlay) = compositor.overlay_mut("popup") {
            overlay.enabled = true;
        }
        assert_eq!(compositor.render(3, 1), "x..");
    }

    #[test]
    fn test_debug_labels_panels() {
        let mut root = Layout::default();
        root.add_panel(Panel::new("main", Guide));
        let mut compositor =
            Compositor::new(root, CanvasConfig::new().with_blank('.')).with_debug(true);
        assert_eq!(compositor.render(6, 2), "main..\n......");
    }
}
