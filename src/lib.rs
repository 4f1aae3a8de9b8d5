//! Chocolate - constraint-based layout for terminal panels
//!
//! Panels are named rectangles whose sizes and positions come from linear
//! constraints solved with kasuari. Panels the constraints leave unrelated
//! are split evenly, and the result is composited into text together with
//! any overlays.
//!
//! # Example
//!
//! ```rust
//! use chocolate::layout::{Layout, Panel, Text};
//! use chocolate::renderer::{CanvasConfig, Compositor};
//!
//! let mut root = Layout::default();
//! root.add_panel(Panel::new("left", Text::new("a")));
//! root.add_panel(Panel::new("right", Text::new("b")));
//!
//! let mut compositor = Compositor::new(root, CanvasConfig::new().with_blank('.'));
//! assert_eq!(compositor.render(4, 1), "a.b.");
//! ```

pub mod document;
pub mod error;
pub mod layout;
pub mod parser;
pub mod renderer;
pub mod theme;

pub use document::{Document, DocumentError};
pub use error::ParseError;
pub use layout::{Constraint, Geometry, Layout, LayoutConfig, LayoutError, Panel};
pub use parser::parse;
pub use renderer::{CanvasConfig, Compositor, Overlay};

use thiserror::Error;

// Re-export Theme for public API
pub use theme::Theme;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// Error reading or building the document
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Error during layout
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Layout configuration
    pub layout: LayoutConfig,
    /// Canvas output configuration
    pub canvas: CanvasConfig,
    /// Styles for text panels
    pub theme: Theme,
    /// Viewport width in cells
    pub width: usize,
    /// Viewport height in cells
    pub height: usize,
    /// Debug mode: label panels with their names
    pub debug: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            canvas: CanvasConfig::default(),
            theme: Theme::default(),
            width: 80,
            height: 24,
            debug: false,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the layout configuration
    pub fn with_layout(mut self, config: LayoutConfig) -> Self {
        self.layout = config;
        self
    }

    /// Set the canvas configuration
    pub fn with_canvas(mut self, config: CanvasConfig) -> Self {
        self.canvas = config;
        self
    }

    /// Set the theme
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Set the viewport size
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    fn compositor(&self, source: &str) -> Result<Compositor, RenderError> {
        let document = Document::from_str(source)?;
        let compositor = document.build(&self.theme, &self.layout, &self.canvas)?;
        Ok(compositor.with_debug(self.debug))
    }
}

/// Render a TOML layout document with default configuration
///
/// A layout that cannot be resolved at the viewport size renders as the
/// placeholder message rather than failing.
///
/// # Example
///
/// ```rust
/// use chocolate::render;
///
/// let frame = render(r#"
///     [[panel]]
///     name = "hello"
///     text = "Hello"
/// "#).unwrap();
///
/// assert!(frame.starts_with("Hello"));
/// assert_eq!(frame.lines().count(), 24);
/// ```
pub fn render(source: &str) -> Result<String, RenderError> {
    render_with_config(source, RenderConfig::default())
}

/// Render a TOML layout document with custom configuration
///
/// # Example
///
/// ```rust
/// use chocolate::{render_with_config, CanvasConfig, RenderConfig};
///
/// let config = RenderConfig::new()
///     .with_size(12, 1)
///     .with_canvas(CanvasConfig::new().with_blank('.'));
///
/// let frame = render_with_config(r#"
///     rules = """
///     left.width = super.width * 0.5
///     right.xstart = left.xend
///     """
///     [[panel]]
///     name = "left"
///     text = "ab"
///     [[panel]]
///     name = "right"
///     text = "cd"
/// "#, config).unwrap();
///
/// assert_eq!(frame, "ab....cd....");
/// ```
pub fn render_with_config(source: &str, config: RenderConfig) -> Result<String, RenderError> {
    let mut compositor = config.compositor(source)?;
    Ok(compositor.render(config.width, config.height))
}

/// Resolve the root layout of a document and return every panel's geometry
///
/// Unlike [`render_with_config`] a layout that cannot be resolved is an error.
pub fn resolve_with_config(
    source: &str,
    config: RenderConfig,
) -> Result<Vec<(String, Geometry)>, RenderError> {
    let mut compositor = config.compositor(source)?;
    let root = compositor.root_mut();
    root.resize(config.width, config.height);
    let panels = root.resolve()?;
    Ok(panels
        .values()
        .map(|panel| (panel.name().to_string(), panel.geometry()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIDE_BY_SIDE: &str = r#"
        [[panel]]
        name = "a"
        text = "aaaaa\naaaaa"

        [[panel]]
        name = "b"
        text = "bbbbb\nbbbbb"
    "#;

    #[test]
    fn test_render_splits_unrelated_panels() {
        let frame = render_with_config(SIDE_BY_SIDE, RenderConfig::new().with_size(10, 2)).unwrap();
        assert_eq!(frame, "aaaaabbbbb\naaaaabbbbb");
    }

    #[test]
    fn test_resolve_reports_geometry() {
        let panels =
            resolve_with_config(SIDE_BY_SIDE, RenderConfig::new().with_size(10, 2)).unwrap();
        assert_eq!(
            panels,
            vec![
                ("a".to_string(), Geometry::new(0, 0, 5, 2)),
                ("b".to_string(), Geometry::new(5, 0, 5, 2)),
            ]
        );
    }

    #[test]
    fn test_too_small_renders_placeholder() {
        let config = RenderConfig::new()
            .with_size(8, 1)
            .with_canvas(CanvasConfig::new().with_placeholder("small"));
        let frame = render_with_config(SIDE_BY_SIDE, config).unwrap();
        assert_eq!(frame, " small  ");
    }

    #[test]
    fn test_too_small_is_an_error_when_resolving() {
        let err = resolve_with_config(SIDE_BY_SIDE, RenderConfig::new().with_size(8, 1))
            .unwrap_err();
        assert!(matches!(err, RenderError::Layout(ref e) if e.is_unresolvable()));
    }

    #[test]
    fn test_document_errors_surface() {
        let err = render("[[panel]]\nkind = \"guide\"").unwrap_err();
        assert!(matches!(err, RenderError::Document(DocumentError::Toml(_))));
    }
}
