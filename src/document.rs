//! Layout documents: a whole compositor described in TOML
//!
//! ```toml
//! rules = """
//! menu.width = super.width * 0.25 @strong
//! main.xstart = menu.xend
//! """
//!
//! [[panel]]
//! name = "menu"
//! text = "File\nEdit"
//! style = "primary"
//!
//! [[panel]]
//! name = "main"
//! text = "Hello"
//! select = "busy"
//!
//! [panel.contents]
//! busy = "Working..."
//!
//! [[overlay]]
//! name = "dialog"
//! width = "50%"
//! height = 5
//!
//! [[overlay.panel]]
//! name = "message"
//! text = "Saved"
//! border = "double"
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::error::ParseError;
use crate::layout::{Constraint, Guide, Hidden, Layout, LayoutConfig, LayoutError, Panel, Text};
use crate::renderer::{Anchor, CanvasConfig, Compositor, Overlay, OverlaySize};
use crate::theme::{Style, StyleOverride, Theme};

/// Errors that can occur when loading or building a document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse document TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("{} error(s) in rules", .errors.len())]
    Rules {
        rules: String,
        errors: Vec<ParseError>,
    },
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("invalid size '{value}' for overlay '{overlay}'")]
    InvalidSize { overlay: String, value: String },
}

/// Content kind of a document panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelKind {
    #[default]
    Text,
    Guide,
    Hidden,
}

fn yes() -> bool {
    true
}

/// One `[[panel]]` table
#[derive(Debug, Clone, Deserialize)]
pub struct PanelSpec {
    pub name: String,
    #[serde(default)]
    pub kind: PanelKind,
    /// Default content of a text panel
    pub text: Option<String>,
    /// Theme style name
    pub style: Option<String>,
    /// Inline changes on top of `style`
    #[serde(flatten)]
    pub style_override: StyleOverride,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default = "yes")]
    pub can_hide: bool,
    /// Content key to start on
    pub select: Option<String>,
    /// Extra text contents by key
    #[serde(default)]
    pub contents: IndexMap<String, String>,
}

impl PanelSpec {
    /// Style of this panel's text, or None for plain text
    fn style(&self, theme: &Theme) -> Option<Style> {
        let name = self
            .style
            .as_deref()
            .or(self.style_override.extends.as_deref());
        let base = match name {
            Some(name) => theme.style_or_default(name),
            None if self.style_override.is_empty() => return None,
            None => Style::default(),
        };
        Some(self.style_override.apply(base))
    }

    fn text(&self, text: &str, style: Option<Style>) -> Text {
        match style {
            Some(style) => Text::styled(text, style),
            None => Text::new(text),
        }
    }

    pub fn build(&self, theme: &Theme) -> Result<Panel, LayoutError> {
        let style = self.style(theme);
        let mut panel = match self.kind {
            PanelKind::Text => Panel::new(
                &self.name,
                self.text(self.text.as_deref().unwrap_or_default(), style),
            ),
            PanelKind::Guide => Panel::new(&self.name, Guide),
            PanelKind::Hidden => Panel::new(&self.name, Hidden),
        };
        for (key, text) in &self.contents {
            panel.add_content(key, self.text(text, style));
        }
        panel.set_can_hide(self.can_hide);
        if let Some(key) = &self.select {
            panel.select(key)?;
        }
        if self.hidden && !panel.hide() {
            tracing::warn!(panel = %self.name, "panel cannot hide, shown instead");
        }
        Ok(panel)
    }
}

/// Overlay size as written: a cell count or a string such as `"50%"`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeSpec {
    Cells(i64),
    Text(String),
}

impl Default for SizeSpec {
    fn default() -> Self {
        SizeSpec::Cells(0)
    }
}

impl SizeSpec {
    fn resolve(&self, overlay: &str) -> Result<OverlaySize, DocumentError> {
        match self {
            SizeSpec::Cells(n) => Ok(OverlaySize::from_cells(*n)),
            SizeSpec::Text(text) => {
                OverlaySize::parse(text).ok_or_else(|| DocumentError::InvalidSize {
                    overlay: overlay.to_string(),
                    value: text.clone(),
                })
            }
        }
    }
}

/// One `[[overlay]]` table
#[derive(Debug, Clone, Deserialize)]
pub struct OverlaySpec {
    pub name: String,
    #[serde(default)]
    pub z_index: i32,
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default)]
    pub width: SizeSpec,
    #[serde(default)]
    pub height: SizeSpec,
    #[serde(default)]
    pub x: Anchor,
    #[serde(default)]
    pub y: Anchor,
    #[serde(default)]
    pub margin: usize,
    pub rules: Option<String>,
    #[serde(default)]
    pub panel: Vec<PanelSpec>,
    #[serde(default)]
    pub constraint: Vec<Constraint>,
}

/// A root layout and its overlays
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Document {
    pub rules: Option<String>,
    #[serde(default)]
    pub panel: Vec<PanelSpec>,
    #[serde(default)]
    pub constraint: Vec<Constraint>,
    #[serde(default)]
    pub overlay: Vec<OverlaySpec>,
}

impl Document {
    /// Load a document from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a document from a TOML string
    pub fn from_str(content: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(content)?)
    }

    /// Build the compositor this document describes
    pub fn build(
        &self,
        theme: &Theme,
        layout: &LayoutConfig,
        canvas: &CanvasConfig,
    ) -> Result<Compositor, DocumentError> {
        let root = build_layout(
            self.rules.as_deref(),
            &self.panel,
            &self.constraint,
            theme,
            layout,
        )?;
        let mut compositor = Compositor::new(root, canvas.clone());

        for spec in &self.overlay {
            let nested = build_layout(
                spec.rules.as_deref(),
                &spec.panel,
                &spec.constraint,
                theme,
                layout,
            )?;
            let overlay = Overlay::new(nested)
                .with_z_index(spec.z_index)
                .with_enabled(spec.enabled)
                .with_size(spec.width.resolve(&spec.name)?, spec.height.resolve(&spec.name)?)
                .with_anchor(spec.x, spec.y)
                .with_margin(spec.margin);
            compositor.add_overlay(&spec.name, overlay);
        }
        tracing::debug!(
            panels = self.panel.len(),
            overlays = self.overlay.len(),
            "document built"
        );
        Ok(compositor)
    }
}

fn build_layout(
    rules: Option<&str>,
    panels: &[PanelSpec],
    constraints: &[Constraint],
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<Layout, DocumentError> {
    let mut layout = Layout::new(config.clone());
    for spec in panels {
        layout.add_panel(spec.build(theme)?);
    }
    layout.add_constraints(constraints.iter().cloned());
    if let Some(rules) = rules {
        layout
            .add_rules(rules)
            .map_err(|errors| DocumentError::Rules {
                rules: rules.to_string(),
                errors,
            })?;
    }
    Ok(layout)
}
