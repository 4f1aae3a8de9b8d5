//! Compositing resolved layouts into text
//!
//! Each panel's rendered content is painted onto a cell canvas at its
//! resolved rectangle. Overlays are separate layouts stacked on top of the
//! root by z-index.

pub mod canvas;
pub mod compositor;
pub mod config;

pub use canvas::Canvas;
pub use compositor::{Anchor, Compositor, Overlay, OverlaySize};
pub use config::CanvasConfig;
