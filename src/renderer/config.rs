//! Configuration for compositing

/// Text shown when a layout cannot be resolved at the current size
pub const DEFAULT_PLACEHOLDER: &str = "Window too small";

/// Configuration options for canvas output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Message centered in any area whose layout failed
    pub placeholder: String,

    /// Character written for cells nothing painted
    pub blank: char,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            blank: ' ',
        }
    }
}

impl CanvasConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the placeholder message
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Set the blank cell character
    pub fn with_blank(mut self, blank: char) -> Self {
        self.blank = blank;
        self
    }
}
