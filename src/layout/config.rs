//! Configuration for layout resolution

/// Default cap on bias passes and rebuilds per resolve
pub const DEFAULT_MAX_RETRIES: usize = 50;

/// Configuration options for layout resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    /// Bias passes plus full rebuilds allowed before giving up
    pub max_retries: usize,

    /// Split colliding unrelated panels evenly
    pub bias: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            bias: true,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry cap
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Enable or disable the bias pass
    pub fn with_bias(mut self, bias: bool) -> Self {
        self.bias = bias;
        self
    }
}
