//! Error types for the layout engine

use thiserror::Error;

use super::solver::SolverError;

/// Errors that can occur while resolving a layout
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The solver could not produce a usable layout within the retry budget,
    /// or a required constraint could not be satisfied
    #[error("layout unresolvable after {attempts} attempt(s): {reason}")]
    Unresolvable { attempts: usize, reason: String },

    /// Reference to a panel that is not part of the layout
    #[error("unknown panel '{0}'")]
    UnknownPanel(String),

    /// Selection of a content key the panel does not carry
    #[error("invalid content '{content}' for panel '{panel}'")]
    UnknownContent { panel: String, content: String },

    /// Constraint solver error
    #[error("constraint solver error: {0}")]
    Solver(#[from] SolverError),
}

impl LayoutError {
    /// Create an unresolvable layout error
    pub fn unresolvable(attempts: usize, reason: impl Into<String>) -> Self {
        Self::Unresolvable {
            attempts,
            reason: reason.into(),
        }
    }

    /// Create an unknown content error
    pub fn unknown_content(panel: impl Into<String>, content: impl Into<String>) -> Self {
        Self::UnknownContent {
            panel: panel.into(),
            content: content.into(),
        }
    }

    /// Whether this error means the layout as a whole cannot be placed
    pub fn is_unresolvable(&self) -> bool {
        matches!(self, Self::Unresolvable { .. })
    }
}

/// Errors raised while reading declarative constraint lists
#[derive(Debug, Error)]
pub enum DeclarationError {
    #[error("unknown attribute '{0}'")]
    UnknownAttribute(String),

    #[error("unknown relation '{0}'")]
    UnknownRelation(String),

    #[error("unknown strength '{0}'")]
    UnknownStrength(String),

    #[error("invalid JSON declaration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid TOML declaration: {0}")]
    Toml(#[from] toml::de::Error),
}
