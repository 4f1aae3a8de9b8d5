//! Constraint-based layout engine
//!
//! Panels are named rectangles inside a container. Their sizes and
//! positions come from a set of linear constraints solved with kasuari,
//! followed by a bias pass that evenly splits panels the constraints left
//! unrelated.

pub mod bias;
pub mod config;
pub mod constraint;
pub mod content;
pub mod error;
pub mod panel;
pub mod resolver;
pub mod solver;

pub use config::LayoutConfig;
pub use constraint::{Attribute, Axis, Constraint, Relation, Strength, CONTAINER};
pub use content::{Content, Guide, Hidden, SizeHint, SizeHints, Text, View};
pub use error::{DeclarationError, LayoutError};
pub use panel::{Geometry, Panel, DEFAULT_CONTENT};
pub use resolver::{Layout, Panels};
pub use solver::SolverError;
