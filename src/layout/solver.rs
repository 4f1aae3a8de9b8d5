//! Constraint solver integration for layout resolution
//!
//! This module wraps the kasuari Cassowary solver. Every panel contributes
//! four unknowns (width, height, x-position, y-position); panel attributes
//! are translated into linear expressions over them, and solved values are
//! read back into integer [`Geometry`].

use std::collections::HashMap;

use kasuari::{
    AddConstraintError, Constraint as KasuariConstraint, Expression, Solver as KasuariSolver,
    Term, Variable as KasuariVariable,
};
use thiserror::Error;

use super::constraint::{Attribute, Axis, Relation, Strength, CONTAINER};
use super::panel::Geometry;

// ============================================================================
// Panel variables
// ============================================================================

/// The four solver unknowns of one panel
///
/// `xend` and `yend` are never stored; they are built as two-term
/// expressions whenever a constraint references them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelVariables {
    pub width: KasuariVariable,
    pub height: KasuariVariable,
    pub xpos: KasuariVariable,
    pub ypos: KasuariVariable,
}

impl PanelVariables {
    pub fn new() -> Self {
        Self {
            width: KasuariVariable::new(),
            height: KasuariVariable::new(),
            xpos: KasuariVariable::new(),
            ypos: KasuariVariable::new(),
        }
    }

    /// Linear expression for `attribute * multiplier`
    pub fn expression(&self, attribute: Attribute, multiplier: f64) -> Expression {
        let terms = match attribute {
            Attribute::Width => vec![Term::new(self.width, multiplier)],
            Attribute::Height => vec![Term::new(self.height, multiplier)],
            Attribute::XStart => vec![Term::new(self.xpos, multiplier)],
            Attribute::YStart => vec![Term::new(self.ypos, multiplier)],
            Attribute::XEnd => vec![
                Term::new(self.xpos, multiplier),
                Term::new(self.width, multiplier),
            ],
            Attribute::YEnd => vec![
                Term::new(self.ypos, multiplier),
                Term::new(self.height, multiplier),
            ],
        };
        Expression::new(terms, 0.0)
    }

    /// Position variable on an axis
    pub fn position(&self, axis: Axis) -> KasuariVariable {
        match axis {
            Axis::X => self.xpos,
            Axis::Y => self.ypos,
        }
    }

    /// Extent variable on an axis
    pub fn extent(&self, axis: Axis) -> KasuariVariable {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }
}

impl Default for PanelVariables {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SolverError
// ============================================================================

/// Errors from the constraint solver
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("unsatisfiable constraint: {constraint}")]
    Unsatisfiable { constraint: String },

    #[error("duplicate constraint: {0}")]
    Duplicate(String),

    #[error("internal solver error for {constraint}: {reason}")]
    Internal { constraint: String, reason: String },
}

fn convert_kasuari_error(e: AddConstraintError, description: &str) -> SolverError {
    match e {
        AddConstraintError::UnsatisfiableConstraint => SolverError::Unsatisfiable {
            constraint: description.to_string(),
        },
        AddConstraintError::DuplicateConstraint => SolverError::Duplicate(description.to_string()),
        AddConstraintError::InternalSolverError(inner) => SolverError::Internal {
            constraint: description.to_string(),
            reason: inner.to_string(),
        },
    }
}

// ============================================================================
// ConstraintSolver
// ============================================================================

/// Wrapper around the kasuari solver for one container
pub struct ConstraintSolver {
    solver: KasuariSolver,
    /// Maps panel names to their variables
    panels: HashMap<String, PanelVariables>,
    /// Last known value of every variable; kasuari only reports changes
    values: HashMap<KasuariVariable, f64>,
    width: f64,
    height: f64,
}

impl ConstraintSolver {
    /// Create a solver for a container of the given size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            solver: KasuariSolver::new(),
            panels: HashMap::new(),
            values: HashMap::new(),
            width: width as f64,
            height: height as f64,
        }
    }

    pub fn container_width(&self) -> f64 {
        self.width
    }

    pub fn container_height(&self) -> f64 {
        self.height
    }

    /// Get or create the variables of a panel
    pub fn register(&mut self, panel: &str) -> PanelVariables {
        if let Some(&vars) = self.panels.get(panel) {
            vars
        } else {
            let vars = PanelVariables::new();
            self.panels.insert(panel.to_string(), vars);
            vars
        }
    }

    pub fn variables(&self, panel: &str) -> Option<PanelVariables> {
        self.panels.get(panel).copied()
    }

    /// Value of a container attribute: its size for extents and ends, 0 for starts
    pub fn container_value(&self, attribute: Attribute) -> f64 {
        match attribute {
            Attribute::Width | Attribute::XEnd => self.width,
            Attribute::Height | Attribute::YEnd => self.height,
            Attribute::XStart | Attribute::YStart => 0.0,
        }
    }

    /// Expression for `panel.attribute * multiplier`
    ///
    /// Returns `None` for panels that were never registered. The container
    /// pseudo-panel folds into a constant.
    pub fn attribute_expression(
        &self,
        panel: &str,
        attribute: Attribute,
        multiplier: f64,
    ) -> Option<Expression> {
        if panel == CONTAINER {
            return Some(Expression::from_constant(
                self.container_value(attribute) * multiplier,
            ));
        }
        self.panels
            .get(panel)
            .map(|vars| vars.expression(attribute, multiplier))
    }

    /// Build `lhs RELATION rhs` at the given strength
    pub fn relate(
        lhs: Expression,
        relation: Relation,
        rhs: Expression,
        strength: Strength,
    ) -> KasuariConstraint {
        KasuariConstraint::new(lhs - rhs, relation.operator(), strength.to_kasuari())
    }

    /// Add a constraint; `description` is used for error messages only
    pub fn add(
        &mut self,
        constraint: KasuariConstraint,
        description: &str,
    ) -> Result<(), SolverError> {
        self.solver
            .add_constraint(constraint)
            .map_err(|e| convert_kasuari_error(e, description))
    }

    /// Remove a previously added constraint, ignoring unknown ones
    pub fn remove(&mut self, constraint: &KasuariConstraint) {
        if self.solver.has_constraint(constraint) {
            if let Err(e) = self.solver.remove_constraint(constraint) {
                tracing::debug!(error = %e, "failed to remove constraint");
            }
        }
    }

    /// Pull changed values out of the solver into the value cache
    pub fn refresh(&mut self) {
        for &(var, value) in self.solver.fetch_changes() {
            self.values.insert(var, value);
        }
    }

    pub fn value(&self, var: KasuariVariable) -> f64 {
        self.values.get(&var).copied().unwrap_or(0.0)
    }

    /// Rounded geometry of a panel
    ///
    /// Edges are rounded rather than sizes, so that panels chained edge to
    /// edge never gain a gap or an overlap through rounding.
    pub fn geometry(&self, panel: &str) -> Option<Geometry> {
        let vars = self.panels.get(panel)?;
        let x = self.value(vars.xpos);
        let y = self.value(vars.ypos);
        let left = round_cell(x);
        let top = round_cell(y);
        let right = round_cell(x + self.value(vars.width)).max(left);
        let bottom = round_cell(y + self.value(vars.height)).max(top);
        Some(Geometry::new(left, top, right - left, bottom - top))
    }
}

fn round_cell(value: f64) -> usize {
    if value.is_finite() && value > 0.0 {
        value.round() as usize
    } else {
        0
    }
}
