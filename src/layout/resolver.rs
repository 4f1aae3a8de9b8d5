//! Layout resolution
//!
//! A [`Layout`] owns the panels and constraints of one container. Resolving
//! builds a fresh solver, reads the solution back into panel geometry and
//! then lets the bias pass split panels the constraints left on top of each
//! other. A panel that still ends up with no width or height triggers a
//! rebuild in which it claims at least one cell; if that changes nothing the
//! layout is unresolvable. The whole loop is bounded by
//! [`LayoutConfig::max_retries`].

use indexmap::map::Entry;
use indexmap::IndexMap;
use kasuari::Expression;
use serde::Deserialize;

use super::bias::{Bias, Relations};
use super::config::LayoutConfig;
use super::constraint::{Attribute, Axis, Constraint, Relation, Strength, CONTAINER};
use super::error::{DeclarationError, LayoutError};
use super::panel::Panel;
use super::solver::ConstraintSolver;
use crate::error::ParseError;

/// Panels of a layout in insertion order
pub type Panels = IndexMap<String, Panel>;

/// TOML shape of a constraint list: `[[constraint]]` tables
#[derive(Deserialize)]
struct TomlDeclaration {
    #[serde(default)]
    constraint: Vec<Constraint>,
}

/// Panels and constraints of one container
#[derive(Debug, Default)]
pub struct Layout {
    panels: Panels,
    constraints: Vec<Constraint>,
    width: usize,
    height: usize,
    dirty: bool,
    config: LayoutConfig,
    solves: usize,
}

impl Layout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            dirty: true,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    // ========================================================================
    // Panels
    // ========================================================================

    /// Add a panel, replacing any panel of the same name
    pub fn add_panel(&mut self, panel: Panel) -> &mut Panel {
        self.dirty = true;
        match self.panels.entry(panel.name().to_string()) {
            Entry::Occupied(mut entry) => {
                entry.insert(panel);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(panel),
        }
    }

    pub fn panel(&self, name: &str) -> Option<&Panel> {
        self.panels.get(name)
    }

    /// Mutable access; changes made through the panel API are tracked
    pub fn panel_mut(&mut self, name: &str) -> Option<&mut Panel> {
        self.panels.get_mut(name)
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub(crate) fn panels_mut(&mut self) -> impl Iterator<Item = &mut Panel> {
        self.panels.values_mut()
    }

    // ========================================================================
    // Constraints
    // ========================================================================

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
        self.dirty = true;
    }

    pub fn add_constraints(&mut self, constraints: impl IntoIterator<Item = Constraint>) {
        self.constraints.extend(constraints);
        self.dirty = true;
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Append constraints from a JSON array; returns how many were added
    pub fn add_declaration(&mut self, bytes: &[u8]) -> Result<usize, DeclarationError> {
        let constraints: Vec<Constraint> = serde_json::from_slice(bytes)?;
        let count = constraints.len();
        self.add_constraints(constraints);
        Ok(count)
    }

    /// Append constraints from `[[constraint]]` TOML tables
    pub fn add_toml_declaration(&mut self, text: &str) -> Result<usize, DeclarationError> {
        let declaration: TomlDeclaration = toml::from_str(text)?;
        let count = declaration.constraint.len();
        self.add_constraints(declaration.constraint);
        Ok(count)
    }

    /// Append constraints written in the rules language
    pub fn add_rules(&mut self, source: &str) -> Result<usize, Vec<ParseError>> {
        let constraints = crate::parser::parse(source)?;
        let count = constraints.len();
        self.add_constraints(constraints);
        Ok(count)
    }

    // ========================================================================
    // Container state
    // ========================================================================

    /// Set the container size; only a real change marks the layout dirty
    pub fn resize(&mut self, width: usize, height: usize) {
        if (width, height) != (self.width, self.height) {
            self.width = width;
            self.height = height;
            self.dirty = true;
        }
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty || self.panels.values().any(Panel::is_dirty)
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Number of solvers built so far
    pub fn solve_count(&self) -> usize {
        self.solves
    }

    // ========================================================================
    // Resolution
    // ========================================================================

    /// Solve the layout, or return the cached panels when nothing changed
    pub fn resolve(&mut self) -> Result<&Panels, LayoutError> {
        if !self.is_dirty() {
            return Ok(&self.panels);
        }

        let max_retries = self.config.max_retries;
        let relations = Relations::from_constraints(&self.constraints);
        let mut floors: Vec<(String, Axis)> = Vec::new();
        let mut attempts = 0;
        'rebuild: loop {
            tracing::debug!(
                attempt = attempts,
                panels = self.panels.len(),
                floors = floors.len(),
                width = self.width,
                height = self.height,
                "building solver"
            );
            let mut solver = self.build(&floors, attempts)?;
            self.solves += 1;
            let mut bias = Bias::new(&relations);

            loop {
                self.apply(&mut solver);

                if self.config.bias && bias.apply(&mut solver, &self.panels)? {
                    attempts += 1;
                    if attempts > max_retries {
                        return Err(LayoutError::unresolvable(
                            attempts,
                            "bias did not settle within the retry limit",
                        ));
                    }
                    continue;
                }

                let collapsed = self.collapsed();
                let Some((panel, axis)) = collapsed.first().cloned() else {
                    break 'rebuild;
                };
                let fresh: Vec<(String, Axis)> = collapsed
                    .into_iter()
                    .filter(|entry| !floors.contains(entry))
                    .collect();
                // a rebuild with the same floors would solve the same problem
                if fresh.is_empty() {
                    return Err(LayoutError::unresolvable(
                        attempts,
                        format!("panel '{panel}' has no room along {axis}"),
                    ));
                }
                attempts += 1;
                if attempts > max_retries {
                    return Err(LayoutError::unresolvable(attempts, "retry limit exceeded"));
                }
                tracing::debug!(panel = %panel, %axis, "collapsed panel, rebuilding with a floor");
                floors.extend(fresh);
                continue 'rebuild;
            }
        }

        for panel in self.panels.values_mut() {
            let hints = panel.size_hints();
            panel.mark_resolved(hints);
        }
        self.dirty = false;
        tracing::debug!(attempts, solves = self.solves, "layout resolved");
        Ok(&self.panels)
    }

    /// Biasable panels with a zero extent, with the collapsed axis
    fn collapsed(&self) -> Vec<(String, Axis)> {
        self.panels
            .values()
            .filter(|p| p.can_bias() && p.geometry().is_degenerate())
            .flat_map(|p| {
                let geometry = p.geometry();
                [Axis::X, Axis::Y]
                    .into_iter()
                    .filter(move |&axis| geometry.extent(axis) == 0)
                    .map(move |axis| (p.name().to_string(), axis))
            })
            .collect()
    }

    /// Build a solver holding intrinsic, containment and user constraints
    ///
    /// `floors` lists panels that collapsed in an earlier attempt; each gets
    /// a strong claim to at least one cell along that axis.
    fn build(
        &self,
        floors: &[(String, Axis)],
        attempts: usize,
    ) -> Result<ConstraintSolver, LayoutError> {
        let mut solver = ConstraintSolver::new(self.width, self.height);
        let width = self.width as f64;
        let height = self.height as f64;

        for panel in self.panels.values() {
            let name = panel.name();
            let vars = solver.register(name);
            let hints = panel.size_hints();

            let mut required = Vec::new();
            for (attribute, list) in [
                (Attribute::Width, &hints.width),
                (Attribute::Height, &hints.height),
            ] {
                for hint in list {
                    required.push((
                        vars.expression(attribute, 1.0),
                        hint.relation,
                        hint.value,
                        format!("{name}.{attribute} {} {}", hint.relation.symbol(), hint.value),
                    ));
                }
            }
            for (attribute, relation, value) in [
                (Attribute::XStart, Relation::Ge, 0.0),
                (Attribute::YStart, Relation::Ge, 0.0),
                (Attribute::XEnd, Relation::Le, width),
                (Attribute::YEnd, Relation::Le, height),
            ] {
                required.push((
                    vars.expression(attribute, 1.0),
                    relation,
                    value,
                    format!("{name}.{attribute} {} {value}", relation.symbol()),
                ));
            }

            for (lhs, relation, value, description) in required {
                let constraint = ConstraintSolver::relate(
                    lhs,
                    relation,
                    Expression::from_constant(value),
                    Strength::Required,
                );
                solver
                    .add(constraint, &description)
                    .map_err(|e| LayoutError::unresolvable(attempts, e.to_string()))?;
            }

            // unrelated panels claim the whole container from its origin;
            // colliding claims are what the bias pass looks for
            if panel.can_bias() {
                for (attribute, value) in [
                    (Attribute::Width, width),
                    (Attribute::Height, height),
                    (Attribute::XStart, 0.0),
                    (Attribute::YStart, 0.0),
                ] {
                    let preference = ConstraintSolver::relate(
                        vars.expression(attribute, 1.0),
                        Relation::Eq,
                        Expression::from_constant(value),
                        Strength::Weak,
                    );
                    if let Err(e) = solver.add(preference, &format!("{name}.{attribute} preference")) {
                        tracing::debug!(panel = name, error = %e, "preference skipped");
                    }
                }
            }
        }

        for (name, axis) in floors {
            let Some(vars) = solver.variables(name) else {
                continue;
            };
            let floor = ConstraintSolver::relate(
                Expression::from(vars.extent(*axis)),
                Relation::Ge,
                Expression::from_constant(1.0),
                Strength::Strong,
            );
            if let Err(e) = solver.add(floor, &format!("{name} {axis} floor")) {
                tracing::debug!(panel = %name, error = %e, "floor skipped");
            }
        }

        for constraint in &self.constraints {
            self.add_user_constraint(&mut solver, constraint, attempts)?;
        }
        Ok(solver)
    }

    /// Translate one declared constraint; dangling references are skipped
    fn add_user_constraint(
        &self,
        solver: &mut ConstraintSolver,
        constraint: &Constraint,
        attempts: usize,
    ) -> Result<(), LayoutError> {
        let Some(target) = self.panels.get(&constraint.target) else {
            tracing::warn!(%constraint, "unknown target panel, constraint skipped");
            return Ok(());
        };
        if !target.accepts(constraint.target_attribute) {
            tracing::debug!(%constraint, "target does not accept attribute, constraint skipped");
            return Ok(());
        }
        let Some(lhs) = solver.attribute_expression(&constraint.target, constraint.target_attribute, 1.0)
        else {
            return Ok(());
        };

        let rhs = match constraint.source_panel() {
            // a bare bound scales its constant
            None => Expression::from_constant(constraint.constant * constraint.multiplier),
            Some(source) => {
                if source != CONTAINER && !self.panels.contains_key(source) {
                    tracing::warn!(%constraint, "unknown source panel, constraint skipped");
                    return Ok(());
                }
                match solver.attribute_expression(
                    source,
                    constraint.source_attribute(),
                    constraint.multiplier,
                ) {
                    Some(expression) => expression + constraint.constant,
                    None => return Ok(()),
                }
            }
        };

        let relation =
            ConstraintSolver::relate(lhs, constraint.relation, rhs, constraint.strength);
        match solver.add(relation, &constraint.to_string()) {
            Ok(()) => Ok(()),
            Err(e) if constraint.strength == Strength::Required => {
                Err(LayoutError::unresolvable(attempts, e.to_string()))
            }
            Err(e) => {
                tracing::warn!(%constraint, error = %e, "constraint skipped");
                Ok(())
            }
        }
    }

    /// Read solved values back into panel geometry
    fn apply(&mut self, solver: &mut ConstraintSolver) {
        solver.refresh();
        let mut moved = 0;
        for panel in self.panels.values_mut() {
            if let Some(geometry) = solver.geometry(panel.name()) {
                if panel.set_geometry(geometry) {
                    moved += 1;
                }
            }
        }
        tracing::trace!(moved, "solution applied");
    }
}
