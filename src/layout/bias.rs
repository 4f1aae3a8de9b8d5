//! Bias: automatic equal split for panels nothing relates to each other
//!
//! When the declared constraints leave sibling panels free relative to each
//! other, the solver happily stacks them on the same cells. After each solve
//! this pass looks for biasable panels whose rectangles collide, decides per
//! colliding pair which axis to split them on, and pins every cluster of
//! collided panels to an even share of the space its members first claimed.
//!
//! Clusters only ever grow within one solver: a pair that already shares a
//! cluster is never reconsidered, and a cluster's total is fixed by the
//! extents its members had when they joined. A pass that adds no member adds
//! no constraint, so the pass settles after at most one growth per panel.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use kasuari::{Constraint as KasuariConstraint, Expression, Term};

use super::constraint::{Axis, Constraint, Relation, Strength, CONTAINER};
use super::error::LayoutError;
use super::panel::{Geometry, Panel};
use super::solver::{ConstraintSolver, PanelVariables};

/// Edge-to-edge chaining inside a cluster
///
/// Above the weak origin preference, below anything a user can declare
/// except `@weak`.
const CHAIN_STRENGTH: kasuari::Strength = kasuari::Strength::new(10.0);

/// Axis on which two overlapping rectangles should be told apart
///
/// The pair conflicts on y when its y-overlap is the tighter squeeze
/// relative to the container, otherwise on x. Normalizing by the container
/// lets two full-size panels in a wide container split side by side.
pub fn conflict_axis(overlap: (usize, usize), container: (usize, usize)) -> Axis {
    let (x_overlap, y_overlap) = overlap;
    let (width, height) = container;
    if y_overlap * width < x_overlap * height {
        Axis::Y
    } else {
        Axis::X
    }
}

/// Whether two spans share cells, returning the shared length
///
/// An empty span is a point: it touches a span that contains it, ends
/// included, and another point at the same place.
fn span_contact(start: usize, len: usize, other_start: usize, other_len: usize) -> Option<usize> {
    match (len, other_len) {
        (0, 0) => (start == other_start).then_some(0),
        (0, _) => (other_start..=other_start + other_len)
            .contains(&start)
            .then_some(0),
        (_, 0) => (start..=start + len).contains(&other_start).then_some(0),
        _ => {
            let shared = (start + len)
                .min(other_start + other_len)
                .saturating_sub(start.max(other_start));
            (shared > 0).then_some(shared)
        }
    }
}

/// Lengths of the x and y contact of two rectangles, if they collide
///
/// Unlike [`Geometry::overlap`] a collapsed rectangle collides with the
/// rectangle it sits on, with a contact length of zero on its collapsed
/// axis.
pub fn collision(a: &Geometry, b: &Geometry) -> Option<(usize, usize)> {
    let x = span_contact(a.x, a.width, b.x, b.width)?;
    let y = span_contact(a.y, a.height, b.y, b.height)?;
    Some((x, y))
}

/// What the declared constraints already say about panel placement
#[derive(Debug, Default)]
pub struct Relations {
    /// Panels with an equality on an attribute of the axis
    pinned: HashSet<(String, Axis)>,
    /// Panel pairs related to each other along an axis, stored both ways
    related: HashSet<(String, String, Axis)>,
}

impl Relations {
    pub fn from_constraints(constraints: &[Constraint]) -> Self {
        let mut relations = Self::default();
        for constraint in constraints {
            let axis = constraint.target_attribute.axis();
            let source_axis = constraint.source_attribute().axis();
            let source = constraint.source_panel().filter(|s| *s != CONTAINER);

            if constraint.relation == Relation::Eq {
                relations.pinned.insert((constraint.target.clone(), axis));
                if let Some(source) = source {
                    relations.pinned.insert((source.to_string(), source_axis));
                }
            }
            if let Some(source) = source {
                if source_axis == axis && source != constraint.target {
                    relations
                        .related
                        .insert((constraint.target.clone(), source.to_string(), axis));
                    relations
                        .related
                        .insert((source.to_string(), constraint.target.clone(), axis));
                }
            }
        }
        relations
    }

    pub fn is_pinned(&self, panel: &str, axis: Axis) -> bool {
        self.pinned.contains(&(panel.to_string(), axis))
    }

    pub fn are_related(&self, a: &str, b: &str, axis: Axis) -> bool {
        self.related
            .contains(&(a.to_string(), b.to_string(), axis))
    }
}

struct Cluster {
    axis: Axis,
    members: Vec<String>,
    constraints: Vec<KasuariConstraint>,
}

impl Cluster {
    fn contains(&self, name: &str) -> bool {
        self.members.iter().any(|member| member == name)
    }
}

/// Bias clusters living in one solver
pub struct Bias<'a> {
    relations: &'a Relations,
    /// Merged clusters leave a `None` behind so indices stay valid
    clusters: Vec<Option<Cluster>>,
    /// Extent of each panel when it first joined a cluster on an axis
    natural: HashMap<(String, Axis), usize>,
}

impl<'a> Bias<'a> {
    pub fn new(relations: &'a Relations) -> Self {
        Self {
            relations,
            clusters: Vec::new(),
            natural: HashMap::new(),
        }
    }

    /// Inspect the solved panels and grow clusters where they collide
    ///
    /// Returns true when a cluster gained members and the solver needs to
    /// be read back again.
    pub fn apply(
        &mut self,
        solver: &mut ConstraintSolver,
        panels: &IndexMap<String, Panel>,
    ) -> Result<bool, LayoutError> {
        let candidates: Vec<(&str, Geometry)> = panels
            .values()
            .filter(|p| p.can_bias())
            .map(|p| (p.name(), p.geometry()))
            .collect();
        let container = (
            solver.container_width() as usize,
            solver.container_height() as usize,
        );

        let mut grown = Vec::new();
        for (n, &(a, a_geometry)) in candidates.iter().enumerate() {
            for &(b, b_geometry) in &candidates[n + 1..] {
                let Some(contact) = collision(&a_geometry, &b_geometry) else {
                    continue;
                };
                if self.share_cluster(a, b) {
                    continue;
                }
                let axis = self.split_axis((a, a_geometry), (b, b_geometry), contact, container);
                for (name, geometry) in [(a, a_geometry), (b, b_geometry)] {
                    self.natural
                        .entry((name.to_string(), axis))
                        .or_insert_with(|| geometry.extent(axis));
                }
                let index = self.join(solver, axis, a, b);
                if !grown.contains(&index) {
                    grown.push(index);
                }
            }
        }

        let order: HashMap<&str, (usize, Geometry)> = candidates
            .iter()
            .enumerate()
            .map(|(index, &(name, geometry))| (name, (index, geometry)))
            .collect();
        for &index in &grown {
            self.split(solver, index, &order)?;
        }
        Ok(!grown.is_empty())
    }

    fn share_cluster(&self, a: &str, b: &str) -> bool {
        self.clusters
            .iter()
            .flatten()
            .any(|cluster| cluster.contains(a) && cluster.contains(b))
    }

    /// Collapsed axis first, then the axis the user left free, then shape
    fn split_axis(
        &self,
        (a, a_geometry): (&str, Geometry),
        (b, b_geometry): (&str, Geometry),
        contact: (usize, usize),
        container: (usize, usize),
    ) -> Axis {
        let collapsed = |axis| a_geometry.extent(axis) == 0 || b_geometry.extent(axis) == 0;
        match (collapsed(Axis::X), collapsed(Axis::Y)) {
            (true, false) => return Axis::X,
            (false, true) => return Axis::Y,
            _ => {}
        }

        let pinned =
            |axis| self.relations.is_pinned(a, axis) && self.relations.is_pinned(b, axis);
        match (pinned(Axis::X), pinned(Axis::Y)) {
            (true, false) => Axis::Y,
            (false, true) => Axis::X,
            _ => conflict_axis(contact, container),
        }
    }

    fn find(&self, axis: Axis, name: &str) -> Option<usize> {
        self.clusters.iter().position(|cluster| {
            cluster
                .as_ref()
                .is_some_and(|c| c.axis == axis && c.contains(name))
        })
    }

    /// Put `a` and `b` in one cluster on `axis`, returning its index
    fn join(&mut self, solver: &mut ConstraintSolver, axis: Axis, a: &str, b: &str) -> usize {
        match (self.find(axis, a), self.find(axis, b)) {
            (Some(keep), Some(other)) if keep != other => {
                if let Some(merged) = self.clusters[other].take() {
                    for constraint in &merged.constraints {
                        solver.remove(constraint);
                    }
                    if let Some(cluster) = self.clusters[keep].as_mut() {
                        cluster.members.extend(merged.members);
                    }
                }
                keep
            }
            (Some(keep), _) => {
                self.push_member(keep, b);
                keep
            }
            (None, Some(keep)) => {
                self.push_member(keep, a);
                keep
            }
            (None, None) => {
                self.clusters.push(Some(Cluster {
                    axis,
                    members: vec![a.to_string(), b.to_string()],
                    constraints: Vec::new(),
                }));
                self.clusters.len() - 1
            }
        }
    }

    fn push_member(&mut self, index: usize, name: &str) {
        if let Some(cluster) = self.clusters[index].as_mut() {
            if !cluster.contains(name) {
                cluster.members.push(name.to_string());
            }
        }
    }

    /// Replace the constraints of a cluster with an even share of its total
    /// and an edge-to-edge chain in current position order
    fn split(
        &mut self,
        solver: &mut ConstraintSolver,
        index: usize,
        order: &HashMap<&str, (usize, Geometry)>,
    ) -> Result<(), LayoutError> {
        let Some(cluster) = self.clusters[index].as_mut() else {
            return Ok(());
        };
        for constraint in cluster.constraints.drain(..) {
            solver.remove(&constraint);
        }

        let axis = cluster.axis;
        // ties keep panel order
        cluster.members.sort_by_key(|name| {
            order
                .get(name.as_str())
                .map(|&(index, geometry)| (geometry.position(axis), index))
        });

        let room = match axis {
            Axis::X => solver.container_width(),
            Axis::Y => solver.container_height(),
        };
        let sum: usize = cluster
            .members
            .iter()
            .filter_map(|name| self.natural.get(&(name.clone(), axis)))
            .sum();
        let total = if sum == 0 { room } else { (sum as f64).min(room) };
        let count = cluster.members.len() as f64;

        tracing::debug!(
            %axis,
            panels = ?cluster.members,
            total,
            "bias applied"
        );

        let mut added = Vec::with_capacity(cluster.members.len() * 2);
        let mut previous: Option<(&str, PanelVariables)> = None;
        for name in &cluster.members {
            let vars = solver
                .variables(name)
                .ok_or_else(|| LayoutError::UnknownPanel(name.clone()))?;

            // count * size == total keeps the ratio exact inside the solver
            let share = ConstraintSolver::relate(
                Expression::new(vec![Term::new(vars.extent(axis), count)], 0.0),
                Relation::Eq,
                Expression::from_constant(total),
                Strength::Strong,
            );
            solver.add(share.clone(), &format!("bias {name} {axis} share"))?;
            added.push(share);

            if let Some((previous_name, prev)) = previous {
                if !self.relations.are_related(previous_name, name, axis) {
                    let chain = KasuariConstraint::new(
                        Expression::from(vars.position(axis))
                            - (prev.position(axis) + prev.extent(axis)),
                        Relation::Eq.operator(),
                        CHAIN_STRENGTH,
                    );
                    solver.add(chain.clone(), &format!("bias {name} {axis} chain"))?;
                    added.push(chain);
                }
            }
            previous = Some((name.as_str(), vars));
        }
        cluster.constraints = added;
        Ok(())
    }
}
