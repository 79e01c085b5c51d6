//! Per-layer overlap removal.
//!
//! Every node on a layer becomes a solver variable; adjacent nodes (in target order) get a
//! separation constraint, and optional bounds become near-immovable wall variables.

use crate::config::RemoveOverlapOptions;
use crate::error::Result;
use crate::node::{NodeArena, NodeId};
use labella_vpsc::{Constraint, Solver, Variable};

/// Weight of the synthetic variables that pin `minPos` / `maxPos`.
pub const WALL_WEIGHT: f64 = 1e10;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlapReport {
    /// Final solver cost, wall variables included.
    pub cost: f64,
    /// Constraints the solver had to drop.
    pub unsatisfiable: usize,
}

/// Places the nodes of one layer without overlap, as close to their targets as possible.
///
/// A node's target is its parent's current position when it has one (stubs chase the layer
/// below), otherwise its ideal position. `layer` is re-sorted by target.
pub fn remove_overlap<D>(
    arena: &mut NodeArena<D>,
    layer: &mut [NodeId],
    options: &RemoveOverlapOptions,
) -> Result<OverlapReport> {
    if layer.is_empty() {
        return Ok(OverlapReport::default());
    }

    let mut sorted: Vec<(NodeId, f64)> = layer
        .iter()
        .map(|&id| {
            let target = match arena[id].parent() {
                Some(parent) => arena[parent].current_pos,
                None => arena[id].ideal_pos(),
            };
            (id, target)
        })
        .collect();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
    for (slot, (id, _)) in layer.iter_mut().zip(&sorted) {
        *slot = *id;
    }

    // The left wall, when present, comes first so node `i` is variable `i + first`.
    let n = layer.len();
    let first = usize::from(options.min_pos.is_some());
    let mut variables: Vec<Variable> = Vec::with_capacity(n + 2);
    let mut constraints: Vec<Constraint> = Vec::with_capacity(n + 1);
    if let Some(min_pos) = options.min_pos {
        variables.push(Variable::new(min_pos).with_weight(WALL_WEIGHT));
    }
    variables.extend(sorted.iter().map(|&(_, t)| Variable::new(t)));

    for (i, pair) in layer.windows(2).enumerate() {
        let (a, b) = (&arena[pair[0]], &arena[pair[1]]);
        let spacing = if a.is_stub() && b.is_stub() {
            options.line_spacing
        } else {
            options.node_spacing
        };
        constraints.push(Constraint::new(
            first + i,
            first + i + 1,
            (a.width + b.width) / 2.0 + spacing,
        ));
    }
    if options.min_pos.is_some() {
        constraints.push(Constraint::new(0, first, arena[layer[0]].width / 2.0));
    }
    if let Some(max_pos) = options.max_pos {
        let last = first + n - 1;
        variables.push(Variable::new(max_pos).with_weight(WALL_WEIGHT));
        constraints.push(Constraint::new(
            last,
            last + 1,
            arena[layer[n - 1]].width / 2.0,
        ));
    }

    let mut solver = Solver::new(variables, constraints)?;
    let cost = solver.solve();
    for (i, &id) in layer.iter().enumerate() {
        arena[id].current_pos = solver.position(first + i).round_ties_even();
    }

    let unsatisfiable = solver.unsatisfiable_count();
    if unsatisfiable > 0 {
        tracing::warn!(
            nodes = n,
            unsatisfiable,
            "overlap removal dropped conflicting constraints"
        );
    }
    Ok(OverlapReport {
        cost,
        unsatisfiable,
    })
}
