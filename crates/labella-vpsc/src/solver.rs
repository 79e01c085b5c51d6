//! Active-set solver.
//!
//! `satisfy` finds a feasible configuration by merging blocks across violated constraints and
//! splitting blocks whose internal multipliers are negative; `solve` repeats it until the cost
//! settles. All traversals over a block's constraint tree use explicit stacks.

use crate::block::{Block, BlockId, Blocks};
use crate::constraint::Constraint;
use crate::error::{Error, Result};
use crate::variable::Variable;
use rustc_hash::{FxHashMap, FxHashSet};

/// Blocks whose minimum multiplier falls below this are split.
pub const LAGRANGIAN_TOLERANCE: f64 = -1e-4;
/// Constraints with slack below this are considered violated.
pub const ZERO_UPPERBOUND: f64 = -1e-10;

const COST_TOLERANCE: f64 = 1e-4;
const MAX_SOLVE_ROUNDS: usize = 1_000;

#[derive(Debug, Clone, Copy)]
enum Step {
    Enter { c: usize, from: usize, to: usize },
    Exit { c: usize, from: usize, to: usize },
}

struct Frame {
    v: usize,
    via: Option<(usize, usize)>,
    neighbours: Vec<(usize, usize)>,
    next: usize,
}

#[derive(Debug, Clone)]
pub struct Solver {
    vars: Vec<Variable>,
    cons: Vec<Constraint>,
    blocks: Blocks,
    inactive: Vec<usize>,
}

impl Solver {
    pub fn new(variables: Vec<Variable>, constraints: Vec<Constraint>) -> Result<Self> {
        validate(&variables, &constraints)?;

        let mut vars = variables;
        for v in &mut vars {
            v.c_in.clear();
            v.c_out.clear();
        }
        let mut cons = constraints;
        for (idx, c) in cons.iter_mut().enumerate() {
            vars[c.left].c_out.push(idx);
            vars[c.right].c_in.push(idx);
            c.active = false;
            c.unsatisfiable = false;
            c.lm = 0.0;
        }

        let mut solver = Self {
            inactive: (0..cons.len()).collect(),
            vars,
            cons,
            blocks: Blocks::default(),
        };
        solver.reset_blocks();
        Ok(solver)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.vars
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.cons
    }

    pub fn unsatisfiable_count(&self) -> usize {
        self.cons.iter().filter(|c| c.unsatisfiable).count()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Current position of variable `v`.
    pub fn position(&self, v: usize) -> f64 {
        let var = &self.vars[v];
        let block = self.blocks.get(var.block);
        (block.ps.scale * block.posn + var.offset) / var.scale
    }

    pub fn positions(&self) -> Vec<f64> {
        (0..self.vars.len()).map(|v| self.position(v)).collect()
    }

    /// Total weighted squared displacement from the desired positions.
    pub fn cost(&self) -> f64 {
        let mut sum = 0.0;
        for &b in self.blocks.ids() {
            for &v in &self.blocks.get(b).vars {
                let var = &self.vars[v];
                let d = self.position(v) - var.desired_position;
                sum += d * d * var.weight;
            }
        }
        sum
    }

    /// Restarts from singleton blocks placed at `positions` with every constraint inactive.
    pub fn set_starting_positions(&mut self, positions: &[f64]) {
        self.inactive = (0..self.cons.len()).collect();
        for c in &mut self.cons {
            c.active = false;
        }
        self.reset_blocks();
        let ids = self.blocks.ids().to_vec();
        for (id, &p) in ids.into_iter().zip(positions) {
            self.blocks.get_mut(id).posn = p;
        }
    }

    pub fn set_desired_positions(&mut self, positions: &[f64]) {
        for (v, &p) in self.vars.iter_mut().zip(positions) {
            v.desired_position = p;
        }
    }

    /// Runs `satisfy` until the cost changes by no more than `1e-4`; returns the final cost.
    pub fn solve(&mut self) -> f64 {
        self.satisfy();
        let mut last_cost = f64::MAX;
        let mut cost = self.cost();
        let mut rounds = 0;
        while (last_cost - cost).abs() > COST_TOLERANCE {
            if rounds == MAX_SOLVE_ROUNDS {
                tracing::warn!(rounds, cost, "vpsc solve did not settle; keeping last state");
                break;
            }
            self.satisfy();
            last_cost = cost;
            cost = self.cost();
            rounds += 1;
        }
        cost
    }

    /// Makes the current configuration feasible.
    pub fn satisfy(&mut self) {
        self.split_blocks();

        let mut budget = self.iteration_limit();
        while let Some(c) = self.most_violated() {
            let con = &self.cons[c];
            let violated = con.equality || (self.slack(c) < ZERO_UPPERBOUND && !con.active);
            if !violated {
                break;
            }
            let (left, right) = (con.left, con.right);
            if budget == 0 {
                tracing::warn!(constraint = c, "vpsc satisfy hit its iteration limit");
                self.inactive.push(c);
                break;
            }
            budget -= 1;

            let lb = self.vars[left].block;
            let rb = self.vars[right].block;
            if lb != rb {
                self.merge(c);
                continue;
            }

            if self.is_active_directed_path_between(right, left) {
                self.mark_unsatisfiable(c);
                continue;
            }
            let Some(split) = self.find_min_lm_between(left, right) else {
                self.mark_unsatisfiable(c);
                continue;
            };
            let (nl, nr) = self.split_at(split);
            self.blocks.insert(nl);
            self.blocks.insert(nr);
            self.blocks.remove(lb);
            self.inactive.push(split);

            if self.slack(c) >= 0.0 {
                self.inactive.push(c);
            } else {
                self.merge(c);
            }
        }
    }

    fn iteration_limit(&self) -> usize {
        let size = self.vars.len() + self.cons.len() + 1;
        size.saturating_mul(size).max(1_000)
    }

    fn reset_blocks(&mut self) {
        self.blocks = Blocks::default();
        for v in 0..self.vars.len() {
            let id = self.new_block(v);
            self.blocks.insert(id);
        }
    }

    fn mark_unsatisfiable(&mut self, c: usize) {
        let con = &mut self.cons[c];
        con.unsatisfiable = true;
        tracing::warn!(
            constraint = c,
            left = con.left,
            right = con.right,
            gap = con.gap,
            "dropping unsatisfiable separation constraint"
        );
    }

    fn slack(&self, c: usize) -> f64 {
        let con = &self.cons[c];
        if con.unsatisfiable {
            return f64::MAX;
        }
        self.vars[con.right].scale * self.position(con.right)
            - con.gap
            - self.vars[con.left].scale * self.position(con.left)
    }

    fn dfdv(&self, v: usize) -> f64 {
        let var = &self.vars[v];
        2.0 * var.weight * (self.position(v) - var.desired_position)
    }

    /// Picks the inactive constraint with the least slack; equality constraints win outright.
    /// It is taken off the inactive list only when it needs to be enforced.
    fn most_violated(&mut self) -> Option<usize> {
        let mut min_slack = f64::MAX;
        let mut found: Option<(usize, usize)> = None;
        for (idx, &c) in self.inactive.iter().enumerate() {
            let con = &self.cons[c];
            if con.unsatisfiable {
                continue;
            }
            let slack = self.slack(c);
            if con.equality || slack < min_slack {
                min_slack = slack;
                found = Some((idx, c));
                if con.equality {
                    break;
                }
            }
        }

        let (idx, c) = found?;
        let con = &self.cons[c];
        if (min_slack < ZERO_UPPERBOUND && !con.active) || con.equality {
            self.inactive.swap_remove(idx);
        }
        Some(c)
    }

    fn new_block(&mut self, v: usize) -> BlockId {
        let id = self.blocks.alloc(Block::new(self.vars[v].scale));
        self.vars[v].offset = 0.0;
        self.add_variable(id, v);
        id
    }

    fn add_variable(&mut self, b: BlockId, v: usize) {
        self.vars[v].block = b;
        let block = self.blocks.get_mut(b);
        block.vars.push(v);
        block.ps.add_variable(&self.vars[v]);
        block.posn = block.ps.posn();
    }

    fn update_block_positions(&mut self) {
        let ids = self.blocks.ids().to_vec();
        for b in ids {
            let block = self.blocks.get_mut(b);
            block.ps.reset();
            for &v in &block.vars {
                block.ps.add_variable(&self.vars[v]);
            }
            block.posn = block.ps.posn();
        }
    }

    /// Splits every block whose minimum multiplier is negative. Blocks created here are not
    /// revisited until the next pass.
    fn split_blocks(&mut self) {
        self.update_block_positions();
        let snapshot = self.blocks.ids().to_vec();
        for b in snapshot {
            let Some(&root) = self.blocks.get(b).vars.first() else {
                continue;
            };
            let Some(c) = self.find_min_lm(root) else {
                continue;
            };
            if self.cons[c].lm < LAGRANGIAN_TOLERANCE {
                let (nl, nr) = self.split_at(c);
                tracing::trace!(constraint = c, lm = self.cons[c].lm, "split block");
                self.blocks.insert(nl);
                self.blocks.insert(nr);
                self.blocks.remove(b);
                self.inactive.push(c);
            }
        }
    }

    /// Merges the blocks on either side of `c`; the smaller block moves.
    fn merge(&mut self, c: usize) {
        let con = &self.cons[c];
        let l = self.vars[con.left].block;
        let r = self.vars[con.right].block;
        let dist = self.vars[con.right].offset - self.vars[con.left].offset - con.gap;
        tracing::trace!(constraint = c, dist, "merge blocks");
        if self.blocks.get(l).vars.len() < self.blocks.get(r).vars.len() {
            self.merge_across(r, l, c, dist);
            self.blocks.remove(l);
        } else {
            self.merge_across(l, r, c, -dist);
            self.blocks.remove(r);
        }
    }

    fn merge_across(&mut self, target: BlockId, source: BlockId, c: usize, dist: f64) {
        self.cons[c].active = true;
        let moved = std::mem::take(&mut self.blocks.get_mut(source).vars);
        for v in moved {
            self.vars[v].offset += dist;
            self.add_variable(target, v);
        }
    }

    /// Deactivates `c` and rebuilds one block on each side of it. The caller updates the live
    /// block list.
    fn split_at(&mut self, c: usize) -> (BlockId, BlockId) {
        self.cons[c].active = false;
        let (left, right) = (self.cons[c].left, self.cons[c].right);
        let lb = self.create_split_block(left);
        let rb = self.create_split_block(right);
        (lb, rb)
    }

    fn create_split_block(&mut self, start: usize) -> BlockId {
        let id = self.new_block(start);
        for step in self.walk(start, None) {
            let Step::Enter { c, from, to } = step else {
                continue;
            };
            let gap = self.cons[c].gap;
            let offset = if to == self.cons[c].right {
                self.vars[from].offset + gap
            } else {
                self.vars[from].offset - gap
            };
            self.vars[to].offset = offset;
            self.add_variable(id, to);
        }
        id
    }

    fn active_neighbours(&self, v: usize, prev: Option<usize>) -> Vec<(usize, usize)> {
        let var = &self.vars[v];
        let outs = var.c_out.iter().map(|&c| (c, self.cons[c].right));
        let ins = var.c_in.iter().map(|&c| (c, self.cons[c].left));
        outs.chain(ins)
            .filter(|&(c, next)| self.cons[c].active && Some(next) != prev)
            .collect()
    }

    /// Depth-first walk over the active constraint tree containing `root`, in the order a
    /// recursive visit would produce: `Enter` in pre-order, `Exit` in post-order.
    fn walk(&self, root: usize, prev: Option<usize>) -> Vec<Step> {
        let mut steps = Vec::new();
        let mut stack = vec![Frame {
            v: root,
            via: None,
            neighbours: self.active_neighbours(root, prev),
            next: 0,
        }];
        loop {
            let Some(frame) = stack.last_mut() else {
                break;
            };
            match frame.neighbours.get(frame.next).copied() {
                Some((c, to)) => {
                    frame.next += 1;
                    let from = frame.v;
                    steps.push(Step::Enter { c, from, to });
                    stack.push(Frame {
                        v: to,
                        via: Some((c, from)),
                        neighbours: self.active_neighbours(to, Some(from)),
                        next: 0,
                    });
                }
                None => {
                    let Some(done) = stack.pop() else {
                        break;
                    };
                    if let Some((c, from)) = done.via {
                        steps.push(Step::Exit { c, from, to: done.v });
                    }
                }
            }
        }
        steps
    }

    /// Recomputes the multipliers of every active constraint reachable from `root`; returns the
    /// constraints in the order their multipliers were finalized.
    fn compute_lm(&mut self, root: usize) -> Vec<usize> {
        let steps = self.walk(root, None);
        let mut dfdv: FxHashMap<usize, f64> = FxHashMap::default();
        dfdv.insert(root, self.dfdv(root));
        let mut order = Vec::new();
        for step in steps {
            match step {
                Step::Enter { to, .. } => {
                    dfdv.insert(to, self.dfdv(to));
                }
                Step::Exit { c, from, to } => {
                    let child = dfdv.get(&to).copied().unwrap_or(0.0) / self.vars[to].scale;
                    let con = &self.cons[c];
                    let (contribution, lm) = if to == con.right {
                        (child * self.vars[con.left].scale, child)
                    } else {
                        (child * self.vars[con.right].scale, -child)
                    };
                    *dfdv.entry(from).or_insert(0.0) += contribution;
                    self.cons[c].lm = lm;
                    order.push(c);
                }
            }
        }
        order
    }

    fn find_min_lm(&mut self, root: usize) -> Option<usize> {
        let mut min: Option<usize> = None;
        for c in self.compute_lm(root) {
            let con = &self.cons[c];
            if con.equality {
                continue;
            }
            if min.is_none_or(|m| con.lm < self.cons[m].lm) {
                min = Some(c);
            }
        }
        min
    }

    /// Minimum-multiplier constraint on the block path from `lv` to `rv` that points forward
    /// along the path.
    fn find_min_lm_between(&mut self, lv: usize, rv: usize) -> Option<usize> {
        self.compute_lm(lv);
        let mut min: Option<usize> = None;
        for (c, next) in self.find_path(lv, rv) {
            let con = &self.cons[c];
            if con.equality || con.right != next {
                continue;
            }
            if min.is_none_or(|m| con.lm < self.cons[m].lm) {
                min = Some(c);
            }
        }
        min
    }

    /// Edges of the active tree path from `from` to `to`, nearest to `to` first.
    fn find_path(&self, from: usize, to: usize) -> Vec<(usize, usize)> {
        let mut reached_by: FxHashMap<usize, (usize, usize)> = FxHashMap::default();
        for step in self.walk(from, None) {
            if let Step::Enter { c, from: parent, to: child } = step {
                reached_by.insert(child, (c, parent));
                if child == to {
                    break;
                }
            }
        }

        let mut path = Vec::new();
        let mut cur = to;
        while cur != from {
            let Some(&(c, parent)) = reached_by.get(&cur) else {
                return Vec::new();
            };
            path.push((c, cur));
            cur = parent;
        }
        path
    }

    fn is_active_directed_path_between(&self, u: usize, v: usize) -> bool {
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        let mut stack = vec![u];
        while let Some(cur) = stack.pop() {
            if cur == v {
                return true;
            }
            if !seen.insert(cur) {
                continue;
            }
            for &c in self.vars[cur].c_out.iter() {
                let con = &self.cons[c];
                if con.active {
                    stack.push(con.right);
                }
            }
        }
        false
    }
}

fn validate(variables: &[Variable], constraints: &[Constraint]) -> Result<()> {
    for (index, v) in variables.iter().enumerate() {
        for (field, value) in [
            ("desired_position", v.desired_position),
            ("weight", v.weight),
            ("scale", v.scale),
        ] {
            if !value.is_finite() {
                return Err(Error::NonFinite {
                    owner: "variable",
                    field,
                    index,
                    value,
                });
            }
        }
        for (field, value) in [("weight", v.weight), ("scale", v.scale)] {
            if value <= 0.0 {
                return Err(Error::NonPositive {
                    field,
                    index,
                    value,
                });
            }
        }
    }
    for (index, c) in constraints.iter().enumerate() {
        for variable in [c.left, c.right] {
            if variable >= variables.len() {
                return Err(Error::MissingVariable {
                    constraint: index,
                    variable,
                });
            }
        }
        if !c.gap.is_finite() {
            return Err(Error::NonFinite {
                owner: "constraint",
                field: "gap",
                index,
                value: c.gap,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(desired: &[f64], gap: f64) -> Solver {
        let vars = desired.iter().map(|&d| Variable::new(d)).collect();
        let cons = (1..desired.len())
            .map(|i| Constraint::new(i - 1, i, gap))
            .collect();
        Solver::new(vars, cons).unwrap()
    }

    #[test]
    fn walk_visits_the_active_tree_depth_first() {
        let mut s = chain(&[0.0, 0.0, 0.0], 1.0);
        s.satisfy();
        assert_eq!(s.block_count(), 1);

        let steps = s.walk(0, None);
        let entered: Vec<usize> = steps
            .iter()
            .filter_map(|s| match s {
                Step::Enter { to, .. } => Some(*to),
                Step::Exit { .. } => None,
            })
            .collect();
        let exited: Vec<usize> = steps
            .iter()
            .filter_map(|s| match s {
                Step::Exit { to, .. } => Some(*to),
                Step::Enter { .. } => None,
            })
            .collect();
        assert_eq!(entered, vec![1, 2]);
        assert_eq!(exited, vec![2, 1]);
    }

    #[test]
    fn find_path_lists_edges_from_the_far_end() {
        let mut s = chain(&[0.0, 0.0, 0.0], 1.0);
        s.satisfy();
        assert_eq!(s.find_path(0, 2), vec![(1, 2), (0, 1)]);
        assert_eq!(s.find_path(2, 0), vec![(0, 0), (1, 1)]);
    }

    #[test]
    fn directed_path_follows_constraint_direction() {
        let mut s = chain(&[0.0, 0.0, 0.0], 1.0);
        s.satisfy();
        assert!(s.is_active_directed_path_between(0, 2));
        assert!(!s.is_active_directed_path_between(2, 0));
    }

    #[test]
    fn tight_chain_has_nonnegative_multipliers() {
        let mut s = chain(&[0.0, 0.0, 0.0], 1.0);
        s.solve();
        let order = s.compute_lm(0);
        assert_eq!(order.len(), 2);
        for c in order {
            assert!(s.cons[c].lm >= 0.0);
        }
    }
}
