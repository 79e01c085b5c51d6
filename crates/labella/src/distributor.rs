//! Layer assignment.
//!
//! When the labels of a timeline do not fit on one layer, the distributor spreads them over
//! several and threads stubs through the layers in between so every connector stays continuous.

use crate::config::{Algorithm, DistributorOptions};
use crate::error::Result;
use crate::interval::IntervalIndex;
use crate::node::{NodeArena, NodeId};

#[derive(Debug, Clone, Default)]
pub struct Distributor {
    options: DistributorOptions,
}

impl Distributor {
    pub fn new(options: DistributorOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &DistributorOptions {
        &self.options
    }

    /// Width of `nodes` laid side by side, `node_spacing` apart.
    pub fn compute_required_width<D>(&self, arena: &NodeArena<D>, nodes: &[NodeId]) -> f64 {
        if nodes.is_empty() {
            return 0.0;
        }
        let widths: f64 = nodes.iter().map(|&id| arena[id].width).sum();
        widths + (nodes.len() - 1) as f64 * self.options.node_spacing
    }

    pub fn max_width_per_layer(&self) -> Option<f64> {
        self.options
            .layer_width
            .map(|width| self.options.density * width)
    }

    pub fn need_to_split<D>(&self, arena: &NodeArena<D>, nodes: &[NodeId]) -> bool {
        self.estimate_required_layers(arena, nodes) > 1
    }

    pub fn estimate_required_layers<D>(&self, arena: &NodeArena<D>, nodes: &[NodeId]) -> usize {
        match self.max_width_per_layer() {
            Some(max) => {
                let layers = (self.compute_required_width(arena, nodes) / max).ceil();
                if layers > 1.0 { layers as usize } else { 1 }
            }
            None => 1,
        }
    }

    /// Splits `nodes` into layers, bottom (closest to the axis) first.
    ///
    /// Stubs created for nodes above layer 0 are added to `arena` and appended to the layers
    /// they pass through.
    pub fn distribute<D: Clone>(
        &self,
        arena: &mut NodeArena<D>,
        nodes: &[NodeId],
    ) -> Vec<Vec<NodeId>> {
        if nodes.is_empty() {
            return Vec::new();
        }
        let split: fn(&Self, &mut NodeArena<D>, &[NodeId]) -> Vec<Vec<NodeId>> =
            match self.options.algorithm {
                Algorithm::None => return vec![nodes.to_vec()],
                Algorithm::Simple => Self::algorithm_simple,
                Algorithm::Overlap => Self::algorithm_overlap,
            };

        let mut sorted = nodes.to_vec();
        sorted.sort_by(|&a, &b| arena[a].ideal_pos().total_cmp(&arena[b].ideal_pos()));

        if !self.need_to_split(arena, &sorted) {
            return vec![sorted];
        }
        split(self, arena, &sorted)
    }

    /// Round robin over the estimated number of layers, capped at one layer per node.
    pub fn algorithm_simple<D: Clone>(
        &self,
        arena: &mut NodeArena<D>,
        nodes: &[NodeId],
    ) -> Vec<Vec<NodeId>> {
        // Layers past `nodes.len()` would stay empty.
        let num_layers = self
            .estimate_required_layers(arena, nodes)
            .min(nodes.len())
            .max(1);
        let mut layers: Vec<Vec<NodeId>> = vec![Vec::new(); num_layers];

        for (i, &id) in nodes.iter().enumerate() {
            let target = i % num_layers;
            layers[target].push(id);

            let mut stub = id;
            for layer in layers[..target].iter_mut().rev() {
                stub = arena.create_stub(stub, self.options.stub_width);
                layer.push(stub);
            }
        }
        layers
    }

    /// Keeps punting the node with the most ideal overlaps to the next layer until the
    /// remaining nodes fit.
    pub fn algorithm_overlap<D: Clone>(
        &self,
        arena: &mut NodeArena<D>,
        nodes: &[NodeId],
    ) -> Vec<Vec<NodeId>> {
        let Some(max_width) = self.max_width_per_layer() else {
            return vec![nodes.to_vec()];
        };
        let mut layers: Vec<Vec<NodeId>> = Vec::new();

        let mut punted = nodes.to_vec();
        let mut punted_width = self.compute_required_width(arena, &punted);

        while punted_width > max_width {
            count_ideal_overlaps(arena, &punted);

            let mut current = std::mem::take(&mut punted);
            let mut current_width = punted_width;

            while current.len() > 2 && current_width > max_width {
                current.sort_by(|&a, &b| arena[b].overlap_count.cmp(&arena[a].overlap_count));
                let first = current.remove(0);

                current_width -= arena[first].width;
                current_width += self.options.stub_width;

                for k in 0..arena[first].overlaps.len() {
                    let other = arena[first].overlaps[k];
                    let count = &mut arena[other].overlap_count;
                    *count = count.saturating_sub(1);
                }
                punted.push(first);
            }

            tracing::debug!(
                layer = layers.len(),
                kept = current.len(),
                punted = punted.len(),
                "distributor round"
            );
            layers.push(current);
            punted_width = self.compute_required_width(arena, &punted);
        }

        if !punted.is_empty() {
            layers.push(punted);
        }

        // Every label above layer 0 gets one stub on each layer beneath it.
        for i in (1..layers.len()).rev() {
            for k in 0..layers[i].len() {
                let id = layers[i][k];
                if arena.is_stub(id) {
                    continue;
                }
                let mut stub = id;
                for layer in layers[..i].iter_mut().rev() {
                    stub = arena.create_stub(stub, self.options.stub_width);
                    layer.push(stub);
                }
            }
        }
        layers
    }
}

/// Records, for each of `nodes`, which of them (itself included) its ideal extent intersects.
pub fn count_ideal_overlaps<D>(arena: &mut NodeArena<D>, nodes: &[NodeId]) {
    let index = IntervalIndex::new(
        nodes
            .iter()
            .map(|&id| (arena[id].ideal_left(), arena[id].ideal_right(), id)),
    );
    for &id in nodes {
        let (left, right) = (arena[id].ideal_left(), arena[id].ideal_right());
        let overlaps: Vec<NodeId> = index.query(left, right).into_iter().copied().collect();
        let node = &mut arena[id];
        node.overlap_count = overlaps.len();
        node.overlaps = overlaps;
    }
}
