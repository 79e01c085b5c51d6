//! The layout driver: distribute nodes over layers, then remove overlap layer by layer.

use crate::config::ForceOptions;
use crate::distributor::Distributor;
use crate::error::Result;
use crate::metrics::{self, Metric};
use crate::node::{Node, NodeArena, NodeId};
use crate::remove_overlap::remove_overlap;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct Force<D = ()> {
    options: ForceOptions,
    arena: NodeArena<D>,
    /// Number of caller-supplied nodes; stubs live after them in `arena`.
    inputs: usize,
    layers: Option<Vec<Vec<NodeId>>>,
    unsatisfiable: usize,
}

impl<D> Default for Force<D> {
    fn default() -> Self {
        Self {
            options: ForceOptions::default(),
            arena: NodeArena::new(),
            inputs: 0,
            layers: None,
            unsatisfiable: 0,
        }
    }
}

impl<D: Clone> Force<D> {
    pub fn new(options: ForceOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            ..Self::default()
        })
    }

    pub fn options(&self) -> &ForceOptions {
        &self.options
    }

    /// Merges a partial JSON object into the current options. On error the options are left
    /// untouched.
    pub fn set_options(&mut self, patch: &Value) -> Result<()> {
        let mut options = self.options.clone();
        options.merge(patch)?;
        self.options = options;
        Ok(())
    }

    /// Replaces the node set and forgets the previous layout.
    pub fn set_nodes(&mut self, nodes: Vec<Node<D>>) -> Vec<NodeId> {
        self.inputs = nodes.len();
        self.arena = NodeArena::from_nodes(nodes);
        self.layers = None;
        self.unsatisfiable = 0;
        self.arena.ids().collect()
    }

    /// The caller-supplied nodes, in insertion order.
    pub fn nodes(&self) -> &[Node<D>] {
        &self.arena.nodes()[..self.inputs]
    }

    pub fn node(&self, id: NodeId) -> Option<&Node<D>> {
        self.arena.get(id)
    }

    /// All nodes, stubs from the last [`Force::compute`] included.
    pub fn arena(&self) -> &NodeArena<D> {
        &self.arena
    }

    pub fn layers(&self) -> Option<&[Vec<NodeId>]> {
        self.layers.as_deref()
    }

    /// Constraints dropped as unsatisfiable during the last [`Force::compute`].
    pub fn unsatisfiable_constraints(&self) -> usize {
        self.unsatisfiable
    }

    pub fn compute(&mut self) -> Result<()> {
        let inputs: Vec<NodeId> = (0..self.inputs).map(NodeId).collect();
        for &id in &inputs {
            self.arena[id].validate(id)?;
        }
        for &id in &inputs {
            self.arena.remove_stub(id);
        }
        self.arena.truncate(self.inputs);
        self.layers = None;

        let distributor = Distributor::new(self.options.distributor_options())?;
        let mut layers = distributor.distribute(&mut self.arena, &inputs);

        let remove_options = self.options.remove_overlap_options();
        let mut unsatisfiable = 0;
        for (layer_index, layer) in layers.iter_mut().enumerate() {
            for &id in layer.iter() {
                self.arena[id].layer_index = layer_index;
            }
            unsatisfiable += remove_overlap(&mut self.arena, layer, &remove_options)?.unsatisfiable;
        }

        tracing::debug!(
            nodes = self.inputs,
            stubs = self.arena.len() - self.inputs,
            layers = layers.len(),
            unsatisfiable,
            "force layout computed"
        );
        self.unsatisfiable = unsatisfiable;
        self.layers = Some(layers);
        Ok(())
    }

    pub fn metrics(&self) -> Vec<(Metric, f64)> {
        Metric::ALL.into_iter().map(|m| (m, self.metric(m))).collect()
    }

    /// Scores the last computed layout; 0 before the first [`Force::compute`].
    pub fn metric(&self, metric: Metric) -> f64 {
        let Some(layers) = self.layers.as_deref() else {
            return 0.0;
        };
        let arena = &self.arena;
        let o = &self.options;
        match metric {
            Metric::Displacement => metrics::displacement(arena, layers),
            Metric::PathLength => metrics::path_length(arena, layers),
            Metric::OverflowSpace => metrics::overflow_space(arena, layers, o.min_pos, o.max_pos),
            Metric::OverDensitySpace => metrics::over_density_space(
                arena,
                layers,
                Some(o.density),
                o.effective_layer_width(),
                o.node_spacing - 1.0,
            ),
            Metric::OverlapCount => {
                metrics::overlap_count(arena, layers, o.node_spacing - 1.0) as f64
            }
            Metric::OverlapSpace => metrics::overlap_space(arena, layers),
            Metric::WeightedAllocation => metrics::weighted_allocation(arena, layers) as f64,
            Metric::WeightedAllocatedSpace => metrics::weighted_allocated_space(arena, layers),
        }
    }
}
