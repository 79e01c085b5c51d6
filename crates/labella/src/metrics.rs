//! Layout quality metrics.
//!
//! Every metric reads a solved layout as `(arena, layers)`; empty input scores 0.

use crate::error::{Error, Result};
use crate::node::{NodeArena, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    Displacement,
    PathLength,
    OverflowSpace,
    OverDensitySpace,
    OverlapCount,
    OverlapSpace,
    WeightedAllocation,
    WeightedAllocatedSpace,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::Displacement,
        Metric::PathLength,
        Metric::OverflowSpace,
        Metric::OverDensitySpace,
        Metric::OverlapCount,
        Metric::OverlapSpace,
        Metric::WeightedAllocation,
        Metric::WeightedAllocatedSpace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Displacement => "displacement",
            Self::PathLength => "pathLength",
            Self::OverflowSpace => "overflowSpace",
            Self::OverDensitySpace => "overDensitySpace",
            Self::OverlapCount => "overlapCount",
            Self::OverlapSpace => "overlapSpace",
            Self::WeightedAllocation => "weightedAllocation",
            Self::WeightedAllocatedSpace => "weightedAllocatedSpace",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| Error::config(format!("unknown metric: {s}")))
    }
}

fn nodes<'a>(layers: &'a [Vec<NodeId>]) -> impl Iterator<Item = NodeId> + 'a {
    layers.iter().flatten().copied()
}

fn mean_over_labels<D>(
    arena: &NodeArena<D>,
    layers: &[Vec<NodeId>],
    value: impl Fn(NodeId) -> f64,
) -> f64 {
    let (sum, count) = nodes(layers)
        .filter(|&id| !arena.is_stub(id))
        .fold((0.0, 0usize), |(sum, count), id| (sum + value(id), count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Mean distance between ideal and current position, stubs excluded.
pub fn displacement<D>(arena: &NodeArena<D>, layers: &[Vec<NodeId>]) -> f64 {
    mean_over_labels(arena, layers, |id| arena[id].displacement().abs())
}

/// Mean connector travel from each label down to its root, stubs excluded.
pub fn path_length<D>(arena: &NodeArena<D>, layers: &[Vec<NodeId>]) -> f64 {
    mean_over_labels(arena, layers, |id| arena.path_to_root_length(id).abs())
}

/// Total extent lying outside `[min_pos, max_pos]`.
pub fn overflow_space<D>(
    arena: &NodeArena<D>,
    layers: &[Vec<NodeId>],
    min_pos: Option<f64>,
    max_pos: Option<f64>,
) -> f64 {
    let mut total = 0.0;
    for id in nodes(layers) {
        let node = &arena[id];
        let (l, r) = (node.current_left(), node.current_right());
        if let Some(min) = min_pos {
            if r <= min {
                total += node.width;
            } else if l < min {
                total += min - l;
            }
        }
        if let Some(max) = max_pos {
            if l >= max {
                total += node.width;
            } else if r > max {
                total += r - max;
            }
        }
    }
    total
}

/// Width by which each layer exceeds `density * layer_width`, summed over layers.
pub fn over_density_space<D>(
    arena: &NodeArena<D>,
    layers: &[Vec<NodeId>],
    density: Option<f64>,
    layer_width: Option<f64>,
    node_spacing: f64,
) -> f64 {
    let (Some(density), Some(layer_width)) = (density, layer_width) else {
        return 0.0;
    };
    let limit = density * layer_width;
    layers
        .iter()
        .filter(|layer| !layer.is_empty())
        .map(|layer| {
            let width: f64 = layer.iter().map(|&id| arena[id].width + node_spacing).sum();
            (width - node_spacing - limit).max(0.0)
        })
        .sum()
}

/// Number of same-layer pairs closer than `buffer`.
pub fn overlap_count<D>(arena: &NodeArena<D>, layers: &[Vec<NodeId>], buffer: f64) -> usize {
    layers
        .iter()
        .map(|layer| {
            pairs(layer)
                .filter(|&(a, b)| arena[a].overlaps_node(&arena[b], buffer))
                .count()
        })
        .sum()
}

/// Summed overlap of same-layer pairs, divided by the number of nodes.
pub fn overlap_space<D>(arena: &NodeArena<D>, layers: &[Vec<NodeId>]) -> f64 {
    let count: usize = layers.iter().map(Vec::len).sum();
    if count == 0 {
        return 0.0;
    }
    let total: f64 = layers
        .iter()
        .flat_map(|layer| pairs(layer))
        .map(|(a, b)| (-arena[a].distance_from(&arena[b])).max(0.0))
        .sum();
    total / count as f64
}

/// `Σ layer_index * labels on that layer`.
pub fn weighted_allocation<D>(arena: &NodeArena<D>, layers: &[Vec<NodeId>]) -> usize {
    layers
        .iter()
        .enumerate()
        .map(|(i, layer)| i * layer.iter().filter(|&&id| !arena.is_stub(id)).count())
        .sum()
}

/// `Σ layer_index * total width on that layer`, stubs included.
pub fn weighted_allocated_space<D>(arena: &NodeArena<D>, layers: &[Vec<NodeId>]) -> f64 {
    layers
        .iter()
        .enumerate()
        .map(|(i, layer)| i as f64 * layer.iter().map(|&id| arena[id].width).sum::<f64>())
        .sum()
}

fn pairs(layer: &[NodeId]) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
    layer
        .iter()
        .enumerate()
        .flat_map(move |(i, &a)| layer[i + 1..].iter().map(move |&b| (a, b)))
}
