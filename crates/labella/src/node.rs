//! Nodes (labels) and the arena that owns them.
//!
//! A node whose `child` is set is a stub: a placeholder on an intermediate layer that keeps the
//! connector of the node above it continuous. Chains run from a label down through its stubs to
//! the layer-0 root; links are `NodeId`s into the owning [`NodeArena`].

use crate::error::{Error, Result};
use std::ops::{Index, IndexMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node<D = ()> {
    ideal_pos: f64,
    pub current_pos: f64,
    pub width: f64,
    pub layer_index: usize,
    pub data: D,
    pub(crate) parent: Option<NodeId>,
    pub(crate) child: Option<NodeId>,
    pub(crate) overlap_count: usize,
    pub(crate) overlaps: Vec<NodeId>,
}

impl Node {
    pub fn new(ideal_pos: f64, width: f64) -> Self {
        Self::with_data(ideal_pos, width, ())
    }
}

impl<D> Node<D> {
    pub fn with_data(ideal_pos: f64, width: f64, data: D) -> Self {
        Self {
            ideal_pos,
            current_pos: ideal_pos,
            width,
            layer_index: 0,
            data,
            parent: None,
            child: None,
            overlap_count: 0,
            overlaps: Vec::new(),
        }
    }

    pub fn ideal_pos(&self) -> f64 {
        self.ideal_pos
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn child(&self) -> Option<NodeId> {
        self.child
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_stub(&self) -> bool {
        self.child.is_some()
    }

    /// Ideal-overlap count from the last distributor pass.
    pub fn overlap_count(&self) -> usize {
        self.overlap_count
    }

    pub fn overlaps(&self) -> &[NodeId] {
        &self.overlaps
    }

    /// Gap between the current extents of `self` and `other`; negative when they overlap.
    pub fn distance_from<E>(&self, other: &Node<E>) -> f64 {
        let half = self.width / 2.0;
        let other_half = other.width / 2.0;
        let max = (self.current_pos - half).max(other.current_pos - other_half);
        let min = (self.current_pos + half).min(other.current_pos + other_half);
        max - min
    }

    pub fn move_to_ideal_position(&mut self) {
        self.current_pos = self.ideal_pos;
    }

    pub fn displacement(&self) -> f64 {
        self.ideal_pos - self.current_pos
    }

    pub fn overlaps_node<E>(&self, other: &Node<E>, buffer: f64) -> bool {
        self.distance_from(other) - buffer < 0.0
    }

    pub fn overlaps_point(&self, pos: f64) -> bool {
        pos >= self.current_left() && pos <= self.current_right()
    }

    /// Center position that puts `self` just left of `other`, `buffer` apart.
    pub fn position_before<E>(&self, other: &Node<E>, buffer: f64) -> f64 {
        other.current_left() - self.width / 2.0 - buffer
    }

    /// Center position that puts `self` just right of `other`, `buffer` apart.
    pub fn position_after<E>(&self, other: &Node<E>, buffer: f64) -> f64 {
        other.current_right() + self.width / 2.0 + buffer
    }

    pub fn current_left(&self) -> f64 {
        self.current_pos - self.width / 2.0
    }

    pub fn current_right(&self) -> f64 {
        self.current_pos + self.width / 2.0
    }

    pub fn ideal_left(&self) -> f64 {
        self.ideal_pos - self.width / 2.0
    }

    pub fn ideal_right(&self) -> f64 {
        self.ideal_pos + self.width / 2.0
    }

    pub(crate) fn validate(&self, id: NodeId) -> Result<()> {
        for (field, value) in [("ideal_pos", self.ideal_pos), ("width", self.width)] {
            if !value.is_finite() {
                return Err(Error::InvalidInput {
                    node: id.index(),
                    field,
                    value,
                });
            }
        }
        if self.width < 0.0 {
            return Err(Error::InvalidInput {
                node: id.index(),
                field: "width",
                value: self.width,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct NodeArena<D = ()> {
    nodes: Vec<Node<D>>,
}

impl<D> Default for NodeArena<D> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<D> NodeArena<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: Vec<Node<D>>) -> Self {
        Self { nodes }
    }

    pub fn add(&mut self, node: Node<D>) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node<D>> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<D>> {
        self.nodes.get_mut(id.index())
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node<D>)> + '_ {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn nodes(&self) -> &[Node<D>] {
        &self.nodes
    }

    /// Drops every node from `len` on and clears links that pointed at them.
    pub fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
        for node in &mut self.nodes {
            if node.parent.is_some_and(|p| p.index() >= len) {
                node.parent = None;
            }
            if node.child.is_some_and(|c| c.index() >= len) {
                node.child = None;
            }
        }
    }

    pub fn is_stub(&self, id: NodeId) -> bool {
        self[id].is_stub()
    }

    /// Detaches `id` from its parent stub, if any.
    pub fn remove_stub(&mut self, id: NodeId) {
        if let Some(parent) = self[id].parent.take() {
            self[parent].child = None;
        }
    }

    /// `id`, its parent, its grandparent, ... up to the root.
    pub fn path_to_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut cur = id;
        while let Some(parent) = self[cur].parent {
            path.push(parent);
            cur = parent;
        }
        path
    }

    pub fn path_from_root(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = self.path_to_root(id);
        path.reverse();
        path
    }

    /// Total horizontal travel of the connector from the root up to `id`.
    pub fn path_to_root_length(&self, id: NodeId) -> f64 {
        let mut length = 0.0;
        for step in self.path_to_root(id) {
            let node = &self[step];
            let target = match node.parent {
                Some(parent) => self[parent].current_pos,
                None => node.ideal_pos,
            };
            length += (node.current_pos - target).abs();
        }
        length
    }

    pub fn root(&self, id: NodeId) -> NodeId {
        let mut cur = id;
        while let Some(parent) = self[cur].parent {
            cur = parent;
        }
        cur
    }
}

impl<D: Clone> NodeArena<D> {
    /// Inserts a stub of the given width beneath `id` and returns it.
    pub fn create_stub(&mut self, id: NodeId, width: f64) -> NodeId {
        self.remove_stub(id);
        let node = &self[id];
        let mut stub = Node::with_data(node.ideal_pos, width, node.data.clone());
        stub.current_pos = node.current_pos;
        stub.child = Some(id);
        let stub_id = self.add(stub);
        self[id].parent = Some(stub_id);
        stub_id
    }

    /// Copy of the node's placement without any chain links.
    pub fn clone_node(&self, id: NodeId) -> Node<D> {
        let node = &self[id];
        let mut copy = Node::with_data(node.ideal_pos, node.width, node.data.clone());
        copy.current_pos = node.current_pos;
        copy.layer_index = node.layer_index;
        copy
    }
}

impl<D> Index<NodeId> for NodeArena<D> {
    type Output = Node<D>;

    fn index(&self, id: NodeId) -> &Self::Output {
        &self.nodes[id.index()]
    }
}

impl<D> IndexMut<NodeId> for NodeArena<D> {
    fn index_mut(&mut self, id: NodeId) -> &mut Self::Output {
        &mut self.nodes[id.index()]
    }
}
