//! Solver variables.

use crate::block::BlockId;

/// One unknown of the placement problem.
///
/// `offset` and block membership are solver-owned; callers only choose the desired position,
/// the weight and the scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub desired_position: f64,
    pub weight: f64,
    pub scale: f64,
    pub(crate) offset: f64,
    pub(crate) block: BlockId,
    pub(crate) c_in: Vec<usize>,
    pub(crate) c_out: Vec<usize>,
}

impl Variable {
    pub fn new(desired_position: f64) -> Self {
        Self {
            desired_position,
            weight: 1.0,
            scale: 1.0,
            offset: 0.0,
            block: BlockId::default(),
            c_in: Vec::new(),
            c_out: Vec::new(),
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Offset relative to the reference position of the block this variable belongs to.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Indices of constraints where this variable is the right-hand side.
    pub fn constraints_in(&self) -> &[usize] {
        &self.c_in
    }

    /// Indices of constraints where this variable is the left-hand side.
    pub fn constraints_out(&self) -> &[usize] {
        &self.c_out
    }
}
