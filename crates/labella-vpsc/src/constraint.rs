//! Separation constraints between two variables.

/// `left + gap <= right`, or `left + gap == right` when `equality` is set.
///
/// `left` and `right` are indices into the variable list handed to the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub left: usize,
    pub right: usize,
    pub gap: f64,
    pub equality: bool,
    pub(crate) active: bool,
    pub(crate) unsatisfiable: bool,
    pub(crate) lm: f64,
}

impl Constraint {
    pub fn new(left: usize, right: usize, gap: f64) -> Self {
        Self {
            left,
            right,
            gap,
            equality: false,
            active: false,
            unsatisfiable: false,
            lm: 0.0,
        }
    }

    pub fn equality(left: usize, right: usize, gap: f64) -> Self {
        Self {
            equality: true,
            ..Self::new(left, right, gap)
        }
    }

    /// Whether the constraint is currently tight and part of a block.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Set when the constraint closed a cycle of active constraints and had to be dropped.
    pub fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    /// Lagrange multiplier from the most recent multiplier sweep over its block.
    pub fn lm(&self) -> f64 {
        self.lm
    }
}
