#![forbid(unsafe_code)]

//! Variable placement with separation constraints (VPSC).
//!
//! Minimizes `Σ weight_i · (scale_i · x_i − desired_i)²`-style displacement subject to ordered
//! pairwise constraints `left + gap ≤ right` (or `=` for equality constraints), using the
//! incremental active-set method from WebCola's `vpsc.ts`. Variables are merged into rigid
//! blocks as constraints become tight and split again when a Lagrange multiplier turns
//! negative.
//!
//! The solver is headless and allocation-scoped: build one [`Solver`] per problem, call
//! [`Solver::solve`], then read [`Solver::position`].

mod block;
pub mod constraint;
pub mod error;
pub mod solver;
pub mod variable;

pub use constraint::Constraint;
pub use error::{Error, Result};
pub use solver::{LAGRANGIAN_TOLERANCE, Solver, ZERO_UPPERBOUND};
pub use variable::Variable;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
