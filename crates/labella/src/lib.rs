#![forbid(unsafe_code)]

//! Label placement for timelines.
//!
//! Labels have an ideal position on a 1-D axis and a width. [`Force`] spreads them over as
//! many layers as the available width requires (adding stubs where a connector crosses a
//! layer) and then shifts each layer so no two labels overlap, keeping them as close to their
//! ideal positions as the constraints allow. Positions are solved with [`vpsc`].

pub use labella_vpsc as vpsc;

pub mod config;
pub mod distributor;
pub mod error;
pub mod force;
pub mod interval;
pub mod metrics;
pub mod node;
pub mod remove_overlap;

pub use config::{Algorithm, DistributorOptions, ForceOptions, RemoveOverlapOptions};
pub use distributor::Distributor;
pub use error::{Error, Result};
pub use force::Force;
pub use metrics::Metric;
pub use node::{Node, NodeArena, NodeId};
pub use remove_overlap::{OverlapReport, remove_overlap};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
