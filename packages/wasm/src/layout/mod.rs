//! Layout algorithms for graph visualization.
//!
//! Arrangers compute node positions on the CPU and write them straight into
//! a [`NodeStore`]. The grid arranger lays out one node set; the component
//! arranger splits a node set into connected components and grids each one.

pub mod cancel;
pub mod grid;
pub mod mean;
pub mod store;
pub mod taxonomy;

pub use cancel::CancellationToken;
pub use grid::{Arrangement, GridArranger, GridParameters, GridShape};
pub use store::{DEFAULT_RADIUS, NodeStore, Point3};
pub use taxonomy::{ComponentGridArranger, ComponentTaxonomy};
