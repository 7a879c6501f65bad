//! Graph data structures and operations.
//!
//! This module provides the graph store the arrangers work against, using
//! petgraph's StableGraph for stable node/edge indices, with Structure of
//! Arrays (SoA) layout for coordinates so they can be uploaded without copies.

mod edge;
mod engine;
mod node;

pub use edge::EdgeId;
pub use engine::GraphEngine;
pub use node::NodeId;
