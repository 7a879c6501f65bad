//! The node-store boundary consumed by the arrangers.
//!
//! Arrangers never own nodes. They read radii, neighbors and coordinates
//! through [`NodeStore`] and write coordinates back through it, so the same
//! algorithm runs against the in-memory [`GraphEngine`](crate::graph::GraphEngine),
//! a filtered view of it, or any host-side graph representation.

use std::ops::{Add, Sub};

use super::mean;
use crate::graph::NodeId;

/// Radius reported for nodes when the store has no radius attribute.
pub const DEFAULT_RADIUS: f32 = 1.0;

/// A position in graph space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

impl Add for Point3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Point3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Everything an arranger needs from the graph that owns the nodes.
///
/// Only [`set_coordinates`](NodeStore::set_coordinates) and
/// [`translate_all`](NodeStore::translate_all) mutate the store. Callers hold
/// exclusive access for the duration of an arrangement; implementations need
/// no locking.
pub trait NodeStore {
    /// Create the x, y and z coordinate fields if they do not exist yet.
    ///
    /// Must be idempotent.
    fn ensure_coordinate_fields(&mut self);

    /// The node's radius, or [`DEFAULT_RADIUS`] when the store has none.
    fn radius_of(&self, node: NodeId) -> f32;

    /// Number of distinct neighbors of `node`, ignoring edge direction.
    fn neighbor_count(&self, node: NodeId) -> usize;

    /// The neighbor at `position` in the store's stable neighbor order.
    fn neighbor(&self, node: NodeId, position: usize) -> Option<NodeId>;

    /// Every neighbor of `node`, in the same order as
    /// [`neighbor`](NodeStore::neighbor).
    ///
    /// Traversals read the whole list once per node through this method;
    /// stores that can produce it cheaply should override it.
    fn neighbors_of(&self, node: NodeId) -> Vec<NodeId> {
        (0..self.neighbor_count(node))
            .filter_map(|position| self.neighbor(node, position))
            .collect()
    }

    /// Current coordinates of `node`. Unknown nodes sit at the origin.
    fn coordinates_of(&self, node: NodeId) -> Point3;

    /// Overwrite the coordinates of `node`.
    fn set_coordinates(&mut self, node: NodeId, x: f32, y: f32, z: f32);

    /// The first neighbor that is not `node` itself.
    ///
    /// A self-loop in first position is skipped by looking at the second
    /// neighbor instead; no further neighbors are considered.
    fn first_neighbor_other_than_self(&self, node: NodeId) -> Option<NodeId> {
        match self.neighbor(node, 0)? {
            first if first == node => self.neighbor(node, 1),
            first => Some(first),
        }
    }

    /// Mean position of `nodes`.
    fn centroid(&self, nodes: &[NodeId]) -> Point3 {
        mean::xyz_mean(self, nodes)
    }

    /// Translate every node in `nodes` by `(dx, dy, dz)`.
    fn translate_all(&mut self, nodes: &[NodeId], dx: f32, dy: f32, dz: f32) {
        for &node in nodes {
            let p = self.coordinates_of(node);
            self.set_coordinates(node, p.x + dx, p.y + dy, p.z + dz);
        }
    }
}
