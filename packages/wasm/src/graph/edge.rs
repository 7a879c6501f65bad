//! Edge identifier.
//!
//! Edges only matter to arrangement through the neighbor relation they
//! induce: doublet placement pairs a node with its first neighbor, and the
//! component taxonomy walks neighbors to find weak components. Edges carry
//! no weight and no direction.

use std::fmt;

/// Stable edge identifier, handed out in insertion order.
///
/// Neighbor lists are ordered by this ID, so it doubles as the edge's
/// insertion rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(pub u32);

impl EdgeId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}
