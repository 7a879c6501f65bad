//! Centroid helpers shared by the arrangers.

use super::store::{NodeStore, Point3};
use crate::graph::NodeId;

/// Mean of the x, y, z coordinates of `nodes`.
///
/// Sums are accumulated in `f64` so large graphs far from the origin do not
/// lose precision. An empty set has its mean at the origin.
pub fn xyz_mean<S: NodeStore + ?Sized>(store: &S, nodes: &[NodeId]) -> Point3 {
    if nodes.is_empty() {
        return Point3::ORIGIN;
    }

    let mut sum = [0.0f64; 3];
    for &node in nodes {
        let p = store.coordinates_of(node);
        sum[0] += f64::from(p.x);
        sum[1] += f64::from(p.y);
        sum[2] += f64::from(p.z);
    }

    let n = nodes.len() as f64;
    Point3::new((sum[0] / n) as f32, (sum[1] / n) as f32, (sum[2] / n) as f32)
}

/// Translate `nodes` so that their mean moves back to `old_mean`.
pub fn move_mean<S: NodeStore + ?Sized>(store: &mut S, nodes: &[NodeId], old_mean: Point3) {
    let delta = old_mean - store.centroid(nodes);
    store.translate_all(nodes, delta.x, delta.y, delta.z);
}
