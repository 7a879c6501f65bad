//! Connected-component taxonomy and per-component grid arrangement.
//!
//! A node set is partitioned into weak components over the store's neighbor
//! relation, restricted to the set itself. Isolated nodes are pooled into a
//! single singleton taxon and linked pairs into a single doublet taxon; every
//! larger component forms its own taxon.
//!
//! [`ComponentGridArranger`] grids each taxon separately and then lines the
//! blocks up left to right on a shared baseline.

use std::collections::VecDeque;

use indexmap::IndexSet;
use log::debug;

use super::cancel::CancellationToken;
use super::grid::{GridArranger, GridParameters, GridShape};
use super::mean;
use super::store::NodeStore;
use crate::error::Result;
use crate::graph::NodeId;

/// Horizontal space left between component blocks by default.
pub const DEFAULT_COMPONENT_GAP: f32 = 5.0;

/// Partition of a node set into components.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentTaxonomy {
    /// Components with three or more members, in discovery order. The first
    /// member of each is its key.
    components: Vec<Vec<NodeId>>,
    /// Members of every two-node component, pair by pair.
    doublets: Vec<NodeId>,
    /// Every node with no neighbor inside the set.
    singletons: Vec<NodeId>,
}

impl ComponentTaxonomy {
    /// Partition `nodes` by breadth-first traversal.
    ///
    /// Duplicate IDs are counted once. Members of each taxon keep the input
    /// enumeration order.
    pub fn build<S: NodeStore + ?Sized>(
        store: &S,
        nodes: &[NodeId],
        cancel: &CancellationToken,
    ) -> Result<Self> {
        let members: IndexSet<NodeId> = nodes.iter().copied().collect();
        let mut visited = vec![false; members.len()];
        let mut taxonomy = Self::default();
        let mut queue = VecDeque::new();

        for start in 0..members.len() {
            if visited[start] {
                continue;
            }
            visited[start] = true;
            queue.push_back(start);

            let mut component = Vec::new();
            while let Some(i) = queue.pop_front() {
                cancel.checkpoint()?;
                component.push(i);
                for nb in store.neighbors_of(members[i]) {
                    let Some(j) = members.get_index_of(&nb) else {
                        continue;
                    };
                    if !visited[j] {
                        visited[j] = true;
                        queue.push_back(j);
                    }
                }
            }

            component.sort_unstable();
            let component = component.into_iter().map(|i| members[i]);
            match component.len() {
                1 => taxonomy.singletons.extend(component),
                2 => taxonomy.doublets.extend(component),
                _ => taxonomy.components.push(component.collect()),
            }
        }

        debug!(
            components = taxonomy.components.len(),
            doublets = taxonomy.doublets.len() / 2,
            singletons = taxonomy.singletons.len();
            "Built component taxonomy"
        );
        Ok(taxonomy)
    }

    /// Components with three or more members, in discovery order.
    pub fn components(&self) -> &[Vec<NodeId>] {
        &self.components
    }

    /// All members of two-node components.
    pub fn doublets(&self) -> &[NodeId] {
        &self.doublets
    }

    /// All isolated nodes.
    pub fn singletons(&self) -> &[NodeId] {
        &self.singletons
    }

    /// Number of non-empty taxa.
    pub fn taxon_count(&self) -> usize {
        self.components.len()
            + usize::from(!self.doublets.is_empty())
            + usize::from(!self.singletons.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.taxon_count() == 0
    }
}

/// One taxon to grid, and how.
struct Block<'a> {
    nodes: &'a [NodeId],
    params: GridParameters,
    doublets: bool,
}

/// Grids every component of a node set and lines the grids up.
#[derive(Debug, Clone)]
pub struct ComponentGridArranger {
    params: GridParameters,
    maintain_mean: bool,
    component_gap: f32,
    cancel: CancellationToken,
}

impl Default for ComponentGridArranger {
    fn default() -> Self {
        Self::new(GridParameters::default())
    }
}

impl ComponentGridArranger {
    pub fn new(params: GridParameters) -> Self {
        Self {
            params,
            maintain_mean: false,
            component_gap: DEFAULT_COMPONENT_GAP,
            cancel: CancellationToken::new(),
        }
    }

    /// Keep the centroid of the whole set where it was before arranging.
    pub fn maintain_mean(mut self, maintain_mean: bool) -> Self {
        self.maintain_mean = maintain_mean;
        self
    }

    /// Space between the right edge of one block and the left edge of the
    /// next.
    pub fn component_gap(mut self, component_gap: f32) -> Self {
        self.component_gap = component_gap;
        self
    }

    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Arrange `nodes` component by component.
    ///
    /// Blocks are placed largest component first, then the doublet block,
    /// then the singleton block. Every block's anchor ends up on `y = 0`.
    /// Returns the anchor of each block in placement order.
    pub fn arrange<S: NodeStore + ?Sized>(
        &self,
        store: &mut S,
        nodes: &[NodeId],
    ) -> Result<Vec<NodeId>> {
        let taxonomy = ComponentTaxonomy::build(&*store, nodes, &self.cancel)?;
        if taxonomy.is_empty() {
            return Ok(Vec::new());
        }

        store.ensure_coordinate_fields();
        let all: Vec<NodeId> = nodes
            .iter()
            .copied()
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect();
        let old_mean = self.maintain_mean.then(|| store.centroid(&all));

        let mut components: Vec<&Vec<NodeId>> = taxonomy.components().iter().collect();
        components.sort_by(|a, b| b.len().cmp(&a.len()));

        let square = self.params.with_shape(GridShape::Square);
        let mut blocks: Vec<Block<'_>> = components
            .into_iter()
            .map(|component| Block {
                nodes: component,
                params: square,
                doublets: false,
            })
            .collect();
        if !taxonomy.doublets().is_empty() {
            blocks.push(Block {
                nodes: taxonomy.doublets(),
                params: self.params,
                doublets: true,
            });
        }
        if !taxonomy.singletons().is_empty() {
            blocks.push(Block {
                nodes: taxonomy.singletons(),
                params: self.params,
                doublets: false,
            });
        }

        let mut anchors = Vec::with_capacity(blocks.len());
        let mut cursor = 0.0f32;
        for block in &blocks {
            let arrangement = GridArranger::new(block.params)
                .doublets(block.doublets)
                .cancellation(self.cancel.clone())
                .arrange(&mut *store, block.nodes)?;
            let Some(anchor) = arrangement.anchor else {
                continue;
            };

            let (left, right) = horizontal_extent(&*store, block.nodes);
            let dx = cursor - left;
            let dy = -store.coordinates_of(anchor).y;
            store.translate_all(block.nodes, dx, dy, 0.0);

            cursor = right + dx + self.component_gap;
            anchors.push(anchor);
        }

        if let Some(old_mean) = old_mean {
            mean::move_mean(store, &all, old_mean);
        }

        debug!(
            blocks = anchors.len(),
            width = cursor - self.component_gap;
            "Component arrangement complete"
        );
        Ok(anchors)
    }
}

/// Leftmost and rightmost node edges of `nodes`.
fn horizontal_extent<S: NodeStore + ?Sized>(store: &S, nodes: &[NodeId]) -> (f32, f32) {
    nodes
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(left, right), &node| {
            let x = store.coordinates_of(node).x;
            let r = store.radius_of(node);
            (left.min(x - r), right.max(x + r))
        })
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use std::cell::Cell;

    use super::*;
    use crate::error::Error;
    use crate::graph::GraphEngine;
    use crate::layout::store::Point3;

    fn build(engine: &GraphEngine, nodes: &[NodeId]) -> ComponentTaxonomy {
        ComponentTaxonomy::build(engine, nodes, &CancellationToken::new()).unwrap()
    }

    /// One hub linked to `leaves` other nodes.
    fn star(leaves: usize) -> (GraphEngine, Vec<NodeId>) {
        let mut engine = GraphEngine::new();
        let hub = engine.add_node(0.0, 0.0);
        let mut nodes = vec![hub];
        for i in 0..leaves {
            let leaf = engine.add_node(i as f32, 1.0);
            engine.add_edge(hub, leaf);
            nodes.push(leaf);
        }
        (engine, nodes)
    }

    /// Read-only view of an engine that counts neighbor-list reads and
    /// trips the token after a given number of them.
    struct CountingReads<'a> {
        inner: &'a GraphEngine,
        list_reads: Cell<usize>,
        positional_reads: Cell<usize>,
        trip_after: Option<usize>,
        token: CancellationToken,
    }

    impl<'a> CountingReads<'a> {
        fn new(
            inner: &'a GraphEngine,
            trip_after: Option<usize>,
            token: CancellationToken,
        ) -> Self {
            Self {
                inner,
                list_reads: Cell::new(0),
                positional_reads: Cell::new(0),
                trip_after,
                token,
            }
        }
    }

    impl NodeStore for CountingReads<'_> {
        fn ensure_coordinate_fields(&mut self) {}

        fn radius_of(&self, node: NodeId) -> f32 {
            self.inner.radius_of(node)
        }

        fn neighbor_count(&self, node: NodeId) -> usize {
            self.inner.neighbor_count(node)
        }

        fn neighbor(&self, node: NodeId, position: usize) -> Option<NodeId> {
            self.positional_reads.set(self.positional_reads.get() + 1);
            self.inner.neighbor(node, position)
        }

        fn neighbors_of(&self, node: NodeId) -> Vec<NodeId> {
            let reads = self.list_reads.get() + 1;
            self.list_reads.set(reads);
            if self.trip_after == Some(reads) {
                self.token.cancel();
            }
            self.inner.neighbors_of(node)
        }

        fn coordinates_of(&self, node: NodeId) -> Point3 {
            self.inner.coordinates_of(node)
        }

        fn set_coordinates(&mut self, _node: NodeId, _x: f32, _y: f32, _z: f32) {}
    }

    /// Triangle 0-1-2, path 3-4-5-6, pair 7-8, isolated 9 and 10.
    fn mixed_graph() -> (GraphEngine, Vec<NodeId>) {
        let mut engine = GraphEngine::new();
        let nodes: Vec<NodeId> = (0..11).map(|i| engine.add_node(i as f32, 0.0)).collect();
        for (a, b) in [(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 6), (7, 8)] {
            engine.add_edge(nodes[a], nodes[b]);
        }
        (engine, nodes)
    }

    #[test]
    fn test_taxonomy_groups_by_size() {
        let (engine, nodes) = mixed_graph();
        let taxonomy = build(&engine, &nodes);

        assert_eq!(
            taxonomy.components(),
            &[nodes[0..3].to_vec(), nodes[3..7].to_vec()]
        );
        assert_eq!(taxonomy.doublets(), &nodes[7..9]);
        assert_eq!(taxonomy.singletons(), &nodes[9..11]);
        assert_eq!(taxonomy.taxon_count(), 4);
    }

    #[test]
    fn test_taxonomy_keeps_input_order_within_component() {
        let (engine, nodes) = mixed_graph();
        let input = [nodes[5], nodes[3], nodes[6], nodes[4]];

        let taxonomy = build(&engine, &input);

        assert_eq!(taxonomy.components(), &[input.to_vec()]);
    }

    #[test]
    fn test_taxonomy_ignores_links_leaving_the_set() {
        let (engine, nodes) = mixed_graph();
        // Without node 4 the path splits into a singleton and a pair.
        let input = [nodes[3], nodes[5], nodes[6]];

        let taxonomy = build(&engine, &input);

        assert!(taxonomy.components().is_empty());
        assert_eq!(taxonomy.singletons(), &[nodes[3]]);
        assert_eq!(taxonomy.doublets(), &[nodes[5], nodes[6]]);
    }

    #[test]
    fn test_taxonomy_of_nothing() {
        let engine = GraphEngine::new();
        let taxonomy = build(&engine, &[]);
        assert!(taxonomy.is_empty());
    }

    #[test]
    fn test_taxonomy_cancellation() {
        let (engine, nodes) = mixed_graph();
        let token = CancellationToken::new();
        token.cancel();

        let result = ComponentTaxonomy::build(&engine, &nodes, &token);
        assert_eq!(result, Err(Error::Cancelled));
    }

    #[test]
    fn test_hub_neighbors_are_read_once_per_node() {
        let (engine, nodes) = star(300);
        let store = CountingReads::new(&engine, None, CancellationToken::new());

        let taxonomy = ComponentTaxonomy::build(&store, &nodes, &CancellationToken::new()).unwrap();

        assert_eq!(taxonomy.components(), &[nodes.clone()]);
        assert_eq!(store.list_reads.get(), nodes.len());
        assert_eq!(store.positional_reads.get(), 0);
    }

    #[test]
    fn test_taxonomy_cancelled_inside_one_component() {
        let (engine, nodes) = star(200);
        let token = CancellationToken::new();
        let store = CountingReads::new(&engine, Some(5), token.clone());

        let result = ComponentTaxonomy::build(&store, &nodes, &token);

        assert_eq!(result, Err(Error::Cancelled));
        assert_eq!(store.list_reads.get(), 5);
    }

    #[test]
    fn test_arrange_returns_anchor_per_block() {
        let (mut engine, nodes) = mixed_graph();

        let anchors = ComponentGridArranger::default()
            .arrange(&mut engine, &nodes)
            .unwrap();

        // Path (4 nodes, 2 x 2) first, then triangle (2 x 2 with 3 nodes),
        // then doublets, then singletons.
        assert_eq!(anchors, vec![nodes[5], nodes[2], nodes[7], nodes[9]]);
        for &anchor in &anchors {
            assert_approx_eq!(f32, engine.get_node_position(anchor).unwrap().y, 0.0);
        }
    }

    #[test]
    fn test_blocks_do_not_overlap() {
        let (mut engine, nodes) = mixed_graph();
        let gap = 3.0;

        ComponentGridArranger::default()
            .component_gap(gap)
            .arrange(&mut engine, &nodes)
            .unwrap();

        let blocks: [&[usize]; 4] = [&[3, 4, 5, 6], &[0, 1, 2], &[7, 8], &[9, 10]];
        let extents: Vec<(f32, f32)> = blocks
            .iter()
            .map(|block| {
                let ids: Vec<NodeId> = block.iter().map(|&i| nodes[i]).collect();
                horizontal_extent(&engine, &ids)
            })
            .collect();

        assert_approx_eq!(f32, extents[0].0, 0.0);
        for pair in extents.windows(2) {
            assert_approx_eq!(f32, pair[1].0 - pair[0].1, gap, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_doublet_block_keeps_pairs_adjacent() {
        let mut engine = GraphEngine::new();
        let nodes: Vec<NodeId> = (0..6).map(|_| engine.add_node(0.0, 0.0)).collect();
        engine.add_edge(nodes[0], nodes[1]);
        engine.add_edge(nodes[2], nodes[3]);
        engine.add_edge(nodes[4], nodes[5]);

        let anchors = ComponentGridArranger::default()
            .arrange(&mut engine, &nodes)
            .unwrap();

        assert_eq!(anchors.len(), 1);
        for pair in nodes.chunks(2) {
            let a = engine.get_node_position(pair[0]).unwrap();
            let b = engine.get_node_position(pair[1]).unwrap();
            assert_approx_eq!(f32, a.y, b.y);
            assert!(b.x > a.x);
        }
    }

    #[test]
    fn test_arrange_maintains_mean() {
        let (mut engine, nodes) = mixed_graph();
        let before = engine.centroid(&nodes);

        ComponentGridArranger::default()
            .maintain_mean(true)
            .arrange(&mut engine, &nodes)
            .unwrap();

        let after = engine.centroid(&nodes);
        assert_approx_eq!(f32, after.x, before.x, epsilon = 1e-4);
        assert_approx_eq!(f32, after.y, before.y, epsilon = 1e-4);
    }

    #[test]
    fn test_arrange_leaves_base_parameters_alone() {
        let (mut engine, nodes) = mixed_graph();
        let params = GridParameters::default().with_shape(GridShape::HorizontalLine);
        let arranger = ComponentGridArranger::new(params);

        arranger.arrange(&mut engine, &nodes).unwrap();

        assert_eq!(arranger.params, params);
        // Singletons follow the base shape: one row.
        let y9 = engine.get_node_position(nodes[9]).unwrap().y;
        let y10 = engine.get_node_position(nodes[10]).unwrap().y;
        assert_approx_eq!(f32, y9, y10);
    }

    #[test]
    fn test_arrange_nothing() {
        let mut engine = GraphEngine::new();
        let anchors = ComponentGridArranger::default().arrange(&mut engine, &[]).unwrap();
        assert!(anchors.is_empty());
    }
}
