//! GraphEngine - Core graph data structure.
//!
//! The GraphEngine stores the graph topology using petgraph's StableGraph
//! and maintains SoA (Structure of Arrays) buffers for node coordinates and
//! radii so they can be handed to the renderer without copying.

use petgraph::Undirected;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use indexmap::IndexSet;
use petgraph::visit::{EdgeRef, NodeIndexable};
use std::collections::HashMap;

use super::edge::EdgeId;
use super::node::NodeId;
use crate::layout::{DEFAULT_RADIUS, NodeStore, Point3};

/// The core graph engine.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Coordinate buffers in SoA layout (the z buffer is created on demand)
/// - An optional per-node radius attribute
/// - Per-node selection flags
/// - ID mapping between stable IDs and internal indices
pub struct GraphEngine {
    /// The underlying graph structure.
    /// Nodes store their stable NodeId, edges store their stable EdgeId.
    graph: StableGraph<NodeId, EdgeId, Undirected>,

    /// Map from stable NodeId to petgraph NodeIndex
    node_id_to_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable EdgeId to petgraph EdgeIndex
    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    /// Next node ID to assign
    next_node_id: u32,

    /// Next edge ID to assign
    next_edge_id: u32,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// Z positions, absent until something asks for a z field
    pos_z: Option<Vec<f32>>,

    /// Node radii, absent until the first radius is set
    radius: Option<Vec<f32>>,

    /// Per-slot selection flags
    selected: Vec<bool>,
}

impl GraphEngine {
    /// Create a new empty graph engine.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
            node_id_to_index: HashMap::new(),
            edge_id_to_index: HashMap::new(),
            next_node_id: 0,
            next_edge_id: 0,
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            pos_z: None,
            radius: None,
            selected: Vec::new(),
        }
    }

    /// Create a graph engine with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            next_node_id: 0,
            next_edge_id: 0,
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            pos_z: None,
            radius: None,
            selected: Vec::with_capacity(node_capacity),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node at the specified position.
    pub fn add_node(&mut self, x: f32, y: f32) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);

        // Slots line up with petgraph indices; a reused vacant index
        // overwrites the zeroed slot instead of growing the buffers.
        let i = index.index();
        if i < self.pos_x.len() {
            self.pos_x[i] = x;
            self.pos_y[i] = y;
            if let Some(z) = self.pos_z.as_mut() {
                z[i] = 0.0;
            }
            if let Some(r) = self.radius.as_mut() {
                r[i] = DEFAULT_RADIUS;
            }
            self.selected[i] = false;
        } else {
            self.pos_x.push(x);
            self.pos_y.push(y);
            if let Some(z) = self.pos_z.as_mut() {
                z.push(0.0);
            }
            if let Some(r) = self.radius.as_mut() {
                r.push(DEFAULT_RADIUS);
            }
            self.selected.push(false);
        }

        id
    }

    /// Add multiple nodes from a positions array [x0, y0, x1, y1, ...].
    pub fn add_nodes_from_positions(&mut self, positions: &[f32]) -> u32 {
        let count = positions.len() / 2;

        self.node_id_to_index.reserve(count);
        self.pos_x.reserve(count);
        self.pos_y.reserve(count);
        self.selected.reserve(count);

        for pair in positions.chunks_exact(2) {
            self.add_node(pair[0], pair[1]);
        }

        count as u32
    }

    /// Remove a node and all its connected edges.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_id_to_index.remove(&id) else {
            return false;
        };

        let edges: Vec<EdgeId> = self.graph.edges(index).map(|e| *e.weight()).collect();
        for edge_id in edges {
            self.edge_id_to_index.remove(&edge_id);
        }

        // Zero out SoA arrays for the removed node's slot
        let i = index.index();
        if i < self.pos_x.len() {
            self.pos_x[i] = 0.0;
            self.pos_y[i] = 0.0;
            if let Some(z) = self.pos_z.as_mut() {
                z[i] = 0.0;
            }
            if let Some(r) = self.radius.as_mut() {
                r[i] = 0.0;
            }
            self.selected[i] = false;
        }

        self.graph.remove_node(index);
        true
    }

    /// Check whether a node exists.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_id_to_index.contains_key(&id)
    }

    /// Get the number of nodes.
    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Get the upper bound on node indices (max index + 1).
    /// This may be larger than node_count() if nodes have been removed,
    /// since StableGraph preserves index stability.
    pub fn node_bound(&self) -> u32 {
        self.graph.node_bound() as u32
    }

    /// All live node IDs in ascending slot order.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter_map(|index| self.graph.node_weight(index).copied())
            .collect()
    }

    /// Get a node's position.
    pub fn get_node_position(&self, id: NodeId) -> Option<Point3> {
        self.slot(id).map(|i| self.point_at(i))
    }

    /// Set a node's position.
    ///
    /// A non-zero `z` creates the z buffer if it does not exist yet.
    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32, z: f32) {
        let Some(i) = self.slot(id) else {
            return;
        };
        self.pos_x[i] = x;
        self.pos_y[i] = y;
        if z != 0.0 || self.pos_z.is_some() {
            self.z_buffer_mut()[i] = z;
        }
    }

    /// Set a node's radius, creating the radius attribute on first use.
    pub fn set_node_radius(&mut self, id: NodeId, radius: f32) {
        let Some(i) = self.slot(id) else {
            return;
        };
        let len = self.pos_x.len();
        let radii = self
            .radius
            .get_or_insert_with(|| vec![DEFAULT_RADIUS; len]);
        radii[i] = radius;
    }

    /// Get a node's radius if the node exists.
    pub fn get_node_radius(&self, id: NodeId) -> Option<f32> {
        self.slot(id).map(|i| match &self.radius {
            Some(radii) => radii[i],
            None => DEFAULT_RADIUS,
        })
    }

    /// Whether any radius has ever been set.
    pub fn has_radius_attribute(&self) -> bool {
        self.radius.is_some()
    }

    /// Whether the z coordinate buffer exists.
    pub fn has_z_field(&self) -> bool {
        self.pos_z.is_some()
    }

    /// Select a node.
    pub fn select_node(&mut self, id: NodeId) {
        if let Some(i) = self.slot(id) {
            self.selected[i] = true;
        }
    }

    /// Deselect a node.
    pub fn deselect_node(&mut self, id: NodeId) {
        if let Some(i) = self.slot(id) {
            self.selected[i] = false;
        }
    }

    /// Check if a node is selected.
    pub fn is_node_selected(&self, id: NodeId) -> bool {
        self.slot(id)
            .map(|i| self.selected[i])
            .unwrap_or(false)
    }

    /// Deselect every node.
    pub fn clear_selection(&mut self) {
        self.selected.fill(false);
    }

    /// Selected node IDs in ascending slot order.
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.node_ids()
            .into_iter()
            .filter(|&id| self.is_node_selected(id))
            .collect()
    }

    /// The nodes an "arrange selection" command works on.
    ///
    /// An empty selection means the whole graph.
    pub fn arrangement_scope(&self) -> Vec<NodeId> {
        let selected = self.selected_nodes();
        if selected.is_empty() {
            self.node_ids()
        } else {
            selected
        }
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two nodes.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        let source_index = *self.node_id_to_index.get(&source)?;
        let target_index = *self.node_id_to_index.get(&target)?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self.graph.add_edge(source_index, target_index, id);
        self.edge_id_to_index.insert(id, index);

        Some(id)
    }

    /// Add edges from pairs [src0, tgt0, src1, tgt1, ...].
    pub fn add_edges_from_pairs(&mut self, edges: &[u32]) -> u32 {
        let mut added = 0;

        for pair in edges.chunks_exact(2) {
            if self.add_edge(NodeId(pair[0]), NodeId(pair[1])).is_some() {
                added += 1;
            }
        }

        added
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        if let Some(index) = self.edge_id_to_index.remove(&id) {
            self.graph.remove_edge(index);
            true
        } else {
            false
        }
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    /// Distinct neighbors of a node, ordered by the edge that first joined
    /// them. A self-loop makes the node its own neighbor.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&index) = self.node_id_to_index.get(&id) else {
            return Vec::new();
        };

        let mut incident: Vec<(EdgeId, NodeIndex)> = self
            .graph
            .edges(index)
            .map(|e| {
                let other = if e.source() == index { e.target() } else { e.source() };
                (*e.weight(), other)
            })
            .collect();
        incident.sort_by_key(|&(edge, _)| edge.raw());

        let neighbors: IndexSet<NodeId> = incident
            .into_iter()
            .filter_map(|(_, other)| self.graph.node_weight(other).copied())
            .collect();
        neighbors.into_iter().collect()
    }

    /// Get neighbors of a node as raw IDs.
    pub fn get_neighbors(&self, id: NodeId) -> Vec<u32> {
        self.neighbors(id).into_iter().map(NodeId::raw).collect()
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get X positions slice.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Get Y positions slice.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    /// Get Z positions slice (empty until the z field exists).
    pub fn positions_z(&self) -> &[f32] {
        self.pos_z.as_deref().unwrap_or(&[])
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Get the bounding box of all active nodes in the x/y plane.
    /// Skips dead slots (nodes that have been removed).
    pub fn get_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        if self.graph.node_count() == 0 {
            return None;
        }

        let mut min_x = f32::INFINITY;
        let mut max_x = f32::NEG_INFINITY;
        let mut min_y = f32::INFINITY;
        let mut max_y = f32::NEG_INFINITY;

        for node_index in self.graph.node_indices() {
            let i = node_index.index();
            if i < self.pos_x.len() {
                min_x = min_x.min(self.pos_x[i]);
                max_x = max_x.max(self.pos_x[i]);
                min_y = min_y.min(self.pos_y[i]);
                max_y = max_y.max(self.pos_y[i]);
            }
        }

        if min_x == f32::INFINITY {
            return None;
        }

        Some((min_x, min_y, max_x, max_y))
    }

    /// Clear all nodes and edges, resetting the engine to its initial state.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.edge_id_to_index.clear();
        self.next_node_id = 0;
        self.next_edge_id = 0;
        self.pos_x.clear();
        self.pos_y.clear();
        self.pos_z = None;
        self.radius = None;
        self.selected.clear();
    }

    fn slot(&self, id: NodeId) -> Option<usize> {
        self.node_id_to_index.get(&id).map(|index| index.index())
    }

    fn point_at(&self, i: usize) -> Point3 {
        let z = self.pos_z.as_ref().map_or(0.0, |z| z[i]);
        Point3::new(self.pos_x[i], self.pos_y[i], z)
    }

    fn z_buffer_mut(&mut self) -> &mut Vec<f32> {
        let len = self.pos_x.len();
        self.pos_z.get_or_insert_with(|| vec![0.0; len])
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeStore for GraphEngine {
    fn ensure_coordinate_fields(&mut self) {
        self.z_buffer_mut();
    }

    fn radius_of(&self, node: NodeId) -> f32 {
        self.get_node_radius(node).unwrap_or(DEFAULT_RADIUS)
    }

    fn neighbor_count(&self, node: NodeId) -> usize {
        self.neighbors(node).len()
    }

    fn neighbor(&self, node: NodeId, position: usize) -> Option<NodeId> {
        self.neighbors(node).get(position).copied()
    }

    fn neighbors_of(&self, node: NodeId) -> Vec<NodeId> {
        self.neighbors(node)
    }

    fn first_neighbor_other_than_self(&self, node: NodeId) -> Option<NodeId> {
        let neighbors = self.neighbors(node);
        match neighbors.first().copied()? {
            first if first == node => neighbors.get(1).copied(),
            first => Some(first),
        }
    }

    fn coordinates_of(&self, node: NodeId) -> Point3 {
        self.get_node_position(node).unwrap_or_default()
    }

    fn set_coordinates(&mut self, node: NodeId, x: f32, y: f32, z: f32) {
        self.set_node_position(node, x, y, z);
    }
}
