//! Grid Arrange - WASM Module
//!
//! Grid-based node arrangement for graph visualization. The module keeps a
//! graph in memory, arranges its nodes into grids and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Graph data structure using petgraph's StableGraph
//! - `layout`: Grid shapes, parameters, the grid arranger and the
//!   per-component arranger
//! - `error`: Error type shared by the arrangers

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod graph;
pub mod layout;

use graph::{EdgeId, GraphEngine, NodeId};
use layout::grid;
use layout::{ComponentGridArranger, GridArranger, GridParameters};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Ordered labels of every grid shape, for populating a picker.
#[wasm_bindgen(js_name = gridShapeChoices)]
pub fn grid_shape_choices() -> Vec<String> {
    grid::all_choices().into_iter().map(str::to_owned).collect()
}

/// Normalize a shape name to its canonical label.
///
/// Unknown names come back as "Square".
#[wasm_bindgen(js_name = parseGridShape)]
pub fn parse_grid_shape(name: &str) -> String {
    grid::parse(name).label().to_owned()
}

/// Read grid parameters from a plain JS object.
///
/// `undefined` and `null` mean the defaults; missing fields take their
/// default values.
fn params_from_js(params: JsValue) -> Result<GridParameters, JsError> {
    let params = if params.is_undefined() || params.is_null() {
        GridParameters::default()
    } else {
        serde_wasm_bindgen::from_value(params).map_err(|e| JsError::new(&e.to_string()))?
    };
    params.validate()?;
    Ok(params)
}

/// Main entry point for the graph engine.
///
/// This struct wraps the internal GraphEngine and provides the public API
/// exposed to JavaScript.
#[wasm_bindgen]
pub struct GridArrangeWasm {
    engine: GraphEngine,
}

#[wasm_bindgen]
impl GridArrangeWasm {
    /// Create a new empty graph engine.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: GraphEngine::new(),
        }
    }

    /// Create a graph engine with pre-allocated capacity.
    ///
    /// # Arguments
    ///
    /// * `node_capacity` - Expected number of nodes
    /// * `edge_capacity` - Expected number of edges
    #[wasm_bindgen(js_name = withCapacity)]
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            engine: GraphEngine::with_capacity(node_capacity, edge_capacity),
        }
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node at the specified position.
    ///
    /// Returns the stable node ID.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f32, y: f32) -> u32 {
        self.engine.add_node(x, y).0
    }

    /// Add multiple nodes from a Float32Array of positions.
    ///
    /// The positions array should be [x0, y0, x1, y1, ...].
    /// Returns the number of nodes added.
    #[wasm_bindgen(js_name = addNodesFromPositions)]
    pub fn add_nodes_from_positions(&mut self, positions: &[f32]) -> u32 {
        self.engine.add_nodes_from_positions(positions)
    }

    /// Remove a node by ID.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        self.engine.remove_node(NodeId(node_id))
    }

    /// Get the number of nodes in the graph.
    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.engine.node_count()
    }

    /// Get the upper bound on node indices (max index + 1).
    /// May be larger than nodeCount if nodes have been removed.
    #[wasm_bindgen(js_name = nodeBound)]
    pub fn node_bound(&self) -> u32 {
        self.engine.node_bound()
    }

    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: u32) -> Option<f32> {
        self.engine.get_node_position(NodeId(node_id)).map(|p| p.x)
    }

    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: u32) -> Option<f32> {
        self.engine.get_node_position(NodeId(node_id)).map(|p| p.y)
    }

    /// Get a node's Z position (0 until the z field exists).
    #[wasm_bindgen(js_name = getNodeZ)]
    pub fn get_node_z(&self, node_id: u32) -> Option<f32> {
        self.engine.get_node_position(NodeId(node_id)).map(|p| p.z)
    }

    /// Set a node's position.
    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f32, y: f32, z: f32) {
        self.engine.set_node_position(NodeId(node_id), x, y, z);
    }

    /// Set a node's radius. Nodes without one are sized with radius 1.
    #[wasm_bindgen(js_name = setNodeRadius)]
    pub fn set_node_radius(&mut self, node_id: u32, radius: f32) {
        self.engine.set_node_radius(NodeId(node_id), radius);
    }

    #[wasm_bindgen(js_name = getNodeRadius)]
    pub fn get_node_radius(&self, node_id: u32) -> Option<f32> {
        self.engine.get_node_radius(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = selectNode)]
    pub fn select_node(&mut self, node_id: u32) {
        self.engine.select_node(NodeId(node_id));
    }

    #[wasm_bindgen(js_name = deselectNode)]
    pub fn deselect_node(&mut self, node_id: u32) {
        self.engine.deselect_node(NodeId(node_id));
    }

    #[wasm_bindgen(js_name = isNodeSelected)]
    pub fn is_node_selected(&self, node_id: u32) -> bool {
        self.engine.is_node_selected(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = clearSelection)]
    pub fn clear_selection(&mut self) {
        self.engine.clear_selection();
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an undirected edge between two nodes.
    ///
    /// Returns the edge ID, or undefined if either node does not exist.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: u32, target: u32) -> Option<u32> {
        self.engine
            .add_edge(NodeId(source), NodeId(target))
            .map(|id| id.0)
    }

    /// Add multiple edges from a Uint32Array of node ID pairs.
    ///
    /// The edges array should be [src0, tgt0, src1, tgt1, ...].
    /// Returns the number of edges added.
    #[wasm_bindgen(js_name = addEdgesFromPairs)]
    pub fn add_edges_from_pairs(&mut self, edges: &[u32]) -> u32 {
        self.engine.add_edges_from_pairs(edges)
    }

    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        self.engine.remove_edge(EdgeId(edge_id))
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.engine.edge_count()
    }

    /// Get neighbor node IDs in edge insertion order.
    #[wasm_bindgen(js_name = getNeighbors)]
    pub fn get_neighbors(&self, node_id: u32) -> Vec<u32> {
        self.engine.get_neighbors(NodeId(node_id))
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// Get a zero-copy view of X positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsXView)]
    pub fn get_positions_x_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.positions_x()) }
    }

    /// Get a zero-copy view of Y positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsYView)]
    pub fn get_positions_y_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.positions_y()) }
    }

    /// Get a zero-copy view of Z positions. Empty until the z field exists.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs,
    /// including the first arrangement creating the z field.
    /// Use immediately, do not store.
    #[wasm_bindgen(js_name = getPositionsZView)]
    pub fn get_positions_z_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.positions_z()) }
    }

    /// Get the length of the positions buffer.
    #[wasm_bindgen(js_name = positionsLen)]
    pub fn positions_len(&self) -> usize {
        self.engine.positions_x().len()
    }

    /// Get the bounding box of all nodes.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if graph is empty.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.engine
            .get_bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }

    /// Clear all nodes and edges.
    pub fn clear(&mut self) {
        self.engine.clear();
    }

    // =========================================================================
    // Arrangement
    // =========================================================================

    /// Arrange every node in a grid.
    ///
    /// # Arguments
    ///
    /// * `params` - `{ shape, sizeGain, horizontalGap, verticalGap, rowOffsets }`,
    ///   every field optional
    /// * `maintain_mean` - Keep the nodes' centroid where it was
    /// * `doublets` - Place each node next to its first neighbor
    ///
    /// Returns the anchor node (first column of the last row), or undefined
    /// for an empty graph.
    #[wasm_bindgen(js_name = arrangeGrid)]
    pub fn arrange_grid(
        &mut self,
        params: JsValue,
        maintain_mean: bool,
        doublets: bool,
    ) -> Result<Option<u32>, JsError> {
        let params = params_from_js(params)?;
        let nodes = self.engine.node_ids();
        Ok(self.arrange_nodes(&nodes, params, maintain_mean, doublets)?)
    }

    /// Arrange the selected nodes in a grid, or every node when nothing is
    /// selected. Unselected nodes stay where they are.
    #[wasm_bindgen(js_name = arrangeSelectionGrid)]
    pub fn arrange_selection_grid(
        &mut self,
        params: JsValue,
        maintain_mean: bool,
        doublets: bool,
    ) -> Result<Option<u32>, JsError> {
        let params = params_from_js(params)?;
        let nodes = self.engine.arrangement_scope();
        Ok(self.arrange_nodes(&nodes, params, maintain_mean, doublets)?)
    }

    /// Arrange the selection (or every node) component by component.
    ///
    /// Returns the anchor of each component block, left to right.
    #[wasm_bindgen(js_name = arrangeComponents)]
    pub fn arrange_components(
        &mut self,
        params: JsValue,
        maintain_mean: bool,
        component_gap: f32,
    ) -> Result<Vec<u32>, JsError> {
        let params = params_from_js(params)?;
        let nodes = self.engine.arrangement_scope();
        let anchors = ComponentGridArranger::new(params)
            .maintain_mean(maintain_mean)
            .component_gap(component_gap)
            .arrange(&mut self.engine, &nodes)?;
        Ok(anchors.into_iter().map(|id| id.0).collect())
    }
}

impl GridArrangeWasm {
    fn arrange_nodes(
        &mut self,
        nodes: &[NodeId],
        params: GridParameters,
        maintain_mean: bool,
        doublets: bool,
    ) -> error::Result<Option<u32>> {
        let arrangement = GridArranger::new(params)
            .maintain_mean(maintain_mean)
            .doublets(doublets)
            .arrange(&mut self.engine, nodes)?;
        Ok(arrangement.anchor.map(|id| id.0))
    }
}

impl Default for GridArrangeWasm {
    fn default() -> Self {
        Self::new()
    }
}
