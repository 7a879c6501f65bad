//! Grid arrangement of a node set.
//!
//! # Algorithm Overview
//!
//! 1. **Dimensions:** the shape's forced column or row count (or neither, for
//!    a square-ish grid) fixes the column count; rows follow from the node
//!    count. Doublet mode rounds a square grid up to an even column count.
//! 2. **Sizing pass:** nodes take consecutive row-major slots in enumeration
//!    order. Each column is as wide, and each row as tall, as the largest
//!    diameter placed in it. In doublet mode a node's first neighbor is
//!    pulled into the very next slot.
//! 3. **Placement pass:** column and row centrelines are laid out from the
//!    scaled extents plus gaps, centred on the origin, and every node is
//!    written at its cell centre with `z = 0`.
//! 4. **Mean restoration (optional):** the whole set is translated back so
//!    its centroid matches the centroid it had before arranging.
//!
//! The node at column 0 of the last row is reported as the anchor.

use indexmap::IndexSet;
use log::debug;

use super::params::GridParameters;
use crate::error::Result;
use crate::graph::NodeId;
use crate::layout::cancel::CancellationToken;
use crate::layout::mean;
use crate::layout::store::NodeStore;

/// Result of a grid arrangement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arrangement {
    /// Node placed at column 0 of the last row. `None` when nothing was
    /// arranged.
    pub anchor: Option<NodeId>,
    /// Number of grid rows used. Forced counts are trimmed to the rows the
    /// nodes actually fill.
    pub rows: usize,
    /// Number of grid columns used, trimmed the same way.
    pub cols: usize,
}

/// A node and the grid cell it was assigned.
#[derive(Debug, Clone, Copy)]
struct Placement {
    node: NodeId,
    row: usize,
    col: usize,
}

/// Running cell assignment and per-row/per-column extents.
struct Slots {
    cols: usize,
    cells: Vec<Placement>,
    col_widths: Vec<f32>,
    row_heights: Vec<f32>,
}

impl Slots {
    fn new(rows: usize, cols: usize, capacity: usize) -> Self {
        Self {
            cols,
            cells: Vec::with_capacity(capacity),
            col_widths: vec![0.0; cols],
            row_heights: vec![0.0; rows],
        }
    }

    /// Put `node` in the next free slot and grow its row and column to fit.
    fn place_next(&mut self, node: NodeId, diameter: f32) {
        let index = self.cells.len();
        let row = index / self.cols;
        let col = index - row * self.cols;

        self.row_heights[row] = self.row_heights[row].max(diameter);
        self.col_widths[col] = self.col_widths[col].max(diameter);
        self.cells.push(Placement { node, row, col });
    }
}

/// Arranges nodes in a grid.
///
/// ```
/// use gridarrange_wasm::graph::GraphEngine;
/// use gridarrange_wasm::layout::{GridArranger, GridParameters};
///
/// let mut engine = GraphEngine::new();
/// let nodes: Vec<_> = (0..10).map(|i| engine.add_node(i as f32, 0.0)).collect();
///
/// let arrangement = GridArranger::new(GridParameters::default())
///     .arrange(&mut engine, &nodes)
///     .unwrap();
/// assert_eq!((arrangement.cols, arrangement.rows), (4, 3));
/// assert_eq!(arrangement.anchor, Some(nodes[8]));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GridArranger {
    params: GridParameters,
    maintain_mean: bool,
    doublets: bool,
    cancel: CancellationToken,
}

impl GridArranger {
    /// Create an arranger that centres the grid on the origin and ignores
    /// neighbors.
    pub fn new(params: GridParameters) -> Self {
        Self {
            params,
            maintain_mean: false,
            doublets: false,
            cancel: CancellationToken::new(),
        }
    }

    /// Keep the node set's centroid where it was before arranging.
    pub fn maintain_mean(mut self, maintain_mean: bool) -> Self {
        self.maintain_mean = maintain_mean;
        self
    }

    /// Place each node next to its first neighbor, in whole pairs per row
    /// for square grids.
    pub fn doublets(mut self, doublets: bool) -> Self {
        self.doublets = doublets;
        self
    }

    /// Poll `token` once per node in each pass.
    pub fn cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn params(&self) -> &GridParameters {
        &self.params
    }

    /// Arrange `nodes` in a grid, writing new coordinates into `store`.
    ///
    /// Duplicate IDs are arranged once, at their first position. On
    /// cancellation the nodes written so far keep their new coordinates.
    pub fn arrange<S: NodeStore + ?Sized>(
        &self,
        store: &mut S,
        nodes: &[NodeId],
    ) -> Result<Arrangement> {
        let members: IndexSet<NodeId> = nodes.iter().copied().collect();
        let n = members.len();
        if n == 0 {
            debug!("No nodes to arrange in grid");
            return Ok(Arrangement::default());
        }

        store.ensure_coordinate_fields();
        let order: Vec<NodeId> = members.iter().copied().collect();
        let old_mean = self.maintain_mean.then(|| store.centroid(&order));

        let (cols, rows) = grid_dimensions(self.params.shape.dimensions(), n, self.doublets);
        debug!(
            nodes = n,
            cols = cols,
            rows = rows,
            shape = self.params.shape.label(),
            doublets = self.doublets;
            "Arranging nodes in grid"
        );

        let mut slots = Slots::new(rows, cols, n);
        let mut visited = vec![false; n];
        for (i, &node) in order.iter().enumerate() {
            self.cancel.checkpoint()?;
            if visited[i] {
                continue;
            }
            visited[i] = true;
            slots.place_next(node, diameter(&*store, node));

            if self.doublets {
                let partner = store
                    .first_neighbor_other_than_self(node)
                    .and_then(|nb| members.get_index_of(&nb).map(|j| (nb, j)))
                    .filter(|&(_, j)| !visited[j]);
                if let Some((partner, j)) = partner {
                    visited[j] = true;
                    slots.place_next(partner, diameter(&*store, partner));
                }
            }
        }

        let gain = self.params.size_gain;
        let h_gap = self.params.horizontal_gap as f32;
        let v_gap = self.params.vertical_gap as f32;
        let col_centres = centrelines(&slots.col_widths, gain, h_gap);
        let row_centres = centrelines(&slots.row_heights, gain, v_gap);

        let last_row = rows - 1;
        let mut anchor = None;
        for cell in &slots.cells {
            self.cancel.checkpoint()?;
            let x = col_centres[cell.col];
            let mut y = row_centres[cell.row];
            if self.params.row_offsets && cell.col % 2 == 0 {
                y += slots.row_heights[cell.row] / 2.0;
            }
            store.set_coordinates(cell.node, x, y, 0.0);

            if cell.row == last_row && cell.col == 0 {
                anchor = Some(cell.node);
            }
        }

        if let Some(old_mean) = old_mean {
            mean::move_mean(store, &order, old_mean);
        }

        debug!(anchor:? = anchor; "Grid arrangement complete");
        Ok(Arrangement { anchor, rows, cols })
    }
}

/// Resolve `(cols, rows)` for `n` nodes from a shape's forced counts.
///
/// Forced counts larger than the grid needs are trimmed so no row or column
/// is left empty.
fn grid_dimensions(forced: (usize, usize), n: usize, doublets: bool) -> (usize, usize) {
    let cols = match forced {
        (0, 0) => {
            let mut cols = (n as f64).sqrt().ceil() as usize;
            if doublets && cols % 2 == 1 {
                cols += 1;
            }
            cols
        }
        (forced_cols, 0) => forced_cols.min(n),
        (_, forced_rows) => n.div_ceil(forced_rows),
    };
    (cols, n.div_ceil(cols))
}

fn diameter<S: NodeStore + ?Sized>(store: &S, node: NodeId) -> f32 {
    2.0 * store.radius_of(node)
}

/// Centrelines of consecutive bands with the given raw extents, laid out
/// left to right (or bottom to top) and centred on zero.
fn centrelines(extents: &[f32], gain: f32, gap: f32) -> Vec<f32> {
    let total: f32 =
        extents.iter().map(|e| e * gain).sum::<f32>() + (extents.len() - 1) as f32 * gap;
    let origin = -total / 2.0;

    let mut centres: Vec<f32> = Vec::with_capacity(extents.len());
    for (i, &extent) in extents.iter().enumerate() {
        let centre = match i {
            0 => origin + extent * gain / 2.0,
            _ => centres[i - 1] + (extents[i - 1] + extent) * gain / 2.0 + gap,
        };
        centres.push(centre);
    }
    centres
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;
    use proptest::test_runner::TestCaseResult;

    use super::*;
    use crate::graph::GraphEngine;
    use crate::layout::grid::GridShape;

    // ===================
    // Strategies
    // ===================

    fn shape_strategy() -> impl Strategy<Value = GridShape> {
        (0usize..9).prop_map(|i| GridShape::all().nth(i).unwrap_or_default())
    }

    fn params_strategy() -> impl Strategy<Value = GridParameters> {
        (shape_strategy(), 0.5f32..3.0, 0i32..5, 0i32..5, any::<bool>()).prop_map(
            |(shape, gain, h_gap, v_gap, row_offsets)| {
                GridParameters::default()
                    .with_shape(shape)
                    .with_size_gain(gain)
                    .with_gaps(h_gap, v_gap)
                    .with_row_offsets(row_offsets)
            },
        )
    }

    /// Nodes as (x, y, radius) triples.
    fn nodes_strategy() -> impl Strategy<Value = Vec<(f32, f32, f32)>> {
        prop::collection::vec((-1000.0f32..1000.0, -1000.0f32..1000.0, 0.2f32..5.0), 1..60)
    }

    /// Pairs (i, j) to link, taken modulo the node count.
    fn links_strategy() -> impl Strategy<Value = Vec<(usize, usize)>> {
        prop::collection::vec((0usize..60, 0usize..60), 0..40)
    }

    fn build(nodes: &[(f32, f32, f32)], links: &[(usize, usize)]) -> (GraphEngine, Vec<NodeId>) {
        let mut engine = GraphEngine::new();
        let ids: Vec<NodeId> = nodes
            .iter()
            .map(|&(x, y, r)| {
                let id = engine.add_node(x, y);
                engine.set_node_radius(id, r);
                id
            })
            .collect();
        for &(a, b) in links {
            engine.add_edge(ids[a % ids.len()], ids[b % ids.len()]);
        }
        (engine, ids)
    }

    // ===================
    // Property Test Functions
    // ===================

    /// Arranging the same input twice gives bit-identical coordinates.
    fn check_deterministic(
        nodes: &[(f32, f32, f32)],
        links: &[(usize, usize)],
        params: GridParameters,
        doublets: bool,
    ) -> TestCaseResult {
        let (mut first, ids) = build(nodes, links);
        let (mut second, _) = build(nodes, links);
        let arranger = GridArranger::new(params).doublets(doublets);

        let a = arranger.arrange(&mut first, &ids).unwrap();
        let b = arranger.arrange(&mut second, &ids).unwrap();

        prop_assert_eq!(a, b);
        for &id in &ids {
            prop_assert_eq!(first.get_node_position(id), second.get_node_position(id));
        }
        Ok(())
    }

    /// With mean preservation the centroid does not move.
    fn check_mean_preserved(
        nodes: &[(f32, f32, f32)],
        params: GridParameters,
    ) -> TestCaseResult {
        let (mut engine, ids) = build(nodes, &[]);
        let before = engine.centroid(&ids);

        GridArranger::new(params)
            .maintain_mean(true)
            .arrange(&mut engine, &ids)
            .unwrap();

        let after = engine.centroid(&ids);
        prop_assert!(
            approx_eq!(f32, after.x, before.x, epsilon = 0.05),
            "x {} vs {}",
            after.x,
            before.x
        );
        prop_assert!(
            approx_eq!(f32, after.y, before.y, epsilon = 0.05),
            "y {} vs {}",
            after.y,
            before.y
        );
        Ok(())
    }

    /// Every node gets its own cell and the grid is no larger than needed.
    fn check_grid_fits(
        nodes: &[(f32, f32, f32)],
        links: &[(usize, usize)],
        params: GridParameters,
        doublets: bool,
    ) -> TestCaseResult {
        let (mut engine, ids) = build(nodes, links);
        let n = ids.len();

        let arrangement = GridArranger::new(params)
            .doublets(doublets)
            .arrange(&mut engine, &ids)
            .unwrap();

        prop_assert!(arrangement.rows * arrangement.cols >= n);
        prop_assert!((arrangement.rows - 1) * arrangement.cols < n);
        prop_assert!(arrangement.anchor.is_some());
        if doublets && params.shape == GridShape::Square {
            prop_assert_eq!(arrangement.cols % 2, 0);
        }
        Ok(())
    }

    /// Grid slot of every node, read back from its coordinates. Only valid
    /// without row offsets, where each column and row has one centreline.
    fn slots_from_positions(engine: &GraphEngine, ids: &[NodeId], cols: usize) -> Vec<usize> {
        let mut xs: Vec<f32> = ids.iter().map(|&id| engine.coordinates_of(id).x).collect();
        let mut ys: Vec<f32> = ids.iter().map(|&id| engine.coordinates_of(id).y).collect();
        xs.sort_by(f32::total_cmp);
        xs.dedup();
        ys.sort_by(f32::total_cmp);
        ys.dedup();

        ids.iter()
            .map(|&id| {
                let p = engine.coordinates_of(id);
                let col = xs.partition_point(|&x| x < p.x);
                let row = ys.partition_point(|&y| y < p.y);
                row * cols + col
            })
            .collect()
    }

    /// In doublet mode every node that opens a pair is followed, in the very
    /// next slot, by its first neighbor, unless that neighbor was already
    /// placed. Square grids get an even column count.
    fn check_doublet_adjacency(
        nodes: &[(f32, f32, f32)],
        links: &[(usize, usize)],
        params: GridParameters,
    ) -> TestCaseResult {
        let params = params.with_row_offsets(false);
        let (mut engine, ids) = build(nodes, links);

        let arrangement = GridArranger::new(params)
            .doublets(true)
            .arrange(&mut engine, &ids)
            .unwrap();

        let slots = slots_from_positions(&engine, &ids, arrangement.cols);
        let mut by_slot = vec![None; ids.len()];
        for (i, &slot) in slots.iter().enumerate() {
            prop_assert!(slot < ids.len(), "slot {} out of range", slot);
            prop_assert!(by_slot[slot].is_none(), "slot {} used twice", slot);
            by_slot[slot] = Some(i);
        }

        let mut placed = vec![false; ids.len()];
        let mut slot = 0;
        while slot < ids.len() {
            let Some(i) = by_slot[slot] else {
                return Err(TestCaseError::fail(format!("slot {slot} is empty")));
            };
            placed[i] = true;
            let partner = engine
                .first_neighbor_other_than_self(ids[i])
                .and_then(|nb| ids.iter().position(|&id| id == nb))
                .filter(|&j| !placed[j]);
            match partner {
                Some(j) => {
                    prop_assert_eq!(by_slot.get(slot + 1).copied().flatten(), Some(j));
                    placed[j] = true;
                    slot += 2;
                }
                None => slot += 1,
            }
        }

        if params.shape == GridShape::Square {
            prop_assert_eq!(arrangement.cols % 2, 0);
        }
        Ok(())
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn doublets_are_adjacent(
            nodes in nodes_strategy(),
            links in links_strategy(),
            params in params_strategy(),
        ) {
            check_doublet_adjacency(&nodes, &links, params)?;
        }

        #[test]
        fn arrangement_is_deterministic(
            nodes in nodes_strategy(),
            links in links_strategy(),
            params in params_strategy(),
            doublets in any::<bool>(),
        ) {
            check_deterministic(&nodes, &links, params, doublets)?;
        }

        #[test]
        fn mean_is_preserved(nodes in nodes_strategy(), params in params_strategy()) {
            check_mean_preserved(&nodes, params)?;
        }

        #[test]
        fn grid_fits_node_count(
            nodes in nodes_strategy(),
            links in links_strategy(),
            params in params_strategy(),
            doublets in any::<bool>(),
        ) {
            check_grid_fits(&nodes, &links, params, doublets)?;
        }
    }
}
