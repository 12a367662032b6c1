//! Uniform grid spatial index over node positions
//!
//! Built once per node list, then queried every time the camera moves. A
//! query only touches the occupied cells inside the requested rectangle, so
//! its cost follows the number of visible nodes rather than the tree size.
//!
//! Cells are keyed `(row, col)` in a `BTreeMap`. Each row of the query range
//! becomes one ordered range scan, which skips empty cells entirely when the
//! user has zoomed far out over a sparse tree.

use crate::types::{Node, NodeId, Rect, Transform, Viewport};
use std::collections::{BTreeMap, HashMap};

/// Cell occupancy figures for tuning `cell_size`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GridDiagnostics {
    /// Cells in the bounding cell range of all nodes
    pub total_cells: usize,
    pub occupied_cells: usize,
    pub max_per_cell: usize,
    /// Mean node count over occupied cells
    pub avg_per_cell: f32,
}

/// Grid index owning a snapshot of the node list
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    nodes: Vec<Node>,
    by_id: HashMap<NodeId, u32>,
    cells: BTreeMap<(i32, i32), Vec<u32>>,
    cell_size: f32,
    max_results: usize,
}

impl SpatialIndex {
    /// Build the grid from a full node list
    pub fn build(nodes: Vec<Node>, cell_size: f32, max_results: usize) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        let mut cells: BTreeMap<(i32, i32), Vec<u32>> = BTreeMap::new();
        let mut by_id = HashMap::with_capacity(nodes.len());

        for (index, node) in nodes.iter().enumerate() {
            let index = index as u32;
            let key = (
                cell_coord(node.position.y, cell_size),
                cell_coord(node.position.x, cell_size),
            );
            cells.entry(key).or_default().push(index);
            if by_id.insert(node.id, index).is_some() {
                tracing::warn!("Duplicate node id {} in spatial index", node.id);
            }
        }

        tracing::debug!(
            "Built spatial index: {} nodes in {} cells (cell size {})",
            nodes.len(),
            cells.len(),
            cell_size
        );

        Self {
            nodes,
            by_id,
            cells,
            cell_size,
            max_results,
        }
    }

    /// Nodes whose cell overlaps `world`, capped at `max_results`
    pub fn query(&self, world: Rect) -> Vec<&Node> {
        let min_row = cell_coord(world.min_y, self.cell_size);
        let max_row = cell_coord(world.max_y, self.cell_size);
        let min_col = cell_coord(world.min_x, self.cell_size);
        let max_col = cell_coord(world.max_x, self.cell_size);

        let mut out = Vec::new();
        if min_row > max_row || min_col > max_col || self.max_results == 0 {
            return out;
        }

        let Some((&(first_row, _), _)) = self.cells.first_key_value() else {
            return out;
        };
        let Some((&(last_row, _), _)) = self.cells.last_key_value() else {
            return out;
        };

        for row in min_row.max(first_row)..=max_row.min(last_row) {
            for (_, indices) in self.cells.range((row, min_col)..=(row, max_col)) {
                for &index in indices {
                    out.push(&self.nodes[index as usize]);
                    if out.len() >= self.max_results {
                        return out;
                    }
                }
            }
        }
        out
    }

    /// Nodes visible through `viewport` under `transform`
    pub fn query_viewport(&self, transform: &Transform, viewport: Viewport) -> Vec<&Node> {
        self.query(transform.screen_rect_to_world(viewport.screen_rect()))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.by_id.get(&id).map(|&i| &self.nodes[i as usize])
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// World bounds of every node position
    pub fn content_bounds(&self) -> Option<Rect> {
        Rect::enclosing(self.nodes.iter().map(|n| n.position))
    }

    pub fn diagnostics(&self) -> GridDiagnostics {
        if self.cells.is_empty() {
            return GridDiagnostics::default();
        }
        let (mut min_row, mut max_row) = (i32::MAX, i32::MIN);
        let (mut min_col, mut max_col) = (i32::MAX, i32::MIN);
        let mut max_per_cell = 0;
        for (&(row, col), indices) in &self.cells {
            min_row = min_row.min(row);
            max_row = max_row.max(row);
            min_col = min_col.min(col);
            max_col = max_col.max(col);
            max_per_cell = max_per_cell.max(indices.len());
        }
        let rows = (max_row as i64 - min_row as i64 + 1) as usize;
        let cols = (max_col as i64 - min_col as i64 + 1) as usize;

        GridDiagnostics {
            total_cells: rows * cols,
            occupied_cells: self.cells.len(),
            max_per_cell,
            avg_per_cell: self.nodes.len() as f32 / self.cells.len() as f32,
        }
    }
}

#[inline]
fn cell_coord(v: f32, cell_size: f32) -> i32 {
    (v / cell_size).floor() as i32
}
