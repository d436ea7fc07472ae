//! Uniform grid graphs.

use waypoint_core::{Point, Range, Vec2};

use crate::graph::{Graph, Node, TerrainType};

/// A [`Graph`] laid out as a uniform grid of square cells.
///
/// Node `i` is the cell `(i % columns, i / columns)` and sits at the cell
/// centre. Cells are connected to their 4 or 8 neighbours (undirected);
/// water cells have no connections.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridGraph {
    graph: Graph,
    columns: i32,
    rows: i32,
    cell_size: f32,
    diagonals: bool,
}

impl GridGraph {
    /// Create a fully connected `columns × rows` grid of ground cells.
    pub fn new(columns: i32, rows: i32, cell_size: f32, diagonals: bool) -> Self {
        let columns = columns.max(0);
        let rows = rows.max(0);
        let mut graph = Graph::new(false);
        for p in Range::new(0, 0, columns, rows) {
            let center = Vec2::new(
                (p.x as f32 + 0.5) * cell_size,
                (p.y as f32 + 0.5) * cell_size,
            );
            graph.add_node(Node::new(center).with_terrain(TerrainType::Ground));
        }
        let mut grid = Self {
            graph,
            columns,
            rows,
            cell_size,
            diagonals,
        };
        for idx in 0..grid.graph.nr_of_nodes() {
            grid.connect_cell(idx);
        }
        grid
    }

    /// The underlying graph.
    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn columns(&self) -> i32 {
        self.columns
    }

    #[inline]
    pub fn rows(&self) -> i32 {
        self.rows
    }

    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Whether cells connect diagonally (8-way) or only cardinally (4-way).
    #[inline]
    pub fn has_diagonals(&self) -> bool {
        self.diagonals
    }

    /// Cell coordinates covered by the grid.
    #[inline]
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.columns, self.rows)
    }

    /// Node index of a cell, or `None` outside the grid.
    #[inline]
    pub fn index_of(&self, p: Point) -> Option<usize> {
        if !self.bounds().contains(p) {
            return None;
        }
        Some((p.y * self.columns + p.x) as usize)
    }

    /// Cell of a node index.
    #[inline]
    pub fn cell_of(&self, idx: usize) -> Point {
        let columns = self.columns.max(1) as usize;
        Point::new((idx % columns) as i32, (idx / columns) as i32)
    }

    /// Node whose cell contains the world position `pos`.
    pub fn node_at_world_pos(&self, pos: Vec2) -> Option<usize> {
        if self.cell_size <= 0.0 {
            return None;
        }
        let x = (pos.x / self.cell_size).floor();
        let y = (pos.y / self.cell_size).floor();
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        self.index_of(Point::new(x as i32, y as i32))
    }

    /// Whether the cell is inside the grid and can be entered.
    pub fn is_passable(&self, p: Point) -> bool {
        self.index_of(p)
            .and_then(|i| self.graph.node(i))
            .is_some_and(Node::is_passable)
    }

    /// Terrain of a node (ground for untagged nodes).
    pub fn terrain(&self, idx: usize) -> Option<TerrainType> {
        self.graph.node(idx).map(|n| n.terrain.unwrap_or_default())
    }

    /// Change the terrain of a cell and rebuild its connections. Water
    /// disconnects the cell; other terrain reconnects it to every passable
    /// neighbour with costs scaled by the terrain of both cells.
    pub fn set_terrain(&mut self, idx: usize, terrain: TerrainType) -> bool {
        let Some(node) = self.graph.node_mut(idx) else {
            return false;
        };
        node.terrain = Some(terrain);
        let neighbors: Vec<usize> = self
            .graph
            .node_connections(idx)
            .iter()
            .map(|c| c.to())
            .collect();
        for n in neighbors {
            self.graph.remove_connection(idx, n);
        }
        self.connect_cell(idx);
        true
    }

    fn neighbor_cells(&self, p: Point) -> Vec<Point> {
        if self.diagonals {
            p.neighbors_8().to_vec()
        } else {
            p.neighbors_4().to_vec()
        }
    }

    /// Connect a cell to all passable neighbours.
    fn connect_cell(&mut self, idx: usize) {
        let Some(own) = self.terrain(idx).and_then(TerrainType::cost_factor) else {
            return;
        };
        let Some(pos) = self.graph.node_pos(idx) else {
            return;
        };
        for q in self.neighbor_cells(self.cell_of(idx)) {
            let Some(ni) = self.index_of(q) else {
                continue;
            };
            let Some(other) = self.terrain(ni).and_then(TerrainType::cost_factor) else {
                continue;
            };
            let Some(npos) = self.graph.node_pos(ni) else {
                continue;
            };
            let cost = pos.distance(npos) * (own + other) * 0.5;
            self.graph.add_connection_with_cost(idx, ni, cost);
        }
    }
}
