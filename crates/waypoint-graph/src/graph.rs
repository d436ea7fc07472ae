//! The graph store: nodes, weighted connections and tombstoned removal.
//!
//! Nodes and connections live in tables owned by [`Graph`] and are referred
//! to everywhere else by node index. Removing a node leaves an empty slot
//! behind; indices are never handed out twice.

use log::warn;
use waypoint_core::{Color, Vec2};

// ---------------------------------------------------------------------------
// TerrainType
// ---------------------------------------------------------------------------

/// Terrain classification of a node.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerrainType {
    #[default]
    Ground,
    Mud,
    /// Impassable.
    Water,
}

impl TerrainType {
    #[inline]
    pub fn is_passable(self) -> bool {
        !matches!(self, Self::Water)
    }

    /// Multiplier applied to the distance cost of connections touching
    /// this terrain, or `None` when the terrain cannot be entered.
    #[inline]
    pub fn cost_factor(self) -> Option<f32> {
        match self {
            Self::Ground => Some(1.0),
            Self::Mud => Some(2.0),
            Self::Water => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A graph node. The index is assigned by [`Graph::add_node`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    index: usize,
    pub position: Vec2,
    pub terrain: Option<TerrainType>,
    pub color: Option<Color>,
    /// For navmesh nodes: the mesh line this node was created from.
    pub line_index: Option<usize>,
}

impl Node {
    /// Create an unattached node at `position`.
    pub fn new(position: Vec2) -> Self {
        Self {
            index: 0,
            position,
            terrain: None,
            color: None,
            line_index: None,
        }
    }

    pub fn with_terrain(mut self, terrain: TerrainType) -> Self {
        self.terrain = Some(terrain);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_line_index(mut self, line_index: usize) -> Self {
        self.line_index = Some(line_index);
        self
    }

    /// Index of this node in its graph.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Nodes without a terrain tag are passable.
    #[inline]
    pub fn is_passable(&self) -> bool {
        self.terrain.is_none_or(TerrainType::is_passable)
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// A directed, weighted edge between two node indices.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    from: usize,
    to: usize,
    cost: f32,
    pub color: Color,
}

impl Connection {
    pub fn new(from: usize, to: usize, cost: f32) -> Self {
        Self {
            from,
            to,
            cost,
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    #[inline]
    pub fn from(&self) -> usize {
        self.from
    }

    #[inline]
    pub fn to(&self) -> usize {
        self.to
    }

    #[inline]
    pub fn cost(&self) -> f32 {
        self.cost
    }

    fn reversed(&self) -> Self {
        Self {
            from: self.to,
            to: self.from,
            cost: self.cost,
            color: self.color,
        }
    }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// Node and connection store with O(1) index lookup.
///
/// In an undirected graph every connection is stored in both directions:
/// inserting or removing `(a, b)` also inserts or removes `(b, a)`.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Graph {
    nodes: Vec<Option<Node>>,
    /// Outgoing connections per node index, in insertion order.
    connections: Vec<Vec<Connection>>,
    directed: bool,
}

impl Graph {
    /// Create an empty graph.
    pub fn new(directed: bool) -> Self {
        Self {
            nodes: Vec::new(),
            connections: Vec::new(),
            directed,
        }
    }

    /// A graph with the same node table (tombstones included) and no
    /// connections.
    pub fn cloned_nodes(&self, directed: bool) -> Self {
        Self {
            nodes: self.nodes.clone(),
            connections: vec![Vec::new(); self.nodes.len()],
            directed,
        }
    }

    #[inline]
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    // -----------------------------------------------------------------------
    // Nodes
    // -----------------------------------------------------------------------

    /// Index the next [`add_node`](Self::add_node) call will assign.
    #[inline]
    pub fn next_free_node_index(&self) -> usize {
        self.nodes.len()
    }

    /// Insert a node and return its index.
    pub fn add_node(&mut self, mut node: Node) -> usize {
        let idx = self.next_free_node_index();
        node.index = idx;
        self.nodes.push(Some(node));
        self.connections.push(Vec::new());
        idx
    }

    /// Tombstone a node and drop every connection touching it.
    pub fn remove_node(&mut self, idx: usize) {
        if !self.is_node_valid(idx) {
            return;
        }
        self.nodes[idx] = None;
        self.connections[idx].clear();
        for list in &mut self.connections {
            list.retain(|c| c.to != idx);
        }
    }

    #[inline]
    pub fn is_node_valid(&self, idx: usize) -> bool {
        matches!(self.nodes.get(idx), Some(Some(_)))
    }

    #[inline]
    pub fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx)?.as_ref()
    }

    #[inline]
    pub fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx)?.as_mut()
    }

    #[inline]
    pub fn node_pos(&self, idx: usize) -> Option<Vec2> {
        self.node(idx).map(|n| n.position)
    }

    /// Size of the node table, tombstones included.
    #[inline]
    pub fn nr_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nr_of_active_nodes(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// All non-tombstoned nodes, ordered by index.
    pub fn active_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().flatten()
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Connect `from` to `to` with the Euclidean distance between them as
    /// cost. Returns `false` if the connection was rejected.
    pub fn add_connection(&mut self, from: usize, to: usize) -> bool {
        let (Some(a), Some(b)) = (self.node_pos(from), self.node_pos(to)) else {
            warn!("rejected connection {from} -> {to}: inactive endpoint");
            return false;
        };
        self.insert_connection(Connection::new(from, to, a.distance(b)))
    }

    /// Connect `from` to `to` with an explicit cost.
    pub fn add_connection_with_cost(&mut self, from: usize, to: usize, cost: f32) -> bool {
        self.insert_connection(Connection::new(from, to, cost))
    }

    /// Insert a connection, or update cost and colour of an existing one.
    ///
    /// Rejected (returns `false`) when an endpoint is inactive, when
    /// `from == to`, or when the cost is negative or not finite.
    pub fn insert_connection(&mut self, conn: Connection) -> bool {
        if !self.is_node_valid(conn.from) || !self.is_node_valid(conn.to) {
            warn!(
                "rejected connection {} -> {}: inactive endpoint",
                conn.from, conn.to
            );
            return false;
        }
        if conn.from == conn.to {
            warn!("rejected self-connection on node {}", conn.from);
            return false;
        }
        if !conn.cost.is_finite() || conn.cost < 0.0 {
            warn!(
                "rejected connection {} -> {}: invalid cost {}",
                conn.from, conn.to, conn.cost
            );
            return false;
        }
        if !self.directed {
            self.upsert(conn.reversed());
        }
        self.upsert(conn);
        true
    }

    fn upsert(&mut self, conn: Connection) {
        let list = &mut self.connections[conn.from];
        match list.iter_mut().find(|c| c.to == conn.to) {
            Some(existing) => {
                existing.cost = conn.cost;
                existing.color = conn.color;
            }
            None => list.push(conn),
        }
    }

    /// Remove `(from, to)` (and its mirror in an undirected graph). Absent
    /// connections are ignored.
    pub fn remove_connection(&mut self, from: usize, to: usize) {
        if let Some(list) = self.connections.get_mut(from) {
            list.retain(|c| c.to != to);
        }
        if !self.directed {
            if let Some(list) = self.connections.get_mut(to) {
                list.retain(|c| c.to != from);
            }
        }
    }

    pub fn connection(&self, from: usize, to: usize) -> Option<&Connection> {
        self.connections.get(from)?.iter().find(|c| c.to == to)
    }

    pub fn connection_mut(&mut self, from: usize, to: usize) -> Option<&mut Connection> {
        self.connections.get_mut(from)?.iter_mut().find(|c| c.to == to)
    }

    /// All connections leaving `idx`, in insertion order. Empty for
    /// inactive nodes.
    pub fn node_connections(&self, idx: usize) -> &[Connection] {
        match self.connections.get(idx) {
            Some(list) => list,
            None => &[],
        }
    }

    /// Number of connections leaving `idx`.
    #[inline]
    pub fn degree(&self, idx: usize) -> usize {
        self.node_connections(idx).len()
    }

    /// Every stored connection, grouped by source node index. Undirected
    /// edges appear once per direction.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter().flatten()
    }

    /// Change the cost of `(from, to)` (and its mirror if undirected).
    pub fn set_connection_cost(&mut self, from: usize, to: usize, cost: f32) -> bool {
        match self.connection(from, to) {
            Some(c) => {
                let color = c.color;
                self.insert_connection(Connection::new(from, to, cost).with_color(color))
            }
            None => false,
        }
    }

    /// Reset every connection cost to the distance between its endpoints.
    pub fn set_connection_costs_to_distance(&mut self) {
        let nodes = &self.nodes;
        for conn in self.connections.iter_mut().flatten() {
            if let (Some(Some(a)), Some(Some(b))) = (nodes.get(conn.from), nodes.get(conn.to)) {
                conn.cost = a.position.distance(b.position);
            }
        }
    }

    /// Summed connection cost along `path`, or `None` if two consecutive
    /// nodes are not connected.
    pub fn path_cost(&self, path: &[usize]) -> Option<f32> {
        path.windows(2)
            .map(|w| self.connection(w[0], w[1]).map(Connection::cost))
            .sum()
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn graph_round_trip() {
        let mut g = Graph::new(false);
        let a = g.add_node(Node::new(Vec2::new(0.0, 0.0)).with_terrain(TerrainType::Mud));
        let b = g.add_node(Node::new(Vec2::new(3.0, 4.0)));
        g.add_connection(a, b);
        let json = serde_json::to_string(&g).unwrap();
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(back.node(a), g.node(a));
        assert_eq!(back.connection(b, a).map(Connection::cost), Some(5.0));
    }
}
