//! Eulerian trails, minimum spanning trees and greedy graph colouring.

use log::debug;
use waypoint_core::Color;

use crate::graph::{Connection, Graph};

/// Whether a graph admits an Eulerian circuit or trail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Eulerianity {
    NotEulerian,
    /// An open trail exists between the two odd-degree nodes.
    SemiEulerian,
    /// A closed circuit exists.
    Eulerian,
}

/// Result of [`EulerianPath::graph_colouring`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Colouring {
    /// `(node index, colour number)` for every active node, by index.
    /// Colour numbers start at 1.
    pub colours: Vec<(usize, u32)>,
    /// Number of colours in use.
    pub colour_count: u32,
}

impl Colouring {
    /// Colour number of a node, if it was coloured.
    pub fn colour_of(&self, idx: usize) -> Option<u32> {
        self.colours
            .iter()
            .find_map(|&(n, c)| (n == idx).then_some(c))
    }

    /// Write palette colours onto the colour tags of the coloured nodes.
    pub fn apply(&self, graph: &mut Graph) {
        for &(idx, colour) in &self.colours {
            if let Some(node) = graph.node_mut(idx) {
                node.color = Some(palette_colour(self.colour_count, colour));
            }
        }
    }
}

/// Display colour for colour number `colour` out of `count`.
///
/// Six hues cycle (red, green, blue, yellow, magenta, cyan); each further
/// cycle of six is darker than the previous one.
pub fn palette_colour(count: u32, colour: u32) -> Color {
    let cycles = (count as f32 / 6.0).ceil().max(1.0);
    let tint = (cycles - (colour as f32 / 6.0).ceil() + 1.0) / cycles;
    let (r, g, b) = match colour % 6 {
        1 => (tint, 0.0, 0.0),
        2 => (0.0, tint, 0.0),
        3 => (0.0, 0.0, tint),
        4 => (tint, tint, 0.0),
        5 => (tint, 0.0, tint),
        _ => (0.0, tint, tint),
    };
    Color::from_rgb_f32(r, g, b)
}

/// Eulerian analysis plus spanning tree and colouring utilities over a
/// borrowed graph. Destructive steps run on private clones.
pub struct EulerianPath<'g> {
    graph: &'g Graph,
}

impl<'g> EulerianPath<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        Self { graph }
    }

    /// Classify the graph by connectivity and the number of odd-degree
    /// nodes. Only undirected graphs are classified; a directed graph is
    /// always `NotEulerian`.
    pub fn is_eulerian(&self) -> Eulerianity {
        if self.graph.is_directed() || !self.graph.is_connected() {
            return Eulerianity::NotEulerian;
        }
        let odd = self
            .graph
            .active_nodes()
            .filter(|n| self.graph.degree(n.index()) % 2 == 1)
            .count();
        match odd {
            0 => Eulerianity::Eulerian,
            2 => Eulerianity::SemiEulerian,
            _ => Eulerianity::NotEulerian,
        }
    }

    /// Node sequence of an Eulerian circuit or trail (Hierholzer).
    ///
    /// `eulerianity` is usually the result of [`is_eulerian`](Self::is_eulerian).
    /// Circuits start at the first node with a connection, trails at the
    /// first odd-degree node. `NotEulerian` yields an empty path.
    pub fn find_path(&self, eulerianity: Eulerianity) -> Vec<usize> {
        let graph = self.graph;
        let start = match eulerianity {
            Eulerianity::NotEulerian => return Vec::new(),
            Eulerianity::Eulerian => graph
                .active_nodes()
                .map(|n| n.index())
                .find(|&i| graph.degree(i) > 0),
            Eulerianity::SemiEulerian => graph
                .active_nodes()
                .map(|n| n.index())
                .find(|&i| graph.degree(i) % 2 == 1),
        };
        let Some(mut current) = start else {
            return Vec::new();
        };

        let mut remaining = graph.clone();
        let mut stack = Vec::new();
        let mut path = Vec::new();
        loop {
            match remaining.node_connections(current).first().map(Connection::to) {
                Some(next) => {
                    remaining.remove_connection(current, next);
                    stack.push(current);
                    current = next;
                }
                None => {
                    path.push(current);
                    match stack.pop() {
                        Some(prev) => current = prev,
                        None => break,
                    }
                }
            }
        }
        path.reverse();
        path
    }

    /// Minimum spanning tree (forest, for disconnected graphs) by Kruskal's
    /// algorithm with a reachability cycle check.
    ///
    /// Each accepted edge is returned once, as stored in the graph, in
    /// acceptance order: ascending cost, ties in insertion order.
    pub fn find_mst(&self) -> Vec<Connection> {
        let graph = self.graph;
        let mut remaining = graph.clone();
        let mut links: Vec<&Connection> = Vec::new();
        for node in graph.active_nodes() {
            for conn in graph.node_connections(node.index()) {
                if remaining.connection(conn.from(), conn.to()).is_some() {
                    links.push(conn);
                    remaining.remove_connection(conn.from(), conn.to());
                }
            }
        }
        links.sort_by(|a, b| a.cost().total_cmp(&b.cost()));

        let mut accepted = graph.cloned_nodes(false);
        let mut tree = Vec::new();
        for conn in links {
            if accepted.reaches(conn.from(), conn.to()) {
                continue;
            }
            accepted.add_connection_with_cost(conn.from(), conn.to(), conn.cost());
            tree.push(conn.clone());
        }
        debug!(
            "spanning tree: {} of {} nodes joined by {} edges",
            graph.nr_of_active_nodes(),
            graph.nr_of_nodes(),
            tree.len()
        );
        tree
    }

    /// Greedy colouring in node index order.
    ///
    /// Starting from a single colour, every node takes the lowest colour
    /// not used by an already coloured neighbour; when a node cannot be
    /// coloured the budget grows by one and the pass restarts. The budget
    /// never exceeds the number of active nodes.
    pub fn graph_colouring(&self) -> Colouring {
        let graph = self.graph;
        let nodes: Vec<usize> = graph.active_nodes().map(|n| n.index()).collect();
        let Ok(max_budget) = u32::try_from(nodes.len()) else {
            return Colouring::default();
        };
        if max_budget == 0 {
            return Colouring::default();
        }
        let adjacent =
            |a: usize, b: usize| graph.connection(a, b).is_some() || graph.connection(b, a).is_some();

        let mut budget = 1;
        loop {
            let mut colours: Vec<(usize, u32)> = Vec::with_capacity(nodes.len());
            let mut complete = true;
            for &n in &nodes {
                let free = (1..=budget).find(|&c| {
                    colours
                        .iter()
                        .all(|&(other, oc)| oc != c || !adjacent(n, other))
                });
                match free {
                    Some(c) => colours.push((n, c)),
                    None => {
                        complete = false;
                        break;
                    }
                }
            }
            if complete || budget >= max_budget {
                debug!("graph coloured with {budget} colours");
                return Colouring {
                    colours,
                    colour_count: budget,
                };
            }
            budget += 1;
        }
    }
}
