//! Connectivity: component labelling and reachability.
//!
//! All traversals use an explicit stack.

use crate::graph::Graph;

impl Graph {
    /// Neighbour lists ignoring edge direction.
    fn undirected_adjacency(&self) -> Vec<Vec<usize>> {
        let mut adj = vec![Vec::new(); self.nr_of_nodes()];
        for conn in self.connections() {
            adj[conn.from()].push(conn.to());
            if self.is_directed() {
                adj[conn.to()].push(conn.from());
            }
        }
        adj
    }

    /// Label every active node with a connected-component ID, treating
    /// connections as undirected. Labels are assigned in index order of the
    /// first node of each component; tombstones get `None`.
    pub fn connected_components(&self) -> Vec<Option<usize>> {
        let adj = self.undirected_adjacency();
        let mut labels: Vec<Option<usize>> = vec![None; self.nr_of_nodes()];
        let mut stack = Vec::new();
        let mut label = 0;

        for start in self.active_nodes().map(|n| n.index()) {
            if labels[start].is_some() {
                continue;
            }
            labels[start] = Some(label);
            stack.push(start);
            while let Some(ci) = stack.pop() {
                for &ni in &adj[ci] {
                    if labels[ni].is_none() {
                        labels[ni] = Some(label);
                        stack.push(ni);
                    }
                }
            }
            label += 1;
        }
        labels
    }

    /// Whether every active node can be reached (ignoring direction) from
    /// a node that has at least one connection. A graph without any
    /// connection is not connected.
    pub fn is_connected(&self) -> bool {
        let Some(seed) = self
            .active_nodes()
            .map(|n| n.index())
            .find(|&i| self.degree(i) > 0)
        else {
            return false;
        };
        let labels = self.connected_components();
        let seed_label = labels[seed];
        self.active_nodes().all(|n| labels[n.index()] == seed_label)
    }

    /// Whether `to` can be reached from `from` by following connections.
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        if !self.is_node_valid(from) || !self.is_node_valid(to) {
            return false;
        }
        if from == to {
            return true;
        }
        let mut visited = vec![false; self.nr_of_nodes()];
        let mut stack = vec![from];
        visited[from] = true;
        while let Some(ci) = stack.pop() {
            for conn in self.node_connections(ci) {
                let ni = conn.to();
                if ni == to {
                    return true;
                }
                if !visited[ni] {
                    visited[ni] = true;
                    stack.push(ni);
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use waypoint_core::Vec2;

    use crate::graph::{Graph, Node};

    fn nodes(directed: bool, n: usize) -> Graph {
        let mut g = Graph::new(directed);
        for i in 0..n {
            g.add_node(Node::new(Vec2::new(i as f32, 0.0)));
        }
        g
    }

    #[test]
    fn labels_components_in_index_order() {
        let mut g = nodes(false, 5);
        g.add_connection(0, 2);
        g.add_connection(3, 4);
        let labels = g.connected_components();
        assert_eq!(labels, vec![Some(0), Some(1), Some(0), Some(2), Some(2)]);
    }

    #[test]
    fn tombstones_are_unlabelled_and_ignored() {
        let mut g = nodes(false, 3);
        g.add_connection(0, 2);
        g.remove_node(1);
        assert_eq!(g.connected_components()[1], None);
        assert!(g.is_connected());
    }

    #[test]
    fn connectivity_ignores_direction() {
        let mut g = nodes(true, 3);
        g.add_connection(0, 1);
        g.add_connection(2, 1);
        assert!(g.is_connected());
        assert!(g.reaches(0, 1));
        assert!(!g.reaches(0, 2));
    }

    #[test]
    fn graph_without_connections_is_not_connected() {
        assert!(!nodes(false, 1).is_connected());
        assert!(!nodes(false, 0).is_connected());
    }

    #[test]
    fn isolated_node_breaks_connectivity() {
        let mut g = nodes(false, 3);
        g.add_connection(0, 1);
        assert!(!g.is_connected());
    }
}
