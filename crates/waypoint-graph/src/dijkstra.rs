use std::collections::BinaryHeap;

use crate::graph::Graph;
use crate::record::OpenEntry;

/// Single-source Dijkstra cost map.
///
/// Entry `i` holds the cheapest connection cost from `source` to node `i`,
/// or `None` when `i` is unreachable or not an active node. The result has
/// one entry per node table slot.
pub fn dijkstra_costs(graph: &Graph, source: usize) -> Vec<Option<f32>> {
    let len = graph.nr_of_nodes();
    let mut costs: Vec<Option<f32>> = vec![None; len];
    if !graph.is_node_valid(source) {
        return costs;
    }

    let mut settled = vec![false; len];
    let mut open: BinaryHeap<OpenEntry> = BinaryHeap::new();
    let mut seq = 0u64;

    costs[source] = Some(0.0);
    open.push(OpenEntry {
        node: source,
        f: 0.0,
        seq,
    });

    while let Some(current) = open.pop() {
        if settled[current.node] {
            continue;
        }
        settled[current.node] = true;
        let g = current.f;

        for conn in graph.node_connections(current.node) {
            let next = conn.to();
            if next >= len || settled[next] {
                continue;
            }
            let tentative = g + conn.cost();
            if costs[next].is_some_and(|c| c <= tentative) {
                continue;
            }
            costs[next] = Some(tentative);
            seq += 1;
            open.push(OpenEntry {
                node: next,
                f: tentative,
                seq,
            });
        }
    }

    costs
}

#[cfg(test)]
mod tests {
    use waypoint_core::Vec2;

    use super::*;
    use crate::graph::Node;

    #[test]
    fn cost_map_over_small_graph() {
        let mut g = Graph::new(true);
        for x in 0..4 {
            g.add_node(Node::new(Vec2::new(x as f32, 0.0)));
        }
        g.add_connection_with_cost(0, 1, 4.0);
        g.add_connection_with_cost(0, 2, 1.0);
        g.add_connection_with_cost(2, 1, 2.0);
        let costs = dijkstra_costs(&g, 0);
        assert_eq!(costs, vec![Some(0.0), Some(3.0), Some(1.0), None]);
    }

    #[test]
    fn inactive_source_reaches_nothing() {
        let mut g = Graph::new(false);
        g.add_node(Node::new(Vec2::ZERO));
        g.remove_node(0);
        assert_eq!(dijkstra_costs(&g, 0), vec![None]);
        assert_eq!(dijkstra_costs(&g, 5), vec![None]);
    }
}
