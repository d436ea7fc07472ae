use crate::graph::Graph;
use crate::heuristic::Heuristic;
use crate::record::best_first_search;
use crate::traits::Pathfinder;

/// A* search over the connections of a [`Graph`].
///
/// The path is optimal as long as `heuristic` never overestimates the
/// remaining connection cost. Among open records with equal estimated
/// total cost, the earliest inserted one is expanded first.
pub struct AStar<'g> {
    graph: &'g Graph,
    heuristic: Heuristic,
}

impl<'g> AStar<'g> {
    pub fn new(graph: &'g Graph, heuristic: Heuristic) -> Self {
        Self { graph, heuristic }
    }

    /// Compute the cheapest node path from `start` to `goal`.
    pub fn find_path(&self, start: usize, goal: usize) -> Vec<usize> {
        let graph = self.graph;
        let Some(goal_pos) = graph.node_pos(goal) else {
            return Vec::new();
        };
        let heuristic = self.heuristic;
        best_first_search(
            graph,
            start,
            goal,
            |n| graph.node_pos(n).map_or(0.0, |p| heuristic.between(p, goal_pos)),
            |n, _parent, out| {
                out.extend(
                    graph
                        .node_connections(n)
                        .iter()
                        .map(|c| (c.to(), c.cost())),
                );
            },
        )
    }
}

impl Pathfinder for AStar<'_> {
    fn find_path(&self, start: usize, goal: usize) -> Vec<usize> {
        AStar::find_path(self, start, goal)
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use waypoint_core::Vec2;

    use super::*;
    use crate::bfs::Bfs;
    use crate::dijkstra::dijkstra_costs;
    use crate::graph::Node;

    /// 0 -- 1 -- 2
    /// |         |
    /// 3 ------- 4
    fn detour_graph() -> Graph {
        let mut g = Graph::new(false);
        for p in [(0.0, 0.0), (1.0, 0.0), (2.0, 0.0), (0.0, 1.0), (2.0, 1.0)] {
            g.add_node(Node::new(Vec2::new(p.0, p.1)));
        }
        g.add_connection(0, 1);
        g.add_connection(1, 2);
        g.add_connection(0, 3);
        g.add_connection(3, 4);
        g.add_connection(4, 2);
        g
    }

    fn random_graph(rng: &mut StdRng, nodes: usize, edge_chance: f64) -> Graph {
        let mut g = Graph::new(rng.random_bool(0.5));
        for _ in 0..nodes {
            let pos = Vec2::new(rng.random_range(0.0..50.0), rng.random_range(0.0..50.0));
            g.add_node(Node::new(pos));
        }
        for a in 0..nodes {
            for b in 0..nodes {
                if a != b && rng.random_bool(edge_chance) {
                    let (Some(pa), Some(pb)) = (g.node_pos(a), g.node_pos(b)) else {
                        continue;
                    };
                    // Never cheaper than the straight line, so Euclidean
                    // stays admissible.
                    let cost = pa.distance(pb) * rng.random_range(1.0..3.0);
                    g.add_connection_with_cost(a, b, cost);
                }
            }
        }
        g
    }

    fn assert_valid_path(g: &Graph, path: &[usize], start: usize, goal: usize) {
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for w in path.windows(2) {
            assert!(g.connection(w[0], w[1]).is_some(), "no edge {} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn finds_cheapest_route() {
        let g = detour_graph();
        let path = AStar::new(&g, Heuristic::Euclidean).find_path(0, 2);
        assert_eq!(path, vec![0, 1, 2]);
    }

    #[test]
    fn takes_detour_when_direct_edge_is_expensive() {
        let mut g = detour_graph();
        g.set_connection_cost(1, 2, 10.0);
        let path = AStar::new(&g, Heuristic::Euclidean).find_path(0, 2);
        assert_eq!(path, vec![0, 3, 4, 2]);
        assert_eq!(g.path_cost(&path), Some(4.0));
    }

    #[test]
    fn start_equals_goal() {
        let g = detour_graph();
        assert_eq!(AStar::new(&g, Heuristic::Chebyshev).find_path(3, 3), vec![3]);
    }

    #[test]
    fn unreachable_goal_returns_empty() {
        let mut g = detour_graph();
        let island = g.add_node(Node::new(Vec2::new(9.0, 9.0)));
        let astar = AStar::new(&g, Heuristic::Chebyshev);
        assert!(astar.find_path(0, island).is_empty());
        assert!(astar.find_path(0, 42).is_empty());
    }

    #[test]
    fn removed_goal_returns_empty() {
        let mut g = detour_graph();
        g.remove_node(2);
        assert!(AStar::new(&g, Heuristic::Euclidean).find_path(0, 2).is_empty());
    }

    #[test]
    fn directed_edges_are_respected() {
        let mut g = Graph::new(true);
        for x in 0..3 {
            g.add_node(Node::new(Vec2::new(x as f32, 0.0)));
        }
        g.add_connection(0, 1);
        g.add_connection(1, 2);
        let astar = AStar::new(&g, Heuristic::Euclidean);
        assert_eq!(astar.find_path(0, 2), vec![0, 1, 2]);
        assert!(astar.find_path(2, 0).is_empty());
    }

    /// Equal estimated totals: the record inserted first wins, so the route
    /// through node 1 (listed first) is chosen over the one through node 3.
    #[test]
    fn equal_cost_ties_follow_insertion_order() {
        let mut g = Graph::new(false);
        for p in [(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (1.0, -1.0)] {
            g.add_node(Node::new(Vec2::new(p.0, p.1)));
        }
        g.add_connection(0, 1);
        g.add_connection(0, 3);
        g.add_connection(1, 2);
        g.add_connection(3, 2);
        let path = AStar::new(&g, Heuristic::Euclidean).find_path(0, 2);
        assert_eq!(path, vec![0, 1, 2]);
    }

    #[test]
    fn uniform_costs_never_beat_bfs_hop_count() {
        // Random 8-connected subsets of a 4x4 lattice, every step costing 1,
        // so Chebyshev never overestimates.
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..30 {
            let mut g = Graph::new(false);
            for y in 0..4 {
                for x in 0..4 {
                    g.add_node(Node::new(Vec2::new(x as f32, y as f32)));
                }
            }
            for a in 0..16 {
                for b in a + 1..16 {
                    let (pa, pb) = (g.node_pos(a).unwrap(), g.node_pos(b).unwrap());
                    let d = (pb - pa).abs();
                    if d.x.max(d.y) == 1.0 && rng.random_bool(0.5) {
                        g.add_connection_with_cost(a, b, 1.0);
                    }
                }
            }
            let bfs = Bfs::new(&g).find_path(0, 15);
            let astar = AStar::new(&g, Heuristic::Chebyshev).find_path(0, 15);
            assert_eq!(bfs.is_empty(), astar.is_empty());
            if !astar.is_empty() {
                let cost = g.path_cost(&astar).unwrap();
                assert!(cost <= (bfs.len() - 1) as f32 + 1e-4);
                assert_eq!(astar.len(), bfs.len());
            }
        }
    }

    #[test]
    fn matches_dijkstra_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for round in 0..50 {
            let n = rng.random_range(2..=20);
            let g = random_graph(&mut rng, n, 0.25);
            let start = rng.random_range(0..n);
            let goal = rng.random_range(0..n);
            let reference = dijkstra_costs(&g, start);
            let path = AStar::new(&g, Heuristic::Euclidean).find_path(start, goal);
            match reference[goal] {
                None => assert!(path.is_empty(), "round {round}: found a path to an unreachable goal"),
                Some(best) => {
                    assert_valid_path(&g, &path, start, goal);
                    let cost = g.path_cost(&path).unwrap();
                    assert!(
                        (cost - best).abs() <= 1e-3 * best.max(1.0),
                        "round {round}: A* cost {cost} vs Dijkstra {best}"
                    );
                }
            }
        }
    }
}
