//! Navmesh path queries.

use log::{debug, trace};
use waypoint_core::Vec2;
use waypoint_graph::{AStar, Bfs, Node, Pathfinder};

use crate::funnel::{Portal, find_portals, optimize_portals};
use crate::navgraph::{NavGraph, SearchKind};

/// Intermediate results of a path query, for debug drawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathDebug {
    /// Positions of the graph nodes visited by the raw node path.
    pub node_positions: Vec<Vec2>,
    /// Portals fed to the funnel.
    pub portals: Vec<Portal>,
}

/// Point-to-point queries on a [`NavGraph`].
pub struct NavMeshPathfinding<'a> {
    nav: &'a NavGraph,
}

impl<'a> NavMeshPathfinding<'a> {
    pub fn new(nav: &'a NavGraph) -> Self {
        Self { nav }
    }

    /// Shortest waypoint path from `start` to `end`.
    ///
    /// Empty when either point is off the mesh or no path exists;
    /// `[start, end]` when both lie in the same triangle.
    pub fn find_path(&self, start: Vec2, end: Vec2) -> Vec<Vec2> {
        self.find_path_with_debug(start, end, &mut PathDebug::default())
    }

    /// Like [`find_path`](Self::find_path), also recording the raw node
    /// path and the portals into `debug`.
    pub fn find_path_with_debug(&self, start: Vec2, end: Vec2, debug: &mut PathDebug) -> Vec<Vec2> {
        debug.node_positions.clear();
        debug.portals.clear();

        let mesh = self.nav.mesh();
        let (Some(start_tri), Some(end_tri)) = (
            mesh.triangle_from_position(start),
            mesh.triangle_from_position(end),
        ) else {
            trace!("navmesh path {start} -> {end}: endpoint off the mesh");
            return Vec::new();
        };
        if start_tri == end_tri {
            debug.node_positions = vec![start, end];
            return vec![start, end];
        }

        // Search a copy with the two endpoints wired to the portals of
        // their triangles.
        let mut graph = self.nav.graph().clone();
        let start_node = graph.add_node(Node::new(start));
        let end_node = graph.add_node(Node::new(end));
        for (node, tri) in [(start_node, start_tri), (end_node, end_tri)] {
            for portal in self.nav.triangle_nodes(tri) {
                graph.add_connection(node, portal);
            }
        }

        let astar;
        let bfs;
        let finder: &dyn Pathfinder = match self.nav.config().search {
            SearchKind::AStar(heuristic) => {
                astar = AStar::new(&graph, heuristic);
                &astar
            }
            SearchKind::Bfs => {
                bfs = Bfs::new(&graph);
                &bfs
            }
        };
        let path = finder.find_path(start_node, end_node);
        if path.is_empty() {
            debug!("navmesh path {start} -> {end}: no route between triangles {start_tri} and {end_tri}");
            return Vec::new();
        }
        debug.node_positions = path.iter().filter_map(|&n| graph.node_pos(n)).collect();

        let portals = find_portals(&path, &graph, mesh);
        let waypoints = optimize_portals(&portals);
        trace!(
            "navmesh path {start} -> {end}: {} nodes, {} portals, {} waypoints",
            path.len(),
            portals.len(),
            waypoints.len()
        );
        debug.portals = portals;
        waypoints
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::navgraph::NavGraphConfig;
    use crate::polygon::Polygon;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    fn nav(contour: Polygon, obstacles: &[Polygon]) -> NavGraph {
        NavGraph::new(&contour, obstacles, &NavGraphConfig::default()).unwrap()
    }

    fn l_room() -> Polygon {
        Polygon::new(vec![
            v(0.0, 0.0),
            v(10.0, 0.0),
            v(10.0, 5.0),
            v(5.0, 5.0),
            v(5.0, 10.0),
            v(0.0, 10.0),
        ])
    }

    fn path_length(path: &[Vec2]) -> f32 {
        path.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    #[test]
    fn open_room_is_a_straight_line() {
        let nav = nav(Polygon::rect(v(0.0, 0.0), v(10.0, 10.0)), &[]);
        let finder = NavMeshPathfinding::new(&nav);
        assert_eq!(finder.find_path(v(2.0, 1.0), v(8.0, 9.0)), vec![v(2.0, 1.0), v(8.0, 9.0)]);
    }

    #[test]
    fn same_triangle_is_direct() {
        let nav = nav(Polygon::rect(v(0.0, 0.0), v(10.0, 10.0)), &[]);
        let mut debug = PathDebug::default();
        let path = NavMeshPathfinding::new(&nav).find_path_with_debug(v(1.0, 1.0), v(2.0, 3.0), &mut debug);
        assert_eq!(path, vec![v(1.0, 1.0), v(2.0, 3.0)]);
        assert!(debug.portals.is_empty());
    }

    #[test]
    fn off_mesh_endpoint_returns_empty() {
        let nav = nav(l_room(), &[]);
        let finder = NavMeshPathfinding::new(&nav);
        assert!(finder.find_path(v(1.0, 1.0), v(7.0, 7.0)).is_empty());
        assert!(finder.find_path(v(-1.0, 1.0), v(1.0, 1.0)).is_empty());
    }

    #[test]
    fn l_room_bends_at_inner_corner() {
        let nav = nav(l_room(), &[]);
        let mut debug = PathDebug::default();
        let start = v(9.0, 1.0);
        let end = v(1.0, 9.5);
        let path = NavMeshPathfinding::new(&nav).find_path_with_debug(start, end, &mut debug);
        assert_eq!(path.len(), 3, "{path:?}");
        assert_eq!(path[0], start);
        assert!(path[1].abs_diff_eq(v(5.0, 5.0), 1e-4));
        assert_eq!(path[2], end);

        // Raw path: start, three portal midpoints, end.
        assert_eq!(debug.node_positions.len(), 5);
        assert_eq!(debug.portals.len(), 5);
        assert_eq!(debug.portals[0], Portal::point(start));
        assert_eq!(debug.portals[4], Portal::point(end));
    }

    #[test]
    fn bfs_search_gives_same_corridor_in_simple_polygon() {
        let config = NavGraphConfig {
            search: SearchKind::Bfs,
            ..NavGraphConfig::default()
        };
        let nav = NavGraph::new(&l_room(), &[], &config).unwrap();
        let path = NavMeshPathfinding::new(&nav).find_path(v(9.0, 1.0), v(1.0, 9.5));
        assert_eq!(path.len(), 3);
        assert!(path[1].abs_diff_eq(v(5.0, 5.0), 1e-4));
    }

    #[test]
    fn path_around_pillar_is_shorter_than_raw_node_path() {
        let pillar = Polygon::rect(v(8.0, 8.0), v(12.0, 12.0));
        let nav = nav(Polygon::rect(v(0.0, 0.0), v(20.0, 20.0)), &[pillar]);
        let mut debug = PathDebug::default();
        let start = v(10.0, 2.0);
        let end = v(10.0, 18.0);
        let path = NavMeshPathfinding::new(&nav).find_path_with_debug(start, end, &mut debug);

        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&end));
        assert!(path.len() >= 3, "must go around the pillar: {path:?}");
        assert!(path_length(&path) <= path_length(&debug.node_positions) + 1e-3);
        // No leg cuts through the expanded pillar (7..13 on both axes).
        for w in path.windows(2) {
            for k in 1..10 {
                let p = w[0] + (w[1] - w[0]) * (k as f32 / 10.0);
                let inside = p.x > 7.01 && p.x < 12.99 && p.y > 7.01 && p.y < 12.99;
                assert!(!inside, "{p} crosses the pillar");
            }
        }
    }

    #[test]
    fn random_queries_start_and_end_at_endpoints() {
        let pillar = Polygon::rect(v(8.0, 8.0), v(12.0, 12.0));
        let nav = nav(Polygon::rect(v(0.0, 0.0), v(20.0, 20.0)), &[pillar]);
        let finder = NavMeshPathfinding::new(&nav);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let a = nav.mesh().random_point(&mut rng).unwrap();
            let b = nav.mesh().random_point(&mut rng).unwrap();
            let path = finder.find_path(a, b);
            assert!(path.len() >= 2, "no path {a} -> {b}");
            assert_eq!(path.first(), Some(&a));
            assert_eq!(path.last(), Some(&b));
            assert!(path_length(&path) + 1e-3 >= a.distance(b));
        }
    }
}
