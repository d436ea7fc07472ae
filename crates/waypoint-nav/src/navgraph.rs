//! Navigation graphs: one node per navmesh portal.

use log::debug;
use waypoint_core::Vec2;
use waypoint_graph::{Graph, Heuristic, Node};

use crate::navmesh::{MeshError, NavMesh};
use crate::polygon::Polygon;

/// Search used by [`NavMeshPathfinding`](crate::NavMeshPathfinding).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchKind {
    AStar(Heuristic),
    Bfs,
}

impl Default for SearchKind {
    fn default() -> Self {
        Self::AStar(Heuristic::Chebyshev)
    }
}

/// Settings for building and querying a [`NavGraph`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavGraphConfig {
    /// Clearance kept around obstacles: every obstacle shape is expanded
    /// by this distance before triangulation.
    pub agent_radius: f32,
    /// Node-path search over the portal graph.
    pub search: SearchKind,
}

impl Default for NavGraphConfig {
    fn default() -> Self {
        Self {
            agent_radius: 1.0,
            search: SearchKind::default(),
        }
    }
}

/// An undirected graph over the portals of a [`NavMesh`].
///
/// Every line shared by two triangles gets a node at its midpoint. The
/// portal nodes bounding the same triangle are connected pairwise, with
/// the distance between them as cost.
#[derive(Clone, Debug)]
pub struct NavGraph {
    graph: Graph,
    mesh: NavMesh,
    config: NavGraphConfig,
    /// Node index per mesh line; `None` for boundary lines.
    line_nodes: Vec<Option<usize>>,
}

impl NavGraph {
    /// Triangulate `contour` minus the expanded `obstacles` and build the
    /// portal graph.
    pub fn new(
        contour: &Polygon,
        obstacles: &[Polygon],
        config: &NavGraphConfig,
    ) -> Result<Self, MeshError> {
        let holes: Vec<Polygon> = obstacles
            .iter()
            .map(|o| o.expand(config.agent_radius))
            .collect();
        let mesh = NavMesh::triangulate(contour, &holes)?;
        Ok(Self::from_mesh(mesh, config))
    }

    /// Build the portal graph of an existing mesh.
    pub fn from_mesh(mesh: NavMesh, config: &NavGraphConfig) -> Self {
        let mut graph = Graph::new(false);
        let mut line_nodes = vec![None; mesh.lines().len()];
        for line in mesh.lines() {
            if mesh.triangles_from_line_index(line.index).len() > 1 {
                let idx = graph.add_node(Node::new(line.midpoint()).with_line_index(line.index));
                line_nodes[line.index] = Some(idx);
            }
        }

        for tri in mesh.triangles() {
            let portals: Vec<usize> = tri
                .lines
                .iter()
                .filter_map(|&l| line_nodes.get(l).copied().flatten())
                .collect();
            match portals[..] {
                [a, b] => {
                    graph.add_connection(a, b);
                }
                [a, b, c] => {
                    graph.add_connection(a, b);
                    graph.add_connection(b, c);
                    graph.add_connection(c, a);
                }
                _ => {}
            }
        }
        graph.set_connection_costs_to_distance();

        debug!(
            "navgraph: {} portal nodes, {} connections over {} triangles",
            graph.nr_of_active_nodes(),
            graph.connections().count() / 2,
            mesh.triangles().len()
        );
        Self {
            graph,
            mesh,
            config: config.clone(),
            line_nodes,
        }
    }

    #[inline]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    #[inline]
    pub fn mesh(&self) -> &NavMesh {
        &self.mesh
    }

    #[inline]
    pub fn config(&self) -> &NavGraphConfig {
        &self.config
    }

    /// Graph node created for a mesh line, if the line is a portal.
    pub fn node_from_line_index(&self, line: usize) -> Option<usize> {
        self.line_nodes.get(line).copied().flatten()
    }

    /// Portal nodes on the lines of triangle `tri`.
    pub fn triangle_nodes(&self, tri: usize) -> Vec<usize> {
        self.mesh
            .triangle(tri)
            .map(|t| {
                t.lines
                    .iter()
                    .filter_map(|&l| self.node_from_line_index(l))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Position of a graph node.
    #[inline]
    pub fn node_pos(&self, idx: usize) -> Option<Vec2> {
        self.graph.node_pos(idx)
    }
}


#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn config_serde_round_trip() {
        let config = NavGraphConfig {
            agent_radius: 0.5,
            search: SearchKind::AStar(Heuristic::Octile),
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: NavGraphConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn mesh_serde_round_trip() {
        let room = Polygon::rect(Vec2::new(0.0, 0.0), Vec2::new(4.0, 2.0));
        let mesh = NavMesh::triangulate(&room, &[]).unwrap();
        let json = serde_json::to_string(&mesh).unwrap();
        let back: NavMesh = serde_json::from_str(&json).unwrap();
        assert_eq!(back.triangles(), mesh.triangles());
        assert_eq!(back.lines(), mesh.lines());
    }
}
