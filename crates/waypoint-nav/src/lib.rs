//! Navigation meshes for waypoint: triangulation, portal graphs and path
//! smoothing.
//!
//! The pipeline runs from static geometry to waypoints:
//!
//! 1. [`NavMesh::triangulate`] turns a contour [`Polygon`] with obstacle
//!    holes into triangles.
//! 2. [`NavGraph`] places a node on every portal (a line shared by two
//!    triangles) and connects the portals of each triangle.
//! 3. [`NavMeshPathfinding`] searches that graph between two positions,
//!    extracts the crossed [`Portal`]s and pulls the path tight with
//!    [`optimize_portals`].

pub mod funnel;
pub mod navgraph;
pub mod navmesh;
pub mod pathfinding;
pub mod polygon;

pub use funnel::{Portal, find_portals, optimize_portals};
pub use navgraph::{NavGraph, NavGraphConfig, SearchKind};
pub use navmesh::{Line, MeshError, NavMesh, Triangle};
pub use pathfinding::{NavMeshPathfinding, PathDebug};
pub use polygon::Polygon;
