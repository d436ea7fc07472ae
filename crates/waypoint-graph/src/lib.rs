//! Weighted graphs and the searches that run on them.
//!
//! This crate provides:
//!
//! - the [`Graph`] store (directed or undirected, tombstoned node removal)
//!   and the uniform-grid [`GridGraph`]
//! - **A\*** ([`AStar`]) and **BFS** ([`Bfs`]) node-path searches
//! - **Jump Point Search** ([`Jps`]) on uniform grids
//! - **Dijkstra** single-source cost maps ([`dijkstra_costs`])
//! - connectivity queries ([`Graph::connected_components`],
//!   [`Graph::is_connected`], [`Graph::reaches`])
//! - Eulerian trails, minimum spanning trees and greedy colouring
//!   ([`EulerianPath`])
//!
//! Node paths are `Vec<usize>` of node indices from start to goal; an empty
//! vector means no path exists.
//!
//! # Searches
//!
//! | Type | Edge costs | Graph |
//! |---|---|---|
//! | [`AStar`] | yes | any [`Graph`] |
//! | [`Bfs`] | ignored (fewest hops) | any [`Graph`] |
//! | [`Jps`] | uniform | [`GridGraph`] |
//!
//! All three implement [`Pathfinder`].

mod astar;
mod bfs;
mod cc;
mod dijkstra;
mod eulerian;
mod graph;
mod grid;
mod heuristic;
mod jps;
mod record;
mod traits;

pub use astar::AStar;
pub use bfs::Bfs;
pub use dijkstra::dijkstra_costs;
pub use eulerian::{Colouring, EulerianPath, Eulerianity, palette_colour};
pub use graph::{Connection, Graph, Node, TerrainType};
pub use grid::GridGraph;
pub use heuristic::Heuristic;
pub use jps::Jps;
pub use traits::Pathfinder;
