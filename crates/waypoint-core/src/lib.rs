//! **waypoint-core** — geometry primitives shared by the waypoint crates.
//!
//! [`Vec2`] (from `glam`) carries world-space positions such as navmesh
//! vertices and node positions, [`Point`] and [`Range`] address cells of
//! uniform grids, and [`Color`] is the display tag stored on graph nodes
//! and connections.

pub mod color;
pub mod geom;

pub use color::Color;
pub use geom::{Point, Range, RangeIter};
pub use glam::Vec2;
