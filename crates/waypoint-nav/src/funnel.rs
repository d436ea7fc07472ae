//! Portal extraction and funnel (string pulling) path smoothing.

use log::warn;
use waypoint_core::Vec2;
use waypoint_graph::Graph;

use crate::navmesh::NavMesh;

/// Squared distance under which two points are considered equal.
const SAME_POINT_SQ: f32 = 1e-6;

/// An opening between two triangles, seen in the direction of travel.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portal {
    pub left: Vec2,
    pub right: Vec2,
}

impl Portal {
    pub fn new(left: Vec2, right: Vec2) -> Self {
        Self { left, right }
    }

    /// A zero-width portal at `p`.
    pub fn point(p: Vec2) -> Self {
        Self { left: p, right: p }
    }
}

/// Portals crossed by a node path through a navigation graph.
///
/// `path` starts and ends at nodes placed inside mesh triangles; every
/// node in between must carry the mesh line it was created from. The
/// result starts with a zero-width portal at the start position, has one
/// portal per crossed line, and ends with a zero-width portal at the end.
/// Returns an empty list when the path cannot be mapped onto the mesh.
pub fn find_portals(path: &[usize], graph: &Graph, mesh: &NavMesh) -> Vec<Portal> {
    let (Some(&first), Some(&last)) = (path.first(), path.last()) else {
        return Vec::new();
    };
    let (Some(start), Some(end)) = (graph.node_pos(first), graph.node_pos(last)) else {
        return Vec::new();
    };
    let Some(mut current) = mesh.triangle_from_position(start) else {
        return Vec::new();
    };

    let mut portals = Vec::with_capacity(path.len());
    portals.push(Portal::point(start));

    let inner = if path.len() > 2 { &path[1..path.len() - 1] } else { &[][..] };
    for &n in inner {
        let Some(line) = graph
            .node(n)
            .and_then(|node| node.line_index)
            .and_then(|l| mesh.line(l))
        else {
            warn!("portal extraction: node {n} is not on a mesh line");
            return Vec::new();
        };
        let tris = mesh.triangles_from_line_index(line.index);
        let (from, to) = match *tris {
            [a, b] if a == current => (a, b),
            [a, b] if b == current => (b, a),
            [a, b] => {
                warn!(
                    "portal extraction: line {} does not border triangle {current}",
                    line.index
                );
                (a, b)
            }
            _ => {
                warn!("portal extraction: line {} is not a portal", line.index);
                return Vec::new();
            }
        };
        let Some(tri) = mesh.triangle(from) else {
            return Vec::new();
        };

        // Orient the line as seen when leaving `from` through it.
        let centroid = tri.centroid();
        let heading = line.midpoint() - centroid;
        let portal = if heading.perp_dot(line.p1 - centroid) > 0.0 {
            Portal::new(line.p1, line.p2)
        } else {
            Portal::new(line.p2, line.p1)
        };
        portals.push(portal);
        current = to;
    }

    portals.push(Portal::point(end));
    portals
}

/// Twice the signed area of `(a, b, c)`, positive when `c` lies to the
/// right of `a -> b`.
#[inline]
fn triarea2(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c - a).perp_dot(b - a)
}

#[inline]
fn same_point(a: Vec2, b: Vec2) -> bool {
    (a - b).length_squared() < SAME_POINT_SQ
}

/// Shortest path through a portal corridor, using the simple stupid funnel
/// algorithm.
///
/// The first and last portals are taken as the start and end points (their
/// left sides). The funnel is a wedge from the current apex through the
/// tightest left and right portal sides seen so far; a portal side that
/// crosses over the opposite side emits that opposite side as a path
/// corner and restarts the funnel from it.
pub fn optimize_portals(portals: &[Portal]) -> Vec<Vec2> {
    let (Some(first), Some(last)) = (portals.first(), portals.last()) else {
        return Vec::new();
    };

    let mut path = vec![first.left];
    let mut apex = first.left;
    let mut left = first.left;
    let mut right = first.right;
    let (mut apex_idx, mut left_idx, mut right_idx) = (0, 0, 0);

    let mut i = 1;
    while i < portals.len() {
        let Portal {
            left: next_left,
            right: next_right,
        } = portals[i];

        if triarea2(apex, right, next_right) <= 0.0 {
            if same_point(apex, right) || triarea2(apex, left, next_right) > 0.0 {
                right = next_right;
                right_idx = i;
            } else {
                // Right side crossed the left one: left is a corner.
                if !path.last().is_some_and(|&p| same_point(p, left)) {
                    path.push(left);
                }
                apex = left;
                apex_idx = left_idx;
                right = apex;
                right_idx = apex_idx;
                i = apex_idx + 1;
                continue;
            }
        }

        if triarea2(apex, left, next_left) >= 0.0 {
            if same_point(apex, left) || triarea2(apex, right, next_left) < 0.0 {
                left = next_left;
                left_idx = i;
            } else {
                if !path.last().is_some_and(|&p| same_point(p, right)) {
                    path.push(right);
                }
                apex = right;
                apex_idx = right_idx;
                left = apex;
                left_idx = apex_idx;
                i = apex_idx + 1;
                continue;
            }
        }

        i += 1;
    }

    if !path.last().is_some_and(|&p| same_point(p, last.left)) {
        path.push(last.left);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vec2 {
        Vec2::new(x, y)
    }

    #[test]
    fn straight_corridor_is_a_straight_line() {
        let portals = [
            Portal::point(v(0.0, 0.0)),
            Portal::new(v(1.0, 1.0), v(1.0, -1.0)),
            Portal::new(v(2.0, 1.0), v(2.0, -1.0)),
            Portal::point(v(3.0, 0.0)),
        ];
        assert_eq!(optimize_portals(&portals), vec![v(0.0, 0.0), v(3.0, 0.0)]);
    }

    #[test]
    fn corridor_with_turn_bends_at_corner() {
        // Heading +x, then the corridor shifts up; (1, 0.5) is the corner.
        let portals = [
            Portal::point(v(0.0, 0.0)),
            Portal::new(v(1.0, 0.5), v(1.0, -0.5)),
            Portal::new(v(2.0, 2.0), v(2.0, 0.5)),
            Portal::point(v(3.0, 1.5)),
        ];
        let path = optimize_portals(&portals);
        assert_eq!(path.len(), 3);
        assert!(path[1].abs_diff_eq(v(1.0, 0.5), 1e-6));
        assert_eq!(path.last(), Some(&v(3.0, 1.5)));
    }

    #[test]
    fn turn_to_the_right_uses_right_side() {
        let portals = [
            Portal::point(v(0.0, 0.0)),
            Portal::new(v(1.0, 0.5), v(1.0, -0.5)),
            Portal::new(v(2.0, -0.5), v(2.0, -2.0)),
            Portal::point(v(3.0, -2.0)),
        ];
        let path = optimize_portals(&portals);
        assert_eq!(path.len(), 3);
        assert!(path[1].abs_diff_eq(v(1.0, -0.5), 1e-6));
    }

    #[test]
    fn start_and_end_only() {
        let portals = [Portal::point(v(1.0, 2.0)), Portal::point(v(4.0, 6.0))];
        assert_eq!(optimize_portals(&portals), vec![v(1.0, 2.0), v(4.0, 6.0)]);
        assert!(optimize_portals(&[]).is_empty());
    }

    #[test]
    fn optimizing_twice_changes_nothing() {
        let portals = [
            Portal::point(v(0.0, 0.0)),
            Portal::new(v(1.0, 0.5), v(1.0, -0.5)),
            Portal::new(v(2.0, 2.0), v(2.0, 0.5)),
            Portal::new(v(3.0, 3.0), v(4.0, 2.0)),
            Portal::point(v(5.0, 5.0)),
        ];
        let once = optimize_portals(&portals);
        let as_portals: Vec<Portal> = once.iter().map(|&p| Portal::point(p)).collect();
        assert_eq!(optimize_portals(&as_portals), once);
    }
}
