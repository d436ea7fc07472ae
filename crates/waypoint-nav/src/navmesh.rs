//! Triangle navigation meshes.
//!
//! A [`NavMesh`] is built from a contour polygon with obstacle holes by
//! bridging every hole into the contour and ear clipping the result, or
//! directly from a list of triangles. Triangle edges are stored once as
//! [`Line`]s; a line bounded by two triangles is a portal, a line with a
//! single triangle is part of the boundary.

use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use rand::Rng;
use waypoint_core::Vec2;

use crate::polygon::Polygon;

/// Tolerance for orientation and containment tests.
const EPS: f32 = 1e-5;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that can occur when building a navmesh.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshError {
    /// A polygon has fewer than three vertices.
    TooFewVertices(usize),
    /// A hole is not strictly inside the contour.
    HoleOutsideContour(usize),
    /// Ear clipping stopped with this many vertices left (self-intersecting
    /// or overlapping input).
    Degenerate(usize),
    /// A triangle refers to a vertex that does not exist.
    InvalidVertex { triangle: usize, vertex: usize },
    /// An edge is shared by more than two triangles.
    NonManifoldEdge(usize, usize),
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewVertices(n) => write!(f, "navmesh: polygon with only {n} vertices"),
            Self::HoleOutsideContour(i) => {
                write!(f, "navmesh: hole {i} is not inside the contour")
            }
            Self::Degenerate(n) => {
                write!(f, "navmesh: cannot triangulate, {n} vertices left unclipped")
            }
            Self::InvalidVertex { triangle, vertex } => {
                write!(f, "navmesh: triangle {triangle} refers to missing vertex {vertex}")
            }
            Self::NonManifoldEdge(a, b) => {
                write!(f, "navmesh: edge {a}-{b} is shared by more than two triangles")
            }
        }
    }
}

impl std::error::Error for MeshError {}

// ---------------------------------------------------------------------------
// Lines and triangles
// ---------------------------------------------------------------------------

/// A mesh edge between two vertices, stored once per vertex pair.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub index: usize,
    pub vertices: [usize; 2],
    pub p1: Vec2,
    pub p2: Vec2,
}

impl Line {
    #[inline]
    pub fn midpoint(&self) -> Vec2 {
        (self.p1 + self.p2) * 0.5
    }
}

/// A counter-clockwise mesh triangle with its vertex and line indices.
/// `lines[i]` joins `points[i]` and `points[(i + 1) % 3]`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Triangle {
    pub vertices: [usize; 3],
    pub points: [Vec2; 3],
    pub lines: [usize; 3],
}

impl Triangle {
    pub fn centroid(&self) -> Vec2 {
        let [a, b, c] = self.points;
        (a + b + c) / 3.0
    }

    pub fn area(&self) -> f32 {
        let [a, b, c] = self.points;
        (b - a).perp_dot(c - a).abs() * 0.5
    }

    /// Whether `p` lies inside or on the border of the triangle.
    pub fn contains(&self, p: Vec2) -> bool {
        let [a, b, c] = self.points;
        point_in_triangle(p, a, b, c)
    }
}

fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < -EPS || d2 < -EPS || d3 < -EPS;
    let has_pos = d1 > EPS || d2 > EPS || d3 > EPS;
    !(has_neg && has_pos)
}

// ---------------------------------------------------------------------------
// NavMesh
// ---------------------------------------------------------------------------

/// A triangulated walkable area.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NavMesh {
    vertices: Vec<Vec2>,
    lines: Vec<Line>,
    triangles: Vec<Triangle>,
    /// Triangles bounded by each line, indexed like `lines`.
    line_triangles: Vec<Vec<usize>>,
}

impl NavMesh {
    /// Triangulate the area inside `contour` and outside every hole.
    ///
    /// Holes must lie strictly inside the contour and must not overlap
    /// each other. Vertex order of the inputs does not matter.
    pub fn triangulate(contour: &Polygon, holes: &[Polygon]) -> Result<Self, MeshError> {
        if contour.len() < 3 {
            return Err(MeshError::TooFewVertices(contour.len()));
        }
        let mut vertices: Vec<Vec2> = Vec::new();
        let mut outer = push_oriented(&mut vertices, contour, true);

        let mut hole_rings = Vec::with_capacity(holes.len());
        for (i, hole) in holes.iter().enumerate() {
            if hole.len() < 3 {
                return Err(MeshError::TooFewVertices(hole.len()));
            }
            if !hole.points().iter().all(|&p| contour.contains(p)) {
                return Err(MeshError::HoleOutsideContour(i));
            }
            hole_rings.push(push_oriented(&mut vertices, hole, false));
        }

        // Bridge holes from right to left, so the rightmost vertex of each
        // hole always sees the ring built so far.
        let max_x = |ring: &Vec<usize>| {
            ring.iter()
                .map(|&i| vertices[i].x)
                .fold(f32::NEG_INFINITY, f32::max)
        };
        hole_rings.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));
        for (k, ring) in hole_rings.iter().enumerate() {
            bridge_hole(&vertices, &mut outer, ring, &hole_rings[k + 1..])?;
        }

        let triangles = ear_clip(&vertices, outer)?;
        Self::from_triangles(vertices, &triangles)
    }

    /// Build a mesh from vertex positions and triangles given as vertex
    /// index triples. Triangles are stored counter-clockwise.
    pub fn from_triangles(
        vertices: Vec<Vec2>,
        triangles: &[[usize; 3]],
    ) -> Result<Self, MeshError> {
        let mut mesh = Self {
            vertices,
            ..Self::default()
        };
        let mut line_of_pair: HashMap<(usize, usize), usize> = HashMap::new();

        for (ti, tri) in triangles.iter().enumerate() {
            let mut tri = *tri;
            let mut points = [Vec2::ZERO; 3];
            for (k, &v) in tri.iter().enumerate() {
                points[k] = *mesh
                    .vertices
                    .get(v)
                    .ok_or(MeshError::InvalidVertex { triangle: ti, vertex: v })?;
            }
            if (points[1] - points[0]).perp_dot(points[2] - points[0]) < 0.0 {
                tri.swap(1, 2);
                points.swap(1, 2);
            }

            let mut lines = [0; 3];
            for k in 0..3 {
                let (a, b) = (tri[k], tri[(k + 1) % 3]);
                let key = (a.min(b), a.max(b));
                let li = *line_of_pair.entry(key).or_insert_with(|| {
                    let index = mesh.lines.len();
                    mesh.lines.push(Line {
                        index,
                        vertices: [a, b],
                        p1: points[k],
                        p2: points[(k + 1) % 3],
                    });
                    mesh.line_triangles.push(Vec::with_capacity(2));
                    index
                });
                if mesh.line_triangles[li].len() >= 2 {
                    return Err(MeshError::NonManifoldEdge(key.0, key.1));
                }
                mesh.line_triangles[li].push(ti);
                lines[k] = li;
            }
            mesh.triangles.push(Triangle {
                vertices: tri,
                points,
                lines,
            });
        }

        debug!(
            "navmesh: {} vertices, {} lines, {} triangles",
            mesh.vertices.len(),
            mesh.lines.len(),
            mesh.triangles.len()
        );
        Ok(mesh)
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.vertices
    }

    #[inline]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    #[inline]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    #[inline]
    pub fn line(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    #[inline]
    pub fn triangle(&self, idx: usize) -> Option<&Triangle> {
        self.triangles.get(idx)
    }

    /// Triangles bounded by a line: one for boundary lines, two for
    /// portals, none for an unknown index.
    pub fn triangles_from_line_index(&self, line: usize) -> &[usize] {
        match self.line_triangles.get(line) {
            Some(tris) => tris,
            None => &[],
        }
    }

    /// Whether a line is shared by two triangles.
    #[inline]
    pub fn is_portal(&self, line: usize) -> bool {
        self.triangles_from_line_index(line).len() == 2
    }

    /// First triangle containing `p` (borders included).
    pub fn triangle_from_position(&self, p: Vec2) -> Option<usize> {
        self.triangles.iter().position(|t| t.contains(p))
    }

    /// Total walkable area.
    pub fn area(&self) -> f32 {
        self.triangles.iter().map(Triangle::area).sum()
    }

    /// Uniformly distributed random point on the mesh, or `None` for an
    /// empty mesh.
    pub fn random_point(&self, rng: &mut impl Rng) -> Option<Vec2> {
        let total = self.area();
        if total.is_nan() || total <= 0.0 {
            return None;
        }
        let mut pick = rng.random_range(0.0..total);
        let tri = self
            .triangles
            .iter()
            .find(|t| {
                let area = t.area();
                if pick < area {
                    true
                } else {
                    pick -= area;
                    false
                }
            })
            .or_else(|| self.triangles.last())?;

        let [a, b, c] = tri.points;
        let mut u: f32 = rng.random();
        let mut v: f32 = rng.random();
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        Some(a + (b - a) * u + (c - a) * v)
    }
}

// ---------------------------------------------------------------------------
// Triangulation
// ---------------------------------------------------------------------------

/// Append the polygon's vertices and return their indices, counter-clockwise
/// when `ccw` is set and clockwise otherwise.
fn push_oriented(vertices: &mut Vec<Vec2>, poly: &Polygon, ccw: bool) -> Vec<usize> {
    let base = vertices.len();
    vertices.extend_from_slice(poly.points());
    let mut ring: Vec<usize> = (base..vertices.len()).collect();
    if poly.is_counter_clockwise() != ccw {
        ring.reverse();
    }
    ring
}

/// Splice a clockwise hole ring into the counter-clockwise outer ring
/// through a bridge from the hole's rightmost vertex to the nearest outer
/// vertex it can see. `pending` holds the holes not bridged yet.
fn bridge_hole(
    vertices: &[Vec2],
    outer: &mut Vec<usize>,
    hole: &[usize],
    pending: &[Vec<usize>],
) -> Result<(), MeshError> {
    let Some(hi) = (0..hole.len()).max_by(|&a, &b| vertices[hole[a]].x.total_cmp(&vertices[hole[b]].x))
    else {
        return Err(MeshError::TooFewVertices(0));
    };
    let mi = hole[hi];
    let m = vertices[mi];

    let mut best: Option<(f32, usize)> = None;
    for pos in 0..outer.len() {
        let vi = outer[pos];
        let p = vertices[vi];
        let dist = m.distance_squared(p);
        if dist <= EPS || best.is_some_and(|(d, _)| d <= dist) {
            continue;
        }
        // A vertex repeated by an earlier bridge is only valid from the
        // copy whose corner opens towards `m`.
        if !locally_inside(vertices, outer, pos, m) || !locally_inside(vertices, hole, hi, p) {
            continue;
        }
        let blocked = std::iter::once(&outer[..])
            .chain(std::iter::once(hole))
            .chain(pending.iter().map(Vec::as_slice))
            .any(|ring| ring_blocks(vertices, ring, m, p, [mi, vi]));
        if !blocked {
            best = Some((dist, pos));
        }
    }
    let Some((_, pos)) = best else {
        return Err(MeshError::Degenerate(outer.len()));
    };

    let mut spliced = Vec::with_capacity(outer.len() + hole.len() + 2);
    spliced.extend_from_slice(&outer[..=pos]);
    spliced.extend(hole[hi..].iter().chain(&hole[..hi]).copied());
    spliced.push(mi);
    spliced.push(outer[pos]);
    spliced.extend_from_slice(&outer[pos + 1..]);
    *outer = spliced;
    Ok(())
}

/// Whether the direction from ring position `i` towards `target` points
/// strictly into the region on the left of the ring at that corner.
fn locally_inside(vertices: &[Vec2], ring: &[usize], i: usize, target: Vec2) -> bool {
    let n = ring.len();
    let v = vertices[ring[i]];
    let to_prev = vertices[ring[(i + n - 1) % n]] - v;
    let to_next = vertices[ring[(i + 1) % n]] - v;
    let d = target - v;
    if corner(vertices, ring, i) > 0.0 {
        to_next.perp_dot(d) > EPS && d.perp_dot(to_prev) > EPS
    } else {
        to_prev.perp_dot(d) < -EPS || d.perp_dot(to_next) < -EPS
    }
}

/// Whether segment `a`-`b` touches an edge of `ring` that does not end at
/// one of the `ends` vertices.
fn ring_blocks(vertices: &[Vec2], ring: &[usize], a: Vec2, b: Vec2, ends: [usize; 2]) -> bool {
    let n = ring.len();
    (0..n).any(|k| {
        let (u, w) = (ring[k], ring[(k + 1) % n]);
        !ends.contains(&u) && !ends.contains(&w) && segments_touch(a, b, vertices[u], vertices[w])
    })
}

fn orientation(a: Vec2, b: Vec2, c: Vec2) -> i8 {
    let o = (b - a).perp_dot(c - a);
    if o > EPS {
        1
    } else if o < -EPS {
        -1
    } else {
        0
    }
}

fn within_box(a: Vec2, b: Vec2, p: Vec2) -> bool {
    p.x >= a.x.min(b.x) - EPS
        && p.x <= a.x.max(b.x) + EPS
        && p.y >= a.y.min(b.y) - EPS
        && p.y <= a.y.max(b.y) + EPS
}

/// Closed segment intersection, touching included.
fn segments_touch(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }
    (d1 == 0 && within_box(q1, q2, p1))
        || (d2 == 0 && within_box(q1, q2, p2))
        || (d3 == 0 && within_box(p1, p2, q1))
        || (d4 == 0 && within_box(p1, p2, q2))
}

/// Turn at ring position `i`: positive for a convex corner of a
/// counter-clockwise ring.
fn corner(vertices: &[Vec2], ring: &[usize], i: usize) -> f32 {
    let n = ring.len();
    let a = vertices[ring[(i + n - 1) % n]];
    let b = vertices[ring[i]];
    let c = vertices[ring[(i + 1) % n]];
    (b - a).perp_dot(c - b)
}

fn is_ear(vertices: &[Vec2], ring: &[usize], i: usize) -> bool {
    if corner(vertices, ring, i) <= EPS {
        return false;
    }
    let n = ring.len();
    let (ia, ib, ic) = (ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]);
    let (a, b, c) = (vertices[ia], vertices[ib], vertices[ic]);
    ring.iter()
        .filter(|&&v| v != ia && v != ib && v != ic)
        .all(|&v| !point_in_triangle(vertices[v], a, b, c))
}

/// Ear clipping of a counter-clockwise ring into vertex index triples.
fn ear_clip(vertices: &[Vec2], mut ring: Vec<usize>) -> Result<Vec<[usize; 3]>, MeshError> {
    let mut triangles = Vec::with_capacity(ring.len().saturating_sub(2));
    let mut i = 0;
    let mut misses = 0;
    while ring.len() > 3 {
        let n = ring.len();
        i %= n;
        if is_ear(vertices, &ring, i) {
            triangles.push([ring[(i + n - 1) % n], ring[i], ring[(i + 1) % n]]);
            ring.remove(i);
            misses = 0;
            continue;
        }
        i += 1;
        misses += 1;
        if misses < n {
            continue;
        }
        // No ear left: drop a collinear vertex if there is one.
        match (0..n).find(|&k| corner(vertices, &ring, k).abs() <= EPS) {
            Some(k) => {
                warn!("navmesh: dropping collinear vertex {}", ring[k]);
                ring.remove(k);
                misses = 0;
            }
            None => return Err(MeshError::Degenerate(n)),
        }
    }
    if corner(vertices, &ring, 1) > EPS {
        triangles.push([ring[0], ring[1], ring[2]]);
    } else {
        warn!("navmesh: skipping degenerate final triangle");
    }
    Ok(triangles)
}
