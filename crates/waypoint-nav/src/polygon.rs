//! Simple polygons: navigable contours and obstacle shapes.

use waypoint_core::Vec2;

/// Minimum `cos` of the half angle used when mitring corners in
/// [`Polygon::expand`]. Sharper corners are clamped.
const MIN_MITRE_COS: f32 = 0.25;

/// A simple polygon given by its vertices in order. The closing edge from
/// the last vertex back to the first is implicit.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polygon {
    points: Vec<Vec2>,
}

impl Polygon {
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Axis-aligned rectangle with corners `min` and `max`, counter-clockwise.
    pub fn rect(min: Vec2, max: Vec2) -> Self {
        Self::new(vec![
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
        ])
    }

    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Edges as `(start, end)` pairs, closing edge included.
    pub fn edges(&self) -> impl Iterator<Item = (Vec2, Vec2)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Shoelace area: positive for counter-clockwise vertex order.
    pub fn signed_area(&self) -> f32 {
        self.edges().map(|(a, b)| a.perp_dot(b)).sum::<f32>() * 0.5
    }

    #[inline]
    pub fn is_counter_clockwise(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// The same polygon with the vertex order reversed.
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        points.reverse();
        Self { points }
    }

    /// Even-odd point containment. Points exactly on an edge may go either
    /// way.
    pub fn contains(&self, p: Vec2) -> bool {
        let mut inside = false;
        for (a, b) in self.edges() {
            if (a.y > p.y) != (b.y > p.y) {
                let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
                if p.x < x {
                    inside = !inside;
                }
            }
        }
        inside
    }

    /// Offset every edge outwards by `radius`, moving each vertex along
    /// its corner bisector (mitre join). Intended for convex obstacle
    /// shapes; very sharp corners are clamped.
    pub fn expand(&self, radius: f32) -> Self {
        let n = self.points.len();
        if n < 3 || radius == 0.0 {
            return self.clone();
        }
        // Outward normal of an edge is its right side for CCW polygons.
        let sign = if self.is_counter_clockwise() { 1.0 } else { -1.0 };
        let normal = |a: Vec2, b: Vec2| {
            let e = (b - a).normalize_or_zero();
            Vec2::new(e.y, -e.x) * sign
        };

        let points = (0..n)
            .map(|i| {
                let prev = self.points[(i + n - 1) % n];
                let cur = self.points[i];
                let next = self.points[(i + 1) % n];
                let n1 = normal(prev, cur);
                let n2 = normal(cur, next);
                let bisector = (n1 + n2).normalize_or_zero();
                if bisector == Vec2::ZERO {
                    return cur + n1 * radius;
                }
                let cos = bisector.dot(n1).max(MIN_MITRE_COS);
                cur + bisector * (radius / cos)
            })
            .collect();
        Self { points }
    }
}

impl From<Vec<Vec2>> for Polygon {
    fn from(points: Vec<Vec2>) -> Self {
        Self::new(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::rect(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0))
    }

    #[test]
    fn area_and_orientation() {
        let sq = unit_square();
        assert_eq!(sq.signed_area(), 1.0);
        assert!(sq.is_counter_clockwise());
        let rev = sq.reversed();
        assert_eq!(rev.signed_area(), -1.0);
        assert!(!rev.is_counter_clockwise());
    }

    #[test]
    fn containment() {
        let l_shape = Polygon::new(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(10.0, 5.0),
            Vec2::new(5.0, 5.0),
            Vec2::new(5.0, 10.0),
            Vec2::new(0.0, 10.0),
        ]);
        assert!(l_shape.contains(Vec2::new(1.0, 1.0)));
        assert!(l_shape.contains(Vec2::new(2.0, 9.0)));
        assert!(l_shape.contains(Vec2::new(9.0, 2.0)));
        assert!(!l_shape.contains(Vec2::new(7.0, 7.0)));
        assert!(!l_shape.contains(Vec2::new(-1.0, 1.0)));
    }

    #[test]
    fn expand_square_moves_corners_diagonally() {
        for sq in [unit_square(), unit_square().reversed()] {
            let grown = sq.expand(0.5);
            assert_eq!(grown.len(), 4);
            assert!((grown.signed_area().abs() - 4.0).abs() < 1e-4);
            assert!(grown.points().iter().any(|p| p.abs_diff_eq(Vec2::new(-0.5, -0.5), 1e-5)));
            assert!(grown.points().iter().any(|p| p.abs_diff_eq(Vec2::new(1.5, 1.5), 1e-5)));
        }
    }

    #[test]
    fn expand_by_zero_is_identity() {
        let sq = unit_square();
        assert_eq!(sq.expand(0.0), sq);
    }
}
