use waypoint_core::Vec2;

/// Distance estimators for heuristic searches, evaluated on the absolute
/// axis offsets `(dx, dy)` between two positions.
///
/// [`Manhattan`](Heuristic::Manhattan) overestimates diagonal moves and is
/// only admissible on graphs without diagonal shortcuts.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Heuristic {
    /// L1 distance.
    Manhattan,
    /// Straight-line (L2) distance.
    Euclidean,
    /// Straight moves cost 1, diagonal moves √2.
    Octile,
    /// L∞ distance.
    #[default]
    Chebyshev,
}

impl Heuristic {
    /// Estimate from absolute axis offsets.
    #[inline]
    pub fn estimate(self, dx: f32, dy: f32) -> f32 {
        match self {
            Self::Manhattan => dx + dy,
            Self::Euclidean => (dx * dx + dy * dy).sqrt(),
            Self::Octile => {
                let f = std::f32::consts::SQRT_2 - 1.0;
                if dx < dy { f * dx + dy } else { f * dy + dx }
            }
            Self::Chebyshev => dx.max(dy),
        }
    }

    /// Estimate between two positions.
    #[inline]
    pub fn between(self, from: Vec2, to: Vec2) -> f32 {
        let d = (to - from).abs();
        self.estimate(d.x, d.y)
    }
}
