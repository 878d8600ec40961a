use serde::{Deserialize, Serialize};

use super::intersect_2d::segment_segment_intersect_2d;
use super::{Point2, Vector2, TOLERANCE};

/// Traversal direction of a closed polygon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

impl Winding {
    /// Classifies a signed area. Zero (degenerate) area counts as counter-clockwise.
    #[must_use]
    pub fn from_signed_area(area: f64) -> Self {
        if area < 0.0 {
            Self::Clockwise
        } else {
            Self::CounterClockwise
        }
    }

    #[must_use]
    pub fn is_clockwise(self) -> bool {
        self == Self::Clockwise
    }

    /// `+1` for clockwise, `-1` for counter-clockwise.
    ///
    /// Scaling the left normal of every edge by this value points it away
    /// from the polygon interior.
    #[must_use]
    pub fn outward_multiplier(self) -> f64 {
        match self {
            Self::Clockwise => 1.0,
            Self::CounterClockwise => -1.0,
        }
    }
}

/// Shoelace area: positive when the ring runs counter-clockwise.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| a.x * b.y - b.x * a.y)
        .sum();
    twice * 0.5
}

/// Unit vector from `a` to `b`, or `None` when the two coincide.
#[must_use]
pub fn segment_direction(a: &Point2, b: &Point2) -> Option<Vector2> {
    let offset = b - a;
    let len = offset.norm();
    (len >= TOLERANCE).then(|| offset / len)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}

/// 2D cross product (z component).
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Finds the first pair of non-adjacent edges of a closed polygon that cross.
///
/// Returns the two edge indices `(i, j)` with `i < j`.
#[must_use]
pub fn find_self_intersection(points: &[Point2]) -> Option<(usize, usize)> {
    let n = points.len();
    if n < 4 {
        return None;
    }
    for i in 0..n {
        let i_next = (i + 1) % n;
        for j in (i + 2)..n {
            // First and last edges share vertex 0.
            if i == 0 && j == n - 1 {
                continue;
            }
            let j_next = (j + 1) % n;
            if segment_segment_intersect_2d(
                &points[i],
                &points[i_next],
                &points[j],
                &points[j_next],
            )
            .is_some()
            {
                return Some((i, j));
            }
        }
    }
    None
}
