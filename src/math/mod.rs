pub mod frame;
pub mod intersect_2d;
pub mod polygon_2d;

pub use frame::LocalFrame;

/// 2D point type in a local metric frame (x east / along-axis, y north / across-axis).
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Meters per degree of latitude used by the equirectangular approximation.
pub const METERS_PER_DEGREE: f64 = 111_111.0;

/// Feet to meters.
pub const FEET_TO_METERS: f64 = 0.3048;

/// Meters to feet.
pub const METERS_TO_FEET: f64 = 3.280_84;

/// Square meters to square feet.
pub const SQ_METERS_TO_SQ_FEET: f64 = 10.7639;

/// Normalizes an angle in degrees to `[0, 360)`.
#[must_use]
pub fn normalize_degrees(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}
