use nalgebra as na;

pub type Point2 = na::Point2<f64>;
pub type Vector2 = na::Vector2<f64>;

/// Guard used everywhere a length, radius or distance is about to become a divisor.
/// Corrections that would divide by something smaller than this are skipped.
pub const EPSILON: f64 = 1e-9;

pub mod utils_2d;
pub use utils_2d::*;
