//! Geometric helpers for floor-plan placement.
//!
//! The planner works on the vehicle floor in two dimensions: stacks claim
//! axis-aligned rectangles (x along the vehicle length, y along the vehicle
//! width) and must never overlap. Heights are handled per stack and need no
//! geometry beyond a running sum.

use crate::model::Stack;

/// Computes the overlap of two intervals in one dimension.
///
/// # Parameters
/// * `a1` - Start of the first interval
/// * `a2` - End of the first interval
/// * `b1` - Start of the second interval
/// * `b2` - End of the second interval
///
/// # Returns
/// Length of the overlap, at least 0.0
#[allow(dead_code)]
pub fn overlap_1d(a1: f64, a2: f64, b1: f64, b2: f64) -> f64 {
    (a2.min(b2) - a1.max(b1)).max(0.0)
}

/// Checks whether the floor rectangles of two stacks intersect.
///
/// Uses axis-aligned rectangle separation: two footprints do NOT overlap
/// if they are fully separated along either floor axis. Touching edges do
/// not count as an overlap.
pub fn footprints_intersect(a: &Stack, b: &Stack) -> bool {
    !(a.x + a.width <= b.x
        || b.x + b.width <= a.x
        || a.y + a.length <= b.y
        || b.y + b.length <= a.y)
}

/// Computes the overlapping floor area of two stacks.
#[allow(dead_code)]
pub fn overlap_area(a: &Stack, b: &Stack) -> f64 {
    let overlap_x = overlap_1d(a.x, a.x + a.width, b.x, b.x + b.width);
    let overlap_y = overlap_1d(a.y, a.y + a.length, b.y, b.y + b.length);
    overlap_x * overlap_y
}
