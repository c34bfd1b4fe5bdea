//! Deterministic fixed-point mathematics.
//!
//! Waypoint positions, edge costs and heuristics are all fixed-point so that a
//! graph built from the same input produces the same hierarchy (and the same
//! search results) on every platform. Floating point only appears at the
//! boundary with Bevy (`Vec3`) and in input data.

use fixed::types::I48F16;

pub use vec3::{FixedVec3, MAX_COORDINATE};

mod vec3;

/// Fixed-point number type used for positions, costs and heuristics.
///
/// I48F16: 48 integer bits, 16 fractional bits (precision ~0.000015).
pub type FixedNum = I48F16;
