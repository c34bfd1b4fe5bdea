use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::FixedNum;

/// Largest absolute coordinate a graph accepts on any axis.
///
/// Squared distances between two in-range points stay well inside `FixedNum`.
pub const MAX_COORDINATE: i32 = 1_000_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FixedVec3 {
    pub x: FixedNum,
    pub y: FixedNum,
    pub z: FixedNum,
}

impl FixedVec3 {
    pub const ZERO: Self = Self { x: FixedNum::ZERO, y: FixedNum::ZERO, z: FixedNum::ZERO };

    pub fn new(x: FixedNum, y: FixedNum, z: FixedNum) -> Self {
        Self { x, y, z }
    }

    pub fn from_f32(x: f32, y: f32, z: f32) -> Self {
        Self {
            x: FixedNum::from_num(x),
            y: FixedNum::from_num(y),
            z: FixedNum::from_num(z),
        }
    }

    /// `None` for NaN or values `FixedNum` cannot hold.
    pub fn checked_from_f32(x: f32, y: f32, z: f32) -> Option<Self> {
        Some(Self {
            x: FixedNum::checked_from_num(x)?,
            y: FixedNum::checked_from_num(y)?,
            z: FixedNum::checked_from_num(z)?,
        })
    }

    /// Every axis lies within `±MAX_COORDINATE`.
    pub fn is_in_range(self) -> bool {
        let max = FixedNum::from_num(MAX_COORDINATE);
        [self.x, self.y, self.z].iter().all(|v| v.abs() <= max)
    }

    pub fn from_vec3(v: Vec3) -> Self {
        Self::from_f32(v.x, v.y, v.z)
    }

    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.to_num(), self.y.to_num(), self.z.to_num())
    }

    pub fn length(self) -> FixedNum {
        let len_sq = self.length_squared();
        if len_sq == FixedNum::ZERO {
            return FixedNum::ZERO;
        }
        len_sq.sqrt()
    }

    /// Saturates at `FixedNum::MAX` instead of overflowing.
    pub fn length_squared(self) -> FixedNum {
        self.x
            .saturating_mul(self.x)
            .saturating_add(self.y.saturating_mul(self.y))
            .saturating_add(self.z.saturating_mul(self.z))
    }

    /// Straight-line distance; the A* heuristic for waypoint levels.
    pub fn distance(self, other: Self) -> FixedNum {
        (self - other).length()
    }

    /// Arithmetic mean of `points`, or `ZERO` for an empty iterator.
    pub fn centroid<I: IntoIterator<Item = Self>>(points: I) -> Self {
        let mut sum = Self::ZERO;
        let mut count: i64 = 0;
        for p in points {
            sum = sum + p;
            count += 1;
        }
        if count == 0 {
            Self::ZERO
        } else {
            sum / FixedNum::from_num(count)
        }
    }
}

impl std::ops::Add for FixedVec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self { x: self.x + rhs.x, y: self.y + rhs.y, z: self.z + rhs.z }
    }
}

impl std::ops::Sub for FixedVec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self { x: self.x - rhs.x, y: self.y - rhs.y, z: self.z - rhs.z }
    }
}

impl std::ops::Mul<FixedNum> for FixedVec3 {
    type Output = Self;
    fn mul(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x * rhs, y: self.y * rhs, z: self.z * rhs }
    }
}

impl std::ops::Div<FixedNum> for FixedVec3 {
    type Output = Self;
    fn div(self, rhs: FixedNum) -> Self::Output {
        Self { x: self.x / rhs, y: self.y / rhs, z: self.z / rhs }
    }
}

impl std::ops::Neg for FixedVec3 {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self { x: -self.x, y: -self.y, z: -self.z }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_is_symmetric() {
        let a = FixedVec3::from_f32(0.0, 0.0, 0.0);
        let b = FixedVec3::from_f32(3.0, 4.0, 0.0);
        assert_eq!(a.distance(b), FixedNum::from_num(5));
        assert_eq!(b.distance(a), FixedNum::from_num(5));
    }

    #[test]
    fn test_centroid_of_points() {
        let c = FixedVec3::centroid([
            FixedVec3::from_f32(0.0, 0.0, 0.0),
            FixedVec3::from_f32(2.0, 4.0, 6.0),
        ]);
        assert_eq!(c, FixedVec3::from_f32(1.0, 2.0, 3.0));
        assert_eq!(FixedVec3::centroid(std::iter::empty()), FixedVec3::ZERO);
    }

    #[test]
    fn test_far_apart_points_do_not_overflow() {
        let a = FixedVec3::ZERO;
        let b = FixedVec3::from_f32(9.0e6, 9.0e6, 0.0);
        assert_eq!(a.length_squared(), FixedNum::ZERO);
        assert_eq!((b - a).length_squared(), FixedNum::MAX);
        assert!(a.distance(b) > FixedNum::from_num(9.0e6));
    }

    #[test]
    fn test_coordinate_range() {
        let edge = MAX_COORDINATE as f32;
        assert!(FixedVec3::from_f32(edge, -edge, 0.0).is_in_range());
        assert!(!FixedVec3::from_f32(edge + 1.0, 0.0, 0.0).is_in_range());
        assert!(FixedVec3::checked_from_f32(f32::NAN, 0.0, 0.0).is_none());
        assert!(FixedVec3::checked_from_f32(1.0e20, 0.0, 0.0).is_none());
        assert_eq!(FixedVec3::checked_from_f32(1.0, 2.0, 3.0), Some(FixedVec3::from_f32(1.0, 2.0, 3.0)));
    }

    #[test]
    fn test_vec3_round_trip_through_bevy() {
        let v = Vec3::new(1.5, -2.25, 8.0);
        assert_eq!(FixedVec3::from_vec3(v).to_vec3(), v);
    }
}
