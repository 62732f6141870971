use std::fmt;
use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};
use thiserror::Error;

const NORMALIZE_EPSILON_SQ: f32 = 1.0e-12;

/// Ground-plane vector. `x` maps to world x and `y` to world z.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn is_zero(self) -> bool {
        self.length_sq() <= NORMALIZE_EPSILON_SQ
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Returns `None` for the zero vector and for non-finite input.
    pub fn normalized(self) -> Option<Self> {
        if !self.is_finite() || self.is_zero() {
            return None;
        }
        let inv_len = self.length().recip();
        Some(Self {
            x: self.x * inv_len,
            y: self.y * inv_len,
        })
    }

    /// Quarter turn counter-clockwise.
    pub fn perpendicular(self) -> Self {
        Self {
            x: -self.y,
            y: self.x,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Lifts a ground-plane vector into world space with `y = 0`.
    pub fn from_ground(ground: Vec2) -> Self {
        Self {
            x: ground.x,
            y: 0.0,
            z: ground.y,
        }
    }

    pub fn ground(self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.z,
        }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn normalized(self) -> Option<Self> {
        if !self.is_finite() || self.length_sq() <= NORMALIZE_EPSILON_SQ {
            return None;
        }
        Some(self * self.length_sq().sqrt().recip())
    }

    pub fn ground_distance_sq(self, other: Self) -> f32 {
        let dx = other.x - self.x;
        let dz = other.z - self.z;
        dx * dx + dz * dz
    }

    pub fn axis(self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut f32 {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
            Axis::Z => &mut self.z,
        }
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self {
            x: self.x * rhs,
            y: self.y * rhs,
            z: self.z * rhs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn as_token(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Axis-aligned bounding box. Construct through [`Aabb::new`] or
/// [`Aabb::from_center_half_extents`]; both keep `min <= max` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    min: Vec3,
    max: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum AabbError {
    #[error("bounds must be finite numbers")]
    NonFinite,
    #[error("min.{axis} ({min}) is greater than max.{axis} ({max})")]
    Inverted { axis: Axis, min: f32, max: f32 },
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Result<Self, AabbError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(AabbError::NonFinite);
        }
        for axis in Axis::ALL {
            let (lo, hi) = (min.axis(axis), max.axis(axis));
            if lo > hi {
                return Err(AabbError::Inverted {
                    axis,
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(Self { min, max })
    }

    /// Negative half extents are folded to their magnitude.
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        let half = Vec3 {
            x: half_extents.x.abs(),
            y: half_extents.y.abs(),
            z: half_extents.z.abs(),
        };
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Strict interior overlap; boxes that only share a face do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}
