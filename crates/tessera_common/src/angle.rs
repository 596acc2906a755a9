//! Rotation angles in tenths of a degree.

use crate::geom::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// A rotation angle stored in tenths of a degree, normalized to `[0, 3600)`.
///
/// Positive angles rotate counter-clockwise in board coordinates. Rotation
/// by a multiple of 90° is exact; other angles round to the nearest
/// internal unit.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Angle(i32);

impl Angle {
    /// The zero angle.
    pub const ZERO: Angle = Angle(0);
    /// A quarter turn.
    pub const DEG_90: Angle = Angle(900);
    /// A half turn.
    pub const DEG_180: Angle = Angle(1800);
    /// Three quarter turns.
    pub const DEG_270: Angle = Angle(2700);

    /// Creates an angle from tenths of a degree, normalizing into `[0, 3600)`.
    pub fn from_decidegrees(tenths: i32) -> Self {
        Self(tenths.rem_euclid(3600))
    }

    /// Creates an angle from degrees, rounding to the nearest tenth.
    pub fn from_degrees(degrees: f64) -> Self {
        Self::from_decidegrees((degrees * 10.0).round() as i32)
    }

    /// Returns the angle in tenths of a degree.
    pub fn decidegrees(self) -> i32 {
        self.0
    }

    /// Returns the angle in degrees.
    pub fn degrees(self) -> f64 {
        self.0 as f64 / 10.0
    }

    /// Returns whether the angle is a multiple of 90°.
    pub fn is_cardinal(self) -> bool {
        self.0 % 900 == 0
    }

    /// Rotates `p` about the origin by this angle.
    pub fn rotate(self, p: Point) -> Point {
        match self.0 {
            0 => p,
            900 => Point::new(-p.y, p.x),
            1800 => Point::new(-p.x, -p.y),
            2700 => Point::new(p.y, -p.x),
            _ => {
                let (sin, cos) = (self.degrees().to_radians()).sin_cos();
                let x = p.x as f64 * cos - p.y as f64 * sin;
                let y = p.x as f64 * sin + p.y as f64 * cos;
                Point::new(x.round() as i64, y.round() as i64)
            }
        }
    }
}

impl From<i32> for Angle {
    fn from(tenths: i32) -> Self {
        Angle::from_decidegrees(tenths)
    }
}

impl From<Angle> for i32 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl Add for Angle {
    type Output = Angle;

    fn add(self, rhs: Angle) -> Angle {
        Angle::from_decidegrees(self.0 + rhs.0)
    }
}

impl Sub for Angle {
    type Output = Angle;

    fn sub(self, rhs: Angle) -> Angle {
        Angle::from_decidegrees(self.0 - rhs.0)
    }
}

impl fmt::Debug for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Angle({self})")
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}
