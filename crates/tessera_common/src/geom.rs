//! Integer board geometry: points and axis-aligned rectangles.
//!
//! All coordinates are internal units (see [`crate::length`]). The y axis
//! grows downward, matching board files, but nothing here depends on it.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Neg, Sub};

/// A point (or displacement) on the board.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: i64,
    /// Vertical coordinate.
    pub y: i64,
}

impl Point {
    /// The origin.
    pub const ZERO: Point = Point { x: 0, y: 0 };

    /// Creates a new point.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f64 {
        let dx = (other.x - self.x) as f64;
        let dy = (other.y - self.y) as f64;
        dx.hypot(dy)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// An axis-aligned rectangle.
///
/// `min` is always closest to negative infinity on both axes and `max`
/// closest to positive infinity. Both edges are part of the rectangle.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Rect {
    /// Lower corner.
    pub min: Point,
    /// Upper corner.
    pub max: Point,
}

impl Rect {
    /// Creates a rectangle from two opposite corners in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Creates a rectangle from its lower corner and size.
    pub fn from_origin_size(origin: Point, width: i64, height: i64) -> Self {
        Self::from_corners(origin, Point::new(origin.x + width, origin.y + height))
    }

    /// Creates a rectangle of the given size centred on `center`.
    pub fn centered(center: Point, width: i64, height: i64) -> Self {
        let min = Point::new(center.x - width / 2, center.y - height / 2);
        Self::from_origin_size(min, width, height)
    }

    /// Returns the bounding box of a set of points, or `None` if empty.
    pub fn bounding(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut rect = Rect::from_corners(first, first);
        for p in iter {
            rect = rect.union_point(p);
        }
        Some(rect)
    }

    /// Width of the rectangle.
    pub fn width(&self) -> i64 {
        self.max.x - self.min.x
    }

    /// Height of the rectangle.
    pub fn height(&self) -> i64 {
        self.max.y - self.min.y
    }

    /// Area in square internal units, as a float.
    pub fn area(&self) -> f64 {
        self.width() as f64 * self.height() as f64
    }

    /// Returns whether the rectangle has zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Center point, rounded toward `min`.
    pub fn center(&self) -> Point {
        Point::new(
            self.min.x + self.width() / 2,
            self.min.y + self.height() / 2,
        )
    }

    /// Returns a copy grown by `delta` on every side (shrunk if negative).
    pub fn inflate(&self, delta: i64) -> Rect {
        Rect::from_corners(
            Point::new(self.min.x - delta, self.min.y - delta),
            Point::new(self.max.x + delta, self.max.y + delta),
        )
    }

    /// Returns a copy moved by `offset`.
    pub fn translate(&self, offset: Point) -> Rect {
        Rect {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Smallest rectangle containing both `self` and `p`.
    pub fn union_point(&self, p: Point) -> Rect {
        Rect {
            min: Point::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            max: Point::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        }
    }

    /// Returns a copy with every coordinate clamped into `bounds`.
    pub fn clamp_to(&self, bounds: &Rect) -> Rect {
        let clamp = |p: Point| {
            Point::new(
                p.x.clamp(bounds.min.x, bounds.max.x),
                p.y.clamp(bounds.min.y, bounds.max.y),
            )
        };
        Rect {
            min: clamp(self.min),
            max: clamp(self.max),
        }
    }

    /// Returns whether `p` lies inside or on the edge of the rectangle.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns whether `other` lies entirely inside the rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.contains(other.min) && self.contains(other.max)
    }

    /// Returns whether the interiors of the two rectangles overlap.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }

    /// The four corners, counter-clockwise from `min`.
    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}
