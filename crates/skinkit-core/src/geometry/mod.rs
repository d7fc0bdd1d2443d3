//! 2D toolpath geometry primitives.
//!
//! The craft stage depends only on the contracts of this module: degenerate
//! input (empty loops, collapsed insets) yields empty output instead of
//! panicking.

mod clip;
mod inset;
mod scanline;

pub use clip::clipped_simplified_loop_path;
pub use inset::largest_inset_loop;
pub use scanline::{join_segments_into_paths, scanline_intersections, segments_from_intersections};

use std::ops::{Add, Mul, Sub};

/// A 2D point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    /// Create a new point.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to another point.
    pub fn distance_to(&self, other: Point2) -> f64 {
        (*self - other).length()
    }

    /// Distance from the origin.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Dot product.
    pub fn dot(&self, other: Point2) -> f64 {
        self.x * other.x + self.y * other.y
    }
}

impl Add for Point2 {
    type Output = Point2;
    fn add(self, other: Point2) -> Point2 {
        Point2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2 {
    type Output = Point2;
    fn sub(self, other: Point2) -> Point2 {
        Point2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point2 {
    type Output = Point2;
    fn mul(self, scale: f64) -> Point2 {
        Point2::new(self.x * scale, self.y * scale)
    }
}

/// A rotation on the complex plane, stored as a unit complex number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation2 {
    pub x: f64,
    pub y: f64,
}

impl Rotation2 {
    /// Create a rotation from its real and imaginary parts.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The identity rotation.
    pub fn identity() -> Self {
        Self { x: 1.0, y: 0.0 }
    }

    /// The inverse rotation.
    pub fn conjugate(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
        }
    }

    /// Rotate a point (complex multiplication).
    pub fn rotate(&self, point: Point2) -> Point2 {
        Point2::new(
            self.x * point.x - self.y * point.y,
            self.x * point.y + self.y * point.x,
        )
    }

    /// Rotate every point of a path.
    pub fn rotate_path(&self, path: &[Point2]) -> Vec<Point2> {
        path.iter().map(|point| self.rotate(*point)).collect()
    }
}

impl Default for Rotation2 {
    fn default() -> Self {
        Self::identity()
    }
}

/// Total length of an open path.
pub fn path_length(path: &[Point2]) -> f64 {
    path.windows(2)
        .map(|pair| pair[0].distance_to(pair[1]))
        .sum()
}

/// Signed shoelace area of a closed loop; positive for counterclockwise
/// winding.
pub fn polygon_area(polygon: &[Point2]) -> f64 {
    if polygon.len() < 3 {
        return 0.0;
    }
    let mut doubled = 0.0;
    for index in 0..polygon.len() {
        let a = polygon[index];
        let b = polygon[(index + 1) % polygon.len()];
        doubled += a.x * b.y - b.x * a.y;
    }
    0.5 * doubled
}
