use std::{
    fmt,
    ops::{Add, Div, Mul, Neg, Sub},
};

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Image plane coordinates `[px]`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D {
    pub u: f64,
    pub v: f64,
}

impl Point2D {
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.u.hypot(self.v)
    }
    pub fn dot(&self, other: &Self) -> f64 {
        self.u * other.u + self.v * other.v
    }
    /// Rotates the vector by +90°: `(u,v) -> (-v,u)`
    pub fn perpendicular(&self) -> Self {
        Self::new(-self.v, self.u)
    }
    /// Unit vector, `None` if the vector has no length
    pub fn unit(&self) -> Option<Self> {
        let norm = self.norm();
        (norm > 0f64 && norm.is_finite()).then(|| *self / norm)
    }
    /// Euclidean distance to `other`
    pub fn distance(&self, other: &Self) -> f64 {
        (*self - *other).norm()
    }
    /// Checks if both axis errors to `other` are strictly less than `tolerance`
    pub fn within(&self, other: &Self, tolerance: f64) -> bool {
        (self.u - other.u).abs() < tolerance && (self.v - other.v).abs() < tolerance
    }
    pub fn is_finite(&self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }
}

impl fmt::Display for Point2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2},{:.2})", self.u, self.v)
    }
}

impl Add for Point2D {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.u + rhs.u, self.v + rhs.v)
    }
}
impl Sub for Point2D {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.u - rhs.u, self.v - rhs.v)
    }
}
impl Neg for Point2D {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.u, -self.v)
    }
}
impl Mul<f64> for Point2D {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(self.u * rhs, self.v * rhs)
    }
}
impl Div<f64> for Point2D {
    type Output = Self;
    fn div(self, rhs: f64) -> Self::Output {
        Self::new(self.u / rhs, self.v / rhs)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((u, v): (f64, f64)) -> Self {
        Self::new(u, v)
    }
}
impl From<na::Vector2<f64>> for Point2D {
    fn from(value: na::Vector2<f64>) -> Self {
        Self::new(value.x, value.y)
    }
}
impl From<Point2D> for na::Vector2<f64> {
    fn from(value: Point2D) -> Self {
        na::Vector2::new(value.u, value.v)
    }
}

/// Returns `n` evenly spaced numbers over `[start,end]`
///
/// The last value is exactly `end`; `n=1` returns `[start]` and `n=0` an empty vector.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let delta = (end - start) / (n - 1) as f64;
            (0..n - 1)
                .map(|i| start + delta * i as f64)
                .chain(Some(end))
                .collect()
        }
    }
}

/// Returns `n` evenly spaced points along the segment `[start,end]`
pub fn linspace_points(start: Point2D, end: Point2D, n: usize) -> Vec<Point2D> {
    linspace(start.u, end.u, n)
        .into_iter()
        .zip(linspace(start.v, end.v, n))
        .map(Point2D::from)
        .collect()
}
