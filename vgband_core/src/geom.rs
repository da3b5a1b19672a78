use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Mul, Sub};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Default, Pod, Zeroable)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self { Self { x, y } }

    pub fn zero() -> Self { Self { x: 0.0, y: 0.0 } }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self { x: self.x + (other.x - self.x) * t, y: self.y + (other.y - self.y) * t }
    }

    pub fn length_squared(self) -> f32 { self.x * self.x + self.y * self.y }

    pub fn length(self) -> f32 { self.length_squared().sqrt() }

    pub fn distance_squared(self, other: Self) -> f32 { (other - self).length_squared() }

    pub fn angle(self) -> f32 { self.y.atan2(self.x) }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Self) -> Self::Output { Vec2 { x: self.x + rhs.x, y: self.y + rhs.y } }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Self) -> Self::Output { Vec2 { x: self.x - rhs.x, y: self.y - rhs.y } }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Self::Output { Vec2 { x: self.x * rhs, y: self.y * rhs } }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self { Vec2 { x, y } }
}

impl From<lyon::math::Point> for Vec2 {
    fn from(p: lyon::math::Point) -> Self { Vec2 { x: p.x, y: p.y } }
}

impl From<Vec2> for lyon::math::Point {
    fn from(p: Vec2) -> Self { lyon::math::point(p.x, p.y) }
}

/// Axis aligned box given by its minimum and maximum corner.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Bounds {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Bounds {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self { Self { x0, y0, x1, y1 } }

    pub fn zero() -> Self { Self::new(0.0, 0.0, 0.0, 0.0) }

    pub fn from_point(p: Vec2) -> Self { Self::new(p.x, p.y, p.x, p.y) }

    pub fn from_points(points: &[Vec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        Some(rest.iter().fold(Self::from_point(*first), |bounds, &p| bounds.including(p)))
    }

    pub fn including(self, p: Vec2) -> Self {
        Self::new(self.x0.min(p.x), self.y0.min(p.y), self.x1.max(p.x), self.y1.max(p.y))
    }

    pub fn union(self, other: Self) -> Self {
        Self::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    pub fn inflate(self, by: f32) -> Self {
        Self::new(self.x0 - by, self.y0 - by, self.x1 + by, self.y1 + by)
    }

    pub fn contains(self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    pub fn width(self) -> f32 { self.x1 - self.x0 }

    pub fn height(self) -> f32 { self.y1 - self.y0 }

    /// Maps both corners and normalizes the result, so mirroring keeps
    /// `x0 <= x1` and `y0 <= y1`.
    pub fn map(self, f: impl Fn(Vec2) -> Vec2) -> Self {
        Self::from_point(f(Vec2::new(self.x0, self.y0))).including(f(Vec2::new(self.x1, self.y1)))
    }

    pub fn to_array(self) -> [f32; 4] { [self.x0, self.y0, self.x1, self.y1] }
}
