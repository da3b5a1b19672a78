use crate::geom::{Bounds, Vec2};
use band_lookup::{Axis, CurveSpan, IgnoreMask};
use smallvec::SmallVec;

/// Curves whose t dependent y coefficients are all below this never cross a
/// horizontal scanline and are left out of every band list.
pub const DEGENERATE_EPSILON: f32 = 1e-2;

/// Values per curve texture row: 8 coefficients, 4 bounds, 4 aux values.
pub const TEXEL_ROW_LEN: usize = 16;

/// Power basis of one coordinate, highest degree first:
/// `c[0] t³ + c[1] t² + c[2] t + c[3]`.
pub fn power_basis(p0: f32, p1: f32, p2: f32, p3: f32) -> [f32; 4] {
    [-p0 + 3.0 * p1 - 3.0 * p2 + p3, 3.0 * p0 - 6.0 * p1 + 3.0 * p2, 3.0 * (p1 - p0), p0]
}

pub fn eval_basis(c: &[f32; 4], t: f32) -> f32 { ((c[0] * t + c[1]) * t + c[2]) * t + c[3] }

fn eval_derivative(c: &[f32; 4], t: f32) -> f32 { (3.0 * c[0] * t + 2.0 * c[1]) * t + c[2] }

fn eval_second_derivative(c: &[f32; 4], t: f32) -> f32 { 6.0 * c[0] * t + 2.0 * c[1] }

/// Parameters in the open unit interval where the derivative vanishes.
pub fn derivative_roots(c: &[f32; 4]) -> SmallVec<[f32; 2]> {
    let (a, b, k) = (3.0 * c[0], 2.0 * c[1], c[2]);
    let mut roots = SmallVec::new();

    if a.abs() < 1e-9 {
        if b.abs() > 1e-9 {
            roots.push(-k / b);
        }
    } else {
        let discriminant = b * b - 4.0 * a * k;
        if discriminant >= 0.0 {
            let sqrt = discriminant.sqrt();
            roots.push((-b - sqrt) / (2.0 * a));
            if sqrt > 0.0 {
                roots.push((-b + sqrt) / (2.0 * a));
            }
        }
    }

    roots.retain(|t: &mut f32| *t > 0.0 && *t < 1.0);
    roots.sort_by(|a: &f32, b: &f32| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    roots
}

pub fn cubic_point(p: &[Vec2; 4], t: f32) -> Vec2 {
    let s = 1.0 - t;
    p[0] * (s * s * s) + p[1] * (3.0 * s * s * t) + p[2] * (3.0 * s * t * t) + p[3] * (t * t * t)
}

/// Tight bounds of one cubic, from its endpoints and interior extrema.
pub fn cubic_bounds(p: &[Vec2; 4]) -> Bounds {
    let bx = power_basis(p[0].x, p[1].x, p[2].x, p[3].x);
    let by = power_basis(p[0].y, p[1].y, p[2].y, p[3].y);
    bounds_from_basis(&bx, &by, p[0], p[3])
}

fn bounds_from_basis(bx: &[f32; 4], by: &[f32; 4], start: Vec2, end: Vec2) -> Bounds {
    let mut bounds = Bounds::from_point(start).including(end);
    for t in derivative_roots(bx) {
        let x = eval_basis(bx, t);
        bounds.x0 = bounds.x0.min(x);
        bounds.x1 = bounds.x1.max(x);
    }
    for t in derivative_roots(by) {
        let y = eval_basis(by, t);
        bounds.y0 = bounds.y0.min(y);
        bounds.y1 = bounds.y1.max(y);
    }
    bounds
}

pub(crate) fn straight_controls(from: Vec2, to: Vec2) -> [Vec2; 4] {
    let third = (to - from) * (1.0 / 3.0);
    [from, from + third, to - third, to]
}

/// Everything the fragment shader needs to know about one cubic.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveRecord {
    pub bx: [f32; 4],
    pub by: [f32; 4],
    pub bounds: Bounds,
    pub ignore: IgnoreMask,
    /// Coordinates of the interior extrema, x first.
    pub extrema: [SmallVec<[f32; 2]>; 2],
    /// Maximum curvature, start tangent angle, end tangent angle and the
    /// arc length offset of the curve start along its contour.
    pub aux: [f32; 4],
    pub length: f32,
}

impl CurveRecord {
    pub fn from_points(p: &[Vec2; 4], offset: f32) -> Self {
        let bx = power_basis(p[0].x, p[1].x, p[2].x, p[3].x);
        let by = power_basis(p[0].y, p[1].y, p[2].y, p[3].y);
        let length = ((p[3] - p[0]).length()
            + (p[1] - p[0]).length()
            + (p[2] - p[1]).length()
            + (p[3] - p[2]).length())
            / 2.0;

        if by[..3].iter().all(|c| c.abs() < DEGENERATE_EPSILON) {
            return Self {
                bx,
                by,
                bounds: Bounds::from_point(p[0]).including(p[3]),
                ignore: IgnoreMask::ALL,
                extrema: Default::default(),
                aux: [0.0; 4],
                length,
            };
        }

        let bounds = bounds_from_basis(&bx, &by, p[0], p[3]);
        let extrema = [
            derivative_roots(&bx).into_iter().map(|t| eval_basis(&bx, t)).collect(),
            derivative_roots(&by).into_iter().map(|t| eval_basis(&by, t)).collect(),
        ];
        let aux = [max_curvature(&bx, &by), start_tangent(p).angle(), end_tangent(p).angle(), offset];

        Self { bx, by, bounds, ignore: IgnoreMask::NONE, extrema, aux, length }
    }

    /// The straight curve from the last point of a contour back to its first.
    /// It only takes part in strokes if the contour is closed.
    pub fn closing(from: Vec2, to: Vec2, closed: bool, offset: f32) -> Self {
        let mut record = Self::from_points(&straight_controls(from, to), offset);
        if !closed {
            record.ignore |= IgnoreMask::LINE;
        }
        record
    }

    pub fn is_degenerate(&self) -> bool { self.ignore.contains(IgnoreMask::ALL) }

    pub fn span(&self, curve: u8, axis: Axis) -> CurveSpan {
        let (min, max) = match axis {
            Axis::X => (self.bounds.x0, self.bounds.x1),
            Axis::Y => (self.bounds.y0, self.bounds.y1),
        };
        CurveSpan::new(curve, min, max).with_marks(&self.extrema[axis.index()]).with_ignore(self.ignore)
    }

    /// The curve texture row. Degenerate curves leave their row zeroed.
    pub fn texel_row(&self) -> [f32; TEXEL_ROW_LEN] {
        let mut row = [0.0; TEXEL_ROW_LEN];
        if !self.is_degenerate() {
            row[0..4].copy_from_slice(&self.bx);
            row[4..8].copy_from_slice(&self.by);
            row[8..12].copy_from_slice(&self.bounds.to_array());
            row[12..16].copy_from_slice(&self.aux);
        }
        row
    }
}

fn first_non_zero(candidates: &[Vec2]) -> Vec2 {
    candidates.iter().cloned().find(|v| v.length_squared() > 1e-12).unwrap_or_else(Vec2::zero)
}

fn start_tangent(p: &[Vec2; 4]) -> Vec2 { first_non_zero(&[p[1] - p[0], p[2] - p[0], p[3] - p[0]]) }

fn end_tangent(p: &[Vec2; 4]) -> Vec2 { first_non_zero(&[p[3] - p[2], p[3] - p[1], p[3] - p[0]]) }

fn max_curvature(bx: &[f32; 4], by: &[f32; 4]) -> f32 {
    [0.0, 0.25, 0.5, 0.75, 1.0]
        .iter()
        .filter_map(|&t| {
            let (dx, dy) = (eval_derivative(bx, t), eval_derivative(by, t));
            let (ddx, ddy) = (eval_second_derivative(bx, t), eval_second_derivative(by, t));
            let speed_squared = dx * dx + dy * dy;
            if speed_squared <= 1e-12 {
                return None;
            }
            let cross = (dx * ddy - dy * ddx).abs();
            // Rounding noise of straight segments.
            if cross <= 1e-6 * speed_squared {
                return Some(0.0);
            }
            Some(cross / speed_squared.powf(1.5))
        })
        .fold(0.0, f32::max)
}
