use crate::model::{EvenOddTest, InsideTest, NonZeroTest};
use derivative::Derivative;
use smallvec::SmallVec;

pub const MAX_DASHES: usize = 8;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Derivative)]
#[derivative(Default)]
pub enum FillRule {
    #[derivative(Default)]
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn inside_test(self) -> Box<dyn InsideTest> {
        match self {
            FillRule::NonZero => Box::new(NonZeroTest::default()),
            FillRule::EvenOdd => Box::new(EvenOddTest::default()),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Derivative)]
#[derivative(Default)]
pub enum LineJoin {
    #[derivative(Default)]
    Miter,
    Round,
    Bevel,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Derivative)]
#[derivative(Default)]
pub enum LineCap {
    #[derivative(Default)]
    Butt,
    Round,
    Square,
}

#[derive(Clone, PartialEq, Debug, Derivative)]
#[derivative(Default(new = "true"))]
pub struct StrokeStyle {
    #[derivative(Default(value = "1.0"))]
    pub width: f32,
    pub dashes: SmallVec<[f32; MAX_DASHES]>,
    pub dash_offset: f32,
    pub join: LineJoin,
    pub cap: LineCap,
    #[derivative(Default(value = "4.0"))]
    pub miter_limit: f32,
}

impl StrokeStyle {
    /// Keeps at most [`MAX_DASHES`] entries; a pattern summing to nothing
    /// means a solid line.
    pub(crate) fn normalized_dashes(dashes: &[f32]) -> SmallVec<[f32; MAX_DASHES]> {
        let dashes: SmallVec<[f32; MAX_DASHES]> = dashes.iter().take(MAX_DASHES).map(|d| d.abs()).collect();
        if dashes.iter().sum::<f32>() <= 1e-6 {
            SmallVec::new()
        } else {
            dashes
        }
    }

    /// How far the stroke may reach beyond the outline.
    pub fn reach(&self) -> f32 {
        let half = self.width / 2.0;
        if self.join == LineJoin::Miter {
            half * self.miter_limit.max(1.0)
        } else {
            half
        }
    }

    pub(crate) fn lerp(&self, other: &Self, t: f32) -> Self {
        let lerp = |a: f32, b: f32| a + (b - a) * t;
        let pick = if t < 0.5 { self } else { other };
        Self {
            width: lerp(self.width, other.width),
            dashes: if self.dashes.len() == other.dashes.len() {
                self.dashes.iter().zip(other.dashes.iter()).map(|(&a, &b)| lerp(a, b)).collect()
            } else {
                pick.dashes.clone()
            },
            dash_offset: lerp(self.dash_offset, other.dash_offset),
            join: pick.join,
            cap: pick.cap,
            miter_limit: lerp(self.miter_limit, other.miter_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let style = StrokeStyle::new();
        assert_eq!((style.width, style.miter_limit), (1.0, 4.0));
        assert_eq!((style.join, style.cap), (LineJoin::Miter, LineCap::Butt));
        assert_eq!(FillRule::default(), FillRule::NonZero);
    }

    #[test]
    fn empty_dash_patterns_clear() {
        assert!(StrokeStyle::normalized_dashes(&[0.0, 0.0]).is_empty());
        assert_eq!(StrokeStyle::normalized_dashes(&[1.0; 12]).len(), MAX_DASHES);
        assert_eq!(&StrokeStyle::normalized_dashes(&[-2.0, 1.0])[..], &[2.0, 1.0]);
    }
}
