use crate::{error::Result, geom::Vec2, VgError};
use palette::{Mix, Pixel};
use smallvec::SmallVec;

pub use palette::LinSrgba as Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub stops: SmallVec<[ColorStop; 4]>,
    /// Row major 2x3 matrix from paint space into shape space.
    pub transform: [f32; 6],
    /// Focal point of radial gradients, unused by linear ones.
    pub focus: Vec2,
}

impl Gradient {
    pub fn new(stops: impl IntoIterator<Item = ColorStop>) -> Self {
        Self { stops: stops.into_iter().collect(), transform: IDENTITY, focus: Vec2::zero() }
    }

    fn lerp(&self, other: &Self, t: f32) -> Option<Self> {
        if self.stops.len() != other.stops.len() {
            return None;
        }
        let stops = self
            .stops
            .iter()
            .zip(other.stops.iter())
            .map(|(a, b)| ColorStop {
                offset: a.offset + (b.offset - a.offset) * t,
                color: a.color.mix(&b.color, t),
            })
            .collect();
        let mut transform = self.transform;
        for (value, target) in transform.iter_mut().zip(other.transform.iter()) {
            *value += (target - *value) * t;
        }
        Some(Self { stops, transform, focus: self.focus.lerp(other.focus, t) })
    }
}

const IDENTITY: [f32; 6] = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    LinearGradient(Gradient),
    RadialGradient(Gradient),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaintKind {
    Solid,
    LinearGradient,
    RadialGradient,
}

impl Paint {
    pub fn rgb(r: f32, g: f32, b: f32) -> Self { Paint::Solid(Color::new(r, g, b, 1.0)) }

    pub fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self { Paint::Solid(Color::new(r, g, b, a)) }

    pub fn kind(&self) -> PaintKind {
        match self {
            Paint::Solid(_) => PaintKind::Solid,
            Paint::LinearGradient(_) => PaintKind::LinearGradient,
            Paint::RadialGradient(_) => PaintKind::RadialGradient,
        }
    }

    pub fn is_gradient(&self) -> bool { self.kind() != PaintKind::Solid }

    /// Colours as the rgba quadruples a paint texture row holds.
    pub fn raw_colors(&self) -> SmallVec<[[f32; 4]; 4]> {
        match self {
            Paint::Solid(color) => std::iter::once(color.into_raw::<[f32; 4]>()).collect(),
            Paint::LinearGradient(gradient) | Paint::RadialGradient(gradient) => {
                gradient.stops.iter().map(|stop| stop.color.into_raw::<[f32; 4]>()).collect()
            }
        }
    }

    /// The paint as seen after mapping shape space through
    /// `((x + tx) * sx, (y + ty) * sy)`. Solid colours are unaffected.
    pub fn transformed(&self, sx: f32, sy: f32, tx: f32, ty: f32) -> Paint {
        let map = |gradient: &Gradient| {
            let [a, b, c, d, e, f] = gradient.transform;
            Gradient {
                transform: [a * sx, b * sx, (c + tx) * sx, d * sy, e * sy, (f + ty) * sy],
                ..gradient.clone()
            }
        };
        match self {
            Paint::Solid(color) => Paint::Solid(*color),
            Paint::LinearGradient(gradient) => Paint::LinearGradient(map(gradient)),
            Paint::RadialGradient(gradient) => Paint::RadialGradient(map(gradient)),
        }
    }

    /// Interpolates between paints of the same kind and layout. Anything
    /// else snaps to `a` below the midpoint and to `b` above it.
    pub fn animate(a: Option<&Paint>, b: Option<&Paint>, t: f32) -> Option<Paint> {
        let lerped = match (a, b) {
            (Some(Paint::Solid(a)), Some(Paint::Solid(b))) => Some(Paint::Solid(a.mix(b, t))),
            (Some(Paint::LinearGradient(a)), Some(Paint::LinearGradient(b))) => {
                a.lerp(b, t).map(Paint::LinearGradient)
            }
            (Some(Paint::RadialGradient(a)), Some(Paint::RadialGradient(b))) => {
                a.lerp(b, t).map(Paint::RadialGradient)
            }
            _ => None,
        };
        lerped.or_else(|| if t < 0.5 { a.cloned() } else { b.cloned() })
    }
}

/// Paint kinds numbered the way NanoSVG numbers them.
pub mod paint_kind {
    pub const NONE: u32 = 0;
    pub const COLOR: u32 = 1;
    pub const LINEAR_GRADIENT: u32 = 2;
    pub const RADIAL_GRADIENT: u32 = 3;
}

/// A paint as handed over by an SVG parser: colours packed as `0xAABBGGRR`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaintDescription {
    pub kind: u32,
    pub color: u32,
    pub gradient: Option<GradientDescription>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GradientDescription {
    pub transform: [f32; 6],
    pub focus: (f32, f32),
    pub stops: Vec<(f32, u32)>,
}

pub fn unpack_color(packed: u32) -> Color {
    let channel = |shift: u32| ((packed >> shift) & 0xff) as f32 / 255.0;
    Color::new(channel(0), channel(8), channel(16), channel(24))
}

impl PaintDescription {
    pub fn to_paint(&self) -> Result<Option<Paint>> {
        let gradient = || {
            let description = self.gradient.clone().unwrap_or_default();
            Gradient {
                stops: description
                    .stops
                    .iter()
                    .map(|&(offset, color)| ColorStop { offset, color: unpack_color(color) })
                    .collect(),
                transform: description.transform,
                focus: description.focus.into(),
            }
        };

        match self.kind {
            paint_kind::NONE => Ok(None),
            paint_kind::COLOR => Ok(Some(Paint::Solid(unpack_color(self.color)))),
            paint_kind::LINEAR_GRADIENT => Ok(Some(Paint::LinearGradient(gradient()))),
            paint_kind::RADIAL_GRADIENT => Ok(Some(Paint::RadialGradient(gradient()))),
            other => Err(VgError::InvalidPaint(other)),
        }
    }
}
