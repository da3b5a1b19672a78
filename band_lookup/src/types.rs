use bitflags::bitflags;
use smallvec::SmallVec;

/// Terminates every row of curve ids in a lists texture.
pub const SENTINEL_END: u8 = 0xff;
/// Reserved for renderers that append a stroke list to a fill row.
pub const SENTINEL_STROKES: u8 = 0xfe;
/// Number of curve ids a single byte can address once the sentinels are
/// taken out.
pub const MAX_CURVES: usize = SENTINEL_STROKES as usize;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }

    pub fn all() -> [Axis; 2] { [Axis::X, Axis::Y] }
}

bitflags! {
    /// Which band lists a curve must be left out of.
    #[derive(Copy, Clone, PartialEq, Eq, Default, Hash, Debug)]
    pub struct IgnoreMask: u8 {
        const NONE = 0;
        const FILL = 1;
        const LINE = 2;
        const ALL = Self::FILL.bits() | Self::LINE.bits();
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
pub enum EventKind {
    Enter,
    Exit,
    Mark,
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Event {
    pub coord: f32,
    pub kind: EventKind,
    pub curve: u8,
}

/// The extent of one curve along one axis. `marks` are the coordinates of
/// interior extrema, where the curve changes direction on that axis.
#[derive(Clone, PartialEq, Debug)]
pub struct CurveSpan {
    pub curve: u8,
    pub min: f32,
    pub max: f32,
    pub marks: SmallVec<[f32; 2]>,
    pub ignore: IgnoreMask,
}

impl CurveSpan {
    pub fn new(curve: u8, min: f32, max: f32) -> Self {
        Self { curve, min, max, marks: SmallVec::new(), ignore: IgnoreMask::NONE }
    }

    pub fn with_marks(self, marks: &[f32]) -> Self {
        Self { marks: marks.iter().cloned().collect(), ..self }
    }

    pub fn with_ignore(self, ignore: IgnoreMask) -> Self { Self { ignore, ..self } }
}
