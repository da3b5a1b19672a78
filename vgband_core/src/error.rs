use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum VgError {
    /// A paint description carried a kind that is neither none, a colour nor
    /// a gradient.
    #[error("invalid paint kind {0}")]
    InvalidPaint(u32),

    /// Curve ids are single bytes with two values reserved as sentinels.
    #[error("shape has {curves} curves but a band index holds at most {max}")]
    TooManyCurves { curves: usize, max: usize },

    #[error("out of memory while allocating {0}")]
    OutOfMemory(&'static str),
}

pub type Result<T, E = VgError> = std::result::Result<T, E>;
