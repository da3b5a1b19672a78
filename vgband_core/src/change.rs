//! Change reporting. Consumers poll [`ChangeFlags`] to learn what kind of
//! GPU data to refresh; internal caches compare [`Generation`]s instead.

use bitflags::bitflags;
use std::sync::atomic::{AtomicU64, Ordering};

bitflags! {
    #[derive(Copy, Clone, PartialEq, Eq, Default, Hash, Debug)]
    pub struct ChangeFlags: u32 {
        const NONE = 0;
        const FILL_STYLE = 1;
        const LINE_STYLE = 2;
        const POINTS = 4;
        const GEOMETRY = 8;
        const LINE_ARGS = 16;
        const BOUNDS = 32;
        const EXACT_BOUNDS = 64;
        const RECREATE = 128;
        const FILL_ARGS = 256;
        const INITIAL = 1024;
        const PAINT_INDICES = 2048;

        const ANYTHING = 511;
        const COLORS = Self::FILL_STYLE.bits() | Self::LINE_STYLE.bits();
        /// Never reported by `fetch_changes`; cleared when bounds are recomputed.
        const ANY_BOUNDS = Self::BOUNDS.bits() | Self::EXACT_BOUNDS.bits();
    }
}

impl ChangeFlags {
    /// Adds the flags implied by `self`: anything moving points invalidates
    /// bounds, anything changing which paints are drawn invalidates the
    /// paint indices.
    pub fn expanded(self) -> Self {
        let mut flags = self;
        if self.intersects(Self::GEOMETRY | Self::POINTS | Self::BOUNDS) {
            flags |= Self::ANY_BOUNDS;
        }
        if self.intersects(Self::GEOMETRY | Self::LINE_ARGS | Self::FILL_ARGS) {
            flags |= Self::PAINT_INDICES;
        }
        flags
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Stamp of a mutation. Every call to [`Generation::next`] returns a value
/// greater than all earlier ones.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct Generation(u64);

impl Generation {
    pub fn next() -> Self { Self(NEXT_GENERATION.fetch_add(1, Ordering::Relaxed)) }

    pub fn get(self) -> u64 { self.0 }
}
