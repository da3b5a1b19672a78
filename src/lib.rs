//! Editable vector shapes packed into curve textures and band indices for
//! rendering in a fragment shader.

pub use band_lookup;
pub use vgband_core::*;
