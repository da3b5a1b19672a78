//! Per-curve data the fragment shader works with, and the packing of a shape
//! into textures and band indices.

pub(crate) mod record;
pub use record::*;

pub(crate) mod texture;
pub use texture::*;

pub(crate) mod geometry;
pub use geometry::*;
