pub(crate) mod command;
pub use command::*;

pub(crate) mod primitive;
pub use primitive::*;

pub(crate) mod inside;
pub use inside::{EvenOddTest, InsideTest, NonZeroTest};

pub(crate) mod style;
pub use style::*;

pub(crate) mod contour;
pub use contour::*;

pub(crate) mod outline;

pub(crate) mod shape;
pub use shape::*;

pub(crate) mod scene;
pub use scene::*;
