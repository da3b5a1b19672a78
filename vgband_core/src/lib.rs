pub mod change;
pub mod curves;
pub mod error;
pub mod geom;
pub mod interop;
pub mod model;
pub mod paint;
mod util;

pub use change::{ChangeFlags, Generation};
pub use curves::*;
pub use error::{Result, VgError};
pub use geom::*;
pub use interop::*;
pub use model::*;
pub use paint::*;

pub mod re_export {
    pub use band_lookup;
    pub use crevice;
    pub use half;
    pub use palette;
}
