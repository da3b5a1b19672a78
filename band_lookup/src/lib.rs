pub mod types;
pub use types::*;

pub mod events;
pub use events::*;

pub mod table;
pub use table::*;

pub mod builder;
pub use builder::*;

pub(crate) mod util;

#[cfg(test)]
mod smoke_test;
