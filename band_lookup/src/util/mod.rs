mod active_set;
pub(crate) use active_set::*;
