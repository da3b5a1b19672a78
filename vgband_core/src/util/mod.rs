pub(crate) mod format_helpers;

mod cache;
pub(crate) use cache::*;

/// Used as the clone function of `claimed` flags: a copy belongs to nobody.
pub(crate) fn unclaimed(_claimed: &bool) -> bool { false }
