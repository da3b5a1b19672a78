use std::fmt::{Formatter, Result};

pub(crate) fn print_points_len<T>(points: &[T], fmt: &mut Formatter) -> Result {
    write!(fmt, "[{} points]", points.len())
}

pub(crate) fn print_rc_count<T>(items: &[std::rc::Rc<T>], fmt: &mut Formatter) -> Result {
    write!(fmt, "[{} shared]", items.len())
}
