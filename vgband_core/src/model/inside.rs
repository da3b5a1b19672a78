use crate::geom::Vec2;

/// Accumulates the crossings of a ray cast from a sample point towards +x.
pub trait InsideTest {
    /// `winding` is +1 for edges going down (increasing y) and -1 otherwise.
    fn cross(&mut self, winding: i32);

    fn is_inside(&self) -> bool;
}

#[derive(Debug, Default)]
pub struct NonZeroTest {
    winding: i32,
}

impl InsideTest for NonZeroTest {
    fn cross(&mut self, winding: i32) { self.winding += winding }

    fn is_inside(&self) -> bool { self.winding != 0 }
}

#[derive(Debug, Default)]
pub struct EvenOddTest {
    crossings: u32,
}

impl InsideTest for EvenOddTest {
    fn cross(&mut self, _winding: i32) { self.crossings += 1 }

    fn is_inside(&self) -> bool { self.crossings % 2 == 1 }
}

pub(crate) fn cross_edge(from: Vec2, to: Vec2, x: f32, y: f32, test: &mut dyn InsideTest) {
    if (from.y <= y) != (to.y <= y) {
        let at = from.x + (y - from.y) * (to.x - from.x) / (to.y - from.y);
        if at > x {
            test.cross(if to.y > from.y { 1 } else { -1 });
        }
    }
}
