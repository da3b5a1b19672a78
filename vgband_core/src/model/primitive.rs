use crate::{curves::straight_controls, geom::Vec2, model::CommandKey};

/// Control point distance of a quarter circle approximated by one cubic.
pub const KAPPA: f32 = 0.552_284_75;

pub(crate) struct PointWriter<'a> {
    out: &'a mut Vec<Vec2>,
}

impl<'a> PointWriter<'a> {
    pub(crate) fn new(out: &'a mut Vec<Vec2>) -> Self { Self { out } }

    fn move_to(&mut self, x: f32, y: f32) { self.out.push(Vec2::new(x, y)) }

    fn line_to(&mut self, x: f32, y: f32) {
        if let Some(&from) = self.out.last() {
            self.out.extend_from_slice(&straight_controls(from, Vec2::new(x, y))[1..]);
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.out.extend_from_slice(&[Vec2::new(x1, y1), Vec2::new(x2, y2), Vec2::new(x, y)]);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectPrimitive {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub rx: f32,
    pub ry: f32,
}

impl RectPrimitive {
    pub fn new(x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> Self { Self { x, y, w, h, rx, ry } }

    /// A negative radius takes the other one; radii never exceed half the
    /// extent of their side.
    pub fn normalized(self) -> Self {
        let (mut rx, mut ry) = (self.rx, self.ry);
        if rx < 0.0 && ry > 0.0 {
            rx = ry;
        }
        if ry < 0.0 && rx > 0.0 {
            ry = rx;
        }
        Self { rx: rx.max(0.0).min(self.w.abs() / 2.0), ry: ry.max(0.0).min(self.h.abs() / 2.0), ..self }
    }

    pub fn is_empty(&self) -> bool { self.w == 0.0 || self.h == 0.0 }

    pub fn is_sharp(&self) -> bool {
        let rect = self.normalized();
        rect.rx < f32::EPSILON || rect.ry < f32::EPSILON
    }

    pub fn point_count(&self) -> usize {
        if self.is_empty() {
            0
        } else if self.is_sharp() {
            13
        } else {
            25
        }
    }

    pub(crate) fn write(&self, out: &mut PointWriter) {
        if self.is_empty() {
            return;
        }
        let Self { x, y, w, h, rx, ry } = self.normalized();

        if self.is_sharp() {
            out.move_to(x, y);
            out.line_to(x + w, y);
            out.line_to(x + w, y + h);
            out.line_to(x, y + h);
            out.line_to(x, y);
        } else {
            let (kx, ky) = (rx * (1.0 - KAPPA), ry * (1.0 - KAPPA));
            out.move_to(x + rx, y);
            out.line_to(x + w - rx, y);
            out.curve_to(x + w - kx, y, x + w, y + ky, x + w, y + ry);
            out.line_to(x + w, y + h - ry);
            out.curve_to(x + w, y + h - ky, x + w - kx, y + h, x + w - rx, y + h);
            out.line_to(x + rx, y + h);
            out.curve_to(x + kx, y + h, x, y + h - ky, x, y + h - ry);
            out.line_to(x, y + ry);
            out.curve_to(x, y + ky, x + kx, y, x + rx, y);
        }
    }

    pub(crate) fn field(&mut self, key: CommandKey) -> Option<&mut f32> {
        match key {
            CommandKey::X => Some(&mut self.x),
            CommandKey::Y => Some(&mut self.y),
            CommandKey::Width => Some(&mut self.w),
            CommandKey::Height => Some(&mut self.h),
            CommandKey::Rx => Some(&mut self.rx),
            CommandKey::Ry => Some(&mut self.ry),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipsePrimitive {
    pub cx: f32,
    pub cy: f32,
    pub rx: f32,
    pub ry: f32,
}

impl EllipsePrimitive {
    pub fn new(cx: f32, cy: f32, rx: f32, ry: f32) -> Self { Self { cx, cy, rx, ry } }

    pub fn point_count(&self) -> usize { 13 }

    pub(crate) fn write(&self, out: &mut PointWriter) {
        let Self { cx, cy, rx, ry } = *self;
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);

        out.move_to(cx + rx, cy);
        out.curve_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
        out.curve_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
        out.curve_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
        out.curve_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
    }

    pub(crate) fn field(&mut self, key: CommandKey) -> Option<&mut f32> {
        match key {
            CommandKey::Cx => Some(&mut self.cx),
            CommandKey::Cy => Some(&mut self.cy),
            CommandKey::Rx => Some(&mut self.rx),
            CommandKey::Ry => Some(&mut self.ry),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points_of(write: impl FnOnce(&mut PointWriter)) -> Vec<Vec2> {
        let mut points = Vec::new();
        write(&mut PointWriter::new(&mut points));
        points
    }

    #[test]
    fn point_counts_follow_topology() {
        let sharp = RectPrimitive::new(0.0, 0.0, 10.0, 5.0, 0.0, 0.0);
        let round = RectPrimitive::new(0.0, 0.0, 10.0, 5.0, 2.0, 2.0);
        let empty = RectPrimitive::new(0.0, 0.0, 0.0, 5.0, 2.0, 2.0);
        let ellipse = EllipsePrimitive::new(0.0, 0.0, 3.0, 2.0);

        assert_eq!(points_of(|out| sharp.write(out)).len(), sharp.point_count());
        assert_eq!(points_of(|out| round.write(out)).len(), round.point_count());
        assert_eq!(points_of(|out| empty.write(out)).len(), empty.point_count());
        assert_eq!(points_of(|out| ellipse.write(out)).len(), ellipse.point_count());
        assert_eq!((sharp.point_count(), round.point_count(), empty.point_count()), (13, 25, 0));
    }

    #[test]
    fn radii_are_normalized() {
        assert_eq!(RectPrimitive::new(0.0, 0.0, 10.0, 4.0, -1.0, 3.0).normalized().rx, 3.0);
        assert_eq!(RectPrimitive::new(0.0, 0.0, 10.0, 4.0, -1.0, 3.0).normalized().ry, 2.0);
        assert_eq!(RectPrimitive::new(0.0, 0.0, 10.0, 4.0, 8.0, -1.0).normalized().rx, 5.0);
        assert!(RectPrimitive::new(0.0, 0.0, 10.0, 4.0, -1.0, -1.0).is_sharp());
    }

    #[test]
    fn shapes_close_on_their_start() {
        let round = points_of(|out| RectPrimitive::new(1.0, 2.0, 10.0, 5.0, 2.0, 1.0).write(out));
        assert_eq!(round.first(), round.last());

        let ellipse = points_of(|out| EllipsePrimitive::new(5.0, 5.0, 3.0, 2.0).write(out));
        assert_eq!(ellipse[0], Vec2::new(8.0, 5.0));
        assert_eq!(ellipse[6], Vec2::new(2.0, 5.0));
        assert_eq!(ellipse.first(), ellipse.last());
    }
}
