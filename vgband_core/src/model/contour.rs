use crate::{
    change::{ChangeFlags, Generation},
    curves::{cubic_bounds, cubic_point, straight_controls},
    geom::{Bounds, Vec2},
    model::{
        inside::cross_edge,
        Command,
        CommandKey,
        CommandKind,
        EllipsePrimitive,
        InsideTest,
        PointWriter,
        RectPrimitive,
    },
    util::Cache,
};
use derivative::Derivative;
use lyon::{
    geom::{Arc, CubicBezierSegment},
    math::{point, vector, Angle},
};
use std::{borrow::Cow, cell::RefCell, rc::Rc};

pub type ContourRef = Rc<RefCell<Contour>>;

/// Line segments each curve is split into for inside tests.
pub const INSIDE_TEST_STEPS: usize = 16;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Orientation {
    Clockwise,
    CounterClockwise,
}

/// A chain of cubic beziers: points `3i..=3i+3` form curve `i`, so a
/// contour of `k` curves holds `1 + 3k` points.
#[derive(Derivative)]
#[derivative(Debug, Clone, Default(new = "true"))]
pub struct Contour {
    #[derivative(Debug(format_with = "crate::util::format_helpers::print_points_len"))]
    points: Vec<Vec2>,
    closed: bool,
    commands: Vec<Command>,
    #[derivative(Clone(clone_with = "crate::util::unclaimed"))]
    claimed: bool,
    #[derivative(Default(value = "Generation::next()"))]
    generation: Generation,
    changes: ChangeFlags,
    #[derivative(Debug = "ignore")]
    bounds: Cache<Option<Bounds>>,
}

impl Contour {
    pub fn from_points(flat: &[f32]) -> Self {
        let mut contour = Self::new();
        contour.set_points(flat);
        contour
    }

    pub fn into_ref(self) -> ContourRef { Rc::new(RefCell::new(self)) }

    pub fn is_closed(&self) -> bool { self.closed }

    pub fn set_closed(&mut self, closed: bool) {
        if self.closed != closed {
            self.closed = closed;
            self.touch(ChangeFlags::GEOMETRY);
        }
    }

    pub fn is_claimed(&self) -> bool { self.claimed }

    pub(crate) fn set_claimed(&mut self, claimed: bool) { self.claimed = claimed }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    pub fn commands(&self) -> &[Command] { &self.commands }

    pub fn generation(&self) -> Generation { self.generation }

    pub(crate) fn take_changes(&mut self) -> ChangeFlags { std::mem::take(&mut self.changes) }

    fn touch(&mut self, flags: ChangeFlags) {
        self.generation = Generation::next();
        self.changes |= flags.expanded();
    }

    fn log(&mut self, kind: CommandKind, index: usize, len: usize) -> usize {
        self.commands.push(Command::new(kind, index, len));
        self.commands.len() - 1
    }

    pub fn points(&mut self) -> &[Vec2] {
        self.commit();
        &self.points
    }

    pub fn flat_points(&mut self) -> &[f32] { bytemuck::cast_slice(self.points()) }

    pub fn point_count(&mut self) -> usize { self.points().len() }

    pub fn curve_count(&mut self) -> usize { self.points().len().saturating_sub(1) / 3 }

    pub fn curves(&mut self) -> impl Iterator<Item = [Vec2; 4]> + '_ {
        self.points().windows(4).step_by(3).map(|w| [w[0], w[1], w[2], w[3]])
    }

    /// Starts the contour at `(x, y)`, or moves its current end point there.
    pub fn move_to(&mut self, x: f32, y: f32) -> usize {
        self.commit();
        let p = Vec2::new(x, y);
        let flags = match self.points.last_mut() {
            Some(last) => {
                *last = p;
                ChangeFlags::POINTS
            }
            None => {
                self.points.push(p);
                ChangeFlags::GEOMETRY
            }
        };
        self.touch(flags);
        self.log(CommandKind::MoveTo, self.points.len() - 1, 1)
    }

    /// Appends a straight segment. Returns `None` if there is no current
    /// point to start from.
    pub fn line_to(&mut self, x: f32, y: f32) -> Option<usize> {
        self.commit();
        let from = *self.points.last()?;
        let index = self.points.len() - 1;
        self.points.extend_from_slice(&straight_controls(from, Vec2::new(x, y))[1..]);
        self.touch(ChangeFlags::GEOMETRY);
        Some(self.log(CommandKind::LineTo, index, 4))
    }

    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) -> Option<usize> {
        self.commit();
        self.points.last()?;
        let index = self.points.len() - 1;
        self.points.extend_from_slice(&[Vec2::new(x1, y1), Vec2::new(x2, y2), Vec2::new(x, y)]);
        self.touch(ChangeFlags::GEOMETRY);
        Some(self.log(CommandKind::CurveTo, index, 4))
    }

    /// Appends a circular arc, angles in degrees. Positive sweeps run
    /// towards increasing angles unless `counter_clockwise` is set. An
    /// existing contour is joined to the arc start with a straight segment.
    pub fn arc(&mut self, cx: f32, cy: f32, r: f32, start_angle: f32, end_angle: f32, counter_clockwise: bool) {
        self.commit();
        let delta = end_angle - start_angle;
        let sweep = if delta.abs() >= 360.0 {
            if counter_clockwise {
                -360.0
            } else {
                360.0
            }
        } else if counter_clockwise && delta > 0.0 {
            delta - 360.0
        } else if !counter_clockwise && delta < 0.0 {
            delta + 360.0
        } else {
            delta
        };

        let arc = Arc {
            center: point(cx, cy),
            radii: vector(r, r),
            start_angle: Angle::degrees(start_angle),
            sweep_angle: Angle::degrees(sweep),
            x_rotation: Angle::zero(),
        };

        let start: Vec2 = arc.from().into();
        match self.points.last() {
            None => self.points.push(start),
            Some(&last) if last.distance_squared(start) > 1e-12 => {
                self.points.extend_from_slice(&straight_controls(last, start)[1..])
            }
            _ => {}
        }

        if sweep != 0.0 {
            let points = &mut self.points;
            arc.for_each_cubic_bezier(&mut |segment: &CubicBezierSegment<f32>| {
                points.extend_from_slice(&[segment.ctrl1.into(), segment.ctrl2.into(), segment.to.into()]);
            });
        }
        self.touch(ChangeFlags::GEOMETRY);
    }

    /// Replaces the whole contour with a closed rectangle that stays
    /// editable through the returned command.
    pub fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> usize {
        self.draw_primitive(CommandKind::Rect(RectPrimitive::new(x, y, w, h, rx, ry)))
    }

    pub fn draw_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> usize {
        self.draw_primitive(CommandKind::Ellipse(EllipsePrimitive::new(cx, cy, rx, ry)))
    }

    fn draw_primitive(&mut self, kind: CommandKind) -> usize {
        self.points.clear();
        self.commands.clear();
        write_primitive(&kind, &mut self.points);
        self.closed = true;
        self.touch(ChangeFlags::GEOMETRY);
        let len = self.points.len();
        self.log(kind, 0, len)
    }

    /// Replaces the points with `flat` (x, y pairs) and forgets the command
    /// log.
    pub fn set_points(&mut self, flat: &[f32]) {
        let count = flat.len() / 2;
        let flags = if count == self.points.len() { ChangeFlags::POINTS } else { ChangeFlags::GEOMETRY };
        self.points.clear();
        self.points.extend(flat.chunks_exact(2).map(|p| Vec2::new(p[0], p[1])));
        self.commands.clear();
        self.touch(flags);
    }

    /// Reads one value of a logged command; unknown commands and keys read
    /// as zero.
    pub fn command_value(&self, command: usize, key: CommandKey) -> f32 {
        let command = match self.commands.get(command) {
            Some(command) => command,
            None => return 0.0,
        };
        match command.kind {
            CommandKind::Rect(mut rect) => rect.field(key).map_or(0.0, |value| *value),
            CommandKind::Ellipse(mut ellipse) => ellipse.field(key).map_or(0.0, |value| *value),
            _ => command
                .key_target(key)
                .and_then(|(index, coord)| self.points.get(index).map(|p| if coord == 0 { p.x } else { p.y }))
                .unwrap_or(0.0),
        }
    }

    /// Writes one value of a logged command. Lines stay straight; rects and
    /// ellipses are regenerated on the next [`Contour::commit`]. Unknown
    /// commands and keys are ignored.
    pub fn set_command_value(&mut self, command: usize, key: CommandKey, value: f32) {
        let Self { commands, points, .. } = self;
        let command = match commands.get_mut(command) {
            Some(command) => command,
            None => return,
        };

        let target = command.key_target(key).filter(|&(index, _)| index < points.len());
        let changed = match &mut command.kind {
            CommandKind::Rect(rect) => set_field(rect.field(key), value),
            CommandKind::Ellipse(ellipse) => set_field(ellipse.field(key), value),
            _ => match target {
                Some((index, 0)) => set_field(Some(&mut points[index].x), value),
                Some((index, _)) => set_field(Some(&mut points[index].y), value),
                None => false,
            },
        };
        if !changed {
            return;
        }

        if command.is_primitive() {
            command.dirty = true;
        } else if command.kind == CommandKind::LineTo {
            let (from, to) = (command.point(0), command.point(3));
            let controls = straight_controls(points[from], points[to]);
            points[command.point(1)] = controls[1];
            points[command.point(2)] = controls[2];
        }
        self.touch(ChangeFlags::POINTS);
    }

    /// Regenerates the points of every edited rect and ellipse.
    pub fn commit(&mut self) {
        let mut flags = ChangeFlags::NONE;

        for i in 0..self.commands.len() {
            if !self.commands[i].dirty {
                continue;
            }
            let command = &mut self.commands[i];
            command.dirty = false;

            let mut fresh = Vec::with_capacity(command.len);
            write_primitive(&command.kind, &mut fresh);
            if command.direction < 0 {
                fresh.reverse();
            }

            let start = command.index.min(self.points.len());
            let end = (start + command.len).min(self.points.len());
            let delta = fresh.len() as isize - (end - start) as isize;
            command.len = fresh.len();
            self.points.splice(start..end, fresh);
            log::trace!("regenerated command {} at {}..{}", i, start, end);

            if delta != 0 {
                flags |= ChangeFlags::GEOMETRY;
                for (j, other) in self.commands.iter_mut().enumerate() {
                    // Lines and curves drawn after the primitive start on its last point.
                    let shifts = if other.is_primitive() {
                        other.first_point() >= end
                    } else {
                        other.first_point() + 1 >= end && end > start
                    };
                    if j != i && shifts {
                        other.index = (other.index as isize + delta) as usize;
                    }
                }
            }
        }

        if !flags.is_empty() {
            self.touch(flags);
        }
    }

    fn has_pending_commands(&self) -> bool { self.commands.iter().any(|command| command.dirty) }

    fn committed_points(&self) -> Cow<'_, [Vec2]> {
        if self.has_pending_commands() {
            let mut copy = self.clone();
            copy.commit();
            Cow::Owned(copy.points)
        } else {
            Cow::Borrowed(&self.points)
        }
    }

    /// Union of the tight bounds of all curves; a lone point gives a
    /// degenerate box and an empty contour none.
    pub fn bounds(&mut self) -> Option<Bounds> {
        self.commit();
        let points = &self.points;
        *self.bounds.get_or_update(self.generation, || compute_bounds(points))
    }

    /// Maps every point to `((x + tx) * sx, (y + ty) * sy)`. The command log
    /// is dropped since rect and ellipse parameters no longer describe the
    /// points.
    pub fn transform(&mut self, sx: f32, sy: f32, tx: f32, ty: f32) {
        self.commit();
        let map = move |p: Vec2| Vec2::new((p.x + tx) * sx, (p.y + ty) * sy);
        for p in &mut self.points {
            *p = map(*p);
        }
        self.commands.clear();

        let before = self.generation;
        self.touch(ChangeFlags::POINTS);
        self.bounds.carry(before, self.generation, |bounds| bounds.map(|bounds| bounds.map(map)));
    }

    /// Makes `self` a copy of `source` mapped like [`Contour::transform`].
    /// The command log survives only an identity mapping.
    pub fn set_from(&mut self, source: &Contour, sx: f32, sy: f32, tx: f32, ty: f32) {
        let mut copy = source.clone();
        copy.commit();

        let flags = if copy.points.len() == self.points.len() && copy.closed == self.closed {
            ChangeFlags::POINTS
        } else {
            ChangeFlags::GEOMETRY
        };
        self.points = copy.points;
        self.commands = copy.commands;
        self.closed = copy.closed;
        self.touch(flags);

        if (sx, sy, tx, ty) != (1.0, 1.0, 0.0, 0.0) {
            self.transform(sx, sy, tx, ty);
        }
    }

    /// Reverses the point order, keeping the command log addressable.
    pub fn invert(&mut self) {
        self.commit();
        let n = self.points.len();
        self.points.reverse();
        for command in &mut self.commands {
            command.index = if command.is_primitive() {
                n.saturating_sub(command.index + command.len)
            } else {
                n.saturating_sub(command.index + 1)
            };
            command.direction = -command.direction;
        }

        let before = self.generation;
        self.touch(ChangeFlags::POINTS);
        self.bounds.carry(before, self.generation, |bounds| bounds);
    }

    /// Sign of the shoelace sum over all points, control points included.
    pub fn orientation(&mut self) -> Orientation {
        let points = self.points();
        let area: f32 =
            points.iter().zip(points.iter().cycle().skip(1)).map(|(p, q)| p.x * q.y - p.y * q.x).sum();
        if area < 0.0 {
            Orientation::Clockwise
        } else {
            Orientation::CounterClockwise
        }
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation() != orientation {
            self.invert();
        }
    }

    /// Drops curves whose endpoints are closer than `eps`, keeping at least
    /// one curve. Returns whether anything was removed.
    pub fn clean(&mut self, eps: f32) -> bool {
        self.commit();
        let before = self.points.len();
        while let Some(cleaned) = clean_pass(&self.points, eps) {
            self.points = cleaned;
        }

        let removed = self.points.len() < before;
        if removed {
            log::trace!("clean removed {} points", before - self.points.len());
            self.commands.clear();
            self.touch(ChangeFlags::GEOMETRY);
        }
        removed
    }

    /// Sets every point to `a + (b - a) * t`. Contours of different length
    /// cannot be blended: nothing changes and `false` is returned.
    pub fn animate(&mut self, a: &Contour, b: &Contour, t: f32) -> bool {
        let (from, to) = (a.committed_points(), b.committed_points());
        if from.len() != to.len() {
            log::warn!("cannot animate between contours of {} and {} points", from.len(), to.len());
            return false;
        }

        let flags = if from.len() == self.points.len() { ChangeFlags::POINTS } else { ChangeFlags::GEOMETRY };
        self.points.clear();
        self.points.extend(from.iter().zip(to.iter()).map(|(&p, &q)| p.lerp(q, t)));
        self.closed = a.closed;
        self.commands.clear();
        self.touch(flags);
        true
    }

    /// Feeds the crossings of the flattened contour, closing edge included,
    /// into `test`.
    pub fn wind(&mut self, x: f32, y: f32, test: &mut dyn InsideTest) {
        let points = self.points();
        let first = match points.first() {
            Some(&first) => first,
            None => return,
        };

        let mut from = first;
        for w in points.windows(4).step_by(3) {
            let curve = [w[0], w[1], w[2], w[3]];
            for step in 1..=INSIDE_TEST_STEPS {
                let to = cubic_point(&curve, step as f32 / INSIDE_TEST_STEPS as f32);
                cross_edge(from, to, x, y, test);
                from = to;
            }
        }
        cross_edge(from, first, x, y, test);
    }
}

fn set_field(field: Option<&mut f32>, value: f32) -> bool {
    match field {
        Some(field) => {
            *field = value;
            true
        }
        None => false,
    }
}

fn write_primitive(kind: &CommandKind, out: &mut Vec<Vec2>) {
    let mut writer = PointWriter::new(out);
    match kind {
        CommandKind::Rect(rect) => rect.write(&mut writer),
        CommandKind::Ellipse(ellipse) => ellipse.write(&mut writer),
        _ => {}
    }
}

fn compute_bounds(points: &[Vec2]) -> Option<Bounds> {
    if points.len() < 4 {
        return Bounds::from_points(points);
    }
    points.windows(4).step_by(3).map(|w| cubic_bounds(&[w[0], w[1], w[2], w[3]])).reduce(Bounds::union)
}

/// One sweep over the curves. `None` once nothing more can be removed.
fn clean_pass(points: &[Vec2], eps: f32) -> Option<Vec<Vec2>> {
    if points.len() < 4 {
        return None;
    }

    let eps_squared = eps * eps;
    let mut kept = Vec::with_capacity(points.len());
    let mut last_start = 0;
    for start in (0..points.len() - 3).step_by(3) {
        if points[start].distance_squared(points[start + 3]) > eps_squared {
            kept.extend_from_slice(&points[start..start + 3]);
        }
        last_start = start;
    }
    if kept.is_empty() {
        kept.extend_from_slice(&points[last_start..last_start + 3]);
    }
    kept.extend_from_slice(&points[last_start + 3..]);

    if kept.len() < points.len() {
        Some(kept)
    } else {
        None
    }
}
