use crate::{
    change::{ChangeFlags, Generation},
    curves::ShapeGeometry,
    error::Result,
    geom::Bounds,
    model::{outline::stroke_bounds, Contour, ContourRef, FillRule, LineCap, LineJoin, Orientation, StrokeStyle},
    paint::Paint,
    util::Cache,
    GeometrySettings,
};
use derivative::Derivative;
use std::{cell::RefCell, rc::Rc};

pub type ShapeRef = Rc<RefCell<Shape>>;

/// Contours painted together with one fill and one stroke. A contour
/// belongs to at most one shape; adding a contour owned elsewhere adds a
/// copy of it.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Shape {
    name: String,
    #[derivative(Debug(format_with = "crate::util::format_helpers::print_rc_count"))]
    contours: Vec<ContourRef>,
    contour_open: bool,
    fill: Option<Paint>,
    line: Option<Paint>,
    stroke: StrokeStyle,
    fill_rule: FillRule,
    opacity: f32,
    claimed: bool,
    generation: Generation,
    changes: ChangeFlags,
    #[derivative(Debug = "ignore")]
    bounds: Cache<Option<Bounds>>,
    #[derivative(Debug = "ignore")]
    exact_bounds: Cache<Option<Bounds>>,
}

impl Default for Shape {
    fn default() -> Self { Self::new() }
}

impl Shape {
    pub fn new() -> Self {
        Self {
            name: String::new(),
            contours: Vec::new(),
            contour_open: false,
            fill: None,
            line: None,
            stroke: StrokeStyle::new(),
            fill_rule: FillRule::NonZero,
            opacity: 1.0,
            claimed: false,
            generation: Generation::next(),
            changes: ChangeFlags::NONE,
            bounds: Cache::default(),
            exact_bounds: Cache::default(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        let mut shape = Self::new();
        shape.name = name.into();
        shape
    }

    pub fn into_ref(self) -> ShapeRef { Rc::new(RefCell::new(self)) }

    pub fn name(&self) -> &str { &self.name }

    pub fn set_name(&mut self, name: impl Into<String>) { self.name = name.into() }

    pub fn is_claimed(&self) -> bool { self.claimed }

    pub(crate) fn set_claimed(&mut self, claimed: bool) { self.claimed = claimed }

    fn touch(&mut self, flags: ChangeFlags) {
        self.generation = Generation::next();
        self.changes |= flags.expanded();
    }

    /// The latest mutation of the shape or any of its contours.
    pub fn generation(&self) -> Generation {
        self.contours.iter().map(|contour| contour.borrow().generation()).fold(self.generation, Generation::max)
    }

    pub fn contours(&self) -> &[ContourRef] { &self.contours }

    pub fn contour(&self, index: usize) -> Option<ContourRef> { self.contours.get(index).cloned() }

    pub fn num_contours(&self) -> usize { self.contours.len() }

    /// Appends `contour`, or a copy of it if another shape already owns it.
    /// Returns the handle actually stored.
    pub fn add_contour(&mut self, contour: &ContourRef) -> ContourRef {
        let contour = if contour.borrow().is_claimed() {
            contour.borrow().clone().into_ref()
        } else {
            contour.clone()
        };
        {
            let mut inner = contour.borrow_mut();
            inner.set_claimed(true);
            if self.fill.is_some() {
                inner.set_closed(true);
            }
        }
        self.contours.push(contour.clone());
        self.touch(ChangeFlags::GEOMETRY);
        contour
    }

    pub fn remove_contour(&mut self, contour: &ContourRef) -> bool {
        match self.contours.iter().position(|c| Rc::ptr_eq(c, contour)) {
            Some(index) => {
                let removed = self.contours.remove(index);
                removed.borrow_mut().set_claimed(false);
                if index == self.contours.len() {
                    self.contour_open = false;
                }
                self.touch(ChangeFlags::GEOMETRY);
                true
            }
            None => false,
        }
    }

    /// The contour being drawn, opening a fresh one if there is none.
    pub fn begin_contour(&mut self) -> ContourRef {
        if self.contour_open {
            if let Some(current) = self.contours.last() {
                return current.clone();
            }
        }
        let contour = self.add_contour(&Contour::new().into_ref());
        self.contour_open = true;
        contour
    }

    pub fn close_contour(&mut self, close_curves: bool) {
        if self.contour_open {
            if let Some(current) = self.contours.last() {
                let mut current = current.borrow_mut();
                if close_curves && !current.is_empty() {
                    current.set_closed(true);
                }
            }
        }
        self.contour_open = false;
    }

    pub fn current_contour(&self) -> Option<ContourRef> {
        if self.contour_open {
            self.contours.last().cloned()
        } else {
            None
        }
    }

    pub fn invert_contour(&mut self) {
        if let Some(current) = self.contours.last() {
            current.borrow_mut().invert();
        }
    }

    pub fn fill_paint(&self) -> Option<&Paint> { self.fill.as_ref() }

    /// Setting a fill closes every contour.
    pub fn set_fill_paint(&mut self, paint: Option<Paint>) {
        let mut flags = ChangeFlags::FILL_STYLE;
        if paint.is_some() != self.fill.is_some() {
            flags |= ChangeFlags::FILL_ARGS;
        }
        if paint.is_some() {
            for contour in &self.contours {
                contour.borrow_mut().set_closed(true);
            }
        }
        self.fill = paint;
        self.touch(flags);
    }

    pub fn line_paint(&self) -> Option<&Paint> { self.line.as_ref() }

    pub fn set_line_paint(&mut self, paint: Option<Paint>) {
        let mut flags = ChangeFlags::LINE_STYLE;
        if paint.is_some() != self.line.is_some() {
            flags |= ChangeFlags::LINE_ARGS;
        }
        self.line = paint;
        self.touch(flags);
    }

    pub fn has_fill(&self) -> bool { self.fill.is_some() }

    pub fn has_stroke(&self) -> bool { self.line.is_some() && self.stroke.width > 0.0 }

    pub fn stroke(&self) -> &StrokeStyle { &self.stroke }

    pub fn set_line_width(&mut self, width: f32) {
        if width == self.stroke.width {
            return;
        }
        let mut flags = ChangeFlags::POINTS | ChangeFlags::LINE_ARGS;
        if (width > 0.0) != (self.stroke.width > 0.0) {
            flags |= ChangeFlags::GEOMETRY;
        }
        self.stroke.width = width;
        self.touch(flags);
    }

    pub fn set_line_dash(&mut self, dashes: &[f32]) {
        self.stroke.dashes = StrokeStyle::normalized_dashes(dashes);
        self.touch(ChangeFlags::GEOMETRY);
    }

    pub fn set_line_dash_offset(&mut self, offset: f32) {
        self.stroke.dash_offset = offset;
        self.touch(ChangeFlags::LINE_ARGS);
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.stroke.join = join;
        self.touch(ChangeFlags::LINE_ARGS);
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.stroke.cap = cap;
        self.touch(ChangeFlags::LINE_ARGS);
    }

    pub fn set_miter_limit(&mut self, limit: f32) {
        let mut flags = ChangeFlags::POINTS | ChangeFlags::LINE_ARGS;
        if (limit > 0.0) != (self.stroke.miter_limit > 0.0) {
            flags |= ChangeFlags::GEOMETRY;
        }
        self.stroke.miter_limit = limit;
        self.touch(flags);
    }

    pub(crate) fn set_stroke_style(&mut self, stroke: &StrokeStyle) {
        if &self.stroke != stroke {
            self.stroke = stroke.clone();
            self.touch(ChangeFlags::GEOMETRY | ChangeFlags::LINE_ARGS);
        }
    }

    pub fn fill_rule(&self) -> FillRule { self.fill_rule }

    pub fn set_fill_rule(&mut self, rule: FillRule) {
        if rule != self.fill_rule {
            self.fill_rule = rule;
            self.touch(ChangeFlags::GEOMETRY);
        }
    }

    pub fn opacity(&self) -> f32 { self.opacity }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        self.touch(ChangeFlags::COLORS);
    }

    pub fn curve_count(&self) -> usize {
        self.contours.iter().map(|contour| contour.borrow_mut().curve_count()).sum()
    }

    /// Union of the contour bounds, widened by half the line width when the
    /// shape is stroked.
    pub fn bounds(&mut self) -> Option<Bounds> {
        let generation = self.generation();
        let margin = if self.has_stroke() { self.stroke.width / 2.0 } else { 0.0 };
        let contours = &self.contours;

        *self.bounds.get_or_update(generation, || {
            contours
                .iter()
                .filter_map(|contour| contour.borrow_mut().bounds())
                .reduce(Bounds::union)
                .map(|bounds| bounds.inflate(margin))
        })
    }

    /// Bounds of what is actually painted: the stroke outline with its
    /// joins, caps and miter limit. Unstroked shapes report
    /// [`Shape::bounds`].
    pub fn exact_bounds(&mut self) -> Option<Bounds> {
        if !self.has_stroke() {
            return self.bounds();
        }
        let generation = self.generation();
        let (contours, stroke) = (&self.contours, &self.stroke);
        let exact = *self.exact_bounds.get_or_update(generation, || {
            log::debug!("tessellating stroke outline of {} contours", contours.len());
            stroke_bounds(contours, stroke)
        });

        let fill = if self.has_fill() { self.bounds_without_stroke() } else { None };
        match (exact, fill) {
            (Some(exact), Some(fill)) => Some(exact.union(fill)),
            (Some(exact), None) => Some(exact),
            (None, _) => self.bounds(),
        }
    }

    fn bounds_without_stroke(&self) -> Option<Bounds> {
        self.contours.iter().filter_map(|contour| contour.borrow_mut().bounds()).reduce(Bounds::union)
    }

    /// Tests `(x, y)` against the closed contours with the shape's fill rule.
    pub fn is_inside(&mut self, x: f32, y: f32) -> bool {
        match self.bounds() {
            Some(bounds) if bounds.contains(x, y) => {}
            _ => return false,
        }

        let mut test = self.fill_rule.inside_test();
        for contour in &self.contours {
            let mut contour = contour.borrow_mut();
            if contour.is_closed() {
                contour.wind(x, y, &mut *test);
            }
        }
        test.is_inside()
    }

    pub fn clean(&mut self, eps: f32) {
        for contour in &self.contours {
            contour.borrow_mut().clean(eps);
        }
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        for contour in &self.contours {
            contour.borrow_mut().set_orientation(orientation);
        }
    }

    /// Blends contours, paints and stroke style of `a` and `b`. Shapes with a
    /// different number of contours are left alone and `false` is returned.
    pub fn animate(&mut self, a: &Shape, b: &Shape, t: f32) -> bool {
        if a.contours.len() != b.contours.len() {
            log::warn!(
                "cannot animate between shapes of {} and {} contours",
                a.contours.len(),
                b.contours.len()
            );
            return false;
        }

        if self.contours.len() != a.contours.len() {
            for contour in self.contours.drain(..) {
                contour.borrow_mut().set_claimed(false);
            }
            for contour in &a.contours {
                self.add_contour(contour);
            }
        }

        let mut all = true;
        for ((target, a), b) in self.contours.iter().zip(a.contours.iter()).zip(b.contours.iter()) {
            all &= target.borrow_mut().animate(&a.borrow(), &b.borrow(), t);
        }

        self.fill = Paint::animate(a.fill.as_ref(), b.fill.as_ref(), t);
        self.line = Paint::animate(a.line.as_ref(), b.line.as_ref(), t);
        self.stroke = a.stroke.lerp(&b.stroke, t);
        self.fill_rule = a.fill_rule;
        self.opacity = a.opacity + (b.opacity - a.opacity) * t;
        self.touch(ChangeFlags::POINTS | ChangeFlags::COLORS | ChangeFlags::LINE_ARGS);
        all
    }

    /// Makes `self` a copy of `source` with every contour and gradient
    /// mapped through `((x + tx) * sx, (y + ty) * sy)`. With
    /// `scale_line_width` line width, dash lengths and dash offset scale by
    /// the mapping's area scale too.
    pub fn set_from(&mut self, source: &Shape, sx: f32, sy: f32, tx: f32, ty: f32, scale_line_width: bool) {
        let line_scale = if scale_line_width { (sx * sy).abs().sqrt() } else { 1.0 };

        let keep = source.contours.len().min(self.contours.len());
        for contour in self.contours.drain(keep..) {
            contour.borrow_mut().set_claimed(false);
        }
        while self.contours.len() < source.contours.len() {
            let mut contour = Contour::new();
            contour.set_claimed(true);
            self.contours.push(contour.into_ref());
        }
        for (target, source) in self.contours.iter().zip(source.contours.iter()) {
            target.borrow_mut().set_from(&source.borrow(), sx, sy, tx, ty);
        }
        self.contour_open = false;

        self.fill = source.fill.as_ref().map(|paint| paint.transformed(sx, sy, tx, ty));
        self.line = source.line.as_ref().map(|paint| paint.transformed(sx, sy, tx, ty));
        self.stroke = StrokeStyle {
            width: source.stroke.width * line_scale,
            dashes: source.stroke.dashes.iter().map(|dash| dash * line_scale).collect(),
            dash_offset: source.stroke.dash_offset * line_scale,
            ..source.stroke.clone()
        };
        self.fill_rule = source.fill_rule;
        self.opacity = source.opacity;
        self.touch(ChangeFlags::GEOMETRY | ChangeFlags::COLORS | ChangeFlags::LINE_ARGS | ChangeFlags::FILL_ARGS);
    }

    /// Drains the shape's changes together with those of its contours.
    pub(crate) fn take_changes(&mut self) -> ChangeFlags {
        for contour in &self.contours {
            self.changes |= contour.borrow_mut().take_changes();
        }
        std::mem::take(&mut self.changes)
    }

    pub fn build_geometry(&mut self, settings: &GeometrySettings) -> Result<ShapeGeometry> {
        ShapeGeometry::build(self, settings)
    }
}

impl Clone for Shape {
    /// Deep copy: the contours are copied too and the copy is unowned.
    fn clone(&self) -> Self {
        let contours = self
            .contours
            .iter()
            .map(|contour| {
                let mut copy = contour.borrow().clone();
                copy.set_claimed(true);
                copy.into_ref()
            })
            .collect();

        Self {
            name: self.name.clone(),
            contours,
            contour_open: self.contour_open,
            fill: self.fill.clone(),
            line: self.line.clone(),
            stroke: self.stroke.clone(),
            fill_rule: self.fill_rule,
            opacity: self.opacity,
            claimed: false,
            generation: Generation::next(),
            changes: ChangeFlags::GEOMETRY.expanded(),
            bounds: Cache::default(),
            exact_bounds: Cache::default(),
        }
    }
}

impl Drop for Shape {
    fn drop(&mut self) {
        for contour in &self.contours {
            if let Ok(mut contour) = contour.try_borrow_mut() {
                contour.set_claimed(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> ContourRef {
        let mut contour = Contour::new();
        contour.draw_rect(x, y, size, size, 0.0, 0.0);
        contour.into_ref()
    }

    #[test]
    fn claimed_contours_are_copied() {
        let contour = square(0.0, 0.0, 1.0);
        let mut a = Shape::new();
        let mut b = Shape::new();

        let in_a = a.add_contour(&contour);
        let in_b = b.add_contour(&contour);
        assert!(Rc::ptr_eq(&in_a, &contour));
        assert!(!Rc::ptr_eq(&in_b, &contour));
        assert!(in_b.borrow().is_claimed());

        assert!(a.remove_contour(&contour));
        assert!(!contour.borrow().is_claimed());
        assert!(!a.remove_contour(&contour));
    }

    #[test]
    fn dropping_a_shape_releases_its_contours() {
        let contour = square(0.0, 0.0, 1.0);
        {
            let mut shape = Shape::new();
            shape.add_contour(&contour);
            assert!(contour.borrow().is_claimed());
        }
        assert!(!contour.borrow().is_claimed());
    }

    #[test]
    fn clone_is_deep() {
        let mut shape = Shape::named("a");
        shape.add_contour(&square(0.0, 0.0, 1.0));
        let copy = shape.clone();

        assert!(!Rc::ptr_eq(&copy.contours()[0], &shape.contours()[0]));
        assert!(!copy.is_claimed());
        copy.contours()[0].borrow_mut().transform(2.0, 2.0, 0.0, 0.0);
        assert_eq!(shape.bounds(), Some(Bounds::new(0.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn stroke_inflates_bounds() {
        let mut shape = Shape::new();
        shape.add_contour(&square(0.0, 0.0, 10.0));
        shape.set_line_width(4.0);
        assert_eq!(shape.bounds(), Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));

        shape.set_line_paint(Some(Paint::rgb(0.0, 0.0, 0.0)));
        assert_eq!(shape.bounds(), Some(Bounds::new(-2.0, -2.0, 12.0, 12.0)));
    }

    #[test]
    fn bounds_follow_contour_edits() {
        let mut shape = Shape::new();
        let contour = shape.add_contour(&square(0.0, 0.0, 10.0));
        assert_eq!(shape.bounds(), Some(Bounds::new(0.0, 0.0, 10.0, 10.0)));

        contour.borrow_mut().transform(1.0, 1.0, 5.0, 0.0);
        assert_eq!(shape.bounds(), Some(Bounds::new(5.0, 0.0, 15.0, 10.0)));
    }

    #[test]
    fn fill_closes_contours_and_enables_hits() {
        let mut shape = Shape::new();
        let contour = shape.begin_contour();
        {
            let mut contour = contour.borrow_mut();
            contour.move_to(0.0, 0.0);
            contour.line_to(10.0, 0.0);
            contour.line_to(0.0, 10.0);
        }
        shape.close_contour(false);
        assert!(!contour.borrow().is_closed());
        assert!(!shape.is_inside(2.0, 2.0));

        shape.set_fill_paint(Some(Paint::rgb(1.0, 0.0, 0.0)));
        assert!(contour.borrow().is_closed());
        assert!(shape.is_inside(2.0, 2.0));
        assert!(!shape.is_inside(8.0, 8.0));
    }

    #[test]
    fn even_odd_leaves_holes() {
        let mut shape = Shape::new();
        shape.add_contour(&square(0.0, 0.0, 10.0));
        shape.add_contour(&square(2.0, 2.0, 6.0));
        assert!(shape.is_inside(5.0, 5.0));

        shape.set_fill_rule(FillRule::EvenOdd);
        assert!(!shape.is_inside(5.0, 5.0));
        assert!(shape.is_inside(1.0, 5.0));
    }

    #[test]
    fn changes_accumulate_from_contours() {
        let mut shape = Shape::new();
        let contour = shape.add_contour(&square(0.0, 0.0, 10.0));
        shape.take_changes();

        contour.borrow_mut().transform(2.0, 2.0, 0.0, 0.0);
        let changes = shape.take_changes();
        assert!(changes.contains(ChangeFlags::POINTS | ChangeFlags::BOUNDS));
        assert!(!changes.contains(ChangeFlags::GEOMETRY));

        shape.set_fill_paint(Some(Paint::rgb(1.0, 1.0, 1.0)));
        let changes = shape.take_changes();
        assert!(changes.contains(ChangeFlags::FILL_STYLE | ChangeFlags::FILL_ARGS | ChangeFlags::PAINT_INDICES));
    }

    #[test]
    fn exact_bounds_follow_the_outline() {
        let mut shape = Shape::new();
        let contour = shape.begin_contour();
        {
            let mut contour = contour.borrow_mut();
            contour.move_to(0.0, 0.0);
            contour.line_to(10.0, 0.0);
        }
        shape.close_contour(false);
        shape.set_line_width(4.0);
        assert_eq!(shape.exact_bounds(), shape.bounds());

        shape.set_line_paint(Some(Paint::rgb(0.0, 0.0, 0.0)));
        assert_eq!(shape.bounds(), Some(Bounds::new(-2.0, -2.0, 12.0, 2.0)));
        let exact = shape.exact_bounds().unwrap();
        assert!(exact.x0.abs() < 1e-3 && (exact.x1 - 10.0).abs() < 1e-3);
        assert!((exact.y0 + 2.0).abs() < 1e-3 && (exact.y1 - 2.0).abs() < 1e-3);

        shape.set_line_cap(LineCap::Square);
        let exact = shape.exact_bounds().unwrap();
        assert!((exact.x0 + 2.0).abs() < 1e-3 && (exact.x1 - 12.0).abs() < 1e-3);
    }

    #[test]
    fn set_from_maps_contours_and_style() {
        let mut source = Shape::named("source");
        source.add_contour(&square(0.0, 0.0, 10.0));
        source.add_contour(&square(2.0, 2.0, 2.0));
        source.set_line_paint(Some(Paint::rgb(0.0, 0.0, 0.0)));
        source.set_line_width(2.0);
        source.set_line_dash(&[1.0, 2.0]);
        source.set_opacity(0.5);

        let mut target = Shape::new();
        let stale = target.add_contour(&square(0.0, 0.0, 1.0));
        target.add_contour(&square(0.0, 0.0, 1.0));
        target.add_contour(&square(0.0, 0.0, 1.0));
        target.take_changes();

        target.set_from(&source, 2.0, 2.0, 1.0, 0.0, true);
        assert_eq!(target.num_contours(), 2);
        assert!(Rc::ptr_eq(&target.contours()[0], &stale));
        assert_eq!(target.stroke().width, 4.0);
        assert_eq!(&target.stroke().dashes[..], &[2.0, 4.0]);
        assert_eq!(target.opacity(), 0.5);
        assert_eq!(target.name(), "");
        assert_eq!(target.bounds(), Some(Bounds::new(0.0, -2.0, 24.0, 22.0)));
        assert!(target.take_changes().contains(ChangeFlags::GEOMETRY | ChangeFlags::LINE_STYLE));

        target.set_from(&source, 2.0, 2.0, 0.0, 0.0, false);
        assert_eq!(target.stroke().width, 2.0);
        assert_eq!(source.bounds(), Some(Bounds::new(-1.0, -1.0, 11.0, 11.0)));
    }

    #[test]
    fn animate_blends_style() {
        let mut a = Shape::new();
        a.add_contour(&square(0.0, 0.0, 10.0));
        a.set_line_width(2.0);
        let mut b = Shape::new();
        b.add_contour(&square(10.0, 0.0, 10.0));
        b.set_line_width(4.0);

        let mut target = Shape::new();
        assert!(target.animate(&a, &b, 0.5));
        assert_eq!(target.stroke().width, 3.0);
        assert_eq!(target.bounds(), Some(Bounds::new(5.0, 0.0, 15.0, 10.0)));

        let mut c = Shape::new();
        c.add_contour(&square(0.0, 0.0, 1.0));
        c.add_contour(&square(0.0, 0.0, 1.0));
        assert!(!target.animate(&a, &c, 0.5));
    }
}
