use crate::{
    change::{ChangeFlags, Generation},
    curves::{GeometrySettings, ShapeGeometry},
    error::Result,
    geom::Bounds,
    interop::InteropChain,
    model::{ContourRef, FillRule, LineCap, LineJoin, Orientation, Shape, ShapeRef, StrokeStyle},
    paint::{Paint, PaintKind},
    util::Cache,
};
use derivative::Derivative;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DrawState {
    Ready,
    ShapeOpen,
    ContourOpen,
}

/// Position of one paint in the paint buffers. `gradient` is zero for solid
/// colours; gradients are numbered from one.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PaintSlot {
    pub paint: usize,
    pub gradient: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct ShapePaintIndices {
    pub line: Option<PaintSlot>,
    pub fill: Option<PaintSlot>,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct PaintIndices {
    shapes: Vec<ShapePaintIndices>,
    num_paints: usize,
    num_gradients: usize,
}

impl PaintIndices {
    fn assign(&mut self, paint: Option<&Paint>) -> Option<PaintSlot> {
        let paint = paint?;
        let slot = PaintSlot {
            paint: self.num_paints,
            gradient: if paint.kind() == PaintKind::Solid {
                0
            } else {
                self.num_gradients += 1;
                self.num_gradients
            },
        };
        self.num_paints += 1;
        Some(slot)
    }

    pub fn get(&self, shape: usize) -> Option<&ShapePaintIndices> { self.shapes.get(shape) }

    pub fn num_paints(&self) -> usize { self.num_paints }

    pub fn num_gradients(&self) -> usize { self.num_gradients }

    pub fn all_solid(&self) -> bool { self.num_gradients == 0 }
}

/// An ordered stack of shapes, later shapes painting over earlier ones,
/// plus a small immediate mode drawing interface.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Scene {
    #[derivative(Debug(format_with = "crate::util::format_helpers::print_rc_count"))]
    shapes: Vec<ShapeRef>,
    #[derivative(Debug = "ignore")]
    open: Option<ShapeRef>,
    fill: Option<Paint>,
    line: Option<Paint>,
    stroke: StrokeStyle,
    fill_rule: FillRule,
    generation: Generation,
    changes: ChangeFlags,
    #[derivative(Debug = "ignore")]
    bounds: Cache<Bounds>,
    #[derivative(Debug = "ignore")]
    exact_bounds: Cache<Bounds>,
    #[derivative(Debug = "ignore")]
    paint_indices: Cache<PaintIndices>,
}

impl Default for Scene {
    fn default() -> Self { Self::new() }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            open: None,
            fill: Some(Paint::rgb(0.95, 0.95, 0.95)),
            line: Some(Paint::rgb(0.25, 0.25, 0.25)),
            stroke: StrokeStyle { width: 3.0, ..StrokeStyle::new() },
            fill_rule: FillRule::NonZero,
            generation: Generation::next(),
            changes: ChangeFlags::INITIAL | ChangeFlags::ANY_BOUNDS | ChangeFlags::PAINT_INDICES,
            bounds: Cache::default(),
            exact_bounds: Cache::default(),
            paint_indices: Cache::default(),
        }
    }

    fn touch(&mut self, flags: ChangeFlags) {
        self.generation = Generation::next();
        self.changes |= flags.expanded();
    }

    /// The latest mutation of the scene or anything in it.
    pub fn generation(&self) -> Generation {
        self.shapes.iter().map(|shape| shape.borrow().generation()).fold(self.generation, Generation::max)
    }

    pub fn shapes(&self) -> &[ShapeRef] { &self.shapes }

    pub fn shape(&self, index: usize) -> Option<ShapeRef> { self.shapes.get(index).cloned() }

    pub fn num_shapes(&self) -> usize { self.shapes.len() }

    pub fn shape_by_name(&self, name: &str) -> Option<ShapeRef> {
        self.shapes.iter().find(|shape| shape.borrow().name() == name).cloned()
    }

    pub fn draw_state(&self) -> DrawState {
        match &self.open {
            None => DrawState::Ready,
            Some(shape) if shape.borrow().current_contour().is_some() => DrawState::ContourOpen,
            Some(_) => DrawState::ShapeOpen,
        }
    }

    fn append(&mut self, shape: ShapeRef) {
        shape.borrow_mut().set_claimed(true);
        self.shapes.push(shape);
        self.touch(ChangeFlags::GEOMETRY | ChangeFlags::COLORS);
    }

    /// The open shape, starting a new one if the scene is ready.
    pub fn begin_path(&mut self) -> ShapeRef {
        if let Some(shape) = &self.open {
            return shape.clone();
        }
        let shape = Shape::new().into_ref();
        self.append(shape.clone());
        self.open = Some(shape.clone());
        shape
    }

    pub fn begin_contour(&mut self) -> ContourRef { self.begin_path().borrow_mut().begin_contour() }

    pub fn close_contour(&mut self, close_curves: bool) {
        if let Some(shape) = self.open.as_ref().or_else(|| self.shapes.last()) {
            shape.borrow_mut().close_contour(close_curves);
        }
    }

    pub fn invert_contour(&mut self) {
        if let Some(shape) = self.shapes.last() {
            shape.borrow_mut().invert_contour();
        }
    }

    /// Starts a fresh contour unless the open one has no points yet.
    pub fn move_to(&mut self, x: f32, y: f32) -> usize {
        let shape = self.begin_path();
        let mut shape = shape.borrow_mut();
        if let Some(current) = shape.current_contour() {
            if !current.borrow().is_empty() {
                shape.close_contour(false);
            }
        }
        let contour = shape.begin_contour();
        let mut contour = contour.borrow_mut();
        contour.move_to(x, y)
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> Option<usize> {
        let contour = self.begin_contour();
        let mut contour = contour.borrow_mut();
        contour.line_to(x, y)
    }

    pub fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) -> Option<usize> {
        let contour = self.begin_contour();
        let mut contour = contour.borrow_mut();
        contour.curve_to(x1, y1, x2, y2, x, y)
    }

    pub fn arc(&mut self, cx: f32, cy: f32, r: f32, start_angle: f32, end_angle: f32, counter_clockwise: bool) {
        self.begin_contour().borrow_mut().arc(cx, cy, r, start_angle, end_angle, counter_clockwise)
    }

    /// Adds a closed rectangle as a contour of its own. The returned contour
    /// holds the rectangle as command 0.
    pub fn draw_rect(&mut self, x: f32, y: f32, w: f32, h: f32, rx: f32, ry: f32) -> ContourRef {
        self.draw_primitive(|contour| {
            contour.borrow_mut().draw_rect(x, y, w, h, rx, ry);
        })
    }

    pub fn draw_ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> ContourRef {
        self.draw_primitive(|contour| {
            contour.borrow_mut().draw_ellipse(cx, cy, rx, ry);
        })
    }

    fn draw_primitive(&mut self, draw: impl FnOnce(&ContourRef)) -> ContourRef {
        let shape = self.begin_path();
        let mut shape = shape.borrow_mut();
        shape.close_contour(false);
        let contour = shape.begin_contour();
        draw(&contour);
        shape.close_contour(true);
        contour
    }

    /// Finishes the open shape with the current stroke style and fill rule.
    /// Without an open shape, `close_curves` still closes the contour being
    /// drawn in the last shape.
    pub fn close_path(&mut self, close_curves: bool) {
        match self.open.take() {
            Some(shape) => {
                {
                    let mut shape = shape.borrow_mut();
                    shape.set_stroke_style(&self.stroke);
                    shape.set_fill_rule(self.fill_rule);
                    shape.close_contour(close_curves);
                }
                self.touch(ChangeFlags::GEOMETRY);
            }
            None if close_curves => {
                if let Some(shape) = self.shapes.last() {
                    shape.borrow_mut().close_contour(true);
                }
            }
            None => {}
        }
    }

    fn current_or_last(&self) -> Option<ShapeRef> { self.open.clone().or_else(|| self.shapes.last().cloned()) }

    /// Paints the current shape with the fill colour and finishes it.
    pub fn fill(&mut self) {
        if let Some(shape) = self.current_or_last() {
            shape.borrow_mut().set_fill_paint(self.fill.clone());
            self.close_path(true);
            self.touch(ChangeFlags::GEOMETRY);
        }
    }

    /// Strokes the current shape with the line colour and finishes it.
    pub fn stroke(&mut self) {
        if let Some(shape) = self.current_or_last() {
            {
                let mut shape = shape.borrow_mut();
                shape.set_line_paint(self.line.clone());
                shape.set_stroke_style(&self.stroke);
            }
            self.close_path(false);
            self.touch(ChangeFlags::GEOMETRY);
        }
    }

    /// Appends `shape`, or a copy of it if it already belongs to a scene.
    /// Returns the handle actually stored.
    pub fn add_path(&mut self, shape: &ShapeRef) -> ShapeRef {
        self.close_path(false);
        let shape = if shape.borrow().is_claimed() { shape.borrow().clone().into_ref() } else { shape.clone() };
        shape.borrow_mut().close_contour(false);
        self.append(shape.clone());
        shape
    }

    pub fn remove_path(&mut self, shape: &ShapeRef) -> bool {
        let index = match self.shapes.iter().position(|s| std::rc::Rc::ptr_eq(s, shape)) {
            Some(index) => index,
            None => return false,
        };
        let removed = self.shapes.remove(index);
        removed.borrow_mut().set_claimed(false);
        if self.open.as_ref().map_or(false, |open| std::rc::Rc::ptr_eq(open, &removed)) {
            self.open = None;
        }
        self.touch(ChangeFlags::GEOMETRY | ChangeFlags::COLORS);
        true
    }

    pub fn clear(&mut self) {
        self.open = None;
        for shape in self.shapes.drain(..) {
            shape.borrow_mut().set_claimed(false);
        }
        self.touch(ChangeFlags::GEOMETRY);
    }

    pub fn fill_color(&self) -> Option<&Paint> { self.fill.as_ref() }

    pub fn set_fill_color(&mut self, paint: Option<Paint>) { self.fill = paint }

    pub fn line_color(&self) -> Option<&Paint> { self.line.as_ref() }

    pub fn set_line_color(&mut self, paint: Option<Paint>) { self.line = paint }

    pub fn stroke_style(&self) -> &StrokeStyle { &self.stroke }

    pub fn set_line_width(&mut self, width: f32) { self.stroke.width = width }

    pub fn set_line_dash(&mut self, dashes: &[f32]) { self.stroke.dashes = StrokeStyle::normalized_dashes(dashes) }

    pub fn set_line_dash_offset(&mut self, offset: f32) { self.stroke.dash_offset = offset }

    pub fn set_line_join(&mut self, join: LineJoin) { self.stroke.join = join }

    pub fn set_line_cap(&mut self, cap: LineCap) { self.stroke.cap = cap }

    pub fn set_miter_limit(&mut self, limit: f32) { self.stroke.miter_limit = limit }

    pub fn fill_rule(&self) -> FillRule { self.fill_rule }

    pub fn set_fill_rule(&mut self, rule: FillRule) { self.fill_rule = rule }

    /// Union of the bounds of all painted shapes, a zero box if there are
    /// none. Finishes the open shape.
    pub fn bounds(&mut self) -> Bounds {
        self.close_path(false);
        let generation = self.generation();
        let shapes = &self.shapes;
        let bounds = *self.bounds.get_or_update(generation, || {
            log::debug!("recomputing scene bounds over {} shapes", shapes.len());
            painted_union(shapes, Shape::bounds)
        });
        self.changes.remove(ChangeFlags::BOUNDS);
        bounds
    }

    /// Like [`Scene::bounds`], with every stroked shape contributing its
    /// [`Shape::exact_bounds`].
    pub fn exact_bounds(&mut self) -> Bounds {
        self.close_path(false);
        let generation = self.generation();
        let shapes = &self.shapes;
        let bounds = *self.exact_bounds.get_or_update(generation, || {
            log::debug!("recomputing exact scene bounds over {} shapes", shapes.len());
            painted_union(shapes, Shape::exact_bounds)
        });
        self.changes.remove(ChangeFlags::EXACT_BOUNDS);
        bounds
    }

    /// Makes `self` a copy of `source` mapped through
    /// `((x + tx) * sx, (y + ty) * sy)`; see [`Shape::set_from`]. Shapes
    /// already in `self` are reused in order.
    pub fn set_from(&mut self, source: &Scene, sx: f32, sy: f32, tx: f32, ty: f32, scale_line_width: bool) {
        self.close_path(false);
        let keep = source.shapes.len().min(self.shapes.len());
        for shape in self.shapes.drain(keep..) {
            shape.borrow_mut().set_claimed(false);
        }
        while self.shapes.len() < source.shapes.len() {
            self.append(Shape::new().into_ref());
        }
        for (target, source) in self.shapes.iter().zip(source.shapes.iter()) {
            target.borrow_mut().set_from(&source.borrow(), sx, sy, tx, ty, scale_line_width);
        }
        self.touch(ChangeFlags::GEOMETRY | ChangeFlags::COLORS);
    }

    fn gather_changes(&mut self) {
        for shape in &self.shapes {
            self.changes |= shape.borrow_mut().take_changes();
        }
    }

    /// Returns the requested changes and forgets them. Bounds changes are
    /// never reported.
    pub fn fetch_changes(&mut self, mask: ChangeFlags) -> ChangeFlags {
        self.gather_changes();
        let mask = mask & !ChangeFlags::ANY_BOUNDS;
        let changes = self.changes & mask;
        self.changes.remove(mask);
        changes
    }

    pub fn clear_changes(&mut self, mask: ChangeFlags) {
        self.gather_changes();
        self.changes.remove(mask);
    }

    pub fn clean(&mut self, eps: f32) {
        for shape in &self.shapes {
            shape.borrow_mut().clean(eps);
        }
    }

    pub fn set_orientation(&mut self, orientation: Orientation) {
        for shape in &self.shapes {
            shape.borrow_mut().set_orientation(orientation);
        }
    }

    /// The topmost shape whose interior contains `(x, y)`.
    pub fn hit(&self, x: f32, y: f32) -> Option<ShapeRef> {
        self.shapes.iter().rev().find(|shape| shape.borrow_mut().is_inside(x, y)).cloned()
    }

    /// Blends every shape of `a` with the shape at the same position in `b`.
    /// Scenes of different length are left alone and `false` is returned.
    pub fn animate(&mut self, a: &Scene, b: &Scene, t: f32) -> bool {
        if a.shapes.len() != b.shapes.len() {
            log::warn!("cannot animate between scenes of {} and {} shapes", a.shapes.len(), b.shapes.len());
            return false;
        }

        if self.shapes.len() != a.shapes.len() {
            self.clear();
            for shape in &a.shapes {
                self.add_path(shape);
            }
        }

        let mut all = true;
        for ((target, a), b) in self.shapes.iter().zip(a.shapes.iter()).zip(b.shapes.iter()) {
            all &= target.borrow_mut().animate(&a.borrow(), &b.borrow(), t);
        }
        self.touch(ChangeFlags::POINTS | ChangeFlags::COLORS);
        all
    }

    /// Paint buffer positions of every shape, line paint before fill paint.
    pub fn paint_indices(&mut self) -> &PaintIndices {
        let generation = self.generation();
        let shapes = &self.shapes;
        self.changes.remove(ChangeFlags::PAINT_INDICES);
        self.paint_indices.get_or_update(generation, || {
            let mut indices = PaintIndices::default();
            for shape in shapes {
                let shape = shape.borrow();
                let line = indices.assign(shape.line_paint());
                let fill = indices.assign(shape.fill_paint());
                indices.shapes.push(ShapePaintIndices { line, fill });
            }
            log::debug!("assigned {} paints, {} gradients", indices.num_paints, indices.num_gradients);
            indices
        })
    }

    pub fn interop_chain(&mut self) -> InteropChain {
        self.close_path(false);
        InteropChain::from_shapes(&self.shapes)
    }

    /// One geometry per shape, in painting order.
    pub fn build_geometry(&mut self, settings: &GeometrySettings) -> Result<Vec<ShapeGeometry>> {
        self.close_path(false);
        self.shapes.iter().map(|shape| shape.borrow_mut().build_geometry(settings)).collect()
    }
}

/// Union of `bounds` over the shapes with a fill or line paint, a zero box
/// if there are none.
fn painted_union(shapes: &[ShapeRef], bounds: fn(&mut Shape) -> Option<Bounds>) -> Bounds {
    shapes
        .iter()
        .filter_map(|shape| {
            let mut shape = shape.borrow_mut();
            if shape.has_fill() || shape.line_paint().is_some() {
                bounds(&mut *shape)
            } else {
                None
            }
        })
        .reduce(Bounds::union)
        .unwrap_or_else(Bounds::zero)
}

impl Clone for Scene {
    /// Deep copy: every shape is copied and the open shape is finished.
    fn clone(&self) -> Self {
        let mut scene = Self::new();
        scene.fill = self.fill.clone();
        scene.line = self.line.clone();
        scene.stroke = self.stroke.clone();
        scene.fill_rule = self.fill_rule;
        for shape in &self.shapes {
            let copy = shape.borrow().clone().into_ref();
            scene.append(copy);
        }
        scene
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        for shape in &self.shapes {
            if let Ok(mut shape) = shape.try_borrow_mut() {
                shape.set_claimed(false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CommandKey;

    #[test]
    fn draw_states() {
        let mut scene = Scene::new();
        assert_eq!(scene.draw_state(), DrawState::Ready);

        let shape = scene.begin_path();
        assert_eq!(scene.draw_state(), DrawState::ShapeOpen);
        assert!(std::rc::Rc::ptr_eq(&scene.begin_path(), &shape));

        scene.move_to(0.0, 0.0);
        scene.line_to(5.0, 0.0);
        assert_eq!(scene.draw_state(), DrawState::ContourOpen);

        scene.move_to(0.0, 5.0);
        scene.line_to(5.0, 5.0);
        assert_eq!(shape.borrow().num_contours(), 2);

        scene.stroke();
        assert_eq!(scene.draw_state(), DrawState::Ready);
        assert_eq!(scene.num_shapes(), 1);
        assert!(!shape.borrow().contours()[1].borrow().is_closed());
        assert_eq!(shape.borrow().stroke().width, 3.0);
        assert!(shape.borrow().has_stroke());
        assert!(!shape.borrow().has_fill());
    }

    #[test]
    fn fill_closes_the_contour() {
        let mut scene = Scene::new();
        scene.move_to(0.0, 0.0);
        scene.line_to(10.0, 0.0);
        scene.line_to(10.0, 10.0);
        scene.fill();

        let shape = scene.shape(0).unwrap();
        assert!(shape.borrow().contours()[0].borrow().is_closed());
        assert_eq!(shape.borrow().fill_paint(), Some(&Paint::rgb(0.95, 0.95, 0.95)));
        assert!(scene.hit(8.0, 2.0).is_some());
        assert!(scene.hit(2.0, 8.0).is_none());
    }

    #[test]
    fn primitives_get_their_own_contours() {
        let mut scene = Scene::new();
        scene.move_to(0.0, 0.0);
        scene.line_to(1.0, 1.0);
        let rect = scene.draw_rect(0.0, 0.0, 4.0, 4.0, 0.0, 0.0);
        let ellipse = scene.draw_ellipse(10.0, 10.0, 2.0, 2.0);
        assert_eq!(scene.draw_state(), DrawState::ShapeOpen);
        scene.fill();

        let shape = scene.shape(0).unwrap();
        assert_eq!(shape.borrow().num_contours(), 3);
        assert!(rect.borrow().is_closed() && ellipse.borrow().is_closed());
        assert_eq!(rect.borrow().command_value(0, CommandKey::Width), 4.0);
    }

    #[test]
    fn rect_edits_reach_scene_bounds() {
        let mut scene = Scene::new();
        let rect = scene.draw_rect(0.0, 0.0, 10.0, 10.0, 0.0, 0.0);
        scene.fill();
        assert_eq!(scene.bounds(), Bounds::new(0.0, 0.0, 10.0, 10.0));

        rect.borrow_mut().set_command_value(0, CommandKey::Width, 20.0);
        assert_eq!(scene.bounds(), Bounds::new(0.0, 0.0, 20.0, 10.0));
    }

    #[test]
    fn unpainted_shapes_do_not_count_for_bounds() {
        let mut scene = Scene::new();
        assert_eq!(scene.bounds(), Bounds::zero());

        scene.draw_rect(5.0, 5.0, 1.0, 1.0, 0.0, 0.0);
        scene.close_path(true);
        assert_eq!(scene.bounds(), Bounds::zero());

        scene.set_line_width(2.0);
        scene.draw_rect(0.0, 0.0, 2.0, 2.0, 0.0, 0.0);
        scene.stroke();
        assert_eq!(scene.bounds(), Bounds::new(-1.0, -1.0, 3.0, 3.0));
    }

    #[test]
    fn added_paths_are_copied_when_claimed() {
        let mut first = Scene::new();
        first.draw_rect(0.0, 0.0, 1.0, 1.0, 0.0, 0.0);
        first.fill();
        let shape = first.shape(0).unwrap();

        let mut second = Scene::new();
        let stored = second.add_path(&shape);
        assert!(!std::rc::Rc::ptr_eq(&stored, &shape));
        assert!(stored.borrow().is_claimed());

        assert!(first.remove_path(&shape));
        assert!(!shape.borrow().is_claimed());
        let mut third = Scene::new();
        assert!(std::rc::Rc::ptr_eq(&third.add_path(&shape), &shape));
        assert!(!first.remove_path(&shape));
    }

    #[test]
    fn changes_are_fetched_by_mask() {
        let mut scene = Scene::new();
        assert!(scene.fetch_changes(ChangeFlags::INITIAL).contains(ChangeFlags::INITIAL));
        assert!(scene.fetch_changes(ChangeFlags::INITIAL).is_empty());

        let rect = scene.draw_rect(0.0, 0.0, 10.0, 10.0, 0.0, 0.0);
        scene.fill();
        scene.clear_changes(ChangeFlags::ANYTHING | ChangeFlags::PAINT_INDICES);

        rect.borrow_mut().transform(2.0, 2.0, 0.0, 0.0);
        let changes = scene.fetch_changes(ChangeFlags::ANYTHING);
        assert!(changes.contains(ChangeFlags::POINTS));
        assert!(!changes.intersects(ChangeFlags::ANY_BOUNDS | ChangeFlags::GEOMETRY));
        assert!(scene.fetch_changes(ChangeFlags::POINTS).is_empty());
    }

    #[test]
    fn hit_prefers_the_topmost_shape() {
        let mut scene = Scene::new();
        scene.draw_rect(0.0, 0.0, 10.0, 10.0, 0.0, 0.0);
        scene.fill();
        scene.draw_rect(5.0, 5.0, 10.0, 10.0, 0.0, 0.0);
        scene.fill();

        let top = scene.shape(1).unwrap();
        assert!(std::rc::Rc::ptr_eq(&scene.hit(7.0, 7.0).unwrap(), &top));
        assert!(std::rc::Rc::ptr_eq(&scene.hit(2.0, 2.0).unwrap(), &scene.shape(0).unwrap()));
        assert!(scene.hit(20.0, 20.0).is_none());
        assert!(scene.shape_by_name("missing").is_none());
    }

    #[test]
    fn paint_indices_number_lines_before_fills() {
        let mut scene = Scene::new();
        scene.draw_rect(0.0, 0.0, 1.0, 1.0, 0.0, 0.0);
        scene.fill();
        scene.stroke();
        scene.set_fill_color(Some(Paint::LinearGradient(crate::paint::Gradient::new(vec![]))));
        scene.draw_rect(2.0, 0.0, 1.0, 1.0, 0.0, 0.0);
        scene.fill();

        let indices = scene.paint_indices().clone();
        assert_eq!(indices.num_paints(), 3);
        assert_eq!(indices.num_gradients(), 1);
        assert!(!indices.all_solid());

        let first = indices.get(0).unwrap();
        assert_eq!(first.line, Some(PaintSlot { paint: 0, gradient: 0 }));
        assert_eq!(first.fill, Some(PaintSlot { paint: 1, gradient: 0 }));
        let second = indices.get(1).unwrap();
        assert_eq!(second.line, None);
        assert_eq!(second.fill, Some(PaintSlot { paint: 2, gradient: 1 }));
    }

    #[test]
    fn animate_needs_matching_scenes() {
        let mut a = Scene::new();
        a.draw_rect(0.0, 0.0, 10.0, 10.0, 0.0, 0.0);
        a.fill();
        let mut b = Scene::new();
        b.draw_rect(10.0, 10.0, 10.0, 10.0, 0.0, 0.0);
        b.fill();

        let mut target = Scene::new();
        assert!(target.animate(&a, &b, 0.5));
        assert_eq!(target.bounds(), Bounds::new(5.0, 5.0, 15.0, 15.0));

        let empty = Scene::new();
        assert!(!target.animate(&a, &empty, 0.5));
        assert_eq!(target.bounds(), Bounds::new(5.0, 5.0, 15.0, 15.0));
    }

    #[test]
    fn exact_bounds_drop_the_stroke_slack() {
        let mut scene = Scene::new();
        scene.move_to(0.0, 0.0);
        scene.line_to(10.0, 0.0);
        scene.stroke();
        scene.draw_rect(20.0, 0.0, 5.0, 5.0, 0.0, 0.0);
        scene.fill();

        assert_eq!(scene.bounds(), Bounds::new(-1.5, -1.5, 25.0, 5.0));
        let exact = scene.exact_bounds();
        assert!(exact.x0.abs() < 1e-3 && (exact.y0 + 1.5).abs() < 1e-3);
        assert_eq!((exact.x1, exact.y1), (25.0, 5.0));
    }

    #[test]
    fn set_from_copies_a_mapped_scene() {
        let mut source = Scene::new();
        source.draw_rect(0.0, 0.0, 10.0, 10.0, 0.0, 0.0);
        source.fill();
        source.draw_ellipse(0.0, 0.0, 1.0, 1.0);
        source.stroke();

        let mut target = Scene::new();
        target.draw_rect(0.0, 0.0, 1.0, 1.0, 0.0, 0.0);
        target.fill();
        let kept = target.shape(0).unwrap();
        target.clear_changes(ChangeFlags::ANYTHING);

        target.set_from(&source, 0.5, 0.5, 10.0, 0.0, false);
        assert_eq!(target.num_shapes(), 2);
        assert!(std::rc::Rc::ptr_eq(&target.shapes()[0], &kept));
        assert!(target.shapes()[1].borrow().is_claimed());
        assert_eq!(target.shapes()[1].borrow().stroke().width, 3.0);
        assert_eq!(target.shapes()[0].borrow_mut().bounds(), Some(Bounds::new(5.0, 0.0, 10.0, 5.0)));

        let bounds = target.bounds();
        assert!((bounds.x0 - 3.0).abs() < 1e-4 && (bounds.y0 + 2.0).abs() < 1e-4);
        assert_eq!((bounds.x1, bounds.y1), (10.0, 5.0));
        assert!(target.fetch_changes(ChangeFlags::ANYTHING).contains(ChangeFlags::GEOMETRY));

        target.set_from(&source, 0.5, 0.5, 0.0, 0.0, true);
        assert_eq!(target.shapes()[1].borrow().stroke().width, 1.5);
    }

    #[test]
    fn clones_are_deep() {
        let mut scene = Scene::new();
        scene.draw_rect(0.0, 0.0, 1.0, 1.0, 0.0, 0.0);
        scene.fill();
        let copy = scene.clone();

        assert_eq!(copy.num_shapes(), 1);
        assert!(!std::rc::Rc::ptr_eq(&copy.shapes()[0], &scene.shapes()[0]));
        assert!(copy.shapes()[0].borrow().is_claimed());
    }
}
