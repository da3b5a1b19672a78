//! A flattened copy of a scene in the shape of an SVG parser's output: shapes
//! and their paths linked through `next` indices instead of owned vectors.

use crate::{
    geom::{Bounds, Vec2},
    model::{FillRule, ShapeRef, StrokeStyle},
    paint::Paint,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedShape {
    pub name: String,
    pub fill: Option<Paint>,
    pub line: Option<Paint>,
    pub stroke: StrokeStyle,
    pub fill_rule: FillRule,
    pub opacity: f32,
    pub bounds: Option<Bounds>,
    pub first_contour: Option<usize>,
    pub next: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkedContour {
    pub points: Vec<Vec2>,
    pub closed: bool,
    pub bounds: Option<Bounds>,
    pub next: Option<usize>,
}

impl LinkedContour {
    pub fn flat_points(&self) -> &[f32] { bytemuck::cast_slice(&self.points) }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteropChain {
    pub shapes: Vec<LinkedShape>,
    pub contours: Vec<LinkedContour>,
}

impl InteropChain {
    /// Links `shapes` in order. Contours without points are left out.
    pub fn from_shapes(shapes: &[ShapeRef]) -> Self {
        let mut chain = Self::default();

        for shape in shapes {
            let mut shape = shape.borrow_mut();
            let first_contour = chain.contours.len();
            let mut previous: Option<usize> = None;
            for contour in shape.contours() {
                let mut contour = contour.borrow_mut();
                if contour.is_empty() {
                    continue;
                }
                let index = chain.contours.len();
                if let Some(previous) = previous {
                    chain.contours[previous].next = Some(index);
                }
                previous = Some(index);

                let bounds = contour.bounds();
                chain.contours.push(LinkedContour {
                    points: contour.points().to_vec(),
                    closed: contour.is_closed(),
                    bounds,
                    next: None,
                });
            }
            let has_contours = chain.contours.len() > first_contour;

            let next = chain.shapes.len();
            if let Some(previous) = chain.shapes.last_mut() {
                previous.next = Some(next);
            }
            let bounds = shape.bounds();
            chain.shapes.push(LinkedShape {
                name: shape.name().to_string(),
                fill: shape.fill_paint().cloned(),
                line: shape.line_paint().cloned(),
                stroke: shape.stroke().clone(),
                fill_rule: shape.fill_rule(),
                opacity: shape.opacity(),
                bounds,
                first_contour: if has_contours { Some(first_contour) } else { None },
                next: None,
            });
        }

        log::debug!("linked {} shapes with {} contours", chain.shapes.len(), chain.contours.len());
        chain
    }

    pub fn first_shape(&self) -> Option<usize> { if self.shapes.is_empty() { None } else { Some(0) } }

    /// Shape indices in link order.
    pub fn shape_indices(&self) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(self.first_shape(), move |&i| self.shapes[i].next)
    }

    /// Contours of `shape` in link order; none for an unknown shape.
    pub fn contours_of(&self, shape: usize) -> impl Iterator<Item = &LinkedContour> + '_ {
        let first = self.shapes.get(shape).and_then(|shape| shape.first_contour);
        std::iter::successors(first, move |&i| self.contours[i].next)
            .map(move |i| &self.contours[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Contour, Shape};

    #[test]
    fn empty_contours_are_skipped() {
        let mut a = Shape::named("a");
        let mut rect = Contour::new();
        rect.draw_rect(0.0, 0.0, 2.0, 2.0, 0.0, 0.0);
        a.add_contour(&Contour::new().into_ref());
        a.add_contour(&rect.into_ref());
        let mut ellipse = Contour::new();
        ellipse.draw_ellipse(5.0, 5.0, 1.0, 1.0);
        a.add_contour(&ellipse.into_ref());

        let mut b = Shape::named("b");
        b.add_contour(&Contour::new().into_ref());

        let chain = InteropChain::from_shapes(&[a.into_ref(), b.into_ref()]);
        assert_eq!(chain.shape_indices().collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(chain.contours.len(), 2);
        assert_eq!(chain.contours_of(0).count(), 2);
        assert_eq!(chain.contours_of(1).count(), 0);
        assert_eq!(chain.shapes[1].first_contour, None);
        assert_eq!(chain.contours_of(7).count(), 0);
        assert_eq!(chain.shapes[0].next, Some(1));
        assert_eq!(chain.contours[0].next, Some(1));

        let first = chain.contours_of(0).next().unwrap();
        assert!(first.closed);
        assert_eq!(first.flat_points().len(), 26);
        assert_eq!(first.bounds, Some(Bounds::new(0.0, 0.0, 2.0, 2.0)));
    }
}
