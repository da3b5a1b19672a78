use crate::{
    geom::{Bounds, Vec2},
    model::{ContourRef, LineCap, LineJoin, StrokeStyle},
};
use lyon::{
    path::Path,
    tessellation::{
        GeometryBuilder,
        GeometryBuilderError,
        StrokeGeometryBuilder,
        StrokeOptions,
        StrokeTessellator,
        StrokeVertex,
        VertexId,
    },
};

/// Collects the extent of the tessellated stroke instead of its triangles.
#[derive(Default)]
struct BoundsBuilder {
    bounds: Option<Bounds>,
    vertices: u32,
}

impl GeometryBuilder for BoundsBuilder {
    fn add_triangle(&mut self, _a: VertexId, _b: VertexId, _c: VertexId) {}

    fn abort_geometry(&mut self) {
        self.bounds = None;
        self.vertices = 0;
    }
}

impl StrokeGeometryBuilder for BoundsBuilder {
    fn add_stroke_vertex(&mut self, vertex: StrokeVertex) -> Result<VertexId, GeometryBuilderError> {
        let position: Vec2 = vertex.position().into();
        self.bounds = Some(match self.bounds {
            Some(bounds) => bounds.including(position),
            None => Bounds::from_point(position),
        });
        self.vertices += 1;
        Ok(VertexId(self.vertices - 1))
    }
}

fn stroke_options(style: &StrokeStyle) -> StrokeOptions {
    let join = match style.join {
        LineJoin::Miter => lyon::tessellation::LineJoin::Miter,
        LineJoin::Round => lyon::tessellation::LineJoin::Round,
        LineJoin::Bevel => lyon::tessellation::LineJoin::Bevel,
    };
    let cap = match style.cap {
        LineCap::Butt => lyon::tessellation::LineCap::Butt,
        LineCap::Round => lyon::tessellation::LineCap::Round,
        LineCap::Square => lyon::tessellation::LineCap::Square,
    };
    StrokeOptions::default()
        .with_line_width(style.width)
        .with_line_join(join)
        .with_line_cap(cap)
        .with_miter_limit(style.miter_limit.max(StrokeOptions::MINIMUM_MITER_LIMIT))
        .with_tolerance(0.01)
}

/// Bounds of the outline a stroke with `style` covers around `contours`.
/// Dashes are ignored since they only take parts of the outline away.
/// `None` when there is nothing to stroke or the tessellation fails.
pub(crate) fn stroke_bounds(contours: &[ContourRef], style: &StrokeStyle) -> Option<Bounds> {
    let mut builder = Path::builder();
    let mut empty = true;
    for contour in contours {
        let mut contour = contour.borrow_mut();
        let closed = contour.is_closed();
        let points = contour.points();
        let first = match points.first() {
            Some(&first) => first,
            None => continue,
        };

        builder.begin(first.into());
        for w in points.windows(4).step_by(3) {
            builder.cubic_bezier_to(w[1].into(), w[2].into(), w[3].into());
        }
        builder.end(closed);
        empty = false;
    }
    if empty {
        return None;
    }

    let path = builder.build();
    let mut bounds = BoundsBuilder::default();
    match StrokeTessellator::new().tessellate_path(&path, &stroke_options(style), &mut bounds) {
        Ok(()) => bounds.bounds,
        Err(error) => {
            log::warn!("could not tessellate stroke outline: {:?}", error);
            None
        }
    }
}
