use crate::{
    curves::{CurveRecord, CurvesTexture},
    error::Result,
    geom::{Bounds, Vec2},
    model::{FillRule, LineCap, LineJoin, Shape, MAX_DASHES},
    VgError,
};
use band_lookup::{Axis, BandBuilder, BandIndex, CurveSpan, IgnoreMask, SweepEvents, MAX_CURVES};
use crevice::std430::{AsStd430, Vec4};
use derivative::Derivative;

#[derive(Derivative, Clone, PartialEq)]
#[derivative(Debug, Default(new = "true"))]
pub struct GeometrySettings {
    /// Added to the stroke reach when padding the line band index.
    #[derivative(Default(value = "1.0"))]
    pub antialias_margin: f32,
    pub fill_padding: f32,
    #[derivative(Default(value = "true"))]
    pub build_fill: bool,
    #[derivative(Default(value = "true"))]
    pub build_line: bool,
}

/// Filled lookup table lengths of both band indices and the number of
/// halving steps a binary search over a full table needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsStd430)]
pub struct LookupMeta {
    pub fill_x: u32,
    pub fill_y: u32,
    pub line_x: u32,
    pub line_y: u32,
    pub bsearch_depth: u32,
    pub curves: u32,
}

#[derive(Debug, Clone, AsStd430)]
pub struct ShapeParams {
    pub bounds: Vec4,
    /// Width, miter limit, dash offset, opacity.
    pub stroke: Vec4,
    pub dashes_lo: Vec4,
    pub dashes_hi: Vec4,
    pub dash_count: u32,
    /// Join in bits 0..2, cap in bits 2..4, even-odd in bit 4.
    pub style: u32,
}

/// Everything needed to draw one shape: the curve texture and a band index
/// per paint.
#[derive(Debug, Clone)]
pub struct ShapeGeometry {
    pub records: Vec<CurveRecord>,
    pub curves: CurvesTexture,
    pub fill: Option<BandIndex>,
    pub line: Option<BandIndex>,
    pub meta: LookupMeta,
    pub params: ShapeParams,
}

impl ShapeGeometry {
    pub fn build(shape: &mut Shape, settings: &GeometrySettings) -> Result<Self> {
        let records = collect_records(shape)?;
        if records.len() > MAX_CURVES {
            return Err(VgError::TooManyCurves { curves: records.len(), max: MAX_CURVES });
        }
        let curves = CurvesTexture::from_records(&records)?;

        let spans: [Vec<CurveSpan>; 2] = [spans_along(&records, Axis::X)?, spans_along(&records, Axis::Y)?];
        let events = [SweepEvents::from_spans(&spans[0]), SweepEvents::from_spans(&spans[1])];
        let max_curves = records.len();

        let fill = if settings.build_fill && shape.has_fill() {
            Some(build_index(&events, max_curves, IgnoreMask::FILL, settings.fill_padding))
        } else {
            None
        };
        let line = if settings.build_line && shape.has_stroke() {
            let padding = shape.stroke().reach() + settings.antialias_margin;
            Some(build_index(&events, max_curves, IgnoreMask::LINE, padding))
        } else {
            None
        };

        let filled = |index: &Option<BandIndex>, axis| index.as_ref().map_or(0, |index| index.filled(axis) as u32);
        let capacity = band_lookup::lookup_capacity(max_curves);
        let meta = LookupMeta {
            fill_x: filled(&fill, Axis::X),
            fill_y: filled(&fill, Axis::Y),
            line_x: filled(&line, Axis::X),
            line_y: filled(&line, Axis::Y),
            bsearch_depth: usize::BITS - capacity.leading_zeros(),
            curves: max_curves as u32,
        };
        let params = shape_params(shape);

        log::debug!(
            "built {} curves for shape {:?}: fill {:?}, line {:?}",
            max_curves,
            shape.name(),
            fill.as_ref().map(|index| index.filled(Axis::X) + index.filled(Axis::Y)),
            line.as_ref().map(|index| index.filled(Axis::X) + index.filled(Axis::Y)),
        );
        Ok(Self { records, curves, fill, line, meta, params })
    }

    pub fn curve_count(&self) -> usize { self.records.len() }

    pub fn meta_std430(&self) -> <LookupMeta as AsStd430>::Output { self.meta.as_std430() }

    pub fn params_std430(&self) -> <ShapeParams as AsStd430>::Output { self.params.as_std430() }
}

/// Curve records of every contour in order, each contour followed by its
/// closing curve when it is filled or closed and does not end where it
/// started.
fn collect_records(shape: &Shape) -> Result<Vec<CurveRecord>> {
    let mut records = Vec::new();
    let has_fill = shape.has_fill();

    for contour in shape.contours() {
        let mut contour = contour.borrow_mut();
        let closed = contour.is_closed();
        let points = contour.points();
        let (first, last) = match (points.first(), points.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => continue,
        };

        records
            .try_reserve(points.len() / 3 + 1)
            .map_err(|_| VgError::OutOfMemory("curve records"))?;
        let mut offset = 0.0;
        for w in points.windows(4).step_by(3) {
            let record = CurveRecord::from_points(&[w[0], w[1], w[2], w[3]], offset);
            offset += record.length;
            records.push(record);
        }
        if (has_fill || closed) && first.distance_squared(last) > 0.0 {
            records.push(CurveRecord::closing(last, first, closed, offset));
        }
    }
    Ok(records)
}

fn spans_along(records: &[CurveRecord], axis: Axis) -> Result<Vec<CurveSpan>> {
    let mut spans = Vec::new();
    spans.try_reserve(records.len()).map_err(|_| VgError::OutOfMemory("curve spans"))?;
    spans.extend(
        records
            .iter()
            .enumerate()
            .filter(|(_, record)| !record.is_degenerate())
            .map(|(curve, record)| record.span(curve as u8, axis)),
    );
    Ok(spans)
}

fn build_index(events: &[SweepEvents; 2], max_curves: usize, target: IgnoreMask, padding: f32) -> BandIndex {
    let mut index = BandIndex::new(max_curves);
    let mut builder = BandBuilder::new(max_curves);
    for axis in Axis::all().iter().copied() {
        builder.build(axis, &events[axis.index()], target, padding, &mut index);
    }
    index
}

fn vec4(v: [f32; 4]) -> Vec4 { Vec4 { x: v[0], y: v[1], z: v[2], w: v[3] } }

fn shape_params(shape: &mut Shape) -> ShapeParams {
    let bounds = shape.bounds().unwrap_or_else(|| Bounds::from_point(Vec2::zero()));
    let stroke = shape.stroke();

    let mut dashes = [0.0; MAX_DASHES];
    for (slot, &dash) in dashes.iter_mut().zip(stroke.dashes.iter()) {
        *slot = dash;
    }

    let join = match stroke.join {
        LineJoin::Miter => 0,
        LineJoin::Round => 1,
        LineJoin::Bevel => 2,
    };
    let cap = match stroke.cap {
        LineCap::Butt => 0,
        LineCap::Round => 1,
        LineCap::Square => 2,
    };
    let even_odd = (shape.fill_rule() == FillRule::EvenOdd) as u32;

    ShapeParams {
        bounds: vec4(bounds.to_array()),
        stroke: vec4([stroke.width, stroke.miter_limit, stroke.dash_offset, shape.opacity()]),
        dashes_lo: vec4([dashes[0], dashes[1], dashes[2], dashes[3]]),
        dashes_hi: vec4([dashes[4], dashes[5], dashes[6], dashes[7]]),
        dash_count: stroke.dashes.len() as u32,
        style: join | cap << 2 | even_odd << 4,
    }
}
