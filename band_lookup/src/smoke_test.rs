use crate::*;

fn spans() -> Vec<CurveSpan> {
    vec![
        CurveSpan::new(0, 0.0, 4.0),
        CurveSpan::new(1, 2.0, 6.0).with_marks(&[3.0]),
        CurveSpan::new(2, 5.0, 8.0).with_ignore(IgnoreMask::LINE),
    ]
}

macro_rules! assert_bands {
    ($index:expr, $axis:expr, [$(($coord:expr, [$($id:expr),*])),* $(,)?]) => {
        let index = &$index;
        let golden: Vec<(f32, Vec<u8>)> = vec![$(($coord, vec![$($id),*])),*];
        let result: Vec<(f32, Vec<u8>)> = index
            .lookup($axis)
            .as_slice()
            .iter()
            .enumerate()
            .map(|(row, &coord)| (coord, index.row($axis, row).to_vec()))
            .collect();
        assert_eq!(result, golden);
    };
}

fn assert_rows_respect_spans(index: &BandIndex, axis: Axis, spans: &[CurveSpan]) {
    let coords = index.lookup(axis).as_slice();
    assert!(coords.windows(2).all(|pair| pair[0] <= pair[1]));

    for (row, &start) in coords.iter().enumerate() {
        let end = coords.get(row + 1).cloned().unwrap_or(f32::INFINITY);
        for id in index.row(axis, row) {
            let span = spans.iter().find(|span| span.curve == *id).unwrap();
            assert!(span.min <= end && span.max >= start, "curve {} listed in [{}, {}]", id, start, end);
        }
        let raw = index.lists().row(axis.index() * index.rows_per_axis() + row);
        assert_eq!(raw[index.row(axis, row).len()], SENTINEL_END);
    }
}

#[test]
fn smoke_test() {
    let spans = spans();
    let events = SweepEvents::from_spans(&spans);
    let mut index = BandIndex::new(spans.len());
    let mut builder = BandBuilder::new(spans.len());

    let filled = builder.build(Axis::X, &events, IgnoreMask::FILL, 0.0, &mut index);
    assert_eq!(filled, 7);
    assert_bands!(
        index,
        Axis::X,
        [
            (0.0, [0]),
            (2.0, [0, 1]),
            (3.0, [0, 1]),
            (4.0, [0, 1]),
            (5.0, [1, 2]),
            (6.0, [1, 2]),
            (8.0, [2]),
        ]
    );
    assert_rows_respect_spans(&index, Axis::X, &spans);

    builder.build(Axis::X, &events, IgnoreMask::LINE, 0.0, &mut index);
    assert_bands!(
        index,
        Axis::X,
        [
            (0.0, [0]),
            (2.0, [0, 1]),
            (3.0, [0, 1]),
            (4.0, [0, 1]),
            (5.0, [1]),
            (6.0, [1]),
            (8.0, []),
        ]
    );
}

#[test]
fn padding_rows_copy_their_neighbours() {
    let spans = spans();
    let events = SweepEvents::from_spans(&spans);
    let mut index = BandIndex::new(spans.len());

    let filled = BandBuilder::new(spans.len()).build(Axis::Y, &events, IgnoreMask::FILL, 1.0, &mut index);
    assert_eq!(filled, 9);
    assert_bands!(
        index,
        Axis::Y,
        [
            (-1.0, [0]),
            (0.0, [0]),
            (2.0, [0, 1]),
            (3.0, [0, 1]),
            (4.0, [0, 1]),
            (5.0, [1, 2]),
            (6.0, [1, 2]),
            (8.0, [2]),
            (9.0, [2]),
        ]
    );
    assert_eq!(index.filled(Axis::X), 0);
}

#[test]
fn axes_are_independent() {
    let x_spans = vec![CurveSpan::new(0, 0.0, 10.0), CurveSpan::new(1, 0.0, 10.0)];
    let y_spans = vec![CurveSpan::new(0, 0.0, 1.0), CurveSpan::new(1, 9.0, 10.0)];
    let mut index = BandIndex::new(2);
    let mut builder = BandBuilder::new(2);

    builder.build(Axis::X, &SweepEvents::from_spans(&x_spans), IgnoreMask::FILL, 0.0, &mut index);
    builder.build(Axis::Y, &SweepEvents::from_spans(&y_spans), IgnoreMask::FILL, 0.0, &mut index);

    assert_rows_respect_spans(&index, Axis::X, &x_spans);
    assert_rows_respect_spans(&index, Axis::Y, &y_spans);
    assert_eq!(&index.candidates_at(5.0, 0.5)[..], &[0]);
    assert_eq!(&index.candidates_at(5.0, 9.5)[..], &[1]);
    assert_eq!(&index.candidates_at(-1.0, 9.5)[..], &[] as &[u8]);
}

#[test]
fn dense_overlap_fills_rows_to_capacity() {
    let spans: Vec<_> = (0..MAX_CURVES).map(|id| CurveSpan::new(id as u8, 0.0, 1.0)).collect();
    let events = SweepEvents::from_spans(&spans);
    let mut index = BandIndex::new(MAX_CURVES);

    BandBuilder::new(MAX_CURVES).build(Axis::X, &events, IgnoreMask::NONE, 0.0, &mut index);

    assert_eq!(index.row(Axis::X, 0).len(), MAX_CURVES);
    assert_eq!(index.lists().row_len(), MAX_CURVES + 1);
    assert!(!index.row(Axis::X, 0).contains(&SENTINEL_STROKES));
}
