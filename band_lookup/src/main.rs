use band_lookup::{Axis, BandBuilder, BandIndex, CurveSpan, IgnoreMask, SweepEvents};

fn main() {
    let spans = [
        CurveSpan::new(0, 0.0, 40.0),
        CurveSpan::new(1, 10.0, 25.0).with_marks(&[18.0]),
        CurveSpan::new(2, 20.0, 35.0).with_ignore(IgnoreMask::LINE),
        CurveSpan::new(3, 35.0, 35.0),
    ];

    let events = SweepEvents::from_spans(&spans);
    let mut index = BandIndex::new(spans.len());
    let mut builder = BandBuilder::new(spans.len());

    for (target, padding) in [(IgnoreMask::FILL, 0.0), (IgnoreMask::LINE, 2.5)] {
        let filled = builder.build(Axis::X, &events, target, padding, &mut index);
        println!("{:?} with padding {}: {} boundaries", target, padding, filled);
        for (row, coord) in index.lookup(Axis::X).as_slice().iter().enumerate() {
            println!("  {:>6.2} {:?}", coord, index.row(Axis::X, row));
        }
        println!();
    }
}
