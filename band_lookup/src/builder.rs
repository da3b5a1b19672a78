use crate::{
    util::ActiveSet,
    Axis,
    BandIndex,
    EventKind,
    IgnoreMask,
    SweepEvents,
    MAX_CURVES,
    SENTINEL_END,
};

/// Completes a row once its curve ids are written. `rest` starts right after
/// the last id and is never empty.
pub trait FinishRow: std::fmt::Debug {
    fn finish(&self, coord: f32, rest: &mut [u8]);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct EndSentinel;

impl FinishRow for EndSentinel {
    fn finish(&self, _coord: f32, rest: &mut [u8]) { rest[0] = SENTINEL_END }
}

/// Sweeps the events of one axis and writes the boundaries and rows of a
/// [`BandIndex`].
#[derive(Debug)]
pub struct BandBuilder<F = EndSentinel> {
    max_curves: usize,
    active: ActiveSet,
    finisher: F,
}

impl BandBuilder {
    pub fn new(max_curves: usize) -> Self { Self::with_finisher(max_curves, EndSentinel) }
}

impl<F: FinishRow> BandBuilder<F> {
    pub fn with_finisher(max_curves: usize, finisher: F) -> Self {
        assert!(max_curves <= MAX_CURVES, "{} curves do not fit a byte id", max_curves);
        Self { max_curves, active: ActiveSet::new(), finisher }
    }

    pub fn max_curves(&self) -> usize { self.max_curves }

    /// Rebuilds `axis` of `out` from `events`, leaving out every curve whose
    /// ignore mask intersects `target`. Every row lists the curves whose
    /// closed extent touches its boundary. A positive `padding` adds a
    /// boundary that far before the first and after the last one, carrying
    /// the rows of their neighbours. Returns the number of boundaries.
    pub fn build(
        &mut self,
        axis: Axis,
        events: &SweepEvents,
        target: IgnoreMask,
        padding: f32,
        out: &mut BandIndex,
    ) -> usize {
        assert!(self.max_curves < out.lists().row_len(), "band index rows are too narrow");
        out.clear_axis(axis);
        self.active.clear();

        let first_coord = match events.events().first() {
            Some(event) => event.coord,
            None => {
                log::trace!("no curves along {:?}", axis);
                return 0;
            }
        };
        let padded = padding > 0.0;

        let mut row = 0;
        if padded {
            out.push_boundary(axis, first_coord - padding);
            row += 1;
        }

        let mut last_coord = first_coord;
        for (coord, group) in events.groups() {
            for event in group.iter().filter(|event| event.kind == EventKind::Enter) {
                self.active.insert(event.curve);
            }
            assert!(
                self.active.len() <= self.max_curves,
                "{} active curves exceed the declared maximum of {}",
                self.active.len(),
                self.max_curves
            );

            out.push_boundary(axis, coord);
            self.write_row(axis, row, coord, events, target, out);
            row += 1;

            for event in group.iter().filter(|event| event.kind == EventKind::Exit) {
                self.active.remove(event.curve);
            }
            last_coord = coord;
        }

        if padded {
            out.push_boundary(axis, last_coord + padding);
            out.copy_row(axis, row - 1, row);
            out.copy_row(axis, 1, 0);
            row += 1;
        }

        if row < out.rows_per_axis() {
            out.row_mut(axis, row)[0] = SENTINEL_END;
        }

        log::trace!("{:?} band index: {} boundaries from {:?} to {:?}", axis, row, first_coord, last_coord);
        #[cfg(feature = "debug_dump")]
        dump(axis, out);

        row
    }

    fn write_row(
        &self,
        axis: Axis,
        row: usize,
        coord: f32,
        events: &SweepEvents,
        target: IgnoreMask,
        out: &mut BandIndex,
    ) {
        let dst = out.row_mut(axis, row);
        let mut len = 0;
        for id in self.active.iter().filter(|&id| !events.ignore_of(id).intersects(target)) {
            dst[len] = id;
            len += 1;
        }
        self.finisher.finish(coord, &mut dst[len..]);
    }
}

#[cfg(feature = "debug_dump")]
fn dump(axis: Axis, out: &BandIndex) {
    for (row, coord) in out.lookup(axis).as_slice().iter().enumerate() {
        log::debug!("{:?}[{}] @ {}: {:?}", axis, row, coord, out.row(axis, row));
    }
}
