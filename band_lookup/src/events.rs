use crate::{CurveSpan, Event, EventKind, IgnoreMask};
use ordered_float::OrderedFloat;

/// Sweep events of one axis, sorted by coordinate and then by kind so that
/// every curve entering at a coordinate is seen before the curves leaving
/// there.
#[derive(Clone, Debug)]
pub struct SweepEvents {
    events: Vec<Event>,
    ignore: Vec<IgnoreMask>,
}

impl SweepEvents {
    pub fn from_spans<'a>(spans: impl IntoIterator<Item = &'a CurveSpan>) -> Self {
        let mut events = Vec::new();
        let mut ignore = vec![IgnoreMask::NONE; 256];

        for span in spans {
            if !(span.min.is_finite() && span.max.is_finite()) {
                log::warn!("dropping curve {} with non finite extent {:?}", span.curve, span);
                continue;
            }
            let (min, max) =
                if span.min <= span.max { (span.min, span.max) } else { (span.max, span.min) };

            ignore[span.curve as usize] = span.ignore;
            events.push(Event { coord: min, kind: EventKind::Enter, curve: span.curve });
            events.push(Event { coord: max, kind: EventKind::Exit, curve: span.curve });
            for &mark in &span.marks {
                if mark > min && mark < max {
                    events.push(Event { coord: mark, kind: EventKind::Mark, curve: span.curve });
                }
            }
        }

        events.sort_by_key(|event| (OrderedFloat(event.coord), event.kind, event.curve));

        Self { events, ignore }
    }

    pub fn events(&self) -> &[Event] { &self.events }

    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    pub fn ignore_of(&self, curve: u8) -> IgnoreMask { self.ignore[curve as usize] }

    pub fn distinct_coords(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for event in &self.events {
            if last != Some(event.coord) {
                count += 1;
                last = Some(event.coord);
            }
        }
        count
    }

    /// Groups the events by coordinate, in ascending order.
    pub fn groups(&self) -> impl Iterator<Item = (f32, &[Event])> {
        let mut rest = &self.events[..];
        std::iter::from_fn(move || {
            let coord = rest.first()?.coord;
            let len = rest.iter().take_while(|event| event.coord == coord).count();
            let (group, tail) = rest.split_at(len);
            rest = tail;
            Some((coord, group))
        })
    }
}
