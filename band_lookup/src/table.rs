use crate::{Axis, SENTINEL_END};
use derivative::Derivative;
use smallvec::SmallVec;

/// Upper bound of boundaries one axis can produce for `max_curves` curves:
/// enter, exit and up to two extrema per curve, plus the two padding rows.
pub fn lookup_capacity(max_curves: usize) -> usize { 4 * max_curves + 2 }

/// Monotonic boundary coordinates of one axis.
#[derive(Clone, PartialEq, Debug)]
pub struct LookupTable {
    coords: Vec<f32>,
    capacity: usize,
}

impl LookupTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { coords: Vec::with_capacity(capacity), capacity }
    }

    pub fn len(&self) -> usize { self.coords.len() }

    pub fn is_empty(&self) -> bool { self.coords.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }

    pub fn as_slice(&self) -> &[f32] { &self.coords }

    pub(crate) fn clear(&mut self) { self.coords.clear() }

    pub(crate) fn push(&mut self, coord: f32) {
        assert!(self.coords.len() < self.capacity, "lookup table overflow at {}", coord);
        assert!(self.coords.last().map_or(true, |&last| last <= coord));
        self.coords.push(coord);
    }

    /// Index of the band containing `coord`, that is the last boundary not
    /// greater than it.
    pub fn band_of(&self, coord: f32) -> Option<usize> {
        match self.coords.partition_point(|&boundary| boundary <= coord) {
            0 => None,
            n => Some(n - 1),
        }
    }
}

/// Byte rows of curve ids. Every row is `row_len` bytes wide and the ids of
/// a row end at the first [`SENTINEL_END`].
#[derive(Clone, PartialEq, Derivative)]
#[derivative(Debug)]
pub struct ListsTexture {
    #[derivative(Debug = "ignore")]
    data: Vec<u8>,
    row_len: usize,
    rows: usize,
}

impl ListsTexture {
    pub fn new(row_len: usize, rows: usize) -> Self {
        Self { data: vec![SENTINEL_END; row_len * rows], row_len, rows }
    }

    pub fn row_len(&self) -> usize { self.row_len }

    pub fn rows(&self) -> usize { self.rows }

    pub fn as_bytes(&self) -> &[u8] { &self.data }

    pub fn row(&self, row: usize) -> &[u8] {
        assert!(row < self.rows);
        &self.data[row * self.row_len..(row + 1) * self.row_len]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [u8] {
        assert!(row < self.rows);
        &mut self.data[row * self.row_len..(row + 1) * self.row_len]
    }

    pub fn ids(&self, row: usize) -> &[u8] {
        let row = self.row(row);
        let end = row.iter().position(|&id| id == SENTINEL_END).unwrap_or(row.len());
        &row[..end]
    }

    pub(crate) fn copy_row(&mut self, from: usize, to: usize) {
        assert!(from < self.rows && to < self.rows);
        self.data.copy_within(from * self.row_len..(from + 1) * self.row_len, to * self.row_len);
    }
}

/// Band index of both axes. The lists texture holds the x rows in its first
/// half and the y rows in its second half.
#[derive(Clone, Debug)]
pub struct BandIndex {
    lookup: [LookupTable; 2],
    lists: ListsTexture,
    rows_per_axis: usize,
}

impl BandIndex {
    pub fn new(max_curves: usize) -> Self {
        let capacity = lookup_capacity(max_curves);
        let rows_per_axis = capacity + 1;

        Self {
            lookup: [LookupTable::with_capacity(capacity), LookupTable::with_capacity(capacity)],
            lists: ListsTexture::new(max_curves + 1, 2 * rows_per_axis),
            rows_per_axis,
        }
    }

    pub fn lookup(&self, axis: Axis) -> &LookupTable { &self.lookup[axis.index()] }

    pub fn lists(&self) -> &ListsTexture { &self.lists }

    pub fn rows_per_axis(&self) -> usize { self.rows_per_axis }

    pub fn filled(&self, axis: Axis) -> usize { self.lookup[axis.index()].len() }

    pub fn row(&self, axis: Axis, row: usize) -> &[u8] {
        assert!(row < self.rows_per_axis);
        self.lists.ids(axis.index() * self.rows_per_axis + row)
    }

    /// Curve ids listed for the band of `axis` containing `coord`.
    pub fn candidates(&self, axis: Axis, coord: f32) -> &[u8] {
        match self.lookup(axis).band_of(coord) {
            Some(band) => self.row(axis, band),
            None => &[],
        }
    }

    /// Curves listed in both the x band of `x` and the y band of `y`.
    pub fn candidates_at(&self, x: f32, y: f32) -> SmallVec<[u8; 16]> {
        let along_y = self.candidates(Axis::Y, y);
        self.candidates(Axis::X, x).iter().filter(|id| along_y.contains(id)).cloned().collect()
    }

    pub(crate) fn clear_axis(&mut self, axis: Axis) {
        self.lookup[axis.index()].clear();
        let first = axis.index() * self.rows_per_axis;
        for row in first..first + self.rows_per_axis {
            self.lists.row_mut(row)[0] = SENTINEL_END;
        }
    }

    pub(crate) fn push_boundary(&mut self, axis: Axis, coord: f32) {
        self.lookup[axis.index()].push(coord)
    }

    pub(crate) fn row_mut(&mut self, axis: Axis, row: usize) -> &mut [u8] {
        assert!(row < self.rows_per_axis, "lists texture overflow");
        self.lists.row_mut(axis.index() * self.rows_per_axis + row)
    }

    pub(crate) fn copy_row(&mut self, axis: Axis, from: usize, to: usize) {
        let first = axis.index() * self.rows_per_axis;
        self.lists.copy_row(first + from, first + to)
    }
}
