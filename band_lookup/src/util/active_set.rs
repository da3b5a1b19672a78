use smallvec::SmallVec;

/// The curves crossing the sweep line, kept sorted so rows come out in a
/// stable order.
#[derive(Debug, Default, Clone)]
pub(crate) struct ActiveSet {
    ids: SmallVec<[u8; 32]>,
}

impl ActiveSet {
    pub(crate) fn new() -> Self { Self { ids: SmallVec::new() } }

    pub(crate) fn insert(&mut self, id: u8) {
        if let Err(pos) = self.ids.binary_search(&id) {
            self.ids.insert(pos, id);
        }
    }

    pub(crate) fn remove(&mut self, id: u8) {
        if let Ok(pos) = self.ids.binary_search(&id) {
            self.ids.remove(pos);
        }
    }

    pub(crate) fn clear(&mut self) { self.ids.clear() }

    pub(crate) fn len(&self) -> usize { self.ids.len() }

    pub(crate) fn iter(&self) -> impl Iterator<Item = u8> + '_ { self.ids.iter().cloned() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stays_sorted_without_duplicates() {
        let mut set = ActiveSet::new();
        for id in [7, 3, 9, 3, 1] {
            set.insert(id);
        }
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3, 7, 9]);

        set.remove(7);
        set.remove(42);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3, 9]);
        assert_eq!(set.len(), 3);
    }
}
