use crate::Generation;

/// A derived value together with the generation of the data it was derived
/// from.
#[derive(Debug, Clone)]
pub(crate) struct Cache<T> {
    slot: Option<(Generation, T)>,
}

impl<T> Default for Cache<T> {
    fn default() -> Self { Self { slot: None } }
}

impl<T> Cache<T> {
    pub(crate) fn is_valid(&self, generation: Generation) -> bool {
        matches!(self.slot, Some((cached, _)) if cached == generation)
    }

    pub(crate) fn get_or_update(&mut self, generation: Generation, compute: impl FnOnce() -> T) -> &T {
        if !self.is_valid(generation) {
            self.slot = Some((generation, compute()));
        }
        match &self.slot {
            Some((_, value)) => value,
            None => unreachable!(),
        }
    }

    /// Re-stamps a value that is still valid for `from` as valid for `to`,
    /// mapping it on the way.
    pub(crate) fn carry(&mut self, from: Generation, to: Generation, f: impl FnOnce(T) -> T) {
        self.slot = match self.slot.take() {
            Some((cached, value)) if cached == from => Some((to, f(value))),
            _ => None,
        };
    }
}
