//! An Iterator over the Growable Array.

use std::iter;

use crossbeam_epoch::Guard;

use super::GrowableArray;

/// `Iter`
///
/// Iterates over the first `len()` elements of the array, as of the creation of the iterator.
///
/// Each element is read when reached, hence may reflect an update performed after the creation of the iterator.
pub struct Iter<'g, T, const N: usize> {
    array: &'g GrowableArray<T, N>,
    guard: &'g Guard,
    index: usize,
    length: usize,
}

impl<'g, T, const N: usize> Iter<'g, T, N> {
    //  Creates a new instance, over the first `length` elements.
    pub(crate) fn new(array: &'g GrowableArray<T, N>, length: usize, guard: &'g Guard) -> Self {
        Self { array, guard, index: 0, length }
    }
}

impl<'g, T, const N: usize> Iterator for Iter<'g, T, N> {
    type Item = &'g T;

    fn next(&mut self) -> Option<&'g T> {
        if self.index >= self.length {
            return None;
        }

        //  The length never decreases, hence the element is always there.
        let result = self.array.get(self.index, self.guard).ok();
        self.index += 1;

        result
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.length.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<'g, T, const N: usize> iter::FusedIterator for Iter<'g, T, N> {}
