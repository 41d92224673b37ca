//! The Descriptor of the array, and its WriteOperation.
//!
//! The `Descriptor` is the single atomically swapped record of the array: it
//! holds the logical length, including the latest append, and the
//! `WriteOperation` of this latest append.
//!
//! A `WriteOperation` records which slot to write and which element to write
//! into it; the slot is always expected to be empty beforehand. Its only
//! mutable part is the pending flag, which flips from pending to completed
//! once the element has landed in its slot.

use crossbeam_epoch::{Atomic, Guard, Owned, Shared};

use std::sync::atomic::Ordering;

use super::addressing::{ElementIndex, Length};
use super::atomic::AcqRelBool;

//  The in-flight write of an append.
//
//  The element is not owned by the operation: once published, it is owned by
//  the slot it is written to.
pub struct WriteOperation<T> {
    index: ElementIndex,
    element: Atomic<T>,
    pending: AcqRelBool,
}

impl<T> WriteOperation<T> {
    //  Creates a pending operation, writing `element` at `index`.
    pub fn pending(index: ElementIndex, element: Owned<T>) -> Self {
        Self { index, element: Atomic::from(element), pending: AcqRelBool::new(true) }
    }

    //  Creates an operation with nothing left to write.
    pub fn completed() -> Self {
        Self { index: ElementIndex(0), element: Atomic::null(), pending: AcqRelBool::new(false) }
    }

    //  Returns the index of the slot to write to.
    pub fn index(&self) -> ElementIndex { self.index }

    //  Returns the element to write.
    pub fn element<'g>(&self, guard: &'g Guard) -> Shared<'g, T> {
        //  The element was written before the operation was published.
        self.element.load(Ordering::Relaxed, guard)
    }

    //  Returns whether the element may not have landed yet.
    pub fn is_pending(&self) -> bool { self.pending.load() }

    //  Marks the operation as completed.
    //
    //  May be called any number of times, by any number of threads.
    pub fn complete(&self) { self.pending.store(false) }
}

//  The published state of the array.
pub struct Descriptor<T> {
    size: Length,
    operation: WriteOperation<T>,
}

impl<T> Descriptor<T> {
    //  Creates the descriptor of an empty array.
    pub fn empty() -> Self {
        Self { size: Length(0), operation: WriteOperation::completed() }
    }

    //  Creates the descriptor of the append of `element` to an array of
    //  `size` elements.
    pub fn append(size: Length, element: Owned<T>) -> Self {
        Self {
            size: Length(size.0 + 1),
            operation: WriteOperation::pending(ElementIndex(size.0), element),
        }
    }

    //  Re-targets an unpublished append to an array of `size` elements.
    pub fn retarget(&mut self, size: Length) {
        debug_assert!(self.operation.is_pending());

        self.size = Length(size.0 + 1);
        self.operation.index = ElementIndex(size.0);
    }

    //  Returns the size, including the pending write, if any.
    pub fn size(&self) -> Length { self.size }

    //  Returns the size, excluding the pending write, if any.
    pub fn len(&self) -> Length {
        if self.operation.is_pending() {
            Length(self.size.0 - 1)
        } else {
            self.size
        }
    }

    //  Returns the latest write.
    pub fn operation(&self) -> &WriteOperation<T> { &self.operation }

    //  Returns the element of an unpublished descriptor.
    //
    //  #   Safety
    //
    //  -   Assumes the descriptor was never published.
    pub unsafe fn into_element(self) -> Option<Owned<T>> {
        let element = self.operation.element;

        //  Safety:
        //  -   Never published, hence the element is still owned by `self`.
        unsafe {
            if element.load(Ordering::Relaxed, crossbeam_epoch::unprotected()).is_null() {
                None
            } else {
                Some(element.into_owned())
            }
        }
    }
}
