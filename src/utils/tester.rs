//! Internal testing utilities

use std::sync::atomic::{AtomicUsize, Ordering};

//  SpyCount
//
//  A counter of the number of instances of elements.
pub struct SpyCount(AtomicUsize);

impl SpyCount {
    pub const fn zero() -> Self { SpyCount(AtomicUsize::new(0)) }

    pub fn get(&self) -> usize { self.0.load(Ordering::Relaxed) }

    fn decrement(&self) { self.0.fetch_sub(1, Ordering::Relaxed); }

    fn increment(&self) { self.0.fetch_add(1, Ordering::Relaxed); }
}

//  Spy Element
//
//  An element tracking the number of instances, helpful to ensure proper drop.
pub struct SpyElement<'a> {
    count: &'a SpyCount,
}

impl<'a> SpyElement<'a> {
    pub fn new(count: &'a SpyCount) -> Self {
        count.increment();
        SpyElement { count }
    }
}

impl<'a> Drop for SpyElement<'a> {
    fn drop(&mut self) {
        self.count.decrement();
    }
}
