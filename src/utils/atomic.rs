//! Atomics with a fixed memory ordering.
//!
//! Each type picks the ordering of its loads and stores once and for all, so
//! that every access site of a given flag reads the same, and the pairing of
//! Release stores with Acquire loads can be audited in one place.

use std::sync::atomic::{AtomicBool, Ordering};

macro_rules! atomic {
    ($name:ident, $underlying:ident, $raw:ident, $load_ordering:expr, $store_ordering:expr) => {
        pub struct $name($underlying);

        impl $name {
            pub fn new(v: $raw) -> Self { Self($underlying::new(v)) }
            pub fn load(&self) -> $raw { self.0.load($load_ordering) }
            pub fn store(&self, v: $raw) { self.0.store(v, $store_ordering); }
        }
    }
}

atomic!{ AcqRelBool, AtomicBool, bool, Ordering::Acquire, Ordering::Release }
