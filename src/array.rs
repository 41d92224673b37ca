//! #   The Growable Array.
//!
//! The `GrowableArray` is a concurrent array which any number of threads may
//! append to, read, and update at once, without ever taking a lock.
//!
//! ##  Under the covers.
//!
//! Under the covers the `GrowableArray` is a fixed-size table of buckets:
//! arrays of atomic slots of exponential capacity, 2, 4, 8, ... Growing
//! installs a new bucket, and never moves existing elements.
//!
//! Appending publishes a new descriptor, holding the new length and the
//! pending write of the new element, with a single compare-and-swap. Any
//! thread which finds a pending write lands it before publishing its own
//! append, so that a stalled thread never holds up the others.
//!
//! The main consequences are:
//!
//! -   Appends are lock-free, reads and updates are wait-free.
//! -   Once constructed, the maximum capacity is fixed and cannot be
//!     increased; appending beyond it fails with `CapacityExceeded`.
//! -   Elements cannot be removed, nor inserted anywhere but at the back.
//!
//! #   Example: basic
//!
//! ```
//! use growable::array::GrowableArray;
//!
//! let array: GrowableArray<_> = GrowableArray::new();
//! array.push("a");
//! array.push("b");
//! array.push("c");
//!
//! assert_eq!(3, array.len());
//!
//! let guard = array.guard();
//! assert_eq!(Ok(&"b"), array.get(1, &guard));
//!
//! for x in array.iter(&guard) {
//!     println!("{}", x);
//! }
//! ```
//!
//! #   Example: updating elements
//!
//! `set` replaces an element, returning the previous one. The previous
//! element remains readable as long as the guard lives.
//!
//! ```
//! use growable::array::GrowableArray;
//!
//! let array: GrowableArray<_> = GrowableArray::new();
//! array.extend(["a".to_string(), "b".to_string()]);
//!
//! let guard = array.guard();
//! let previous = array.set(0, "x".to_string(), &guard).unwrap();
//!
//! assert_eq!("a", previous.as_str());
//! assert_eq!(Ok(&"x".to_string()), array.get(0, &guard));
//! ```
//!
//! #   Example: sharing is caring
//!
//! ```
//! use std::thread;
//!
//! use growable::array::GrowableArray;
//!
//! let array: GrowableArray<_> = GrowableArray::new();
//!
//! thread::scope(|scope| {
//!     for t in 0..4 {
//!         let array = &array;
//!         scope.spawn(move || {
//!             for i in 0..100 {
//!                 array.push(t * 100 + i);
//!             }
//!         });
//!     }
//! });
//!
//! assert_eq!(400, array.len());
//! ```

mod array;
mod buckets;
mod descriptor;
mod iterator;

pub use self::array::{GrowableArray, DEFAULT_BUCKETS};
pub use self::iterator::Iter;

use super::addressing;
use super::atomic;
use super::failure;
use super::logging;
