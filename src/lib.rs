//  Lints
#![allow(clippy::module_inception)]

//! #   The Growable Library
//!
//! A lock-free, concurrently growable array.
//! -   The `GrowableArray`: an append-only array, with concurrent append, indexed read and update.
//!
//! Appends are lock-free, reads and updates are wait-free; elements are never moved once written.

pub mod addressing;
pub mod array;
pub mod failure;

mod utils;

use self::utils::atomic;
use self::utils::logging;
