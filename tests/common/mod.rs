//! Common test utilities.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//!
//! #[test]
//! fn my_test() {
//!     common::init_tracing();
//!     // ... test code
//! }
//! ```
//!
//! Set `RUST_LOG` (e.g. `growable=trace`) and enable the `tracing` feature to see the events of the array.

#![allow(dead_code)]

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Ensures tracing is only initialized once across all tests.
static INIT: Once = Once::new();

/// Initialize the tracing subscriber, writing to the test output.
///
/// Safe to call multiple times - only the first call takes effect.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_thread_ids(true)
            .try_init();
    });
}

/// A distinct value for the ith element pushed by thread t.
pub fn value_of(thread: usize, i: usize, per_thread: usize) -> usize {
    thread * per_thread + i
}
