//! Internal utilities.

pub mod atomic;
pub mod logging;

#[cfg(test)]
pub mod tester;
