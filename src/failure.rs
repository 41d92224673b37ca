//! The Failure and Result types of this library.
//!
//! Failures are synchronous, and never caused by contention: contention only
//! ever causes an operation to retry internally. A failed operation leaves
//! the array unchanged.
//!
//! Fallible methods which add elements come in two versions:
//!
//! -   A faillible `try_xxx` version, which returns a `Result` with `Failure` as the error type.
//! -   A convenience `xxx` version, which invokes the `try_xxx` version and panics in case of error.
//!
//! Removal and insertion at an arbitrary position are not offered at all, rather than offered and failing.

use std::{error, fmt, result};

/// Universal Failure type of this library.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Failure {
    /// The index is not below the current length.
    IndexOutOfRange,
    /// All buckets are installed and full, no further element can be appended.
    CapacityExceeded,
}

impl error::Error for Failure {}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Universal Result type of this library.
pub type Result<T> = result::Result<T, Failure>;

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn failure_display() {
        assert_eq!("IndexOutOfRange", format!("{}", Failure::IndexOutOfRange));
        assert_eq!("CapacityExceeded", format!("{}", Failure::CapacityExceeded));
    }

    #[test]
    fn failure_is_error() {
        fn as_error(failure: Failure) -> Box<dyn error::Error> { Box::new(failure) }

        assert_eq!("CapacityExceeded", as_error(Failure::CapacityExceeded).to_string());
    }
}
