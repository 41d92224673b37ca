//! Addressing of the Growable Array.
//!
//! Maps the logical index of an element to the bucket it lives in, and its
//! offset within this bucket.
//!
//! Bucket `b` holds `FIRST_BUCKET_SIZE << b` elements, so that each bucket
//! holds as many elements as all the buckets before it, plus 2. Adding a
//! bucket never moves an element already written.
//!
//! The computation relies on a single observation: shifting every index by
//! `FIRST_BUCKET_SIZE`, the highest set bit of the shifted index identifies
//! the bucket, and the remaining bits are the offset within the bucket.
//!
//! ```
//! use growable::addressing::{self, BucketIndex, ElementIndex, InnerIndex};
//!
//! assert_eq!(Some((BucketIndex(0), InnerIndex(0))), addressing::indexes(ElementIndex(0)));
//! assert_eq!(Some((BucketIndex(0), InnerIndex(1))), addressing::indexes(ElementIndex(1)));
//! assert_eq!(Some((BucketIndex(1), InnerIndex(0))), addressing::indexes(ElementIndex(2)));
//! assert_eq!(Some((BucketIndex(2), InnerIndex(7))), addressing::indexes(ElementIndex(13)));
//! ```

use std::mem;

/// The capacity of the first bucket.
pub const FIRST_BUCKET_SIZE: usize = 2;

/// The largest number of buckets whose total capacity fits in `usize`.
pub const MAX_BUCKETS: usize = USIZE_BITS - 2;

/// The capacity of a Bucket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BucketCapacity(pub usize);

/// The index of a Bucket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct BucketIndex(pub usize);

/// The (global) index of an element.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ElementIndex(pub usize);

/// The index of an element within a Bucket.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct InnerIndex(pub usize);

/// The number of elements.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Length(pub usize);

/// The number of Buckets.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NumberBuckets(pub usize);

/// Returns the index of the Bucket in which the element lives.
///
/// Returns `None` if the index is so large that no bucket could ever hold it.
pub fn bucket_of(index: ElementIndex) -> Option<BucketIndex> {
    let position = index.0.checked_add(FIRST_BUCKET_SIZE)?;

    //  position >= FIRST_BUCKET_SIZE, hence its log2 is at least 1.
    Some(BucketIndex(floor_log2(position) - FIRST_BUCKET_LOG2))
}

/// Returns the offset of the element within its Bucket.
///
/// `bucket` is expected to be `bucket_of(index)`.
pub fn offset_of(index: ElementIndex, bucket: BucketIndex) -> InnerIndex {
    debug_assert_eq!(Some(bucket), bucket_of(index));

    InnerIndex((index.0 + FIRST_BUCKET_SIZE) ^ (1usize << (bucket.0 + FIRST_BUCKET_LOG2)))
}

/// Returns the index of the Bucket, and within the Bucket.
pub fn indexes(index: ElementIndex) -> Option<(BucketIndex, InnerIndex)> {
    let bucket = bucket_of(index)?;

    Some((bucket, offset_of(index, bucket)))
}

/// Returns the capacity of a given bucket.
///
/// #   Panics
///
/// Panics if `bucket` is greater than `MAX_BUCKETS`, as its capacity would overflow `usize`.
pub fn of_bucket(bucket: BucketIndex) -> BucketCapacity {
    assert!(bucket.0 <= MAX_BUCKETS, "No such bucket: {} > {}", bucket.0, MAX_BUCKETS);

    BucketCapacity(FIRST_BUCKET_SIZE << bucket.0)
}

/// Returns the capacity of all buckets before a given bucket.
///
/// This is also the index of the first element of `bucket`.
///
/// #   Panics
///
/// Panics if `bucket` is greater than `MAX_BUCKETS`.
pub fn before_bucket(bucket: BucketIndex) -> BucketCapacity {
    BucketCapacity(of_bucket(bucket).0 - FIRST_BUCKET_SIZE)
}

/// Returns the total capacity of the first `number` buckets.
///
/// #   Panics
///
/// Panics if `number` is greater than `MAX_BUCKETS`.
pub fn max_capacity(number: NumberBuckets) -> usize {
    before_bucket(BucketIndex(number.0)).0
}

/// Returns the number of buckets necessary to accomodate `length` elements.
pub fn number_buckets(length: Length) -> NumberBuckets {
    if length.0 == 0 {
        return NumberBuckets(0);
    }

    //  The last index may itself be beyond any bucket.
    match bucket_of(ElementIndex(length.0 - 1)) {
        Some(bucket) => NumberBuckets(bucket.0 + 1),
        None => NumberBuckets(MAX_BUCKETS + 1),
    }
}

//
//  Implementation Details
//

//  Number of bits in usize.
const USIZE_BITS: usize = mem::size_of::<usize>() * 8;

//  log2 of FIRST_BUCKET_SIZE.
const FIRST_BUCKET_LOG2: usize = 1;

//  Returns the log2 of n, rounded down to the previous integer.
//
//  For practical purposes, the log2 of 0 is defined as 0.
fn floor_log2(n: usize) -> usize {
    match n {
        0 | 1 => 0,
        _ => USIZE_BITS - 1 - n.leading_zeros() as usize,
    }
}
