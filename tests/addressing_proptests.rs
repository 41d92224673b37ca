//! Property-based tests for the `addressing` module.
//!
//! These tests verify that the mapping from element index to (bucket, offset)
//! is a bijection onto the slots of the buckets, for any index.

use growable::addressing::{
    before_bucket, indexes, max_capacity, number_buckets, of_bucket, BucketIndex, ElementIndex,
    InnerIndex, Length, NumberBuckets, MAX_BUCKETS,
};
use proptest::prelude::*;

// ============================================================================
//  Strategies
// ============================================================================

/// Strategy for any index which some bucket may hold.
fn addressable_index() -> impl Strategy<Value = usize> {
    0..(usize::MAX - 3)
}

/// Strategy for small indexes, within the first few buckets.
fn small_index() -> impl Strategy<Value = usize> {
    0usize..4096
}

// ============================================================================
//  Addressing Properties
// ============================================================================

proptest! {
    /// The offset always lies within the bucket.
    #[test]
    fn offset_within_bucket(index in addressable_index()) {
        let (bucket, offset) = indexes(ElementIndex(index)).unwrap();

        prop_assert!(bucket.0 <= MAX_BUCKETS);
        prop_assert!(offset.0 < of_bucket(bucket).0);
    }

    /// The index is recovered from the first index of the bucket and the offset.
    #[test]
    fn index_is_recovered(index in addressable_index()) {
        let (bucket, offset) = indexes(ElementIndex(index)).unwrap();

        prop_assert_eq!(index, before_bucket(bucket).0 + offset.0);
    }

    /// Consecutive indexes are consecutive slots, spilling into the next bucket.
    #[test]
    fn consecutive_indexes(index in addressable_index()) {
        let (bucket, offset) = indexes(ElementIndex(index)).unwrap();
        let (next_bucket, next_offset) = indexes(ElementIndex(index + 1)).unwrap();

        if offset.0 + 1 < of_bucket(bucket).0 {
            prop_assert_eq!(bucket, next_bucket);
            prop_assert_eq!(InnerIndex(offset.0 + 1), next_offset);
        } else {
            prop_assert_eq!(BucketIndex(bucket.0 + 1), next_bucket);
            prop_assert_eq!(InnerIndex(0), next_offset);
        }
    }

    /// Each bucket doubles the capacity of the previous one.
    #[test]
    fn buckets_double(bucket in 1usize..MAX_BUCKETS) {
        prop_assert_eq!(2 * of_bucket(BucketIndex(bucket - 1)).0, of_bucket(BucketIndex(bucket)).0);
    }

    /// The number of buckets is the least sufficient to hold the length.
    #[test]
    fn number_buckets_is_minimal(length in 1usize..(1 << 40)) {
        let number = number_buckets(Length(length));

        prop_assert!(number.0 >= 1);
        prop_assert!(max_capacity(number) >= length);
        prop_assert!(max_capacity(NumberBuckets(number.0 - 1)) < length);
    }

    /// An element is in the bucket past all the elements of the previous buckets.
    #[test]
    fn bucket_follows_previous(index in small_index()) {
        let (bucket, _) = indexes(ElementIndex(index)).unwrap();

        prop_assert!(before_bucket(bucket).0 <= index);
        prop_assert!(index < before_bucket(BucketIndex(bucket.0 + 1)).0);
    }
}

// ============================================================================
//  Edge Cases
// ============================================================================

#[test]
fn first_elements() {
    assert_eq!(Some((BucketIndex(0), InnerIndex(0))), indexes(ElementIndex(0)));
    assert_eq!(Some((BucketIndex(0), InnerIndex(1))), indexes(ElementIndex(1)));
    assert_eq!(Some((BucketIndex(1), InnerIndex(0))), indexes(ElementIndex(2)));
}

#[test]
fn unaddressable_elements() {
    assert_eq!(None, indexes(ElementIndex(usize::MAX)));
    assert_eq!(None, indexes(ElementIndex(usize::MAX - 1)));
}
