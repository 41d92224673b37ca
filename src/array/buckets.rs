//! The Buckets of the array.
//!
//! A `Bucket` is a fixed-capacity array of atomic slots, each slot being
//! either empty (null) or pointing to an element it owns.
//!
//! The `BucketTable` is a bounded sequence of `N` bucket slots, each
//! installed at most once and never replaced until the table is dropped.

use std::array;
use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};

use super::addressing::{self, BucketCapacity, BucketIndex, ElementIndex, InnerIndex, NumberBuckets};
use super::failure::{Failure, Result};
use super::logging::{debug_log, warn_log};

//  The storage.
pub struct BucketTable<T, const N: usize>([Atomic<Bucket<T>>; N]);

impl<T, const N: usize> BucketTable<T, N> {
    //  Returns the maximum number of buckets.
    pub fn max_buckets(&self) -> NumberBuckets { NumberBuckets(N) }

    //  Returns the number of buckets currently installed.
    //
    //  Buckets are installed in order, hence the installed buckets form a
    //  prefix of the table.
    pub fn number_buckets(&self, guard: &Guard) -> NumberBuckets {
        let result = self.0.iter()
            .position(|bucket| bucket.load(Ordering::Acquire, guard).is_null())
            .unwrap_or(N);
        NumberBuckets(result)
    }

    //  Returns the total capacity of the buckets currently installed.
    pub fn capacity(&self, guard: &Guard) -> usize {
        self.0.iter()
            //  Safety:
            //  -   An installed bucket lives as long as the table.
            .map_while(|bucket| unsafe { bucket.load(Ordering::Acquire, guard).as_ref() })
            .map(|bucket| bucket.capacity().0)
            .sum()
    }

    //  Returns the bucket, if installed.
    pub fn get<'g>(&self, bucket: BucketIndex, guard: &'g Guard) -> Option<&'g Bucket<T>> {
        let bucket = self.0.get(bucket.0)?.load(Ordering::Acquire, guard);

        //  Safety:
        //  -   An installed bucket lives as long as the table.
        unsafe { bucket.as_ref() }
    }

    //  Returns the slot of the element at `index`, if its bucket is installed.
    pub fn slot<'g>(&self, index: ElementIndex, guard: &'g Guard) -> Option<&'g Atomic<T>> {
        let (bucket, inner) = addressing::indexes(index)?;

        self.get(bucket, guard)?.slot(inner)
    }

    //  Installs the bucket covering `index`, unless already installed.
    //
    //  Returns the installed bucket, whether installed by this call or
    //  concurrently by another.
    //
    //  #   Errors
    //
    //  Returns `CapacityExceeded` if `index` lies beyond the last bucket of
    //  the table.
    pub fn allocate_if_absent<'g>(&self, index: ElementIndex, guard: &'g Guard) -> Result<&'g Bucket<T>> {
        let bucket = addressing::bucket_of(index)
            .filter(|bucket| bucket.0 < N)
            .ok_or_else(|| {
                warn_log!(index = index.0, max_buckets = N, "no bucket left to cover index");
                Failure::CapacityExceeded
            })?;

        //  Safety:
        //  -   Bounds checked above.
        let slot = unsafe { self.0.get_unchecked(bucket.0) };

        let current = slot.load(Ordering::Acquire, guard);

        //  Safety:
        //  -   An installed bucket lives as long as the table.
        if let Some(installed) = unsafe { current.as_ref() } {
            return Ok(installed);
        }

        let capacity = addressing::of_bucket(bucket);
        let candidate = Owned::new(Bucket::new(capacity));

        let installed = match slot.compare_exchange(
            Shared::null(),
            candidate,
            Ordering::AcqRel,
            Ordering::Acquire,
            guard,
        ) {
            Ok(installed) => {
                debug_log!(bucket = bucket.0, capacity = capacity.0, "bucket installed");
                installed
            },
            //  Lost the race, the candidate is dropped unseen.
            Err(error) => error.current,
        };

        //  Safety:
        //  -   Non-null, and lives as long as the table.
        Ok(unsafe { installed.deref() })
    }
}

impl<T, const N: usize> Default for BucketTable<T, N> {
    fn default() -> Self {
        Self(array::from_fn(|_| Atomic::null()))
    }
}

impl<T, const N: usize> Drop for BucketTable<T, N> {
    fn drop(&mut self) {
        for bucket in &self.0 {
            //  Safety:
            //  -   Exclusive access, per &mut self.
            unsafe {
                let bucket = bucket.load(Ordering::Relaxed, epoch::unprotected());

                if !bucket.is_null() {
                    drop(bucket.into_owned());
                }
            }
        }
    }
}

//  A single Bucket.
//
//  Owns the elements its slots point to.
pub struct Bucket<T>(Box<[Atomic<T>]>);

impl<T> Bucket<T> {
    //  Creates a bucket of empty slots.
    fn new(capacity: BucketCapacity) -> Self {
        Self((0..capacity.0).map(|_| Atomic::null()).collect())
    }

    //  Returns the capacity of the bucket.
    pub fn capacity(&self) -> BucketCapacity { BucketCapacity(self.0.len()) }

    //  Returns the slot at `inner`, if within bounds.
    pub fn slot(&self, inner: InnerIndex) -> Option<&Atomic<T>> { self.0.get(inner.0) }
}

impl<T> Drop for Bucket<T> {
    fn drop(&mut self) {
        for slot in self.0.iter() {
            //  Safety:
            //  -   Exclusive access, per &mut self.
            //  -   A non-null slot owns its element.
            unsafe {
                let element = slot.load(Ordering::Relaxed, epoch::unprotected());

                if !element.is_null() {
                    drop(element.into_owned());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {

use super::*;

use crossbeam_utils::thread;

use crate::utils::tester::*;

#[test]
fn bucket_new_is_empty() {
    let bucket = Bucket::<u32>::new(BucketCapacity(4));
    let guard = &epoch::pin();

    assert_eq!(BucketCapacity(4), bucket.capacity());

    for inner in 0..4 {
        let slot = bucket.slot(InnerIndex(inner)).unwrap();
        assert!(slot.load(Ordering::Acquire, guard).is_null());
    }

    assert!(bucket.slot(InnerIndex(4)).is_none());
}

#[test]
fn bucket_drop_elements() {
    let count = SpyCount::zero();

    {
        let bucket = Bucket::new(BucketCapacity(4));

        for inner in 0..3 {
            let slot = bucket.slot(InnerIndex(inner)).unwrap();
            slot.store(Owned::new(SpyElement::new(&count)), Ordering::Relaxed);
        }

        assert_eq!(3, count.get());
    }

    assert_eq!(0, count.get());
}

#[test]
fn bucket_table_allocate_if_absent() {
    let table = BucketTable::<u32, 16>::default();
    let guard = &epoch::pin();

    assert_eq!(NumberBuckets(0), table.number_buckets(guard));
    assert!(table.get(BucketIndex(0), guard).is_none());

    let bucket = table.allocate_if_absent(ElementIndex(0), guard).unwrap();
    assert_eq!(BucketCapacity(2), bucket.capacity());
    assert_eq!(NumberBuckets(1), table.number_buckets(guard));

    let bucket = table.allocate_if_absent(ElementIndex(2), guard).unwrap();
    assert_eq!(BucketCapacity(4), bucket.capacity());

    let bucket = table.allocate_if_absent(ElementIndex(6), guard).unwrap();
    assert_eq!(BucketCapacity(8), bucket.capacity());

    assert_eq!(NumberBuckets(3), table.number_buckets(guard));
    assert_eq!(14, table.capacity(guard));
}

#[test]
fn bucket_table_allocate_if_absent_skip() {
    let table = BucketTable::<u32, 16>::default();
    let guard = &epoch::pin();

    let first = table.allocate_if_absent(ElementIndex(2), guard).unwrap() as *const _;
    let second = table.allocate_if_absent(ElementIndex(5), guard).unwrap() as *const _;

    assert_eq!(first, second);
}

#[test]
fn bucket_table_allocate_if_absent_capacity_exceeded() {
    let table = BucketTable::<u32, 2>::default();
    let guard = &epoch::pin();

    assert!(table.allocate_if_absent(ElementIndex(5), guard).is_ok());
    assert_eq!(
        Err(Failure::CapacityExceeded),
        table.allocate_if_absent(ElementIndex(6), guard).map(|_| ())
    );
    assert_eq!(
        Err(Failure::CapacityExceeded),
        table.allocate_if_absent(ElementIndex(usize::MAX), guard).map(|_| ())
    );

    assert_eq!(NumberBuckets(1), table.number_buckets(guard));
}

#[test]
fn bucket_table_allocate_if_absent_race() {
    const THREADS: usize = 8;

    let table = BucketTable::<u32, 16>::default();

    let installed: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| scope.spawn(|_| {
                let guard = &epoch::pin();
                table.allocate_if_absent(ElementIndex(100), guard).unwrap() as *const _ as usize
            }))
            .collect();

        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    }).unwrap();

    assert!(installed.windows(2).all(|pair| pair[0] == pair[1]));

    let guard = &epoch::pin();
    let bucket = addressing::bucket_of(ElementIndex(100)).unwrap();
    assert!(table.get(bucket, guard).is_some());
}

#[test]
fn bucket_table_slot() {
    let table = BucketTable::<u32, 16>::default();
    let guard = &epoch::pin();

    assert!(table.slot(ElementIndex(3), guard).is_none());

    table.allocate_if_absent(ElementIndex(3), guard).unwrap();

    let slot = table.slot(ElementIndex(3), guard).unwrap();
    assert!(slot.load(Ordering::Acquire, guard).is_null());

    assert!(table.slot(ElementIndex(0), guard).is_none());
    assert!(table.slot(ElementIndex(6), guard).is_none());
}

#[test]
fn bucket_table_drop_elements() {
    let count = SpyCount::zero();

    {
        let table = BucketTable::<SpyElement<'_>, 4>::default();
        let guard = &epoch::pin();

        for index in 0..10 {
            table.allocate_if_absent(ElementIndex(index), guard).unwrap();

            let slot = table.slot(ElementIndex(index), guard).unwrap();
            slot.store(Owned::new(SpyElement::new(&count)), Ordering::Release);
        }

        assert_eq!(10, count.get());
    }

    assert_eq!(0, count.get());
}

}
