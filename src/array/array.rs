//! The Growable Array

use std::fmt;
use std::iter;
use std::sync::atomic::Ordering;

use crossbeam_epoch::{self as epoch, Atomic, Guard, Owned, Shared};
use crossbeam_utils::Backoff;

use super::Iter;

use super::addressing::{self, ElementIndex, Length};
use super::buckets::BucketTable;
use super::descriptor::{Descriptor, WriteOperation};
use super::failure::{Failure, Result};
use super::logging::trace_log;

//
//  Public Interface
//

/// The default maximum number of buckets, for a maximum capacity of 131,070 elements.
pub const DEFAULT_BUCKETS: usize = 16;

/// `GrowableArray`
///
/// A lock-free array which may be appended to, read, and updated concurrently from any number of threads.
///
/// `N` is the maximum number of buckets, bounding the capacity to `2^(N+1) - 2` elements.
///
/// A `GrowableArray<T>` can be shared across threads whenever `T` can be both sent and shared.
///
/// #   Example of Sync.
///
/// ```
/// # use growable::array::GrowableArray;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let array: GrowableArray<_> = GrowableArray::new();
/// array.push("Hello".to_string());
///
/// ensure_sync(array);
/// ```
///
/// #   Example of not Sync.
///
/// ```compile_fail
/// # use std::rc::Rc;
/// # use growable::array::GrowableArray;
/// fn ensure_sync<T: Sync>(_: T) {}
///
/// let array: GrowableArray<_> = GrowableArray::new();
/// array.push(Rc::new(3));
///
/// ensure_sync(array);
/// ```
///
/// #   Example of elements not outliving the array.
///
/// ```compile_fail
/// # use growable::array::GrowableArray;
/// let other: GrowableArray<String> = GrowableArray::new();
/// let guard = other.guard();
///
/// let element = {
///     let array: GrowableArray<_> = GrowableArray::new();
///     array.push("Hello".to_string());
///     array.get(0, &guard).unwrap()
/// };
///
/// println!("{}", element);
/// ```
pub struct GrowableArray<T, const N: usize = DEFAULT_BUCKETS> {
    //  The latest Descriptor.
    //
    //  Swapping it is the linearization point of an append; a superseded Descriptor is reclaimed once no pinned
    //  thread may still be reading it.
    descriptor: Atomic<Descriptor<T>>,
    buckets: BucketTable<T, N>,
}

impl<T, const N: usize> GrowableArray<T, N> {
    /// Creates a new, empty, instance.
    ///
    /// No bucket is allocated.
    ///
    /// #   Panics
    ///
    /// Panics if `N` is 0, or so large that the maximum capacity would overflow `usize`.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<i32> = GrowableArray::new();
    ///
    /// assert_eq!(0, array.len());
    /// assert_eq!(0, array.capacity());
    /// assert_eq!(131_070, array.max_capacity());
    /// ```
    pub fn new() -> Self {
        assert!(N > 0, "At least one bucket is required");
        assert!(N <= addressing::MAX_BUCKETS, "Too many buckets: {} > {}", N, addressing::MAX_BUCKETS);

        Self {
            descriptor: Atomic::new(Descriptor::empty()),
            buckets: BucketTable::default(),
        }
    }

    /// Pins the current thread.
    ///
    /// References obtained through the returned `Guard` remain valid as long as it lives, even if the element they
    /// refer to is concurrently replaced by `set`.
    ///
    /// The `Guard` is pinned on the default collector of `crossbeam_epoch`, which `get`, `set`, and `iter` require.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// array.push("a");
    ///
    /// let guard = array.guard();
    /// assert_eq!(Ok(&"a"), array.get(0, &guard));
    /// ```
    pub fn guard(&self) -> Guard {
        epoch::pin()
    }

    /// Returns whether the instance contains any element, or not.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// assert!(array.is_empty());
    ///
    /// array.push(1);
    /// assert!(!array.is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements contained in the instance.
    ///
    /// An append is only counted once its element is readable. The result never decreases.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// assert_eq!(0, array.len());
    ///
    /// array.push(1);
    /// assert_eq!(1, array.len());
    /// ```
    pub fn len(&self) -> usize {
        let guard = &epoch::pin();

        self.current(guard).len().0
    }

    /// Returns the capacity of the buckets installed so far.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// assert_eq!(0, array.capacity());
    ///
    /// array.extend([1, 2, 3]);
    /// assert_eq!(6, array.capacity());
    /// ```
    pub fn capacity(&self) -> usize {
        let guard = &epoch::pin();

        self.buckets.capacity(guard)
    }

    /// Returns the maximum capacity achievable by the instance.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<i32, 4> = GrowableArray::new();
    /// assert_eq!(30, array.max_capacity());
    /// ```
    pub fn max_capacity(&self) -> usize {
        addressing::max_capacity(self.buckets.max_buckets())
    }

    /// Returns the number of buckets currently installed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// assert_eq!(0, array.number_buckets());
    ///
    /// array.extend([1, 2, 3, 4, 5, 6, 7]);
    /// assert_eq!(3, array.number_buckets());
    /// ```
    pub fn number_buckets(&self) -> usize {
        let guard = &epoch::pin();

        self.buckets.number_buckets(guard).0
    }

    /// Returns the maximum number of buckets, that is `N`.
    pub fn max_buckets(&self) -> usize {
        self.buckets.max_buckets().0
    }

    /// Returns a reference to the ith element.
    ///
    /// The reference remains valid as long as `guard` lives.
    ///
    /// #   Errors
    ///
    /// Returns `IndexOutOfRange` if `i` is not less than `self.len()`.
    ///
    /// #   Panics
    ///
    /// Panics if `guard` is not pinned on the default collector, such as an unprotected guard.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// #   use growable::failure::Failure;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// array.push(1);
    ///
    /// let guard = array.guard();
    /// assert_eq!(Ok(&1), array.get(0, &guard));
    /// assert_eq!(Err(Failure::IndexOutOfRange), array.get(1, &guard));
    /// ```
    pub fn get<'g>(&'g self, i: usize, guard: &'g Guard) -> Result<&'g T> {
        let element = self.checked_slot(i, guard)?.load(Ordering::Acquire, guard);

        //  Safety:
        //  -   Elements are only reclaimed once no pinned thread may be reading them.
        unsafe { element.as_ref() }.ok_or(Failure::IndexOutOfRange)
    }

    /// Returns an iterator over the elements.
    ///
    /// The number of elements is fixed at creation: elements appended afterwards are not visited, while elements
    /// updated afterwards may be visited either before or after their update.
    ///
    /// #   Panics
    ///
    /// Panics if `guard` is not pinned on the default collector, such as an unprotected guard.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// array.extend([1, 2, 3]);
    ///
    /// let guard = array.guard();
    /// let iter = array.iter(&guard);
    ///
    /// array.push(4);
    ///
    /// assert_eq!(vec![1, 2, 3], iter.copied().collect::<Vec<_>>());
    /// ```
    pub fn iter<'g>(&'g self, guard: &'g Guard) -> Iter<'g, T, N> {
        check_guard(guard);

        Iter::new(self, self.len(), guard)
    }

    /// Appends an element to the back.
    ///
    /// Returns the index at which the element was written.
    ///
    /// #   Errors
    ///
    /// Returns `CapacityExceeded` if `self.len()` already equals `self.max_capacity()`; the element is then dropped.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// #   use growable::failure::Failure;
    /// let array: GrowableArray<_, 1> = GrowableArray::new();
    ///
    /// assert_eq!(Ok(0), array.try_push(3));
    /// assert_eq!(Ok(1), array.try_push(4));
    /// assert_eq!(Err(Failure::CapacityExceeded), array.try_push(5));
    /// ```
    pub fn try_push(&self, value: T) -> Result<usize> {
        let guard = &epoch::pin();
        let backoff = Backoff::new();

        let mut candidate = Owned::new(Descriptor::append(Length(0), Owned::new(value)));

        loop {
            let current = self.descriptor.load(Ordering::Acquire, guard);

            //  Safety:
            //  -   Never null.
            //  -   Only reclaimed once no pinned thread may be reading it.
            let current_ref = unsafe { current.deref() };

            //  The next append cannot be published before the previous one landed.
            self.complete(current_ref.operation(), guard);

            let size = current_ref.size();

            if let Err(failure) = self.buckets.allocate_if_absent(ElementIndex(size.0), guard) {
                //  Safety:
                //  -   `candidate` was never published.
                drop(unsafe { (*candidate.into_box()).into_element() });
                return Err(failure);
            }

            candidate.retarget(size);

            match self.descriptor.compare_exchange(
                current,
                candidate,
                Ordering::AcqRel,
                Ordering::Acquire,
                guard,
            ) {
                Ok(published) => {
                    //  Safety:
                    //  -   Non-null, as just published.
                    self.complete(unsafe { published.deref() }.operation(), guard);

                    //  Safety:
                    //  -   `current` is no longer reachable from `self.descriptor`.
                    unsafe { guard.defer_destroy(current) };

                    return Ok(size.0);
                },
                Err(error) => {
                    trace_log!(index = size.0, "descriptor superseded, retrying append");

                    candidate = error.new;
                    backoff.spin();
                },
            }
        }
    }

    /// Appends an element to the back.
    ///
    /// Calling this method is equivalent to calling `try_push` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if the value cannot be pushed.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// array.push(3);
    ///
    /// assert_eq!(Ok(&3), array.get(0, &array.guard()));
    /// ```
    pub fn push(&self, value: T) {
        if let Err(failure) = self.try_push(value) {
            panic_from_failure(failure);
        }
    }

    /// Appends multiple elements to the back, one at a time.
    ///
    /// Concurrent appends may interleave with the elements of `collection`.
    ///
    /// #   Errors
    ///
    /// Returns an error if any of the values cannot be pushed, in which case the elements pushed so far remain.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// assert_eq!(Ok(()), array.try_extend([1, 2, 3]));
    /// assert_eq!(3, array.len());
    /// ```
    pub fn try_extend<C>(&self, collection: C) -> Result<()>
    where
        C: IntoIterator<Item = T>,
    {
        for value in collection {
            self.try_push(value)?;
        }

        Ok(())
    }

    /// Appends multiple elements to the back, one at a time.
    ///
    /// Calling this method is equivalent to calling `try_extend` and panicking on error.
    ///
    /// #   Panics
    ///
    /// Panics if any of the values cannot be pushed.
    pub fn extend<C>(&self, collection: C)
    where
        C: IntoIterator<Item = T>,
    {
        if let Err(failure) = self.try_extend(collection) {
            panic_from_failure(failure);
        }
    }

    //  Returns the current Descriptor.
    fn current<'g>(&self, guard: &'g Guard) -> &'g Descriptor<T> {
        //  Safety:
        //  -   Never null.
        //  -   Only reclaimed once no pinned thread may be reading it.
        unsafe { self.descriptor.load(Ordering::Acquire, guard).deref() }
    }

    //  Returns the slot of the ith element, if i is less than the current length.
    fn checked_slot<'g>(&'g self, i: usize, guard: &'g Guard) -> Result<&'g Atomic<T>> {
        check_guard(guard);

        if i >= self.current(guard).len().0 {
            return Err(Failure::IndexOutOfRange);
        }

        self.buckets.slot(ElementIndex(i), guard).ok_or(Failure::IndexOutOfRange)
    }

    //  Lands the element of a pending operation in its slot.
    //
    //  Any thread may call this method on any operation it observed, any number of times: only the first call writes
    //  the element, as the slot is only ever written to from empty by this one operation.
    fn complete(&self, operation: &WriteOperation<T>, guard: &Guard) {
        if !operation.is_pending() {
            return;
        }

        //  The bucket of an operation is installed before the operation is published.
        let slot = self.buckets.slot(operation.index(), guard)
            .unwrap_or_else(|| unreachable!("{:?} published before its bucket", operation.index()));

        let element = operation.element(guard);

        if slot.compare_exchange(Shared::null(), element, Ordering::AcqRel, Ordering::Acquire, guard).is_err() {
            trace_log!(index = operation.index().0, "pending write already landed");
        }

        //  Whether by this thread or another, the element has landed.
        operation.complete();
    }
}

impl<T: Send + 'static, const N: usize> GrowableArray<T, N> {
    /// Replaces the ith element, returning the previous one.
    ///
    /// The previous element is dropped once no thread may still be reading it; until then, it remains readable
    /// through the returned reference.
    ///
    /// #   Errors
    ///
    /// Returns `IndexOutOfRange` if `i` is not less than `self.len()`.
    ///
    /// #   Panics
    ///
    /// Panics if `guard` is not pinned on the default collector, such as an unprotected guard.
    ///
    /// #   Example
    ///
    /// ```
    /// #   use growable::array::GrowableArray;
    /// #   use growable::failure::Failure;
    /// let array: GrowableArray<_> = GrowableArray::new();
    /// array.extend(["a", "b"]);
    ///
    /// let guard = array.guard();
    /// assert_eq!(Ok(&"a"), array.set(0, "x", &guard));
    /// assert_eq!(Ok(&"x"), array.get(0, &guard));
    ///
    /// assert_eq!(Err(Failure::IndexOutOfRange), array.set(2, "y", &guard));
    /// ```
    pub fn set<'g>(&'g self, i: usize, value: T, guard: &'g Guard) -> Result<&'g T> {
        let slot = self.checked_slot(i, guard)?;

        let previous = slot.swap(Owned::new(value), Ordering::AcqRel, guard);

        //  Safety:
        //  -   Elements are only reclaimed once no pinned thread may be reading them.
        let result = unsafe { previous.as_ref() }.ok_or(Failure::IndexOutOfRange)?;

        //  Safety:
        //  -   `previous` is no longer reachable from the slot.
        unsafe { guard.defer_destroy(previous) };

        Ok(result)
    }
}

impl<T, const N: usize> Drop for GrowableArray<T, N> {
    fn drop(&mut self) {
        //  Safety:
        //  -   Exclusive access, per &mut self.
        unsafe {
            let guard = epoch::unprotected();
            let current = self.descriptor.load(Ordering::Relaxed, guard);

            //  The element of the last append belongs to its slot, whether it landed already or not.
            self.complete(current.deref().operation(), guard);

            drop(current.into_owned());
        }
    }
}

impl<T, const N: usize> Default for GrowableArray<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug, const N: usize> fmt::Debug for GrowableArray<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let guard = &epoch::pin();

        f.debug_struct("GrowableArray")
            .field("capacity", &self.capacity())
            .field("length", &self.len())
            .field("elements", &DebugElements(self, guard))
            .finish()
    }
}

impl<T, const N: usize> iter::FromIterator<T> for GrowableArray<T, N> {
    fn from_iter<C>(collection: C) -> Self
    where
        C: IntoIterator<Item = T>,
    {
        let result = Self::new();
        result.extend(collection);
        result
    }
}

//
//  Implementation Details
//

//  Renders the elements as a list.
struct DebugElements<'g, T, const N: usize>(&'g GrowableArray<T, N>, &'g Guard);

impl<'g, T: fmt::Debug, const N: usize> fmt::Debug for DebugElements<'g, T, N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_list().entries(self.0.iter(self.1)).finish()
    }
}

//  Ensures `guard` holds off the reclamations of the array.
//
//  Superseded descriptors and replaced elements are retired on the default collector, hence only a guard pinned on
//  it protects the references handed out.
fn check_guard(guard: &Guard) {
    assert!(
        guard.collector() == Some(epoch::default_collector()),
        "Guard not pinned on the default collector, see GrowableArray::guard"
    );
}

#[cold]
#[inline(never)]
fn panic_from_failure(failure: Failure) -> ! {
    panic!("{}", failure);
}

//  mod tests
