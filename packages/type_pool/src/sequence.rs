use std::sync::{Arc, RwLock};
use std::{fmt, iter};

use crate::ERR_POISONED_LOCK;

/// Growth target when a sequence without spare capacity needs to store one more value.
const MIN_GROWN_CAPACITY: usize = 4;

/// An ordered, resizable sequence of `T` with slice-header semantics.
///
/// A `Sequence` is a lightweight header (length and capacity) over storage that may be shared
/// with other headers. Cloning a sequence or calling [`reslice()`][Self::reslice] produces a new
/// header over the same storage: a value written through one header is visible through every
/// other header that covers the same index.
///
/// Each header has its own length. Appending via [`push()`][Self::push] writes into the shared
/// storage as long as there is spare capacity, which means that appending through one header
/// may overwrite a slot another header considers part of its own spare capacity. Once capacity
/// runs out, the appending header moves to new storage and stops aliasing the old one.
///
/// # Example
///
/// ```rust
/// use type_pool::Sequence;
///
/// let mut original = Sequence::with_capacity(2);
/// original.push("first");
///
/// let mut alias = original.clone();
/// alias.push("second");
///
/// // The original header did not grow, but the write is in storage they share.
/// assert_eq!(original.len(), 1);
/// assert_eq!(original.reslice(2).get(1), Some("second"));
/// ```
///
/// # Thread safety
///
/// The storage is internally synchronized, so a sequence is thread-safe if `T` is. Coordinating
/// logically concurrent writes through aliasing headers remains the responsibility of the caller.
pub struct Sequence<T> {
    // The vector length is the capacity of the storage and never changes; slots that have
    // never been written hold `None`.
    storage: Arc<RwLock<Vec<Option<T>>>>,

    len: usize,
    capacity: usize,
}

impl<T> Sequence<T> {
    /// Creates an empty sequence without any capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty sequence with storage for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = iter::repeat_with(|| None).take(capacity).collect();

        Self {
            storage: Arc::new(RwLock::new(slots)),
            len: 0,
            capacity,
        }
    }

    /// The number of values in the sequence, as seen through this header.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the sequence contains no values, as seen through this header.
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The number of values the underlying storage can hold without moving to new storage.
    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a new header over the same storage with a different length.
    ///
    /// The new length may be greater than the current length as long as it stays within the
    /// capacity, which exposes slots that other headers may have written to.
    ///
    /// # Panics
    ///
    /// Panics if `len` exceeds the capacity of the storage.
    #[must_use]
    pub fn reslice(&self, len: usize) -> Self {
        assert!(
            len <= self.capacity,
            "cannot reslice a sequence to length {len} because its capacity is {}",
            self.capacity
        );

        Self {
            storage: Arc::clone(&self.storage),
            len,
            capacity: self.capacity,
        }
    }

    /// Replaces the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not less than the length of the sequence.
    pub fn set(&self, index: usize, value: T) {
        assert!(
            index < self.len,
            "index {index} is out of bounds for a sequence of length {}",
            self.len
        );

        let mut slots = self.storage.write().expect(ERR_POISONED_LOCK);

        #[expect(
            clippy::indexing_slicing,
            reason = "len never exceeds capacity, which is the storage length"
        )]
        let slot = &mut slots[index];

        *slot = Some(value);
    }

    /// Whether this sequence and `other` read and write the same storage.
    #[must_use]
    pub fn shares_storage_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.storage, &other.storage)
    }
}

impl<T> Sequence<T>
where
    T: Clone,
{
    /// Appends a value to the end of the sequence.
    ///
    /// If the storage has spare capacity, the value is written into the slot at the current
    /// length, even if an aliasing header has written something there already. Otherwise this
    /// header moves to new storage of larger capacity that is no longer shared with anyone.
    pub fn push(&mut self, value: T) {
        if self.len == self.capacity {
            self.grow();
        }

        let mut slots = self.storage.write().expect(ERR_POISONED_LOCK);

        #[expect(
            clippy::indexing_slicing,
            reason = "we just ensured there is a slot beyond the current length"
        )]
        let slot = &mut slots[self.len];

        *slot = Some(value);

        // Cannot wrap because we just wrote to the slot at this index.
        self.len = self.len.wrapping_add(1);
    }

    /// Returns a copy of the value at `index`.
    ///
    /// Returns `None` if `index` is out of bounds or if the slot was exposed by
    /// [`reslice()`][Self::reslice] without ever having been written.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len {
            return None;
        }

        let slots = self.storage.read().expect(ERR_POISONED_LOCK);
        slots.get(index).cloned().flatten()
    }

    /// Returns a snapshot of the slots within the length of this header.
    ///
    /// Slots that were never written are `None`.
    #[must_use]
    pub fn slots(&self) -> Vec<Option<T>> {
        let slots = self.storage.read().expect(ERR_POISONED_LOCK);
        slots.iter().take(self.len).cloned().collect()
    }

    /// Returns a snapshot of the written values within the length of this header.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.slots().into_iter().flatten().collect()
    }

    /// Iterates over a snapshot of the written values within the length of this header.
    pub fn iter(&self) -> impl Iterator<Item = T> {
        self.to_vec().into_iter()
    }

    fn grow(&mut self) {
        let new_capacity = self
            .capacity
            .checked_mul(2)
            .expect("requested capacity exceeds size of virtual memory")
            .max(MIN_GROWN_CAPACITY);

        let mut slots = self.slots();
        slots.resize_with(new_capacity, || None);

        tracing::trace!(
            old_capacity = self.capacity,
            new_capacity,
            "sequence moved to new storage"
        );

        self.storage = Arc::new(RwLock::new(slots));
        self.capacity = new_capacity;
    }
}

impl<T> Clone for Sequence<T> {
    /// Creates a new header over the same storage, with the same length.
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            len: self.len,
            capacity: self.capacity,
        }
    }
}

impl<T> Default for Sequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Sequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
