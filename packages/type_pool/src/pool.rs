use std::fmt;
use std::marker::PhantomData;

use crate::{Sequence, TypeTag};

/// The allocation policy for sequences of one type `T`.
///
/// Pools are created and owned by a [`TypeRegistry`][crate::TypeRegistry], which guarantees that
/// at most one pool exists per type. Callers only ever receive shared references to a pool.
///
/// Every call to [`alloc()`][Self::alloc] returns a fresh, empty sequence whose storage is not
/// shared with any sequence previously returned by the pool.
///
/// # Thread safety
///
/// The pool never stores a `T`, so it is thread-safe regardless of `T`.
pub struct ResourcePool<T> {
    initial_capacity: usize,

    _item: PhantomData<fn() -> T>,
}

impl<T> ResourcePool<T>
where
    T: 'static,
{
    pub(crate) fn new(initial_capacity: usize) -> Self {
        Self {
            initial_capacity,
            _item: PhantomData,
        }
    }

    /// Allocates a fresh, empty sequence with the initial capacity configured for this pool.
    #[must_use]
    pub fn alloc(&self) -> Sequence<T> {
        tracing::trace!(
            item = %self.type_tag(),
            capacity = self.initial_capacity,
            "allocating sequence"
        );

        Sequence::with_capacity(self.initial_capacity)
    }

    /// The type of the items in the sequences this pool allocates.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        TypeTag::of::<T>()
    }

    /// The capacity of every sequence returned by [`alloc()`][Self::alloc].
    #[must_use]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }
}

impl<T> fmt::Debug for ResourcePool<T>
where
    T: 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourcePool")
            .field("item", &self.type_tag())
            .field("initial_capacity", &self.initial_capacity)
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::cell::Cell;
    use std::fmt::Debug;
    use std::rc::Rc;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(ResourcePool<u32>: Send, Sync, Debug);
    assert_impl_all!(ResourcePool<Rc<Cell<u32>>>: Send, Sync);

    #[test]
    fn alloc_returns_empty_sequence() {
        let pool = ResourcePool::<String>::new(0);

        let sequence = pool.alloc();

        assert!(sequence.is_empty());
        assert_eq!(sequence.capacity(), 0);
    }

    #[test]
    fn alloc_uses_initial_capacity() {
        let pool = ResourcePool::<u8>::new(16);

        assert_eq!(pool.initial_capacity(), 16);
        assert_eq!(pool.alloc().capacity(), 16);
    }

    #[test]
    fn allocations_do_not_alias() {
        let pool = ResourcePool::<u32>::new(4);

        let mut first = pool.alloc();
        let second = pool.alloc();

        first.push(1);

        assert!(!first.shares_storage_with(&second));
        assert!(second.is_empty());
        assert_eq!(second.reslice(1).get(0), None);
    }

    #[test]
    fn type_tag_matches_item_type() {
        let pool = ResourcePool::<Vec<u8>>::new(0);

        assert_eq!(pool.type_tag(), TypeTag::of::<Vec<u8>>());
    }

    #[test]
    fn debug_names_item_type() {
        let pool = ResourcePool::<u16>::new(3);
        let debug_output = format!("{pool:?}");

        assert!(debug_output.contains("ResourcePool"));
        assert!(debug_output.contains("u16"));
    }
}
