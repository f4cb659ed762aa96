use std::cell::Cell;
use std::marker::PhantomData;

use crate::TypeRegistry;

/// Builder for creating an instance of [`TypeRegistry`].
///
/// All settings are optional and apply to every pool the registry creates.
///
/// # Examples
///
/// ```
/// use type_pool::TypeRegistry;
///
/// let registry = TypeRegistry::builder().initial_capacity(8).build();
///
/// assert_eq!(registry.alloc::<u32>().capacity(), 8);
/// ```
///
/// # Thread safety
///
/// The builder is thread-mobile ([`Send`]) and can be safely transferred between threads,
/// allowing registry configuration to happen on different threads than where the registry is
/// used. However, it is not thread-safe ([`Sync`]) as it contains mutable configuration state.
#[derive(Debug)]
#[must_use]
pub struct TypeRegistryBuilder {
    initial_capacity: usize,

    // Prevents Sync while allowing Send - builders are thread-mobile but not thread-safe
    _not_sync: PhantomData<Cell<()>>,
}

impl TypeRegistryBuilder {
    pub(crate) fn new() -> Self {
        Self {
            initial_capacity: 0,
            _not_sync: PhantomData,
        }
    }

    /// Sets the capacity of every sequence allocated by pools of the registry.
    ///
    /// Defaults to zero, which means sequences acquire storage on their first append.
    ///
    /// # Examples
    ///
    /// ```
    /// use type_pool::TypeRegistry;
    ///
    /// let registry = TypeRegistry::builder().initial_capacity(2).build();
    ///
    /// assert_eq!(registry.pool::<String>().initial_capacity(), 2);
    /// ```
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Builds the registry with the specified configuration.
    #[must_use]
    pub fn build(self) -> TypeRegistry {
        TypeRegistry::new_inner(self.initial_capacity)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::thread;

    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use super::*;

    assert_impl_all!(TypeRegistryBuilder: Send, std::fmt::Debug);
    assert_not_impl_any!(TypeRegistryBuilder: Sync);

    #[test]
    fn builder_new_creates_default_state() {
        let builder = TypeRegistryBuilder::new();

        assert_eq!(builder.initial_capacity, 0);
    }

    #[test]
    fn initial_capacity_sets_capacity() {
        let builder = TypeRegistryBuilder::new().initial_capacity(32);

        assert_eq!(builder.initial_capacity, 32);
    }

    #[test]
    fn initial_capacity_can_be_overridden() {
        let builder = TypeRegistryBuilder::new()
            .initial_capacity(1)
            .initial_capacity(3);

        assert_eq!(builder.initial_capacity, 3);
    }

    #[test]
    fn build_applies_capacity_to_pools() {
        let registry = TypeRegistryBuilder::new().initial_capacity(5).build();

        assert_eq!(registry.pool::<u8>().initial_capacity(), 5);
        assert_eq!(registry.alloc::<u8>().capacity(), 5);
    }

    #[test]
    fn builder_can_move_between_threads() {
        let builder = TypeRegistryBuilder::new().initial_capacity(7);

        let registry = thread::spawn(move || builder.build())
            .join()
            .expect("thread completed successfully");

        assert_eq!(registry.alloc::<u64>().capacity(), 7);
    }
}
