#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! This package provides [`TypeRegistry`], a concurrent registry that lazily creates exactly one
//! [`ResourcePool<T>`] for every distinct type `T` it is asked about.
//!
//! Each pool hands out fresh, empty [`Sequence<T>`] values. A sequence behaves like a slice
//! header over shared storage: clones and reslices of one sequence observe each other's writes,
//! while every allocation from a pool gets storage of its own.
//!
//! # Type identity
//!
//! Pools are keyed by [`TypeTag`], an identity token that is equal for two types if and only if
//! they are the same instantiated type. `i32` and `String` get different pools, as do `Vec<i32>`
//! and `Vec<u8>`.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use type_pool::TypeRegistry;
//!
//! let registry = TypeRegistry::new();
//!
//! let mut numbers = registry.alloc::<i32>();
//! numbers.push(42);
//!
//! // The same pool instance is returned every time it is requested for the same type.
//! assert!(Arc::ptr_eq(&registry.pool::<i32>(), &registry.pool::<i32>()));
//!
//! // Every allocation is fresh and empty.
//! assert!(registry.alloc::<i32>().is_empty());
//! ```
//!
//! For code that does not pass a registry around, the process-wide registry is available via
//! [`alloc_shared()`] and [`shared_pool()`]:
//!
//! ```rust
//! let mut names = type_pool::alloc_shared::<String>();
//! names.push("hello".to_string());
//!
//! assert_eq!(names.len(), 1);
//! ```
//!
//! # Thread safety
//!
//! The registry is thread-safe. Concurrent first callers for the same type always end up with
//! the same pool instance, and lookups for unrelated types do not serialize on a single lock.

mod builder;
mod constants;
mod pool;
mod registry;
mod sequence;
mod type_tag;

use std::sync::Arc;

pub use builder::*;
pub(crate) use constants::*;
pub use pool::*;
pub use registry::*;
pub use sequence::*;
pub use type_tag::*;

/// Allocates a fresh, empty [`Sequence<T>`] from the pool of `T` in the process-wide registry.
///
/// This is shorthand for `TypeRegistry::global().alloc::<T>()`.
///
/// # Example
///
/// ```rust
/// let mut values = type_pool::alloc_shared::<u64>();
/// values.push(7);
///
/// assert_eq!(values.get(0), Some(7));
/// ```
#[must_use]
pub fn alloc_shared<T>() -> Sequence<T>
where
    T: 'static,
{
    TypeRegistry::global().alloc::<T>()
}

/// Returns the pool of `T` from the process-wide registry, creating it if necessary.
///
/// This is shorthand for `TypeRegistry::global().pool::<T>()`.
#[must_use]
pub fn shared_pool<T>() -> Arc<ResourcePool<T>>
where
    T: 'static,
{
    TypeRegistry::global().pool::<T>()
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn shared_pool_is_singleton_per_type() {
        struct OnlyUsedHere;

        let first = shared_pool::<OnlyUsedHere>();
        let second = shared_pool::<OnlyUsedHere>();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(TypeRegistry::global().contains::<OnlyUsedHere>());
    }

    #[test]
    fn alloc_shared_uses_global_registry() {
        struct AlsoOnlyUsedHere;

        let sequence = alloc_shared::<AlsoOnlyUsedHere>();

        assert!(sequence.is_empty());
        assert!(TypeRegistry::global().contains::<AlsoOnlyUsedHere>());
    }
}
