use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use foldhash::fast::RandomState;

use crate::{ResourcePool, Sequence, TypeRegistryBuilder, TypeTag};

// Values are type-occluded `ResourcePool<T>` where T is the type the key was created for.
// The map is sharded into independently locked buckets, so lookups for unrelated types do not
// contend with each other.
type PoolMap = scc::HashMap<TypeTag, Arc<dyn Any + Send + Sync>, RandomState>;

static GLOBAL_REGISTRY: LazyLock<TypeRegistry> = LazyLock::new(TypeRegistry::new);

/// A registry that holds exactly one [`ResourcePool<T>`] for every type `T` it has been asked
/// about.
///
/// Pools are created on first request and then live as long as the registry. Entries are never
/// removed, so the number of pools is bounded by the number of distinct types the program uses.
///
/// Registries are ordinary values that can be owned and injected wherever needed. A process-wide
/// instance that is never torn down is available via [`TypeRegistry::global()`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use type_pool::TypeRegistry;
///
/// let registry = TypeRegistry::new();
///
/// let numbers = registry.pool::<i32>();
/// let strings = registry.pool::<String>();
///
/// assert!(Arc::ptr_eq(&numbers, &registry.pool::<i32>()));
/// assert_eq!(registry.len(), 2);
/// ```
///
/// # Thread safety
///
/// This type is thread-safe. If several threads request the pool of the same type for the first
/// time concurrently, exactly one pool is created and all of them receive it, fully constructed.
pub struct TypeRegistry {
    pools: PoolMap,

    initial_capacity: usize,

    pools_created: AtomicUsize,
}

impl TypeRegistry {
    /// Creates a new, empty registry with the default configuration.
    ///
    /// For custom configuration, use [`TypeRegistry::builder()`].
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Creates a builder for configuring and constructing a [`TypeRegistry`].
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::new()
    }

    pub(crate) fn new_inner(initial_capacity: usize) -> Self {
        Self {
            pools: PoolMap::with_hasher(RandomState::default()),
            initial_capacity,
            pools_created: AtomicUsize::new(0),
        }
    }

    /// The process-wide registry.
    ///
    /// It is created with the default configuration on first use and lives until the process
    /// exits.
    #[must_use]
    pub fn global() -> &'static Self {
        &GLOBAL_REGISTRY
    }

    /// Returns the pool of `T`, creating it if this is the first request for `T`.
    #[must_use]
    pub fn pool<T>(&self) -> Arc<ResourcePool<T>>
    where
        T: 'static,
    {
        let tag = TypeTag::of::<T>();

        // Fast path only takes a shared lock on one bucket.
        if let Some(pool) = self.pools.read(&tag, |_, pool| Arc::clone(pool)) {
            tracing::trace!(item = %tag, "using existing pool");
            return downcast_pool(pool);
        }

        // The entry keeps its bucket locked until dropped, which makes the existence check,
        // construction and insertion one atomic step for this key.
        let pool = Arc::clone(
            self.pools
                .entry(tag)
                .or_insert_with(|| self.create_pool::<T>())
                .get(),
        );

        downcast_pool(pool)
    }

    /// Allocates a fresh, empty sequence from the pool of `T`.
    ///
    /// This is shorthand for `registry.pool::<T>().alloc()`.
    #[must_use]
    pub fn alloc<T>(&self) -> Sequence<T>
    where
        T: 'static,
    {
        self.pool::<T>().alloc()
    }

    /// Whether the pool of `T` has already been created.
    #[must_use]
    pub fn contains<T>(&self) -> bool
    where
        T: 'static,
    {
        self.pools.contains(&TypeTag::of::<T>())
    }

    /// The number of pools in the registry.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Whether the registry does not contain any pools yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// The number of pools this registry has ever constructed.
    ///
    /// Because pools are never removed, this is always equal to [`len()`][Self::len]. It is
    /// tracked separately so that a duplicate construction would be detectable.
    #[must_use]
    pub fn pools_created(&self) -> usize {
        self.pools_created.load(Ordering::Relaxed)
    }

    /// The capacity of sequences allocated by pools of this registry.
    #[must_use]
    pub fn initial_capacity(&self) -> usize {
        self.initial_capacity
    }

    fn create_pool<T>(&self) -> Arc<dyn Any + Send + Sync>
    where
        T: 'static,
    {
        self.pools_created.fetch_add(1, Ordering::Relaxed);

        let pool = Arc::new(ResourcePool::<T>::new(self.initial_capacity));

        tracing::debug!(
            item = %pool.type_tag(),
            initial_capacity = self.initial_capacity,
            pool = ?Arc::as_ptr(&pool),
            "created pool"
        );

        pool
    }
}

fn downcast_pool<T>(pool: Arc<dyn Any + Send + Sync>) -> Arc<ResourcePool<T>>
where
    T: 'static,
{
    pool.downcast::<ResourcePool<T>>()
        .expect("registry entries are always keyed by the tag of their own item type")
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("len", &self.len())
            .field("initial_capacity", &self.initial_capacity)
            .field("pools_created", &self.pools_created())
            .finish()
    }
}
