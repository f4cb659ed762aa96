//! Concurrency tests for `TypeRegistry`.
//!
//! These tests verify that the get-or-create step is atomic per type when many threads race to
//! be the first caller, and that unrelated types can be resolved concurrently.

use std::sync::Arc;

use testing::{run_concurrently, with_watchdog};
use type_pool::TypeRegistry;

const THREAD_COUNT: usize = 16;

#[test]
fn concurrent_first_callers_share_one_pool() {
    with_watchdog(|| {
        let registry = Arc::new(TypeRegistry::new());

        let pools = run_concurrently(THREAD_COUNT, {
            let registry = Arc::clone(&registry);
            move |_| registry.pool::<String>()
        });

        assert_eq!(pools.len(), THREAD_COUNT);
        assert_eq!(registry.pools_created(), 1);
        assert_eq!(registry.len(), 1);

        let first = pools.first().expect("at least one thread ran");
        assert!(pools.iter().all(|pool| Arc::ptr_eq(pool, first)));
    });
}

#[test]
fn concurrent_first_callers_on_global_registry() {
    struct RacedOnlyHere;

    with_watchdog(|| {
        let pools = run_concurrently(THREAD_COUNT, |_| {
            TypeRegistry::global().pool::<RacedOnlyHere>()
        });

        let first = pools.first().expect("at least one thread ran");
        assert!(pools.iter().all(|pool| Arc::ptr_eq(pool, first)));
    });
}

#[test]
fn concurrent_callers_for_different_types() {
    with_watchdog(|| {
        let registry = Arc::new(TypeRegistry::new());

        let tags = run_concurrently(THREAD_COUNT, {
            let registry = Arc::clone(&registry);
            move |index| {
                // Half the threads race on each type.
                if index % 2 == 0 {
                    registry.pool::<u32>().type_tag()
                } else {
                    registry.pool::<u64>().type_tag()
                }
            }
        });

        assert_eq!(tags.len(), THREAD_COUNT);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.pools_created(), 2);
    });
}

#[test]
fn concurrent_allocations_are_independent() {
    with_watchdog(|| {
        let registry = Arc::new(TypeRegistry::builder().initial_capacity(1).build());

        let sequences = run_concurrently(THREAD_COUNT, {
            let registry = Arc::clone(&registry);
            move |index| {
                let mut sequence = registry.alloc::<usize>();
                sequence.push(index);
                sequence
            }
        });

        for (index, sequence) in sequences.iter().enumerate() {
            assert_eq!(sequence.to_vec(), vec![index]);
        }

        assert_eq!(registry.pools_created(), 1);
    });
}
