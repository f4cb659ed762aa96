// A poisoned lock means another thread panicked halfway through a sequence write. The slot
// contents can no longer be trusted, so we refuse to continue.
pub(crate) const ERR_POISONED_LOCK: &str = "encountered poisoned lock - a thread panicked while \
    mutating shared sequence storage, so the storage contents can no longer be trusted";
