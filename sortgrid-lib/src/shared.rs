//! Process-wide shared instances with explicit reference counting.
//!
//! For side widgets that exist once per page no matter how many grids use
//! them (a tooltip overlay, say). The first `acquire` creates the instance,
//! the last `release` drops it.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

struct Slot<T> {
    instance: Arc<T>,
    refs: usize,
}

/// Keyed registry of shared instances.
///
/// # Example
///
/// ```
/// use sortgrid_lib::shared::SharedInstances;
///
/// let overlays: SharedInstances<String> = SharedInstances::new();
/// let a = overlays.acquire("tooltip", || "overlay".to_string());
/// let b = overlays.acquire("tooltip", || unreachable!());
/// assert!(std::sync::Arc::ptr_eq(&a, &b));
/// assert!(!overlays.release("tooltip"));
/// assert!(overlays.release("tooltip"));
/// ```
pub struct SharedInstances<T> {
    slots: DashMap<String, Slot<T>>,
}

impl<T> SharedInstances<T> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            slots: DashMap::new(),
        }
    }

    /// Returns the instance for `name`, creating it with `init` on first use.
    pub fn acquire(&self, name: &str, init: impl FnOnce() -> T) -> Arc<T> {
        match self.slots.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                let slot = slot.get_mut();
                slot.refs += 1;
                Arc::clone(&slot.instance)
            }
            Entry::Vacant(vacant) => {
                let instance = Arc::new(init());
                vacant.insert(Slot {
                    instance: Arc::clone(&instance),
                    refs: 1,
                });
                instance
            }
        }
    }

    /// Gives up one reference. Returns `true` if this dropped the instance.
    ///
    /// Releasing a name that was never acquired is a no-op.
    pub fn release(&self, name: &str) -> bool {
        // The shard lock covers both the decrement and the removal.
        match self.slots.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                let refs = &mut slot.get_mut().refs;
                *refs = refs.saturating_sub(1);
                if *refs == 0 {
                    slot.remove();
                    true
                } else {
                    false
                }
            }
            Entry::Vacant(_) => false,
        }
    }

    /// Current reference count for `name` (0 if absent).
    pub fn ref_count(&self, name: &str) -> usize {
        self.slots.get(name).map(|slot| slot.refs).unwrap_or(0)
    }

    /// Returns `true` if `name` is currently held.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }
}

impl<T> Default for SharedInstances<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SharedInstances<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.slots.iter().map(|e| (e.key().clone(), e.value().refs)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_acquire_creates_once() {
        let registry = SharedInstances::new();
        let mut created = 0;
        let a = registry.acquire("tooltip", || {
            created += 1;
            vec![1]
        });
        let b = registry.acquire("tooltip", || {
            created += 1;
            vec![2]
        });
        assert_eq!(created, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.ref_count("tooltip"), 2);
    }

    #[test]
    fn test_last_release_drops() {
        let registry = SharedInstances::new();
        registry.acquire("tooltip", || 1u8);
        registry.acquire("tooltip", || 1u8);
        assert!(!registry.release("tooltip"));
        assert!(registry.contains("tooltip"));
        assert!(registry.release("tooltip"));
        assert!(!registry.contains("tooltip"));
        assert_eq!(registry.ref_count("tooltip"), 0);
    }

    #[test]
    fn test_release_unknown_is_noop() {
        let registry: SharedInstances<u8> = SharedInstances::new();
        assert!(!registry.release("missing"));
    }

    #[test]
    fn test_over_release_is_noop() {
        let registry = SharedInstances::new();
        registry.acquire("tooltip", || 1u8);
        assert!(registry.release("tooltip"));
        assert!(!registry.release("tooltip"));
        assert_eq!(registry.ref_count("tooltip"), 0);
    }

    #[test]
    fn test_concurrent_acquire_release() {
        let registry = SharedInstances::new();
        let created = AtomicUsize::new(0);
        let dropped = AtomicUsize::new(0);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        registry.acquire("tooltip", || created.fetch_add(1, Ordering::SeqCst));
                        if registry.release("tooltip") {
                            dropped.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        assert!(!registry.contains("tooltip"));
        assert_eq!(created.load(Ordering::SeqCst), dropped.load(Ordering::SeqCst));
    }

    #[test]
    fn test_reacquire_after_drop_creates_new() {
        let registry = SharedInstances::new();
        let first = registry.acquire("tooltip", || 1u8);
        registry.release("tooltip");
        let second = registry.acquire("tooltip", || 2u8);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(*second, 2);
    }
}
