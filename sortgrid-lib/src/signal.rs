//! Render invalidation signal.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::Notify;

/// Tells the view layer that visible state changed.
///
/// Carries no payload: the view re-reads rows, sort state and the
/// end-of-data flag. Cheap to clone; clones share the same signal.
///
/// A view can poll `is_dirty()`/`clear_dirty()` from its render loop, or
/// await `changed()`.
#[derive(Debug, Clone, Default)]
pub struct Invalidation {
    inner: Arc<InvalidationInner>,
}

#[derive(Debug, Default)]
struct InvalidationInner {
    dirty: AtomicBool,
    epoch: AtomicU64,
    notify: Notify,
}

impl Invalidation {
    /// Creates a clean signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the view dirty and wakes waiters.
    pub fn invalidate(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        self.inner.dirty.store(true, Ordering::SeqCst);
        self.inner.notify.notify_waiters();
    }

    /// Check if the view needs a re-render.
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag.
    pub fn clear_dirty(&self) {
        self.inner.dirty.store(false, Ordering::SeqCst);
    }

    /// Number of invalidations emitted so far.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Waits for the next invalidation after this call.
    pub async fn changed(&self) {
        self.inner.notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dirty_and_epoch() {
        let signal = Invalidation::new();
        assert!(!signal.is_dirty());
        signal.invalidate();
        signal.clone().invalidate();
        assert!(signal.is_dirty());
        assert_eq!(signal.epoch(), 2);
        signal.clear_dirty();
        assert!(!signal.is_dirty());
    }

    #[tokio::test]
    async fn test_changed_wakes_waiter() {
        let signal = Invalidation::new();
        let waiter = signal.clone();
        let task = tokio::spawn(async move { waiter.changed().await });
        tokio::task::yield_now().await;
        while !task.is_finished() {
            signal.invalidate();
            tokio::task::yield_now().await;
        }
        task.await.unwrap();
    }
}
