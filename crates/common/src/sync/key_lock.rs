//! Per-key mutual exclusion
//!
//! [`KeyLocks`] hands out one mutex per string key so that check-then-set
//! sequences on the same key can be serialized without blocking unrelated
//! keys. Locks are created lazily and kept for the lifetime of the registry.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::{Mutex, MutexGuard};

/// Registry of lazily created per-key locks
#[derive(Debug, Clone, Default)]
pub struct KeyLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl KeyLocks {
    /// Create an empty lock registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `key`
    pub fn with_lock<T>(&self, key: &str, f: impl FnOnce() -> T) -> T {
        let mutex = self.mutex_for(key);
        let _guard: MutexGuard<'_, ()> = mutex.lock();
        f()
    }

    /// Number of keys that have been locked at least once
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// Whether no key has been locked yet
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    fn mutex_for(&self, key: &str) -> Arc<Mutex<()>> {
        if let Some(existing) = self.locks.get(key) {
            return Arc::clone(existing.value());
        }
        Arc::clone(self.locks.entry(key.to_string()).or_default().value())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_same_key_is_serialized() {
        let locks = KeyLocks::new();
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locks = locks.clone();
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                thread::spawn(move || {
                    locks.with_lock("orders-v1", || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(5));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert_eq!(locks.len(), 1);
    }

    #[test]
    fn test_distinct_keys_do_not_block() {
        let locks = KeyLocks::new();
        let nested = locks.with_lock("a", || locks.with_lock("b", || 42));
        assert_eq!(nested, 42);
        assert_eq!(locks.len(), 2);
    }
}
