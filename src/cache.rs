//! Memoized load results
//!
//! One computation per key; every caller for that key shares the same
//! `Arc<LoadOutcome>` until the key is invalidated. Concurrent first callers
//! block on the single in-flight load instead of starting their own.

use crate::config::LoaderConfig;
use crate::loader::LoadOutcome;
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cache key: the ordered candidate path list.
pub type CacheKey = Vec<PathBuf>;

type Slot = Arc<OnceCell<Arc<LoadOutcome>>>;

#[derive(Default)]
pub struct LoadCache {
    entries: Mutex<HashMap<CacheKey, Slot>>,
}

impl LoadCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, Slot>> {
        // A panic inside a loader never leaves the map half-updated
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cached outcome for `key`, computing it with `load` on first use.
    pub fn get_or_load<F>(&self, key: &[PathBuf], load: F) -> Arc<LoadOutcome>
    where
        F: FnOnce() -> LoadOutcome,
    {
        let slot = {
            let mut entries = self.entries();
            Arc::clone(entries.entry(key.to_vec()).or_default())
        };

        let mut computed = false;
        let outcome = slot.get_or_init(|| {
            computed = true;
            Arc::new(load())
        });
        if computed {
            tracing::debug!(key = ?key, "load cache miss");
        } else {
            tracing::trace!(key = ?key, "load cache hit");
        }
        Arc::clone(outcome)
    }

    /// Cached outcome for a config, keyed by its source list.
    pub fn fetch(&self, config: &LoaderConfig) -> Arc<LoadOutcome> {
        self.get_or_load(&config.sources, || config.load())
    }

    /// Drop the entry for `key`. Returns true if something was cached.
    pub fn invalidate(&self, key: &[PathBuf]) -> bool {
        let removed = self.entries().remove(key).is_some();
        if removed {
            tracing::info!(key = ?key, "load cache invalidated");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries().clear();
        tracing::info!("load cache cleared");
    }

    pub fn contains(&self, key: &[PathBuf]) -> bool {
        self.entries()
            .get(key)
            .map(|slot| slot.get().is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::full_load;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    fn key(name: &str) -> CacheKey {
        vec![PathBuf::from(name)]
    }

    fn missing_outcome() -> LoadOutcome {
        full_load(&["no-such-source.xlsx"], &[], &[])
    }

    #[test]
    fn test_memoizes_per_key() {
        let cache = LoadCache::new();
        let calls = AtomicUsize::new(0);

        let a = cache.get_or_load(&key("a"), || {
            calls.fetch_add(1, Ordering::SeqCst);
            missing_outcome()
        });
        let b = cache.get_or_load(&key("a"), || {
            calls.fetch_add(1, Ordering::SeqCst);
            missing_outcome()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(cache.contains(&key("a")));
        assert!(!cache.contains(&key("b")));
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let cache = LoadCache::new();
        let first = cache.get_or_load(&key("a"), missing_outcome);

        assert!(cache.invalidate(&key("a")));
        assert!(!cache.invalidate(&key("a")));

        let second = cache.get_or_load(&key("a"), missing_outcome);
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_clear() {
        let cache = LoadCache::new();
        cache.get_or_load(&key("a"), missing_outcome);
        cache.get_or_load(&key("b"), missing_outcome);
        assert_eq!(cache.len(), 2);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_callers_share_one_computation() {
        let cache = Arc::new(LoadCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache.get_or_load(&key("shared"), || {
                        calls.fetch_add(1, Ordering::SeqCst);
                        thread::sleep(std::time::Duration::from_millis(20));
                        missing_outcome()
                    })
                })
            })
            .collect();

        let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for outcome in &outcomes[1..] {
            assert!(Arc::ptr_eq(&outcomes[0], outcome));
        }
    }
}
