//! Lazily populated, read-only artifact registry.
//!
//! Each key owns a `tokio::sync::OnceCell`, so concurrent first loads for the
//! same key are serialized and the loader runs at most once. A failed load
//! leaves the cell empty and the next caller retries.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

type Slot<V> = Arc<OnceCell<Arc<V>>>;

/// Keyed cache of immutable values loaded at most once per key.
pub(crate) struct Registry<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
}

impl<K, V> Default for Registry<K, V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, V> Registry<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Returns the cached value for `key`, running `load` if there is none yet.
    ///
    /// With `refresh` set, any cached value is discarded first so `load` runs again.
    pub(crate) async fn get_or_try_load<F, Fut, E>(
        &self,
        key: K,
        refresh: bool,
        load: F,
    ) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            if refresh {
                slots.remove(&key);
            }
            slots.entry(key).or_default().clone()
        };

        slot.get_or_try_init(|| async { load().await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Returns true if a value for `key` has been loaded.
    #[cfg(test)]
    pub(crate) fn is_loaded(&self, key: &K) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).is_some_and(|slot| slot.initialized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_loads_once_per_key() {
        let registry: Registry<(&str, u16), String> = Registry::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = registry
                .get_or_try_load(("dmoz", 2016), false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, anyhow::Error>("table".to_string())
                })
                .await
                .unwrap();
            assert_eq!(value.as_str(), "table");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_loaded(&("dmoz", 2016)));
        assert!(!registry.is_loaded(&("dmoz", 2017)));
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let registry: Registry<u16, u32> = Registry::default();

        let first = registry
            .get_or_try_load(2016, false, || async { Err::<u32, _>("offline") })
            .await;
        assert_eq!(first.unwrap_err(), "offline");
        assert!(!registry.is_loaded(&2016));

        let second = registry
            .get_or_try_load(2016, false, || async { Ok::<_, &str>(7) })
            .await
            .unwrap();
        assert_eq!(*second, 7);
    }

    #[tokio::test]
    async fn test_refresh_reloads() {
        let registry: Registry<u16, u32> = Registry::default();
        registry
            .get_or_try_load(1, false, || async { Ok::<_, ()>(1) })
            .await
            .unwrap();
        let refreshed = registry
            .get_or_try_load(1, true, || async { Ok::<_, ()>(2) })
            .await
            .unwrap();
        assert_eq!(*refreshed, 2);
    }

    #[tokio::test]
    async fn test_concurrent_first_load_is_single_flight() {
        let registry: Arc<Registry<u16, u32>> = Arc::new(Registry::default());
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let registry = registry.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                registry
                    .get_or_try_load(2017, false, || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        Ok::<_, ()>(42)
                    })
                    .await
            }));
        }

        for handle in handles {
            assert_eq!(*handle.await.unwrap().unwrap(), 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
