//! At-most-one-in-flight-per-fingerprint request deduplication (spec.md
//! §4.5: "identical fingerprints in flight at once are collapsed into a
//! single upstream request").

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};

/// Collapses concurrent calls sharing the same key into a single execution
/// of the underlying operation; all callers observe the same result.
pub struct SingleFlight<K, V> {
    inflight: Mutex<HashMap<K, Arc<OnceCell<Result<V, String>>>>>,
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self { inflight: Mutex::new(HashMap::new()) }
    }
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `make` for `key`, or, if another caller is already running (or
    /// has already completed) the same `key`, await that shared result
    /// instead of issuing a second request.
    pub async fn run<F, Fut>(&self, key: K, make: F) -> Result<V, String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, String>>,
    {
        let cell = {
            let mut table = self.inflight.lock().await;
            table.entry(key).or_insert_with(|| Arc::new(OnceCell::new())).clone()
        };
        cell.get_or_init(make).await.clone()
    }

    /// Evict a completed entry so a future call with the same key issues a
    /// fresh request rather than replaying a stale result.
    pub async fn forget(&self, key: &K) {
        self.inflight.lock().await.remove(key);
    }
}
