use crate::scoring::round_to;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Canonical cache key: the operation name followed by its parameters sorted
/// by name, each rounded to two decimals.
///
/// Rounding is deliberate; thresholds such as `0.501` and `0.499` share the
/// `0.50` entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(operation: &str, params: &[(&str, f64)]) -> Self {
        let mut params: Vec<(&str, f64)> = params.to_vec();
        params.sort_by(|left, right| left.0.cmp(right.0));

        let rendered = params
            .iter()
            .map(|(name, value)| format!("{name}={:.2}", round_to(*value, 2)))
            .collect::<Vec<_>>()
            .join(",");

        Self(format!("{operation}:{rendered}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable within a process; used to shorten keys in log output.
    pub fn digest(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.0.hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.digest())
    }
}

struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
}

/// In-process memo of expensive population scans.
///
/// Expiry is checked lazily when an entry is read. Concurrent misses on the
/// same key may both compute and insert; the last write wins.
pub struct ResultCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<CacheKey, CacheEntry<V>>>,
}

impl<V: Clone> ResultCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, key: &CacheKey) -> Option<V> {
        self.get_at(key, Instant::now())
    }

    pub(crate) fn get_at(&self, key: &CacheKey, now: Instant) -> Option<V> {
        let mut guard = self.entries.lock().expect("result cache mutex poisoned");
        let expired = match guard.get(key) {
            Some(entry) if now.saturating_duration_since(entry.stored_at) < self.ttl => {
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            guard.remove(key);
        }
        None
    }

    pub fn insert(&self, key: CacheKey, value: V) {
        self.insert_at(key, value, Instant::now());
    }

    pub(crate) fn insert_at(&self, key: CacheKey, value: V, now: Instant) {
        let mut guard = self.entries.lock().expect("result cache mutex poisoned");
        guard.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
            },
        );
    }

    /// Returns the cached value or computes it without holding the lock.
    pub fn get_or_insert_with<F>(&self, key: CacheKey, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }

        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Drops every expired entry, returning how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.purge_expired_at(Instant::now())
    }

    pub(crate) fn purge_expired_at(&self, now: Instant) -> usize {
        let mut guard = self.entries.lock().expect("result cache mutex poisoned");
        let before = guard.len();
        guard.retain(|_, entry| now.saturating_duration_since(entry.stored_at) < self.ttl);
        before - guard.len()
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .expect("result cache mutex poisoned")
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("result cache mutex poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
