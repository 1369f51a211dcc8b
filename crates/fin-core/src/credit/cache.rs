//! TTL cache for bureau responses
//!
//! Bureau pulls are billed per call, so score and report responses are kept
//! for a day by default.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(86_400);

/// In-memory cache of responses keyed by user ID
pub struct ResponseCache<V> {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, V)>>,
}

impl<V: Clone> ResponseCache<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached value, if present and not expired
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => {
                debug!(key, "Response cache hit");
                Some(value.clone())
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store a value, dropping every entry that has already expired
    pub fn insert(&self, key: &str, value: V) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let ttl = self.ttl;
        entries.retain(|_, (stored_at, _)| stored_at.elapsed() < ttl);
        entries.insert(key.to_string(), (Instant::now(), value));
    }

    pub fn invalidate(&self, key: &str) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for ResponseCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_and_invalidate() {
        let cache: ResponseCache<u16> = ResponseCache::default();
        assert_eq!(cache.ttl(), Duration::from_secs(86_400));
        assert!(cache.get("user123").is_none());

        cache.insert("user123", 735);
        assert_eq!(cache.get("user123"), Some(735));
        assert_eq!(cache.get("other"), None);

        cache.invalidate("user123");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_evicted() {
        let cache: ResponseCache<u16> = ResponseCache::new(Duration::ZERO);
        cache.insert("user123", 735);
        assert_eq!(cache.get("user123"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_insert_purges_other_expired_keys() {
        let cache: ResponseCache<u16> = ResponseCache::new(Duration::ZERO);
        for i in 0..100 {
            cache.insert(&format!("user{}", i), 700);
            assert!(cache.len() <= 1);
        }

        let cache: ResponseCache<u16> = ResponseCache::default();
        cache.insert("a", 1);
        cache.insert("b", 2);
        assert_eq!(cache.len(), 2);
    }
}
