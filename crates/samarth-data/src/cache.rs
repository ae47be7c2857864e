//! Time-limited cache of successful fetches

use samarth_core::models::FetchedData;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry {
    stored_at: Instant,
    data: FetchedData,
}

/// In-memory response cache keyed by `"<fn>|<args>"`.
///
/// Only successful results are stored. Identical concurrent misses both reach
/// the network.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    ttl: Duration,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            enabled: true,
        }
    }

    /// A cache that never stores anything
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new(Duration::ZERO)
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `key`, if any
    pub fn get(&self, key: &str) -> Option<FetchedData> {
        if !self.enabled {
            return None;
        }

        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.data.clone())
    }

    pub fn put(&self, key: impl Into<String>, data: FetchedData) {
        if !self.enabled {
            return;
        }

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        entries.insert(
            key.into(),
            CacheEntry {
                stored_at: Instant::now(),
                data,
            },
        );
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use samarth_core::models::DatasetRecords;

    fn data() -> FetchedData {
        FetchedData {
            api_url: "http://localhost/water".to_string(),
            total_fetched: 0,
            records: DatasetRecords::Water {
                crop: None,
                records: Vec::new(),
            },
        }
    }

    #[test]
    fn test_put_and_get() {
        let cache = ResponseCache::new(Duration::from_secs(60));
        assert!(cache.get("fetch_water_usage|").is_none());

        cache.put("fetch_water_usage|", data());
        assert_eq!(cache.get("fetch_water_usage|").unwrap().api_url, "http://localhost/water");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_are_misses() {
        let cache = ResponseCache::new(Duration::ZERO);
        cache.put("k", data());
        assert!(cache.get("k").is_none());
    }

    #[test]
    fn test_disabled_cache() {
        let cache = ResponseCache::disabled();
        cache.put("k", data());
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
        assert!(!cache.is_enabled());
    }
}
