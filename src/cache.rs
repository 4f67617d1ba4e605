use dashmap::DashMap;
use serde::Serialize;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// Entry ceiling before LRU eviction kicks in. The key space here is small
/// (dashboard periods + car-list filter combinations), so this is generous.
const MAX_CACHE_ENTRIES: usize = 256;

static CACHE: OnceLock<DashMap<String, CacheEntry>> = OnceLock::new();

#[derive(Clone)]
struct CacheEntry {
    data: String,
    expires_at: Instant,
    last_accessed: Instant,
}

fn get_cache() -> &'static DashMap<String, CacheEntry> {
    CACHE.get_or_init(DashMap::new)
}

/// Get cached data if it exists and hasn't expired
pub fn get<T: for<'de> serde::Deserialize<'de>>(key: &str) -> Option<T> {
    let cache = get_cache();

    if let Some(mut entry) = cache.get_mut(key) {
        if Instant::now() < entry.expires_at {
            entry.last_accessed = Instant::now();
            if let Ok(data) = serde_json::from_str(&entry.data) {
                return Some(data);
            }
        } else {
            drop(entry);
            cache.remove(key);
        }
    }

    None
}

/// Set cached data with TTL (time to live)
pub fn set<T: Serialize>(key: &str, data: &T, ttl: Duration) -> Result<(), serde_json::Error> {
    let cache = get_cache();

    if cache.len() >= MAX_CACHE_ENTRIES {
        evict_lru_entries();
    }

    let now = Instant::now();
    let entry = CacheEntry {
        data: serde_json::to_string(data)?,
        expires_at: now + ttl,
        last_accessed: now,
    };

    cache.insert(key.to_string(), entry);
    Ok(())
}

/// Drop every entry whose key starts with `prefix`. Write paths call this so
/// stale lists and dashboards never outlive a mutation.
pub fn invalidate_prefix(prefix: &str) {
    let cache = get_cache();
    let before = cache.len();
    cache.retain(|key, _| !key.starts_with(prefix));
    let removed = before - cache.len();
    if removed > 0 {
        tracing::debug!("Cache invalidation: removed {} '{}*' entries", removed, prefix);
    }
}

/// Evict the least recently used quarter of the cache.
fn evict_lru_entries() {
    let cache = get_cache();
    let current_size = cache.len();
    let target_remove = current_size / 4;

    if target_remove == 0 {
        return;
    }

    let mut entries: Vec<(String, Instant)> = cache
        .iter()
        .map(|entry| (entry.key().clone(), entry.value().last_accessed))
        .collect();

    entries.sort_by_key(|(_, last_accessed)| *last_accessed);

    for (key, _) in entries.iter().take(target_remove) {
        cache.remove(key);
    }

    tracing::info!(
        "🗑️  Cache eviction: removed {} LRU entries (cache size: {} -> {})",
        target_remove,
        current_size,
        cache.len()
    );
}
