use ipmon_application::ports::{Clock, ResolutionCachePort};
use ipmon_domain::ResolutionResult;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

struct CacheEntry {
    result: ResolutionResult,
    inserted_at: chrono::DateTime<chrono::Utc>,
}

/// Bounded resolution cache with a fixed TTL.
///
/// Eviction is by first insertion: entries are only ever read through
/// `peek`, so the LRU order never changes after `push`, and overwriting an
/// existing key keeps its slot.
pub struct LruResolutionCache {
    entries: Mutex<LruCache<String, CacheEntry>>,
    ttl: chrono::Duration,
    clock: Arc<dyn Clock>,
}

impl LruResolutionCache {
    pub fn new(capacity: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

impl ResolutionCachePort for LruResolutionCache {
    fn get(&self, domain: &str, exclude_local_domains: bool) -> Option<ResolutionResult> {
        let now = self.clock.now();
        let entries = self.lock();
        let entry = entries.peek(domain)?;

        if now - entry.inserted_at > self.ttl {
            return None;
        }
        if entry.result.is_local() && !exclude_local_domains {
            return None;
        }
        Some(entry.result.clone())
    }

    fn put(&self, domain: &str, result: ResolutionResult) {
        let entry = CacheEntry {
            result,
            inserted_at: self.clock.now(),
        };

        let mut entries = self.lock();
        if let Some(slot) = entries.peek_mut(domain) {
            *slot = entry;
            return;
        }
        if let Some((evicted, _)) = entries.push(domain.to_string(), entry) {
            debug!(evicted = %evicted, "Cache full, evicted oldest entry");
        }
    }

    fn clear(&self) {
        self.lock().clear();
    }

    fn len(&self) -> usize {
        self.lock().len()
    }
}
