use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Views a mutation can make stale. Mirrors the cache tags of the public
/// site so both frontends drop the same pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewTag {
    Business,
    Orders,
    Transactions,
    Notifications,
    Content,
}

/// Time-to-live for cached read views.
pub const VIEW_TTL: Duration = Duration::from_secs(30);

/// Tag sets declared by each mutation family. Every mutation applies its
/// set through `BackofficeService::invalidate`, so adding a mutation means
/// picking a set here instead of sprinkling ad-hoc invalidation calls.
pub const STAFF_TAGS: &[ViewTag] = &[ViewTag::Business];
pub const ORDER_TAGS: &[ViewTag] = &[ViewTag::Business, ViewTag::Orders];
pub const PAYMENT_TAGS: &[ViewTag] = &[ViewTag::Business, ViewTag::Orders];
pub const PAYOUT_TAGS: &[ViewTag] = &[ViewTag::Business, ViewTag::Orders, ViewTag::Transactions];
pub const PAYOUT_REMOVAL_TAGS: &[ViewTag] = &[
    ViewTag::Business,
    ViewTag::Orders,
    ViewTag::Transactions,
    ViewTag::Notifications,
];
pub const LEDGER_TAGS: &[ViewTag] = &[ViewTag::Business, ViewTag::Transactions];
pub const NOTIFICATION_TAGS: &[ViewTag] = &[ViewTag::Notifications];
pub const CONTENT_TAGS: &[ViewTag] = &[ViewTag::Content];

/// A single cached view guarded by a fixed TTL and dropped early whenever
/// a committed mutation declares one of the view's tags.
pub struct TaggedCache<T> {
    tags: &'static [ViewTag],
    ttl: Duration,
    slot: Mutex<Option<Slot<T>>>,
}

struct Slot<T> {
    value: T,
    stored_at: Instant,
}

impl<T: Clone> TaggedCache<T> {
    pub fn new(tags: &'static [ViewTag], ttl: Duration) -> Self {
        Self {
            tags,
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The cached value, if one is present and still fresh.
    pub fn get(&self) -> Option<T> {
        let slot = self.lock();
        let cached = slot.as_ref()?;
        if cached.stored_at.elapsed() >= self.ttl {
            return None;
        }
        Some(cached.value.clone())
    }

    pub fn put(&self, value: T) {
        *self.lock() = Some(Slot {
            value,
            stored_at: Instant::now(),
        });
    }

    /// Drop the cached value when the mutation's tag set touches this view.
    pub fn invalidate(&self, tags: &[ViewTag]) {
        if tags.iter().any(|tag| self.tags.contains(tag)) {
            self.lock().take();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Slot<T>>> {
        // A poisoned lock means a reader panicked mid-clone; the slot itself
        // is still sound to read or overwrite.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_empty() {
        let cache: TaggedCache<u32> = TaggedCache::new(&[ViewTag::Business], VIEW_TTL);
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_serves_within_ttl() {
        let cache = TaggedCache::new(&[ViewTag::Business], Duration::from_secs(60));
        cache.put(7);
        assert_eq!(cache.get(), Some(7));
    }

    #[test]
    fn test_expires_after_ttl() {
        let cache = TaggedCache::new(&[ViewTag::Business], Duration::from_millis(5));
        cache.put(7);
        std::thread::sleep(Duration::from_millis(10));
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_intersecting_tag_invalidates() {
        let cache = TaggedCache::new(&[ViewTag::Business], Duration::from_secs(60));
        cache.put(7);
        cache.invalidate(PAYOUT_TAGS);
        assert!(cache.get().is_none());
    }

    #[test]
    fn test_disjoint_tag_keeps_value() {
        let cache = TaggedCache::new(&[ViewTag::Business], Duration::from_secs(60));
        cache.put(7);
        cache.invalidate(NOTIFICATION_TAGS);
        assert_eq!(cache.get(), Some(7));
        cache.invalidate(CONTENT_TAGS);
        assert_eq!(cache.get(), Some(7));
    }

    #[test]
    fn test_overwrite_refreshes_value() {
        let cache = TaggedCache::new(&[ViewTag::Business], Duration::from_secs(60));
        cache.put(1);
        cache.put(2);
        assert_eq!(cache.get(), Some(2));
    }
}
