//! Single-slot memoization of the last classification.
//!
//! The cache holds at most one entry: the most recent `(user id, result)`
//! pair and the instant it was stored. A read hits only when the queried id
//! matches the slot and the entry is younger than the TTL. Storing a result
//! for a different user evicts the previous one.
//!
//! `clear()` notifies subscribers so other holders of a cache (another
//! resolver, another session) can drop their own slot. Every clear also
//! advances the cache generation: a writer that read the generation before
//! a clear cannot store its result after it (see [`UserStateCache::put_if_current`]).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::{Duration, Instant};

use salonbook_core::{UserId, UserStateResult};
use tokio::sync::broadcast;

use crate::config::CacheConfig;

/// Default time-to-live of a cached classification.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

const EVENT_CAPACITY: usize = 16;

/// Notifications published by a [`UserStateCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheEvent {
    Cleared,
}

#[derive(Debug, Clone)]
struct Slot {
    user_id: UserId,
    result: UserStateResult,
    stored_at: Instant,
}

/// One-entry TTL cache of [`UserStateResult`]s, keyed by user id.
#[derive(Debug)]
pub struct UserStateCache {
    ttl: Duration,
    slot: Mutex<Option<Slot>>,
    /// Bumped under the slot lock on every clear.
    generation: AtomicU64,
    events: broadcast::Sender<CacheEvent>,
}

impl UserStateCache {
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        UserStateCache {
            ttl,
            slot: Mutex::new(None),
            generation: AtomicU64::new(0),
            events,
        }
    }

    /// Cache with the TTL from `[cache] ttl_ms`. A TTL of zero never hits.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.ttl())
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get(&self, user_id: &UserId) -> Option<UserStateResult> {
        self.get_at(user_id, Instant::now())
    }

    /// Look up `user_id` as of `now`.
    ///
    /// An entry stored "in the future" relative to `now` counts as age zero.
    pub fn get_at(&self, user_id: &UserId, now: Instant) -> Option<UserStateResult> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|s| &s.user_id == user_id)
            .filter(|s| now.saturating_duration_since(s.stored_at) < self.ttl)
            .map(|s| s.result.clone())
    }

    pub fn put(&self, user_id: UserId, result: UserStateResult) {
        self.put_at(user_id, result, Instant::now());
    }

    /// Overwrite the slot, whoever it belonged to.
    pub fn put_at(&self, user_id: UserId, result: UserStateResult, now: Instant) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Slot {
            user_id,
            result,
            stored_at: now,
        });
    }

    /// Current generation. Read it before starting a lookup whose result
    /// will be passed to [`put_if_current`](Self::put_if_current).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Store `result` unless the cache was cleared after `generation` was
    /// read. Returns whether the slot was written.
    pub fn put_if_current(&self, generation: u64, user_id: UserId, result: UserStateResult) -> bool {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        if self.generation.load(Ordering::Acquire) != generation {
            return false;
        }
        *slot = Some(Slot {
            user_id,
            result,
            stored_at: Instant::now(),
        });
        true
    }

    /// Empty the slot and notify subscribers. Safe to call when already empty.
    pub fn clear(&self) {
        self.clear_slot();
        // No receivers is fine.
        let _ = self.events.send(CacheEvent::Cleared);
    }

    /// The id currently occupying the slot, expired or not.
    pub fn cached_user(&self) -> Option<UserId> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.as_ref().map(|s| s.user_id.clone())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Empty this cache's slot whenever `source` is cleared.
    ///
    /// Runs on the current tokio runtime and stops once either cache is
    /// dropped. The follower's own subscribers are not notified, so two
    /// caches following each other do not loop.
    pub fn clear_on(self: &Arc<Self>, source: &UserStateCache) -> tokio::task::JoinHandle<()> {
        let mut events = source.subscribe();
        let follower: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(CacheEvent::Cleared) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        match follower.upgrade() {
                            Some(cache) => cache.clear_slot(),
                            None => break,
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    fn clear_slot(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

impl Default for UserStateCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use salonbook_core::{classify, Profile, UserLookup, UserState};

    fn owner_result(id: &str) -> UserStateResult {
        let uid = UserId::new(id);
        classify(
            Some(&uid),
            &UserLookup {
                is_admin: false,
                profile: Some(Profile::new(id, "owner")),
                business_count: 1,
            },
        )
    }

    #[test]
    fn empty_cache_misses() {
        let cache = UserStateCache::default();
        assert_eq!(cache.ttl(), DEFAULT_TTL);
        assert!(cache.get(&UserId::new("a")).is_none());
        assert!(cache.cached_user().is_none());
    }

    #[test]
    fn hit_within_ttl() {
        let cache = UserStateCache::default();
        let t0 = Instant::now();
        cache.put_at(UserId::new("a"), owner_result("a"), t0);

        let hit = cache.get_at(&UserId::new("a"), t0 + Duration::from_millis(4999));
        assert_eq!(hit.map(|r| r.state()), Some(UserState::S4));
    }

    #[test]
    fn expires_at_ttl() {
        let cache = UserStateCache::default();
        let t0 = Instant::now();
        cache.put_at(UserId::new("a"), owner_result("a"), t0);

        assert!(cache.get_at(&UserId::new("a"), t0 + DEFAULT_TTL).is_none());
        // Expired entries still occupy the slot until overwritten.
        assert_eq!(cache.cached_user(), Some(UserId::new("a")));
    }

    #[test]
    fn other_user_misses_and_evicts() {
        let cache = UserStateCache::default();
        let t0 = Instant::now();
        cache.put_at(UserId::new("a"), owner_result("a"), t0);
        assert!(cache.get_at(&UserId::new("b"), t0).is_none());

        cache.put_at(UserId::new("b"), owner_result("b"), t0);
        assert!(cache.get_at(&UserId::new("a"), t0).is_none());
        assert!(cache.get_at(&UserId::new("b"), t0).is_some());
    }

    #[test]
    fn entry_from_the_future_counts_as_fresh() {
        let cache = UserStateCache::default();
        let t0 = Instant::now();
        cache.put_at(UserId::new("a"), owner_result("a"), t0 + Duration::from_secs(1));
        assert!(cache.get_at(&UserId::new("a"), t0).is_some());
    }

    #[test]
    fn zero_ttl_never_hits() {
        let cache = UserStateCache::new(Duration::ZERO);
        let t0 = Instant::now();
        cache.put_at(UserId::new("a"), owner_result("a"), t0);
        assert!(cache.get_at(&UserId::new("a"), t0).is_none());
    }

    #[test]
    fn clear_is_idempotent() {
        let cache = UserStateCache::default();
        cache.clear();
        cache.put(UserId::new("a"), owner_result("a"));
        cache.clear();
        cache.clear();
        assert!(cache.get(&UserId::new("a")).is_none());
    }

    #[test]
    fn write_from_before_clear_is_dropped() {
        let cache = UserStateCache::default();
        let before = cache.generation();
        cache.clear();

        assert!(!cache.put_if_current(before, UserId::new("a"), owner_result("a")));
        assert!(cache.cached_user().is_none());

        let now = cache.generation();
        assert!(cache.put_if_current(now, UserId::new("a"), owner_result("a")));
        assert!(cache.get(&UserId::new("a")).is_some());
    }

    #[test]
    fn ttl_comes_from_config() {
        let cache = UserStateCache::from_config(&CacheConfig { ttl_ms: 250 });
        assert_eq!(cache.ttl(), Duration::from_millis(250));

        let t0 = Instant::now();
        cache.put_at(UserId::new("a"), owner_result("a"), t0);
        assert!(cache.get_at(&UserId::new("a"), t0 + Duration::from_millis(249)).is_some());
        assert!(cache.get_at(&UserId::new("a"), t0 + Duration::from_millis(250)).is_none());
    }

    #[tokio::test]
    async fn clear_notifies_but_put_does_not() {
        let cache = UserStateCache::default();
        let mut events = cache.subscribe();

        cache.put(UserId::new("a"), owner_result("a"));
        assert!(matches!(
            events.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));

        cache.clear();
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Cleared);
    }

    #[tokio::test]
    async fn follower_clears_when_source_clears() {
        let source = UserStateCache::default();
        let follower = Arc::new(UserStateCache::default());
        let _task = follower.clear_on(&source);

        let mut follower_events = follower.subscribe();
        follower.put(UserId::new("a"), owner_result("a"));
        source.clear();

        for _ in 0..100 {
            if follower.cached_user().is_none() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(follower.cached_user().is_none());
        // Following does not re-broadcast.
        assert!(follower_events.try_recv().is_err());
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let cache = Arc::new(UserStateCache::default());
        cache.put(UserId::new("a"), owner_result("a"));

        let c = Arc::clone(&cache);
        let _ = std::thread::spawn(move || {
            let _guard = c.slot.lock().unwrap();
            panic!("poison the slot");
        })
        .join();

        assert!(cache.get(&UserId::new("a")).is_some());
        cache.clear();
        assert!(cache.get(&UserId::new("a")).is_none());
    }
}
