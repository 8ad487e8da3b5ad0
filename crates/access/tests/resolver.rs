//! End-to-end resolution: store-backed lookups, caching, and failure.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;
use salonbook_access::lookup::static_lookup::StaticLookup;
use salonbook_access::lookup::store::StoreLookup;
use salonbook_access::{
    get_redirect_message, AccessConfig, LookupError, ProfileLookupPort, ResolveOptions, UserId,
    UserStateCache, UserStateResolver,
};
use salonbook_core::{Profile, RedirectReason, UserState};
use salonbook_storage::{BusinessRecord, MemoryStore, ProfileRecord, ProfileStore};

const FIXTURE: &str = r#"{
  "profiles": [
    { "user_id": "admin-1", "user_type": "admin" },
    { "user_id": "owner-new", "user_type": "owner" },
    { "user_id": "owner-3", "user_type": "owner" },
    { "user_id": "both-new", "user_type": "both" },
    { "user_id": "cust-1", "user_type": "customer" }
  ],
  "businesses": [
    { "id": "b1", "owner_id": "owner-3", "name": "North" },
    { "id": "b2", "owner_id": "owner-3", "name": "South" },
    { "id": "b3", "owner_id": "owner-3", "name": "East" }
  ]
}"#;

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::from_fixture_json(FIXTURE).unwrap())
}

fn uid(id: &str) -> UserId {
    UserId::new(id)
}

/// Wraps a port and counts how many times the profile was read.
struct CountingPort<P> {
    inner: P,
    profile_reads: Arc<AtomicUsize>,
}

impl<P> CountingPort<P> {
    fn new(inner: P) -> (Self, Arc<AtomicUsize>) {
        let reads = Arc::new(AtomicUsize::new(0));
        (
            CountingPort {
                inner,
                profile_reads: Arc::clone(&reads),
            },
            reads,
        )
    }
}

#[async_trait]
impl<P: ProfileLookupPort> ProfileLookupPort for CountingPort<P> {
    async fn is_admin(&self, user_id: &UserId) -> Result<bool, LookupError> {
        self.inner.is_admin(user_id).await
    }

    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, LookupError> {
        self.profile_reads.fetch_add(1, Ordering::SeqCst);
        self.inner.profile(user_id).await
    }

    async fn owned_business_count(&self, user_id: &UserId) -> Result<u32, LookupError> {
        self.inner.owned_business_count(user_id).await
    }

    fn lookup_id(&self) -> &str {
        self.inner.lookup_id()
    }
}

/// Port whose profile read always fails.
struct FailingPort;

#[async_trait]
impl ProfileLookupPort for FailingPort {
    async fn is_admin(&self, _: &UserId) -> Result<bool, LookupError> {
        Ok(false)
    }

    async fn profile(&self, _: &UserId) -> Result<Option<Profile>, LookupError> {
        Err(LookupError::Unavailable {
            lookup_id: "failing".to_string(),
            message: "connection refused".to_string(),
        })
    }

    async fn owned_business_count(&self, _: &UserId) -> Result<u32, LookupError> {
        Ok(0)
    }

    fn lookup_id(&self) -> &str {
        "failing"
    }
}

/// Port that holds the business count read until released.
struct ParkedPort {
    inner: StaticLookup,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl ProfileLookupPort for ParkedPort {
    async fn is_admin(&self, user_id: &UserId) -> Result<bool, LookupError> {
        self.inner.is_admin(user_id).await
    }

    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, LookupError> {
        self.inner.profile(user_id).await
    }

    async fn owned_business_count(&self, user_id: &UserId) -> Result<u32, LookupError> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.owned_business_count(user_id).await
    }

    fn lookup_id(&self) -> &str {
        "parked"
    }
}

// ──────────────────────────────────────────────
// Scenarios
// ──────────────────────────────────────────────

#[tokio::test]
async fn scenario_a_signed_out() {
    let resolver = UserStateResolver::new(StoreLookup::new(store()));
    let result = resolver.get_user_state(None, ResolveOptions::default()).await;
    assert_eq!(result.state(), UserState::S0);
    assert_eq!(result.redirect_url(), None);
    assert!(!result.can_access_owner_dashboard());
    assert!(!result.can_access_customer_dashboard());
    assert!(!result.can_access_setup());
    assert!(!result.can_access_admin_dashboard());
}

#[tokio::test]
async fn scenario_b_admin() {
    let resolver = UserStateResolver::new(StoreLookup::new(store()));
    let result = resolver
        .get_user_state(Some(&uid("admin-1")), ResolveOptions::default())
        .await;
    assert_eq!(result.state(), UserState::S7);
    assert_eq!(result.redirect_url(), Some("/admin/dashboard"));
    assert!(result.can_access_admin_dashboard());
}

#[tokio::test]
async fn scenario_c_owner_without_business() {
    let resolver = UserStateResolver::new(StoreLookup::new(store()));
    let result = resolver
        .get_user_state(Some(&uid("owner-new")), ResolveOptions::default())
        .await;
    assert_eq!(result.state(), UserState::S3);
    assert_eq!(result.redirect_url(), Some("/setup"));
    assert!(!result.can_access_owner_dashboard());
}

#[tokio::test]
async fn scenario_d_owner_with_businesses() {
    let resolver = UserStateResolver::new(StoreLookup::new(store()));
    let result = resolver
        .get_user_state(Some(&uid("owner-3")), ResolveOptions::default())
        .await;
    assert_eq!(result.state(), UserState::S4);
    assert_eq!(result.business_count(), 3);
    assert_eq!(result.redirect_url(), Some("/owner/dashboard"));
    assert!(result.can_access_owner_dashboard());
}

#[tokio::test]
async fn scenario_e_both_without_business() {
    let resolver = UserStateResolver::new(StoreLookup::new(store()));
    let result = resolver
        .get_user_state(Some(&uid("both-new")), ResolveOptions::default())
        .await;
    assert_eq!(result.state(), UserState::S5);
    assert_eq!(result.redirect_url(), Some("/setup"));
    assert!(result.can_access_customer_dashboard());
    assert!(!result.can_access_owner_dashboard());
}

#[tokio::test]
async fn scenario_f_lookup_failure_fails_closed() {
    let resolver = UserStateResolver::new(FailingPort);
    let result = resolver
        .get_user_state(Some(&uid("anyone")), ResolveOptions::default())
        .await;
    assert_eq!(result.state(), UserState::S0);
    assert_eq!(result.reason(), RedirectReason::Error);
    assert_eq!(result.redirect_url(), None);
    assert!(!result.is_authenticated());
    assert!(!result.can_access_customer_dashboard());
    assert_eq!(
        get_redirect_message(result.reason().as_str()),
        "Something went wrong. Please sign in again."
    );
}

#[tokio::test]
async fn user_without_profile_needs_onboarding() {
    let resolver = UserStateResolver::new(StoreLookup::new(store()));
    let result = resolver
        .get_user_state(Some(&uid("ghost")), ResolveOptions::default())
        .await;
    assert_eq!(result.state(), UserState::S1);
    assert_eq!(result.reason(), RedirectReason::NoProfile);
    assert!(result.is_authenticated());
    assert!(!result.profile_exists());
}

// ──────────────────────────────────────────────
// Caching
// ──────────────────────────────────────────────

#[tokio::test]
async fn repeated_calls_are_served_from_cache() {
    let (port, reads) = CountingPort::new(StoreLookup::new(store()));
    let resolver = UserStateResolver::with_cache(port, Arc::new(UserStateCache::default()));
    let id = uid("owner-3");

    let first = resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    let second = resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(first, second);
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn uncached_resolver_always_looks_up() {
    let (port, reads) = CountingPort::new(StoreLookup::new(store()));
    let resolver = UserStateResolver::new(port);
    let id = uid("owner-3");

    resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn refresh_sees_new_business_and_overwrites_slot() {
    let store = store();
    let cache = Arc::new(UserStateCache::default());
    let resolver = UserStateResolver::with_cache(StoreLookup::new(Arc::clone(&store)), Arc::clone(&cache));
    let id = uid("owner-new");

    let before = resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(before.state(), UserState::S3);

    store
        .insert_business(BusinessRecord {
            id: "b9".to_string(),
            owner_id: "owner-new".to_string(),
            name: "Fresh Cuts".to_string(),
            booking_slug: Some("fresh-cuts".to_string()),
        })
        .await
        .unwrap();

    // Still cached.
    let stale = resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(stale.state(), UserState::S3);

    let fresh = resolver.refresh(Some(&id)).await;
    assert_eq!(fresh.state(), UserState::S4);

    let after = resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(after.state(), UserState::S4);
    assert_eq!(cache.get(&id), Some(fresh));
}

#[tokio::test]
async fn different_user_evicts_previous_entry() {
    let cache = Arc::new(UserStateCache::default());
    let resolver = UserStateResolver::with_cache(StoreLookup::new(store()), Arc::clone(&cache));

    resolver.get_user_state(Some(&uid("cust-1")), ResolveOptions::default()).await;
    resolver.get_user_state(Some(&uid("owner-3")), ResolveOptions::default()).await;

    assert_eq!(cache.cached_user(), Some(uid("owner-3")));
    assert!(cache.get(&uid("cust-1")).is_none());
}

#[tokio::test]
async fn failures_and_signed_out_results_are_not_cached() {
    let cache = Arc::new(UserStateCache::default());
    let resolver = UserStateResolver::with_cache(FailingPort, Arc::clone(&cache));

    resolver.get_user_state(Some(&uid("u1")), ResolveOptions::default()).await;
    resolver.get_user_state(None, ResolveOptions::default()).await;
    assert!(cache.cached_user().is_none());
}

#[tokio::test]
async fn clear_forces_next_lookup() {
    let (port, reads) = CountingPort::new(StaticLookup::new().with_profile("c", "customer"));
    let resolver = UserStateResolver::with_cache(port, Arc::new(UserStateCache::default()));
    let id = uid("c");

    resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    resolver.clear_user_state_cache();
    resolver.clear_user_state_cache();
    resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn shared_cache_is_cleared_for_all_resolvers() {
    let cache = Arc::new(UserStateCache::default());
    let a = UserStateResolver::with_cache(StoreLookup::new(store()), Arc::clone(&cache));
    let b = UserStateResolver::with_cache(StoreLookup::new(store()), Arc::clone(&cache));
    let mut events = cache.subscribe();

    a.get_user_state(Some(&uid("cust-1")), ResolveOptions::default()).await;
    b.clear_user_state_cache();

    assert!(cache.cached_user().is_none());
    assert!(events.try_recv().is_ok());
}

#[tokio::test]
async fn profile_role_change_is_visible_after_refresh() {
    let store = store();
    let resolver = UserStateResolver::with_cache(
        StoreLookup::new(Arc::clone(&store)),
        Arc::new(UserStateCache::default()),
    );
    let id = uid("late-joiner");

    let before = resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(before.state(), UserState::S1);

    store
        .insert_profile(ProfileRecord {
            user_id: "late-joiner".to_string(),
            user_type: "both".to_string(),
            created_at: Some("2026-10-16T09:00:00Z".to_string()),
            updated_at: None,
        })
        .await
        .unwrap();

    let after = resolver.refresh(Some(&id)).await;
    assert_eq!(after.state(), UserState::S5);
}

#[tokio::test]
async fn clear_during_lookup_keeps_stale_result_out_of_cache() {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let port = ParkedPort {
        inner: StaticLookup::new()
            .with_profile("owner-x", "owner")
            .with_businesses("owner-x", 1),
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
    };
    let cache = Arc::new(UserStateCache::default());
    let resolver = Arc::new(UserStateResolver::with_cache(port, Arc::clone(&cache)));

    let task = tokio::spawn({
        let resolver = Arc::clone(&resolver);
        async move {
            resolver
                .get_user_state(Some(&uid("owner-x")), ResolveOptions::default())
                .await
        }
    });

    entered.notified().await;
    resolver.clear_user_state_cache();
    release.notify_one();

    // The in-flight caller still gets its answer.
    let result = task.await.unwrap();
    assert_eq!(result.state(), UserState::S4);
    assert!(result.can_access_owner_dashboard());

    assert!(cache.cached_user().is_none());
    assert!(cache.get(&uid("owner-x")).is_none());
}

#[tokio::test]
async fn configured_ttl_governs_cache_hits() {
    let disabled = AccessConfig::parse("[cache]\nttl_ms = 0\n").unwrap();
    let (port, reads) = CountingPort::new(StoreLookup::new(store()));
    let resolver = UserStateResolver::from_config(Arc::new(port), &disabled);
    let id = uid("owner-3");

    resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(reads.load(Ordering::SeqCst), 2);
    assert_eq!(resolver.cache().map(|c| c.ttl().as_millis()), Some(0));

    let long = AccessConfig::parse("[cache]\nttl_ms = 60000\n").unwrap();
    let (port, reads) = CountingPort::new(StoreLookup::new(store()));
    let resolver = UserStateResolver::from_config(Arc::new(port), &long);

    resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    resolver.get_user_state(Some(&id), ResolveOptions::default()).await;
    assert_eq!(reads.load(Ordering::SeqCst), 1);
}
