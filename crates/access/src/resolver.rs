//! The public entry point: user id in, [`UserStateResult`] out.
//!
//! A resolver is built either for a server context ([`UserStateResolver::new`],
//! never cached) or a client context ([`UserStateResolver::with_cache`]).
//! Resolution never fails: lookup errors become the `error` result.

use std::sync::Arc;

use salonbook_core::{classify, classify_failure, RedirectDecision, UserId, UserLookup, UserStateResult};

use crate::cache::UserStateCache;
use crate::config::AccessConfig;
use crate::lookup::{lookup_user, ProfileLookupPort};

/// Per-call options for [`UserStateResolver::get_user_state`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Bypass the cache read. The fresh result still replaces the slot.
    pub skip_cache: bool,
}

impl ResolveOptions {
    pub fn fresh() -> Self {
        ResolveOptions { skip_cache: true }
    }
}

pub struct UserStateResolver {
    port: Arc<dyn ProfileLookupPort>,
    cache: Option<Arc<UserStateCache>>,
}

impl UserStateResolver {
    /// Uncached resolver.
    pub fn new(port: impl ProfileLookupPort + 'static) -> Self {
        Self::from_arc(Arc::new(port), None)
    }

    /// Resolver that memoizes in `cache`. The cache may be shared.
    pub fn with_cache(port: impl ProfileLookupPort + 'static, cache: Arc<UserStateCache>) -> Self {
        Self::from_arc(Arc::new(port), Some(cache))
    }

    pub fn from_arc(port: Arc<dyn ProfileLookupPort>, cache: Option<Arc<UserStateCache>>) -> Self {
        UserStateResolver { port, cache }
    }

    /// Client-context resolver with a fresh cache sized by `[cache]`.
    pub fn from_config(port: Arc<dyn ProfileLookupPort>, config: &AccessConfig) -> Self {
        Self::from_arc(port, Some(Arc::new(UserStateCache::from_config(&config.cache))))
    }

    pub fn cache(&self) -> Option<&Arc<UserStateCache>> {
        self.cache.as_ref()
    }

    pub fn lookup_id(&self) -> &str {
        self.port.lookup_id()
    }

    /// Classify `user_id`. `None` or an empty id means nobody is signed in.
    ///
    /// A clear that lands while the lookup is in flight wins: the result is
    /// still returned but not cached.
    pub async fn get_user_state(
        &self,
        user_id: Option<&UserId>,
        options: ResolveOptions,
    ) -> UserStateResult {
        let uid = match user_id {
            Some(id) if !id.as_str().is_empty() => id,
            _ => return classify(None, &UserLookup::default()),
        };

        if !options.skip_cache {
            if let Some(hit) = self.cache.as_ref().and_then(|c| c.get(uid)) {
                tracing::debug!(user_id = %uid, state = %hit.state(), "user state cache hit");
                return hit;
            }
        }

        let generation = self.cache.as_ref().map(|c| c.generation());
        let lookup = match lookup_user(self.port.as_ref(), Some(uid)).await {
            Ok(Some(lookup)) => lookup,
            Ok(None) => return classify(None, &UserLookup::default()),
            Err(e) => {
                tracing::warn!(user_id = %uid, lookup = self.port.lookup_id(), error = %e, "user state lookup failed");
                return classify_failure();
            }
        };

        let result = classify(Some(uid), &lookup);
        tracing::info!(
            user_id = %uid,
            state = %result.state(),
            reason = %result.reason(),
            "classified user"
        );

        if let (Some(cache), Some(generation)) = (&self.cache, generation) {
            if !cache.put_if_current(generation, uid.clone(), result.clone()) {
                tracing::debug!(user_id = %uid, "cache cleared during lookup, result not stored");
            }
        }
        result
    }

    pub async fn should_redirect_user(&self, user_id: Option<&UserId>) -> RedirectDecision {
        self.get_user_state(user_id, ResolveOptions::default())
            .await
            .into()
    }

    /// Force a fresh lookup, e.g. after the user created a business.
    pub async fn refresh(&self, user_id: Option<&UserId>) -> UserStateResult {
        self.get_user_state(user_id, ResolveOptions::fresh()).await
    }

    /// Drop the cached entry (sign-out). No-op when uncached.
    pub fn clear_user_state_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::static_lookup::StaticLookup;
    use salonbook_core::{RedirectReason, UserState};

    #[tokio::test]
    async fn no_user_is_unauthenticated() {
        let resolver = UserStateResolver::new(StaticLookup::new());
        let result = resolver.get_user_state(None, ResolveOptions::default()).await;
        assert_eq!(result.state(), UserState::S0);
        assert_eq!(result.reason(), RedirectReason::Unauthenticated);
        assert!(!result.is_authenticated());
    }

    #[tokio::test]
    async fn empty_user_id_is_signed_out() {
        let resolver = UserStateResolver::with_cache(
            StaticLookup::new().with_admin("").with_profile("", "owner"),
            Arc::new(UserStateCache::default()),
        );
        let result = resolver
            .get_user_state(Some(&UserId::new("")), ResolveOptions::default())
            .await;
        assert_eq!(result.state(), UserState::S0);
        assert_eq!(result.reason(), RedirectReason::Unauthenticated);
        assert!(resolver.cache().and_then(|c| c.cached_user()).is_none());
    }

    #[tokio::test]
    async fn uncached_resolver_has_no_cache() {
        let resolver = UserStateResolver::new(StaticLookup::new());
        assert!(resolver.cache().is_none());
        resolver.clear_user_state_cache();
        assert_eq!(resolver.lookup_id(), "static");
    }

    #[tokio::test]
    async fn redirect_decision_follows_result() {
        let resolver =
            UserStateResolver::new(StaticLookup::new().with_profile("c", "customer"));
        let decision = resolver
            .should_redirect_user(Some(&UserId::new("c")))
            .await;
        assert!(decision.should_redirect);
        assert_eq!(decision.redirect_url, Some("/customer/dashboard"));
        assert_eq!(decision.reason, RedirectReason::CustomerOnly);
    }
}
