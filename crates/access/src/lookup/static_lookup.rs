//! Static lookup adapter: answers from values fixed at construction.
//!
//! Useful for tests, demos, and the `classify` command, where the caller
//! already knows the facts and only wants the classification.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use salonbook_core::{Profile, RoleTag, UserId};

use super::{LookupError, ProfileLookupPort};

/// Lookup adapter over in-memory values.
///
/// Users with no entry have no profile, are not admins, and own nothing.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    admins: HashSet<UserId>,
    profiles: HashMap<UserId, Profile>,
    business_counts: HashMap<UserId, u32>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_admin(mut self, user_id: impl Into<UserId>) -> Self {
        self.admins.insert(user_id.into());
        self
    }

    pub fn with_profile(mut self, user_id: impl Into<UserId>, role: impl Into<RoleTag>) -> Self {
        let user_id = user_id.into();
        self.profiles
            .insert(user_id.clone(), Profile::new(user_id, role));
        self
    }

    pub fn with_businesses(mut self, user_id: impl Into<UserId>, count: u32) -> Self {
        self.business_counts.insert(user_id.into(), count);
        self
    }
}

#[async_trait]
impl ProfileLookupPort for StaticLookup {
    async fn is_admin(&self, user_id: &UserId) -> Result<bool, LookupError> {
        Ok(self.admins.contains(user_id))
    }

    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, LookupError> {
        Ok(self.profiles.get(user_id).cloned())
    }

    async fn owned_business_count(&self, user_id: &UserId) -> Result<u32, LookupError> {
        Ok(self.business_counts.get(user_id).copied().unwrap_or(0))
    }

    fn lookup_id(&self) -> &str {
        "static"
    }
}
