//! Direct-store lookup adapter.
//!
//! Reads profiles and business counts straight from a [`ProfileStore`].
//! Used where the caller has trusted data access (server-side rendering,
//! the `serve` command). Read-only.

use std::sync::Arc;

use async_trait::async_trait;
use salonbook_core::{Profile, UserId, UserType};
use salonbook_storage::{ProfileRecord, ProfileStore, StorageError};

use super::{LookupError, ProfileLookupPort};

pub struct StoreLookup<S: ProfileStore> {
    store: Arc<S>,
}

impl<S: ProfileStore> StoreLookup<S> {
    pub fn new(store: Arc<S>) -> Self {
        StoreLookup { store }
    }

    fn backend_error(e: StorageError) -> LookupError {
        LookupError::Backend {
            lookup_id: "store".to_string(),
            message: e.to_string(),
        }
    }
}

fn to_profile(record: ProfileRecord) -> Profile {
    Profile {
        user_id: UserId::new(record.user_id),
        user_type: record.user_type.into(),
        created_at: record.created_at,
        updated_at: record.updated_at,
    }
}

#[async_trait]
impl<S: ProfileStore> ProfileLookupPort for StoreLookup<S> {
    async fn is_admin(&self, user_id: &UserId) -> Result<bool, LookupError> {
        let record = self
            .store
            .get_profile(user_id.as_str())
            .await
            .map_err(Self::backend_error)?;
        Ok(record.is_some_and(|r| r.user_type == UserType::Admin.as_str()))
    }

    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, LookupError> {
        let record = self
            .store
            .get_profile(user_id.as_str())
            .await
            .map_err(Self::backend_error)?;
        Ok(record.map(to_profile))
    }

    async fn owned_business_count(&self, user_id: &UserId) -> Result<u32, LookupError> {
        self.store
            .count_businesses_by_owner(user_id.as_str())
            .await
            .map_err(Self::backend_error)
    }

    fn lookup_id(&self) -> &str {
        "store"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use salonbook_core::RoleTag;
    use salonbook_storage::{BusinessRecord, MemoryStore};

    async fn seeded() -> Arc<MemoryStore> {
        let store = MemoryStore::new();
        for (id, role) in [("admin-1", "admin"), ("owner-1", "owner"), ("odd-1", "partner")] {
            store
                .insert_profile(ProfileRecord {
                    user_id: id.to_string(),
                    user_type: role.to_string(),
                    created_at: None,
                    updated_at: None,
                })
                .await
                .unwrap();
        }
        store
            .insert_business(BusinessRecord {
                id: "b1".to_string(),
                owner_id: "owner-1".to_string(),
                name: "Fade Room".to_string(),
                booking_slug: None,
            })
            .await
            .unwrap();
        Arc::new(store)
    }

    #[tokio::test]
    async fn admin_check_reads_role_tag() {
        let lookup = StoreLookup::new(seeded().await);
        assert!(lookup.is_admin(&UserId::new("admin-1")).await.unwrap());
        assert!(!lookup.is_admin(&UserId::new("owner-1")).await.unwrap());
        assert!(!lookup.is_admin(&UserId::new("nobody")).await.unwrap());
    }

    #[tokio::test]
    async fn profile_maps_role_tags() {
        let lookup = StoreLookup::new(seeded().await);
        let owner = lookup.profile(&UserId::new("owner-1")).await.unwrap().unwrap();
        assert_eq!(owner.user_type, RoleTag::Known(UserType::Owner));
        let odd = lookup.profile(&UserId::new("odd-1")).await.unwrap().unwrap();
        assert_eq!(odd.user_type, RoleTag::Unrecognized("partner".to_string()));
        assert!(lookup.profile(&UserId::new("nobody")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn counts_owned_businesses() {
        let lookup = StoreLookup::new(seeded().await);
        assert_eq!(
            lookup
                .owned_business_count(&UserId::new("owner-1"))
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            lookup
                .owned_business_count(&UserId::new("admin-1"))
                .await
                .unwrap(),
            0
        );
    }

    struct BrokenStore;

    #[async_trait]
    impl ProfileStore for BrokenStore {
        async fn get_profile(&self, _: &str) -> Result<Option<ProfileRecord>, StorageError> {
            Err(StorageError::Backend("connection reset".to_string()))
        }
        async fn count_businesses_by_owner(&self, _: &str) -> Result<u32, StorageError> {
            Err(StorageError::Backend("connection reset".to_string()))
        }
        async fn list_businesses_by_owner(
            &self,
            _: &str,
        ) -> Result<Vec<BusinessRecord>, StorageError> {
            Err(StorageError::Backend("connection reset".to_string()))
        }
        async fn insert_profile(&self, _: ProfileRecord) -> Result<(), StorageError> {
            Err(StorageError::Backend("read only".to_string()))
        }
        async fn insert_business(&self, _: BusinessRecord) -> Result<(), StorageError> {
            Err(StorageError::Backend("read only".to_string()))
        }
    }

    #[tokio::test]
    async fn storage_failure_is_a_hard_backend_error() {
        let lookup = StoreLookup::new(Arc::new(BrokenStore));
        let err = lookup.profile(&UserId::new("u")).await.unwrap_err();
        assert!(matches!(err, LookupError::Backend { .. }));
        assert!(!err.is_soft());
        assert!(err.to_string().contains("connection reset"));
    }
}
