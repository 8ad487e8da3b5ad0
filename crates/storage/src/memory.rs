//! In-memory `ProfileStore` backend.
//!
//! Backs the `serve` command and tests. Fixture files look like:
//!
//! ```json
//! {
//!   "profiles":   [{"user_id": "u1", "user_type": "owner"}],
//!   "businesses": [{"id": "b1", "owner_id": "u1", "name": "Fade Room"}]
//! }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::record::{now_rfc3339, BusinessRecord, ProfileRecord};
use crate::traits::ProfileStore;

/// Serialized contents of a [`MemoryStore`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFixture {
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
    #[serde(default)]
    pub businesses: Vec<BusinessRecord>,
}

#[derive(Default)]
struct Tables {
    profiles: BTreeMap<String, ProfileRecord>,
    businesses: BTreeMap<String, BusinessRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from fixture data, applying the same key and owner
    /// checks as the insert methods.
    pub fn from_fixture(fixture: StoreFixture) -> Result<Self, StorageError> {
        let mut tables = Tables::default();
        for profile in fixture.profiles {
            profile
                .check_timestamps()
                .map_err(|e| StorageError::InvalidFixture(format!("profile '{}': {}", profile.user_id, e)))?;
            if tables.profiles.contains_key(&profile.user_id) {
                return Err(StorageError::InvalidFixture(format!(
                    "duplicate profile '{}'",
                    profile.user_id
                )));
            }
            tables.profiles.insert(profile.user_id.clone(), profile);
        }
        for business in fixture.businesses {
            if !tables.profiles.contains_key(&business.owner_id) {
                return Err(StorageError::InvalidFixture(format!(
                    "business '{}' references unknown owner '{}'",
                    business.id, business.owner_id
                )));
            }
            if tables.businesses.contains_key(&business.id) {
                return Err(StorageError::InvalidFixture(format!(
                    "duplicate business '{}'",
                    business.id
                )));
            }
            tables.businesses.insert(business.id.clone(), business);
        }
        tracing::debug!(
            profiles = tables.profiles.len(),
            businesses = tables.businesses.len(),
            "loaded store fixture"
        );
        Ok(MemoryStore {
            tables: RwLock::new(tables),
        })
    }

    pub fn from_fixture_json(json: &str) -> Result<Self, StorageError> {
        let fixture: StoreFixture =
            serde_json::from_str(json).map_err(|e| StorageError::InvalidFixture(e.to_string()))?;
        Self::from_fixture(fixture)
    }

    pub fn from_fixture_file(path: &Path) -> Result<Self, StorageError> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            StorageError::InvalidFixture(format!("error reading '{}': {}", path.display(), e))
        })?;
        Self::from_fixture_json(&json)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, StorageError> {
        Ok(self.tables.read().await.profiles.get(user_id).cloned())
    }

    async fn count_businesses_by_owner(&self, owner_id: &str) -> Result<u32, StorageError> {
        let tables = self.tables.read().await;
        let count = tables
            .businesses
            .values()
            .filter(|b| b.owner_id == owner_id)
            .count();
        u32::try_from(count).map_err(|e| StorageError::Backend(e.to_string()))
    }

    async fn list_businesses_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<BusinessRecord>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .businesses
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }

    /// Rows without `created_at` are stamped with the current time.
    async fn insert_profile(&self, mut record: ProfileRecord) -> Result<(), StorageError> {
        record.check_timestamps()?;
        if record.created_at.is_none() {
            record.created_at = Some(now_rfc3339());
        }
        let mut tables = self.tables.write().await;
        if tables.profiles.contains_key(&record.user_id) {
            return Err(StorageError::AlreadyExists {
                kind: "profile",
                id: record.user_id,
            });
        }
        tracing::debug!(user_id = %record.user_id, user_type = %record.user_type, "inserted profile");
        tables.profiles.insert(record.user_id.clone(), record);
        Ok(())
    }

    async fn insert_business(&self, record: BusinessRecord) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.profiles.contains_key(&record.owner_id) {
            return Err(StorageError::ProfileNotFound {
                user_id: record.owner_id,
            });
        }
        if tables.businesses.contains_key(&record.id) {
            return Err(StorageError::AlreadyExists {
                kind: "business",
                id: record.id,
            });
        }
        tracing::debug!(business_id = %record.id, owner_id = %record.owner_id, "inserted business");
        tables.businesses.insert(record.id.clone(), record);
        Ok(())
    }
}
