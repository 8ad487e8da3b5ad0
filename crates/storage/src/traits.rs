use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{BusinessRecord, ProfileRecord};

/// Storage for user profiles and the businesses they own.
///
/// Access resolution only ever reads through this trait. The write methods
/// exist for provisioning, fixtures, and the business-creation flow, which
/// must invalidate any cached user state after calling `insert_business`.
///
/// ## Thread Safety
///
/// Implementations must be `Send + Sync + 'static` to be used in axum
/// application state and across async task boundaries.
#[async_trait]
pub trait ProfileStore: Send + Sync + 'static {
    /// Read a profile row. `Ok(None)` when the user has no profile yet.
    async fn get_profile(&self, user_id: &str) -> Result<Option<ProfileRecord>, StorageError>;

    /// Number of businesses whose `owner_id` is `owner_id`.
    async fn count_businesses_by_owner(&self, owner_id: &str) -> Result<u32, StorageError>;

    /// Businesses owned by `owner_id`, ordered by id.
    async fn list_businesses_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<BusinessRecord>, StorageError>;

    /// Insert a profile row.
    ///
    /// Returns `Err(StorageError::AlreadyExists)` if the user already has one.
    async fn insert_profile(&self, record: ProfileRecord) -> Result<(), StorageError>;

    /// Insert a business.
    ///
    /// The owner must already have a profile (`ProfileNotFound` otherwise);
    /// duplicate ids return `AlreadyExists`.
    async fn insert_business(&self, record: BusinessRecord) -> Result<(), StorageError>;
}
