//! Profile and business lookups.
//!
//! [`ProfileLookupPort`] is the one logical contract; adapters implement it
//! against different backends:
//! - [`store::StoreLookup`] -- direct access to a [`salonbook_storage::ProfileStore`]
//! - [`http::HttpLookup`] -- authenticated calls to the platform API
//! - [`static_lookup::StaticLookup`] -- fixed values
//!
//! [`lookup_user`] sequences the three lookups and applies the fail-safe
//! defaults, so adapters only report what happened.

#[cfg(feature = "http")]
pub mod http;
pub mod static_lookup;
pub mod store;

use async_trait::async_trait;
use salonbook_core::{Profile, UserId, UserLookup};

// ──────────────────────────────────────────────
// LookupError
// ──────────────────────────────────────────────

/// Errors a lookup adapter can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    /// The backend could not be reached (connection refused, timeout, ...).
    #[error("lookup '{lookup_id}' unavailable: {message}")]
    Unavailable { lookup_id: String, message: String },

    /// The backend answered with a non-success status.
    #[error("lookup '{lookup_id}' returned HTTP {status}")]
    Status { lookup_id: String, status: u16 },

    /// The caller's credentials were rejected.
    #[error("lookup '{lookup_id}' rejected the request as unauthorized")]
    Unauthorized { lookup_id: String },

    /// The backend answered, but with something that is not the expected shape.
    #[error("lookup '{lookup_id}' returned a malformed response: {message}")]
    Malformed { lookup_id: String, message: String },

    /// The underlying store failed.
    #[error("lookup '{lookup_id}' backend error: {message}")]
    Backend { lookup_id: String, message: String },

    /// Missing base URL, credentials, etc.
    #[error("lookup not configured: {message}")]
    NotConfigured { message: String },
}

impl LookupError {
    /// Soft failures are expected operational conditions (network, status,
    /// credentials). The business count substitutes zero for them; a hard
    /// failure there aborts the lookup.
    pub fn is_soft(&self) -> bool {
        matches!(
            self,
            LookupError::Unavailable { .. }
                | LookupError::Status { .. }
                | LookupError::Unauthorized { .. }
        )
    }
}

// ──────────────────────────────────────────────
// ProfileLookupPort
// ──────────────────────────────────────────────

/// Source of the facts the classifier needs about one user.
///
/// Implementations must not mutate any stored record.
#[async_trait]
pub trait ProfileLookupPort: Send + Sync {
    /// Whether the user holds the platform admin role.
    async fn is_admin(&self, user_id: &UserId) -> Result<bool, LookupError>;

    /// The user's profile row, `None` if they have not been provisioned.
    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, LookupError>;

    /// Number of businesses the user owns.
    async fn owned_business_count(&self, user_id: &UserId) -> Result<u32, LookupError>;

    /// Returns this adapter's identifier (e.g. "store", "http", "static").
    fn lookup_id(&self) -> &str;
}

// ──────────────────────────────────────────────
// lookup_user
// ──────────────────────────────────────────────

/// Resolve everything the classifier needs about `user_id`.
///
/// Returns `Ok(None)` without touching the port when there is no user.
/// Lookups run one after another: admin check, profile, business count.
///
/// - Admin check: any failure reads as "not admin".
/// - Profile: any failure is returned; there is no safe default.
/// - Business count: only asked for `owner` and `both` roles; soft failure
///   reads as zero so ownership is under-reported, never over-reported.
/// - Admins skip the business count. Their profile is still read for
///   reporting, and a failure there reads as "no profile".
pub async fn lookup_user(
    port: &dyn ProfileLookupPort,
    user_id: Option<&UserId>,
) -> Result<Option<UserLookup>, LookupError> {
    let user_id = match user_id {
        Some(id) => id,
        None => return Ok(None),
    };

    let is_admin = port.is_admin(user_id).await.unwrap_or_else(|e| {
        tracing::warn!(user_id = %user_id, lookup = port.lookup_id(), error = %e, "admin check failed, treating as non-admin");
        false
    });

    if is_admin {
        let profile = port.profile(user_id).await.unwrap_or_else(|e| {
            tracing::warn!(user_id = %user_id, lookup = port.lookup_id(), error = %e, "admin profile read failed");
            None
        });
        return Ok(Some(UserLookup {
            is_admin: true,
            profile,
            business_count: 0,
        }));
    }

    let profile = port.profile(user_id).await?;

    let owns_businesses = profile
        .as_ref()
        .and_then(|p| p.user_type.known())
        .is_some_and(|t| t.can_own_businesses());

    let business_count = if owns_businesses {
        match port.owned_business_count(user_id).await {
            Ok(n) => n,
            Err(e) if e.is_soft() => {
                tracing::warn!(user_id = %user_id, lookup = port.lookup_id(), error = %e, "business count failed, treating as zero");
                0
            }
            Err(e) => return Err(e),
        }
    } else {
        0
    };

    Ok(Some(UserLookup {
        is_admin: false,
        profile,
        business_count,
    }))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
