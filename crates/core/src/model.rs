//! Data model shared by the classifier, the lookup adapters, and the cache.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::routes;

// ──────────────────────────────────────────────
// Identity and profile
// ──────────────────────────────────────────────

/// Opaque user identifier issued by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        UserId(s.to_string())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        UserId(s)
    }
}

/// The authoritative role tag on a profile row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Customer,
    Owner,
    Both,
    Admin,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Customer => "customer",
            UserType::Owner => "owner",
            UserType::Both => "both",
            UserType::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "customer" => Some(UserType::Customer),
            "owner" => Some(UserType::Owner),
            "both" => Some(UserType::Both),
            "admin" => Some(UserType::Admin),
            _ => None,
        }
    }

    /// Roles that may own businesses and therefore need a business count.
    pub fn can_own_businesses(&self) -> bool {
        matches!(self, UserType::Owner | UserType::Both)
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A role tag as stored, which may hold a value this build does not know.
///
/// Unknown tags deserialize successfully so that they reach the
/// classifier's fallback branch rather than failing the lookup. A `null` or
/// non-string tag reads as an empty unrecognized tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "StoredRoleTag", into = "String")]
pub enum RoleTag {
    Known(UserType),
    Unrecognized(String),
}

impl RoleTag {
    pub fn as_str(&self) -> &str {
        match self {
            RoleTag::Known(t) => t.as_str(),
            RoleTag::Unrecognized(s) => s,
        }
    }

    pub fn known(&self) -> Option<UserType> {
        match self {
            RoleTag::Known(t) => Some(*t),
            RoleTag::Unrecognized(_) => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredRoleTag {
    Text(String),
    Other(serde::de::IgnoredAny),
}

impl From<StoredRoleTag> for RoleTag {
    fn from(raw: StoredRoleTag) -> Self {
        match raw {
            StoredRoleTag::Text(s) => RoleTag::from(s),
            StoredRoleTag::Other(_) => RoleTag::Unrecognized(String::new()),
        }
    }
}

impl From<String> for RoleTag {
    fn from(s: String) -> Self {
        match UserType::parse(&s) {
            Some(t) => RoleTag::Known(t),
            None => RoleTag::Unrecognized(s),
        }
    }
}

impl From<&str> for RoleTag {
    fn from(s: &str) -> Self {
        RoleTag::from(s.to_string())
    }
}

impl From<UserType> for RoleTag {
    fn from(t: UserType) -> Self {
        RoleTag::Known(t)
    }
}

impl From<RoleTag> for String {
    fn from(tag: RoleTag) -> Self {
        match tag {
            RoleTag::Known(t) => t.as_str().to_string(),
            RoleTag::Unrecognized(s) => s,
        }
    }
}

/// A user's profile row. Timestamps are carried but not read by the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub user_type: RoleTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Profile {
    pub fn new(user_id: impl Into<UserId>, user_type: impl Into<RoleTag>) -> Self {
        Profile {
            user_id: user_id.into(),
            user_type: user_type.into(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Everything the classifier needs about an authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLookup {
    pub is_admin: bool,
    pub profile: Option<Profile>,
    pub business_count: u32,
}

// ──────────────────────────────────────────────
// States and capabilities
// ──────────────────────────────────────────────

/// The eight discrete user states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserState {
    S0,
    S1,
    S2,
    S3,
    S4,
    S5,
    S6,
    S7,
}

impl UserState {
    pub const ALL: [UserState; 8] = [
        UserState::S0,
        UserState::S1,
        UserState::S2,
        UserState::S3,
        UserState::S4,
        UserState::S5,
        UserState::S6,
        UserState::S7,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UserState::S0 => "unauthenticated",
            UserState::S1 => "no_profile",
            UserState::S2 => "customer_only",
            UserState::S3 => "owner_no_business",
            UserState::S4 => "owner_with_business",
            UserState::S5 => "both_no_business",
            UserState::S6 => "both_with_business",
            UserState::S7 => "admin",
        }
    }

    /// Where a user in this state belongs. `None` for S0 and S1.
    pub fn redirect_url(&self) -> Option<&'static str> {
        match self {
            UserState::S0 | UserState::S1 => None,
            UserState::S2 => Some(routes::CUSTOMER_DASHBOARD),
            UserState::S3 | UserState::S5 => Some(routes::SETUP),
            UserState::S4 | UserState::S6 => Some(routes::OWNER_DASHBOARD),
            UserState::S7 => Some(routes::ADMIN_DASHBOARD),
        }
    }
}

impl fmt::Display for UserState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.label())
    }
}

/// Surfaces a state unlocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_access_owner_dashboard: bool,
    pub can_access_customer_dashboard: bool,
    pub can_access_setup: bool,
    pub can_access_admin_dashboard: bool,
}

impl Capabilities {
    /// The only place capabilities are derived. Owner dashboard access
    /// requires at least one owned business or admin.
    pub fn for_state(state: UserState) -> Self {
        let (owner, customer, setup, admin) = match state {
            UserState::S0 | UserState::S1 => (false, false, false, false),
            UserState::S2 => (false, true, false, false),
            UserState::S3 => (false, false, true, false),
            UserState::S4 => (true, false, false, false),
            UserState::S5 => (false, true, true, false),
            UserState::S6 => (true, true, false, false),
            UserState::S7 => (true, true, false, true),
        };
        Capabilities {
            can_access_owner_dashboard: owner,
            can_access_customer_dashboard: customer,
            can_access_setup: setup,
            can_access_admin_dashboard: admin,
        }
    }
}

// ──────────────────────────────────────────────
// Reason codes
// ──────────────────────────────────────────────

/// Why a user was classified the way they were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedirectReason {
    Unauthenticated,
    Admin,
    NoProfile,
    CustomerOnly,
    OwnerNoBusiness,
    OwnerWithBusiness,
    BothNoBusiness,
    BothWithBusiness,
    UnknownUserType,
    Error,
}

impl RedirectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedirectReason::Unauthenticated => "unauthenticated",
            RedirectReason::Admin => "admin",
            RedirectReason::NoProfile => "no_profile",
            RedirectReason::CustomerOnly => "customer_only",
            RedirectReason::OwnerNoBusiness => "owner_no_business",
            RedirectReason::OwnerWithBusiness => "owner_with_business",
            RedirectReason::BothNoBusiness => "both_no_business",
            RedirectReason::BothWithBusiness => "both_with_business",
            RedirectReason::UnknownUserType => "unknown_user_type",
            RedirectReason::Error => "error",
        }
    }

    pub fn message(&self) -> &'static str {
        crate::message::redirect_message(self.as_str())
    }
}

impl fmt::Display for RedirectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RedirectReason {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unauthenticated" => Ok(RedirectReason::Unauthenticated),
            "admin" => Ok(RedirectReason::Admin),
            "no_profile" => Ok(RedirectReason::NoProfile),
            "customer_only" => Ok(RedirectReason::CustomerOnly),
            "owner_no_business" => Ok(RedirectReason::OwnerNoBusiness),
            "owner_with_business" => Ok(RedirectReason::OwnerWithBusiness),
            "both_no_business" => Ok(RedirectReason::BothNoBusiness),
            "both_with_business" => Ok(RedirectReason::BothWithBusiness),
            "unknown_user_type" => Ok(RedirectReason::UnknownUserType),
            "error" => Ok(RedirectReason::Error),
            other => Err(format!("unknown redirect reason '{}'", other)),
        }
    }
}

// ──────────────────────────────────────────────
// UserStateResult
// ──────────────────────────────────────────────

/// Output of a single classification.
///
/// Only [`crate::classify()`] and [`crate::classify_failure()`] build these,
/// so the redirect target and capability flags always agree with `state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStateResult {
    state: UserState,
    authenticated: bool,
    profile_exists: bool,
    user_type: Option<RoleTag>,
    business_count: u32,
    redirect_url: Option<&'static str>,
    reason: RedirectReason,
    #[serde(flatten)]
    capabilities: Capabilities,
}

impl UserStateResult {
    pub(crate) fn build(
        state: UserState,
        reason: RedirectReason,
        authenticated: bool,
        lookup: &UserLookup,
    ) -> Self {
        UserStateResult {
            state,
            authenticated,
            profile_exists: lookup.profile.is_some(),
            user_type: lookup.profile.as_ref().map(|p| p.user_type.clone()),
            business_count: lookup.business_count,
            redirect_url: state.redirect_url(),
            reason,
            capabilities: Capabilities::for_state(state),
        }
    }

    pub fn state(&self) -> UserState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn profile_exists(&self) -> bool {
        self.profile_exists
    }

    pub fn user_type(&self) -> Option<&RoleTag> {
        self.user_type.as_ref()
    }

    pub fn business_count(&self) -> u32 {
        self.business_count
    }

    pub fn redirect_url(&self) -> Option<&'static str> {
        self.redirect_url
    }

    pub fn reason(&self) -> RedirectReason {
        self.reason
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn can_access_owner_dashboard(&self) -> bool {
        self.capabilities.can_access_owner_dashboard
    }

    pub fn can_access_customer_dashboard(&self) -> bool {
        self.capabilities.can_access_customer_dashboard
    }

    pub fn can_access_setup(&self) -> bool {
        self.capabilities.can_access_setup
    }

    pub fn can_access_admin_dashboard(&self) -> bool {
        self.capabilities.can_access_admin_dashboard
    }

    /// Serialize to the JSON shape consumed by UI callers.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}
