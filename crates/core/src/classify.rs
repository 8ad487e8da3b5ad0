//! State classifier.
//!
//! Precedence, first match wins:
//!
//! | # | Condition                       | State |
//! |---|---------------------------------|-------|
//! | 1 | no user id                      | S0    |
//! | 2 | admin check passed              | S7    |
//! | 3 | no profile row                  | S1    |
//! | 4 | customer                        | S2    |
//! | 5 | owner, 0 businesses             | S3    |
//! | 6 | owner, 1+ businesses            | S4    |
//! | 7 | both, 0 businesses              | S5    |
//! | 8 | both, 1+ businesses             | S6    |
//! | - | anything else                   | S1 (`unknown_user_type`) |
//!
//! The fallback grants nothing. A profile tagged `admin` whose admin check
//! did not pass lands there too.

use crate::model::{RedirectReason, RoleTag, UserId, UserLookup, UserState, UserStateResult, UserType};

/// Classify a user from already-resolved lookups.
pub fn classify(user_id: Option<&UserId>, lookup: &UserLookup) -> UserStateResult {
    if user_id.map_or(true, |id| id.as_str().is_empty()) {
        return UserStateResult::build(
            UserState::S0,
            RedirectReason::Unauthenticated,
            false,
            &UserLookup::default(),
        );
    }

    if lookup.is_admin {
        return UserStateResult::build(UserState::S7, RedirectReason::Admin, true, lookup);
    }

    let profile = match &lookup.profile {
        Some(p) => p,
        None => {
            return UserStateResult::build(UserState::S1, RedirectReason::NoProfile, true, lookup)
        }
    };

    let has_business = lookup.business_count >= 1;
    let (state, reason) = match (&profile.user_type, has_business) {
        (RoleTag::Known(UserType::Customer), _) => (UserState::S2, RedirectReason::CustomerOnly),
        (RoleTag::Known(UserType::Owner), false) => {
            (UserState::S3, RedirectReason::OwnerNoBusiness)
        }
        (RoleTag::Known(UserType::Owner), true) => {
            (UserState::S4, RedirectReason::OwnerWithBusiness)
        }
        (RoleTag::Known(UserType::Both), false) => (UserState::S5, RedirectReason::BothNoBusiness),
        (RoleTag::Known(UserType::Both), true) => {
            (UserState::S6, RedirectReason::BothWithBusiness)
        }
        (RoleTag::Known(UserType::Admin), _) | (RoleTag::Unrecognized(_), _) => {
            (UserState::S1, RedirectReason::UnknownUserType)
        }
    };

    UserStateResult::build(state, reason, true, lookup)
}

/// The fail-closed result used whenever a lookup fails outright.
///
/// Same shape as an unauthenticated user, with reason `error`.
pub fn classify_failure() -> UserStateResult {
    UserStateResult::build(
        UserState::S0,
        RedirectReason::Error,
        false,
        &UserLookup::default(),
    )
}
