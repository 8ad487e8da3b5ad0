//! salonbook-core: user-state classification for the Salonbook platform.
//!
//! Maps what is known about a signed-in user (admin flag, profile role,
//! number of owned businesses) to one of eight discrete states, the
//! capabilities that state grants, and the canonical place to send the
//! user next.
//!
//! Everything in this crate is pure: no I/O, no clocks, no shared state.
//! Fetching the inputs and caching the outputs lives in `salonbook-access`.
//!
//! # Public API
//!
//! - [`classify()`] / [`classify_failure()`] -- the state classifier
//! - [`UserStateResult`] -- immutable classification output
//! - [`RedirectDecision`] -- narrowed (should-redirect, url, reason) view
//! - [`redirect_message()`] -- reason code to banner text
//! - [`guard()`] -- per-surface access decision for route guards

pub mod classify;
pub mod guard;
pub mod message;
pub mod model;
pub mod redirect;

// ── Convenience re-exports ───────────────────────────────────────────

pub use classify::{classify, classify_failure};
pub use guard::{guard, GuardDecision, Surface};
pub use message::{redirect_message, DEFAULT_REDIRECT_MESSAGE};
pub use model::{
    Capabilities, Profile, RedirectReason, RoleTag, UserId, UserLookup, UserState,
    UserStateResult, UserType,
};
pub use redirect::RedirectDecision;

/// Canonical redirect targets.
pub mod routes {
    pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
    pub const OWNER_DASHBOARD: &str = "/owner/dashboard";
    pub const CUSTOMER_DASHBOARD: &str = "/customer/dashboard";
    pub const SETUP: &str = "/setup";
}
