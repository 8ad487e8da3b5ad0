//! salonbook-access: resolves a user id to a [`UserStateResult`].
//!
//! Three layers:
//! - [`ProfileLookupPort`] -- where admin flags, profiles, and business
//!   counts come from (direct store, HTTP, or static values)
//! - [`lookup_user`] -- runs the lookups in order with fail-safe defaults
//! - [`UserStateResolver`] -- classifies, optionally memoizes in a
//!   [`UserStateCache`], and never returns an error to its caller
//!
//! Which adapter and whether to cache are decided by the composition root
//! (the CLI, a server, a test), not detected at runtime.

pub mod cache;
pub mod config;
pub mod lookup;
pub mod resolver;

pub use cache::{CacheEvent, UserStateCache, DEFAULT_TTL};
pub use config::{AccessConfig, CacheConfig, ConfigError, HttpConfig, StoreConfig};
pub use lookup::{lookup_user, LookupError, ProfileLookupPort};
pub use resolver::{ResolveOptions, UserStateResolver};

pub use salonbook_core::{
    redirect_message as get_redirect_message, RedirectDecision, UserId, UserStateResult,
};
