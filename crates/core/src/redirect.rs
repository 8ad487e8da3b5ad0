//! Redirect decision: the (should-redirect, url, reason) subset of a
//! classification, for callers that only need a yes/no.

use serde::Serialize;

use crate::model::{RedirectReason, UserStateResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectDecision {
    pub should_redirect: bool,
    pub redirect_url: Option<&'static str>,
    pub reason: RedirectReason,
}

impl From<&UserStateResult> for RedirectDecision {
    fn from(result: &UserStateResult) -> Self {
        RedirectDecision {
            should_redirect: result.redirect_url().is_some(),
            redirect_url: result.redirect_url(),
            reason: result.reason(),
        }
    }
}

impl From<UserStateResult> for RedirectDecision {
    fn from(result: UserStateResult) -> Self {
        RedirectDecision::from(&result)
    }
}
