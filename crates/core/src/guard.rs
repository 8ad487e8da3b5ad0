//! Route guard decisions over a classification.
//!
//! A capability flag set to `false` is an authoritative denial: an `owner`
//! role with no businesses never reaches the owner dashboard, whatever the
//! role tag says.

use serde::Serialize;

use crate::model::{RedirectReason, UserStateResult};
use crate::routes;

/// A guarded area of the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    OwnerDashboard,
    CustomerDashboard,
    Setup,
    AdminDashboard,
}

impl Surface {
    pub fn path(&self) -> &'static str {
        match self {
            Surface::OwnerDashboard => routes::OWNER_DASHBOARD,
            Surface::CustomerDashboard => routes::CUSTOMER_DASHBOARD,
            Surface::Setup => routes::SETUP,
            Surface::AdminDashboard => routes::ADMIN_DASHBOARD,
        }
    }

    /// Resolve a request path to the surface that owns it.
    pub fn from_path(path: &str) -> Option<Self> {
        [
            Surface::OwnerDashboard,
            Surface::CustomerDashboard,
            Surface::Setup,
            Surface::AdminDashboard,
        ]
        .into_iter()
        .find(|s| path == s.path() || path.starts_with(&format!("{}/", s.path())))
    }
}

/// What a route guard should do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum GuardDecision {
    Allow,
    /// Send the user to where their state says they belong.
    Redirect {
        url: &'static str,
        reason: RedirectReason,
    },
    /// No canonical destination (S0/S1): the caller must sign in or
    /// finish provisioning.
    Deny { reason: RedirectReason },
}

impl UserStateResult {
    pub fn can_access(&self, surface: Surface) -> bool {
        let caps = self.capabilities();
        match surface {
            Surface::OwnerDashboard => caps.can_access_owner_dashboard,
            Surface::CustomerDashboard => caps.can_access_customer_dashboard,
            Surface::Setup => caps.can_access_setup,
            Surface::AdminDashboard => caps.can_access_admin_dashboard,
        }
    }
}

pub fn guard(result: &UserStateResult, surface: Surface) -> GuardDecision {
    if result.can_access(surface) {
        return GuardDecision::Allow;
    }
    match result.redirect_url() {
        Some(url) => GuardDecision::Redirect {
            url,
            reason: result.reason(),
        },
        None => GuardDecision::Deny {
            reason: result.reason(),
        },
    }
}
