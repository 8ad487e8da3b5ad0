//! HTTP lookup adapter: asks the platform API on the caller's behalf.
//!
//! Uses `ureq` (sync) wrapped in `tokio::task::spawn_blocking` to avoid
//! blocking the async runtime. Endpoints, relative to `base_url`:
//!
//! - `GET /api/admin/check?userId=<id>` → `{"isAdmin": bool}`
//! - `GET /api/profile?userId=<id>` → `{"user_type": "..."}`, `null`, or 404
//! - `GET /api/owner/businesses?ownerId=<id>` → JSON array (length is used)

use std::time::Duration;

use async_trait::async_trait;
use salonbook_core::{Profile, RoleTag, UserId};
use serde::Deserialize;

use super::{LookupError, ProfileLookupPort};
use crate::config::HttpConfig;

const LOOKUP_ID: &str = "http";

/// Env var consulted when the config carries no token.
pub const AUTH_TOKEN_ENV: &str = "SALONBOOK_AUTH_TOKEN";

#[derive(Deserialize)]
struct ProfileBody {
    #[serde(default)]
    user_type: Option<RoleTag>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Deserialize)]
struct AdminCheckBody {
    #[serde(rename = "isAdmin")]
    is_admin: bool,
}

/// Adapter that resolves lookups through authenticated HTTP GET requests.
///
/// - `base_url` from [`HttpConfig`] (required)
/// - `auth_token` from config, then the `SALONBOOK_AUTH_TOKEN` env var
/// - 401/403 → `Unauthorized`, other non-2xx → `Status`,
///   transport errors → `Unavailable`, undecodable bodies → `Malformed`
pub struct HttpLookup {
    base_url: String,
    auth_token: Option<String>,
    agent: ureq::Agent,
}

impl HttpLookup {
    pub fn new(config: &HttpConfig) -> Result<Self, LookupError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(LookupError::NotConfigured {
                message: "http lookup requires a base_url".to_string(),
            });
        }

        let auth_token = config
            .auth_token
            .clone()
            .or_else(|| std::env::var(AUTH_TOKEN_ENV).ok())
            .filter(|t| !t.is_empty());

        let agent_config = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        Ok(HttpLookup {
            base_url,
            auth_token,
            agent: ureq::Agent::new_with_config(agent_config),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `path` with one query parameter. `Ok(None)` on 404.
    async fn get_json(
        &self,
        path: &str,
        param: &'static str,
        user_id: &UserId,
    ) -> Result<Option<serde_json::Value>, LookupError> {
        let url = format!("{}{}", self.base_url, path);
        let agent = self.agent.clone();
        let auth_token = self.auth_token.clone();
        let user_id = user_id.as_str().to_string();

        tokio::task::spawn_blocking(move || {
            let mut request = agent.get(&url).query(param, &user_id);
            if let Some(ref token) = auth_token {
                request = request.header("Authorization", &format!("Bearer {}", token));
            }

            let response = match request.call() {
                Ok(r) => r,
                Err(ureq::Error::StatusCode(404)) => return Ok(None),
                Err(ureq::Error::StatusCode(401 | 403)) => {
                    return Err(LookupError::Unauthorized {
                        lookup_id: LOOKUP_ID.to_string(),
                    })
                }
                Err(ureq::Error::StatusCode(status)) => {
                    return Err(LookupError::Status {
                        lookup_id: LOOKUP_ID.to_string(),
                        status,
                    })
                }
                Err(e) => {
                    return Err(LookupError::Unavailable {
                        lookup_id: LOOKUP_ID.to_string(),
                        message: e.to_string(),
                    })
                }
            };

            let value: serde_json::Value =
                response
                    .into_body()
                    .read_json()
                    .map_err(|e| LookupError::Malformed {
                        lookup_id: LOOKUP_ID.to_string(),
                        message: format!("failed to parse response as JSON: {}", e),
                    })?;
            Ok(Some(value))
        })
        .await
        .map_err(|e| LookupError::Unavailable {
            lookup_id: LOOKUP_ID.to_string(),
            message: format!("task join error: {}", e),
        })?
    }
}

fn malformed(message: impl Into<String>) -> LookupError {
    LookupError::Malformed {
        lookup_id: LOOKUP_ID.to_string(),
        message: message.into(),
    }
}

fn decode_profile(
    user_id: &UserId,
    body: Option<serde_json::Value>,
) -> Result<Option<Profile>, LookupError> {
    match body {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => {
            let body: ProfileBody = serde_json::from_value(value)
                .map_err(|e| malformed(format!("profile: {}", e)))?;
            Ok(Some(Profile {
                user_id: user_id.clone(),
                user_type: body
                    .user_type
                    .unwrap_or_else(|| RoleTag::Unrecognized(String::new())),
                created_at: body.created_at,
                updated_at: body.updated_at,
            }))
        }
    }
}

fn decode_admin_check(body: Option<serde_json::Value>) -> Result<bool, LookupError> {
    let value = body.ok_or_else(|| LookupError::Status {
        lookup_id: LOOKUP_ID.to_string(),
        status: 404,
    })?;
    let body: AdminCheckBody =
        serde_json::from_value(value).map_err(|e| malformed(format!("admin check: {}", e)))?;
    Ok(body.is_admin)
}

fn decode_business_list(body: Option<serde_json::Value>) -> Result<u32, LookupError> {
    let value = body.ok_or_else(|| LookupError::Status {
        lookup_id: LOOKUP_ID.to_string(),
        status: 404,
    })?;
    let items = value
        .as_array()
        .ok_or_else(|| malformed("businesses: expected a JSON array"))?;
    u32::try_from(items.len()).map_err(|e| malformed(format!("businesses: {}", e)))
}

#[async_trait]
impl ProfileLookupPort for HttpLookup {
    async fn is_admin(&self, user_id: &UserId) -> Result<bool, LookupError> {
        let body = self.get_json("/api/admin/check", "userId", user_id).await?;
        decode_admin_check(body)
    }

    async fn profile(&self, user_id: &UserId) -> Result<Option<Profile>, LookupError> {
        let body = self.get_json("/api/profile", "userId", user_id).await?;
        decode_profile(user_id, body)
    }

    async fn owned_business_count(&self, user_id: &UserId) -> Result<u32, LookupError> {
        let body = self
            .get_json("/api/owner/businesses", "ownerId", user_id)
            .await?;
        decode_business_list(body)
    }

    fn lookup_id(&self) -> &str {
        LOOKUP_ID
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
