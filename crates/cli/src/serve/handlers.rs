//! Route handlers: health, the three lookups, user state, and guard.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use salonbook_access::ResolveOptions;
use salonbook_core::{guard, Surface, UserId, UserType};
use salonbook_storage::{ProfileStore, StorageError};
use serde::Deserialize;

use super::json_error;
use super::state::AppState;

#[derive(Debug, Deserialize)]
pub(crate) struct UserQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OwnerQuery {
    #[serde(rename = "ownerId")]
    owner_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GuardQuery {
    #[serde(rename = "userId")]
    user_id: Option<String>,
    path: Option<String>,
}

/// Non-empty id or a 400 naming the missing parameter.
fn require_id(id: Option<String>, param: &str) -> Result<String, Response> {
    match id.filter(|s| !s.is_empty()) {
        Some(id) => Ok(id),
        None => Err(json_error(
            StatusCode::BAD_REQUEST,
            &format!("missing '{}' query parameter", param),
        )
        .into_response()),
    }
}

fn storage_failure(e: StorageError) -> Response {
    tracing::error!(error = %e, "store read failed");
    json_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()).into_response()
}

/// Fallback handler for unmatched routes.
pub(crate) async fn handle_not_found() -> impl IntoResponse {
    json_error(StatusCode::NOT_FOUND, "not found")
}

/// GET /health
pub(crate) async fn handle_health() -> impl IntoResponse {
    let response = serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(response))
}

/// GET /api/admin/check?userId=
pub(crate) async fn handle_admin_check(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Response {
    let user_id = match require_id(query.user_id, "userId") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.store.get_profile(&user_id).await {
        Ok(record) => {
            let is_admin = record.is_some_and(|r| r.user_type == UserType::Admin.as_str());
            (StatusCode::OK, Json(serde_json::json!({ "isAdmin": is_admin }))).into_response()
        }
        Err(e) => storage_failure(e),
    }
}

/// GET /api/profile?userId= -- the row, or `null` when unprovisioned.
pub(crate) async fn handle_profile(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Response {
    let user_id = match require_id(query.user_id, "userId") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.store.get_profile(&user_id).await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/owner/businesses?ownerId=
pub(crate) async fn handle_owner_businesses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OwnerQuery>,
) -> Response {
    let owner_id = match require_id(query.owner_id, "ownerId") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.store.list_businesses_by_owner(&owner_id).await {
        Ok(businesses) => (StatusCode::OK, Json(businesses)).into_response(),
        Err(e) => storage_failure(e),
    }
}

/// GET /api/user-state?userId= -- no `userId` classifies a signed-out visitor.
pub(crate) async fn handle_user_state(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> Response {
    let user_id = query.user_id.filter(|s| !s.is_empty()).map(UserId::new);
    let result = state
        .resolver
        .get_user_state(user_id.as_ref(), ResolveOptions::default())
        .await;
    (StatusCode::OK, Json(result.to_json_value())).into_response()
}

/// GET /api/guard?path=&userId=
pub(crate) async fn handle_guard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GuardQuery>,
) -> Response {
    let path = match require_id(query.path, "path") {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    let surface = match Surface::from_path(&path) {
        Some(s) => s,
        None => {
            return json_error(
                StatusCode::NOT_FOUND,
                &format!("'{}' is not a guarded route", path),
            )
            .into_response()
        }
    };

    let user_id = query.user_id.filter(|s| !s.is_empty()).map(UserId::new);
    let result = state
        .resolver
        .get_user_state(user_id.as_ref(), ResolveOptions::default())
        .await;
    let decision = guard(&result, surface);
    tracing::info!(
        user_id = user_id.as_ref().map(UserId::as_str).unwrap_or("-"),
        path = %path,
        state = %result.state(),
        ?decision,
        "guard decision"
    );

    let body = serde_json::json!({
        "path": path,
        "surface": surface,
        "state": result.state(),
        "decision": decision,
    });
    (StatusCode::OK, Json(body)).into_response()
}
