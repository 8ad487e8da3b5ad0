//! `salonbook serve` -- HTTP JSON API over a fixture-seeded profile store.
//!
//! Serves the three lookups the HTTP lookup adapter consumes, plus the
//! resolved user state itself, using `axum` + `tokio`.
//!
//! Security features:
//! - CORS headers on all responses (permissive for local dev)
//! - Per-IP rate limiting (default: 120 req/min, `SALONBOOK_RATE_LIMIT`)
//! - Optional API key authentication via `SALONBOOK_API_KEY`
//!
//! Endpoints:
//! - GET /health                            - Server status (exempt from auth)
//! - GET /api/admin/check?userId=<id>       - `{"isAdmin": bool}`
//! - GET /api/profile?userId=<id>           - Profile row or `null`
//! - GET /api/owner/businesses?ownerId=<id> - Businesses owned by the user
//! - GET /api/user-state[?userId=<id>]      - Full classification
//! - GET /api/guard?path=<route>[&userId=<id>] - Guard decision for a route
//!
//! All responses use Content-Type: application/json.

mod handlers;
mod middleware;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{middleware as axum_middleware, Json, Router};
use salonbook_access::lookup::store::StoreLookup;
use salonbook_access::UserStateResolver;
use salonbook_storage::MemoryStore;
use tower_http::cors::{Any, CorsLayer};

use self::handlers::{
    handle_admin_check, handle_guard, handle_health, handle_not_found, handle_owner_businesses,
    handle_profile, handle_user_state,
};
use self::middleware::{auth_middleware, rate_limit_middleware};
use self::state::{AppState, RateLimiter};

/// Default rate limit: 120 requests per minute per IP.
const DEFAULT_RATE_LIMIT: u64 = 120;

/// Rate limit window duration in seconds (1 minute).
const RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Construct a JSON error response with the given status code and message.
fn json_error(status: StatusCode, message: &str) -> impl IntoResponse {
    (status, Json(serde_json::json!({"error": message})))
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/admin/check", get(handle_admin_check))
        .route("/api/profile", get(handle_profile))
        .route("/api/owner/businesses", get(handle_owner_businesses))
        .route("/api/user-state", get(handle_user_state))
        .route("/api/guard", get(handle_guard))
        .fallback(handle_not_found)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the given port over a store seeded from
/// `fixtures` (empty when `None`).
///
/// - Rate limit: per-IP, `SALONBOOK_RATE_LIMIT` (default 120 req/min).
/// - API key: if `SALONBOOK_API_KEY` is set, all endpoints except /health require auth.
pub async fn start_server(
    port: u16,
    fixtures: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = match &fixtures {
        Some(path) => {
            let store = MemoryStore::from_fixture_file(path)?;
            tracing::info!(path = %path.display(), "loaded store fixtures");
            store
        }
        None => MemoryStore::new(),
    };
    let store = Arc::new(store);

    let rate_limit = std::env::var("SALONBOOK_RATE_LIMIT")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(DEFAULT_RATE_LIMIT);

    let api_key = std::env::var("SALONBOOK_API_KEY")
        .ok()
        .filter(|k| !k.is_empty());

    if api_key.is_some() {
        eprintln!("API key authentication enabled");
    }
    eprintln!("Rate limit: {} requests per minute per IP", rate_limit);

    // Server context: every request resolves fresh, no shared cache.
    let resolver = UserStateResolver::new(StoreLookup::new(Arc::clone(&store)));

    let state = Arc::new(AppState {
        store,
        resolver,
        rate_limiter: RateLimiter::new(rate_limit),
        api_key,
    });

    let app = router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    eprintln!("Salonbook API listening on http://0.0.0.0:{}", port);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    eprintln!("\nServer shut down.");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    eprintln!("\nReceived shutdown signal...");
}
