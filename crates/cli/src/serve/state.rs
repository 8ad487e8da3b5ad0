//! Application state and rate limiting.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Instant;

use salonbook_access::UserStateResolver;
use salonbook_storage::MemoryStore;
use tokio::sync::Mutex;

use super::RATE_LIMIT_WINDOW_SECS;

/// Requests seen from one client in the current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u64,
    started: Instant,
}

#[derive(Debug)]
struct Tracker {
    windows: HashMap<IpAddr, Window>,
    last_sweep: Instant,
}

/// In-memory per-IP rate limiter.
///
/// Windows that have run out are swept at most once per window length, so
/// the map only holds clients seen within roughly the last two windows.
pub(crate) struct RateLimiter {
    tracker: Mutex<Tracker>,
    /// Maximum requests per window.
    pub(crate) max_requests: u64,
}

impl RateLimiter {
    pub(crate) fn new(max_requests: u64) -> Self {
        Self {
            tracker: Mutex::new(Tracker {
                windows: HashMap::new(),
                last_sweep: Instant::now(),
            }),
            max_requests,
        }
    }

    /// Returns Ok(()) if allowed, Err(retry_after_secs) if rate limited.
    pub(crate) async fn check(&self, ip: IpAddr) -> Result<(), u64> {
        self.check_at(ip, Instant::now()).await
    }

    async fn check_at(&self, ip: IpAddr, now: Instant) -> Result<(), u64> {
        let mut tracker = self.tracker.lock().await;

        if now.saturating_duration_since(tracker.last_sweep).as_secs() >= RATE_LIMIT_WINDOW_SECS {
            tracker
                .windows
                .retain(|_, w| now.saturating_duration_since(w.started).as_secs() < RATE_LIMIT_WINDOW_SECS);
            tracker.last_sweep = now;
        }

        let window = tracker.windows.entry(ip).or_insert(Window {
            count: 0,
            started: now,
        });
        let elapsed = now.saturating_duration_since(window.started).as_secs();
        if elapsed >= RATE_LIMIT_WINDOW_SECS {
            *window = Window {
                count: 0,
                started: now,
            };
        }

        window.count += 1;
        if window.count > self.max_requests {
            Err(RATE_LIMIT_WINDOW_SECS.saturating_sub(elapsed))
        } else {
            Ok(())
        }
    }
}

/// Application state shared across request handlers.
pub(crate) struct AppState {
    /// Backing store for the lookup endpoints.
    pub(crate) store: Arc<MemoryStore>,
    /// Uncached resolver over `store`.
    pub(crate) resolver: UserStateResolver,
    pub(crate) rate_limiter: RateLimiter,
    /// Optional API key for authentication. None = no auth required.
    pub(crate) api_key: Option<String>,
}
