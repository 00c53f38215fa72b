//! Per-client admission control with a fixed window.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;

use crate::config::{CorsConfig, RateLimitConfig};
use crate::http::response;
use crate::observability::metrics;

/// One client's window.
struct Window {
    count: u64,
    started: Instant,
}

/// Fixed-window rate limiter keyed by client identity.
///
/// The admit decision and the counter mutation happen under the DashMap
/// entry's shard lock, so concurrent admits for one identity can never
/// exceed the cap.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u64, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_requests, Duration::from_secs(config.window_secs))
    }

    /// Admit or reject one request from `identity`.
    ///
    /// A rejection mutates nothing: it neither extends nor restarts the
    /// window, so a hammering client regains service once the original
    /// window elapses.
    pub fn admit(&self, identity: &str) -> bool {
        let mut entry = self
            .windows
            .entry(identity.to_owned())
            .or_insert_with(|| Window {
                count: 0,
                started: Instant::now(),
            });
        let window = entry.value_mut();

        if window.started.elapsed() >= self.window {
            window.count = 1;
            window.started = Instant::now();
            return true;
        }
        if window.count < self.max_requests {
            window.count += 1;
            true
        } else {
            false
        }
    }

    /// Drop windows that have fully elapsed. Keeps the table bounded in a
    /// long-running process; never evicts a live window.
    pub fn evict_expired(&self) {
        let window = self.window;
        self.windows.retain(|_, w| w.started.elapsed() < window);
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.windows.len()
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

/// State for the rate-limit middleware.
pub struct RateLimiterState {
    limiter: RateLimiter,
    allow_origin: HeaderValue,
}

impl RateLimiterState {
    pub fn new(config: &RateLimitConfig, cors: &CorsConfig) -> Self {
        Self {
            limiter: RateLimiter::from_config(config),
            allow_origin: response::allow_origin_value(cors),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

/// Middleware enforcing the per-IP limit before any other request work.
pub async fn rate_limit_middleware(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<RateLimiterState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let identity = addr.ip().to_string();
    if state.limiter.admit(&identity) {
        next.run(request).await
    } else {
        tracing::warn!(
            client = %identity,
            method = %request.method(),
            path = %request.uri().path(),
            "Rate limit exceeded"
        );
        metrics::record_rate_limited("fixed_window");
        response::json_error(
            StatusCode::TOO_MANY_REQUESTS,
            response::RATE_LIMITED_MESSAGE,
            &state.allow_origin,
        )
    }
}
