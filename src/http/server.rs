//! HTTP server setup and request orchestration.
//!
//! # Responsibilities
//! - Create the Axum router with the forwarding endpoint
//! - Wire up middleware (CORS, panic recovery, tracing, request ID,
//!   timeout, rate limiting)
//! - Run the admission → extraction → validation → forward pipeline
//! - Emit one structured log entry per decision point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, RawQuery, State},
    http::{header, HeaderName, HeaderValue, Method, Request, StatusCode},
    middleware,
    response::Response,
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::config::{CorsConfig, GatewayConfig};
use crate::http::response;
use crate::observability::metrics;
use crate::relay::RelayEngine;
use crate::security::rate_limit::{rate_limit_middleware, RateLimiterState};
use crate::security::target::{self, DenyReason};

// Outer request deadline; the relay's own timeout fires first so upstream
// failures surface as proxy errors rather than a bare 408.
const REQUEST_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

/// Application state injected into the handler.
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<RelayEngine>,
    pub allow_origin: HeaderValue,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    rate_limiter: Arc<RateLimiterState>,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, reqwest::Error> {
        let allow_origin = response::allow_origin_value(&config.cors);
        let relay = Arc::new(RelayEngine::new(&config.relay, allow_origin.clone())?);
        let rate_limiter = Arc::new(RateLimiterState::new(&config.rate_limit, &config.cors));

        let state = AppState {
            relay,
            allow_origin,
        };
        let router = Self::build_router(&config, state, rate_limiter.clone());
        Ok(Self {
            router,
            rate_limiter,
            config,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(
        config: &GatewayConfig,
        state: AppState,
        rate_limiter: Arc<RateLimiterState>,
    ) -> Router {
        let panic_origin = state.allow_origin.clone();

        let mut router = Router::new()
            .route("/url", any(gateway_handler))
            .with_state(state);

        if config.rate_limit.enabled {
            router = router.layer(middleware::from_fn_with_state(
                rate_limiter,
                rate_limit_middleware,
            ));
        }

        router.layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config.cors))
                .layer(CatchPanicLayer::custom(
                    move |err: Box<dyn std::any::Any + Send + 'static>| {
                        response::internal_fault(err, &panic_origin)
                    },
                ))
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(
                    Duration::from_secs(config.relay.timeout_secs) + REQUEST_TIMEOUT_MARGIN,
                )),
        )
    }

    /// Run the server until the shutdown signal (or Ctrl+C) fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        if self.config.rate_limit.enabled {
            spawn_eviction_sweep(self.rate_limiter.clone(), shutdown.resubscribe());
        }

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let mut shutdown = shutdown;
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => {}
                    _ = tokio::signal::ctrl_c() => {}
                }
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Periodically drop expired rate-limit windows so the table stays bounded.
fn spawn_eviction_sweep(state: Arc<RateLimiterState>, mut shutdown: broadcast::Receiver<()>) {
    let period = state.limiter().window();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await; // first tick fires immediately
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    state.limiter().evict_expired();
                    tracing::debug!(
                        tracked = state.limiter().tracked_identities(),
                        "Swept expired rate-limit windows"
                    );
                }
                _ = shutdown.recv() => break,
            }
        }
    });
}

/// Main gateway handler: extract the target, validate, forward, relay.
async fn gateway_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    RawQuery(query): RawQuery,
    request: Request<Body>,
) -> Response {
    let start = Instant::now();
    let client = addr.ip().to_string();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %request.uri(),
        client = %client,
        "Received request"
    );

    let raw_target = query
        .as_deref()
        .and_then(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == "url")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_default();

    let target = match target::validate(&raw_target) {
        Ok(url) => url,
        Err(DenyReason::MissingParam) => {
            tracing::warn!(
                request_id = %request_id,
                client = %client,
                "Missing \"url\" parameter"
            );
            metrics::record_denied_target(DenyReason::MissingParam.as_str());
            metrics::record_request(method.as_str(), 400, start);
            return response::json_error(
                StatusCode::BAD_REQUEST,
                response::MISSING_PARAM_MESSAGE,
                &state.allow_origin,
            );
        }
        Err(reason) => {
            tracing::warn!(
                request_id = %request_id,
                target = %raw_target,
                client = %client,
                reason = reason.as_str(),
                "Invalid target URL"
            );
            metrics::record_denied_target(reason.as_str());
            metrics::record_request(method.as_str(), 400, start);
            return response::json_error(
                StatusCode::BAD_REQUEST,
                response::INVALID_URL_MESSAGE,
                &state.allow_origin,
            );
        }
    };

    tracing::info!(
        request_id = %request_id,
        method = %method,
        target = %target,
        "Forwarding request"
    );

    let (parts, body) = request.into_parts();
    match state
        .relay
        .forward(method.clone(), &parts.headers, body, target.clone())
        .await
    {
        Ok(relayed) => {
            metrics::record_request(method.as_str(), relayed.status().as_u16(), start);
            relayed
        }
        Err(err) => {
            let details = err.to_string();
            tracing::error!(
                request_id = %request_id,
                target = %target,
                error = %details,
                "Proxy error"
            );
            metrics::record_request(method.as_str(), 500, start);
            response::proxy_error(&details, &state.allow_origin)
        }
    }
}

/// CORS layer covering preflight and browser-facing response headers.
fn cors_layer(cors: &CorsConfig) -> CorsLayer {
    let allow_origin = if cors.allowed_origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            cors.allowed_origins
                .iter()
                .filter_map(|origin| HeaderValue::from_str(origin).ok()),
        )
    };
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::HEAD,
            Method::PATCH,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([HeaderName::from_static(response::PROXIED_BY_HEADER)])
}

/// Request ID generation (UUID v4), attached before tracing so every log
/// line carries it.
#[derive(Clone, Copy, Default)]
struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}
