//! Gateway response envelopes and header policy.
//!
//! # Responsibilities
//! - Build the JSON error envelopes with their exact wire messages
//! - Apply the cross-origin header to every gateway-generated response
//! - Resolve panics inside a request to a 500 instead of a dropped
//!   connection
//!
//! # Design Decisions
//! - Error bodies are stable: an `error` field always, `details` only for
//!   upstream failures, never internal state

use std::any::Any;

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::CorsConfig;

/// Marker header identifying the gateway on relayed responses.
pub const PROXIED_BY_HEADER: &str = "x-proxied-by";
pub const PROXIED_BY_VALUE: &str = "CORS-Proxy-Server";

pub const MISSING_PARAM_MESSAGE: &str = "Missing \"url\" parameter";
pub const INVALID_URL_MESSAGE: &str =
    "Invalid URL. Must include valid http/https protocol and host.";
pub const RATE_LIMITED_MESSAGE: &str =
    "Too many requests from this IP, please try again later.";
pub const PROXY_ERROR_MESSAGE: &str = "Proxy error occurred";
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// The Access-Control-Allow-Origin value for this deployment: the first
/// configured origin, or the wildcard when none is configured.
pub fn allow_origin_value(cors: &CorsConfig) -> HeaderValue {
    cors.allowed_origins
        .first()
        .and_then(|origin| HeaderValue::from_str(origin).ok())
        .unwrap_or_else(|| HeaderValue::from_static("*"))
}

/// A gateway-generated JSON error: `{"error": <message>}`.
pub fn json_error(status: StatusCode, message: &str, allow_origin: &HeaderValue) -> Response {
    let mut response = (status, Json(json!({ "error": message }))).into_response();
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin.clone());
    response
}

/// The forward-failure envelope: `{"error": ..., "details": ...}`.
pub fn proxy_error(details: &str, allow_origin: &HeaderValue) -> Response {
    let mut response = (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": PROXY_ERROR_MESSAGE, "details": details })),
    )
        .into_response();
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, allow_origin.clone());
    response
}

/// Last-resort handler for a panic inside request handling: log it and
/// resolve the request with a 500 rather than dropping the connection.
pub fn internal_fault(err: Box<dyn Any + Send + 'static>, allow_origin: &HeaderValue) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| err.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!(error = %detail, "Uncaught failure in request handler");
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        INTERNAL_ERROR_MESSAGE,
        allow_origin,
    )
}
