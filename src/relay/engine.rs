//! Outbound forwarding.
//!
//! # Responsibilities
//! - Open one outbound request per forward: original method, filtered
//!   headers, buffered body
//! - Follow redirects up to the configured cap
//! - Stream the upstream response back, with the gateway headers injected
//! - Map every transport failure to a RelayError; never retry
//!
//! # Design Decisions
//! - Host is derived from the target, not copied from the caller, so the
//!   upstream sees an ordinary origin request
//! - Hop-by-hop headers are stripped in both directions
//! - The response body is streamed, not buffered; dropping the future
//!   aborts the outbound connection

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, HeaderValue, Method, Response};
use url::Url;

use crate::config::RelayConfig;
use crate::http::response::{PROXIED_BY_HEADER, PROXIED_BY_VALUE};
use crate::relay::error::RelayError;

/// Forwards validated requests to their target and relays the response.
///
/// Holds no cross-request state; one instance serves the whole gateway.
pub struct RelayEngine {
    client: reqwest::Client,
    timeout: Duration,
    max_body_bytes: usize,
    allow_origin: HeaderValue,
}

impl RelayEngine {
    pub fn new(config: &RelayConfig, allow_origin: HeaderValue) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            timeout,
            max_body_bytes: config.max_body_bytes,
            allow_origin,
        })
    }

    /// Forward one request to `target` and relay the upstream response.
    pub async fn forward(
        &self,
        method: Method,
        headers: &HeaderMap,
        body: Body,
        target: Url,
    ) -> Result<Response<Body>, RelayError> {
        let body = to_bytes(body, self.max_body_bytes)
            .await
            .map_err(RelayError::RequestBody)?;

        let upstream = self
            .client
            .request(method, target)
            .headers(relay_request_headers(headers))
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::Timeout(self.timeout)
                } else {
                    RelayError::Upstream(e)
                }
            })?;

        let status = upstream.status();
        let mut relayed = HeaderMap::with_capacity(upstream.headers().len() + 2);
        for (name, value) in upstream.headers() {
            if !is_hop_by_hop(name.as_str()) {
                relayed.append(name.clone(), value.clone());
            }
        }
        relayed.insert(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            self.allow_origin.clone(),
        );
        relayed.insert(
            header::HeaderName::from_static(PROXIED_BY_HEADER),
            HeaderValue::from_static(PROXIED_BY_VALUE),
        );

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = relayed;
        Ok(response)
    }
}

/// Copy caller headers for the outbound request.
///
/// Host and Content-Length are recomputed by the client; hop-by-hop headers
/// belong to the inbound connection, not the forwarded request.
fn relay_request_headers(headers: &HeaderMap) -> HeaderMap {
    let mut outbound = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name_str = name.as_str();
        if is_hop_by_hop(name_str) || name_str == "host" || name_str == "content-length" {
            continue;
        }
        outbound.append(name.clone(), value.clone());
    }
    outbound
}

fn is_hop_by_hop(name: &str) -> bool {
    matches!(
        name,
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}
