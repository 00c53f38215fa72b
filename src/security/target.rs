//! Target URL validation.
//!
//! # Responsibilities
//! - Parse the caller-supplied target and enforce http/https with a host
//! - Deny loopback and private hosts (SSRF mitigation)
//! - Enforce a strict absolute-URL shape even when the parser is lenient
//!
//! # Design Decisions
//! - Pure function, no shared state; safe to call from any handler
//! - Blocklist is checked before the shape test so blocked hosts always
//!   surface as BlockedHost
//! - The blocklist is deliberately narrow (localhost, 127.*, 192.168.*,
//!   0.0.0.0); other private ranges pass only if they survive the shape
//!   test, which rejects bare numeric IPs

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

// Absolute URL with a dotted host label pair, optional port, optional path.
// Rejects bare hostnames and plain numeric IPs that lenient parsers accept.
static URL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)([\w.-]+)(\.[a-z]{2,})(:\d{1,5})?(/.*)?$")
        .expect("URL shape pattern is valid")
});

/// Why a candidate target was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    /// No target supplied at all.
    MissingParam,
    /// Scheme is not http/https, or the URL has no host.
    BadScheme,
    /// The string does not parse, or fails the strict shape check.
    BadFormat,
    /// The host matches the SSRF blocklist.
    BlockedHost,
}

impl DenyReason {
    /// Stable label, used for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DenyReason::MissingParam => "missing_param",
            DenyReason::BadScheme => "bad_scheme",
            DenyReason::BadFormat => "bad_format",
            DenyReason::BlockedHost => "blocked_host",
        }
    }
}

/// Decide whether a raw target string may be forwarded to.
///
/// Returns the parsed URL on success so callers forward exactly what was
/// validated.
pub fn validate(raw: &str) -> Result<Url, DenyReason> {
    if raw.is_empty() {
        return Err(DenyReason::MissingParam);
    }

    let parsed = Url::parse(raw).map_err(|_| DenyReason::BadFormat)?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(DenyReason::BadScheme);
    }
    let host = match parsed.host_str() {
        Some(host) if !host.is_empty() => host.to_ascii_lowercase(),
        _ => return Err(DenyReason::BadScheme),
    };

    if host == "localhost"
        || host == "0.0.0.0"
        || host.starts_with("127.")
        || host.starts_with("192.168.")
    {
        return Err(DenyReason::BlockedHost);
    }

    if !URL_SHAPE.is_match(raw) {
        return Err(DenyReason::BadFormat);
    }

    Ok(parsed)
}
