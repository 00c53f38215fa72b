//! Relay failure taxonomy.

use std::time::Duration;

use thiserror::Error;

/// A failed forward. Every variant maps to one gateway-facing 500 response;
/// the display text becomes the `details` field of the error envelope.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The inbound body could not be buffered (read error or over the
    /// configured size cap).
    #[error("failed to read request body: {0}")]
    RequestBody(#[source] axum::Error),

    /// The upstream did not complete within the configured budget.
    #[error("upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// DNS, connect, TLS, redirect-cap, or protocol failure talking to the
    /// upstream. Redirect-cap excess is deliberately not distinguished.
    #[error("{0}")]
    Upstream(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_display_names_the_budget() {
        let err = RelayError::Timeout(Duration::from_secs(30));
        assert!(err.to_string().contains("30s"));
    }
}
