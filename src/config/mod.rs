//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → loader.rs (optional TOML file named by GATEWAY_CONFIG)
//!     → loader.rs (environment overrides: ALLOWED_ORIGINS, PORT,
//!                  RATE_LIMIT_WINDOW_SECS, RATE_LIMIT_MAX_REQUESTS)
//!     → validation.rs (semantic checks, all errors reported)
//!     → GatewayConfig (validated, immutable)
//!     → shared with the server at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults so a bare environment works out of the box
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    CorsConfig, GatewayConfig, ListenerConfig, ObservabilityConfig, RateLimitConfig, RelayConfig,
};
