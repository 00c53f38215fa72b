//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, rate-limit admission)
//!     → security::target (validate the requested forward target)
//!     → relay::engine (forward and stream back)
//!     → response.rs (error envelopes, gateway headers)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::HttpServer;
