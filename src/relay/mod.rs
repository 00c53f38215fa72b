//! Relay subsystem.
//!
//! # Data Flow
//! ```text
//! Validated target + inbound request
//!     → engine.rs (buffer body, filter headers, send outbound)
//!     → upstream responds / fails
//!     → engine.rs (inject gateway headers, stream body back)
//!     → error.rs (failures become one tagged RelayError)
//! ```
//!
//! # Design Decisions
//! - No retries: a failed forward surfaces immediately. A retry policy
//!   would wrap `RelayEngine::forward` without changing this contract.
//! - Every forward is bounded by connect and total timeouts

pub mod engine;
pub mod error;

pub use engine::RelayEngine;
pub use error::RelayError;
