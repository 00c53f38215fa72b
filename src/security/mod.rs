//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per-IP admission, before all other work)
//!     → target.rs (validate the requested forward target)
//!     → Pass to the relay
//! ```
//!
//! # Design Decisions
//! - Fail closed: any check failure terminates the request
//! - The validator is pure; the limiter owns the only shared mutable state
//! - Blocked targets surface externally as a generic invalid-URL error

pub mod rate_limit;
pub mod target;
