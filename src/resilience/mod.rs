//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to upstream:
//!     → connector connect timeout (timeouts.connect_secs)
//!     → timeouts.rs (deadline on response headers, timeouts.request_secs)
//!     → failure surfaced immediately; nothing is retried
//! ```

pub mod timeouts;
