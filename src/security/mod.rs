//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → limits.rs (bounded collection of buffered bodies)
//!     → headers.rs (strip hop-by-hop, add X-Forwarded-*, X-Real-IP)
//!     → Forward upstream
//! ```

pub mod headers;
pub mod limits;
