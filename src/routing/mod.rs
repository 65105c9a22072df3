//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → router.rs (route lookup, longest prefix first)
//!     → matcher.rs (segment-aware prefix match + strip)
//!     → Return: matched ProxyRoute or None
//!
//! Route Compilation (at startup):
//!     [api] + [[routes]]
//!     → Parse targets
//!     → Sort by prefix length
//!     → Freeze as immutable ProxyRouter
//! ```

pub mod matcher;
pub mod router;

pub use matcher::PathPrefixMatcher;
pub use router::{ProxyRoute, ProxyRouter, API_ROUTE_NAME};
