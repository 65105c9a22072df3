//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, route table)
//!     → handlers.rs (/status, /proxy-status, OAuth entry)
//!     → proxy.rs (prefix routes)
//!         → request.rs (upstream URI, body preparation)
//!         → upstream.rs (hyper client, deadline, redirects)
//!         → response.rs (hop-by-hop strip, cookie.rs rewrite)
//!     → static_files.rs (pages and assets for everything else)
//! ```

pub mod cookie;
pub mod handlers;
pub mod proxy;
pub mod request;
pub mod response;
pub mod server;
pub mod static_files;
pub mod upstream;

pub use server::{AppState, HttpServer};
