//! Backend-for-frontend gateway.
//!
//! Serves the front-end's static pages and forwards API, auth and OAuth
//! traffic to a single backend, rewriting cookies so they bind to the
//! gateway's own host.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::schema::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
