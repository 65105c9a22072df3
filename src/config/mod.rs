//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (BACKEND_URL, PORT, APP_ENV)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → shared via Arc to all handlers
//! ```
//!
//! # Design Decisions
//! - Config is built once at startup and never mutated afterwards
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ApiRouteConfig, Environment, GatewayConfig, LimitsConfig, ListenerConfig, LogFormat,
    OAuthConfig, ObservabilityConfig, RouteConfig, SessionConfig, StaticFilesConfig,
    TimeoutConfig, TlsConfig, UpstreamConfig,
};
