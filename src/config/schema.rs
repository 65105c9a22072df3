//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// Deployment mode; controls error detail and log format.
    pub environment: Environment,

    /// Upstream backend origin.
    pub upstream: UpstreamConfig,

    /// Primary API route, forwarded to `upstream.base_url`.
    pub api: ApiRouteConfig,

    /// Additional named proxy routes.
    pub routes: Vec<RouteConfig>,

    /// OAuth initiation route.
    pub oauth: OAuthConfig,

    /// Session cookie settings for the status probe.
    pub session: SessionConfig,

    /// Static asset directory and page map.
    pub static_files: StaticFilesConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request body and redirect limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Parse an environment name. Only `production` (any case) selects production.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("production") {
            Environment::Production
        } else {
            Environment::Development
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

/// Upstream backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the backend API (e.g., "http://backend.internal:8080").
    pub base_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// Primary API route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiRouteConfig {
    /// Path prefix stripped before forwarding.
    pub path: String,

    /// Follow upstream redirects instead of relaying them.
    pub follow_redirects: bool,
}

impl Default for ApiRouteConfig {
    fn default() -> Self {
        Self {
            path: "/api".to_string(),
            follow_redirects: true,
        }
    }
}

/// Additional named proxy route.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Path prefix to match and strip.
    pub path: String,

    /// Upstream origin for this route.
    pub target: String,

    /// Follow upstream redirects (default: false).
    #[serde(default)]
    pub follow_redirects: bool,
}

/// OAuth initiation route configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OAuthConfig {
    /// Gateway path the provider segment is appended to.
    pub mount_path: String,

    /// Upstream path the provider segment is appended to.
    pub upstream_path: String,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            mount_path: "/oauth2/authorization".to_string(),
            upstream_path: "/oauth2/authorization".to_string(),
        }
    }
}

/// Session cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Cookie whose presence `/status` reports.
    pub token_cookie: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_cookie: "jwt_token".to_string(),
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticFilesConfig {
    /// Directory holding the front-end assets.
    pub root: String,

    /// Page path -> HTML file (relative to `root`).
    pub pages: BTreeMap<String, String>,
}

impl Default for StaticFilesConfig {
    fn default() -> Self {
        let pages = [
            ("/", "index.html"),
            ("/login", "login.html"),
            ("/signup", "signup.html"),
            ("/community", "community.html"),
            ("/mentoring", "mentoring.html"),
            ("/mypage", "mypage.html"),
        ]
        .into_iter()
        .map(|(path, file)| (path.to_string(), file.to_string()))
        .collect();

        Self {
            root: "public".to_string(),
            pages,
        }
    }
}

/// Timeout configuration for upstream calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed for the upstream to produce response headers, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 30,
        }
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum buffered body size in bytes.
    pub max_body_size: usize,

    /// Maximum redirect hops followed per request.
    pub max_redirects: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 10 * 1024 * 1024, // 10MB
            max_redirects: 21,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log format; when unset, JSON in production and pretty otherwise.
    pub log_format: Option<LogFormat>,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: None,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
