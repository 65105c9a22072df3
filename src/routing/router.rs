//! Route lookup.
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Longest prefix wins, so nested mounts can override a parent mount
//! - Explicit `None` rather than a silent default

use url::Url;

use crate::config::{GatewayConfig, RouteConfig};
use crate::error::GatewayError;
use crate::routing::matcher::PathPrefixMatcher;

/// Name of the route built from `[api]`.
pub const API_ROUTE_NAME: &str = "api";

/// A compiled proxy route.
#[derive(Debug, Clone)]
pub struct ProxyRoute {
    pub name: String,
    pub matcher: PathPrefixMatcher,
    pub target: Url,
    pub follow_redirects: bool,
}

impl ProxyRoute {
    pub fn new(
        name: impl Into<String>,
        path: &str,
        target: &str,
        follow_redirects: bool,
    ) -> Result<Self, GatewayError> {
        let target = Url::parse(target)
            .map_err(|e| GatewayError::InvalidUpstreamUrl(format!("{target}: {e}")))?;
        Ok(Self {
            name: name.into(),
            matcher: PathPrefixMatcher::new(path),
            target,
            follow_redirects,
        })
    }

    pub fn path(&self) -> &str {
        self.matcher.prefix()
    }
}

/// Compiled set of proxy routes.
#[derive(Debug, Clone, Default)]
pub struct ProxyRouter {
    /// Sorted by prefix length, longest first.
    routes: Vec<ProxyRoute>,
}

impl ProxyRouter {
    pub fn new(mut routes: Vec<ProxyRoute>) -> Self {
        routes.sort_by(|a, b| b.path().len().cmp(&a.path().len()));
        Self { routes }
    }

    /// Compile the primary API route plus every named route.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let mut routes = vec![ProxyRoute::new(
            API_ROUTE_NAME,
            &config.api.path,
            &config.upstream.base_url,
            config.api.follow_redirects,
        )?];

        for RouteConfig {
            name,
            path,
            target,
            follow_redirects,
        } in &config.routes
        {
            routes.push(ProxyRoute::new(name.clone(), path, target, *follow_redirects)?);
        }

        Ok(Self::new(routes))
    }

    /// Find the route owning `path`.
    pub fn match_path(&self, path: &str) -> Option<&ProxyRoute> {
        self.routes.iter().find(|route| route.matcher.matches(path))
    }

    pub fn routes(&self) -> &[ProxyRoute] {
        &self.routes
    }
}
