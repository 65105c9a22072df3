//! Configuration validation.
//!
//! Serde handles syntax; this checks semantics and returns every error found,
//! not just the first.

use std::collections::HashSet;
use std::fmt;

use url::Url;

use crate::config::schema::GatewayConfig;

/// Paths served by the gateway itself.
pub const STATUS_PATH: &str = "/status";
pub const PROXY_STATUS_PATH: &str = "/proxy-status";

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("not a socket address: {}", config.listener.bind_address),
        ));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() || tls.key_path.is_empty() {
            errors.push(ValidationError::new(
                "listener.tls",
                "cert_path and key_path are required",
            ));
        }
    }

    check_target("upstream.base_url", &config.upstream.base_url, &mut errors);

    let reserved: HashSet<&str> = [STATUS_PATH, PROXY_STATUS_PATH, config.oauth.mount_path.as_str()]
        .into_iter()
        .chain(config.static_files.pages.keys().map(String::as_str))
        .collect();

    let mut seen_paths = HashSet::new();
    let mut seen_names = HashSet::from(["api"]);

    check_path("api.path", &config.api.path, &reserved, &mut seen_paths, &mut errors);

    for (i, route) in config.routes.iter().enumerate() {
        let field = format!("routes[{i}]");
        if route.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("{field}.name"), "must not be empty"));
        } else if !seen_names.insert(route.name.as_str()) {
            errors.push(ValidationError::new(
                format!("{field}.name"),
                format!("duplicate route name: {}", route.name),
            ));
        }
        check_path(&format!("{field}.path"), &route.path, &reserved, &mut seen_paths, &mut errors);
        check_target(&format!("{field}.target"), &route.target, &mut errors);
    }

    if !is_route_path(&config.oauth.mount_path) {
        errors.push(ValidationError::new(
            "oauth.mount_path",
            "must start with '/', not end with '/' and hold no parameters",
        ));
    }
    if !config.oauth.upstream_path.starts_with('/') {
        errors.push(ValidationError::new("oauth.upstream_path", "must start with '/'"));
    }

    if config.session.token_cookie.trim().is_empty() {
        errors.push(ValidationError::new("session.token_cookie", "must not be empty"));
    }

    for (path, file) in &config.static_files.pages {
        if path != "/" && !is_route_path(path) {
            errors.push(ValidationError::new(
                "static_files.pages",
                format!("page path must start with '/', not end with '/' or hold a parameter: {path}"),
            ));
        }
        if file.is_empty() || file.split(['/', '\\']).any(|part| part == "..") {
            errors.push(ValidationError::new(
                "static_files.pages",
                format!("invalid file for {path}: {file:?}"),
            ));
        }
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::new("limits.max_body_size", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_route_path(path: &str) -> bool {
    path.len() > 1
        && path.starts_with('/')
        && !path.ends_with('/')
        && !path.contains(['{', '}', '*', '?', '#'])
        && !path.split('/').any(|segment| segment.starts_with(':'))
}

fn check_path<'a>(
    field: &str,
    path: &'a str,
    reserved: &HashSet<&str>,
    seen: &mut HashSet<&'a str>,
    errors: &mut Vec<ValidationError>,
) {
    if !is_route_path(path) {
        errors.push(ValidationError::new(
            field,
            format!("must start with '/', not be '/', not end with '/', hold no parameters: {path}"),
        ));
    } else if reserved.contains(path) {
        errors.push(ValidationError::new(field, format!("collides with a gateway path: {path}")));
    } else if !seen.insert(path) {
        errors.push(ValidationError::new(field, format!("duplicate proxy path: {path}")));
    }
}

fn check_target(field: &str, target: &str, errors: &mut Vec<ValidationError>) {
    match Url::parse(target) {
        Ok(url) if url.scheme() == "http" && url.host_str().is_some() => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("must be an absolute http URL, got scheme {}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL {target}: {e}"))),
    }
}
