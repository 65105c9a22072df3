//! Configuration loading from disk and the process environment.

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{Environment, GatewayConfig};
use crate::config::validation::{validate_config, ValidationError};

/// Upstream base URL.
pub const ENV_BACKEND_URL: &str = "BACKEND_URL";
/// Listener port.
pub const ENV_PORT: &str = "PORT";
/// Deployment mode (`production` or anything else).
pub const ENV_APP_ENV: &str = "APP_ENV";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid environment variable {name}: {reason}")]
    Env { name: &'static str, reason: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration: optional TOML file, then environment overrides, then validation.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => parse_file(path)?,
        None => GatewayConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn parse_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Apply environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(ENV_BACKEND_URL).filter(|v| !v.trim().is_empty()) {
        config.upstream.base_url = url.trim().to_string();
    }

    if let Some(mode) = lookup(ENV_APP_ENV) {
        config.environment = Environment::from_name(&mode);
    }

    if let Some(port) = lookup(ENV_PORT).filter(|v| !v.trim().is_empty()) {
        let port: u16 = port.trim().parse().map_err(|e| ConfigError::Env {
            name: ENV_PORT,
            reason: format!("{e}"),
        })?;
        let mut addr: SocketAddr =
            config
                .listener
                .bind_address
                .parse()
                .map_err(|e| ConfigError::Env {
                    name: ENV_PORT,
                    reason: format!("bind address {}: {e}", config.listener.bind_address),
                })?;
        addr.set_port(port);
        config.listener.bind_address = addr.to_string();
    }

    Ok(())
}
