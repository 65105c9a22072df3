//! Structured logging.
//!
//! JSON lines in production, human-readable output otherwise; `RUST_LOG`
//! overrides the default filter.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::{GatewayConfig, LogFormat};

const DEFAULT_FILTER: &str = "bff_gateway=info,tower_http=info";

/// Pick the output format: explicit setting first, then the environment mode.
pub fn log_format(config: &GatewayConfig) -> LogFormat {
    config.observability.log_format.unwrap_or(if config.environment.is_production() {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    })
}

/// Initialize the global tracing subscriber.
pub fn init_logging(config: &GatewayConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());

    let fmt_layer = match log_format(config) {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init()
}
