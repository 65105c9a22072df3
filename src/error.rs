//! Gateway error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Detail attached to responses for failures that were not expected.
///
/// Rendered into the body by [`crate::http::server`] in development mode only.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Upstream connection failed: {0}")]
    UpstreamUnreachable(String),

    #[error("Upstream timed out")]
    UpstreamTimeout,

    #[error("Maximum number of redirects exceeded ({0})")]
    TooManyRedirects(usize),

    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("Request build failed: {0}")]
    RequestBuildFailed(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Request body too large")]
    PayloadTooLarge,

    #[error("Invalid OAuth provider: {0}")]
    InvalidProvider(String),

    #[error("OAuth upstream did not redirect (status {0})")]
    OAuthNotRedirected(StatusCode),
}

impl GatewayError {
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::UpstreamUnreachable(_) => "upstream_unreachable",
            Self::UpstreamTimeout => "upstream_timeout",
            Self::TooManyRedirects(_) => "too_many_redirects",
            Self::InvalidUpstreamUrl(_) => "invalid_upstream_url",
            Self::RequestBuildFailed(_) => "request_build_failed",
            Self::MalformedBody(_) => "malformed_body",
            Self::PayloadTooLarge => "payload_too_large",
            Self::InvalidProvider(_) => "invalid_provider",
            Self::OAuthNotRedirected(_) => "oauth_not_redirected",
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::MalformedBody(_) | Self::InvalidProvider(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UpstreamUnreachable(_)
            | Self::TooManyRedirects(_)
            | Self::InvalidUpstreamUrl(_)
            | Self::RequestBuildFailed(_)
            | Self::OAuthNotRedirected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Internal faults, as opposed to upstream or client problems.
    pub const fn is_unexpected(&self) -> bool {
        matches!(self, Self::InvalidUpstreamUrl(_) | Self::RequestBuildFailed(_))
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            Self::UpstreamUnreachable(_) | Self::TooManyRedirects(_) => "Proxy error",
            Self::UpstreamTimeout => "Gateway timeout",
            Self::MalformedBody(_) => "Malformed request body",
            Self::PayloadTooLarge => "Request body too large",
            Self::InvalidProvider(_) => "Invalid OAuth provider",
            Self::OAuthNotRedirected(_) => "OAuth redirect failed",
            Self::InvalidUpstreamUrl(_) | Self::RequestBuildFailed(_) => "Internal Server Error",
        };

        let mut response = (status, message).into_response();
        if self.is_unexpected() {
            response
                .extensions_mut()
                .insert(ErrorDetail(self.to_string()));
        }
        response
    }
}
