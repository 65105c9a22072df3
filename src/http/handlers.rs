//! Gateway-owned endpoints.
//!
//! - `/status`: session probe on the token cookie
//! - `/proxy-status`: configured targets, for operators
//! - OAuth entry: relays the backend's authorization redirect
//!
//! None of these forward the client request itself.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::GatewayError;
use crate::http::cookie::request_cookie;
use crate::http::server::AppState;

#[derive(Debug, Serialize)]
pub struct SessionStatus {
    pub status: u16,
}

#[derive(Debug, Serialize)]
pub struct RouteStatus {
    pub name: String,
    pub path: String,
    pub target: String,
    pub follow_redirects: bool,
}

#[derive(Debug, Serialize)]
pub struct OAuthStatus {
    pub path: String,
    pub target: String,
}

#[derive(Debug, Serialize)]
pub struct ProxyStatus {
    pub environment: &'static str,
    pub routes: Vec<RouteStatus>,
    pub oauth: OAuthStatus,
    pub timestamp: DateTime<Utc>,
}

/// Session probe: 200 when the token cookie is present, 401 otherwise.
///
/// Presence only; the token itself is validated by the backend.
pub async fn session_status(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let present = request_cookie(&headers, &state.config.session.token_cookie)
        .is_some_and(|token| !token.is_empty());

    let status = if present {
        StatusCode::OK
    } else {
        StatusCode::UNAUTHORIZED
    };

    (
        status,
        Json(SessionStatus {
            status: status.as_u16(),
        }),
    )
        .into_response()
}

/// Describe the configured proxy targets.
pub async fn proxy_status(State(state): State<AppState>) -> Json<ProxyStatus> {
    let routes = state
        .routes
        .routes()
        .iter()
        .map(|route| RouteStatus {
            name: route.name.clone(),
            path: route.path().to_string(),
            target: route.target.to_string(),
            follow_redirects: route.follow_redirects,
        })
        .collect();

    Json(ProxyStatus {
        environment: state.config.environment.as_str(),
        routes,
        oauth: OAuthStatus {
            path: state.config.oauth.mount_path.clone(),
            target: oauth_target(&state, "{provider}"),
        },
        timestamp: Utc::now(),
    })
}

/// Start a provider login by relaying the upstream's authorization redirect.
pub async fn oauth_authorize(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<Response, GatewayError> {
    if !is_valid_provider(&provider) {
        return Err(GatewayError::InvalidProvider(provider));
    }

    let target = oauth_target(&state, &provider);
    let uri: Uri = target
        .parse()
        .map_err(|e| GatewayError::InvalidUpstreamUrl(format!("{target}: {e}")))?;

    tracing::info!(provider = %provider, target = %target, "Starting OAuth authorization");

    let response = state.upstream.get(uri).await.inspect_err(|e| {
        tracing::error!(provider = %provider, error = %e, "OAuth upstream request failed");
    })?;

    let status = response.status();
    let location = response.headers().get(header::LOCATION).cloned();

    match (status, location) {
        (StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND, Some(location)) => {
            tracing::debug!(provider = %provider, status = %status, "Relaying OAuth redirect");
            Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
        }
        _ => {
            tracing::warn!(provider = %provider, status = %status, "OAuth upstream did not redirect");
            Err(GatewayError::OAuthNotRedirected(status))
        }
    }
}

fn oauth_target(state: &AppState, provider: &str) -> String {
    format!(
        "{}{}/{}",
        state.config.upstream.base_url.trim_end_matches('/'),
        state.config.oauth.upstream_path.trim_end_matches('/'),
        provider
    )
}

fn is_valid_provider(provider: &str) -> bool {
    !provider.is_empty()
        && provider
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
