//! Proxy handler.
//!
//! # Flow
//! ```text
//! request under a proxy prefix
//!     → routing (longest prefix) → strip prefix, compose upstream URI
//!     → security::headers (hop-by-hop out, X-Forwarded-*, X-Real-IP in)
//!     → request::prepare_body (JSON normalization / buffering)
//!     → upstream::dispatch (deadline, optional redirect following)
//!     → response::relay_response (Set-Cookie rewrite, streamed body)
//! ```

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::error::GatewayError;
use crate::http::request::{prepare_body, upstream_uri, UpstreamRequest};
use crate::http::response::relay_response;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::{apply_forwarded_headers, client_ip, strip_hop_by_hop};

/// Forward a request to the upstream of the route owning its path.
pub async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, GatewayError> {
    let start_time = Instant::now();
    let path = request.uri().path().to_string();
    let method = request.method().clone();
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let Some(route) = state.routes.match_path(&path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No proxy route matched");
        return Ok((StatusCode::NOT_FOUND, "Not Found").into_response());
    };

    let stripped = route.matcher.strip(&path).unwrap_or("/");
    let uri = upstream_uri(&route.target, stripped, request.uri().query())?;

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let (parts, body) = request.into_parts();
    let mut headers = parts.headers;
    // HTTP/2 clients carry the host in the :authority pseudo-header
    let original_host = headers.get(header::HOST).cloned().or_else(|| {
        parts
            .uri
            .authority()
            .and_then(|authority| HeaderValue::from_str(authority.as_str()).ok())
    });
    let client_host = original_host
        .as_ref()
        .and_then(|h| h.to_str().ok())
        .map(str::to_string);
    let real_ip = client_ip(&headers, peer);

    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    apply_forwarded_headers(&mut headers, original_host, state.scheme, real_ip.as_deref());

    let body = prepare_body(
        &mut headers,
        body,
        route.follow_redirects,
        state.config.limits.max_body_size,
    )
    .await?;

    tracing::info!(
        request_id = %request_id,
        route = %route.name,
        method = %method,
        path = %path,
        origin = %route.target.origin().ascii_serialization(),
        upstream_path = %uri.path(),
        "Forwarding request"
    );

    let upstream_request = UpstreamRequest {
        method: method.clone(),
        uri,
        headers,
        body,
    };

    match state
        .upstream
        .dispatch(upstream_request, route.follow_redirects)
        .await
    {
        Ok(response) => {
            let status = response.status();
            tracing::info!(
                request_id = %request_id,
                route = %route.name,
                method = %method,
                path = %path,
                status = status.as_u16(),
                elapsed_ms = start_time.elapsed().as_millis() as u64,
                "Received upstream response"
            );
            metrics::record_request(&route.name, method.as_str(), status.as_u16(), start_time);
            Ok(relay_response(response, client_host.as_deref()))
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                route = %route.name,
                method = %method,
                path = %path,
                error = %e,
                "Upstream request failed"
            );
            metrics::record_upstream_error(&route.name, e.error_type());
            Err(e)
        }
    }
}
