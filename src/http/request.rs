//! Upstream request preparation.
//!
//! # Responsibilities
//! - Compose the upstream URI from the route target and the stripped path
//! - Normalize JSON bodies (parse, re-serialize, fix Content-Length)
//! - Decide between streaming and buffering the body
//!
//! # Design Decisions
//! - Only bodies that must be inspected or replayed are buffered
//! - The query string is forwarded untouched

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use url::Url;

use crate::error::GatewayError;
use crate::security::limits::collect_limited;

/// Body of an upstream request.
#[derive(Debug)]
pub enum UpstreamBody {
    /// Forwarded as it arrives.
    Streaming(Body),
    /// Held in memory; can be replayed across redirects.
    Buffered(Bytes),
}

/// A request ready to be sent upstream.
#[derive(Debug)]
pub struct UpstreamRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: UpstreamBody,
}

/// Join the route target with the path left after prefix stripping.
///
/// A target base path is kept: target `http://media/static` with path `/a.png`
/// yields `http://media/static/a.png`.
pub fn upstream_uri(target: &Url, path: &str, query: Option<&str>) -> Result<Uri, GatewayError> {
    let host = target
        .host_str()
        .ok_or_else(|| GatewayError::InvalidUpstreamUrl(format!("{target}: missing host")))?;
    let authority = match target.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    let base = target.path().trim_end_matches('/');
    let path = if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    };

    let uri = match query {
        Some(query) => format!("{}://{authority}{path}?{query}", target.scheme()),
        None => format!("{}://{authority}{path}", target.scheme()),
    };

    uri.parse()
        .map_err(|e| GatewayError::RequestBuildFailed(format!("{uri}: {e}")))
}

/// True for `application/json` and `+json` media types.
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|essence| {
            let essence = essence.trim().to_ascii_lowercase();
            essence == "application/json" || essence.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Parse a JSON document and write it back compactly.
pub fn normalize_json(raw: &[u8]) -> Result<Bytes, GatewayError> {
    let value: serde_json::Value =
        serde_json::from_slice(raw).map_err(|e| GatewayError::MalformedBody(e.to_string()))?;
    serde_json::to_vec(&value)
        .map(Bytes::from)
        .map_err(|e| GatewayError::MalformedBody(e.to_string()))
}

/// Prepare the request body for forwarding.
///
/// JSON bodies are normalized and get fresh `Content-Type`/`Content-Length`
/// headers. Other bodies stream, unless `buffer` asks for them to be held
/// for redirect replay.
pub async fn prepare_body(
    headers: &mut HeaderMap,
    body: Body,
    buffer: bool,
    max_body_size: usize,
) -> Result<UpstreamBody, GatewayError> {
    if is_json_content_type(headers) {
        let raw = collect_limited(body, max_body_size).await?;
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(UpstreamBody::Buffered(raw));
        }

        let json = normalize_json(&raw)?;
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(json.len()));
        return Ok(UpstreamBody::Buffered(json));
    }

    if buffer {
        let raw = collect_limited(body, max_body_size).await?;
        if !raw.is_empty() {
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(raw.len()));
        }
        return Ok(UpstreamBody::Buffered(raw));
    }

    Ok(UpstreamBody::Streaming(body))
}
