//! Response relay.
//!
//! # Responsibilities
//! - Rewrite upstream `Set-Cookie` values for the gateway's host
//! - Strip hop-by-hop headers
//! - Stream the upstream body back without buffering
//!
//! # Design Decisions
//! - Status code and every other header pass through verbatim
//! - `Set-Cookie` order is preserved

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::response::Response;
use hyper::body::Incoming;

use crate::http::cookie::rewrite_set_cookie;
use crate::security::headers::strip_hop_by_hop;

/// Turn an upstream response into the client response.
pub fn relay_response(response: hyper::Response<Incoming>, client_host: Option<&str>) -> Response {
    let (mut parts, body) = response.into_parts();
    strip_hop_by_hop(&mut parts.headers);
    rewrite_set_cookies(&mut parts.headers, client_host);
    Response::from_parts(parts, Body::new(body))
}

/// Rewrite every `Set-Cookie` header in place.
///
/// Values that are not valid UTF-8 are kept untouched.
pub fn rewrite_set_cookies(headers: &mut HeaderMap, client_host: Option<&str>) {
    let originals: Vec<HeaderValue> = headers.get_all(header::SET_COOKIE).iter().cloned().collect();
    if originals.is_empty() {
        return;
    }
    headers.remove(header::SET_COOKIE);

    for original in originals {
        let rewritten = original
            .to_str()
            .ok()
            .map(|raw| rewrite_set_cookie(raw, client_host))
            .and_then(|raw| HeaderValue::from_str(&raw).ok())
            .unwrap_or(original);
        headers.append(header::SET_COOKIE, rewritten);
    }
}
