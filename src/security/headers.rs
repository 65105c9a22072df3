//! Header manipulation for forwarded requests.
//!
//! # Responsibilities
//! - Add X-Forwarded-Host, X-Forwarded-Proto and X-Real-IP
//! - Strip hop-by-hop headers in both directions
//!
//! # Design Decisions
//! - An existing X-Real-IP wins, then the client-most X-Forwarded-For entry,
//!   then the socket peer address
//! - Headers named in `Connection` are hop-by-hop too

use std::net::SocketAddr;

use axum::http::header::{self, HeaderMap, HeaderName, HeaderValue};

pub static X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
pub static X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
pub static X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
pub static X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");

const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Remove hop-by-hop headers, including any listed in `Connection`.
pub fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let named: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|token| HeaderName::from_bytes(token.trim().as_bytes()).ok())
        .collect();

    for name in named {
        headers.remove(name);
    }
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
}

/// Resolve the client address reported upstream as X-Real-IP.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let header_value = |name: &HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    if let Some(real_ip) = header_value(&X_REAL_IP) {
        return Some(real_ip.to_string());
    }

    if let Some(first) = header_value(&X_FORWARDED_FOR)
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
    {
        return Some(first.to_string());
    }

    peer.map(|addr| addr.ip().to_string())
}

/// Inject forwarding headers into an upstream request.
pub fn apply_forwarded_headers(
    headers: &mut HeaderMap,
    original_host: Option<HeaderValue>,
    scheme: &str,
    real_ip: Option<&str>,
) {
    if let Some(host) = original_host {
        headers.insert(X_FORWARDED_HOST.clone(), host);
    }
    if let Ok(proto) = HeaderValue::from_str(scheme) {
        headers.insert(X_FORWARDED_PROTO.clone(), proto);
    }
    if let Some(ip) = real_ip.and_then(|ip| HeaderValue::from_str(ip).ok()) {
        headers.insert(X_REAL_IP.clone(), ip);
    }
}
