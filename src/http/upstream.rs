//! Upstream HTTP client.
//!
//! # Responsibilities
//! - Pooled connections to upstream origins (hyper-util legacy client)
//! - Connect timeout on the connector, response deadline per request
//! - Redirect following for routes that ask for it
//!
//! # Redirect rules
//! - 301/302/303/307/308 with a `Location` are followed, up to `max_redirects`
//! - 301/302 after POST and 303 after anything but HEAD become a bodiless GET
//! - 307/308 replay method and body (the body is buffered for this)
//! - Moving to another host drops credentials and cookies

use std::error::Error as StdError;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, Method, Request, Response, StatusCode, Uri};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use url::Url;

use crate::config::{LimitsConfig, TimeoutConfig};
use crate::error::GatewayError;
use crate::http::request::{UpstreamBody, UpstreamRequest};
use crate::resilience::timeouts::with_deadline;

/// Client used for every upstream call.
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client<HttpConnector, Body>,
    request_timeout: Duration,
    max_redirects: usize,
}

impl UpstreamClient {
    pub fn new(timeouts: &TimeoutConfig, limits: &LimitsConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(timeouts.connect_secs)));
        connector.set_nodelay(true);

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            request_timeout: Duration::from_secs(timeouts.request_secs),
            max_redirects: limits.max_redirects,
        }
    }

    /// Send a request, following redirects when `follow_redirects` is set and
    /// the body can be replayed.
    pub async fn dispatch(
        &self,
        request: UpstreamRequest,
        follow_redirects: bool,
    ) -> Result<Response<Incoming>, GatewayError> {
        with_deadline(self.request_timeout, async move {
            match request.body {
                UpstreamBody::Buffered(body) if follow_redirects => {
                    self.follow(request.method, request.uri, request.headers, body)
                        .await
                }
                UpstreamBody::Buffered(body) => {
                    self.send_once(request.method, request.uri, request.headers, Body::from(body))
                        .await
                }
                UpstreamBody::Streaming(body) => {
                    self.send_once(request.method, request.uri, request.headers, body)
                        .await
                }
            }
        })
        .await
    }

    /// Plain GET without redirect handling.
    pub async fn get(&self, uri: Uri) -> Result<Response<Incoming>, GatewayError> {
        with_deadline(
            self.request_timeout,
            self.send_once(Method::GET, uri, HeaderMap::new(), Body::empty()),
        )
        .await
    }

    async fn send_once(
        &self,
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        body: Body,
    ) -> Result<Response<Incoming>, GatewayError> {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .body(body)
            .map_err(|e| GatewayError::RequestBuildFailed(e.to_string()))?;
        *request.headers_mut() = headers;

        self.client
            .request(request)
            .await
            .map_err(|e| GatewayError::UpstreamUnreachable(error_chain(&e)))
    }

    async fn follow(
        &self,
        mut method: Method,
        mut uri: Uri,
        mut headers: HeaderMap,
        mut body: Bytes,
    ) -> Result<Response<Incoming>, GatewayError> {
        let mut redirects = 0;

        loop {
            let response = self
                .send_once(method.clone(), uri.clone(), headers.clone(), Body::from(body.clone()))
                .await?;

            let status = response.status();
            if !is_redirect(status) {
                return Ok(response);
            }

            let Some(next) = next_location(&uri, response.headers()) else {
                return Ok(response);
            };

            redirects += 1;
            if redirects > self.max_redirects {
                return Err(GatewayError::TooManyRedirects(self.max_redirects));
            }

            if rewrites_to_get(status, &method) {
                method = Method::GET;
                body = Bytes::new();
                strip_content_headers(&mut headers);
            }

            if uri.host() != next.host() || uri.port_u16() != next.port_u16() {
                headers.remove(header::AUTHORIZATION);
                headers.remove(header::PROXY_AUTHORIZATION);
                headers.remove(header::COOKIE);
            }

            tracing::debug!(
                status = %status,
                from = %uri,
                to = %next,
                redirects,
                "Following upstream redirect"
            );
            uri = next;
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

fn rewrites_to_get(status: StatusCode, method: &Method) -> bool {
    match status {
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND => method == Method::POST,
        StatusCode::SEE_OTHER => method != Method::HEAD,
        _ => false,
    }
}

fn strip_content_headers(headers: &mut HeaderMap) {
    let content: Vec<_> = headers
        .keys()
        .filter(|name| name.as_str().starts_with("content-"))
        .cloned()
        .collect();
    for name in content {
        headers.remove(name);
    }
}

/// Resolve `Location` against the current URI. Only plain-http targets are
/// followable; anything else is relayed to the client as is.
fn next_location(current: &Uri, headers: &HeaderMap) -> Option<Uri> {
    let location = headers.get(header::LOCATION)?.to_str().ok()?;
    let base = Url::parse(&current.to_string()).ok()?;
    let mut next = base.join(location).ok()?;
    if next.scheme() != "http" {
        return None;
    }
    next.set_fragment(None);
    next.as_str().parse().ok()
}

/// Render an error with its source chain; hyper's top-level messages are terse.
pub(crate) fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
