//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum Router with every gateway route
//! - Wire up middleware (request ID, tracing, panic capture, error detail)
//! - Serve on a plain or TLS listener with graceful shutdown

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::validation::{PROXY_STATUS_PATH, STATUS_PATH};
use crate::config::{Environment, GatewayConfig};
use crate::error::{ErrorDetail, GatewayError};
use crate::http::handlers::{oauth_authorize, proxy_status, session_status};
use crate::http::proxy::proxy_handler;
use crate::http::static_files;
use crate::http::upstream::UpstreamClient;
use crate::net::tls::load_tls_config;
use crate::routing::ProxyRouter;

/// How long in-flight requests may run once shutdown starts (TLS listener).
const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub routes: Arc<ProxyRouter>,
    pub upstream: UpstreamClient,
    /// Scheme clients used to reach the gateway, reported as X-Forwarded-Proto.
    pub scheme: &'static str,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: Arc<GatewayConfig>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let routes = Arc::new(ProxyRouter::from_config(&config)?);
        let upstream = UpstreamClient::new(&config.timeouts, &config.limits);
        let config = Arc::new(config);

        let state = AppState {
            config: config.clone(),
            routes,
            upstream,
            scheme: if config.listener.tls.is_some() { "https" } else { "http" },
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route(STATUS_PATH, get(session_status))
            .route(PROXY_STATUS_PATH, get(proxy_status))
            .route(
                &format!("{}/{{provider}}", config.oauth.mount_path),
                get(oauth_authorize),
            );

        for route in state.routes.routes() {
            let prefix = route.path();
            router = router
                .route(prefix, any(proxy_handler))
                .route(&format!("{prefix}/"), any(proxy_handler))
                .route(&format!("{prefix}/{{*rest}}"), any(proxy_handler));
        }

        let environment = config.environment;

        router
            .merge(static_files::page_routes(&config.static_files))
            .fallback_service(static_files::asset_service(&config.static_files))
            .with_state(state)
            .layer(middleware::map_response_with_state(environment, render_error_detail))
            .layer(CatchPanicLayer::custom(panic_responder(!environment.is_production())))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The assembled router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Run the server until a shutdown signal is broadcast.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        match &self.config.listener.tls {
            Some(tls) => {
                let rustls = load_tls_config(tls).await?;
                let handle = axum_server::Handle::new();

                let drain = handle.clone();
                tokio::spawn(async move {
                    let _ = shutdown.recv().await;
                    tracing::info!("Shutdown signal received");
                    drain.graceful_shutdown(Some(DRAIN_TIMEOUT));
                });

                tracing::info!(address = %addr, tls = true, "HTTP server starting");
                axum_server::from_tcp_rustls(listener.into_std()?, rustls)
                    .handle(handle)
                    .serve(app)
                    .await?;
            }
            None => {
                tracing::info!(address = %addr, tls = false, "HTTP server starting");
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = shutdown.recv().await;
                        tracing::info!("Shutdown signal received");
                    })
                    .await?;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// In development, replace the generic body of unexpected failures with the error text.
async fn render_error_detail(State(environment): State<Environment>, response: Response) -> Response {
    if environment.is_production() {
        return response;
    }

    match response.extensions().get::<ErrorDetail>().cloned() {
        Some(ErrorDetail(detail)) => {
            let status = response.status();
            let body = Json(json!({
                "message": status.canonical_reason().unwrap_or("Internal Server Error"),
                "error": detail,
            }));
            (status, body).into_response()
        }
        None => response,
    }
}

/// Top-level handler for panics inside request handling.
fn panic_responder(
    expose_details: bool,
) -> impl FnMut(Box<dyn Any + Send + 'static>) -> Response + Clone {
    move |panic: Box<dyn Any + Send + 'static>| {
        let detail = if let Some(s) = panic.downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = panic.downcast_ref::<&str>() {
            s.to_string()
        } else {
            "unknown panic".to_string()
        };

        tracing::error!(error = %detail, "Request handler panicked");

        let body = if expose_details {
            json!({ "message": "Internal Server Error", "error": detail })
        } else {
            json!({ "message": "Internal Server Error" })
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
