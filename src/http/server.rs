//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, timeouts, request ID)
//! - Bind server to listener with graceful shutdown
//! - Dispatch `/news/{id}` to the SSR pipeline
//! - Dispatch `/api/*` to the backend passthrough

use axum::{
    body::Body,
    extract::State,
    http::{header::InvalidHeaderValue, HeaderValue, Request, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::SiteConfig;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::http::response::{emit_html, HtmlResponse};
use crate::lifecycle::shutdown;
use crate::news::FetchError;
use crate::pipeline::SsrPipeline;
use crate::proxy::{api_passthrough, Passthrough};

/// Errors building the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Upstream(#[from] FetchError),

    #[error("failed to build passthrough client: {0}")]
    Passthrough(#[from] reqwest::Error),

    #[error("invalid cache-control value: {0}")]
    CacheControl(#[from] InvalidHeaderValue),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<SsrPipeline>,
    pub passthrough: Arc<Passthrough>,
    pub cache_control: HeaderValue,
}

/// HTTP server for the SSR shim.
pub struct HttpServer {
    router: Router,
    config: SiteConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: SiteConfig) -> Result<Self, ServerError> {
        let pipeline = Arc::new(SsrPipeline::from_config(&config)?);
        let passthrough = Arc::new(Passthrough::new(&config.proxy, &config.timeouts)?);
        let cache_control = HeaderValue::from_str(&config.cache.header_value())?;

        if !passthrough.is_enabled() {
            tracing::warn!("BACKEND_BASE_URL not set; /api/* will answer 503");
        }

        let state = AppState {
            pipeline,
            passthrough,
            cache_control,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// The request timeout only wraps `/api/*`. News pages are bounded by the
    /// upstream fetch deadline and must always answer 200.
    fn build_router(config: &SiteConfig, state: AppState) -> Router {
        let api = Router::new()
            .route("/api", any(api_passthrough))
            .route("/api/{*rest}", any(api_passthrough))
            .layer(TimeoutLayer::with_status_code(
                StatusCode::GATEWAY_TIMEOUT,
                Duration::from_secs(config.timeouts.request_secs),
            ));

        Router::new()
            .route("/news/{id}", get(news_handler))
            .route("/healthz", get(health_handler))
            .merge(api)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.proxy.max_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        path = %request.uri().path(),
                        request_id = %request_id(request.headers()),
                    )
                }),
            )
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The configured router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            api_base_url = %self.config.upstream.api_base_url,
            site_url = %self.config.site.site_url,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SiteConfig {
        &self.config
    }
}

/// `GET /news/{id}`: always 200 HTML.
///
/// The id is taken still percent-encoded from the URI; the pipeline decodes
/// it exactly once.
async fn news_handler(State(state): State<AppState>, uri: Uri) -> impl IntoResponse {
    let raw_id = news_segment(&uri);
    let rendered = state.pipeline.render(raw_id).await;

    let mut sink = HtmlResponse::default();
    emit_html(&mut sink, &state.cache_control, &rendered);
    sink
}

fn news_segment(uri: &Uri) -> &str {
    uri.path().strip_prefix("/news/").unwrap_or_default()
}

/// `GET /healthz`.
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use tower::ServiceExt;

    fn offline_server() -> HttpServer {
        let mut config = SiteConfig::default();
        config.upstream.api_base_url = "http://127.0.0.1:9/api".into();
        config.upstream.fetch_timeout_ms = 1000;
        config.template.paths.clear();
        HttpServer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_healthz() {
        let response = offline_server()
            .router()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_news_is_always_ok() {
        let response = offline_server()
            .router()
            .oneshot(
                Request::builder()
                    .uri("/news/%D8%AE%D8%A8%D8%B1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "text/html; charset=utf-8");
        assert_eq!(
            response.headers()["cache-control"],
            "public, s-maxage=60, stale-while-revalidate=300"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(&format!("<title>{}</title>", SiteConfig::default().site.site_name)));
        assert!(html.contains(r#"content="http://localhost:3000/news/%D8%AE%D8%A8%D8%B1""#));
        assert!(html.contains("redirect=%2Fnews%2F%25D8%25AE"));
    }

    #[tokio::test]
    async fn test_invalid_utf8_id_is_still_ok() {
        let response = offline_server()
            .router()
            .oneshot(Request::builder().uri("/news/%FF").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-ssr-meta"], "unavailable");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains(r#"content="http://localhost:3000/news/%25FF""#));
    }

    #[test]
    fn test_news_segment_stays_encoded() {
        let uri: Uri = "/news/a%2541?utm=x".parse().unwrap();
        assert_eq!(news_segment(&uri), "a%2541");
    }

    #[tokio::test]
    async fn test_api_without_backend_is_unavailable() {
        let response = offline_server()
            .router()
            .oneshot(Request::builder().uri("/api/news").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
