//! `/api/*` reverse proxy to the utility backend.

use std::net::{IpAddr, SocketAddr};
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::config::{PassthroughConfig, TimeoutConfig};
use crate::http::request::request_id;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::proxy::headers::{filter_response_headers, forward_request_headers};

/// Errors surfaced by the passthrough.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("API passthrough is not configured")]
    NotConfigured,

    #[error("request body rejected: {0}")]
    Body(String),

    #[error("backend request timed out")]
    Timeout,

    #[error("backend request failed: {0}")]
    Upstream(reqwest::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::Body(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProxyError::Timeout
        } else {
            ProxyError::Upstream(e)
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Forwards requests verbatim to `backend_base_url`.
#[derive(Debug, Clone)]
pub struct Passthrough {
    client: reqwest::Client,
    backend: Option<String>,
    max_body_bytes: usize,
}

impl Passthrough {
    pub fn new(config: &PassthroughConfig, timeouts: &TimeoutConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .timeout(Duration::from_secs(timeouts.request_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            backend: config
                .backend_base_url
                .as_ref()
                .map(|b| b.trim_end_matches('/').to_string()),
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// Backend URL for an incoming request URI: same path and query.
    pub fn target_url(backend: &str, uri: &Uri) -> String {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        format!("{}{}", backend, path_and_query)
    }

    /// Relay one request and stream the backend's answer back.
    pub async fn forward(
        &self,
        request: Request,
        client_ip: Option<IpAddr>,
    ) -> Result<Response, ProxyError> {
        let backend = self.backend.as_deref().ok_or(ProxyError::NotConfigured)?;

        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| ProxyError::Body(e.to_string()))?;

        let url = Self::target_url(backend, &parts.uri);
        let headers = forward_request_headers(&parts.headers, client_ip);

        tracing::debug!(
            request_id = %request_id(&parts.headers),
            method = %parts.method,
            url = %url,
            "Forwarding API request"
        );

        let upstream = self
            .client
            .request(parts.method, url)
            .headers(headers)
            .body(body)
            .send()
            .await?;

        let status = upstream.status();
        let headers = filter_response_headers(upstream.headers());

        let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Handler for `/api` and `/api/{*rest}`.
pub async fn api_passthrough(State(state): State<AppState>, request: Request) -> Response {
    let start = Instant::now();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let req_id = request_id(request.headers()).to_string();
    let path = request.uri().path().to_string();

    let response = match state.passthrough.forward(request, client_ip).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(request_id = %req_id, path = %path, error = %e, "API passthrough failed");
            e.into_response()
        }
    };

    metrics::record_proxy_request(response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_url_keeps_path_and_query() {
        let uri: Uri = "/api/news?page=2&lang=ar".parse().unwrap();
        assert_eq!(
            Passthrough::target_url("https://backend.example", &uri),
            "https://backend.example/api/news?page=2&lang=ar"
        );
    }

    #[test]
    fn test_error_statuses() {
        assert_eq!(ProxyError::NotConfigured.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(ProxyError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(ProxyError::Body("too big".into()).status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_disabled_passthrough() {
        let passthrough =
            Passthrough::new(&PassthroughConfig::default(), &TimeoutConfig::default()).unwrap();
        assert!(!passthrough.is_enabled());

        let request = Request::builder().uri("/api/news").body(Body::empty()).unwrap();
        let err = passthrough.forward(request, None).await.unwrap_err();
        assert!(matches!(err, ProxyError::NotConfigured));
    }
}
