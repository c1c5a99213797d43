//! Response emission for rendered pages.
//!
//! # Responsibilities
//! - Define the `ResponseSink` seam every runtime adapts to
//! - Emit rendered HTML with content type and cache hints
//!
//! # Design Decisions
//! - Rendered pages are always 200, whatever happened upstream
//! - The axum adapter buffers into `HtmlResponse`, then converts once

use axum::{
    body::Body,
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

use crate::pipeline::Rendered;

/// Content type of every rendered page.
pub const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Header naming how the page metadata was resolved.
pub const X_SSR_META: &str = "x-ssr-meta";

/// Minimal response interface shared by every server runtime.
pub trait ResponseSink {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue);
    fn status(&mut self, status: StatusCode);
    fn send(&mut self, body: String);
}

/// Write a rendered page into `sink`.
pub fn emit_html<S: ResponseSink + ?Sized>(sink: &mut S, cache_control: &HeaderValue, rendered: &Rendered) {
    let meta = if rendered.fallback {
        "fallback"
    } else {
        rendered.meta.kind.as_str()
    };

    sink.status(StatusCode::OK);
    sink.set_header(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    sink.set_header(header::CACHE_CONTROL, cache_control.clone());
    sink.set_header(HeaderName::from_static(X_SSR_META), HeaderValue::from_static(meta));
    sink.send(rendered.html.clone());
}

/// axum adapter for [`ResponseSink`].
#[derive(Debug, Default)]
pub struct HtmlResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: String,
}

impl ResponseSink for HtmlResponse {
    fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    fn status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn send(&mut self, body: String) {
        self.body = body;
    }
}

impl IntoResponse for HtmlResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
