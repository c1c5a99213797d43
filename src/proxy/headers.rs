//! Header manipulation for the API passthrough.
//!
//! # Responsibilities
//! - Add X-Forwarded-For, X-Forwarded-Proto, X-Forwarded-Host
//! - Strip hop-by-hop headers in both directions
//! - Drop `host` on the way in and `content-encoding` on the way out

use std::net::IpAddr;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

/// Hop-by-hop headers (RFC 9110 §7.6.1) plus the legacy keep-alive family.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_FORWARDED_HOST: &str = "x-forwarded-host";
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Headers sent to the backend for an incoming request.
///
/// The client's own `accept-encoding` is dropped because the relay
/// decompresses bodies before streaming them back.
pub fn forward_request_headers(incoming: &HeaderMap, client_ip: Option<IpAddr>) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(incoming.len() + 3);
    for (name, value) in incoming {
        if is_hop_by_hop(name)
            || name == header::HOST
            || name == header::ACCEPT_ENCODING
            || name == header::CONTENT_LENGTH
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    if let Some(ip) = client_ip {
        let chain = match incoming.get(X_FORWARDED_FOR).and_then(|v| v.to_str().ok()) {
            Some(prior) if !prior.trim().is_empty() => format!("{}, {}", prior, ip),
            _ => ip.to_string(),
        };
        if let Ok(value) = HeaderValue::from_str(&chain) {
            out.insert(X_FORWARDED_FOR, value);
        }
    }

    if let Some(host) = incoming.get(header::HOST) {
        out.insert(X_FORWARDED_HOST, host.clone());
    }
    if !out.contains_key(X_FORWARDED_PROTO) {
        out.insert(X_FORWARDED_PROTO, HeaderValue::from_static("http"));
    }

    out
}

/// Headers returned to the client from a backend response.
pub fn filter_response_headers(backend: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(backend.len());
    for (name, value) in backend {
        if is_hop_by_hop(name)
            || name == header::CONTENT_ENCODING
            || name == header::CONTENT_LENGTH
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_headers() {
        let mut incoming = HeaderMap::new();
        incoming.insert(header::HOST, HeaderValue::from_static("water.example"));
        incoming.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        incoming.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        incoming.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        incoming.append(header::COOKIE, HeaderValue::from_static("a=1"));
        incoming.append(header::COOKIE, HeaderValue::from_static("b=2"));
        incoming.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9"));

        let out = forward_request_headers(&incoming, Some("10.0.0.7".parse().unwrap()));

        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get(header::ACCEPT_ENCODING).is_none());
        assert_eq!(out[header::AUTHORIZATION], "Bearer t");
        assert_eq!(out.get_all(header::COOKIE).iter().count(), 2);
        assert_eq!(out[X_FORWARDED_FOR], "203.0.113.9, 10.0.0.7");
        assert_eq!(out[X_FORWARDED_HOST], "water.example");
        assert_eq!(out[X_FORWARDED_PROTO], "http");
    }

    #[test]
    fn test_existing_proto_is_kept() {
        let mut incoming = HeaderMap::new();
        incoming.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));
        let out = forward_request_headers(&incoming, None);
        assert_eq!(out[X_FORWARDED_PROTO], "https");
        assert!(out.get(X_FORWARDED_FOR).is_none());
    }

    #[test]
    fn test_response_headers() {
        let mut backend = HeaderMap::new();
        backend.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
        backend.insert(header::CONTENT_LENGTH, HeaderValue::from_static("42"));
        backend.insert(header::TRANSFER_ENCODING, HeaderValue::from_static("chunked"));
        backend.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        backend.append(header::SET_COOKIE, HeaderValue::from_static("s=1"));
        backend.append(header::SET_COOKIE, HeaderValue::from_static("t=2"));

        let out = filter_response_headers(&backend);
        assert!(out.get(header::CONTENT_ENCODING).is_none());
        assert!(out.get(header::CONTENT_LENGTH).is_none());
        assert!(out.get(header::TRANSFER_ENCODING).is_none());
        assert_eq!(out[header::CONTENT_TYPE], "application/json");
        assert_eq!(out.get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
