//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate URLs, addresses and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: SiteConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::SiteConfig;

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    check_http_url(&mut errors, "upstream.api_base_url", &config.upstream.api_base_url);
    check_http_url(&mut errors, "site.site_url", &config.site.site_url);
    if let Some(base) = &config.upstream.image_base_url {
        check_http_url(&mut errors, "upstream.image_base_url", base);
    }
    if let Some(backend) = &config.proxy.backend_base_url {
        check_http_url(&mut errors, "proxy.backend_base_url", backend);
    }

    for relay in &config.upstream.relays {
        if !relay.contains("{url}") {
            errors.push(ValidationError::new(
                "upstream.relays",
                format!("relay template '{}' has no {{url}} placeholder", relay),
            ));
        } else {
            check_http_url(&mut errors, "upstream.relays", &relay.replace("{url}", "x"));
        }
    }

    if config.upstream.fetch_timeout_ms == 0 {
        errors.push(ValidationError::new("upstream.fetch_timeout_ms", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }
    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.site.description_limit == 0 {
        errors.push(ValidationError::new("site.description_limit", "must be greater than 0"));
    }
    if config.proxy.max_body_bytes == 0 {
        errors.push(ValidationError::new("proxy.max_body_bytes", "must be greater than 0"));
    }
    if config.template.paths.is_empty() && !config.template.remote_fallback {
        tracing::debug!("No template paths configured; the built-in shell will always be used");
    }

    match config.observability.log_format.as_str() {
        "pretty" | "json" => {}
        other => errors.push(ValidationError::new(
            "observability.log_format",
            format!("unknown format '{}', expected 'pretty' or 'json'", other),
        )),
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_http_url(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL '{}': {}", value, e))),
    }
}
