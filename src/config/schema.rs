//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the SSR shim.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the site SSR server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SiteConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream news API and redundant fetch paths.
    pub upstream: UpstreamConfig,

    /// Canonical site identity and default metadata.
    pub site: SiteMetaConfig,

    /// Where the SPA shell HTML comes from.
    pub template: TemplateConfig,

    /// Cache-Control hints for rendered pages.
    pub cache: CacheConfig,

    /// `/api/*` passthrough settings.
    pub proxy: PassthroughConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Upstream news API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// API root, e.g. "https://api.example.com/api".
    pub api_base_url: String,

    /// Path of the news collection below `api_base_url`.
    pub news_path: String,

    /// Base for relative news image paths. Defaults to `{api_base_url}/news/image`.
    pub image_base_url: Option<String>,

    /// User agent announced on direct requests.
    pub user_agent: String,

    /// Relay URL templates raced alongside the direct request.
    /// `{url}` is replaced with the percent-encoded collection URL.
    pub relays: Vec<String>,

    /// Hard deadline for the whole fetch race in milliseconds.
    pub fetch_timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            news_path: "news".to_string(),
            image_base_url: None,
            user_agent: concat!("site-ssr-bot/", env!("CARGO_PKG_VERSION")).to_string(),
            relays: Vec::new(),
            fetch_timeout_ms: 4000,
        }
    }
}

impl UpstreamConfig {
    /// Full URL of the news collection.
    pub fn news_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_base_url.trim_end_matches('/'),
            self.news_path.trim_start_matches('/')
        )
    }

    /// Base URL that relative image paths are joined onto.
    pub fn image_base(&self) -> String {
        match &self.image_base_url {
            Some(base) => base.trim_end_matches('/').to_string(),
            None => format!("{}/news/image", self.api_base_url.trim_end_matches('/')),
        }
    }
}

/// Site identity and metadata defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SiteMetaConfig {
    /// Canonical origin, e.g. "https://www.example.com".
    pub site_url: String,

    /// `og:site_name` and default `<title>`.
    pub site_name: String,

    /// Default description when nothing better is known.
    pub default_description: String,

    /// Description used when the requested news item does not exist.
    pub not_found_description: String,

    /// Default share image. Relative paths are joined onto `site_url`.
    pub default_image: String,

    /// `og:locale` value.
    pub locale: String,

    /// Maximum description length in characters.
    pub description_limit: usize,
}

impl Default for SiteMetaConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:3000".to_string(),
            site_name: "شركة المياه والصرف الصحي".to_string(),
            default_description: "الموقع الرسمي لشركة المياه والصرف الصحي: الأخبار والمشاريع والفروع."
                .to_string(),
            not_found_description: "الخبر المطلوب غير موجود.".to_string(),
            default_image: "/logo.png".to_string(),
            locale: "ar_AR".to_string(),
            description_limit: 200,
        }
    }
}

impl SiteMetaConfig {
    /// Absolute URL of the default share image.
    pub fn default_image_url(&self) -> String {
        if is_absolute_http(&self.default_image) {
            self.default_image.clone()
        } else {
            format!(
                "{}/{}",
                self.site_url.trim_end_matches('/'),
                self.default_image.trim_start_matches('/')
            )
        }
    }
}

/// SPA shell template sources.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Candidate files, tried in order.
    pub paths: Vec<String>,

    /// Fetch `{site_url}/index.html` when no candidate file exists.
    pub remote_fallback: bool,

    /// Where the minimal shell and the fallback page send browsers.
    pub spa_entry: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            paths: vec![
                "dist/index.html".to_string(),
                "public/index.html".to_string(),
                "index.html".to_string(),
            ],
            remote_fallback: false,
            spa_entry: "/".to_string(),
        }
    }
}

/// Cache-Control hint for rendered pages.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Shared cache max age in seconds.
    pub s_maxage_secs: u64,

    /// Stale-while-revalidate window in seconds.
    pub stale_while_revalidate_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            s_maxage_secs: 60,
            stale_while_revalidate_secs: 300,
        }
    }
}

impl CacheConfig {
    /// Rendered `Cache-Control` header value.
    pub fn header_value(&self) -> String {
        format!(
            "public, s-maxage={}, stale-while-revalidate={}",
            self.s_maxage_secs, self.stale_while_revalidate_secs
        )
    }
}

/// `/api/*` reverse proxy settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PassthroughConfig {
    /// Backend root. `/api/*` is disabled (503) when unset.
    pub backend_base_url: Option<String>,

    /// Maximum request body relayed to the backend.
    pub max_body_bytes: usize,
}

impl Default for PassthroughConfig {
    fn default() -> Self {
        Self {
            backend_base_url: None,
            max_body_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 5,
            request_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log filter used when `RUST_LOG` is not set.
    pub log_level: String,

    /// "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "site_ssr=info,tower_http=info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

pub(crate) fn is_absolute_http(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}
