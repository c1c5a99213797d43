//! News id → share metadata.

use serde::Serialize;
use serde_json::Value;

use crate::config::schema::{is_absolute_http, SiteMetaConfig, UpstreamConfig};
use crate::news::model::{normalize_payload, NewsItem};
use crate::news::text::plain_description;

/// How a [`Meta`] value came about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetaKind {
    /// Built from a matching upstream item.
    Found,
    /// Upstream answered, but no item matched the id.
    NotFound,
    /// No upstream data was available.
    Unavailable,
}

impl MetaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetaKind::Found => "found",
            MetaKind::NotFound => "not_found",
            MetaKind::Unavailable => "unavailable",
        }
    }
}

/// Share metadata for one rendered page. Every field is always populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Meta {
    pub title: String,
    pub description: String,
    pub image: String,
    pub url: String,
    pub kind: MetaKind,
}

/// Decode a raw path segment once. Invalid encodings are used verbatim.
pub fn decode_id(raw: &str) -> String {
    match urlencoding::decode(raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw.to_string(),
    }
}

/// Derives [`Meta`] from upstream payloads using the site's defaults.
#[derive(Debug, Clone)]
pub struct MetaResolver {
    site: SiteMetaConfig,
    image_base: String,
}

impl MetaResolver {
    /// Configured default descriptions are normalized here like item text.
    pub fn new(mut site: SiteMetaConfig, upstream: &UpstreamConfig) -> Self {
        site.default_description =
            plain_description(&site.default_description, site.description_limit);
        site.not_found_description =
            plain_description(&site.not_found_description, site.description_limit);
        Self {
            site,
            image_base: upstream.image_base(),
        }
    }

    /// Resolve metadata for the (already decoded) news id.
    ///
    /// `payload` is `None` when the upstream fetch failed.
    pub fn resolve(&self, payload: Option<&Value>, id: &str) -> Meta {
        let Some(payload) = payload else {
            return self.defaults(id, MetaKind::Unavailable);
        };

        let items = normalize_payload(payload);
        match items.iter().find(|item| item.matches(id)) {
            Some(item) => self.from_item(item, id),
            None => {
                tracing::debug!(news_id = %id, candidates = items.len(), "News item not found");
                self.defaults(id, MetaKind::NotFound)
            }
        }
    }

    /// Metadata used when nothing specific is known.
    pub fn defaults(&self, id: &str, kind: MetaKind) -> Meta {
        let description = match kind {
            MetaKind::NotFound => &self.site.not_found_description,
            _ => &self.site.default_description,
        };
        Meta {
            title: self.site.site_name.clone(),
            description: description.clone(),
            image: self.site.default_image_url(),
            url: self.page_url(id),
            kind,
        }
    }

    fn from_item(&self, item: &NewsItem, id: &str) -> Meta {
        let title = item
            .title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.site.site_name.clone());

        let description = item
            .description
            .as_deref()
            .map(|html| plain_description(html, self.site.description_limit))
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| self.site.default_description.clone());

        let image = item
            .preferred_image()
            .map(|path| self.image_url(path))
            .unwrap_or_else(|| self.site.default_image_url());

        Meta {
            title,
            description,
            image,
            url: self.page_url(id),
            kind: MetaKind::Found,
        }
    }

    fn image_url(&self, path: &str) -> String {
        let path = path.trim();
        if is_absolute_http(path) {
            path.to_string()
        } else {
            format!("{}/{}", self.image_base, path.trim_start_matches('/'))
        }
    }

    /// Canonical page URL for a news id.
    pub fn page_url(&self, id: &str) -> String {
        format!(
            "{}/news/{}",
            self.site.site_url.trim_end_matches('/'),
            urlencoding::encode(id)
        )
    }

    pub fn site(&self) -> &SiteMetaConfig {
        &self.site
    }
}
