//! SSR meta-injection pipeline.
//!
//! # Data Flow
//! ```text
//! raw id ("1011", "%D8%AE...")
//!     → decode once
//!     → [fetch news collection] ∥ [load shell template]
//!     → resolve Meta (found / not found / unavailable)
//!     → patch <head>
//!     → Rendered
//!
//! Any error → built-in shell + default Meta (fallback page)
//! ```
//!
//! # Design Decisions
//! - Rendering never fails outward; callers always get HTML
//! - Fetch and template load are independent and run concurrently
//! - No state is kept between requests

use std::time::Duration;

use thiserror::Error;

use crate::config::SiteConfig;
use crate::html::{HtmlPatcher, TemplateError, TemplateSource};
use crate::news::{decode_id, FetchError, Meta, MetaKind, MetaResolver, NewsFetcher};
use crate::observability::metrics;

/// Errors caught by the pipeline's error boundary.
#[derive(Debug, Error)]
pub enum SsrError {
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// The outcome of one render.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub html: String,
    pub meta: Meta,
    /// True when the error boundary produced this page.
    pub fallback: bool,
}

/// Fetch → Resolve → Patch for `/news/{id}`.
#[derive(Debug, Clone)]
pub struct SsrPipeline {
    fetcher: NewsFetcher,
    resolver: MetaResolver,
    templates: TemplateSource,
    patcher: HtmlPatcher,
}

impl SsrPipeline {
    /// Build the pipeline and its HTTP clients from configuration.
    pub fn from_config(config: &SiteConfig) -> Result<Self, FetchError> {
        let connect_timeout = Duration::from_secs(config.timeouts.connect_secs);
        let fetcher = NewsFetcher::new(&config.upstream, connect_timeout)?;

        let template_client = reqwest::Client::builder()
            .user_agent(config.upstream.user_agent.as_str())
            .connect_timeout(connect_timeout)
            .timeout(Duration::from_millis(config.upstream.fetch_timeout_ms))
            .build()?;
        let templates = TemplateSource::new(
            &config.template,
            &config.site.site_url,
            &config.site.locale,
            template_client,
        );

        Ok(Self {
            fetcher,
            resolver: MetaResolver::new(config.site.clone(), &config.upstream),
            templates,
            patcher: HtmlPatcher::new(config.site.site_name.clone(), config.site.locale.clone()),
        })
    }

    pub fn fetcher(&self) -> &NewsFetcher {
        &self.fetcher
    }

    /// Resolve metadata only, without touching templates.
    pub async fn lookup(&self, raw_id: &str) -> Meta {
        let id = decode_id(raw_id);
        let payload = self.fetcher.fetch().await.ok();
        self.resolver.resolve(payload.as_ref(), &id)
    }

    /// Render the page for a raw (still percent-encoded) news id.
    pub async fn render(&self, raw_id: &str) -> Rendered {
        let id = decode_id(raw_id);
        let request_path = format!("/news/{}", raw_id);

        let rendered = match self.try_render(&id, &request_path).await {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!(news_id = %id, error = %e, "SSR render failed, serving fallback page");
                metrics::record_fallback();
                self.fallback(&id, &request_path)
            }
        };

        metrics::record_render(rendered.meta.kind.as_str());
        tracing::info!(
            news_id = %id,
            meta = rendered.meta.kind.as_str(),
            fallback = rendered.fallback,
            "Rendered news page"
        );
        rendered
    }

    async fn try_render(&self, id: &str, request_path: &str) -> Result<Rendered, SsrError> {
        let (payload, template) = tokio::join!(self.fetcher.fetch(), self.templates.load(request_path));
        let template = template?;

        let meta = self.resolver.resolve(payload.ok().as_ref(), id);
        tracing::debug!(news_id = %id, origin = ?template.origin, "Patching template");
        let html = self.patcher.patch(&template.html, &meta);

        Ok(Rendered {
            html,
            meta,
            fallback: false,
        })
    }

    /// Default metadata spliced into the built-in redirecting shell.
    pub fn fallback(&self, id: &str, request_path: &str) -> Rendered {
        let meta = self.resolver.defaults(id, MetaKind::Unavailable);
        let html = self.patcher.patch(&self.templates.builtin(request_path), &meta);
        Rendered {
            html,
            meta,
            fallback: true,
        }
    }
}
