//! SPA shell loading.
//!
//! # Responsibilities
//! - Find the built `index.html` among ordered candidate paths
//! - Optionally fetch the live site's shell when no file exists
//! - Provide a built-in minimal shell that redirects browsers into the SPA

use std::path::PathBuf;

use thiserror::Error;

use crate::config::TemplateConfig;
use crate::html::escape::{escape_attr, js_string_literal};

/// Error type for template loading.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// A candidate exists but could not be read.
    #[error("failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Where a loaded template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateOrigin {
    File(PathBuf),
    Remote(String),
    Builtin,
}

/// A loaded shell document.
#[derive(Debug, Clone)]
pub struct Template {
    pub html: String,
    pub origin: TemplateOrigin,
}

/// Loads the shell for each request. Files are read fresh every time.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    paths: Vec<PathBuf>,
    remote: Option<(reqwest::Client, String)>,
    spa_entry: String,
    lang: String,
}

impl TemplateSource {
    /// Create a template source. `client` is only used when remote fallback
    /// is enabled.
    pub fn new(config: &TemplateConfig, site_url: &str, locale: &str, client: reqwest::Client) -> Self {
        let remote = config.remote_fallback.then(|| {
            (
                client,
                format!("{}/index.html", site_url.trim_end_matches('/')),
            )
        });

        Self {
            paths: config.paths.iter().map(PathBuf::from).collect(),
            remote,
            spa_entry: config.spa_entry.clone(),
            lang: locale
                .split(['_', '-'])
                .next()
                .filter(|l| !l.is_empty())
                .unwrap_or("ar")
                .to_string(),
        }
    }

    /// Load the shell for a request to `request_path`.
    pub async fn load(&self, request_path: &str) -> Result<Template, TemplateError> {
        for path in &self.paths {
            match tokio::fs::metadata(path).await {
                Ok(meta) if meta.is_file() => {}
                _ => continue,
            }
            let html = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| TemplateError::Read {
                    path: path.clone(),
                    source,
                })?;
            tracing::trace!(path = %path.display(), "Template loaded from disk");
            return Ok(Template {
                html,
                origin: TemplateOrigin::File(path.clone()),
            });
        }

        if let Some((client, url)) = &self.remote {
            match fetch_remote(client, url).await {
                Ok(html) => {
                    return Ok(Template {
                        html,
                        origin: TemplateOrigin::Remote(url.clone()),
                    })
                }
                Err(e) => tracing::warn!(url = %url, error = %e, "Remote template fetch failed"),
            }
        }

        tracing::debug!("No template found, using built-in shell");
        Ok(Template {
            html: self.builtin(request_path),
            origin: TemplateOrigin::Builtin,
        })
    }

    /// The built-in shell for `request_path`.
    pub fn builtin(&self, request_path: &str) -> String {
        minimal_shell(&self.lang, &spa_redirect(&self.spa_entry, request_path))
    }
}

async fn fetch_remote(client: &reqwest::Client, url: &str) -> Result<String, reqwest::Error> {
    client.get(url).send().await?.error_for_status()?.text().await
}

/// URL the minimal shell sends browsers to: the SPA entry carrying the
/// original path.
pub fn spa_redirect(spa_entry: &str, request_path: &str) -> String {
    let separator = if spa_entry.contains('?') { '&' } else { '?' };
    format!(
        "{}{}redirect={}",
        spa_entry,
        separator,
        urlencoding::encode(request_path)
    )
}

/// A bare document with an empty `<head>` and a client-side redirect.
pub fn minimal_shell(lang: &str, redirect_to: &str) -> String {
    let dir = match lang {
        "ar" | "fa" | "he" | "ur" => "rtl",
        _ => "ltr",
    };
    format!(
        r#"<!doctype html>
<html lang="{lang}" dir="{dir}">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
  </head>
  <body>
    <div id="root"></div>
    <script>window.location.replace({js_target});</script>
    <noscript><a href="{href}">{href}</a></noscript>
  </body>
</html>
"#,
        lang = escape_attr(lang),
        dir = dir,
        js_target = js_string_literal(redirect_to),
        href = escape_attr(redirect_to),
    )
}
