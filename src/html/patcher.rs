//! `<head>` rewriting by text substitution.
//!
//! The template is never parsed into a DOM. Existing share tags are removed
//! with regexes and a freshly rendered block is inserted before `</head>`.

use std::sync::OnceLock;

use regex::Regex;

use crate::html::escape::escape_attr;
use crate::news::Meta;

struct Patterns {
    title: Regex,
    social_meta: Regex,
    description_meta: Regex,
    canonical: Regex,
    head_close: Regex,
    head_open: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Literal patterns; compilation cannot fail.
        let re = |p: &str| Regex::new(p).expect("static regex");
        Patterns {
            title: re(r"(?is)<title\b[^>]*>.*?</title\s*>[ \t]*(?:\r?\n)?"),
            social_meta: re(
                r#"(?is)<meta\b[^>]*\b(?:property|name)\s*=\s*["']?(?:og|twitter):[^>]*>[ \t]*(?:\r?\n)?"#,
            ),
            description_meta: re(
                r#"(?is)<meta\b[^>]*\bname\s*=\s*["']?description(?:["'\s/][^>]*)?>[ \t]*(?:\r?\n)?"#,
            ),
            canonical: re(
                r#"(?is)<link\b[^>]*\brel\s*=\s*["']?canonical(?:["'\s/][^>]*)?>[ \t]*(?:\r?\n)?"#,
            ),
            head_close: re(r"(?i)</head\s*>"),
            head_open: re(r"(?i)<head\b[^>]*>"),
        }
    })
}

/// Renders share tags and splices them into templates.
#[derive(Debug, Clone)]
pub struct HtmlPatcher {
    site_name: String,
    locale: String,
}

impl HtmlPatcher {
    pub fn new(site_name: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            site_name: site_name.into(),
            locale: locale.into(),
        }
    }

    /// Remove every existing title/share tag from `template` and insert the
    /// block for `meta`.
    pub fn patch(&self, template: &str, meta: &Meta) -> String {
        let stripped = strip_share_tags(template);
        let block = self.render_block(meta);
        insert_into_head(&stripped, &block)
    }

    /// The injected tag block.
    pub fn render_block(&self, meta: &Meta) -> String {
        let title = escape_attr(&meta.title);
        let description = escape_attr(&meta.description);
        let image = escape_attr(&meta.image);
        let url = escape_attr(&meta.url);
        let site_name = escape_attr(&self.site_name);
        let locale = escape_attr(&self.locale);

        let lines = [
            format!("<title>{}</title>", title),
            format!(r#"<meta name="description" content="{}" />"#, description),
            format!(r#"<link rel="canonical" href="{}" />"#, url),
            r#"<meta property="og:type" content="article" />"#.to_string(),
            format!(r#"<meta property="og:site_name" content="{}" />"#, site_name),
            format!(r#"<meta property="og:locale" content="{}" />"#, locale),
            format!(r#"<meta property="og:title" content="{}" />"#, title),
            format!(r#"<meta property="og:description" content="{}" />"#, description),
            format!(r#"<meta property="og:image" content="{}" />"#, image),
            format!(r#"<meta property="og:url" content="{}" />"#, url),
            r#"<meta name="twitter:card" content="summary_large_image" />"#.to_string(),
            format!(r#"<meta name="twitter:title" content="{}" />"#, title),
            format!(r#"<meta name="twitter:description" content="{}" />"#, description),
            format!(r#"<meta name="twitter:image" content="{}" />"#, image),
        ];

        let mut block = String::new();
        for line in lines {
            block.push_str("    ");
            block.push_str(&line);
            block.push('\n');
        }
        block
    }
}

/// Remove `<title>`, `og:*`/`twitter:*` meta, description meta and canonical
/// link tags.
pub fn strip_share_tags(html: &str) -> String {
    let p = patterns();
    let html = p.title.replace_all(html, "");
    let html = p.social_meta.replace_all(&html, "");
    let html = p.description_meta.replace_all(&html, "");
    p.canonical.replace_all(&html, "").into_owned()
}

/// Insert `block` before the first `</head>`; after `<head>` when there is
/// no closing tag; otherwise at the very start.
pub fn insert_into_head(html: &str, block: &str) -> String {
    let p = patterns();
    if let Some(m) = p.head_close.find(html) {
        let mut out = String::with_capacity(html.len() + block.len());
        out.push_str(&html[..m.start()]);
        out.push_str(block);
        out.push_str(&html[m.start()..]);
        return out;
    }
    if let Some(m) = p.head_open.find(html) {
        let mut out = String::with_capacity(html.len() + block.len() + 1);
        out.push_str(&html[..m.end()]);
        out.push('\n');
        out.push_str(block);
        out.push_str(&html[m.end()..]);
        return out;
    }
    format!("{}{}", block, html)
}
