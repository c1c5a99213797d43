//! Server-side meta injection for the utility website's news pages.
//!
//! Crawlers that follow a `/news/{id}` link receive the SPA shell with a
//! `<head>` describing that news item; `/api/*` is relayed to the backend.

pub mod config;
pub mod html;
pub mod http;
pub mod lifecycle;
pub mod news;
pub mod observability;
pub mod pipeline;
pub mod proxy;

pub use config::SiteConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Rendered, SsrPipeline};
