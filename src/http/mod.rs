//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID)
//!     → /news/{id}: pipeline → response.rs (ResponseSink, always 200 HTML)
//!     → /api/*:     proxy passthrough
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use response::{emit_html, HtmlResponse, ResponseSink};
pub use server::{AppState, HttpServer, ServerError};
