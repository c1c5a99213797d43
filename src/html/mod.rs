//! HTML shell handling.
//!
//! # Data Flow
//! ```text
//! template.rs (disk candidates → live site → built-in shell)
//!     → patcher.rs (strip old title/og/twitter tags, insert new block)
//!     → escape.rs (every interpolated value)
//! ```

pub mod escape;
pub mod patcher;
pub mod template;

pub use escape::escape_attr;
pub use patcher::HtmlPatcher;
pub use template::{Template, TemplateError, TemplateOrigin, TemplateSource};
