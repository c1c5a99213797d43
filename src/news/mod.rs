//! News data subsystem.
//!
//! # Data Flow
//! ```text
//! GET /news/{id}
//!     → fetcher.rs (direct + relay race, hard deadline)
//!     → model.rs (envelope normalization, lenient item decoding)
//!     → resolver.rs (id/slug match, defaults)
//!     → text.rs (description cleanup)
//!     → Meta
//! ```
//!
//! # Design Decisions
//! - Nothing is cached; the collection is read fresh per request
//! - Missing or malformed upstream data degrades to defaults, never errors

pub mod fetcher;
pub mod model;
pub mod resolver;
pub mod text;

pub use fetcher::{FetchError, FetchStrategy, NewsFetcher};
pub use model::{normalize_payload, NewsImage, NewsItem};
pub use resolver::{decode_id, Meta, MetaKind, MetaResolver};
