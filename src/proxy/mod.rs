//! API passthrough subsystem.
//!
//! # Data Flow
//! ```text
//! ANY /api/{*rest}
//!     → headers.rs (drop host/hop-by-hop, add X-Forwarded-*)
//!     → passthrough.rs (relay to BACKEND_BASE_URL, same path + query)
//!     → headers.rs (drop content-encoding/hop-by-hop)
//!     → streamed back to the client
//! ```
//!
//! # Design Decisions
//! - No retries: API calls may be non-idempotent
//! - Redirects are relayed, not followed
//! - Disabled (503) when no backend is configured

pub mod headers;
pub mod passthrough;

pub use passthrough::{api_passthrough, Passthrough, ProxyError};
