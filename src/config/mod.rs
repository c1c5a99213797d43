//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (SiteConfig::default)
//!     → loader.rs (optional TOML file)
//!     → loader.rs (VITE_API_BASE_URL, VITE_SITE_URL, PORT, BACKEND_BASE_URL)
//!     → validation.rs (semantic checks)
//!     → SiteConfig (validated, immutable)
//!     → shared via Arc to all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_effective, ConfigError};
pub use schema::SiteConfig;
pub use schema::{
    CacheConfig, ListenerConfig, ObservabilityConfig, PassthroughConfig, SiteMetaConfig,
    TemplateConfig, TimeoutConfig, UpstreamConfig,
};
