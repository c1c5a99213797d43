//! Configuration loading from disk and the environment.

use std::path::Path;
use std::fs;
use crate::config::schema::SiteConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Upstream API root.
pub const ENV_API_BASE_URL: &str = "VITE_API_BASE_URL";
/// Canonical site origin.
pub const ENV_SITE_URL: &str = "VITE_SITE_URL";
/// Listen port.
pub const ENV_PORT: &str = "PORT";
/// `/api/*` passthrough target.
pub const ENV_BACKEND_BASE_URL: &str = "BACKEND_BASE_URL";
/// Optional TOML file.
pub const ENV_CONFIG_PATH: &str = "SITE_SSR_CONFIG";
/// Log output format override.
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { key: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { key, message } => write!(f, "Invalid {}: {}", key, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let config = read_file(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the effective configuration: defaults, then the optional TOML file,
/// then process environment overrides. The result is validated.
pub fn load_effective(path: Option<&Path>) -> Result<SiteConfig, ConfigError> {
    let env_path = std::env::var(ENV_CONFIG_PATH).ok();
    let path = path.or(env_path.as_deref().map(Path::new));

    let config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration file");
            read_file(path)?
        }
        None => SiteConfig::default(),
    };

    let config = apply_env(config, |key| std::env::var(key).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

fn read_file(path: &Path) -> Result<SiteConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Overlay environment variables onto `config`.
///
/// `lookup` abstracts the environment so tests need not mutate process state.
pub fn apply_env<F>(mut config: SiteConfig, lookup: F) -> Result<SiteConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(api) = non_empty(ENV_API_BASE_URL) {
        config.upstream.api_base_url = api;
    }
    if let Some(site) = non_empty(ENV_SITE_URL) {
        config.site.site_url = site;
    }
    if let Some(backend) = non_empty(ENV_BACKEND_BASE_URL) {
        config.proxy.backend_base_url = Some(backend);
    }
    if let Some(format) = non_empty(ENV_LOG_FORMAT) {
        config.observability.log_format = format;
    }
    if let Some(port) = non_empty(ENV_PORT) {
        let port: u16 = port.parse().map_err(|e| ConfigError::Env {
            key: ENV_PORT,
            message: format!("'{}': {}", port, e),
        })?;
        let host = config
            .listener
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.listener.bind_address = format!("{}:{}", host, port);
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let config = apply_env(
            SiteConfig::default(),
            env(&[
                (ENV_API_BASE_URL, "https://api.water.example/api"),
                (ENV_SITE_URL, "https://water.example"),
                (ENV_PORT, "8088"),
                (ENV_BACKEND_BASE_URL, "https://backend.water.example"),
            ]),
        )
        .unwrap();

        assert_eq!(config.upstream.api_base_url, "https://api.water.example/api");
        assert_eq!(config.site.site_url, "https://water.example");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8088");
        assert_eq!(
            config.proxy.backend_base_url.as_deref(),
            Some("https://backend.water.example")
        );
    }

    #[test]
    fn test_blank_env_is_ignored() {
        let config = apply_env(SiteConfig::default(), env(&[(ENV_SITE_URL, "  ")])).unwrap();
        assert_eq!(config.site.site_url, SiteConfig::default().site.site_url);
    }

    #[test]
    fn test_bad_port_is_rejected() {
        let err = apply_env(SiteConfig::default(), env(&[(ENV_PORT, "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[listener]\nbind_address = \"127.0.0.1:4000\"\n\n[cache]\ns_maxage_secs = 15"
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:4000");
        assert_eq!(config.cache.s_maxage_secs, 15);
        assert_eq!(config.cache.stale_while_revalidate_secs, 300);
    }

    #[test]
    fn test_invalid_file_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.toml");
        fs::write(&path, "[site]\nsite_url = \"not a url\"\n").unwrap();

        match load_config(&path) {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors[0].field, "site.site_url"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
