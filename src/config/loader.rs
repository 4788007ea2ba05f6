//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::CatalogConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Overrides `upstream.base_url`.
pub const ENV_UPSTREAM_ENDPOINT: &str = "PRODUCTS_API_ENDPOINT";
/// Overrides `fallback.degraded_mode` (true/false/1/0).
pub const ENV_DEGRADED_MODE: &str = "CATALOG_DEGRADED_MODE";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value '{value}' for environment variable {name}")]
    Env { name: &'static str, value: String },

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<CatalogConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate TOML content, without environment overrides.
pub fn parse_config(content: &str) -> Result<CatalogConfig, ConfigError> {
    let config: CatalogConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load from `path` if given (defaults otherwise), then apply process
/// environment overrides and validate the result.
pub fn load_with_env(path: Option<&Path>) -> Result<CatalogConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => CatalogConfig::default(),
    };
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Apply overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut CatalogConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = lookup(ENV_UPSTREAM_ENDPOINT) {
        if !endpoint.trim().is_empty() {
            config.upstream.base_url = endpoint.trim().to_string();
        }
    }

    if let Some(raw) = lookup(ENV_DEGRADED_MODE) {
        config.fallback.degraded_mode = match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => true,
            "false" | "0" | "no" | "off" => false,
            _ => {
                return Err(ConfigError::Env {
                    name: ENV_DEGRADED_MODE,
                    value: raw,
                })
            }
        };
    }

    Ok(())
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
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            [upstream]
            base_url = "https://catalog.example.com/api/product"
            timeout_secs = 2

            [fallback]
            degraded_mode = false
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.upstream.timeout_secs, 2);
        assert!(!config.fallback.degraded_mode);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        assert!(matches!(
            parse_config("[breaker]\nfailure_threshold = 0\n"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            parse_config("[breaker\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            load_config(Path::new("/definitely/not/here.toml")),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = CatalogConfig::default();
        apply_env_overrides(
            &mut config,
            env(&[
                (ENV_UPSTREAM_ENDPOINT, "https://override.example.com/products"),
                (ENV_DEGRADED_MODE, "false"),
            ]),
        )
        .unwrap();

        assert_eq!(config.upstream.base_url, "https://override.example.com/products");
        assert!(!config.fallback.degraded_mode);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = CatalogConfig::default();
        let err = apply_env_overrides(&mut config, env(&[(ENV_DEGRADED_MODE, "maybe")]))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value 'maybe' for environment variable CATALOG_DEGRADED_MODE"
        );
    }

    #[test]
    fn test_validation_error_display() {
        let err = parse_config("[cache]\nttl_secs = 0\n[upstream]\ntimeout_secs = 0\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: upstream.timeout_secs: must be > 0, cache.ttl_secs: must be > 0"
        );
    }
}
