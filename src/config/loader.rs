//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (ORCA_GATE__*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::config::types::AppConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "orca-gate.toml",
    ".orca-gate.toml",
    "~/.config/orca-gate/config.toml",
    "/etc/orca-gate/config.toml",
];

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. Start with defaults (handled by serde defaults on AppConfig)

    // 2. Add configuration file
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        let expanded = shellexpand::tilde(path);
        if !Path::new(expanded.as_ref()).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // 3. Add environment variables with ORCA_GATE__ prefix
    // e.g., ORCA_GATE__REGISTRY__PATH, ORCA_GATE__DECORATION__ENABLED
    // Double underscore (__) maps to nested keys (registry.path)
    builder = builder.add_source(
        Environment::with_prefix("ORCA_GATE")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let app_config: AppConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// Validate configuration values
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.decoration.metadata_key.trim().is_empty() {
        return Err(ConfigError::Missing {
            field: "decoration.metadata_key".to_string(),
        });
    }

    config.decoration.to_options()?;

    if let Some(path) = &config.registry.path
        && path.trim().is_empty()
    {
        return Err(ConfigError::Invalid {
            message: "registry.path must not be empty when set".to_string(),
        });
    }

    validate_pattern(&config.routes.path_prefix, "routes.path_prefix")?;

    Ok(())
}

/// Validate that a pattern is a valid regex
fn validate_pattern(pattern: &str, field_path: &str) -> Result<(), ConfigError> {
    if let Err(e) = regex::Regex::new(pattern) {
        return Err(ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: format!("in {}: {}", field_path, e),
        });
    }
    Ok(())
}
