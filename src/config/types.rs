//! Configuration types for orca-gate
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use crate::error::ConfigError;
use crate::response::{DEFAULT_METADATA_KEY, DecorationOptions, ResponseDecorator, RouteTable};
use axum::http::StatusCode;
use serde::Deserialize;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Resource control registry settings
    pub registry: RegistryConfig,

    /// How allowed and denied objects are rendered
    pub decoration: DecorationConfig,

    /// Which request paths are decorated
    pub routes: RoutesConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Build the response decorator described by this configuration
    pub fn decorator(&self) -> Result<ResponseDecorator, ConfigError> {
        Ok(ResponseDecorator::new(
            self.decoration.to_options()?,
            RouteTable::new(&self.routes.path_prefix)?,
        ))
    }
}

/// Resource control registry configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Path to a TOML or JSON registry document
    pub path: Option<String>,
}

/// Decoration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DecorationConfig {
    /// Attach ownership metadata to allowed objects
    pub enabled: bool,

    /// Field name of the ownership metadata
    pub metadata_key: String,

    /// HTTP status returned when an inspect is denied
    pub denied_status: u16,
}

impl Default for DecorationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            metadata_key: DEFAULT_METADATA_KEY.to_string(),
            denied_status: 403,
        }
    }
}

impl DecorationConfig {
    /// Convert into the options used by the response decorator.
    ///
    /// The denied status must be a client error (4xx).
    pub fn to_options(&self) -> Result<DecorationOptions, ConfigError> {
        let denied_status = StatusCode::from_u16(self.denied_status)
            .ok()
            .filter(StatusCode::is_client_error)
            .ok_or_else(|| ConfigError::Invalid {
                message: format!(
                    "decoration.denied_status must be a 4xx status, got: {}",
                    self.denied_status
                ),
            })?;

        Ok(DecorationOptions {
            decorate: self.enabled,
            metadata_key: self.metadata_key.clone(),
            denied_status,
        })
    }
}

/// Route configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Regex fragment matched before the orchestrator API path
    /// (e.g. `/api/endpoints/[0-9]+/docker`)
    pub path_prefix: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}
