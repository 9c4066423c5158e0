//! Configuration management for Farmgate Core

use crate::cache::DEFAULT_CAPACITY;
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment name (development, staging, production)
    pub environment: String,
    /// Logging configuration
    pub telemetry: TelemetryConfig,
    /// Decision engine configuration
    pub engine: EngineConfig,
    /// Default snapshot file for the CLI
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// "json" or "text"
    pub log_format: String,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
            service_name: "farmgate-core".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of resolved custom roles kept in the LRU cache
    pub custom_role_cache_capacity: usize,
    /// Treat bindings for tenants the user does not belong to as malformed
    pub enforce_tenant_membership: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            custom_role_cache_capacity: DEFAULT_CAPACITY,
            enforce_tenant_membership: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let custom_role_cache_capacity: usize = lookup("FARMGATE_CUSTOM_ROLE_CACHE_SIZE")
            .unwrap_or_else(|| DEFAULT_CAPACITY.to_string())
            .parse()
            .context("Invalid FARMGATE_CUSTOM_ROLE_CACHE_SIZE")?;
        if custom_role_cache_capacity == 0 {
            bail!("FARMGATE_CUSTOM_ROLE_CACHE_SIZE must be greater than 0");
        }

        let log_format = lookup("LOG_FORMAT")
            .map(|s| s.to_lowercase())
            .unwrap_or_else(|| "text".to_string());
        if log_format != "json" && log_format != "text" {
            bail!("Invalid LOG_FORMAT '{}': expected 'json' or 'text'", log_format);
        }

        Ok(Self {
            environment: lookup("FARMGATE_ENV").unwrap_or_else(|| "development".to_string()),
            telemetry: TelemetryConfig {
                log_format,
                service_name: lookup("FARMGATE_SERVICE_NAME")
                    .unwrap_or_else(|| "farmgate-core".to_string()),
            },
            engine: EngineConfig {
                custom_role_cache_capacity,
                enforce_tenant_membership: lookup("FARMGATE_ENFORCE_TENANT_MEMBERSHIP")
                    .map(|s| s.to_lowercase() != "false")
                    .unwrap_or(true),
            },
            snapshot_path: lookup("FARMGATE_SNAPSHOT_PATH")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
