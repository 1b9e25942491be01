//! Configuration for the geofence registry.

use crate::controller::ControllerSettings;
use anyhow::{Context, Result};
use geofencing_client::TransitionTarget;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Registry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Geofencing service configuration
    #[serde(default)]
    pub service: ServiceConfig,

    /// Local storage and registration configuration
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Geofencing service base URL
    #[serde(default = "default_service_url")]
    pub base_url: String,

    /// Bearer token for the geofencing service
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout", with = "humantime_serde")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegistryConfig {
    /// Directory holding the preference files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Preference namespace for geofence records
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Route the service calls on geofence transitions
    #[serde(default = "default_transition_target")]
    pub transition_target: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default implementations
impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_service_url(),
            api_key: String::new(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            namespace: default_namespace(),
            transition_target: default_transition_target(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_service_url() -> String {
    "http://localhost:8090".into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_namespace() -> String {
    "Geofences".into()
}

fn default_transition_target() -> String {
    "geofence-transitions".into()
}

fn default_log_level() -> String {
    "info".into()
}

impl RegistryConfig {
    /// Controller settings derived from this configuration.
    pub fn controller_settings(&self) -> ControllerSettings {
        ControllerSettings::new(TransitionTarget::new(self.transition_target.clone()))
    }
}

impl Config {
    /// Load configuration from `GEOFENCE_`-prefixed environment variables,
    /// e.g. `GEOFENCE_SERVICE__BASE_URL`.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("GEOFENCE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
