//! Error types for the geofence registry.

use geofencing_client::GeofencingError;
use preference_store::PreferenceError;
use thiserror::Error;

/// Registry error types.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid geofence: {0}")]
    InvalidGeofence(String),

    #[error("Geofencing service rejected the request: {code} - {message}")]
    ServiceRejected { code: i32, message: String },

    #[error("Connection to geofencing service failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection to geofencing service suspended: {0}")]
    ConnectionSuspended(String),

    #[error("Geofencing service error: {0}")]
    Service(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PreferenceError),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<GeofencingError> for RegistryError {
    fn from(e: GeofencingError) -> Self {
        match e {
            GeofencingError::ConnectionFailed(msg) => RegistryError::ConnectionFailed(msg),
            GeofencingError::ConnectionSuspended(msg) => RegistryError::ConnectionSuspended(msg),
            other => RegistryError::Service(other.to_string()),
        }
    }
}
