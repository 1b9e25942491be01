//! Geofencing client errors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeofencingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Connection suspended: {0}")]
    ConnectionSuspended(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}
